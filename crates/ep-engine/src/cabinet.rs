//! Cabinet layout ("Aufbauplan"): the devices of one board on mounting rails.

use std::collections::HashSet;

use ep_catalog::DeviceLookup;
use ep_core::{BoardId, CircuitId, DeviceId, RcdGroupId};
use serde::{Deserialize, Serialize};

use crate::circuit::{DerivedCircuit, circuit_devices_without_rcd};
use crate::rcd::RcdGroup;
use crate::upstream::{UpstreamDevice, UpstreamSlot};

/// Usable width of one mounting rail in a small residential board.
pub const DEFAULT_RAIL_WIDTH_TE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum RailSource {
    Upstream(UpstreamSlot),
    SharedRcd(RcdGroupId),
    Circuit(CircuitId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailEntry {
    pub source: RailSource,
    pub label: String,
    pub caption: String,
    pub device_id: Option<DeviceId>,
    pub te_width: u8,
    /// Zero-based rail index.
    pub rail: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetLayout {
    pub board_id: BoardId,
    pub entries: Vec<RailEntry>,
    pub total_te: u32,
    pub rail_width: u32,
    pub rails: u32,
}

fn device_entry(
    source: RailSource,
    device_id: &DeviceId,
    caption: &str,
    devices: &impl DeviceLookup,
) -> RailEntry {
    let device = devices.find_device(device_id);
    RailEntry {
        source,
        label: device.map_or_else(|| device_id.to_string(), |d| d.label.clone()),
        caption: caption.to_string(),
        device_id: Some(device_id.clone()),
        te_width: device.map_or(1, |d| d.te_width),
        rail: 0,
    }
}

/// Lay out one board: upstream devices, then per RCD group its shared RCD
/// followed by the remaining devices of its circuits, then circuits outside
/// any group. Entries never straddle two rails.
pub fn cabinet_layout(
    board: &BoardId,
    circuits: &[DerivedCircuit],
    rcd_groups: &[RcdGroup],
    upstream: &[UpstreamDevice],
    devices: &impl DeviceLookup,
    rail_width: u32,
) -> CabinetLayout {
    let mut entries = Vec::new();

    for up in upstream.iter().filter(|u| u.te_width > 0) {
        entries.push(RailEntry {
            source: RailSource::Upstream(up.slot),
            label: up.label.clone(),
            caption: up.sublabel.clone(),
            device_id: up.device.as_ref().map(|d| d.id.clone()),
            te_width: up.te_width,
            rail: 0,
        });
    }

    let board_circuits: Vec<&DerivedCircuit> =
        circuits.iter().filter(|c| &c.board_id == board).collect();
    let mut grouped: HashSet<&CircuitId> = HashSet::new();

    for group in rcd_groups.iter().filter(|g| &g.board_id == board) {
        let caption = group.requirement.describe();
        match &group.device_id {
            Some(id) => entries.push(device_entry(
                RailSource::SharedRcd(group.id.clone()),
                id,
                &caption,
                devices,
            )),
            None => entries.push(RailEntry {
                source: RailSource::SharedRcd(group.id.clone()),
                label: group.requirement.role.label().to_string(),
                caption,
                device_id: None,
                te_width: 1,
                rail: 0,
            }),
        }

        for circuit_id in &group.circuit_ids {
            let Some(circuit) = board_circuits.iter().find(|c| &c.id == circuit_id) else {
                continue;
            };
            grouped.insert(&circuit.id);
            for dev in circuit_devices_without_rcd(circuit) {
                entries.push(device_entry(
                    RailSource::Circuit(circuit.id.clone()),
                    &dev.device_id,
                    &circuit.name,
                    devices,
                ));
            }
        }
    }

    for circuit in board_circuits.iter().filter(|c| !grouped.contains(&c.id)) {
        for dev in &circuit.devices {
            entries.push(device_entry(
                RailSource::Circuit(circuit.id.clone()),
                &dev.device_id,
                &circuit.name,
                devices,
            ));
        }
    }

    let rail_width = rail_width.max(1);
    let mut rails = 0;
    let mut used = 0;
    let mut total_te = 0;
    for entry in &mut entries {
        let width = u32::from(entry.te_width);
        total_te += width;
        if rails == 0 || used + width > rail_width {
            rails += 1;
            used = 0;
        }
        used += width;
        entry.rail = rails - 1;
    }

    CabinetLayout {
        board_id: board.clone(),
        entries,
        total_te,
        rail_width,
        rails,
    }
}
