//! Upstream supply chain of a board.

use ep_catalog::{CabinetDevice, DeviceLookup};
use ep_core::{BoardId, DeviceId};
use ep_project::{NetworkConfig, SurgePosition, SurgeProtection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamSlot {
    IncomingSupply,
    MeterFuse,
    SurgeProtectionFuse,
    SurgeProtection,
    Meter,
    MainSwitch,
}

/// One step of an upstream chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamDevice {
    pub slot: UpstreamSlot,
    pub label: String,
    pub sublabel: String,
    pub device: Option<CabinetDevice>,
    /// Rail width in TE; zero for the incoming supply.
    pub te_width: u8,
}

const METER_FUSE_WIDTH: u8 = 3;
const SPD_FUSE_WIDTH: u8 = 1;
const SPD_WIDTH: u8 = 4;
const METER_WIDTH: u8 = 4;
const MAIN_SWITCH_WIDTH: u8 = 3;

/// First network feeding `board`.
pub fn find_network_for_board<'a>(
    networks: &'a [NetworkConfig],
    board: &BoardId,
) -> Option<&'a NetworkConfig> {
    networks.iter().find(|n| n.feeds(board))
}

/// Every network feeding `board`, in configuration order.
pub fn find_all_networks_for_board<'a>(
    networks: &'a [NetworkConfig],
    board: &BoardId,
) -> Vec<&'a NetworkConfig> {
    networks.iter().filter(|n| n.feeds(board)).collect()
}

fn catalog_slot(
    slot: UpstreamSlot,
    device_id: &DeviceId,
    fallback_label: &str,
    sublabel: String,
    fallback_width: u8,
    devices: &impl DeviceLookup,
) -> UpstreamDevice {
    let device = devices.find_device(device_id).cloned();
    if device.is_none() && !device_id.as_str().is_empty() {
        tracing::debug!(?slot, device = %device_id, "upstream device not in catalog");
    }
    UpstreamDevice {
        slot,
        label: device
            .as_ref()
            .map_or_else(|| fallback_label.to_string(), |d| d.label.clone()),
        sublabel,
        te_width: device.as_ref().map_or(fallback_width, |d| d.te_width),
        device,
    }
}

fn push_surge_protection(
    chain: &mut Vec<UpstreamDevice>,
    spd: &SurgeProtection,
    devices: &impl DeviceLookup,
) {
    if spd.pre_fuse.enabled {
        chain.push(UpstreamDevice {
            slot: UpstreamSlot::SurgeProtectionFuse,
            label: "Vorsicherung SPD".to_string(),
            sublabel: format!("{}A", spd.pre_fuse.ampere),
            device: None,
            te_width: SPD_FUSE_WIDTH,
        });
    }
    let sublabel = match spd.position {
        SurgePosition::BeforeMeter => "vor Zähler",
        SurgePosition::AfterMeter => "nach Zähler",
    };
    chain.push(catalog_slot(
        UpstreamSlot::SurgeProtection,
        &spd.device_id,
        "SPD",
        sublabel.to_string(),
        SPD_WIDTH,
        devices,
    ));
}

/// Resolve the ordered upstream chain of a network:
/// supply, meter fuse, SPD before meter, meter, SPD after meter, main switch.
///
/// The incoming supply is always present; every other slot only when enabled.
pub fn resolve_upstream_devices(
    network: &NetworkConfig,
    devices: &impl DeviceLookup,
) -> Vec<UpstreamDevice> {
    let mut chain = Vec::with_capacity(6);

    let mut supply = network.supply.network_form.label().to_string();
    if network.supply.as_terminal_block {
        supply.push_str(" (KB)");
    }
    chain.push(UpstreamDevice {
        slot: UpstreamSlot::IncomingSupply,
        label: "Einspeisung".to_string(),
        sublabel: supply,
        device: None,
        te_width: 0,
    });

    if network.meter_fuse.enabled {
        chain.push(catalog_slot(
            UpstreamSlot::MeterFuse,
            &network.meter_fuse.device_id,
            "SLS",
            format!("{}A", network.meter_fuse.ampere),
            METER_FUSE_WIDTH,
            devices,
        ));
    }

    let spd = &network.surge_protection;
    if spd.enabled && spd.position == SurgePosition::BeforeMeter {
        push_surge_protection(&mut chain, spd, devices);
    }

    if network.meter.enabled {
        chain.push(catalog_slot(
            UpstreamSlot::Meter,
            &network.meter.device_id,
            "Zähler",
            String::new(),
            METER_WIDTH,
            devices,
        ));
    }

    if spd.enabled && spd.position == SurgePosition::AfterMeter {
        push_surge_protection(&mut chain, spd, devices);
    }

    if network.main_switch.enabled {
        chain.push(catalog_slot(
            UpstreamSlot::MainSwitch,
            &network.main_switch.device_id,
            "Hauptschalter",
            format!("{}A", network.main_switch.ampere),
            MAIN_SWITCH_WIDTH,
            devices,
        ));
    }

    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use ep_catalog::builtin_devices;
    use ep_project::{NetworkForm, NetworkType};

    fn network() -> NetworkConfig {
        NetworkConfig::new("n1".into(), "Hausanschluss", NetworkType::HouseConnection)
    }

    fn slots(chain: &[UpstreamDevice]) -> Vec<UpstreamSlot> {
        chain.iter().map(|d| d.slot).collect()
    }

    #[test]
    fn default_chain() {
        let chain = resolve_upstream_devices(&network(), &builtin_devices());
        assert_eq!(
            slots(&chain),
            vec![
                UpstreamSlot::IncomingSupply,
                UpstreamSlot::MeterFuse,
                UpstreamSlot::Meter,
                UpstreamSlot::MainSwitch,
            ]
        );
        assert_eq!(chain[0].sublabel, "TN-C-S");
        assert_eq!(chain[0].te_width, 0);
        assert_eq!(chain[1].label, "SLS E35A");
        assert_eq!(chain[1].sublabel, "35A");
        assert_eq!(chain[3].sublabel, "63A");
    }

    #[test]
    fn surge_protection_before_meter_with_fuse() {
        let mut net = network();
        net.supply.network_form = NetworkForm::Tt;
        net.supply.as_terminal_block = true;
        net.surge_protection.enabled = true;
        net.surge_protection.position = SurgePosition::BeforeMeter;
        net.surge_protection.pre_fuse.enabled = true;

        let chain = resolve_upstream_devices(&net, &builtin_devices());
        assert_eq!(chain[0].sublabel, "TT (KB)");
        assert_eq!(
            slots(&chain),
            vec![
                UpstreamSlot::IncomingSupply,
                UpstreamSlot::MeterFuse,
                UpstreamSlot::SurgeProtectionFuse,
                UpstreamSlot::SurgeProtection,
                UpstreamSlot::Meter,
                UpstreamSlot::MainSwitch,
            ]
        );
        assert_eq!(chain[2].sublabel, "32A");
        assert_eq!(chain[2].te_width, 1);
        assert_eq!(chain[3].sublabel, "vor Zähler");
    }

    #[test]
    fn unknown_devices_fall_back_to_slot_defaults() {
        let mut net = network();
        net.meter_fuse.device_id = "sls-gone".into();
        net.meter.device_id = "meter-gone".into();
        net.surge_protection.enabled = true;
        net.surge_protection.device_id = "spd-gone".into();

        let chain = resolve_upstream_devices(&net, &builtin_devices());
        let fuse = &chain[1];
        assert_eq!((fuse.label.as_str(), fuse.te_width), ("SLS", 3));
        assert!(fuse.device.is_none());
        let meter = &chain[2];
        assert_eq!((meter.label.as_str(), meter.te_width), ("Zähler", 4));
        let spd = &chain[3];
        assert_eq!(spd.slot, UpstreamSlot::SurgeProtection);
        assert_eq!((spd.label.as_str(), spd.te_width), ("SPD", 4));
        assert_eq!(spd.sublabel, "nach Zähler");
    }

    #[test]
    fn board_lookup_modes() {
        let mut a = network();
        a.board_ids = vec!["hv".into()];
        let mut b = NetworkConfig::new("n2".into(), "PV", NetworkType::Photovoltaic);
        b.board_ids = vec!["hv".into(), "uv".into()];
        let networks = vec![a, b];

        assert_eq!(
            find_network_for_board(&networks, &"hv".into()).map(|n| n.id.as_str()),
            Some("n1")
        );
        assert_eq!(find_all_networks_for_board(&networks, &"hv".into()).len(), 2);
        assert_eq!(
            find_network_for_board(&networks, &"uv".into()).map(|n| n.id.as_str()),
            Some("n2")
        );
        assert!(find_all_networks_for_board(&networks, &"garage".into()).is_empty());
    }
}
