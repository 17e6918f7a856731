//! Derived circuit records.

use ep_core::{
    BoardId, CableId, CircuitId, DeviceId, GroupingHint, ProtectionRequirement, ProtectionRole,
    RoomId, SymbolId,
};
use ep_project::CircuitDevice;
use serde::{Deserialize, Serialize};

/// Non-numeric requirement field that members of one circuit disagree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictField {
    Characteristic,
    RcdType,
    Poles,
}

/// Members of an explicit circuit group demand different non-numeric values
/// for one role. The circuit keeps the value of its lowest-id member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub role: ProtectionRole,
    pub field: ConflictField,
    /// Distinct values in member order.
    pub values: Vec<String>,
}

/// How a circuit came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitOrigin {
    Dedicated,
    Explicit,
    Automatic,
}

/// One electrical circuit ("Stromkreis").
///
/// Recomputed from scratch on every derivation; never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedCircuit {
    pub id: CircuitId,
    pub name: String,
    pub board_id: BoardId,
    pub room_id: RoomId,
    pub grouping_hint: GroupingHint,
    pub origin: CircuitOrigin,
    /// Ascending.
    pub symbol_ids: Vec<SymbolId>,
    /// One entry per role, in role order.
    pub requirements: Vec<ProtectionRequirement>,
    pub devices: Vec<CircuitDevice>,
    /// Ascending.
    pub cable_ids: Vec<CableId>,
    /// Devices come from a circuit-group override instead of catalog selection.
    pub manual_devices: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<MergeConflict>,
}

impl DerivedCircuit {
    pub fn requirement(&self, role: ProtectionRole) -> Option<&ProtectionRequirement> {
        self.requirements.iter().find(|r| r.role == role)
    }

    pub fn has_role(&self, role: ProtectionRole) -> bool {
        self.requirement(role).is_some()
    }

    pub fn device(&self, role: ProtectionRole) -> Option<&DeviceId> {
        self.devices
            .iter()
            .find(|d| d.role == role)
            .map(|d| &d.device_id)
    }

    /// Rated current of the circuit breaker, if the circuit has one.
    pub fn mcb_rated_current(&self) -> Option<u32> {
        self.requirement(ProtectionRole::Mcb)
            .and_then(|r| r.rated_current_a)
    }

    pub fn is_consistent(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// The circuit's devices minus its standalone RCD, which is drawn once per
/// shared RCD group.
pub fn circuit_devices_without_rcd(circuit: &DerivedCircuit) -> Vec<&CircuitDevice> {
    circuit
        .devices
        .iter()
        .filter(|d| !d.role.is_standalone_rcd())
        .collect()
}
