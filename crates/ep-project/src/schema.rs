//! Project schema definitions.

use ep_catalog::{ArticleLine, Attributes, KnxProperties};
use ep_core::{
    BoardId, CableId, CircuitId, DeviceId, NetworkId, ProtectionRequirement, ProtectionRole,
    RcdGroupId, RoomId, SymbolId, SymbolKey,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub building: Building,
    #[serde(default)]
    pub boards: Vec<BoardDef>,
    #[serde(default)]
    pub symbols: Vec<PlacedSymbol>,
    #[serde(default)]
    pub cables: Vec<Cable>,
    #[serde(default)]
    pub circuit_group_overrides: Vec<CircuitGroupOverride>,
    #[serde(default)]
    pub rcd_overrides: Vec<RcdGroupOverride>,
    #[serde(default)]
    pub rcd_strategy: RcdGroupingStrategy,
    #[serde(default = "default_max_per_rcd")]
    pub max_per_rcd: usize,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

fn default_max_per_rcd() -> usize {
    6
}

impl Project {
    /// An empty project at the latest schema version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: name.into(),
            building: Building::default(),
            boards: vec![],
            symbols: vec![],
            cables: vec![],
            circuit_group_overrides: vec![],
            rcd_overrides: vec![],
            rcd_strategy: RcdGroupingStrategy::default(),
            max_per_rcd: default_max_per_rcd(),
            networks: vec![],
        }
    }

    pub fn symbol(&self, id: &SymbolId) -> Option<&PlacedSymbol> {
        self.symbols.iter().find(|s| &s.id == id)
    }

    pub fn board(&self, id: &BoardId) -> Option<&BoardDef> {
        self.boards.iter().find(|b| &b.id == id)
    }

    pub fn network(&self, id: &NetworkId) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| &n.id == id)
    }

    /// Display name of a board; the id itself when the board is unknown.
    pub fn board_name<'a>(&'a self, id: &'a BoardId) -> &'a str {
        self.board(id).map(|b| b.name.as_str()).unwrap_or(id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Building {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub floors: Vec<Floor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Floor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

impl Building {
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.floors.iter().flat_map(|f| f.rooms.iter())
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms().find(|r| &r.id == id)
    }

    pub fn room_name(&self, id: &RoomId) -> Option<&str> {
        self.room(id).map(|r| r.name.as_str())
    }

    /// `"{floor} / {room}"`, or `None` when the room is unknown.
    pub fn room_path(&self, id: &RoomId) -> Option<String> {
        self.floors.iter().find_map(|floor| {
            floor
                .rooms
                .iter()
                .find(|r| &r.id == id)
                .map(|room| format!("{} / {}", floor.name, room.name))
        })
    }
}

/// A distribution board ("Verteiler").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardDef {
    pub id: BoardId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
}

/// A device instance placed in a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedSymbol {
    pub id: SymbolId,
    pub symbol_key: SymbolKey,
    pub room_id: RoomId,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub attributes: Attributes,
    /// `None` puts the symbol into the unassigned bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    /// Replaces the symbol type's protection requirements when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_overrides: Option<Vec<ProtectionRequirement>>,
    /// Explicit circuit group this symbol joins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_group: Option<CircuitId>,
    #[serde(default)]
    pub knx: KnxProperties,
    #[serde(default)]
    pub articles: Vec<ArticleLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cable {
    pub id: CableId,
    #[serde(default)]
    pub cable_type: String,
    #[serde(default)]
    pub symbol_ids: Vec<SymbolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_m: Option<f64>,
}

/// One resolved protective device of a circuit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CircuitDevice {
    pub role: ProtectionRole,
    pub device_id: DeviceId,
}

/// Manual pin of a derived circuit, keyed by circuit id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitGroupOverride {
    pub group_id: CircuitId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
    /// Present means manual device selection; absent means auto-resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_overrides: Option<Vec<CircuitDevice>>,
}

impl CircuitGroupOverride {
    pub fn new(group_id: CircuitId) -> Self {
        Self {
            group_id,
            name: None,
            board_id: None,
            device_overrides: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.board_id.is_none() && self.device_overrides.is_none()
    }
}

/// Pins a circuit to an RCD group, or (`None`) returns it to automatic grouping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RcdGroupOverride {
    pub circuit_id: CircuitId,
    #[serde(default)]
    pub rcd_group_id: Option<RcdGroupId>,
}

/// Extra dimensions of the automatic RCD grouping key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RcdGroupingStrategy {
    #[serde(default)]
    pub separate_by_room: bool,
    #[serde(default)]
    pub separate_by_rated_current: bool,
    #[serde(default)]
    pub separate_by_type: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NetworkForm {
    #[default]
    #[serde(rename = "TN-C-S")]
    TnCS,
    #[serde(rename = "TN-S")]
    TnS,
    #[serde(rename = "TN-C")]
    TnC,
    #[serde(rename = "TT")]
    Tt,
    #[serde(rename = "IT")]
    It,
}

impl NetworkForm {
    pub fn label(self) -> &'static str {
        match self {
            NetworkForm::TnCS => "TN-C-S",
            NetworkForm::TnS => "TN-S",
            NetworkForm::TnC => "TN-C",
            NetworkForm::Tt => "TT",
            NetworkForm::It => "IT",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    #[default]
    HouseConnection,
    SubDistribution,
    Generator,
    Photovoltaic,
}

impl NetworkType {
    pub fn label(self) -> &'static str {
        match self {
            NetworkType::HouseConnection => "Hausanschluss",
            NetworkType::SubDistribution => "Unterverteilung",
            NetworkType::Generator => "Netzersatzanlage",
            NetworkType::Photovoltaic => "PV-Einspeisung",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IncomingSupply {
    #[serde(default)]
    pub network_form: NetworkForm,
    #[serde(default)]
    pub as_terminal_block: bool,
}

/// An upstream slot with an ampacity (meter pre-fuse, main switch).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatedSlot {
    pub enabled: bool,
    pub ampere: u32,
    #[serde(default)]
    pub device_id: DeviceId,
}

impl Default for RatedSlot {
    fn default() -> Self {
        Self {
            enabled: false,
            ampere: 63,
            device_id: DeviceId::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeviceSlot {
    pub enabled: bool,
    #[serde(default)]
    pub device_id: DeviceId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurgePosition {
    BeforeMeter,
    #[default]
    AfterMeter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreFuse {
    pub enabled: bool,
    pub ampere: u32,
}

impl Default for PreFuse {
    fn default() -> Self {
        Self {
            enabled: false,
            ampere: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SurgeProtection {
    pub enabled: bool,
    #[serde(default)]
    pub device_id: DeviceId,
    #[serde(default)]
    pub position: SurgePosition,
    #[serde(default)]
    pub pre_fuse: PreFuse,
}

/// One incoming-supply path ("Netzkonfiguration") and the boards it feeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    pub id: NetworkId,
    pub name: String,
    #[serde(default)]
    pub network_type: NetworkType,
    #[serde(default)]
    pub supply: IncomingSupply,
    #[serde(default)]
    pub meter_fuse: RatedSlot,
    #[serde(default)]
    pub meter: DeviceSlot,
    #[serde(default)]
    pub main_switch: RatedSlot,
    #[serde(default)]
    pub surge_protection: SurgeProtection,
    #[serde(default)]
    pub board_ids: Vec<BoardId>,
}

impl NetworkConfig {
    /// A house connection with pre-fuse, meter and main switch, no surge protection.
    pub fn new(id: NetworkId, name: impl Into<String>, network_type: NetworkType) -> Self {
        Self {
            id,
            name: name.into(),
            network_type,
            supply: IncomingSupply::default(),
            meter_fuse: RatedSlot {
                enabled: true,
                ampere: 35,
                device_id: "sls-35a".into(),
            },
            meter: DeviceSlot {
                enabled: true,
                device_id: "meter-ehz".into(),
            },
            main_switch: RatedSlot {
                enabled: true,
                ampere: 63,
                device_id: "main-switch-63a".into(),
            },
            surge_protection: SurgeProtection {
                enabled: false,
                device_id: "spd-t1t2".into(),
                position: SurgePosition::AfterMeter,
                pre_fuse: PreFuse::default(),
            },
            board_ids: vec![],
        }
    }

    pub fn feeds(&self, board_id: &BoardId) -> bool {
        self.board_ids.contains(board_id)
    }
}
