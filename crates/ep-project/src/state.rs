//! Application state container.
//!
//! `PlanState` owns the project being edited plus the editor selection. Every
//! mutation goes through an explicit method here; derived data (circuits, RCD
//! groups, upstream chains) is never stored, callers recompute it from
//! [`PlanState::project`] after a change.

use ep_catalog::{ArticleLine, Attributes, KnxProperties, SymbolCatalog, SymbolDefinition};
use ep_core::{
    BoardId, CableId, CircuitId, NetworkId, ProtectionRequirement, RcdGroupId, RoomId, SymbolId,
    SymbolKey,
};
use uuid::Uuid;

use crate::schema::{
    BoardDef, Cable, CircuitDevice, CircuitGroupOverride, NetworkConfig, NetworkType,
    PlacedSymbol, Position, Project, RcdGroupOverride,
};
use crate::{ProjectError, ProjectResult};

/// What the editor currently has selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Symbol(SymbolId),
    Cable(CableId),
}

/// Field patch for a placed symbol. `None` leaves a field untouched; for
/// optional fields `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct SymbolPatch {
    pub room_id: Option<RoomId>,
    pub attributes: Option<Attributes>,
    pub board_id: Option<Option<BoardId>>,
    pub protection_overrides: Option<Option<Vec<ProtectionRequirement>>>,
    pub circuit_group: Option<Option<CircuitId>>,
    pub knx: Option<KnxProperties>,
    pub articles: Option<Vec<ArticleLine>>,
}

/// Field patch for a circuit-group override, same conventions as [`SymbolPatch`].
#[derive(Debug, Clone, Default)]
pub struct CircuitGroupPatch {
    pub name: Option<Option<String>>,
    pub board_id: Option<Option<BoardId>>,
    pub device_overrides: Option<Option<Vec<CircuitDevice>>>,
}

#[derive(Debug, Clone)]
pub struct PlanState {
    project: Project,
    selection: Option<Selection>,
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

impl PlanState {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            selection: None,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Place a new symbol; it inherits the definition's defaults and becomes
    /// the selection.
    pub fn add_symbol(&mut self, def: &SymbolDefinition, room_id: RoomId, x: f64, y: f64) -> SymbolId {
        let id = SymbolId::new(new_uuid());
        let articles = def
            .default_articles
            .iter()
            .map(|a| ArticleLine {
                id: new_uuid().into(),
                ..a.clone()
            })
            .collect();

        self.project.symbols.push(PlacedSymbol {
            id: id.clone(),
            symbol_key: def.key.clone(),
            room_id,
            position: Position { x, y, rotation: 0.0 },
            attributes: def.default_attributes.clone(),
            board_id: None,
            protection_overrides: None,
            circuit_group: None,
            knx: def.default_knx.clone(),
            articles,
        });
        self.selection = Some(Selection::Symbol(id.clone()));
        id
    }

    pub fn add_symbol_by_key(
        &mut self,
        catalog: &SymbolCatalog,
        key: &SymbolKey,
        room_id: RoomId,
        x: f64,
        y: f64,
    ) -> ProjectResult<SymbolId> {
        let def = catalog
            .find(key)
            .ok_or_else(|| ProjectError::UnknownSymbolType {
                key: key.to_string(),
            })?;
        Ok(self.add_symbol(def, room_id, x, y))
    }

    /// Returns `false` when no symbol has that id.
    pub fn update_symbol(&mut self, id: &SymbolId, patch: SymbolPatch) -> bool {
        let Some(sym) = self.project.symbols.iter_mut().find(|s| &s.id == id) else {
            return false;
        };
        if let Some(room_id) = patch.room_id {
            sym.room_id = room_id;
        }
        if let Some(attributes) = patch.attributes {
            sym.attributes = attributes;
        }
        if let Some(board_id) = patch.board_id {
            sym.board_id = board_id;
        }
        if let Some(overrides) = patch.protection_overrides {
            sym.protection_overrides = overrides;
        }
        if let Some(group) = patch.circuit_group {
            sym.circuit_group = group;
        }
        if let Some(knx) = patch.knx {
            sym.knx = knx;
        }
        if let Some(articles) = patch.articles {
            sym.articles = articles;
        }
        true
    }

    pub fn move_symbol(&mut self, id: &SymbolId, x: f64, y: f64) -> bool {
        match self.project.symbols.iter_mut().find(|s| &s.id == id) {
            Some(sym) => {
                sym.position.x = x;
                sym.position.y = y;
                true
            }
            None => false,
        }
    }

    /// Remove a symbol, detach it from every cable (dropping cables left
    /// empty) and clear the selection if it pointed at the symbol.
    pub fn remove_symbol(&mut self, id: &SymbolId) -> Option<PlacedSymbol> {
        let idx = self.project.symbols.iter().position(|s| &s.id == id)?;
        let removed = self.project.symbols.remove(idx);

        for cable in &mut self.project.cables {
            cable.symbol_ids.retain(|s| s != id);
        }
        let before = self.project.cables.len();
        self.project.cables.retain(|c| !c.symbol_ids.is_empty());
        let dropped = before - self.project.cables.len();

        if let Some(Selection::Cable(cable_id)) = &self.selection
            && !self.project.cables.iter().any(|c| &c.id == cable_id)
        {
            self.selection = None;
        }
        if self.selection == Some(Selection::Symbol(id.clone())) {
            self.selection = None;
        }

        tracing::debug!(symbol = %id, dropped_cables = dropped, "removed symbol");
        Some(removed)
    }

    pub fn add_cable(&mut self, cable_type: impl Into<String>, symbol_ids: Vec<SymbolId>) -> CableId {
        let id = CableId::new(new_uuid());
        self.project.cables.push(Cable {
            id: id.clone(),
            cable_type: cable_type.into(),
            symbol_ids,
            length_m: None,
        });
        id
    }

    pub fn remove_cable(&mut self, id: &CableId) -> bool {
        let before = self.project.cables.len();
        self.project.cables.retain(|c| &c.id != id);
        if self.selection == Some(Selection::Cable(id.clone())) {
            self.selection = None;
        }
        before != self.project.cables.len()
    }

    /// Merge `patch` into the override for `circuit_id`. Overrides left
    /// without any field are removed.
    pub fn set_circuit_group_override(&mut self, circuit_id: &CircuitId, patch: CircuitGroupPatch) {
        let overrides = &mut self.project.circuit_group_overrides;
        let idx = match overrides.iter().position(|o| &o.group_id == circuit_id) {
            Some(idx) => idx,
            None => {
                overrides.push(CircuitGroupOverride::new(circuit_id.clone()));
                overrides.len() - 1
            }
        };

        let ov = &mut overrides[idx];
        if let Some(name) = patch.name {
            ov.name = name;
        }
        if let Some(board_id) = patch.board_id {
            ov.board_id = board_id;
        }
        if let Some(devices) = patch.device_overrides {
            ov.device_overrides = devices;
        }
        if ov.is_empty() {
            overrides.remove(idx);
        }
    }

    /// Pin a circuit to an RCD group, or return it to automatic grouping with `None`.
    pub fn set_rcd_group_override(&mut self, circuit_id: &CircuitId, group: Option<RcdGroupId>) {
        let overrides = &mut self.project.rcd_overrides;
        match overrides.iter_mut().find(|o| &o.circuit_id == circuit_id) {
            Some(ov) => ov.rcd_group_id = group,
            None => overrides.push(RcdGroupOverride {
                circuit_id: circuit_id.clone(),
                rcd_group_id: group,
            }),
        }
    }

    /// Returns `false` if a board with that id already exists.
    pub fn add_board(&mut self, id: BoardId, name: impl Into<String>) -> bool {
        if self.project.board(&id).is_some() {
            return false;
        }
        self.project.boards.push(BoardDef {
            id,
            name: name.into(),
        });
        true
    }

    /// Remove a board; its symbols become unassigned and networks stop feeding it.
    pub fn remove_board(&mut self, id: &BoardId) -> bool {
        let before = self.project.boards.len();
        self.project.boards.retain(|b| &b.id != id);
        if before == self.project.boards.len() {
            return false;
        }
        for sym in &mut self.project.symbols {
            if sym.board_id.as_ref() == Some(id) {
                sym.board_id = None;
            }
        }
        for net in &mut self.project.networks {
            net.board_ids.retain(|b| b != id);
        }
        true
    }

    pub fn add_network(&mut self, network_type: NetworkType) -> NetworkId {
        let id = NetworkId::new(new_uuid());
        let count = self
            .project
            .networks
            .iter()
            .filter(|n| n.network_type == network_type)
            .count();
        let name = format!("{} {}", network_type.label(), count + 1);
        self.project
            .networks
            .push(NetworkConfig::new(id.clone(), name, network_type));
        id
    }

    pub fn remove_network(&mut self, id: &NetworkId) -> bool {
        let before = self.project.networks.len();
        self.project.networks.retain(|n| &n.id != id);
        before != self.project.networks.len()
    }

    /// Returns `false` if the network is unknown.
    pub fn link_board_to_network(&mut self, network_id: &NetworkId, board_id: &BoardId) -> bool {
        match self.project.networks.iter_mut().find(|n| &n.id == network_id) {
            Some(net) => {
                if !net.board_ids.contains(board_id) {
                    net.board_ids.push(board_id.clone());
                }
                true
            }
            None => false,
        }
    }

    pub fn unlink_board_from_network(&mut self, network_id: &NetworkId, board_id: &BoardId) -> bool {
        match self.project.networks.iter_mut().find(|n| &n.id == network_id) {
            Some(net) => {
                let before = net.board_ids.len();
                net.board_ids.retain(|b| b != board_id);
                before != net.board_ids.len()
            }
            None => false,
        }
    }
}
