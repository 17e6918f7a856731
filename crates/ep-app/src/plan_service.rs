//! Full plan derivation: circuits, RCD groups, upstream chains and cabinets.

use std::collections::BTreeSet;

use ep_catalog::{DeviceLookup, SymbolCatalog};
use ep_core::{BoardId, NetworkId};
use ep_engine::{
    CabinetLayout, CircuitInputs, DEFAULT_RAIL_WIDTH_TE, DerivedCircuit, RcdGroup,
    RcdGroupingOptions, UpstreamDevice, cabinet_layout, derive_circuits,
    find_all_networks_for_board, group_by_shared_rcd, resolve_upstream_devices,
};
use ep_project::{Project, RcdGroupingStrategy};
use serde::Serialize;

/// Overrides applied on top of the project's own grouping settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanOptions {
    pub max_per_rcd: Option<usize>,
    pub strategy: Option<RcdGroupingStrategy>,
    pub rail_width_te: u32,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_per_rcd: None,
            strategy: None,
            rail_width_te: DEFAULT_RAIL_WIDTH_TE,
        }
    }
}

/// Upstream chain of one network feeding a board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyChain {
    pub network_id: NetworkId,
    pub network_name: String,
    pub devices: Vec<UpstreamDevice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardPlan {
    pub board_id: BoardId,
    pub board_name: String,
    /// One chain per feeding network, in configuration order.
    pub supplies: Vec<SupplyChain>,
    /// Laid out with the first feeding network's chain.
    pub cabinet: CabinetLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedPlan {
    pub circuits: Vec<DerivedCircuit>,
    pub rcd_groups: Vec<RcdGroup>,
    pub boards: Vec<BoardPlan>,
}

impl DerivedPlan {
    pub fn board(&self, id: &BoardId) -> Option<&BoardPlan> {
        self.boards.iter().find(|b| &b.board_id == id)
    }

    pub fn circuits_on<'a>(&'a self, board: &'a BoardId) -> impl Iterator<Item = &'a DerivedCircuit> {
        self.circuits.iter().filter(move |c| &c.board_id == board)
    }

    pub fn rcd_groups_on<'a>(&'a self, board: &'a BoardId) -> impl Iterator<Item = &'a RcdGroup> {
        self.rcd_groups.iter().filter(move |g| &g.board_id == board)
    }
}

/// Boards to plan: declared boards in order, then any other board that a
/// circuit lands on.
fn planned_boards(project: &Project, circuits: &[DerivedCircuit]) -> Vec<BoardId> {
    let declared: BTreeSet<&BoardId> = project.boards.iter().map(|b| &b.id).collect();
    let extra: BTreeSet<&BoardId> = circuits
        .iter()
        .map(|c| &c.board_id)
        .filter(|id| !declared.contains(id))
        .collect();

    project
        .boards
        .iter()
        .map(|b| b.id.clone())
        .chain(extra.into_iter().cloned())
        .collect()
}

pub fn derive_plan(
    project: &Project,
    symbols: &SymbolCatalog,
    devices: &impl DeviceLookup,
    options: &PlanOptions,
) -> DerivedPlan {
    let circuits = derive_circuits(&CircuitInputs::from_project(project), symbols, devices);

    let mut grouping = RcdGroupingOptions::from_project(project);
    if let Some(max) = options.max_per_rcd {
        grouping.max_per_group = max;
    }
    if let Some(strategy) = options.strategy {
        grouping.strategy = strategy;
    }
    let rcd_groups = group_by_shared_rcd(&circuits, devices, &grouping);

    let boards = planned_boards(project, &circuits)
        .into_iter()
        .map(|board_id| {
            let supplies: Vec<SupplyChain> = find_all_networks_for_board(&project.networks, &board_id)
                .into_iter()
                .map(|network| SupplyChain {
                    network_id: network.id.clone(),
                    network_name: network.name.clone(),
                    devices: resolve_upstream_devices(network, devices),
                })
                .collect();
            let upstream = supplies.first().map(|s| s.devices.as_slice()).unwrap_or(&[]);
            let cabinet = cabinet_layout(
                &board_id,
                &circuits,
                &rcd_groups,
                upstream,
                devices,
                options.rail_width_te,
            );
            BoardPlan {
                board_name: project.board_name(&board_id).to_string(),
                board_id,
                supplies,
                cabinet,
            }
        })
        .collect::<Vec<_>>();

    tracing::info!(
        project = %project.name,
        circuits = circuits.len(),
        rcd_groups = rcd_groups.len(),
        boards = boards.len(),
        "derived plan"
    );

    DerivedPlan {
        circuits,
        rcd_groups,
        boards,
    }
}
