//! ep-engine: pure derivation functions over an installation plan.
//!
//! Provides:
//! - Circuit derivation with per-role requirement merging and device selection
//! - Shared-RCD grouping with manual pins and a group-size limit
//! - Upstream supply-chain resolution per network
//! - Bill of materials and cabinet layout
//!
//! Every function here borrows its inputs and returns fresh values; nothing
//! is cached or mutated in place.
//!
//! # Example
//!
//! ```
//! use ep_catalog::{builtin_devices, builtin_symbols};
//! use ep_engine::{CircuitInputs, RcdGroupingOptions, derive_circuits, group_by_shared_rcd};
//! use ep_project::Project;
//!
//! let mut project = Project::new("Demo");
//! project.symbols.push(serde_yaml::from_str(
//!     "id: s1\nsymbol_key: grounded_socket\nroom_id: r1\nboard_id: hv\n",
//! ).unwrap());
//!
//! let devices = builtin_devices();
//! let circuits = derive_circuits(&CircuitInputs::from_project(&project), &builtin_symbols(), &devices);
//! let groups = group_by_shared_rcd(&circuits, &devices, &RcdGroupingOptions::from_project(&project));
//!
//! assert_eq!(circuits.len(), 1);
//! assert_eq!(groups[0].circuit_ids, vec![circuits[0].id.clone()]);
//! ```

pub mod bom;
pub mod cabinet;
pub mod circuit;
pub mod derive;
pub mod merge;
pub mod rcd;
pub mod upstream;

pub use bom::{OrderRow, PartsList, PartsRow, SymbolCount, order_list, parts_list, symbol_summary};
pub use cabinet::{CabinetLayout, DEFAULT_RAIL_WIDTH_TE, RailEntry, RailSource, cabinet_layout};
pub use circuit::{
    CircuitOrigin, ConflictField, DerivedCircuit, MergeConflict, circuit_devices_without_rcd,
};
pub use derive::{CircuitInputs, derive_circuits};
pub use merge::{MergedRequirements, merge_requirements};
pub use rcd::{
    RcdGroup, RcdGroupingOptions, group_by_shared_rcd, new_manual_group_id, shareable_rcd,
};
pub use upstream::{
    UpstreamDevice, UpstreamSlot, find_all_networks_for_board, find_network_for_board,
    resolve_upstream_devices,
};
