//! Shared application service layer for elplan.
//!
//! This crate gives the CLI one interface over the backend crates: project
//! files, catalogs, and the full plan derivation with its cache.

pub mod cache;
pub mod error;
pub mod plan_service;
pub mod project_service;

pub use cache::{DerivationCache, plan_key};
pub use error::{AppError, AppResult};
pub use plan_service::{BoardPlan, DerivedPlan, PlanOptions, SupplyChain, derive_plan};
pub use project_service::{
    BoardSummary, device_catalog, get_board, list_boards, load_project, save_project,
    symbol_catalog, validate_project,
};
