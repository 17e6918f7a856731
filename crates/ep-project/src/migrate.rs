//! Schema migration framework.
//!
//! Each step is a total function from version `n` to `n + 1`; loading applies
//! them in order until the project reaches [`LATEST_VERSION`].

use crate::ProjectError;
use crate::schema::{BoardDef, Project};
use ep_core::BoardId;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        let from = project.version;
        project = migrate_one_version(project)?;
        tracing::debug!(from, to = project.version, "migrated project schema");
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        1 => migrate_v1_to_v2(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 stored "automatic" RCD assignments as an empty group id.
fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    for ov in &mut project.rcd_overrides {
        if ov
            .rcd_group_id
            .as_ref()
            .is_some_and(|id| id.as_str().trim().is_empty())
        {
            ov.rcd_group_id = None;
        }
    }
    project.version = 1;
    Ok(project)
}

/// Version 1 kept the board as free text in the symbol attributes. The text
/// is matched against board ids, then board names; unmatched labels become
/// new boards.
fn migrate_v1_to_v2(mut project: Project) -> Result<Project, ProjectError> {
    for idx in 0..project.symbols.len() {
        let Some(label) = project.symbols[idx].attributes.board_label.take() else {
            continue;
        };
        let label = label.trim().to_string();
        if label.is_empty() || project.symbols[idx].board_id.is_some() {
            continue;
        }

        let board_id = match project
            .boards
            .iter()
            .find(|b| b.id.as_str() == label)
            .or_else(|| project.boards.iter().find(|b| b.name == label))
        {
            Some(board) => board.id.clone(),
            None => {
                let id = BoardId::new(label.clone());
                project.boards.push(BoardDef {
                    id: id.clone(),
                    name: label,
                });
                id
            }
        };
        project.symbols[idx].board_id = Some(board_id);
    }

    project.version = 2;
    Ok(project)
}
