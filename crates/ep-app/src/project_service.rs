//! Project loading, saving, validation, and introspection.

use std::collections::BTreeMap;
use std::path::Path;

use ep_catalog::{DeviceCatalog, SymbolCatalog, builtin_devices, builtin_symbols};
use ep_core::{BoardId, NetworkId};
use ep_project::{BoardDef, Project};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Summary of a board for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSummary {
    pub id: BoardId,
    pub name: String,
    pub symbol_count: usize,
    pub network_ids: Vec<NetworkId>,
    /// `false` when only symbols reference this board id.
    pub declared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
}

fn file_format(path: &Path) -> AppResult<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(FileFormat::Yaml),
        Some("json") => Ok(FileFormat::Json),
        _ => Err(AppError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load, migrate and validate a project from a `.yaml`/`.yml` or `.json` file.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let format = file_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let project = match format {
        FileFormat::Yaml => ep_project::from_yaml_str(&content)?,
        FileFormat::Json => ep_project::from_json_str(&content)?,
    };
    tracing::debug!(
        path = %path.display(),
        symbols = project.symbols.len(),
        boards = project.boards.len(),
        "loaded project"
    );
    Ok(project)
}

/// Validate and save a project; the format follows the file extension.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    let format = file_format(path)?;
    validate_project(project)?;
    let content = match format {
        FileFormat::Yaml => serde_yaml::to_string(project)?,
        FileFormat::Json => serde_json::to_string_pretty(project)?,
    };

    std::fs::write(path, content).map_err(|e| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    ep_project::validate_project(project)?;
    Ok(())
}

/// Boards in declaration order, followed by board ids that symbols use
/// without a declaration (including the unassigned bucket).
pub fn list_boards(project: &Project) -> Vec<BoardSummary> {
    let mut counts: BTreeMap<BoardId, usize> = BTreeMap::new();
    for symbol in &project.symbols {
        let board = symbol.board_id.clone().unwrap_or_else(BoardId::unassigned);
        *counts.entry(board).or_default() += 1;
    }

    let networks_of = |board: &BoardId| -> Vec<NetworkId> {
        project
            .networks
            .iter()
            .filter(|n| n.feeds(board))
            .map(|n| n.id.clone())
            .collect()
    };

    let mut summaries: Vec<BoardSummary> = project
        .boards
        .iter()
        .map(|b| BoardSummary {
            id: b.id.clone(),
            name: b.name.clone(),
            symbol_count: counts.remove(&b.id).unwrap_or(0),
            network_ids: networks_of(&b.id),
            declared: true,
        })
        .collect();

    summaries.extend(counts.into_iter().map(|(id, symbol_count)| BoardSummary {
        name: id.to_string(),
        network_ids: networks_of(&id),
        id,
        symbol_count,
        declared: false,
    }));
    summaries
}

pub fn get_board<'a>(project: &'a Project, board_id: &str) -> AppResult<&'a BoardDef> {
    project
        .boards
        .iter()
        .find(|b| b.id.as_str() == board_id)
        .ok_or_else(|| AppError::BoardNotFound(board_id.to_string()))
}

/// The built-in symbol catalog.
pub fn symbol_catalog() -> SymbolCatalog {
    builtin_symbols()
}

/// The device catalog at `path`, or the built-in one.
pub fn device_catalog(path: Option<&Path>) -> AppResult<DeviceCatalog> {
    match path {
        Some(path) => {
            let catalog = DeviceCatalog::load_yaml(path)?;
            tracing::debug!(path = %path.display(), devices = catalog.len(), "loaded device catalog");
            Ok(catalog)
        }
        None => Ok(builtin_devices()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ep_project::{NetworkConfig, NetworkType};

    fn project() -> Project {
        let mut project = Project::new("Test");
        project.boards.push(BoardDef {
            id: "hv".into(),
            name: "HV-EG".into(),
        });
        project.boards.push(BoardDef {
            id: "uv".into(),
            name: "UV-OG".into(),
        });
        let mut net = NetworkConfig::new("n1".into(), "Hausanschluss", NetworkType::HouseConnection);
        net.board_ids.push("uv".into());
        project.networks.push(net);
        for (id, board) in [("s1", Some("hv")), ("s2", Some("hv")), ("s3", None), ("s4", Some("alt"))] {
            let mut symbol: ep_project::PlacedSymbol = serde_yaml::from_str(&format!(
                "id: {id}\nsymbol_key: grounded_socket\nroom_id: r1\n"
            ))
            .unwrap();
            symbol.board_id = board.map(BoardId::from);
            project.symbols.push(symbol);
        }
        project
    }

    #[test]
    fn boards_are_listed_with_undeclared_ones_last() {
        let boards = list_boards(&project());
        let ids: Vec<&str> = boards.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["hv", "uv", "alt", "unassigned"]);
        assert_eq!(boards[0].symbol_count, 2);
        assert_eq!(boards[1].symbol_count, 0);
        assert_eq!(boards[1].network_ids, vec![NetworkId::from("n1")]);
        assert!(boards[..2].iter().all(|b| b.declared));
        assert!(boards[2..].iter().all(|b| !b.declared));
        assert_eq!(boards[2].symbol_count, 1);
        assert_eq!(boards[3].symbol_count, 1);
    }

    #[test]
    fn unknown_board_is_an_error() {
        let project = project();
        assert_eq!(get_board(&project, "hv").unwrap().name, "HV-EG");
        assert!(matches!(
            get_board(&project, "nope"),
            Err(AppError::BoardNotFound(_))
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let result = load_project(Path::new("plan.txt"));
        assert!(matches!(result, Err(AppError::UnsupportedFormat { .. })));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = std::env::temp_dir().join("ep_app_missing_project.yaml");
        let _ = std::fs::remove_file(&path);
        match load_project(&path) {
            Err(AppError::ProjectFileRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
