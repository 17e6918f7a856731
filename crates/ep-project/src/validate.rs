//! Project validation logic.
//!
//! Validation covers structural integrity only. Overrides are advisory
//! annotations keyed by id and are never rejected for pointing at circuits
//! or groups that no longer exist.

use crate::schema::{PlacedSymbol, Project};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn ensure_unique<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    context: &str,
) -> Result<HashSet<&'a str>, ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                context: context.to_string(),
            });
        }
    }
    Ok(seen)
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    if project.max_per_rcd == 0 {
        return Err(ValidationError::InvalidValue {
            field: "max_per_rcd".to_string(),
            value: "0".to_string(),
            reason: "an RCD must protect at least one circuit".to_string(),
        });
    }

    let room_ids = ensure_unique(project.building.rooms().map(|r| r.id.as_str()), "rooms")?;
    let board_ids = ensure_unique(project.boards.iter().map(|b| b.id.as_str()), "boards")?;
    let symbol_ids = ensure_unique(project.symbols.iter().map(|s| s.id.as_str()), "symbols")?;
    ensure_unique(project.cables.iter().map(|c| c.id.as_str()), "cables")?;
    ensure_unique(project.networks.iter().map(|n| n.id.as_str()), "networks")?;

    for symbol in &project.symbols {
        validate_symbol(symbol, &room_ids, &board_ids)?;
    }

    for cable in &project.cables {
        for symbol_id in &cable.symbol_ids {
            if !symbol_ids.contains(symbol_id.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: symbol_id.to_string(),
                    context: format!("cable '{}' symbol_ids", cable.id),
                });
            }
        }
        if let Some(length) = cable.length_m
            && (!length.is_finite() || length < 0.0)
        {
            return Err(ValidationError::InvalidValue {
                field: format!("cable '{}' length_m", cable.id),
                value: length.to_string(),
                reason: "must be a non-negative length".to_string(),
            });
        }
    }

    for network in &project.networks {
        for board_id in &network.board_ids {
            if !board_ids.contains(board_id.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: board_id.to_string(),
                    context: format!("network '{}' board_ids", network.id),
                });
            }
        }
    }

    Ok(())
}

fn validate_symbol(
    symbol: &PlacedSymbol,
    room_ids: &HashSet<&str>,
    board_ids: &HashSet<&str>,
) -> Result<(), ValidationError> {
    if !room_ids.contains(symbol.room_id.as_str()) {
        return Err(ValidationError::MissingReference {
            id: symbol.room_id.to_string(),
            context: format!("symbol '{}' room_id", symbol.id),
        });
    }

    if let Some(board_id) = &symbol.board_id
        && !board_ids.contains(board_id.as_str())
    {
        return Err(ValidationError::MissingReference {
            id: board_id.to_string(),
            context: format!("symbol '{}' board_id", symbol.id),
        });
    }

    for article in &symbol.articles {
        if !article.quantity.is_finite() || article.quantity < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("symbol '{}' article '{}' quantity", symbol.id, article.id),
                value: article.quantity.to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }
        if !article.unit_price.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("symbol '{}' article '{}' unit_price", symbol.id, article.id),
                value: article.unit_price.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BoardDef, Building, Floor, NetworkConfig, NetworkType, Room};

    fn project_with_room() -> Project {
        let mut project = Project::new("t");
        project.building = Building {
            id: "g".into(),
            name: "Haus".into(),
            floors: vec![Floor {
                id: "eg".into(),
                name: "EG".into(),
                rooms: vec![Room {
                    id: "r1".into(),
                    name: "Wohnzimmer".into(),
                }],
            }],
        };
        project.boards.push(BoardDef {
            id: "hv".into(),
            name: "HV".into(),
        });
        project
    }

    fn socket(id: &str, room: &str) -> PlacedSymbol {
        serde_yaml::from_str(&format!(
            "id: {id}\nsymbol_key: grounded_socket\nroom_id: {room}\n"
        ))
        .unwrap()
    }

    #[test]
    fn valid_project_passes() {
        let mut project = project_with_room();
        project.symbols.push(socket("s1", "r1"));
        validate_project(&project).unwrap();
    }

    #[test]
    fn duplicate_symbol_ids_rejected() {
        let mut project = project_with_room();
        project.symbols.push(socket("s1", "r1"));
        project.symbols.push(socket("s1", "r1"));
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn unknown_room_rejected() {
        let mut project = project_with_room();
        project.symbols.push(socket("s1", "r-missing"));
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn network_must_reference_known_boards() {
        let mut project = project_with_room();
        let mut net = NetworkConfig::new("n1".into(), "Hausanschluss", NetworkType::HouseConnection);
        net.board_ids.push("uv".into());
        project.networks.push(net);
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn zero_max_per_rcd_rejected() {
        let mut project = project_with_room();
        project.max_per_rcd = 0;
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn stale_overrides_are_not_errors() {
        let mut project = project_with_room();
        project.rcd_overrides.push(crate::schema::RcdGroupOverride {
            circuit_id: "sk-gone".into(),
            rcd_group_id: Some("manual-hv-1".into()),
        });
        validate_project(&project).unwrap();
    }
}
