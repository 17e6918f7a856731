//! Symbol-type definitions.

use std::collections::HashMap;

use ep_core::{ArticleId, ProtectionProfile, SymbolKey};
use serde::{Deserialize, Serialize};

use crate::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolCategory {
    Socket,
    Switch,
    Light,
    Sensor,
    Safety,
    Smarthome,
    Network,
    Homedevice,
    Distributor,
    Grounding,
    Intercom,
    Others,
}

impl SymbolCategory {
    pub fn label(self) -> &'static str {
        match self {
            SymbolCategory::Socket => "Steckdosen",
            SymbolCategory::Switch => "Schalter",
            SymbolCategory::Light => "Beleuchtung",
            SymbolCategory::Sensor => "Sensoren",
            SymbolCategory::Safety => "Sicherheit",
            SymbolCategory::Smarthome => "Smart Home",
            SymbolCategory::Network => "Netzwerk",
            SymbolCategory::Homedevice => "Hausgeräte",
            SymbolCategory::Distributor => "Verteiler",
            SymbolCategory::Grounding => "Erdung",
            SymbolCategory::Intercom => "Sprechanlage",
            SymbolCategory::Others => "Sonstiges",
        }
    }
}

/// Free-form attributes of a placed symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Attributes {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub mount_height_cm: u32,
    #[serde(default)]
    pub cable_type: String,
    /// Free-text board label written by schema version 1. Migrated into the
    /// symbol's `board_id` and cleared on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KnxVariant {
    #[default]
    Standard,
    Premium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KnxProperties {
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub variant: KnxVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleKind {
    Material,
    Service,
}

/// A billable material or service line attached to a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleLine {
    pub id: ArticleId,
    pub description: String,
    pub kind: ArticleKind,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
}

/// Catalog entry for one symbol type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    pub key: SymbolKey,
    pub label: String,
    pub category: SymbolCategory,
    #[serde(default)]
    pub default_attributes: Attributes,
    #[serde(default)]
    pub default_knx: KnxProperties,
    #[serde(default)]
    pub default_articles: Vec<ArticleLine>,
    #[serde(default)]
    pub is_distributor: bool,
    #[serde(default)]
    pub protection: ProtectionProfile,
}

/// Symbol-type catalog keyed by [`SymbolKey`].
#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    definitions: Vec<SymbolDefinition>,
    by_key: HashMap<SymbolKey, usize>,
}

impl SymbolCatalog {
    pub fn from_definitions(definitions: Vec<SymbolDefinition>) -> CatalogResult<Self> {
        let mut by_key = HashMap::with_capacity(definitions.len());
        for (idx, def) in definitions.iter().enumerate() {
            if by_key.insert(def.key.clone(), idx).is_some() {
                return Err(CatalogError::Duplicate {
                    what: "symbol",
                    id: def.key.to_string(),
                });
            }
        }
        Ok(Self {
            definitions,
            by_key,
        })
    }

    pub fn find(&self, key: &SymbolKey) -> Option<&SymbolDefinition> {
        self.by_key.get(key).map(|&idx| &self.definitions[idx])
    }

    pub fn definitions(&self) -> &[SymbolDefinition] {
        &self.definitions
    }

    pub fn by_category(&self, category: SymbolCategory) -> impl Iterator<Item = &SymbolDefinition> {
        self.definitions
            .iter()
            .filter(move |def| def.category == category)
    }
}
