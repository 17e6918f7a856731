//! Bill of materials: parts list, order list and symbol summary.

use std::collections::BTreeMap;

use ep_catalog::{ArticleKind, SymbolCatalog};
use ep_core::SymbolKey;
use ep_project::PlacedSymbol;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartsRow {
    pub description: String,
    pub kind: ArticleKind,
    pub unit: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartsList {
    pub rows: Vec<PartsRow>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub description: String,
    pub unit: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCount {
    pub key: SymbolKey,
    pub label: String,
    pub count: usize,
}

/// All article lines of all symbols, aggregated by
/// (description, kind, unit, unit price) and sorted by description.
pub fn parts_list(symbols: &[PlacedSymbol]) -> PartsList {
    // The price is keyed by its bit pattern; identical prices compare equal.
    let mut rows: BTreeMap<(String, String, String, u64), PartsRow> = BTreeMap::new();
    for article in symbols.iter().flat_map(|s| &s.articles) {
        let kind = match article.kind {
            ArticleKind::Material => "material",
            ArticleKind::Service => "service",
        };
        let key = (
            article.description.clone(),
            kind.to_string(),
            article.unit.clone(),
            article.unit_price.to_bits(),
        );
        let row = rows.entry(key).or_insert_with(|| PartsRow {
            description: article.description.clone(),
            kind: article.kind,
            unit: article.unit.clone(),
            unit_price: article.unit_price,
            quantity: 0.0,
            total: 0.0,
        });
        row.quantity += article.quantity;
    }

    let mut list = PartsList::default();
    for mut row in rows.into_values() {
        row.total = row.quantity * row.unit_price;
        list.total += row.total;
        list.rows.push(row);
    }
    list
}

/// Material lines only, aggregated by (description, unit).
pub fn order_list(symbols: &[PlacedSymbol]) -> Vec<OrderRow> {
    let mut rows: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for article in symbols
        .iter()
        .flat_map(|s| &s.articles)
        .filter(|a| a.kind == ArticleKind::Material)
    {
        *rows
            .entry((article.description.as_str(), article.unit.as_str()))
            .or_default() += article.quantity;
    }
    rows.into_iter()
        .map(|((description, unit), quantity)| OrderRow {
            description: description.to_string(),
            unit: unit.to_string(),
            quantity,
        })
        .collect()
}

/// Number of placed symbols per type, sorted by label. Unknown types are
/// listed under their key.
pub fn symbol_summary(symbols: &[PlacedSymbol], catalog: &SymbolCatalog) -> Vec<SymbolCount> {
    let mut counts: BTreeMap<&SymbolKey, usize> = BTreeMap::new();
    for symbol in symbols {
        *counts.entry(&symbol.symbol_key).or_default() += 1;
    }
    let mut rows: Vec<SymbolCount> = counts
        .into_iter()
        .map(|(key, count)| SymbolCount {
            key: key.clone(),
            label: catalog
                .find(key)
                .map_or_else(|| key.to_string(), |d| d.label.clone()),
            count,
        })
        .collect();
    rows.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.key.cmp(&b.key)));
    rows
}
