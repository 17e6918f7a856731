//! Content-addressed memoization of derived plans.

use std::collections::{HashMap, VecDeque};

use ep_catalog::{DeviceLookup, SymbolCatalog};
use ep_project::Project;
use sha2::{Digest, Sha256};

use crate::plan_service::{DerivedPlan, PlanOptions, derive_plan};

const DEFAULT_CAPACITY: usize = 16;

/// Hash of everything in the project and options that derivation reads.
pub fn plan_key(project: &Project, options: &PlanOptions) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());

    let options_json = serde_json::to_string(options).unwrap_or_default();
    hasher.update(options_json.as_bytes());

    format!("{:x}", hasher.finalize())
}

/// Derived plans keyed by [`plan_key`], oldest evicted first.
///
/// Catalogs are not part of the key; a cache serves one pair of catalogs.
#[derive(Debug)]
pub struct DerivationCache {
    entries: HashMap<String, DerivedPlan>,
    order: VecDeque<String>,
    capacity: usize,
    hits: usize,
    misses: usize,
}

impl Default for DerivationCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DerivationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_derive(
        &mut self,
        project: &Project,
        symbols: &SymbolCatalog,
        devices: &impl DeviceLookup,
        options: &PlanOptions,
    ) -> &DerivedPlan {
        let key = plan_key(project, options);
        if self.entries.contains_key(&key) {
            self.hits += 1;
            tracing::debug!(key = %&key[..12], "derivation cache hit");
        } else {
            self.misses += 1;
            let plan = derive_plan(project, symbols, devices, options);
            while self.order.len() >= self.capacity {
                match self.order.pop_front() {
                    Some(old) => {
                        self.entries.remove(&old);
                    }
                    None => break,
                }
            }
            self.order.push_back(key.clone());
            self.entries.insert(key.clone(), plan);
        }
        &self.entries[&key]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
