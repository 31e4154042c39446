use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::generators::fallback::DefaultGenerator;

/// Summary of one `build*` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub type_name: String,
    pub instances: u64,
    pub seed: u64,
    pub generator_usage: BTreeMap<String, u64>,
    pub fallback_count: u64,
    pub manual_values_applied: u64,
    pub invalidations_applied: u64,
    /// Paths left absent by the nesting limit or the list recursion guard.
    pub truncated_paths: Vec<String>,
    /// Lists grown past their drawn size so an override's index exists.
    #[serde(default)]
    pub widened_lists: Vec<String>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, type_name: impl Into<String>, seed: u64) -> Self {
        Self {
            run_id,
            type_name: type_name.into(),
            seed,
            ..Self::default()
        }
    }

    pub fn record_generator_usage(&mut self, id: &str) {
        *self.generator_usage.entry(id.to_string()).or_insert(0) += 1;
        if id == DefaultGenerator::ID {
            self.fallback_count += 1;
        }
    }

    pub fn record_manual_value(&mut self) {
        self.manual_values_applied += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations_applied += 1;
    }

    pub fn record_truncation(&mut self, path: String) {
        self.truncated_paths.push(path);
    }

    pub fn record_widened_list(&mut self, path: String) {
        self.widened_lists.push(path);
    }
}
