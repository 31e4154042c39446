use serde::{Deserialize, Serialize};

/// Process-level flags handed once to configurable generators before a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Passport parts use the national layout (`1234`, `123456`, `123-456`)
    /// instead of the international one.
    pub national_passport_format: bool,
    /// Tax ids are 10-digit legal-entity numbers instead of 12-digit
    /// individual numbers.
    pub legal_entity_tax_id: bool,
}

impl GlobalConfig {
    pub fn with_national_passport_format(mut self, enabled: bool) -> Self {
        self.national_passport_format = enabled;
        self
    }

    pub fn with_legal_entity_tax_id(mut self, enabled: bool) -> Self {
        self.legal_entity_tax_id = enabled;
        self
    }
}
