use thiserror::Error;

use fixtura_core::InvalidityKind;

/// Errors emitted while building fixtures.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no generator supports field '{field}' at '{path}'")]
    UnsupportedField { path: String, field: String },
    #[error("override path '{pattern}' does not fit the schema at field '{field}' ({reason})")]
    MalformedPath {
        pattern: String,
        field: String,
        reason: String,
    },
    #[error("invalidity kind {kind} cannot apply to {scalar} field at '{path}'")]
    UnsupportedInvalidity {
        path: String,
        kind: InvalidityKind,
        scalar: String,
    },
    #[error("field at '{path}' does not declare invalidity kind {kind}")]
    UndeclaredInvalidity { path: String, kind: InvalidityKind },
    #[error("unknown schema type '{0}'")]
    UnknownType(String),
    #[error("no value provider data for locale '{0}'")]
    UnsupportedLocale(String),
    #[error("invalid override: {0}")]
    InvalidOverride(String),
    #[error("schema error: {0}")]
    Schema(#[from] fixtura_core::Error),
    #[error("generation failed at '{path}': {source}")]
    Failed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerationError {
    pub fn failed(
        path: impl ToString,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Failed {
            path: path.to_string(),
            source: source.into(),
        }
    }
}
