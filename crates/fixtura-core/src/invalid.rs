use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::ScalarType;

/// Ways a generated value may deliberately violate its declared constraints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvalidityKind {
    TooShort,
    TooLong,
    ContainsForbiddenCharacters,
    InvalidEmail,
    TooFarInFutureDate,
    TooOldDate,
}

impl InvalidityKind {
    pub const ALL: [InvalidityKind; 6] = [
        Self::TooShort,
        Self::TooLong,
        Self::ContainsForbiddenCharacters,
        Self::InvalidEmail,
        Self::TooFarInFutureDate,
        Self::TooOldDate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TooShort => "TOO_SHORT",
            Self::TooLong => "TOO_LONG",
            Self::ContainsForbiddenCharacters => "CONTAINS_FORBIDDEN_CHARACTERS",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::TooFarInFutureDate => "TOO_FAR_IN_FUTURE_DATE",
            Self::TooOldDate => "TOO_OLD_DATE",
        }
    }

    /// Whether a value of `scalar` type can carry this kind of violation.
    pub fn applies_to(self, scalar: ScalarType) -> bool {
        match self {
            Self::TooShort | Self::TooLong => matches!(
                scalar,
                ScalarType::Text | ScalarType::Integer | ScalarType::Decimal
            ),
            Self::ContainsForbiddenCharacters | Self::InvalidEmail => scalar == ScalarType::Text,
            Self::TooFarInFutureDate | Self::TooOldDate => scalar == ScalarType::Date,
        }
    }
}

impl fmt::Display for InvalidityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidityKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| Error::Other(format!("unknown invalidity kind '{value}'")))
    }
}
