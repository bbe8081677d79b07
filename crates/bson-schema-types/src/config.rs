//! Conversion options for the schema → descriptor direction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a number node picks its `bsonType`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberPolicy {
    /// One kind: `int` for integer-only numbers, `double` otherwise.
    /// `long` and `decimal` are never produced.
    #[default]
    Single,
    /// Every numeric kind a value could be stored as, narrowed by the declared
    /// range, emitted as an `anyOf`.
    Ambiguous,
}

impl fmt::Display for NumberPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Ambiguous => f.write_str("ambiguous"),
        }
    }
}

impl FromStr for NumberPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(Self::Single),
            "ambiguous" => Ok(Self::Ambiguous),
            other => Err(format!("unknown number policy: {other}")),
        }
    }
}

/// Options for [`crate::forward::schema_to_bson_with_config`].
///
/// # Example
///
/// ```rust
/// use bson_schema_types::{ConversionConfig, NumberPolicy};
///
/// let config = ConversionConfig::new()
///     .with_nullable_widening(false)
///     .with_number_policy(NumberPolicy::Ambiguous);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Emit `anyOf: [T, {bsonType: null}]` for nullable nodes.
    /// When off, nullability is dropped.
    pub nullable_widening: bool,
    /// Numeric kind selection.
    pub number_policy: NumberPolicy,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            nullable_widening: true,
            number_policy: NumberPolicy::Single,
        }
    }
}

impl ConversionConfig {
    /// Create a configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn nullable widening on or off.
    pub fn with_nullable_widening(mut self, enabled: bool) -> Self {
        self.nullable_widening = enabled;
        self
    }

    /// Set the numeric kind policy.
    pub fn with_number_policy(mut self, policy: NumberPolicy) -> Self {
        self.number_policy = policy;
        self
    }
}
