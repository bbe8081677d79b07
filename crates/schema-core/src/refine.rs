//! Refinements: checks attached to a node that are not plain structural constraints.

use bson::Bson;
use serde::{Deserialize, Serialize};

/// A post-structural check attached to an object or array node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Refinement {
    /// Fails when a mapping's entry count falls outside `[min, max]`.
    PropertyCount {
        /// Minimum number of entries
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<u64>,
        /// Maximum number of entries
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u64>,
    },
    /// Fails when the sequence contains a duplicate element under value equality.
    UniqueItems,
}

impl Refinement {
    /// Run the check against an already structurally valid value.
    ///
    /// Returns the failure message on rejection.
    pub fn check(&self, value: &Bson) -> Result<(), String> {
        match (self, value) {
            (Self::PropertyCount { min, max }, Bson::Document(doc)) => {
                let count = doc.len() as u64;
                if min.is_some_and(|min| count < min) || max.is_some_and(|max| count > max) {
                    return Err(format!(
                        "expected between {} and {} properties, found {count}",
                        min.map_or_else(|| "0".to_string(), |m| m.to_string()),
                        max.map_or_else(|| "unbounded".to_string(), |m| m.to_string()),
                    ));
                }
                Ok(())
            }
            (Self::UniqueItems, Bson::Array(items)) => {
                for (i, a) in items.iter().enumerate() {
                    if let Some(j) = items[i + 1..].iter().position(|b| values_equal(a, b)) {
                        return Err(format!(
                            "duplicate elements at index {i} and {}",
                            i + 1 + j
                        ));
                    }
                }
                Ok(())
            }
            (Self::PropertyCount { .. }, _) => Err("property count applies to documents".into()),
            (Self::UniqueItems, _) => Err("unique items applies to arrays".into()),
        }
    }
}

/// Numeric view of a BSON value, if it is a number.
///
/// Decimal128 values go through their text form and may lose precision.
pub(crate) fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => d.to_string().parse().ok(),
        _ => None,
    }
}

/// Full value equality.
///
/// Numbers compare by value across int32, int64, double and decimal128; documents compare
/// key by key regardless of key order.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x == y;
    }
    match (a, b) {
        (Bson::Array(xs), Bson::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Bson::Document(x), Bson::Document(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => a == b,
    }
}
