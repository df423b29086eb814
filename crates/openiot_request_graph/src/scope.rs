// SPDX-License-Identifier: MIT OR Apache-2.0
//! Endpoint scope compatibility.
//!
//! Two scopes are compatible when they are the same string or when both
//! belong to the same declared [`ScopeFamily`]. Scopes built from the sensor
//! catalog carry a [`SENSOR_SCOPE_PREFIX`]; family lookup ignores it, exact
//! matching does not.

use serde::{Deserialize, Serialize};

/// Prefix the sensor catalog puts in front of measurement scopes
pub const SENSOR_SCOPE_PREFIX: &str = "sensor_";

/// Generic numeric scope
pub const NUMBER: &str = "Number";
/// Integer scope
pub const INTEGER: &str = "Integer";
/// Long integer scope
pub const LONG: &str = "Long";
/// Single precision scope
pub const FLOAT: &str = "Float";
/// Double precision scope
pub const DOUBLE: &str = "Double";
/// Date/time scope
pub const DATE: &str = "Date";
/// Sensor selection scope (filter input of a source node)
pub const SENSOR: &str = "Sensor";
/// Latitude scope
pub const GEO_LAT: &str = "geo_lat";
/// Longitude scope
pub const GEO_LON: &str = "geo_lon";

/// A declared bucket of mutually compatible scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeFamily {
    /// `Number`, `Integer`, `Long`, `Float`, `Double`
    Numeric,
}

impl ScopeFamily {
    /// Scopes that belong to this family
    pub fn members(self) -> &'static [&'static str] {
        match self {
            Self::Numeric => &[NUMBER, INTEGER, LONG, FLOAT, DOUBLE],
        }
    }

    /// Look up the family of a scope, if it has one
    pub fn of(scope: &str) -> Option<Self> {
        let base = base_scope(scope);
        [Self::Numeric]
            .into_iter()
            .find(|family| family.members().contains(&base))
    }
}

/// Strip the sensor prefix, if present
pub fn base_scope(scope: &str) -> &str {
    scope.strip_prefix(SENSOR_SCOPE_PREFIX).unwrap_or(scope)
}

/// Check whether two scopes may be wired together
pub fn compatible(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    match (ScopeFamily::of(a), ScopeFamily::of(b)) {
        (Some(fa), Some(fb)) => fa == fb,
        _ => false,
    }
}
