//! Conduit Internal Areas (Chapter 9, Table 4)
//!
//! Total internal area (100 %) in mm² for the three raceway materials the
//! calculator supports. Rows are ascending by trade size; for every material
//! the area grows with trade size, which the "smallest conduit that fits"
//! scan depends on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Raceway material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConduitMaterial {
    /// Rigid PVC, Schedule 40
    #[default]
    #[serde(rename = "PVC40", alias = "Pvc40")]
    Pvc40,
    /// Electrical metallic tubing
    #[serde(rename = "EMT", alias = "Emt")]
    Emt,
    /// Rigid galvanized steel (ARG)
    #[serde(rename = "ARG", alias = "Arg")]
    Arg,
}

impl ConduitMaterial {
    /// All materials, in table column order
    pub const ALL: [ConduitMaterial; 3] = [ConduitMaterial::Pvc40, ConduitMaterial::Emt, ConduitMaterial::Arg];

    /// Short code used in tables and reports
    pub fn code(&self) -> &'static str {
        match self {
            ConduitMaterial::Pvc40 => "PVC40",
            ConduitMaterial::Emt => "EMT",
            ConduitMaterial::Arg => "ARG",
        }
    }

    /// Display name for reports and the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            ConduitMaterial::Pvc40 => "PVC Schedule 40",
            ConduitMaterial::Emt => "EMT (Electrical Metallic Tubing)",
            ConduitMaterial::Arg => "ARG (Rigid Galvanized Steel)",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace([' ', '-', '_'], "").as_str() {
            "PVC40" | "PVC" | "PVCSCH40" => Some(ConduitMaterial::Pvc40),
            "EMT" => Some(ConduitMaterial::Emt),
            "ARG" | "RMC" | "RIGID" => Some(ConduitMaterial::Arg),
            _ => None,
        }
    }
}

impl fmt::Display for ConduitMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One trade size with its internal area for each material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConduitSpec {
    /// Trade size label (e.g., "1/2\"")
    pub trade_size: &'static str,
    pub pvc40_mm2: f64,
    pub emt_mm2: f64,
    pub arg_mm2: f64,
}

impl ConduitSpec {
    /// Internal area for the given material (mm²)
    pub fn area_mm2(&self, material: ConduitMaterial) -> f64 {
        match material {
            ConduitMaterial::Pvc40 => self.pvc40_mm2,
            ConduitMaterial::Emt => self.emt_mm2,
            ConduitMaterial::Arg => self.arg_mm2,
        }
    }
}

/// Conduit table, ascending by trade size.
pub static CONDUITS: [ConduitSpec; 9] = [
    ConduitSpec { trade_size: "1/2\"", pvc40_mm2: 184.0, emt_mm2: 196.0, arg_mm2: 204.0 },
    ConduitSpec { trade_size: "3/4\"", pvc40_mm2: 327.0, emt_mm2: 343.0, arg_mm2: 353.0 },
    ConduitSpec { trade_size: "1\"", pvc40_mm2: 535.0, emt_mm2: 556.0, arg_mm2: 573.0 },
    ConduitSpec { trade_size: "1-1/4\"", pvc40_mm2: 935.0, emt_mm2: 968.0, arg_mm2: 984.0 },
    ConduitSpec { trade_size: "1-1/2\"", pvc40_mm2: 1282.0, emt_mm2: 1314.0, arg_mm2: 1333.0 },
    ConduitSpec { trade_size: "2\"", pvc40_mm2: 2124.0, emt_mm2: 2165.0, arg_mm2: 2198.0 },
    ConduitSpec { trade_size: "2-1/2\"", pvc40_mm2: 3029.0, emt_mm2: 3783.0, arg_mm2: 3137.0 },
    ConduitSpec { trade_size: "3\"", pvc40_mm2: 4693.0, emt_mm2: 5701.0, arg_mm2: 4840.0 },
    ConduitSpec { trade_size: "4\"", pvc40_mm2: 8091.0, emt_mm2: 9521.0, arg_mm2: 8316.0 },
];

/// Trade sizes are typed with or without the inch mark.
fn same_trade_size(tabulated: &str, wanted: &str) -> bool {
    tabulated.trim_end_matches('"') == wanted.trim().trim_end_matches('"')
}

/// Look up a conduit row by trade size.
pub fn conduit(trade_size: &str, material: ConduitMaterial) -> CalcResult<&'static ConduitSpec> {
    CONDUITS
        .iter()
        .find(|c| same_trade_size(c.trade_size, trade_size))
        .ok_or_else(|| CalcError::unknown_trade_size(trade_size, material.code()))
}

/// Internal area (mm²) of a trade size in a given material.
///
/// # Example
///
/// ```rust
/// use circuit_core::tables::{conduit_area, ConduitMaterial};
///
/// assert_eq!(conduit_area("1/2\"", ConduitMaterial::Pvc40).unwrap(), 184.0);
/// assert!(conduit_area("5\"", ConduitMaterial::Emt).is_err());
/// ```
pub fn conduit_area(trade_size: &str, material: ConduitMaterial) -> CalcResult<f64> {
    conduit(trade_size, material).map(|c| c.area_mm2(material))
}

/// Smallest conduit of `material` whose internal area is at least `required_mm2`.
pub fn smallest_conduit_with_area(required_mm2: f64, material: ConduitMaterial) -> Option<&'static ConduitSpec> {
    CONDUITS.iter().find(|c| c.area_mm2(material) >= required_mm2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_monotonic_per_material() {
        for material in ConduitMaterial::ALL {
            for pair in CONDUITS.windows(2) {
                assert!(
                    pair[1].area_mm2(material) > pair[0].area_mm2(material),
                    "{} {} vs {}",
                    material,
                    pair[0].trade_size,
                    pair[1].trade_size
                );
            }
        }
    }

    #[test]
    fn test_lookup_with_and_without_inch_mark() {
        assert_eq!(conduit_area("3/4\"", ConduitMaterial::Emt).unwrap(), 343.0);
        assert_eq!(conduit_area("3/4", ConduitMaterial::Emt).unwrap(), 343.0);
        assert_eq!(conduit_area("1-1/4", ConduitMaterial::Arg).unwrap(), 984.0);
    }

    #[test]
    fn test_unknown_trade_size() {
        let err = conduit_area("6\"", ConduitMaterial::Pvc40).unwrap_err();
        assert_eq!(err, CalcError::unknown_trade_size("6\"", "PVC40"));
    }

    #[test]
    fn test_smallest_conduit() {
        assert_eq!(
            smallest_conduit_with_area(33.1, ConduitMaterial::Pvc40).unwrap().trade_size,
            "1/2\""
        );
        // Exactly the tabulated area fits
        assert_eq!(
            smallest_conduit_with_area(327.0, ConduitMaterial::Pvc40).unwrap().trade_size,
            "3/4\""
        );
        assert!(smallest_conduit_with_area(10_000.0, ConduitMaterial::Emt).is_none());
    }

    #[test]
    fn test_material_serialization() {
        let json = serde_json::to_string(&ConduitMaterial::Pvc40).unwrap();
        assert_eq!(json, "\"PVC40\"");
        let parsed: ConduitMaterial = serde_json::from_str("\"ARG\"").unwrap();
        assert_eq!(parsed, ConduitMaterial::Arg);
    }

    #[test]
    fn test_material_flexible_parse() {
        assert_eq!(ConduitMaterial::from_str_flexible("pvc 40"), Some(ConduitMaterial::Pvc40));
        assert_eq!(ConduitMaterial::from_str_flexible("emt"), Some(ConduitMaterial::Emt));
        assert_eq!(ConduitMaterial::from_str_flexible("steel"), None);
    }
}
