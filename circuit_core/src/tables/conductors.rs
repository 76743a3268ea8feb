//! Copper Building Wire (THW / THHN)
//!
//! Conductor properties combined from three code tables:
//!
//! - Ampacity: NEC/CEN Table 310.16, copper, 75 °C and 90 °C columns
//! - Area, diameter and kcmil: Chapter 9 Table 8 (stranded conductors)
//! - AC resistance and reactance: Chapter 9 Table 9 (PVC conduit, 60 Hz)
//!
//! Rows are ordered by ascending cross-section. Scans that look for "the
//! first gauge that satisfies X" rely on this order.

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};

/// One row of the conductor table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConductorSpec {
    /// Gauge label (e.g., "12 AWG", "2/0 AWG")
    pub gauge: &'static str,
    /// Conductor cross-sectional area (mm²)
    pub area_mm2: f64,
    /// Conductor outer diameter (mm)
    pub diameter_mm: f64,
    /// AC resistance (Ω/km)
    pub resistance_ohm_per_km: f64,
    /// Inductive reactance (Ω/km)
    pub reactance_ohm_per_km: f64,
    /// Allowable ampacity, 75 °C column (A)
    pub ampacity_75c_a: f64,
    /// Allowable ampacity, 90 °C column (A)
    pub ampacity_90c_a: f64,
    /// Thermal cross-section (kcmil)
    pub kcmil: f64,
}

/// Conductor table, ascending by area.
pub static CONDUCTORS: [ConductorSpec; 10] = [
    ConductorSpec {
        gauge: "14 AWG",
        area_mm2: 2.08,
        diameter_mm: 1.85,
        resistance_ohm_per_km: 10.17,
        reactance_ohm_per_km: 0.190,
        ampacity_75c_a: 20.0,
        ampacity_90c_a: 25.0,
        kcmil: 4.11,
    },
    ConductorSpec {
        gauge: "12 AWG",
        area_mm2: 3.31,
        diameter_mm: 2.32,
        resistance_ohm_per_km: 6.56,
        reactance_ohm_per_km: 0.177,
        ampacity_75c_a: 25.0,
        ampacity_90c_a: 30.0,
        kcmil: 6.53,
    },
    ConductorSpec {
        gauge: "10 AWG",
        area_mm2: 5.26,
        diameter_mm: 2.95,
        resistance_ohm_per_km: 3.94,
        reactance_ohm_per_km: 0.164,
        ampacity_75c_a: 35.0,
        ampacity_90c_a: 40.0,
        kcmil: 10.38,
    },
    ConductorSpec {
        gauge: "8 AWG",
        area_mm2: 8.37,
        diameter_mm: 3.71,
        resistance_ohm_per_km: 2.56,
        reactance_ohm_per_km: 0.171,
        ampacity_75c_a: 50.0,
        ampacity_90c_a: 55.0,
        kcmil: 16.51,
    },
    ConductorSpec {
        gauge: "6 AWG",
        area_mm2: 13.30,
        diameter_mm: 4.67,
        resistance_ohm_per_km: 1.61,
        reactance_ohm_per_km: 0.167,
        ampacity_75c_a: 65.0,
        ampacity_90c_a: 75.0,
        kcmil: 26.24,
    },
    ConductorSpec {
        gauge: "4 AWG",
        area_mm2: 21.15,
        diameter_mm: 5.89,
        resistance_ohm_per_km: 1.02,
        reactance_ohm_per_km: 0.157,
        ampacity_75c_a: 85.0,
        ampacity_90c_a: 95.0,
        kcmil: 41.74,
    },
    ConductorSpec {
        gauge: "2 AWG",
        area_mm2: 33.62,
        diameter_mm: 7.42,
        resistance_ohm_per_km: 0.62,
        reactance_ohm_per_km: 0.148,
        ampacity_75c_a: 115.0,
        ampacity_90c_a: 130.0,
        kcmil: 66.36,
    },
    ConductorSpec {
        gauge: "2/0 AWG",
        area_mm2: 67.43,
        diameter_mm: 10.50,
        resistance_ohm_per_km: 0.33,
        reactance_ohm_per_km: 0.135,
        ampacity_75c_a: 175.0,
        ampacity_90c_a: 195.0,
        kcmil: 133.1,
    },
    ConductorSpec {
        gauge: "3/0 AWG",
        area_mm2: 85.01,
        diameter_mm: 11.80,
        resistance_ohm_per_km: 0.253,
        reactance_ohm_per_km: 0.135,
        ampacity_75c_a: 200.0,
        ampacity_90c_a: 225.0,
        kcmil: 167.8,
    },
    ConductorSpec {
        gauge: "4/0 AWG",
        area_mm2: 107.2,
        diameter_mm: 13.30,
        resistance_ohm_per_km: 0.203,
        reactance_ohm_per_km: 0.131,
        ampacity_75c_a: 230.0,
        ampacity_90c_a: 260.0,
        kcmil: 211.6,
    },
];

/// Canonical label for user-typed gauges ("12", "12awg", "2/0 awg" → "12 AWG", "2/0 AWG")
fn canonical_gauge(gauge: &str) -> String {
    let upper = gauge.trim().to_uppercase();
    let number = upper.trim_end_matches("AWG").trim();
    format!("{} AWG", number)
}

/// Look up a conductor by gauge label.
///
/// Accepts the tabulated label ("12 AWG") or a bare gauge number ("12", "2/0").
/// Absent gauges are an error, never a default.
///
/// # Example
///
/// ```rust
/// use circuit_core::tables::conductor;
///
/// let wire = conductor("12 AWG").unwrap();
/// assert_eq!(wire.ampacity_75c_a, 25.0);
/// assert!(conductor("13 AWG").is_err());
/// ```
pub fn conductor(gauge: &str) -> CalcResult<&'static ConductorSpec> {
    let wanted = canonical_gauge(gauge);
    CONDUCTORS
        .iter()
        .find(|c| c.gauge == wanted)
        .ok_or_else(|| CalcError::unknown_gauge(gauge))
}

/// Smallest tabulated gauge whose thermal section is at least `required_kcmil`.
///
/// Ties count as sufficient (≥). Returns `None` when even the largest
/// conductor is too small.
pub fn smallest_gauge_with_kcmil(required_kcmil: f64) -> Option<&'static ConductorSpec> {
    CONDUCTORS.iter().find(|c| c.kcmil >= required_kcmil)
}

/// All gauge labels in table order
pub fn gauge_labels() -> impl Iterator<Item = &'static str> {
    CONDUCTORS.iter().map(|c| c.gauge)
}
