//! # Unit Types
//!
//! Type-safe wrappers for electrical units. These provide compile-time
//! safety against unit confusion while remaining lightweight (just f64 wrappers).
//!
//! ## Design Philosophy
//!
//! We use simple newtype wrappers rather than a full units library because:
//! - Branch-circuit sizing uses a small, consistent set of units
//! - We want JSON serialization to be clean (just numbers)
//! - Minimal runtime overhead
//!
//! ## Units in Use
//!
//! Tables follow the mixed convention of the national code the engine implements:
//! - Current: amperes (A), kiloamperes (kA) for fault duty
//! - Length: metres (m) for circuit runs, kilometres (km) for impedance tables
//! - Area: square millimetres (mm²) for fill, kcmil for thermal withstand
//! - Time: seconds (s) for protective-device clearing time
//!
//! ## Example
//!
//! ```rust
//! use circuit_core::units::{Amps, KiloAmps, Kcmil, SquareMillimeters};
//!
//! let fault: Amps = KiloAmps(10.0).into();
//! assert_eq!(fault.0, 10_000.0);
//!
//! let section: Kcmil = SquareMillimeters(107.2).into();
//! assert!((section.0 - 211.6).abs() < 0.1);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Square millimetres per kcmil (1 kcmil = 1000 circular mils)
pub const MM2_PER_KCMIL: f64 = 0.506_707_479;

// ============================================================================
// Current Units
// ============================================================================

/// Current in amperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amps(pub f64);

/// Current in kiloamperes (1 kA = 1000 A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloAmps(pub f64);

impl From<KiloAmps> for Amps {
    fn from(ka: KiloAmps) -> Self {
        Amps(ka.0 * 1000.0)
    }
}

impl From<Amps> for KiloAmps {
    fn from(a: Amps) -> Self {
        KiloAmps(a.0 / 1000.0)
    }
}

// ============================================================================
// Voltage and Power
// ============================================================================

/// Potential in volts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volts(pub f64);

/// Apparent power in volt-amperes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoltAmperes(pub f64);

/// I = S / V
impl Div<Volts> for VoltAmperes {
    type Output = Amps;
    fn div(self, rhs: Volts) -> Amps {
        Amps(self.0 / rhs.0)
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in kilometres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilometers(pub f64);

impl From<Meters> for Kilometers {
    fn from(m: Meters) -> Self {
        Kilometers(m.0 / 1000.0)
    }
}

impl From<Kilometers> for Meters {
    fn from(km: Kilometers) -> Self {
        Meters(km.0 * 1000.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Cross-sectional area in square millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMillimeters(pub f64);

/// Cross-sectional area in thousands of circular mils
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kcmil(pub f64);

impl From<SquareMillimeters> for Kcmil {
    fn from(mm2: SquareMillimeters) -> Self {
        Kcmil(mm2.0 / MM2_PER_KCMIL)
    }
}

impl From<Kcmil> for SquareMillimeters {
    fn from(kcmil: Kcmil) -> Self {
        SquareMillimeters(kcmil.0 * MM2_PER_KCMIL)
    }
}

// ============================================================================
// Time Units
// ============================================================================

/// Time in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seconds(pub f64);

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Amps);
impl_arithmetic!(KiloAmps);
impl_arithmetic!(Volts);
impl_arithmetic!(VoltAmperes);
impl_arithmetic!(Meters);
impl_arithmetic!(Kilometers);
impl_arithmetic!(SquareMillimeters);
impl_arithmetic!(Kcmil);
impl_arithmetic!(Seconds);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kiloamps_to_amps() {
        let ka = KiloAmps(1.5);
        let a: Amps = ka.into();
        assert_eq!(a.0, 1500.0);
    }

    #[test]
    fn test_meters_to_kilometers() {
        let km: Kilometers = Meters(20.0).into();
        assert_eq!(km.0, 0.02);
    }

    #[test]
    fn test_kcmil_conversion() {
        // 2 AWG: 33.62 mm² ≈ 66.36 kcmil
        let kcmil: Kcmil = SquareMillimeters(33.62).into();
        assert!((kcmil.0 - 66.35).abs() < 0.05);

        let back: SquareMillimeters = kcmil.into();
        assert!((back.0 - 33.62).abs() < 1e-9);
    }

    #[test]
    fn test_apparent_power_over_voltage() {
        let current = VoltAmperes(1260.0) / Volts(120.0);
        assert_eq!(current, Amps(10.5));
    }

    #[test]
    fn test_arithmetic() {
        let a = Amps(10.0);
        let b = Amps(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 1.25).0, 12.5);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let amps = Amps(13.125);
        let json = serde_json::to_string(&amps).unwrap();
        assert_eq!(json, "13.125");

        let roundtrip: Amps = serde_json::from_str(&json).unwrap();
        assert_eq!(amps, roundtrip);
    }
}
