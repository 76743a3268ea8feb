//! # Reference Tables
//!
//! Static lookup data for branch-circuit sizing. Every table is immutable and
//! lives in a `static`, so any number of evaluations can share it without
//! synchronization.
//!
//! ## Tables
//!
//! - [`conductors`]: copper conductor properties (area, R, X, ampacity, kcmil)
//! - [`breakers`]: standard overcurrent device ratings
//! - [`temperature`]: ambient temperature correction factors
//! - [`conduits`]: conduit internal areas by trade size and material
//!
//! ## Lookup Rules
//!
//! Keyed lookups fail closed: an unknown gauge, band or trade size is an
//! error. The one documented exception is [`next_standard_breaker`], which
//! saturates at the largest rating and says so in its return value.
//!
//! "First entry that satisfies a threshold" lookups are linear scans in
//! ascending table order with `>=`, so an exact tie selects the tabulated
//! entry itself.
//!
//! ## Example
//!
//! ```rust
//! use circuit_core::tables::{conductor, conduit_area, temperature_factor, ConduitMaterial};
//!
//! let wire = conductor("10 AWG").unwrap();
//! let factor = temperature_factor("31-35 °C (0.96)").unwrap();
//! println!("Corrected ampacity: {:.1} A", wire.ampacity_75c_a * factor);
//!
//! let area = conduit_area("1\"", ConduitMaterial::Emt).unwrap();
//! assert_eq!(area, 556.0);
//! ```

pub mod breakers;
pub mod conductors;
pub mod conduits;
pub mod temperature;

pub use breakers::{next_standard_breaker, BreakerSelection, STANDARD_BREAKERS_A};
pub use conductors::{conductor, gauge_labels, smallest_gauge_with_kcmil, ConductorSpec, CONDUCTORS};
pub use conduits::{
    conduit, conduit_area, smallest_conduit_with_area, ConduitMaterial, ConduitSpec,
    CONDUITS,
};
pub use temperature::{
    band_for_ambient, temperature_band, temperature_factor, TemperatureBand, DEFAULT_BAND, TEMPERATURE_BANDS,
};
