//! # Ampacity and Overcurrent Protection
//!
//! Checks that a conductor, after temperature and grouping derating, carries
//! 125 % of the load current, and proposes the standard breaker that protects
//! it.
//!
//! ## Method
//!
//! ```text
//! I      = S / V              (single-phase)
//! I      = S / (√3 · V)       (three-phase)
//! I_d    = 1.25 · I
//! A'     = A_base · F_t · F_g
//! A_final= A'                 (75 °C column)
//! A_final= min(A', A_75)      (90 °C column capped at the terminal rating)
//! OK     ⇔ A_final ≥ I_d
//! ```
//!
//! ## Example
//!
//! ```rust
//! use circuit_core::calculations::ampacity::{calculate, AmpacityInput};
//! use circuit_core::calculations::Verdict;
//! use circuit_core::nec_factors::{CodeProfile, SystemPhase};
//!
//! let input = AmpacityInput {
//!     load_va: 1260.0,
//!     service_voltage_v: 120.0,
//!     phase: SystemPhase::Single,
//!     gauge: "12 AWG".to_string(),
//!     active_conductors: 3,
//!     temperature_band: "36-40 °C (0.91)".to_string(),
//! };
//!
//! let result = calculate(&input, &CodeProfile::default()).unwrap();
//! assert_eq!(result.suggested_breaker_a, 15.0);
//! assert_eq!(result.verdict, Verdict::Complies);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::Verdict;
use crate::errors::{ensure_finite, CalcError, CalcResult};
use crate::nec_factors::{CodeProfile, SystemPhase, TerminalCapPolicy, CONTINUOUS_LOAD_FACTOR, STANDARD_SERVICE_VOLTAGES};
use crate::tables::{conductor, next_standard_breaker, temperature_factor};
use crate::units::{VoltAmperes, Volts};

/// Input parameters for the ampacity check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "load_va": 1260.0,
///   "service_voltage_v": 120.0,
///   "phase": "Single",
///   "gauge": "12 AWG",
///   "active_conductors": 3,
///   "temperature_band": "36-40 °C (0.91)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmpacityInput {
    /// Total connected load (VA)
    pub load_va: f64,

    /// Service voltage (V), one of the standard service voltages
    pub service_voltage_v: f64,

    /// Supply configuration
    pub phase: SystemPhase,

    /// Conductor gauge label
    pub gauge: String,

    /// Current-carrying conductors in the raceway
    pub active_conductors: u32,

    /// Ambient temperature band label
    pub temperature_band: String,
}

impl AmpacityInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_finite("load_va", self.load_va)?;
        ensure_finite("service_voltage_v", self.service_voltage_v)?;
        if self.load_va <= 0.0 {
            return Err(CalcError::invalid_input(
                "load_va",
                self.load_va.to_string(),
                "Load must be positive",
            ));
        }
        if !STANDARD_SERVICE_VOLTAGES.contains(&self.service_voltage_v) {
            return Err(CalcError::invalid_input(
                "service_voltage_v",
                self.service_voltage_v.to_string(),
                "Service voltage must be 120, 208 or 480 V",
            ));
        }
        if self.active_conductors == 0 {
            return Err(CalcError::invalid_input(
                "active_conductors",
                "0",
                "At least one current-carrying conductor is required",
            ));
        }
        Ok(())
    }

    /// Load current I = S / (V · m), m = 1 or √3
    pub fn load_current_a(&self) -> f64 {
        let per_phase = Volts(self.service_voltage_v) * self.phase.current_multiplier();
        (VoltAmperes(self.load_va) / per_phase).value()
    }
}

/// Results from the ampacity check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "load_current_a": 10.5,
///   "design_current_a": 13.125,
///   "base_ampacity_a": 25.0,
///   "corrected_ampacity_a": 22.75,
///   "final_ampacity_a": 22.75,
///   "terminal_limit_a": null,
///   "grouping_factor": 1.0,
///   "temperature_factor": 0.91,
///   "suggested_breaker_a": 15.0,
///   "breaker_saturated": false,
///   "verdict": "Complies"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmpacityResult {
    /// Load current (A)
    pub load_current_a: f64,

    /// Design current at 125 % (A)
    pub design_current_a: f64,

    /// Tabulated ampacity the derating starts from (A)
    pub base_ampacity_a: f64,

    /// Base ampacity after temperature and grouping factors (A)
    pub corrected_ampacity_a: f64,

    /// Ampacity after the terminal limit, compared against design current (A)
    pub final_ampacity_a: f64,

    /// Terminal rating used as a cap, when the profile applies one (A)
    pub terminal_limit_a: Option<f64>,

    /// Grouping adjustment factor
    pub grouping_factor: f64,

    /// Ambient temperature correction factor
    pub temperature_factor: f64,

    /// Next standard overcurrent device rating ≥ design current (A)
    pub suggested_breaker_a: f64,

    /// True when the design current exceeds every standard rating
    pub breaker_saturated: bool,

    /// COMPLIES when final ampacity ≥ design current
    pub verdict: Verdict,
}

impl AmpacityResult {
    /// Check if the conductor passes
    pub fn passes(&self) -> bool {
        self.verdict.passes()
    }
}

/// Run the ampacity check.
///
/// # Arguments
///
/// * `input` - Load, supply and conductor parameters
/// * `profile` - Grouping and terminal policies
///
/// # Returns
///
/// * `Ok(AmpacityResult)` - Calculation results
/// * `Err(CalcError)` - If inputs are invalid or a table key is unknown
pub fn calculate(input: &AmpacityInput, profile: &CodeProfile) -> CalcResult<AmpacityResult> {
    input.validate()?;

    let wire = conductor(&input.gauge)?;
    let temperature_factor = temperature_factor(&input.temperature_band)?;
    let grouping_factor = profile.grouping.factor(input.active_conductors);

    let load_current_a = input.load_current_a();
    let design_current_a = load_current_a * CONTINUOUS_LOAD_FACTOR;

    let (base_ampacity_a, terminal_limit_a) = match profile.terminal_cap {
        TerminalCapPolicy::Column75 => (wire.ampacity_75c_a, None),
        TerminalCapPolicy::Column90CappedAt75 => (wire.ampacity_90c_a, Some(wire.ampacity_75c_a)),
    };

    let corrected_ampacity_a = base_ampacity_a * temperature_factor * grouping_factor;
    let final_ampacity_a = match terminal_limit_a {
        Some(limit) => corrected_ampacity_a.min(limit),
        None => corrected_ampacity_a,
    };

    let verdict = if final_ampacity_a >= design_current_a {
        Verdict::Complies
    } else {
        Verdict::Fails
    };

    let breaker = next_standard_breaker(design_current_a);
    if breaker.saturated {
        warn!(
            design_current_a,
            rating_a = breaker.rating_a,
            "design current exceeds the largest standard breaker rating"
        );
    }

    debug!(
        gauge = wire.gauge,
        load_current_a,
        design_current_a,
        corrected_ampacity_a,
        final_ampacity_a,
        ?verdict,
        "ampacity check"
    );

    Ok(AmpacityResult {
        load_current_a,
        design_current_a,
        base_ampacity_a,
        corrected_ampacity_a,
        final_ampacity_a,
        terminal_limit_a,
        grouping_factor,
        temperature_factor,
        suggested_breaker_a: breaker.rating_a,
        breaker_saturated: breaker.saturated,
        verdict,
    })
}
