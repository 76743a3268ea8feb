//! # Short-Circuit Thermal Withstand
//!
//! Adiabatic heating limit of a copper conductor during a fault, in the two
//! equivalent forms found in practice:
//!
//! ```text
//! kcmil_min = I_f · √t / K          (minimum section for a fault)
//! I_max     = K · kcmil / √t        (maximum fault for a section)
//! ```
//!
//! K is 105 for 75 °C copper insulation and comes from the
//! [`CodeProfile`](crate::nec_factors::CodeProfile) so other insulation
//! ratings can be modelled.
//!
//! A fault current or clearing time of zero is treated as "not configured
//! yet": the result carries no derived values and the verdict is
//! [`Verdict::NotComputed`], which never counts as passing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::Verdict;
use crate::errors::{ensure_finite, CalcResult};
use crate::nec_factors::CodeProfile;
use crate::tables::{conductor, smallest_gauge_with_kcmil};
use crate::units::{Amps, KiloAmps, Seconds};

/// Input parameters for the short-circuit check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "gauge": "2/0 AWG",
///   "fault_current_a": 10000.0,
///   "clearing_time_s": 0.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitInput {
    /// Conductor gauge label
    pub gauge: String,

    /// Available fault current or device interrupting capacity (A)
    pub fault_current_a: f64,

    /// Protective device clearing time (s)
    pub clearing_time_s: f64,
}

impl ShortCircuitInput {
    /// Build from fault current in amperes
    pub fn new(gauge: impl Into<String>, fault_current: Amps, clearing_time: Seconds) -> Self {
        Self {
            gauge: gauge.into(),
            fault_current_a: fault_current.value(),
            clearing_time_s: clearing_time.value(),
        }
    }

    /// Build from a device interrupting capacity in kA
    pub fn from_interrupting_capacity(gauge: impl Into<String>, capacity: KiloAmps, clearing_time: Seconds) -> Self {
        Self::new(gauge, Amps::from(capacity), clearing_time)
    }

    /// Validate input parameters.
    ///
    /// Zero or negative values are allowed here; they select the
    /// not-computed result instead of an error.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_finite("fault_current_a", self.fault_current_a)?;
        ensure_finite("clearing_time_s", self.clearing_time_s)?;
        Ok(())
    }

    /// True when there is nothing to compute
    pub fn is_degenerate(&self) -> bool {
        self.fault_current_a <= 0.0 || self.clearing_time_s <= 0.0
    }
}

/// Results from the short-circuit check.
///
/// The `Option` fields are `None` when the input was degenerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortCircuitResult {
    /// Fault current checked (A)
    pub fault_current_a: f64,

    /// Clearing time (s)
    pub clearing_time_s: f64,

    /// Thermal constant K used
    pub thermal_constant: f64,

    /// Thermal section of the selected conductor (kcmil)
    pub conductor_kcmil: f64,

    /// Minimum section that survives the fault (kcmil)
    pub min_required_kcmil: Option<f64>,

    /// Smallest tabulated gauge meeting the minimum section
    pub minimum_sufficient_gauge: Option<String>,

    /// Largest fault the selected conductor survives for the clearing time (A)
    pub max_withstand_a: Option<f64>,

    /// COMPLIES when the conductor section ≥ required section
    pub verdict: Verdict,
}

impl ShortCircuitResult {
    /// Check if the conductor withstands the fault
    pub fn passes(&self) -> bool {
        self.verdict.passes()
    }

    /// Minimum gauge text, "N/A" when none is large enough or nothing was computed
    pub fn minimum_gauge_label(&self) -> &str {
        self.minimum_sufficient_gauge.as_deref().unwrap_or("N/A")
    }
}

/// Minimum thermal section (kcmil) for a fault current and clearing time.
pub fn min_required_kcmil(fault_current_a: f64, clearing_time_s: f64, thermal_constant: f64) -> f64 {
    fault_current_a * clearing_time_s.sqrt() / thermal_constant
}

/// Maximum fault current (A) a section survives for a clearing time.
pub fn max_withstand_current(kcmil: f64, clearing_time_s: f64, thermal_constant: f64) -> f64 {
    thermal_constant * kcmil / clearing_time_s.sqrt()
}

/// Run the short-circuit check.
///
/// # Example
///
/// ```rust
/// use circuit_core::calculations::short_circuit::{calculate, ShortCircuitInput};
/// use circuit_core::nec_factors::CodeProfile;
/// use circuit_core::units::{KiloAmps, Seconds};
///
/// let input = ShortCircuitInput::from_interrupting_capacity("12 AWG", KiloAmps(10.0), Seconds(0.5));
/// let result = calculate(&input, &CodeProfile::default()).unwrap();
///
/// assert_eq!(result.minimum_gauge_label(), "2/0 AWG");
/// assert!(!result.passes());
/// ```
pub fn calculate(input: &ShortCircuitInput, profile: &CodeProfile) -> CalcResult<ShortCircuitResult> {
    input.validate()?;
    profile.validate()?;

    let wire = conductor(&input.gauge)?;
    let thermal_constant = profile.thermal_constant;

    if input.is_degenerate() {
        debug!(
            fault_current_a = input.fault_current_a,
            clearing_time_s = input.clearing_time_s,
            "short-circuit check not computed"
        );
        return Ok(ShortCircuitResult {
            fault_current_a: input.fault_current_a,
            clearing_time_s: input.clearing_time_s,
            thermal_constant,
            conductor_kcmil: wire.kcmil,
            min_required_kcmil: None,
            minimum_sufficient_gauge: None,
            max_withstand_a: None,
            verdict: Verdict::NotComputed,
        });
    }

    let required = min_required_kcmil(input.fault_current_a, input.clearing_time_s, thermal_constant);
    let withstand = max_withstand_current(wire.kcmil, input.clearing_time_s, thermal_constant);
    ensure_finite("min_required_kcmil", required)?;
    ensure_finite("max_withstand_a", withstand)?;
    let minimum = smallest_gauge_with_kcmil(required);

    let verdict = if wire.kcmil >= required {
        Verdict::Complies
    } else {
        Verdict::Fails
    };

    if minimum.is_none() {
        warn!(required_kcmil = required, "no tabulated conductor withstands the fault");
    }
    debug!(
        gauge = wire.gauge,
        required_kcmil = required,
        max_withstand_a = withstand,
        ?verdict,
        "short-circuit check"
    );

    Ok(ShortCircuitResult {
        fault_current_a: input.fault_current_a,
        clearing_time_s: input.clearing_time_s,
        thermal_constant,
        conductor_kcmil: wire.kcmil,
        min_required_kcmil: Some(required),
        minimum_sufficient_gauge: minimum.map(|c| c.gauge.to_string()),
        max_withstand_a: Some(withstand),
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input(gauge: &str) -> ShortCircuitInput {
        ShortCircuitInput::new(gauge, Amps(10_000.0), Seconds(0.5))
    }

    #[test]
    fn test_reference_case() {
        let result = calculate(&test_input("12 AWG"), &CodeProfile::default()).unwrap();

        // 10 000 × √0.5 / 105 = 67.34 kcmil
        let required = result.min_required_kcmil.unwrap();
        assert!((required - 67.34).abs() < 0.01);
        // 2 AWG (66.36) is just short, 2/0 is next
        assert_eq!(result.minimum_sufficient_gauge.as_deref(), Some("2/0 AWG"));
        assert_eq!(result.verdict, Verdict::Fails);
    }

    #[test]
    fn test_withstand_form_agrees() {
        let result = calculate(&test_input("2/0 AWG"), &CodeProfile::default()).unwrap();

        assert_eq!(result.verdict, Verdict::Complies);
        // 105 × 133.1 / √0.5 = 19 764 A
        let withstand = result.max_withstand_a.unwrap();
        assert!((withstand - 19_764.0).abs() < 1.0);
        assert!(withstand >= result.fault_current_a);

        let small = calculate(&test_input("2 AWG"), &CodeProfile::default()).unwrap();
        assert!(small.max_withstand_a.unwrap() < small.fault_current_a);
        assert_eq!(small.verdict, Verdict::Fails);
    }

    #[test]
    fn test_exact_tie_complies() {
        // K = 1 and t = 1 make the requirement equal the fault current
        let profile = CodeProfile::new().with_thermal_constant(1.0);
        let input = ShortCircuitInput::new("2 AWG", Amps(66.36), Seconds(1.0));
        let result = calculate(&input, &profile).unwrap();

        assert_eq!(result.min_required_kcmil, Some(66.36));
        assert_eq!(result.minimum_sufficient_gauge.as_deref(), Some("2 AWG"));
        assert_eq!(result.verdict, Verdict::Complies);
    }

    #[test]
    fn test_kiloamps_constructor() {
        let input = ShortCircuitInput::from_interrupting_capacity("12 AWG", KiloAmps(10.0), Seconds(0.5));
        assert_eq!(input, test_input("12 AWG"));
    }

    #[test]
    fn test_degenerate_inputs_not_computed() {
        let profile = CodeProfile::default();
        for input in [
            ShortCircuitInput::new("12 AWG", Amps(0.0), Seconds(0.5)),
            ShortCircuitInput::new("12 AWG", Amps(10_000.0), Seconds(0.0)),
            ShortCircuitInput::new("12 AWG", Amps(-5.0), Seconds(0.5)),
        ] {
            let result = calculate(&input, &profile).unwrap();
            assert_eq!(result.verdict, Verdict::NotComputed);
            assert!(!result.passes());
            assert!(result.min_required_kcmil.is_none());
            assert!(result.max_withstand_a.is_none());
            assert_eq!(result.minimum_gauge_label(), "N/A");
        }
    }

    #[test]
    fn test_fault_beyond_table() {
        // 200 kA for 1 s needs 1905 kcmil
        let input = ShortCircuitInput::new("4/0 AWG", Amps(200_000.0), Seconds(1.0));
        let result = calculate(&input, &CodeProfile::default()).unwrap();
        assert!(result.minimum_sufficient_gauge.is_none());
        assert_eq!(result.verdict, Verdict::Fails);
    }

    #[test]
    fn test_thermal_constant_from_profile() {
        let profile = CodeProfile::new().with_thermal_constant(143.0);
        let result = calculate(&test_input("2 AWG"), &profile).unwrap();
        assert_eq!(result.thermal_constant, 143.0);
        // 10 000 × √0.5 / 143 = 49.4 kcmil, 2 AWG now suffices
        assert_eq!(result.verdict, Verdict::Complies);
    }

    #[test]
    fn test_invalid_inputs() {
        let profile = CodeProfile::default();
        assert!(calculate(&ShortCircuitInput::new("12 AWG", Amps(f64::NAN), Seconds(0.5)), &profile).is_err());
        assert!(calculate(&test_input("13 AWG"), &profile).unwrap_err().is_unknown_key());
        assert!(calculate(&test_input("12 AWG"), &CodeProfile::new().with_thermal_constant(0.0)).is_err());
    }

    #[test]
    fn test_overflowing_section_rejected() {
        let input = ShortCircuitInput::new("12 AWG", Amps(1e308), Seconds(1e10));
        let err = calculate(&input, &CodeProfile::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
