//! # Voltage Drop
//!
//! Impedance-based voltage drop along a branch circuit and the resulting
//! regulation percentage.
//!
//! ## Method
//!
//! ```text
//! θ     = arccos(pf)
//! Z_eff = R · pf + X · sin θ          (Ω/km)
//! ΔV    = K · I · (L / 1000) · Z_eff  (V)
//! %ΔV   = ΔV / V_base · 100
//! ```
//!
//! K comes from the profile's [`KFactorMode`](crate::nec_factors::KFactorMode)
//! and the supply phase. The verdict thresholds come from
//! [`DropVerdictPolicy`](crate::nec_factors::DropVerdictPolicy).
//!
//! ## Current Source
//!
//! The circuit current may be supplied directly or left out, in which case
//! the caller passes the load current derived by the ampacity check. The
//! result records which one was used.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::Verdict;
use crate::errors::{ensure_finite, CalcError, CalcResult};
use crate::nec_factors::{CodeProfile, DropVerdictPolicy, SystemPhase, MAX_POWER_FACTOR, MIN_POWER_FACTOR};
use crate::tables::conductor;
use crate::units::{Kilometers, Meters};

/// Where the circuit current came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrentSource {
    /// Entered by the user
    Supplied,
    /// Load current from the ampacity check
    DerivedFromLoad,
}

impl CurrentSource {
    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            CurrentSource::Supplied => "supplied",
            CurrentSource::DerivedFromLoad => "derived from load",
        }
    }
}

/// Input parameters for the voltage-drop check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "length_m": 20.0,
///   "current_a": 10.5,
///   "gauge": "12 AWG",
///   "power_factor": 0.9,
///   "phase": "Single",
///   "base_voltage_v": 120.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageDropInput {
    /// One-way circuit length (m)
    pub length_m: f64,

    /// Circuit current (A)
    pub current_a: f64,

    /// Conductor gauge label
    pub gauge: String,

    /// Load power factor (0.80 - 1.00)
    pub power_factor: f64,

    /// Supply configuration, selects K
    pub phase: SystemPhase,

    /// Voltage the percentage is referred to (V)
    pub base_voltage_v: f64,
}

impl VoltageDropInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        ensure_finite("length_m", self.length_m)?;
        ensure_finite("current_a", self.current_a)?;
        ensure_finite("power_factor", self.power_factor)?;
        ensure_finite("base_voltage_v", self.base_voltage_v)?;
        if self.length_m < 0.0 {
            return Err(CalcError::invalid_input(
                "length_m",
                self.length_m.to_string(),
                "Circuit length cannot be negative",
            ));
        }
        if self.current_a < 0.0 {
            return Err(CalcError::invalid_input(
                "current_a",
                self.current_a.to_string(),
                "Current cannot be negative",
            ));
        }
        if !(MIN_POWER_FACTOR..=MAX_POWER_FACTOR).contains(&self.power_factor) {
            return Err(CalcError::invalid_input(
                "power_factor",
                self.power_factor.to_string(),
                "Power factor must be between 0.80 and 1.00",
            ));
        }
        if self.base_voltage_v <= 0.0 {
            return Err(CalcError::invalid_input(
                "base_voltage_v",
                self.base_voltage_v.to_string(),
                "Base voltage must be positive",
            ));
        }
        Ok(())
    }
}

/// Results from the voltage-drop check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageDropResult {
    /// Voltage drop (V)
    pub voltage_drop_v: f64,

    /// Voltage drop as a percentage of the base voltage
    pub percent_drop: f64,

    /// Effective impedance R·pf + X·sin θ (Ω/km)
    pub impedance_ohm_per_km: f64,

    /// Phase factor K applied
    pub k_factor: f64,

    /// Current used in the formula (A)
    pub current_a: f64,

    /// Whether the current was supplied or derived
    pub current_source: CurrentSource,

    /// Verdict under the profile's drop policy
    pub verdict: Verdict,
}

impl VoltageDropResult {
    /// Check if the drop is acceptable (attention counts as not passing)
    pub fn passes(&self) -> bool {
        self.verdict.passes()
    }
}

/// Effective impedance Z = R·cos θ + X·sin θ for a power factor (Ω/km).
pub fn effective_impedance(resistance_ohm_per_km: f64, reactance_ohm_per_km: f64, power_factor: f64) -> f64 {
    let theta = power_factor.acos();
    resistance_ohm_per_km * power_factor + reactance_ohm_per_km * theta.sin()
}

/// Classify a percentage drop under a verdict policy.
///
/// Both limits are inclusive: exactly 3.0 % complies, exactly 5.0 % is
/// attention under the tiered policy.
pub fn classify_drop(percent_drop: f64, policy: DropVerdictPolicy) -> Verdict {
    if percent_drop <= DropVerdictPolicy::BRANCH_LIMIT_PERCENT {
        return Verdict::Complies;
    }
    match policy {
        DropVerdictPolicy::Tiered if percent_drop <= DropVerdictPolicy::TOTAL_LIMIT_PERCENT => Verdict::Attention,
        _ => Verdict::Fails,
    }
}

/// Run the voltage-drop check with a known current.
///
/// The current source is recorded as [`CurrentSource::Supplied`]; use
/// [`calculate_with_source`] when the current was derived.
///
/// # Example
///
/// ```rust
/// use circuit_core::calculations::voltage_drop::{calculate, VoltageDropInput};
/// use circuit_core::calculations::Verdict;
/// use circuit_core::nec_factors::{CodeProfile, KFactorMode, SystemPhase};
///
/// let input = VoltageDropInput {
///     length_m: 20.0,
///     current_a: 10.5,
///     gauge: "12 AWG".to_string(),
///     power_factor: 0.9,
///     phase: SystemPhase::Single,
///     base_voltage_v: 120.0,
/// };
///
/// let profile = CodeProfile::new().with_k_factor(KFactorMode::Nec);
/// let result = calculate(&input, &profile).unwrap();
/// assert_eq!(result.k_factor, 2.0);
/// assert_eq!(result.verdict, Verdict::Complies);
/// ```
pub fn calculate(input: &VoltageDropInput, profile: &CodeProfile) -> CalcResult<VoltageDropResult> {
    calculate_with_source(input, CurrentSource::Supplied, profile)
}

/// Run the voltage-drop check, recording where the current came from.
pub fn calculate_with_source(
    input: &VoltageDropInput,
    current_source: CurrentSource,
    profile: &CodeProfile,
) -> CalcResult<VoltageDropResult> {
    input.validate()?;
    profile.validate()?;

    let wire = conductor(&input.gauge)?;
    let k_factor = profile.k_factor.k(input.phase);
    let impedance_ohm_per_km = effective_impedance(
        wire.resistance_ohm_per_km,
        wire.reactance_ohm_per_km,
        input.power_factor,
    );

    let length_km: Kilometers = Meters(input.length_m).into();
    let voltage_drop_v = k_factor * input.current_a * length_km.value() * impedance_ohm_per_km;
    let percent_drop = voltage_drop_v / input.base_voltage_v * 100.0;
    ensure_finite("voltage_drop_v", voltage_drop_v)?;
    ensure_finite("percent_drop", percent_drop)?;
    let verdict = classify_drop(percent_drop, profile.drop_verdict);

    if verdict != Verdict::Complies {
        warn!(gauge = wire.gauge, percent_drop, ?verdict, "voltage drop above 3 %");
    }
    debug!(
        gauge = wire.gauge,
        k_factor,
        impedance_ohm_per_km,
        voltage_drop_v,
        percent_drop,
        "voltage drop check"
    );

    Ok(VoltageDropResult {
        voltage_drop_v,
        percent_drop,
        impedance_ohm_per_km,
        k_factor,
        current_a: input.current_a,
        current_source,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec_factors::KFactorMode;

    fn test_input() -> VoltageDropInput {
        VoltageDropInput {
            length_m: 20.0,
            current_a: 10.5,
            gauge: "12 AWG".to_string(),
            power_factor: 0.9,
            phase: SystemPhase::Single,
            base_voltage_v: 120.0,
        }
    }

    #[test]
    fn test_effective_impedance() {
        // 6.56 × 0.9 + 0.177 × sin(acos 0.9) = 5.904 + 0.0772 = 5.981
        let z = effective_impedance(6.56, 0.177, 0.9);
        assert!((z - 5.9812).abs() < 1e-3);
    }

    #[test]
    fn test_unity_power_factor_is_pure_resistance() {
        let z = effective_impedance(6.56, 0.177, 1.0);
        assert!((z - 6.56).abs() < 1e-12);
    }

    #[test]
    fn test_reference_case_cen_k() {
        let profile = CodeProfile::new().with_k_factor(KFactorMode::Cen);
        let result = calculate(&test_input(), &profile).unwrap();

        assert_eq!(result.k_factor, 5.0);
        // ΔV = 5.0 × 10.5 × 0.02 × 5.981 = 6.28 V
        assert!((result.voltage_drop_v - 6.28).abs() < 0.01);
        // 6.28 / 120 = 5.23 %
        assert!((result.percent_drop - 5.23).abs() < 0.01);
        assert_eq!(result.current_source, CurrentSource::Supplied);
    }

    #[test]
    fn test_reference_case_both_policies() {
        // 5.23 % is above both limits, so both policies fail it
        let tiered = CodeProfile::new().with_drop_verdict(DropVerdictPolicy::Tiered);
        let strict = CodeProfile::new().with_drop_verdict(DropVerdictPolicy::Strict);
        assert_eq!(calculate(&test_input(), &tiered).unwrap().verdict, Verdict::Fails);
        assert_eq!(calculate(&test_input(), &strict).unwrap().verdict, Verdict::Fails);
    }

    #[test]
    fn test_attention_band_depends_on_policy() {
        let mut input = test_input();
        input.length_m = 15.0; // ΔV = 4.71 V, 3.93 %

        let tiered = calculate(&input, &CodeProfile::new().with_drop_verdict(DropVerdictPolicy::Tiered)).unwrap();
        let strict = calculate(&input, &CodeProfile::new().with_drop_verdict(DropVerdictPolicy::Strict)).unwrap();

        assert!((tiered.percent_drop - 3.925).abs() < 0.01);
        assert_eq!(tiered.verdict, Verdict::Attention);
        assert_eq!(strict.verdict, Verdict::Fails);
    }

    #[test]
    fn test_nec_k_complies() {
        let result = calculate(&test_input(), &CodeProfile::new().with_k_factor(KFactorMode::Nec)).unwrap();
        // 2.0 × 10.5 × 0.02 × 5.981 = 2.51 V → 2.09 %
        assert!((result.percent_drop - 2.093).abs() < 0.01);
        assert_eq!(result.verdict, Verdict::Complies);
    }

    #[test]
    fn test_three_phase_k() {
        let mut input = test_input();
        input.phase = SystemPhase::Three;
        let result = calculate(&input, &CodeProfile::new().with_k_factor(KFactorMode::Nec)).unwrap();
        assert_eq!(result.k_factor, 1.732);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_drop(3.0, DropVerdictPolicy::Tiered), Verdict::Complies);
        assert_eq!(classify_drop(3.0, DropVerdictPolicy::Strict), Verdict::Complies);
        assert_eq!(classify_drop(3.0001, DropVerdictPolicy::Tiered), Verdict::Attention);
        assert_eq!(classify_drop(5.0, DropVerdictPolicy::Tiered), Verdict::Attention);
        assert_eq!(classify_drop(5.0001, DropVerdictPolicy::Tiered), Verdict::Fails);
        assert_eq!(classify_drop(3.0001, DropVerdictPolicy::Strict), Verdict::Fails);
    }

    #[test]
    fn test_zero_length_and_current() {
        let mut input = test_input();
        input.length_m = 0.0;
        let result = calculate(&input, &CodeProfile::default()).unwrap();
        assert_eq!(result.voltage_drop_v, 0.0);
        assert_eq!(result.verdict, Verdict::Complies);

        let mut input = test_input();
        input.current_a = 0.0;
        assert_eq!(calculate(&input, &CodeProfile::default()).unwrap().percent_drop, 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let profile = CodeProfile::default();

        let mut input = test_input();
        input.power_factor = 0.75;
        assert!(calculate(&input, &profile).is_err());

        let mut input = test_input();
        input.power_factor = 1.01;
        assert!(calculate(&input, &profile).is_err());

        let mut input = test_input();
        input.length_m = -1.0;
        assert!(calculate(&input, &profile).is_err());

        let mut input = test_input();
        input.current_a = -0.1;
        assert!(calculate(&input, &profile).is_err());

        let mut input = test_input();
        input.base_voltage_v = 0.0;
        assert!(calculate(&input, &profile).is_err());
    }

    #[test]
    fn test_overflowing_product_rejected() {
        // K·I overflows before the zero length is applied
        let mut input = test_input();
        input.length_m = 0.0;
        input.current_a = 1e308;
        let err = calculate(&input, &CodeProfile::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_derived_current_recorded() {
        let result = calculate_with_source(&test_input(), CurrentSource::DerivedFromLoad, &CodeProfile::default()).unwrap();
        assert_eq!(result.current_source, CurrentSource::DerivedFromLoad);
    }
}
