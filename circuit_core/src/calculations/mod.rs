//! # Circuit Calculations
//!
//! This module contains the four branch-circuit checks. Each calculation
//! follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input, profile) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! [`evaluate`] runs all four over one [`CalculationInput`], which is what the
//! CLI and the report assembler use.
//!
//! ## Available Calculations
//!
//! - [`ampacity`] - Conductor ampacity and breaker selection
//! - [`voltage_drop`] - Impedance voltage drop and regulation
//! - [`conduit_fill`] - Raceway fill and trade size recommendation
//! - [`short_circuit`] - Conductor thermal withstand during a fault
//!
//! The checks are independent. The only link is the voltage-drop current,
//! which falls back to the ampacity load current when none is supplied.

pub mod ampacity;
pub mod conduit_fill;
pub mod short_circuit;
pub mod voltage_drop;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::CalcResult;
use crate::nec_factors::{CodeProfile, LoadType, SystemPhase};
use crate::tables::{ConduitMaterial, DEFAULT_BAND};

// Re-export commonly used types
pub use ampacity::{AmpacityInput, AmpacityResult};
pub use conduit_fill::{AreaSource, ConduitFillInput, ConduitFillResult};
pub use short_circuit::{ShortCircuitInput, ShortCircuitResult};
pub use voltage_drop::{CurrentSource, VoltageDropInput, VoltageDropResult};

/// Compliance outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Within the code limit
    Complies,
    /// Above the preferred limit but within the absolute one
    Attention,
    /// Outside the code limit
    Fails,
    /// Inputs were not configured; never counts as passing
    NotComputed,
}

impl Verdict {
    /// Only `Complies` passes
    pub fn passes(&self) -> bool {
        matches!(self, Verdict::Complies)
    }

    /// Report label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Complies => "COMPLIES",
            Verdict::Attention => "ATTENTION",
            Verdict::Fails => "FAILS",
            Verdict::NotComputed => "NOT COMPUTED",
        }
    }

    /// Ordering used to combine verdicts: the worst one wins.
    fn severity(&self) -> u8 {
        match self {
            Verdict::Complies => 0,
            Verdict::Attention => 1,
            Verdict::NotComputed => 2,
            Verdict::Fails => 3,
        }
    }

    /// The less favourable of two verdicts
    pub fn worst(self, other: Verdict) -> Verdict {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn default_band() -> String {
    DEFAULT_BAND.to_string()
}

/// Every user parameter for one evaluation pass.
///
/// Optional fields are explicit defaults: a `None` power factor uses the
/// load type's, a `None` current uses the ampacity load current, and a
/// `None` unit area uses the conductor table. The evaluation records
/// which source each value came from.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "C-1 Lighting",
///   "load_va": 1260.0,
///   "service_voltage_v": 120.0,
///   "phase": "Single",
///   "load_type": "Receptacles",
///   "gauge": "12 AWG",
///   "active_conductors": 3,
///   "temperature_band": "36-40 °C (0.91)",
///   "length_m": 20.0,
///   "fault_current_a": 10000.0,
///   "clearing_time_s": 0.5,
///   "material": "PVC40",
///   "trade_size": "1/2\"",
///   "wire_count": 4
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// User label for this circuit (e.g., "C-1 Lighting")
    pub label: String,

    /// Total connected load (VA)
    pub load_va: f64,

    /// Service voltage (V)
    pub service_voltage_v: f64,

    /// Supply configuration
    pub phase: SystemPhase,

    /// Load type, supplies the default power factor
    pub load_type: LoadType,

    /// Power factor; defaults to the load type's
    #[serde(default)]
    pub power_factor: Option<f64>,

    /// Conductor gauge label
    pub gauge: String,

    /// Current-carrying conductors in the raceway
    pub active_conductors: u32,

    /// Ambient temperature band label
    #[serde(default = "default_band")]
    pub temperature_band: String,

    /// One-way circuit length (m)
    pub length_m: f64,

    /// Voltage-drop current (A); defaults to the load current
    #[serde(default)]
    pub current_a: Option<f64>,

    /// Fault current at the circuit origin (A)
    pub fault_current_a: f64,

    /// Protective device clearing time (s)
    pub clearing_time_s: f64,

    /// Raceway material
    pub material: ConduitMaterial,

    /// Trade size to verify
    pub trade_size: String,

    /// All conductors in the raceway
    pub wire_count: u32,

    /// Per-conductor area override (mm²)
    #[serde(default)]
    pub unit_area_override_mm2: Option<f64>,
}

impl CalculationInput {
    /// A 1260 VA receptacle circuit on 12 AWG, used by the demo and docs.
    pub fn example() -> Self {
        Self {
            label: "C-1 Receptacles".to_string(),
            load_va: 1260.0,
            service_voltage_v: 120.0,
            phase: SystemPhase::Single,
            load_type: LoadType::Receptacles,
            power_factor: None,
            gauge: "12 AWG".to_string(),
            active_conductors: 3,
            temperature_band: "36-40 °C (0.91)".to_string(),
            length_m: 20.0,
            current_a: None,
            fault_current_a: 10_000.0,
            clearing_time_s: 0.5,
            material: ConduitMaterial::Pvc40,
            trade_size: "1/2\"".to_string(),
            wire_count: 4,
            unit_area_override_mm2: None,
        }
    }

    /// Power factor in effect and whether it was entered by the user
    pub fn effective_power_factor(&self) -> (f64, bool) {
        match self.power_factor {
            Some(pf) => (pf, true),
            None => (self.load_type.power_factor(), false),
        }
    }

    /// Parameters for the ampacity check
    pub fn ampacity_input(&self) -> AmpacityInput {
        AmpacityInput {
            load_va: self.load_va,
            service_voltage_v: self.service_voltage_v,
            phase: self.phase,
            gauge: self.gauge.clone(),
            active_conductors: self.active_conductors,
            temperature_band: self.temperature_band.clone(),
        }
    }

    /// Parameters for the voltage-drop check, given the ampacity load current
    pub fn voltage_drop_input(&self, load_current_a: f64) -> (VoltageDropInput, CurrentSource) {
        let (current_a, source) = match self.current_a {
            Some(current) => (current, CurrentSource::Supplied),
            None => (load_current_a, CurrentSource::DerivedFromLoad),
        };
        let input = VoltageDropInput {
            length_m: self.length_m,
            current_a,
            gauge: self.gauge.clone(),
            power_factor: self.effective_power_factor().0,
            phase: self.phase,
            base_voltage_v: self.service_voltage_v,
        };
        (input, source)
    }

    /// Parameters for the conduit-fill check
    pub fn conduit_fill_input(&self) -> ConduitFillInput {
        ConduitFillInput {
            wire_count: self.wire_count,
            gauge: self.gauge.clone(),
            unit_area_override_mm2: self.unit_area_override_mm2,
            material: self.material,
            trade_size: self.trade_size.clone(),
        }
    }

    /// Parameters for the short-circuit check
    pub fn short_circuit_input(&self) -> ShortCircuitInput {
        ShortCircuitInput {
            gauge: self.gauge.clone(),
            fault_current_a: self.fault_current_a,
            clearing_time_s: self.clearing_time_s,
        }
    }
}

/// Results of all four checks for one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Parameter echo
    pub input: CalculationInput,

    /// Profile the checks ran under
    pub profile: CodeProfile,

    /// Power factor used for voltage drop
    pub power_factor: f64,

    /// True when the power factor was entered rather than taken from the load type
    pub power_factor_supplied: bool,

    pub ampacity: AmpacityResult,
    pub voltage_drop: VoltageDropResult,
    pub conduit_fill: ConduitFillResult,
    pub short_circuit: ShortCircuitResult,
}

impl Evaluation {
    /// Worst of the four verdicts
    pub fn overall(&self) -> Verdict {
        self.ampacity
            .verdict
            .worst(self.voltage_drop.verdict)
            .worst(self.conduit_fill.verdict)
            .worst(self.short_circuit.verdict)
    }

    /// True when every check complies
    pub fn passes(&self) -> bool {
        self.overall().passes()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> CalcResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run all four checks on one circuit.
///
/// Fails on the first rejected input or unknown table key; a degenerate
/// short-circuit input is not a failure.
///
/// # Example
///
/// ```rust
/// use circuit_core::calculations::{evaluate, CalculationInput, CurrentSource, Verdict};
/// use circuit_core::nec_factors::CodeProfile;
///
/// let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();
///
/// assert_eq!(evaluation.ampacity.suggested_breaker_a, 15.0);
/// assert_eq!(evaluation.voltage_drop.current_source, CurrentSource::DerivedFromLoad);
/// assert_eq!(evaluation.short_circuit.verdict, Verdict::Fails);
/// ```
pub fn evaluate(input: &CalculationInput, profile: &CodeProfile) -> CalcResult<Evaluation> {
    profile.validate()?;

    let ampacity = ampacity::calculate(&input.ampacity_input(), profile)?;

    let (drop_input, current_source) = input.voltage_drop_input(ampacity.load_current_a);
    let voltage_drop = voltage_drop::calculate_with_source(&drop_input, current_source, profile)?;

    let conduit_fill = conduit_fill::calculate(&input.conduit_fill_input())?;
    let short_circuit = short_circuit::calculate(&input.short_circuit_input(), profile)?;

    let (power_factor, power_factor_supplied) = input.effective_power_factor();

    let evaluation = Evaluation {
        input: input.clone(),
        profile: profile.clone(),
        power_factor,
        power_factor_supplied,
        ampacity,
        voltage_drop,
        conduit_fill,
        short_circuit,
    };

    info!(label = %input.label, overall = %evaluation.overall(), "circuit evaluated");
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec_factors::KFactorMode;

    #[test]
    fn test_verdict_passes() {
        assert!(Verdict::Complies.passes());
        assert!(!Verdict::Attention.passes());
        assert!(!Verdict::Fails.passes());
        assert!(!Verdict::NotComputed.passes());
    }

    #[test]
    fn test_verdict_worst() {
        assert_eq!(Verdict::Complies.worst(Verdict::Attention), Verdict::Attention);
        assert_eq!(Verdict::Fails.worst(Verdict::Attention), Verdict::Fails);
        assert_eq!(Verdict::Attention.worst(Verdict::NotComputed), Verdict::NotComputed);
        assert_eq!(Verdict::Complies.worst(Verdict::Complies), Verdict::Complies);
    }

    #[test]
    fn test_evaluate_reference_circuit() {
        let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();

        assert_eq!(evaluation.ampacity.load_current_a, 10.5);
        assert_eq!(evaluation.ampacity.verdict, Verdict::Complies);
        // Receptacles → pf 0.90, K = 5 → 5.23 %
        assert_eq!(evaluation.power_factor, 0.90);
        assert!(!evaluation.power_factor_supplied);
        assert_eq!(evaluation.voltage_drop.current_a, 10.5);
        assert!((evaluation.voltage_drop.percent_drop - 5.23).abs() < 0.01);
        assert_eq!(evaluation.conduit_fill.recommended_trade_size.as_deref(), Some("1/2\""));
        assert_eq!(evaluation.short_circuit.minimum_gauge_label(), "2/0 AWG");
        assert_eq!(evaluation.overall(), Verdict::Fails);
        assert!(!evaluation.passes());
    }

    #[test]
    fn test_supplied_values_take_precedence() {
        let mut input = CalculationInput::example();
        input.current_a = Some(8.0);
        input.power_factor = Some(1.0);

        let evaluation = evaluate(&input, &CodeProfile::default()).unwrap();
        assert_eq!(evaluation.voltage_drop.current_a, 8.0);
        assert_eq!(evaluation.voltage_drop.current_source, CurrentSource::Supplied);
        assert_eq!(evaluation.power_factor, 1.0);
        assert!(evaluation.power_factor_supplied);
    }

    #[test]
    fn test_passing_circuit() {
        let mut input = CalculationInput::example();
        input.gauge = "2/0 AWG".to_string();
        input.trade_size = "1-1/2\"".to_string();

        let profile = CodeProfile::new().with_k_factor(KFactorMode::Nec);
        let evaluation = evaluate(&input, &profile).unwrap();
        assert_eq!(evaluation.overall(), Verdict::Complies);
    }

    #[test]
    fn test_degenerate_short_circuit_does_not_abort() {
        let mut input = CalculationInput::example();
        input.fault_current_a = 0.0;

        let evaluation = evaluate(&input, &CodeProfile::default()).unwrap();
        assert_eq!(evaluation.short_circuit.verdict, Verdict::NotComputed);
        assert!(!evaluation.passes());
    }

    #[test]
    fn test_first_error_is_returned() {
        let mut input = CalculationInput::example();
        input.gauge = "13 AWG".to_string();
        assert!(evaluate(&input, &CodeProfile::default()).unwrap_err().is_unknown_key());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let profile = CodeProfile::default();
        let a = evaluate(&CalculationInput::example(), &profile).unwrap();
        let b = evaluate(&CalculationInput::example(), &profile).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_input_json_defaults() {
        let json = r#"{
            "label": "C-2",
            "load_va": 1800.0,
            "service_voltage_v": 120.0,
            "phase": "Single",
            "load_type": "Lighting",
            "gauge": "12",
            "active_conductors": 2,
            "length_m": 10.0,
            "fault_current_a": 5000.0,
            "clearing_time_s": 0.1,
            "material": "EMT",
            "trade_size": "1/2",
            "wire_count": 3
        }"#;
        let input: CalculationInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.temperature_band, DEFAULT_BAND);
        assert_eq!(input.power_factor, None);
        assert_eq!(input.effective_power_factor(), (0.95, false));

        let evaluation = evaluate(&input, &CodeProfile::default()).unwrap();
        assert_eq!(evaluation.ampacity.temperature_factor, 1.0);
    }
}
