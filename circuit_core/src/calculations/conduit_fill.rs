//! # Conduit Fill
//!
//! Occupied conductor area against the internal area of a raceway, with the
//! percentage limits of Chapter 9 Table 1.
//!
//! | Conductors | Maximum fill |
//! |------------|--------------|
//! | 1          | 53 %         |
//! | 2          | 31 %         |
//! | 3 or more  | 40 %         |
//!
//! Two answers come out of one input: the smallest trade size that would
//! work (the recommendation) and the fill of the trade size the user chose
//! (the verification).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::Verdict;
use crate::errors::{ensure_finite, CalcError, CalcResult};
use crate::tables::{conductor, conduit, smallest_conduit_with_area, ConduitMaterial};

/// Where the per-conductor area came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaSource {
    /// Conductor table for the selected gauge
    GaugeTable,
    /// Area entered by the user
    Override,
}

impl AreaSource {
    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            AreaSource::GaugeTable => "gauge table",
            AreaSource::Override => "user override",
        }
    }
}

/// Maximum fill (%) for a conductor count.
pub fn fill_limit_percent(wire_count: u32) -> f64 {
    match wire_count {
        1 => 53.0,
        2 => 31.0,
        _ => 40.0,
    }
}

/// Input parameters for the conduit-fill check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "wire_count": 4,
///   "gauge": "12 AWG",
///   "unit_area_override_mm2": null,
///   "material": "PVC40",
///   "trade_size": "1/2\""
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConduitFillInput {
    /// All conductors in the raceway (phase, neutral and ground)
    pub wire_count: u32,

    /// Conductor gauge label, source of the unit area
    pub gauge: String,

    /// Explicit per-conductor area (mm²), replaces the table value
    #[serde(default)]
    pub unit_area_override_mm2: Option<f64>,

    /// Raceway material
    pub material: ConduitMaterial,

    /// Trade size to verify
    pub trade_size: String,
}

impl ConduitFillInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.wire_count == 0 {
            return Err(CalcError::invalid_input(
                "wire_count",
                "0",
                "At least one conductor is required",
            ));
        }
        if let Some(area) = self.unit_area_override_mm2 {
            ensure_finite("unit_area_override_mm2", area)?;
            if area <= 0.0 {
                return Err(CalcError::invalid_input(
                    "unit_area_override_mm2",
                    area.to_string(),
                    "Conductor area must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Set a per-conductor area override
    pub fn with_unit_area(mut self, area_mm2: f64) -> Self {
        self.unit_area_override_mm2 = Some(area_mm2);
        self
    }
}

/// Results from the conduit-fill check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConduitFillResult {
    /// Area of one conductor (mm²)
    pub unit_area_mm2: f64,

    /// Whether the unit area came from the table or an override
    pub area_source: AreaSource,

    /// Total conductor area (mm²)
    pub occupied_area_mm2: f64,

    /// Applicable fill limit (%)
    pub fill_limit_percent: f64,

    /// Conduit area needed at 100 % so the fill stays within the limit (mm²)
    pub required_area_mm2: f64,

    /// Smallest trade size that fits; `None` when no tabulated size does
    pub recommended_trade_size: Option<String>,

    /// Trade size that was verified
    pub verified_trade_size: String,

    /// Internal area of the verified trade size (mm²)
    pub conduit_area_mm2: f64,

    /// Fill of the verified trade size (%)
    pub fill_percent: f64,

    /// COMPLIES when fill ≤ limit, FAILS (saturated) otherwise
    pub verdict: Verdict,
}

impl ConduitFillResult {
    /// Check if the verified conduit is within its limit
    pub fn passes(&self) -> bool {
        self.verdict.passes()
    }

    /// Recommendation text, with the "no size available" sentinel spelled out
    pub fn recommendation_label(&self) -> &str {
        self.recommended_trade_size.as_deref().unwrap_or("no size available")
    }
}

/// Run the conduit-fill check.
///
/// # Example
///
/// ```rust
/// use circuit_core::calculations::conduit_fill::{calculate, ConduitFillInput};
/// use circuit_core::tables::ConduitMaterial;
///
/// let input = ConduitFillInput {
///     wire_count: 4,
///     gauge: "12 AWG".to_string(),
///     unit_area_override_mm2: None,
///     material: ConduitMaterial::Pvc40,
///     trade_size: "1/2\"".to_string(),
/// };
///
/// let result = calculate(&input).unwrap();
/// assert_eq!(result.recommended_trade_size.as_deref(), Some("1/2\""));
/// assert!(result.passes());
/// ```
pub fn calculate(input: &ConduitFillInput) -> CalcResult<ConduitFillResult> {
    input.validate()?;

    let (unit_area_mm2, area_source) = match input.unit_area_override_mm2 {
        Some(area) => (area, AreaSource::Override),
        None => (conductor(&input.gauge)?.area_mm2, AreaSource::GaugeTable),
    };
    let verified = conduit(&input.trade_size, input.material)?;

    let occupied_area_mm2 = f64::from(input.wire_count) * unit_area_mm2;
    let fill_limit_percent = fill_limit_percent(input.wire_count);
    let required_area_mm2 = occupied_area_mm2 * 100.0 / fill_limit_percent;
    ensure_finite("occupied_area_mm2", occupied_area_mm2)?;
    ensure_finite("required_area_mm2", required_area_mm2)?;

    let recommended_trade_size =
        smallest_conduit_with_area(required_area_mm2, input.material).map(|c| c.trade_size.to_string());
    if recommended_trade_size.is_none() {
        warn!(
            required_area_mm2,
            material = input.material.code(),
            "no tabulated conduit is large enough"
        );
    }

    let conduit_area_mm2 = verified.area_mm2(input.material);
    let fill_percent = occupied_area_mm2 * 100.0 / conduit_area_mm2;
    ensure_finite("fill_percent", fill_percent)?;
    let verdict = if fill_percent <= fill_limit_percent {
        Verdict::Complies
    } else {
        Verdict::Fails
    };

    debug!(
        wire_count = input.wire_count,
        occupied_area_mm2,
        fill_limit_percent,
        fill_percent,
        trade_size = verified.trade_size,
        ?verdict,
        "conduit fill check"
    );

    Ok(ConduitFillResult {
        unit_area_mm2,
        area_source,
        occupied_area_mm2,
        fill_limit_percent,
        required_area_mm2,
        recommended_trade_size,
        verified_trade_size: verified.trade_size.to_string(),
        conduit_area_mm2,
        fill_percent,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> ConduitFillInput {
        ConduitFillInput {
            wire_count: 4,
            gauge: "12 AWG".to_string(),
            unit_area_override_mm2: None,
            material: ConduitMaterial::Pvc40,
            trade_size: "1/2\"".to_string(),
        }
    }

    #[test]
    fn test_fill_limits() {
        assert_eq!(fill_limit_percent(1), 53.0);
        assert_eq!(fill_limit_percent(2), 31.0);
        assert_eq!(fill_limit_percent(3), 40.0);
        assert_eq!(fill_limit_percent(40), 40.0);
    }

    #[test]
    fn test_reference_case() {
        let result = calculate(&test_input()).unwrap();

        assert_eq!(result.area_source, AreaSource::GaugeTable);
        assert!((result.occupied_area_mm2 - 13.24).abs() < 1e-9);
        assert_eq!(result.fill_limit_percent, 40.0);
        assert!((result.required_area_mm2 - 33.1).abs() < 1e-9);
        assert_eq!(result.recommended_trade_size.as_deref(), Some("1/2\""));
        assert_eq!(result.conduit_area_mm2, 184.0);
        // 13.24 / 184 = 7.2 %
        assert!((result.fill_percent - 7.196).abs() < 0.01);
        assert_eq!(result.verdict, Verdict::Complies);
    }

    #[test]
    fn test_fill_exactly_at_limit_complies() {
        // 4 × 53.5 = 214 mm² in 535 mm² is exactly 40 %
        let input = ConduitFillInput {
            trade_size: "1\"".to_string(),
            ..test_input()
        }
        .with_unit_area(53.5);
        let result = calculate(&input).unwrap();

        assert_eq!(result.area_source, AreaSource::Override);
        assert_eq!(result.fill_percent, 40.0);
        assert_eq!(result.verdict, Verdict::Complies);
        assert_eq!(result.recommended_trade_size.as_deref(), Some("1\""));
    }

    #[test]
    fn test_saturated_conduit() {
        // 4 × 53.5 = 214 mm² in 1/2" PVC (184 mm²) overfills
        let input = test_input().with_unit_area(53.5);
        let result = calculate(&input).unwrap();

        assert!(result.fill_percent > 100.0);
        assert_eq!(result.verdict, Verdict::Fails);
        assert!(!result.passes());
        assert_eq!(result.recommended_trade_size.as_deref(), Some("1\""));
    }

    #[test]
    fn test_single_and_two_wire_limits() {
        let mut input = test_input();
        input.wire_count = 1;
        assert_eq!(calculate(&input).unwrap().fill_limit_percent, 53.0);

        input.wire_count = 2;
        assert_eq!(calculate(&input).unwrap().fill_limit_percent, 31.0);
    }

    #[test]
    fn test_no_size_available() {
        // 40 × 107.2 mm² needs 10 720 mm² at 40 %, more than 4" EMT
        let input = ConduitFillInput {
            wire_count: 40,
            gauge: "4/0 AWG".to_string(),
            material: ConduitMaterial::Emt,
            trade_size: "4\"".to_string(),
            unit_area_override_mm2: None,
        };
        let result = calculate(&input).unwrap();

        assert!(result.recommended_trade_size.is_none());
        assert_eq!(result.recommendation_label(), "no size available");
        assert_eq!(result.verdict, Verdict::Fails);
    }

    #[test]
    fn test_material_changes_area() {
        let mut input = test_input();
        input.material = ConduitMaterial::Emt;
        assert_eq!(calculate(&input).unwrap().conduit_area_mm2, 196.0);

        input.material = ConduitMaterial::Arg;
        assert_eq!(calculate(&input).unwrap().conduit_area_mm2, 204.0);
    }

    #[test]
    fn test_override_skips_gauge_lookup() {
        let mut input = test_input().with_unit_area(5.0);
        input.gauge = "not a gauge".to_string();
        assert!(calculate(&input).is_ok());
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = test_input();
        input.wire_count = 0;
        assert!(calculate(&input).is_err());

        assert!(calculate(&test_input().with_unit_area(0.0)).is_err());
        assert!(calculate(&test_input().with_unit_area(f64::NAN)).is_err());
    }

    #[test]
    fn test_overflowing_area_rejected() {
        let err = calculate(&test_input().with_unit_area(1e308)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_unknown_keys() {
        let mut input = test_input();
        input.gauge = "13 AWG".to_string();
        assert!(calculate(&input).unwrap_err().is_unknown_key());

        let mut input = test_input();
        input.trade_size = "5\"".to_string();
        assert!(calculate(&input).unwrap_err().is_unknown_key());
    }
}
