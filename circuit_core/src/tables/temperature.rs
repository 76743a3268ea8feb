//! Ambient Temperature Correction (Table 310.15(B)(1))
//!
//! Correction factors for ambient temperatures other than 30 °C, taken from
//! the 90 °C insulation column. Six bands cover 21–50 °C with no gaps.

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};

/// One ambient-temperature band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureBand {
    /// Display label, also the lookup key (e.g., "36-40 °C (0.91)")
    pub label: &'static str,
    /// Lowest ambient in the band (°C, inclusive)
    pub min_c: f64,
    /// Highest ambient in the band (°C, inclusive)
    pub max_c: f64,
    /// Multiplicative correction factor
    pub factor: f64,
}

impl TemperatureBand {
    /// Short range key without the factor suffix ("36-40")
    pub fn range_key(&self) -> &'static str {
        self.label.split(' ').next().unwrap_or(self.label)
    }
}

/// Correction bands, ascending by temperature.
pub static TEMPERATURE_BANDS: [TemperatureBand; 6] = [
    TemperatureBand { label: "21-25 °C (1.04)", min_c: 21.0, max_c: 25.0, factor: 1.04 },
    TemperatureBand { label: "26-30 °C (1.00)", min_c: 26.0, max_c: 30.0, factor: 1.00 },
    TemperatureBand { label: "31-35 °C (0.96)", min_c: 31.0, max_c: 35.0, factor: 0.96 },
    TemperatureBand { label: "36-40 °C (0.91)", min_c: 36.0, max_c: 40.0, factor: 0.91 },
    TemperatureBand { label: "41-45 °C (0.87)", min_c: 41.0, max_c: 45.0, factor: 0.87 },
    TemperatureBand { label: "46-50 °C (0.82)", min_c: 46.0, max_c: 50.0, factor: 0.82 },
];

/// Band whose code row is 30 °C (factor 1.00)
pub const DEFAULT_BAND: &str = "26-30 °C (1.00)";

/// Look up a band by its full label or its range key ("36-40").
pub fn temperature_band(band: &str) -> CalcResult<&'static TemperatureBand> {
    let wanted = band.trim();
    TEMPERATURE_BANDS
        .iter()
        .find(|b| b.label == wanted || b.range_key() == wanted)
        .ok_or_else(|| CalcError::unknown_band(band))
}

/// Correction factor for a band label.
///
/// # Example
///
/// ```rust
/// use circuit_core::tables::temperature_factor;
///
/// assert_eq!(temperature_factor("36-40 °C (0.91)").unwrap(), 0.91);
/// assert!(temperature_factor("60-65 °C").is_err());
/// ```
pub fn temperature_factor(band: &str) -> CalcResult<f64> {
    temperature_band(band).map(|b| b.factor)
}

/// Band containing an ambient temperature in °C.
///
/// Bands are integer ranges; fractional ambients round up to the next
/// whole degree so that 25.5 °C falls into the hotter band.
pub fn band_for_ambient(ambient_c: f64) -> CalcResult<&'static TemperatureBand> {
    let rounded = ambient_c.ceil();
    TEMPERATURE_BANDS
        .iter()
        .find(|b| rounded >= b.min_c && rounded <= b.max_c)
        .ok_or_else(|| CalcError::unknown_band(format!("{} °C", ambient_c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_range() {
        for b in TEMPERATURE_BANDS.iter() {
            assert!(b.factor > 0.0 && b.factor <= 1.1, "{}", b.label);
        }
    }

    #[test]
    fn test_bands_contiguous() {
        for pair in TEMPERATURE_BANDS.windows(2) {
            assert_eq!(pair[1].min_c, pair[0].max_c + 1.0);
            assert!(pair[1].factor < pair[0].factor);
        }
    }

    #[test]
    fn test_lookup_by_label_and_range() {
        assert_eq!(temperature_factor("36-40 °C (0.91)").unwrap(), 0.91);
        assert_eq!(temperature_factor("36-40").unwrap(), 0.91);
        assert_eq!(temperature_factor(DEFAULT_BAND).unwrap(), 1.0);
    }

    #[test]
    fn test_unknown_band() {
        let err = temperature_factor("51-55 °C").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_BAND");
    }

    #[test]
    fn test_band_for_ambient() {
        assert_eq!(band_for_ambient(30.0).unwrap().factor, 1.00);
        assert_eq!(band_for_ambient(25.5).unwrap().range_key(), "26-30");
        assert_eq!(band_for_ambient(38.0).unwrap().range_key(), "36-40");
        assert!(band_for_ambient(55.0).is_err());
        assert!(band_for_ambient(10.0).is_err());
    }
}
