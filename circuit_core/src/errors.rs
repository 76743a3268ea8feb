//! # Error Types
//!
//! Structured error types for circuit_core. Errors are informative for both
//! humans and programmatic consumers: each variant carries the offending key
//! or field so a caller can point the user at the exact input to fix.
//!
//! The engine distinguishes three situations:
//!
//! - **Unknown key**: a gauge, temperature band or conduit trade size that is
//!   not in the reference tables. Always surfaced, never defaulted.
//! - **Invalid input**: a value out of its physical or code range. Rejected
//!   before any arithmetic so no result ever carries NaN.
//! - **Degenerate input** (zero fault current or clearing time) is *not* an
//!   error; the short-circuit module reports it as `Verdict::NotComputed`.
//!
//! ## Example
//!
//! ```rust
//! use circuit_core::errors::{CalcError, CalcResult};
//!
//! fn validate_length(length_m: f64) -> CalcResult<()> {
//!     if length_m < 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "length_m",
//!             length_m.to_string(),
//!             "Circuit length cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_length(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for circuit_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Conductor gauge not present in the conductor table
    #[error("Unknown conductor gauge: {gauge}")]
    UnknownGauge { gauge: String },

    /// Ambient temperature band not present in the correction table
    #[error("Unknown ambient temperature band: {band}")]
    UnknownTemperatureBand { band: String },

    /// Trade size not tabulated for the given conduit material
    #[error("Unknown conduit trade size '{trade_size}' for {material}")]
    UnknownTradeSize { trade_size: String, material: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Report rendering failed (Typst compilation or PDF export)
    #[error("Report error: {stage} - {reason}")]
    ReportError { stage: String, reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownGauge error
    pub fn unknown_gauge(gauge: impl Into<String>) -> Self {
        CalcError::UnknownGauge { gauge: gauge.into() }
    }

    /// Create an UnknownTemperatureBand error
    pub fn unknown_band(band: impl Into<String>) -> Self {
        CalcError::UnknownTemperatureBand { band: band.into() }
    }

    /// Create an UnknownTradeSize error
    pub fn unknown_trade_size(trade_size: impl Into<String>, material: impl Into<String>) -> Self {
        CalcError::UnknownTradeSize {
            trade_size: trade_size.into(),
            material: material.into(),
        }
    }

    /// Create a ReportError
    pub fn report(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ReportError {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// True when the error names a key missing from a reference table
    pub fn is_unknown_key(&self) -> bool {
        matches!(
            self,
            CalcError::UnknownGauge { .. }
                | CalcError::UnknownTemperatureBand { .. }
                | CalcError::UnknownTradeSize { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnknownGauge { .. } => "UNKNOWN_GAUGE",
            CalcError::UnknownTemperatureBand { .. } => "UNKNOWN_BAND",
            CalcError::UnknownTradeSize { .. } => "UNKNOWN_TRADE_SIZE",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::ReportError { .. } => "REPORT_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

/// Reject NaN and infinities before they reach a formula.
pub(crate) fn ensure_finite(field: &str, value: f64) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"))
    }
}
