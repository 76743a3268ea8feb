//! # circuit_core - Branch-Circuit Sizing Engine
//!
//! `circuit_core` checks a low-voltage copper branch circuit against four
//! code requirements and assembles a calculation record for it. All inputs
//! and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over immutable reference tables
//! - **JSON-First**: All inputs, results and reports serialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Explicit Policy**: Every alternative code rule is a [`CodeProfile`] option
//!
//! ## Quick Start
//!
//! ```rust
//! use circuit_core::{evaluate, CalculationInput, CodeProfile, Report};
//!
//! let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();
//! assert_eq!(evaluation.ampacity.suggested_breaker_a, 15.0);
//!
//! let report = Report::from_evaluation(&evaluation);
//! println!("{}", report);
//! ```
//!
//! ## Modules
//!
//! - [`tables`] - Conductor, breaker, temperature and conduit reference data
//! - [`nec_factors`] - Code policy options and adjustment factors
//! - [`calculations`] - Ampacity, voltage drop, conduit fill and short-circuit checks
//! - [`report`] - Renderer-neutral calculation record
//! - [`study`] - Multi-circuit study container
//! - [`pdf`] - Typst PDF rendering
//! - [`equations`] - Equation registry and appendix generation
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod nec_factors;
pub mod pdf;
pub mod report;
pub mod study;
pub mod tables;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{evaluate, CalculationInput, Evaluation, Verdict};
pub use errors::{CalcError, CalcResult};
pub use nec_factors::CodeProfile;
pub use report::Report;
pub use study::{Study, StudyMetadata};
