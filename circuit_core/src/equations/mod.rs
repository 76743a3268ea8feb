//! # Circuit Equations
//!
//! Metadata for every formula the circuit checks apply. Having equations in
//! one place enables:
//! - Easy verification against code references (NEC, ICEA)
//! - Documentation of assumptions and conventions
//! - A "List of Equations" appendix in generated reports
//!
//! The formulas themselves live beside the checks that use them
//! ([`crate::calculations`]); the registry points back at each one.
//!
//! ## Conventions
//!
//! - **Current**: RMS amperes; line current for three-phase systems
//! - **Voltage**: line-to-line for three-phase systems
//! - **Length**: one-way circuit length in metres
//! - **Limits**: inclusive, a value equal to its limit complies
//!
//! ## References
//!
//! - NFPA 70: National Electrical Code (and national adoptions sharing its numbering)
//! - ICEA P-32-382: Short-circuit characteristics of insulated cable
//! - IEEE 3002.3: Recommended practice for short-circuit studies

pub mod registry;

pub use registry::{
    generate_equations_markdown, generate_static_equations_appendix_typst, CodeReference, Equation,
    EquationCategory, EquationMetadata, EquationTracker, EquationUsage, Variable, ALL_EQUATIONS,
};
