//! # Equation Registry
//!
//! Central registry of every formula the circuit checks apply. Each equation
//! has metadata including code references, formulas, and variable definitions.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe equation identification via the `Equation` enum
//! - Full metadata for PDF generation and audit trails
//! - Serialization support for JSON export
//!
//! ## Usage
//!
//! ```rust
//! use circuit_core::equations::registry::{Equation, EquationUsage};
//!
//! // Track equation usage during calculation
//! let usage = EquationUsage::new(Equation::VoltageDrop, "Feeder F-1");
//!
//! // Get metadata for PDF appendix
//! let meta = Equation::VoltageDrop.metadata();
//! println!("Formula: {}", meta.formula_typst);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::calculations::{Evaluation, Verdict};
use crate::nec_factors::{SystemPhase, TerminalCapPolicy};

// ============================================================================
// Code References
// ============================================================================

/// Reference to an electrical code or standard.
///
/// All equations should cite their source for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeReference {
    /// National Electrical Code (NFPA 70) and national adoptions sharing its numbering
    Nec { year: u16, section: &'static str },
    /// Insulated Cable Engineers Association publication
    Icea { standard: &'static str },
    /// IEEE recommended practice
    Ieee { standard: &'static str, clause: &'static str },
    /// Circuit theory (no specific code reference needed)
    CircuitTheory,
}

impl CodeReference {
    /// Format the reference for display in PDF reports
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Nec { year, section } => format!("NEC {} {}", year, section),
            CodeReference::Icea { standard } => format!("ICEA {}", standard),
            CodeReference::Ieee { standard, clause } => format!("IEEE {} clause {}", standard, clause),
            CodeReference::CircuitTheory => "Circuit Theory".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            CodeReference::Nec { .. } => "NEC",
            CodeReference::Icea { .. } => "ICEA",
            CodeReference::Ieee { .. } => "IEEE",
            CodeReference::CircuitTheory => "Theory",
        }
    }
}

const NEC_YEAR: u16 = 2020;

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for organizing equations in the PDF appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Load and design current
    LoadCurrent,
    /// Temperature and grouping derating
    AdjustmentFactors,
    /// Corrected and terminal-limited ampacity
    Ampacity,
    /// Overcurrent device selection
    Protection,
    /// Impedance and voltage drop
    VoltageDrop,
    /// Raceway fill
    ConduitFill,
    /// Thermal withstand during a fault
    ShortCircuit,
    /// Pass / fail comparisons
    DesignChecks,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::LoadCurrent => "Load Current",
            EquationCategory::AdjustmentFactors => "Adjustment Factors",
            EquationCategory::Ampacity => "Ampacity",
            EquationCategory::Protection => "Overcurrent Protection",
            EquationCategory::VoltageDrop => "Voltage Drop",
            EquationCategory::ConduitFill => "Conduit Fill",
            EquationCategory::ShortCircuit => "Short-Circuit Withstand",
            EquationCategory::DesignChecks => "Design Checks",
        }
    }

    /// Sort order for PDF appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::LoadCurrent => 1,
            EquationCategory::AdjustmentFactors => 2,
            EquationCategory::Ampacity => 3,
            EquationCategory::Protection => 4,
            EquationCategory::VoltageDrop => 5,
            EquationCategory::ConduitFill => 6,
            EquationCategory::ShortCircuit => 7,
            EquationCategory::DesignChecks => 8,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
///
/// `symbol` is Typst math; multi-letter subscripts are quoted.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "I", "Z_\"eff\"")
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "A", "Ω/km", "mm²")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }

    /// Symbol without Typst quoting, for markdown
    pub fn plain_symbol(&self) -> String {
        self.symbol.replace('"', "")
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for a circuit equation.
///
/// This struct contains everything needed to:
/// - Display the equation in a PDF report
/// - Document its source for audit purposes
/// - Explain its variables and assumptions
/// - Generate markdown documentation for auditability
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name (e.g., "Voltage Drop")
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in Typst math notation for PDF rendering
    pub formula_typst: &'static str,
    /// The formula in plain text for markdown (human-readable)
    pub formula_plain: &'static str,
    /// Code/standard reference
    pub reference: CodeReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping in appendix
    pub category: EquationCategory,
    /// Source module where the equation implementation lives
    pub source_module: &'static str,
    /// Function name implementing the equation (for linking)
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All equations used by the circuit checks.
///
/// Each variant maps to a specific formula with full metadata.
/// This enum is the primary interface for equation tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    // -------------------------------------------------------------------------
    // Load Current
    // -------------------------------------------------------------------------
    /// I = S / V
    LoadCurrentSinglePhase,
    /// I = S / (√3 · V)
    LoadCurrentThreePhase,
    /// I_d = 1.25 · I
    ContinuousLoadDesignCurrent,

    // -------------------------------------------------------------------------
    // Adjustment Factors
    // -------------------------------------------------------------------------
    /// F_t from the ambient band
    TemperatureCorrection,
    /// F_g from the conductor count
    GroupingAdjustment,

    // -------------------------------------------------------------------------
    // Ampacity
    // -------------------------------------------------------------------------
    /// A' = A_base · F_t · F_g
    CorrectedAmpacity,
    /// A_final = min(A', A_75)
    TerminalLimit,

    // -------------------------------------------------------------------------
    // Protection
    // -------------------------------------------------------------------------
    /// Smallest standard rating ≥ I_d
    BreakerSelection,

    // -------------------------------------------------------------------------
    // Voltage Drop
    // -------------------------------------------------------------------------
    /// Z = R cos θ + X sin θ
    EffectiveImpedance,
    /// ΔV = K · I · L · Z
    VoltageDrop,
    /// e = ΔV / V · 100
    PercentVoltageDrop,

    // -------------------------------------------------------------------------
    // Conduit Fill
    // -------------------------------------------------------------------------
    /// A_occ = n · a
    OccupiedArea,
    /// 53 / 31 / 40 %
    FillLimit,
    /// A_req = A_occ · 100 / f_max
    RequiredConduitArea,
    /// f = A_occ / A_c · 100
    FillPercent,

    // -------------------------------------------------------------------------
    // Short Circuit
    // -------------------------------------------------------------------------
    /// kcmil = I · √t / K
    MinimumThermalSection,
    /// I_max = K · kcmil / √t
    MaximumWithstandCurrent,

    // -------------------------------------------------------------------------
    // Design Checks
    // -------------------------------------------------------------------------
    /// A_final ≥ I_d
    AmpacityCheck,
    /// e ≤ 3 % (5 %)
    RegulationLimit,
    /// f ≤ f_max
    FillCheck,
    /// kcmil ≥ kcmil_min
    WithstandCheck,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            // Load Current
            Equation::LoadCurrentSinglePhase => EquationMetadata {
                name: "Single-Phase Load Current",
                description: "Line current drawn by a single-phase load",
                formula_typst: r#"$I = S / V$"#,
                formula_plain: "I = S / V",
                reference: CodeReference::CircuitTheory,
                variables: vec![
                    Variable::new("I", "Load current", "A"),
                    Variable::new("S", "Apparent power of the load", "VA"),
                    Variable::new("V", "Service voltage", "V"),
                ],
                assumptions: vec!["Balanced sinusoidal supply"],
                category: EquationCategory::LoadCurrent,
                source_module: "calculations/ampacity.rs",
                source_function: "AmpacityInput::load_current_a",
            },

            Equation::LoadCurrentThreePhase => EquationMetadata {
                name: "Three-Phase Load Current",
                description: "Line current drawn by a balanced three-phase load",
                formula_typst: r#"$I = S / (sqrt(3) V)$"#,
                formula_plain: "I = S / (sqrt(3) * V)",
                reference: CodeReference::CircuitTheory,
                variables: vec![
                    Variable::new("I", "Line current", "A"),
                    Variable::new("S", "Apparent power of the load", "VA"),
                    Variable::new("V", "Line-to-line service voltage", "V"),
                ],
                assumptions: vec!["Balanced load", "V is line-to-line"],
                category: EquationCategory::LoadCurrent,
                source_module: "calculations/ampacity.rs",
                source_function: "AmpacityInput::load_current_a",
            },

            Equation::ContinuousLoadDesignCurrent => EquationMetadata {
                name: "Continuous Load Design Current",
                description: "Conductors and devices are sized for 125 % of a continuous load",
                formula_typst: r#"$I_d = 1.25 I$"#,
                formula_plain: "I_d = 1.25 * I",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "210.19(A)(1)" },
                variables: vec![
                    Variable::new("I_d", "Design current", "A"),
                    Variable::new("I", "Load current", "A"),
                ],
                assumptions: vec!["Load treated as continuous (3 hours or more)"],
                category: EquationCategory::LoadCurrent,
                source_module: "calculations/ampacity.rs",
                source_function: "calculate",
            },

            // Adjustment Factors
            Equation::TemperatureCorrection => EquationMetadata {
                name: "Ambient Temperature Correction",
                description: "Correction for ambient temperatures other than 30 °C",
                formula_typst: r#"$F_t = f("ambient band")$"#,
                formula_plain: "F_t = table factor for the ambient band",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Table 310.15(B)(1)" },
                variables: vec![Variable::new("F_t", "Temperature correction factor", "-")],
                assumptions: vec!["Six bands from 21 °C to 50 °C", "No interpolation inside a band"],
                category: EquationCategory::AdjustmentFactors,
                source_module: "tables/temperature.rs",
                source_function: "temperature_factor",
            },

            Equation::GroupingAdjustment => EquationMetadata {
                name: "Conductor Grouping Adjustment",
                description: "Derating for more than three current-carrying conductors in a raceway",
                formula_typst: r#"$F_g = cases(1.00 & n <= 3, 0.80 & 4 <= n <= 6, 0.70 & 7 <= n <= 9, 0.50 & 10 <= n <= 20, 0.45 & n > 20)$"#,
                formula_plain: "F_g = 1.00 (1-3), 0.80 (4-6), 0.70 (7-9), 0.50 (10-20), 0.45 (>20)",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "310.15(C)(1)" },
                variables: vec![
                    Variable::new("F_g", "Grouping adjustment factor", "-"),
                    Variable::new("n", "Current-carrying conductors", "-"),
                ],
                assumptions: vec!["Step function, no interpolation", "Basic policy stops at 0.70 for 7 or more"],
                category: EquationCategory::AdjustmentFactors,
                source_module: "nec_factors.rs",
                source_function: "GroupingPolicy::factor",
            },

            // Ampacity
            Equation::CorrectedAmpacity => EquationMetadata {
                name: "Corrected Ampacity",
                description: "Tabulated ampacity after temperature and grouping derating",
                formula_typst: r#"$A' = A_"base" dot F_t dot F_g$"#,
                formula_plain: "A' = A_base * F_t * F_g",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Table 310.16" },
                variables: vec![
                    Variable::new("A'", "Corrected ampacity", "A"),
                    Variable::new("A_\"base\"", "Tabulated ampacity of the selected column", "A"),
                    Variable::new("F_t", "Temperature correction factor", "-"),
                    Variable::new("F_g", "Grouping adjustment factor", "-"),
                ],
                assumptions: vec!["Copper conductors", "Not more than three conductors in free air"],
                category: EquationCategory::Ampacity,
                source_module: "calculations/ampacity.rs",
                source_function: "calculate",
            },

            Equation::TerminalLimit => EquationMetadata {
                name: "Terminal Temperature Limit",
                description: "Ampacity derated from the 90 °C column may not exceed the 75 °C terminal rating",
                formula_typst: r#"$A_"final" = min(A', A_75)$"#,
                formula_plain: "A_final = min(A', A_75)",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "110.14(C)" },
                variables: vec![
                    Variable::new("A_\"final\"", "Ampacity compared with the design current", "A"),
                    Variable::new("A'", "Corrected ampacity", "A"),
                    Variable::new("A_75", "75 °C column ampacity", "A"),
                ],
                assumptions: vec!["Terminals rated 75 °C"],
                category: EquationCategory::Ampacity,
                source_module: "calculations/ampacity.rs",
                source_function: "calculate",
            },

            // Protection
            Equation::BreakerSelection => EquationMetadata {
                name: "Standard Breaker Selection",
                description: "Smallest standard overcurrent device rating at or above the design current",
                formula_typst: r#"$I_n = min(r in R_"std" : r >= I_d)$"#,
                formula_plain: "I_n = smallest standard rating r with r >= I_d",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "240.6(A)" },
                variables: vec![
                    Variable::new("I_n", "Breaker rating", "A"),
                    Variable::new("R_\"std\"", "Standard ratings, 15 A to 250 A", "A"),
                    Variable::new("I_d", "Design current", "A"),
                ],
                assumptions: vec!["Design currents above 250 A are flagged and capped at 250 A"],
                category: EquationCategory::Protection,
                source_module: "tables/breakers.rs",
                source_function: "next_standard_breaker",
            },

            // Voltage Drop
            Equation::EffectiveImpedance => EquationMetadata {
                name: "Effective Impedance",
                description: "Conductor impedance projected on the load current phasor",
                formula_typst: r#"$Z_"eff" = R cos theta + X sin theta, quad theta = arccos("pf")$"#,
                formula_plain: "Z_eff = R * cos(theta) + X * sin(theta), theta = arccos(pf)",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Chapter 9 Table 9" },
                variables: vec![
                    Variable::new("Z_\"eff\"", "Effective impedance", "Ω/km"),
                    Variable::new("R", "AC resistance", "Ω/km"),
                    Variable::new("X", "Inductive reactance", "Ω/km"),
                    Variable::new("theta", "Power factor angle", "rad"),
                ],
                assumptions: vec!["60 Hz", "Conductors in PVC conduit", "0.80 ≤ pf ≤ 1.00"],
                category: EquationCategory::VoltageDrop,
                source_module: "calculations/voltage_drop.rs",
                source_function: "effective_impedance",
            },

            Equation::VoltageDrop => EquationMetadata {
                name: "Voltage Drop",
                description: "Voltage lost along the circuit run",
                formula_typst: r#"$Delta V = K dot I dot L / 1000 dot Z_"eff"$"#,
                formula_plain: "dV = K * I * (L / 1000) * Z_eff",
                reference: CodeReference::Ieee { standard: "3002.3", clause: "7.2" },
                variables: vec![
                    Variable::new("Delta V", "Voltage drop", "V"),
                    Variable::new("K", "Phase factor of the selected methodology", "-"),
                    Variable::new("I", "Circuit current", "A"),
                    Variable::new("L", "One-way length", "m"),
                    Variable::new("Z_\"eff\"", "Effective impedance", "Ω/km"),
                ],
                assumptions: vec!["K is configuration: 2.0 / 1.732 or 5.0 / 10.0 or custom"],
                category: EquationCategory::VoltageDrop,
                source_module: "calculations/voltage_drop.rs",
                source_function: "calculate_with_source",
            },

            Equation::PercentVoltageDrop => EquationMetadata {
                name: "Voltage Regulation",
                description: "Voltage drop as a percentage of the base voltage",
                formula_typst: r#"$e = (Delta V) / V_"base" dot 100$"#,
                formula_plain: "e = dV / V_base * 100",
                reference: CodeReference::CircuitTheory,
                variables: vec![
                    Variable::new("e", "Voltage regulation", "%"),
                    Variable::new("Delta V", "Voltage drop", "V"),
                    Variable::new("V_\"base\"", "Base voltage", "V"),
                ],
                assumptions: vec!["Base voltage is the service voltage"],
                category: EquationCategory::VoltageDrop,
                source_module: "calculations/voltage_drop.rs",
                source_function: "calculate_with_source",
            },

            // Conduit Fill
            Equation::OccupiedArea => EquationMetadata {
                name: "Occupied Conductor Area",
                description: "Total cross-section of all conductors in the raceway",
                formula_typst: r#"$A_"occ" = n dot a$"#,
                formula_plain: "A_occ = n * a",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Chapter 9 Table 5" },
                variables: vec![
                    Variable::new("A_\"occ\"", "Occupied area", "mm²"),
                    Variable::new("n", "Conductors in the raceway", "-"),
                    Variable::new("a", "Area of one conductor", "mm²"),
                ],
                assumptions: vec!["All conductors the same size", "Area from the gauge table unless overridden"],
                category: EquationCategory::ConduitFill,
                source_module: "calculations/conduit_fill.rs",
                source_function: "calculate",
            },

            Equation::FillLimit => EquationMetadata {
                name: "Maximum Fill",
                description: "Percentage of conduit area conductors may occupy",
                formula_typst: r#"$f_"max" = cases(53 "%" & n = 1, 31 "%" & n = 2, 40 "%" & n >= 3)$"#,
                formula_plain: "f_max = 53 % (1 wire), 31 % (2 wires), 40 % (3 or more)",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Chapter 9 Table 1" },
                variables: vec![
                    Variable::new("f_\"max\"", "Fill limit", "%"),
                    Variable::new("n", "Conductors in the raceway", "-"),
                ],
                assumptions: vec!["Raceway longer than 600 mm"],
                category: EquationCategory::ConduitFill,
                source_module: "calculations/conduit_fill.rs",
                source_function: "fill_limit_percent",
            },

            Equation::RequiredConduitArea => EquationMetadata {
                name: "Required Conduit Area",
                description: "Internal conduit area that keeps the fill at its limit",
                formula_typst: r#"$A_"req" = A_"occ" dot 100 / f_"max"$"#,
                formula_plain: "A_req = A_occ * 100 / f_max",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Chapter 9 Table 4" },
                variables: vec![
                    Variable::new("A_\"req\"", "Required internal area", "mm²"),
                    Variable::new("A_\"occ\"", "Occupied area", "mm²"),
                    Variable::new("f_\"max\"", "Fill limit", "%"),
                ],
                assumptions: vec!["Smallest tabulated size reaching the required area is recommended"],
                category: EquationCategory::ConduitFill,
                source_module: "calculations/conduit_fill.rs",
                source_function: "calculate",
            },

            Equation::FillPercent => EquationMetadata {
                name: "Conduit Fill",
                description: "Occupied fraction of the verified conduit",
                formula_typst: r#"$f = A_"occ" / A_c dot 100$"#,
                formula_plain: "f = A_occ / A_c * 100",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Chapter 9 Table 4" },
                variables: vec![
                    Variable::new("f", "Fill", "%"),
                    Variable::new("A_\"occ\"", "Occupied area", "mm²"),
                    Variable::new("A_c", "Internal area of the conduit", "mm²"),
                ],
                assumptions: vec!["Internal area at 100 % for the selected material"],
                category: EquationCategory::ConduitFill,
                source_module: "calculations/conduit_fill.rs",
                source_function: "calculate",
            },

            // Short Circuit
            Equation::MinimumThermalSection => EquationMetadata {
                name: "Minimum Thermal Section",
                description: "Smallest conductor section that survives the fault without damage",
                formula_typst: r#"$"kcmil"_"min" = (I_f sqrt(t)) / K$"#,
                formula_plain: "kcmil_min = I_f * sqrt(t) / K",
                reference: CodeReference::Icea { standard: "P-32-382" },
                variables: vec![
                    Variable::new("\"kcmil\"_\"min\"", "Minimum thermal section", "kcmil"),
                    Variable::new("I_f", "Fault current", "A"),
                    Variable::new("t", "Clearing time", "s"),
                    Variable::new("K", "Thermal constant (105 for 75 °C copper)", "-"),
                ],
                assumptions: vec!["Adiabatic heating", "Copper conductor, 75 °C insulation"],
                category: EquationCategory::ShortCircuit,
                source_module: "calculations/short_circuit.rs",
                source_function: "min_required_kcmil",
            },

            Equation::MaximumWithstandCurrent => EquationMetadata {
                name: "Maximum Withstand Current",
                description: "Largest fault current the selected conductor survives for the clearing time",
                formula_typst: r#"$I_"max" = (K dot "kcmil") / sqrt(t)$"#,
                formula_plain: "I_max = K * kcmil / sqrt(t)",
                reference: CodeReference::Icea { standard: "P-32-382" },
                variables: vec![
                    Variable::new("I_\"max\"", "Withstand current", "A"),
                    Variable::new("\"kcmil\"", "Section of the selected conductor", "kcmil"),
                    Variable::new("t", "Clearing time", "s"),
                    Variable::new("K", "Thermal constant", "-"),
                ],
                assumptions: vec!["Adiabatic heating"],
                category: EquationCategory::ShortCircuit,
                source_module: "calculations/short_circuit.rs",
                source_function: "max_withstand_current",
            },

            // Design Checks
            Equation::AmpacityCheck => EquationMetadata {
                name: "Ampacity Check",
                description: "Available ampacity must cover the design current",
                formula_typst: r#"$A_"final" >= I_d$"#,
                formula_plain: "A_final >= I_d",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "210.19(A)(1)" },
                variables: vec![
                    Variable::new("A_\"final\"", "Available ampacity", "A"),
                    Variable::new("I_d", "Design current", "A"),
                ],
                assumptions: vec![],
                category: EquationCategory::DesignChecks,
                source_module: "calculations/ampacity.rs",
                source_function: "calculate",
            },

            Equation::RegulationLimit => EquationMetadata {
                name: "Voltage Regulation Limit",
                description: "Branch circuits should not exceed 3 %, feeder and branch together 5 %",
                formula_typst: r#"$e <= 3 "%" quad ("attention up to" 5 "%")$"#,
                formula_plain: "e <= 3 % (attention up to 5 % under the tiered policy)",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "210.19(A) Informational Note 4" },
                variables: vec![Variable::new("e", "Voltage regulation", "%")],
                assumptions: vec!["Strict policy fails everything above 3 %"],
                category: EquationCategory::DesignChecks,
                source_module: "calculations/voltage_drop.rs",
                source_function: "classify_drop",
            },

            Equation::FillCheck => EquationMetadata {
                name: "Conduit Fill Check",
                description: "Fill of the verified conduit may not exceed the limit",
                formula_typst: r#"$f <= f_"max"$"#,
                formula_plain: "f <= f_max",
                reference: CodeReference::Nec { year: NEC_YEAR, section: "Chapter 9 Table 1" },
                variables: vec![
                    Variable::new("f", "Fill", "%"),
                    Variable::new("f_\"max\"", "Fill limit", "%"),
                ],
                assumptions: vec!["Exactly at the limit complies"],
                category: EquationCategory::DesignChecks,
                source_module: "calculations/conduit_fill.rs",
                source_function: "calculate",
            },

            Equation::WithstandCheck => EquationMetadata {
                name: "Thermal Withstand Check",
                description: "Selected conductor section must reach the minimum thermal section",
                formula_typst: r#"$"kcmil" >= "kcmil"_"min" quad <=> quad I_"max" >= I_f$"#,
                formula_plain: "kcmil >= kcmil_min (equivalently I_max >= I_f)",
                reference: CodeReference::Icea { standard: "P-32-382" },
                variables: vec![
                    Variable::new("\"kcmil\"", "Section of the selected conductor", "kcmil"),
                    Variable::new("\"kcmil\"_\"min\"", "Minimum thermal section", "kcmil"),
                ],
                assumptions: vec!["Not computed when fault current or clearing time is zero"],
                category: EquationCategory::DesignChecks,
                source_module: "calculations/short_circuit.rs",
                source_function: "calculate",
            },
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories that contain at least one equation
    pub fn all_categories() -> Vec<EquationCategory> {
        use EquationCategory::*;
        let mut cats = vec![
            LoadCurrent,
            AdjustmentFactors,
            Ampacity,
            Protection,
            VoltageDrop,
            ConduitFill,
            ShortCircuit,
            DesignChecks,
        ];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    // Load current
    Equation::LoadCurrentSinglePhase,
    Equation::LoadCurrentThreePhase,
    Equation::ContinuousLoadDesignCurrent,
    // Factors
    Equation::TemperatureCorrection,
    Equation::GroupingAdjustment,
    // Ampacity
    Equation::CorrectedAmpacity,
    Equation::TerminalLimit,
    // Protection
    Equation::BreakerSelection,
    // Voltage drop
    Equation::EffectiveImpedance,
    Equation::VoltageDrop,
    Equation::PercentVoltageDrop,
    // Conduit fill
    Equation::OccupiedArea,
    Equation::FillLimit,
    Equation::RequiredConduitArea,
    Equation::FillPercent,
    // Short circuit
    Equation::MinimumThermalSection,
    Equation::MaximumWithstandCurrent,
    // Checks
    Equation::AmpacityCheck,
    Equation::RegulationLimit,
    Equation::FillCheck,
    Equation::WithstandCheck,
];

// ============================================================================
// Equation Usage Tracking
// ============================================================================

/// Record of an equation being used in a calculation.
///
/// This struct is used to track which equations were applied during an
/// evaluation, enabling the "List of Equations" PDF appendix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationUsage {
    /// The equation that was used
    pub equation: Equation,
    /// Context describing where/why it was used (e.g., "Design current")
    pub context: String,
    /// Optional: the circuit label this equation was applied to
    pub circuit_label: Option<String>,
}

impl EquationUsage {
    /// Create a new equation usage record
    pub fn new(equation: Equation, context: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            circuit_label: None,
        }
    }

    /// Create usage record with circuit label
    pub fn for_circuit(equation: Equation, context: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            equation,
            context: context.into(),
            circuit_label: Some(label.into()),
        }
    }
}

/// Collector for equation usage across one or more evaluations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationTracker {
    usages: Vec<EquationUsage>,
}

impl EquationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an equation was used
    pub fn record(&mut self, equation: Equation, context: impl Into<String>) {
        self.usages.push(EquationUsage::new(equation, context));
    }

    /// Record equation usage for a specific circuit
    pub fn record_for_circuit(&mut self, equation: Equation, context: impl Into<String>, label: impl Into<String>) {
        self.usages.push(EquationUsage::for_circuit(equation, context, label));
    }

    /// Record every equation an evaluation applied.
    ///
    /// Phase picks the load current form, the terminal limit only appears
    /// under the capped policy, and a not-computed short-circuit check
    /// contributes no formulas.
    pub fn record_evaluation(&mut self, evaluation: &Evaluation) {
        let label = evaluation.input.label.as_str();

        let load_current = match evaluation.input.phase {
            SystemPhase::Single => Equation::LoadCurrentSinglePhase,
            SystemPhase::Three => Equation::LoadCurrentThreePhase,
        };
        self.record_for_circuit(load_current, "Load current", label);
        self.record_for_circuit(Equation::ContinuousLoadDesignCurrent, "Design current", label);
        self.record_for_circuit(Equation::TemperatureCorrection, "Ambient correction", label);
        self.record_for_circuit(Equation::GroupingAdjustment, "Grouping adjustment", label);
        self.record_for_circuit(Equation::CorrectedAmpacity, "Corrected ampacity", label);
        if evaluation.profile.terminal_cap == TerminalCapPolicy::Column90CappedAt75 {
            self.record_for_circuit(Equation::TerminalLimit, "Terminal limit", label);
        }
        self.record_for_circuit(Equation::AmpacityCheck, "Ampacity check", label);
        self.record_for_circuit(Equation::BreakerSelection, "Breaker selection", label);

        self.record_for_circuit(Equation::EffectiveImpedance, "Impedance", label);
        self.record_for_circuit(Equation::VoltageDrop, "Voltage drop", label);
        self.record_for_circuit(Equation::PercentVoltageDrop, "Regulation", label);
        self.record_for_circuit(Equation::RegulationLimit, "Regulation limit", label);

        self.record_for_circuit(Equation::OccupiedArea, "Occupied area", label);
        self.record_for_circuit(Equation::FillLimit, "Fill limit", label);
        self.record_for_circuit(Equation::RequiredConduitArea, "Required area", label);
        self.record_for_circuit(Equation::FillPercent, "Fill", label);
        self.record_for_circuit(Equation::FillCheck, "Fill check", label);

        if evaluation.short_circuit.verdict != Verdict::NotComputed {
            self.record_for_circuit(Equation::MinimumThermalSection, "Minimum section", label);
            self.record_for_circuit(Equation::MaximumWithstandCurrent, "Withstand current", label);
            self.record_for_circuit(Equation::WithstandCheck, "Withstand check", label);
        }
    }

    /// Tracker pre-filled from one evaluation
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        let mut tracker = Self::new();
        tracker.record_evaluation(evaluation);
        tracker
    }

    /// Get all recorded usages
    pub fn usages(&self) -> &[EquationUsage] {
        &self.usages
    }

    /// Get unique equations used (deduplicated)
    pub fn unique_equations(&self) -> Vec<Equation> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.equation))
            .map(|u| u.equation)
            .collect()
    }

    /// Group usages by equation for appendix generation
    pub fn by_equation(&self) -> HashMap<Equation, Vec<&EquationUsage>> {
        let mut map: HashMap<Equation, Vec<&EquationUsage>> = HashMap::new();
        for usage in &self.usages {
            map.entry(usage.equation).or_default().push(usage);
        }
        map
    }

    /// Group unique equations by category for appendix
    pub fn by_category(&self) -> Vec<(EquationCategory, Vec<Equation>)> {
        let mut by_cat: HashMap<EquationCategory, Vec<Equation>> = HashMap::new();
        for eq in self.unique_equations() {
            by_cat.entry(eq.metadata().category).or_default().push(eq);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    /// Merge another tracker into this one
    pub fn merge(&mut self, other: EquationTracker) {
        self.usages.extend(other.usages);
    }
}

// ============================================================================
// Typst Appendix Generation
// ============================================================================

impl EquationTracker {
    /// Generate Typst markup for the "List of Equations" appendix.
    ///
    /// The appendix is organized by category and shows each unique equation
    /// with its formula, reference, and the circuits it was applied to.
    ///
    /// # Example
    ///
    /// ```rust
    /// use circuit_core::equations::registry::{Equation, EquationTracker};
    ///
    /// let mut tracker = EquationTracker::new();
    /// tracker.record_for_circuit(Equation::VoltageDrop, "Voltage drop", "C-1");
    ///
    /// let typst = tracker.generate_appendix_typst();
    /// assert!(typst.contains("Voltage Drop"));
    /// ```
    pub fn generate_appendix_typst(&self) -> String {
        let mut output = String::new();

        output.push_str(r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Appendix: List of Equations]
  ]
]

#v(12pt)

#text(size: 10pt)[
  This appendix lists the equations applied in this calculation record.
  Each equation includes its formula, code reference, and the circuits to which it was applied.
]

#v(16pt)
"##);

        let by_category = self.by_category();

        if by_category.is_empty() {
            output.push_str("#text(style: \"italic\")[No equations recorded for this study.]\n");
            return output;
        }

        let usage_by_eq = self.by_equation();

        for (category, equations) in by_category {
            output.push_str(&format!("\n== {}\n\n", category.display_name()));

            for equation in equations {
                let meta = equation.metadata();

                output.push_str(&format!("=== {}\n\n", meta.name));
                output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
                output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));
                output.push_str(&format!("*Reference:* {}\n\n", meta.reference.citation()));

                if !meta.variables.is_empty() {
                    output.push_str("*Variables:*\n");
                    output.push_str("#table(\n");
                    output.push_str("  columns: (auto, 1fr, auto),\n");
                    output.push_str("  inset: 6pt,\n");
                    output.push_str("  stroke: 0.5pt,\n");
                    output.push_str("  align: (left, left, left),\n");
                    output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");

                    for var in &meta.variables {
                        output.push_str(&format!(
                            "  [${}$], [{}], [{}],\n",
                            var.symbol, var.description, var.units
                        ));
                    }
                    output.push_str(")\n\n");
                }

                if let Some(usages) = usage_by_eq.get(&equation) {
                    let mut labels: Vec<&str> = usages.iter().filter_map(|u| u.circuit_label.as_deref()).collect();
                    labels.sort();
                    labels.dedup();

                    if !labels.is_empty() {
                        let escaped: Vec<String> = labels.iter().map(|l| crate::pdf::escape_typst(l)).collect();
                        output.push_str(&format!("*Applied to:* {}\n\n", escaped.join(", ")));
                    }
                }

                if !meta.assumptions.is_empty() {
                    output.push_str("*Assumptions:*\n");
                    for assumption in &meta.assumptions {
                        output.push_str(&format!("- {}\n", assumption));
                    }
                    output.push('\n');
                }

                output.push_str("#v(8pt)\n");
                output.push_str("#line(length: 100%, stroke: 0.25pt + gray)\n");
                output.push_str("#v(8pt)\n\n");
            }
        }

        output
    }
}

/// Generate a "List of Equations" appendix for a fixed set of equations.
pub fn generate_static_equations_appendix_typst(equations: &[Equation]) -> String {
    let mut tracker = EquationTracker::new();
    for &eq in equations {
        tracker.record(eq, "Reference");
    }
    tracker.generate_appendix_typst()
}

// ============================================================================
// Markdown Generation for EQUATIONS.md
// ============================================================================

/// Generate a complete EQUATIONS.md file for documentation.
///
/// Lists every equation in the registry, organized by category, with
/// formulas, references, and source code links.
///
/// # Example
///
/// ```rust
/// use circuit_core::equations::registry::generate_equations_markdown;
///
/// let markdown = generate_equations_markdown();
/// assert!(markdown.contains("Circuit Sizing Equations Reference"));
/// assert!(markdown.contains("Voltage Drop"));
/// ```
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(24_000);

    output.push_str(r#"# Circuit Sizing Equations Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-equations`

This document lists every formula used by the branch-circuit checks.
Each equation includes its formula, code reference, source location, and assumptions.
Engineers can use this as a single reference to audit the underlying mathematics.

## Conventions

| Quantity | Convention |
|----------|------------|
| Current | RMS amperes, line current for three-phase |
| Voltage | Line-to-line for three-phase |
| Length | One-way circuit length in metres |
| Impedance | Ω per km at 60 Hz |
| Verdicts | Limits are inclusive: a value equal to the limit complies |

---

"#);

    let categories = Equation::all_categories();

    for category in &categories {
        let equations = Equation::in_category(*category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        var.plain_symbol(),
                        var.description,
                        var.units
                    ));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`](circuit_core/src/{})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Equations:** {}\n- **Categories:** {}\n\n",
        ALL_EQUATIONS.len(),
        categories.len()
    ));

    output.push_str(r#"## How to Audit

1. Find the equation you want to verify in the sections above
2. Check the **Reference** for the code article or standard
3. Follow the **Source** link to the implementing function
4. Run `cargo test` to check the reference cases

"#);

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{evaluate, CalculationInput};
    use crate::nec_factors::{CodeProfile, SystemPhase};

    #[test]
    fn test_all_equations_have_metadata() {
        assert_eq!(ALL_EQUATIONS.len(), 21);

        for eq in ALL_EQUATIONS {
            let meta = eq.metadata();
            assert!(!meta.name.is_empty(), "Equation {:?} has no name", eq);
            assert!(meta.formula_typst.starts_with('$'), "Equation {:?} formula is not math", eq);
            assert!(!meta.variables.is_empty(), "Equation {:?} has no variables", eq);
        }

        let drop = Equation::VoltageDrop.metadata();
        assert!(drop.formula_plain.contains("K * I * (L / 1000) * Z_eff"));

        let section = Equation::MinimumThermalSection.metadata();
        assert!(section.formula_plain.contains("I_f * sqrt(t) / K"));
    }

    #[test]
    fn test_code_reference_citation() {
        let nec = CodeReference::Nec { year: 2020, section: "310.16" };
        assert_eq!(nec.citation(), "NEC 2020 310.16");

        let icea = CodeReference::Icea { standard: "P-32-382" };
        assert_eq!(icea.citation(), "ICEA P-32-382");
        assert_eq!(icea.short_form(), "ICEA");
    }

    #[test]
    fn test_every_category_populated() {
        for category in Equation::all_categories() {
            assert!(!Equation::in_category(category).is_empty(), "{:?} is empty", category);
        }
    }

    #[test]
    fn test_equation_tracker() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::VoltageDrop, "C-1");
        tracker.record(Equation::PercentVoltageDrop, "C-1");
        tracker.record(Equation::VoltageDrop, "C-2");

        assert_eq!(tracker.usages().len(), 3);
        assert_eq!(tracker.unique_equations().len(), 2);
    }

    #[test]
    fn test_by_category_sorted() {
        let mut tracker = EquationTracker::new();
        tracker.record(Equation::WithstandCheck, "test");
        tracker.record(Equation::OccupiedArea, "test");
        tracker.record(Equation::LoadCurrentSinglePhase, "test");

        let by_cat = tracker.by_category();
        let categories: Vec<_> = by_cat.iter().map(|(cat, _)| *cat).collect();
        assert_eq!(
            categories,
            vec![
                EquationCategory::LoadCurrent,
                EquationCategory::ConduitFill,
                EquationCategory::DesignChecks
            ]
        );
    }

    #[test]
    fn test_record_evaluation() {
        let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();
        let tracker = EquationTracker::from_evaluation(&evaluation);
        let unique = tracker.unique_equations();

        assert!(unique.contains(&Equation::LoadCurrentSinglePhase));
        assert!(!unique.contains(&Equation::LoadCurrentThreePhase));
        // Default profile uses the 75 °C column without a cap
        assert!(!unique.contains(&Equation::TerminalLimit));
        assert!(unique.contains(&Equation::MinimumThermalSection));
        assert!(tracker.usages().iter().all(|u| u.circuit_label.as_deref() == Some("C-1 Receptacles")));
    }

    #[test]
    fn test_merge_keeps_both_circuits() {
        let profile = CodeProfile::default();
        let mut feeder = CalculationInput::example();
        feeder.label = "C-2 Motor".to_string();
        feeder.phase = SystemPhase::Three;
        feeder.service_voltage_v = 208.0;

        let mut tracker = EquationTracker::from_evaluation(&evaluate(&CalculationInput::example(), &profile).unwrap());
        let first = tracker.usages().len();
        let other = EquationTracker::from_evaluation(&evaluate(&feeder, &profile).unwrap());
        let second = other.usages().len();
        tracker.merge(other);

        assert_eq!(tracker.usages().len(), first + second);
        let unique = tracker.unique_equations();
        assert!(unique.contains(&Equation::LoadCurrentSinglePhase));
        assert!(unique.contains(&Equation::LoadCurrentThreePhase));
        let labels = &tracker.by_equation()[&Equation::VoltageDrop];
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_record_evaluation_variants() {
        let mut input = CalculationInput::example();
        input.phase = SystemPhase::Three;
        input.service_voltage_v = 208.0;
        input.fault_current_a = 0.0;
        let profile = CodeProfile::new().with_terminal_cap(TerminalCapPolicy::Column90CappedAt75);

        let evaluation = evaluate(&input, &profile).unwrap();
        let unique = EquationTracker::from_evaluation(&evaluation).unique_equations();

        assert!(unique.contains(&Equation::LoadCurrentThreePhase));
        assert!(unique.contains(&Equation::TerminalLimit));
        assert!(!unique.contains(&Equation::MinimumThermalSection));
        assert!(!unique.contains(&Equation::WithstandCheck));
    }

    #[test]
    fn test_generate_appendix_typst() {
        let mut tracker = EquationTracker::new();
        tracker.record_for_circuit(Equation::CorrectedAmpacity, "Corrected ampacity", "C-1");
        tracker.record_for_circuit(Equation::VoltageDrop, "Voltage drop", "C-1");
        tracker.record_for_circuit(Equation::VoltageDrop, "Voltage drop", "C-2");

        let typst = tracker.generate_appendix_typst();

        assert!(typst.contains("Appendix: List of Equations"));
        assert!(typst.contains("Corrected Ampacity"));
        assert!(typst.contains("NEC 2020 Table 310.16"));
        assert!(typst.contains("*Applied to:* C-1, C-2"));
        assert!(typst.contains("== Ampacity"));
        assert!(typst.contains("== Voltage Drop"));
    }

    #[test]
    fn test_generate_appendix_empty_tracker() {
        let typst = EquationTracker::new().generate_appendix_typst();
        assert!(typst.contains("Appendix: List of Equations"));
        assert!(typst.contains("No equations recorded"));
    }

    #[test]
    fn test_static_equations_appendix() {
        let typst = generate_static_equations_appendix_typst(&[Equation::FillPercent, Equation::FillCheck]);
        assert!(typst.contains("Conduit Fill Check"));
        assert!(!typst.contains("*Applied to:*"));
    }

    #[test]
    fn test_generate_equations_markdown() {
        let markdown = generate_equations_markdown();

        assert!(markdown.contains("# Circuit Sizing Equations Reference"));
        assert!(markdown.contains("Auto-generated from source code"));
        for category in Equation::all_categories() {
            assert!(markdown.contains(&format!("## {}", category.display_name())));
        }
        assert!(markdown.contains("`A' = A_base * F_t * F_g`"));
        // Quoting is stripped in markdown symbols
        assert!(markdown.contains("| Z_eff | Effective impedance | Ω/km |"));
        assert!(markdown.contains("circuit_core/src/calculations/voltage_drop.rs"));
        assert!(markdown.contains("**Total Equations:** 21"));
        assert!(markdown.contains("**Categories:** 8"));
    }

    #[test]
    fn test_equation_metadata_has_source_info() {
        for eq in ALL_EQUATIONS {
            let meta = eq.metadata();
            assert!(!meta.source_module.is_empty(), "Equation {:?} missing source_module", eq);
            assert!(!meta.source_function.is_empty(), "Equation {:?} missing source_function", eq);
            assert!(!meta.formula_plain.is_empty(), "Equation {:?} missing formula_plain", eq);
        }
    }
}
