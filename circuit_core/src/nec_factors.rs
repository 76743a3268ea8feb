//! # Code Factors and Policy Profiles
//!
//! Derating rules, methodology constants and verdict thresholds for
//! branch-circuit sizing per the national electrical code (NEC / CEN share
//! article numbering).
//!
//! ## Overview
//!
//! Several rules appear in more than one accepted form: different grouping
//! tables, different base ampacity columns, different voltage-drop
//! multipliers and different regulation limits. Each form is a named policy
//! and a [`CodeProfile`] selects one of each:
//!
//! | Policy                | Options                                   | Default       |
//! |-----------------------|-------------------------------------------|---------------|
//! | [`GroupingPolicy`]    | Basic (to 7+), Extended (to >20)          | Extended      |
//! | [`TerminalCapPolicy`] | 75 °C column, 90 °C column capped at 75 °C| Column75      |
//! | [`KFactorMode`]       | NEC 2.0/1.732, CEN 5.0/10.0, Custom       | Cen           |
//! | [`DropVerdictPolicy`] | Tiered 3 %/5 %, Strict 3 %                | Tiered        |
//! | thermal constant      | [`K_THERMAL_CU_75C`] or custom            | 105.0         |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// Code Section References
// ============================================================================

/// Code section references for the checks and factors the engine applies.
pub mod nec_ref {
    /// Allowable ampacities of insulated conductors
    pub const AMPACITY_TABLE: &str = "Table 310.16";
    /// Ambient temperature correction factors
    pub const TEMPERATURE_CORRECTION: &str = "310.15(B)(1)";
    /// Adjustment for more than three current-carrying conductors
    pub const GROUPING_ADJUSTMENT: &str = "310.15(C)(1)";
    /// Terminal temperature limitations
    pub const TERMINAL_LIMIT: &str = "110.14(C)";
    /// Continuous load sizing at 125 %
    pub const CONTINUOUS_LOAD: &str = "210.19(A)(1)";
    /// Standard ampere ratings for overcurrent devices
    pub const STANDARD_RATINGS: &str = "240.6(A)";
    /// Voltage drop recommendation for branch circuits and feeders
    pub const VOLTAGE_DROP: &str = "210.19(A) Informational Note 4";
    /// Conductor AC resistance and reactance
    pub const IMPEDANCE_TABLE: &str = "Chapter 9 Table 9";
    /// Conductor properties (area, kcmil)
    pub const CONDUCTOR_PROPERTIES: &str = "Chapter 9 Table 8";
    /// Percent of cross-section of conduit for conductors
    pub const CONDUIT_FILL: &str = "Chapter 9 Table 1";
    /// Conduit dimensions and internal areas
    pub const CONDUIT_DIMENSIONS: &str = "Chapter 9 Table 4";
    /// Short-circuit thermal withstand of insulated copper
    pub const SHORT_CIRCUIT_WITHSTAND: &str = "ICEA P-32-382";
}

// ============================================================================
// Constants
// ============================================================================

/// Continuous-load multiplier applied to the load current
pub const CONTINUOUS_LOAD_FACTOR: f64 = 1.25;

/// Thermal constant for 75 °C-rated copper (kcmil·A⁻¹·s^½ form)
pub const K_THERMAL_CU_75C: f64 = 105.0;

/// Service voltages offered by the calculator (V)
pub const STANDARD_SERVICE_VOLTAGES: [f64; 3] = [120.0, 208.0, 480.0];

/// Lowest power factor the voltage-drop method accepts
pub const MIN_POWER_FACTOR: f64 = 0.80;

/// Highest power factor (purely resistive load)
pub const MAX_POWER_FACTOR: f64 = 1.00;

// ============================================================================
// System Configuration
// ============================================================================

/// Supply system configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SystemPhase {
    /// Single-phase, I = S / V
    #[default]
    Single,
    /// Three-phase, I = S / (√3 · V)
    Three,
}

impl SystemPhase {
    /// All phase variants
    pub const ALL: [SystemPhase; 2] = [SystemPhase::Single, SystemPhase::Three];

    /// Divisor applied to the service voltage when deriving line current
    pub fn current_multiplier(&self) -> f64 {
        match self {
            SystemPhase::Single => 1.0,
            SystemPhase::Three => 3.0_f64.sqrt(),
        }
    }

    /// Display name for reports and the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            SystemPhase::Single => "Single-phase",
            SystemPhase::Three => "Three-phase",
        }
    }
}

impl fmt::Display for SystemPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Kind of load served, which fixes the default power factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoadType {
    /// Lighting circuits: pf = 0.95
    #[default]
    Lighting,
    /// General-purpose receptacles: pf = 0.90
    Receptacles,
}

impl LoadType {
    /// All load type variants
    pub const ALL: [LoadType; 2] = [LoadType::Lighting, LoadType::Receptacles];

    /// Power factor assumed for this load type
    pub fn power_factor(&self) -> f64 {
        match self {
            LoadType::Lighting => 0.95,
            LoadType::Receptacles => 0.90,
        }
    }

    /// Display name for reports and the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            LoadType::Lighting => "Lighting (pf 0.95)",
            LoadType::Receptacles => "Receptacles (pf 0.90)",
        }
    }
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Grouping Adjustment
// ============================================================================

/// Adjustment table for bundled current-carrying conductors (310.15(C)(1))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GroupingPolicy {
    /// Three tiers: 1-3 → 1.00, 4-6 → 0.80, 7 and more → 0.70
    Basic,
    /// Full table: adds 10-20 → 0.50 and above 20 → 0.45
    #[default]
    Extended,
}

impl GroupingPolicy {
    /// All grouping policies
    pub const ALL: [GroupingPolicy; 2] = [GroupingPolicy::Basic, GroupingPolicy::Extended];

    /// Adjustment factor for a number of current-carrying conductors.
    ///
    /// A step function with no interpolation. `count` must be at least 1;
    /// callers validate that before asking.
    pub fn factor(&self, count: u32) -> f64 {
        match (self, count) {
            (_, 0..=3) => 1.0,
            (_, 4..=6) => 0.8,
            (GroupingPolicy::Basic, _) => 0.7,
            (GroupingPolicy::Extended, 7..=9) => 0.7,
            (GroupingPolicy::Extended, 10..=20) => 0.5,
            (GroupingPolicy::Extended, _) => 0.45,
        }
    }

    /// Display name for reports and the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            GroupingPolicy::Basic => "Basic (1-3 / 4-6 / 7+)",
            GroupingPolicy::Extended => "Extended (to more than 20)",
        }
    }
}

impl fmt::Display for GroupingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Terminal Temperature Limit
// ============================================================================

/// Which ampacity column the derating starts from, and whether the
/// result is limited by the terminal rating (110.14(C))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerminalCapPolicy {
    /// Derate the 75 °C column; no separate cap
    #[default]
    Column75,
    /// Derate the 90 °C column, then cap at the 75 °C terminal rating
    Column90CappedAt75,
}

impl TerminalCapPolicy {
    /// All terminal policies
    pub const ALL: [TerminalCapPolicy; 2] = [TerminalCapPolicy::Column75, TerminalCapPolicy::Column90CappedAt75];

    /// Display name for reports and the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            TerminalCapPolicy::Column75 => "75 °C column",
            TerminalCapPolicy::Column90CappedAt75 => "90 °C column, capped at 75 °C terminals",
        }
    }
}

impl fmt::Display for TerminalCapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Voltage-Drop Phase Factor
// ============================================================================

/// Methodology multiplier K in ΔV = K · I · L · Z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode")]
pub enum KFactorMode {
    /// Round-trip conductor length: 2.0 single-phase, √3 (1.732) three-phase
    Nec,
    /// Regional practice: 5.0 single-phase, 10.0 three-phase
    #[default]
    Cen,
    /// Explicit multipliers
    Custom { single_phase: f64, three_phase: f64 },
}

impl KFactorMode {
    /// K for a supply configuration
    pub fn k(&self, phase: SystemPhase) -> f64 {
        match (self, phase) {
            (KFactorMode::Nec, SystemPhase::Single) => 2.0,
            (KFactorMode::Nec, SystemPhase::Three) => 1.732,
            (KFactorMode::Cen, SystemPhase::Single) => 5.0,
            (KFactorMode::Cen, SystemPhase::Three) => 10.0,
            (KFactorMode::Custom { single_phase, .. }, SystemPhase::Single) => *single_phase,
            (KFactorMode::Custom { three_phase, .. }, SystemPhase::Three) => *three_phase,
        }
    }

    /// Display name for reports and the CLI
    pub fn display_name(&self) -> String {
        match self {
            KFactorMode::Nec => "NEC (2.0 / 1.732)".to_string(),
            KFactorMode::Cen => "CEN (5.0 / 10.0)".to_string(),
            KFactorMode::Custom { single_phase, three_phase } => {
                format!("Custom ({} / {})", single_phase, three_phase)
            }
        }
    }

    fn validate(&self) -> CalcResult<()> {
        if let KFactorMode::Custom { single_phase, three_phase } = self {
            for (field, value) in [("k_factor.single_phase", single_phase), ("k_factor.three_phase", three_phase)] {
                if !value.is_finite() || *value <= 0.0 {
                    return Err(CalcError::invalid_input(field, value.to_string(), "K must be a positive number"));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for KFactorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Voltage-Drop Verdict Thresholds
// ============================================================================

/// Regulation limit applied to the percentage voltage drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DropVerdictPolicy {
    /// ≤ 3 % complies, 3-5 % needs attention, above 5 % fails
    #[default]
    Tiered,
    /// ≤ 3 % complies, anything above fails
    Strict,
}

impl DropVerdictPolicy {
    /// All verdict policies
    pub const ALL: [DropVerdictPolicy; 2] = [DropVerdictPolicy::Tiered, DropVerdictPolicy::Strict];

    /// Branch-circuit limit (%)
    pub const BRANCH_LIMIT_PERCENT: f64 = 3.0;

    /// Combined feeder + branch limit (%)
    pub const TOTAL_LIMIT_PERCENT: f64 = 5.0;

    /// Display name for reports and the CLI
    pub fn display_name(&self) -> &'static str {
        match self {
            DropVerdictPolicy::Tiered => "Tiered (3 % / 5 %)",
            DropVerdictPolicy::Strict => "Strict (3 %)",
        }
    }
}

impl fmt::Display for DropVerdictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Code Profile
// ============================================================================

fn default_thermal_constant() -> f64 {
    K_THERMAL_CU_75C
}

/// Selected form of every rule that has more than one accepted version.
///
/// Chosen once per study and passed to every calculation, so two
/// evaluations under different profiles can be compared side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeProfile {
    /// Conductor grouping adjustment table
    pub grouping: GroupingPolicy,

    /// Base ampacity column and terminal cap
    pub terminal_cap: TerminalCapPolicy,

    /// Voltage-drop multiplier K
    pub k_factor: KFactorMode,

    /// Voltage-drop verdict thresholds
    pub drop_verdict: DropVerdictPolicy,

    /// Short-circuit thermal constant for the conductor insulation
    #[serde(default = "default_thermal_constant")]
    pub thermal_constant: f64,
}

impl Default for CodeProfile {
    fn default() -> Self {
        Self {
            grouping: GroupingPolicy::default(),
            terminal_cap: TerminalCapPolicy::default(),
            k_factor: KFactorMode::default(),
            drop_verdict: DropVerdictPolicy::default(),
            thermal_constant: K_THERMAL_CU_75C,
        }
    }
}

impl CodeProfile {
    /// Create the default profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grouping policy
    pub fn with_grouping(mut self, grouping: GroupingPolicy) -> Self {
        self.grouping = grouping;
        self
    }

    /// Set the terminal cap policy
    pub fn with_terminal_cap(mut self, terminal_cap: TerminalCapPolicy) -> Self {
        self.terminal_cap = terminal_cap;
        self
    }

    /// Set the voltage-drop K mode
    pub fn with_k_factor(mut self, k_factor: KFactorMode) -> Self {
        self.k_factor = k_factor;
        self
    }

    /// Set the voltage-drop verdict policy
    pub fn with_drop_verdict(mut self, drop_verdict: DropVerdictPolicy) -> Self {
        self.drop_verdict = drop_verdict;
        self
    }

    /// Set the short-circuit thermal constant
    pub fn with_thermal_constant(mut self, thermal_constant: f64) -> Self {
        self.thermal_constant = thermal_constant;
        self
    }

    /// Check the numeric settings
    pub fn validate(&self) -> CalcResult<()> {
        self.k_factor.validate()?;
        if !self.thermal_constant.is_finite() || self.thermal_constant <= 0.0 {
            return Err(CalcError::invalid_input(
                "thermal_constant",
                self.thermal_constant.to_string(),
                "Thermal constant must be positive",
            ));
        }
        Ok(())
    }

    /// Labelled settings for the report's design-basis block
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Grouping adjustment", self.grouping.display_name().to_string()),
            ("Ampacity column", self.terminal_cap.display_name().to_string()),
            ("Voltage-drop K", self.k_factor.display_name()),
            ("Voltage-drop limits", self.drop_verdict.display_name().to_string()),
            ("Thermal constant K", format!("{:.1}", self.thermal_constant)),
        ]
    }
}
