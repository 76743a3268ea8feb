//! # Report Assembler
//!
//! Turns an [`Evaluation`] into a renderer-neutral [`Report`]: titled
//! sections of (label, value, unit) rows, a verdict per check and a short
//! derivation citing the formula and the threshold applied.
//!
//! Two renderers consume the model: [`Report::to_text`] for terminals and
//! [`crate::pdf`] for the Typst calculation record. Every field of every
//! result record appears exactly once in the model.
//!
//! ## Example
//!
//! ```rust
//! use circuit_core::calculations::{evaluate, CalculationInput};
//! use circuit_core::nec_factors::CodeProfile;
//! use circuit_core::report::Report;
//!
//! let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();
//! let report = Report::from_evaluation(&evaluation);
//!
//! println!("{}", report.to_text());
//! assert_eq!(report.sections.len(), 6);
//! ```

use std::fmt;

use serde::Serialize;

use crate::calculations::{
    AmpacityResult, ConduitFillResult, Evaluation, ShortCircuitResult, Verdict, VoltageDropResult,
};
use crate::nec_factors::{nec_ref, DropVerdictPolicy, SystemPhase};

/// Document title used by every renderer
pub const REPORT_TITLE: &str = "Electrical Calculation Record";

/// One line of a section table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub value: String,
    pub unit: String,
}

impl ReportRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            unit: unit.into(),
        }
    }
}

/// Verdict of a section with the wording the section uses for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionVerdict {
    pub verdict: Verdict,
    /// Usually [`Verdict::label`]; conduit fill says "SATURATED" for a failure
    pub label: String,
}

/// One numbered block of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub title: String,
    /// Code article the section checks against
    pub reference: Option<String>,
    pub rows: Vec<ReportRow>,
    pub verdict: Option<SectionVerdict>,
    /// Derivation sentences, in order
    pub derivation: Vec<String>,
}

impl ReportSection {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            reference: None,
            rows: Vec::new(),
            verdict: None,
            derivation: Vec::new(),
        }
    }

    fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    fn row(mut self, label: &str, value: impl Into<String>, unit: &str) -> Self {
        self.rows.push(ReportRow::new(label, value, unit));
        self
    }

    fn with_verdict(mut self, verdict: Verdict, label: &str) -> Self {
        self.verdict = Some(SectionVerdict {
            verdict,
            label: label.to_string(),
        });
        self
    }

    fn explain(mut self, sentence: String) -> Self {
        self.derivation.push(sentence);
        self
    }

    /// Look up a row by label
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows.iter().find(|r| r.label == label).map(|r| r.value.as_str())
    }
}

/// Renderer-neutral calculation record for one circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub circuit_label: String,
    /// Worst verdict of the four checks
    pub overall: Verdict,
    pub sections: Vec<ReportSection>,
}

fn fixed(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, value)
}

fn optional(value: Option<f64>, digits: usize) -> String {
    value.map(|v| fixed(v, digits)).unwrap_or_else(|| "not computed".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl Report {
    /// Assemble the report for one evaluated circuit.
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        Report {
            title: REPORT_TITLE.to_string(),
            circuit_label: evaluation.input.label.clone(),
            overall: evaluation.overall(),
            sections: vec![
                design_parameters(evaluation),
                design_basis(evaluation),
                ampacity_section(evaluation, &evaluation.ampacity),
                voltage_drop_section(evaluation, &evaluation.voltage_drop),
                conduit_fill_section(evaluation, &evaluation.conduit_fill),
                short_circuit_section(&evaluation.input.gauge, &evaluation.short_circuit),
            ],
        }
    }

    /// Find a section whose title starts with `prefix`
    pub fn section(&self, prefix: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title.starts_with(prefix))
    }

    /// Plain-text rendering for terminals and logs.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(72);

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("{}\n", self.title.to_uppercase()));
        out.push_str(&format!("Circuit: {}\n", self.circuit_label));
        out.push_str(&format!("Overall: {}\n", self.overall));
        out.push_str(&rule);
        out.push('\n');

        for (i, section) in self.sections.iter().enumerate() {
            out.push('\n');
            match &section.reference {
                Some(reference) => out.push_str(&format!("{}. {} ({})\n", i + 1, section.title, reference)),
                None => out.push_str(&format!("{}. {}\n", i + 1, section.title)),
            }
            out.push_str(&format!("{}\n", "-".repeat(72)));

            for row in &section.rows {
                let line = format!("  {:<36} {:>16} {}", row.label, row.value, row.unit);
                out.push_str(line.trim_end());
                out.push('\n');
            }

            if !section.derivation.is_empty() {
                out.push('\n');
                for sentence in &section.derivation {
                    out.push_str(&format!("  {}\n", sentence));
                }
            }

            if let Some(verdict) = &section.verdict {
                out.push_str(&format!("\n  Result: {}\n", verdict.label));
            }
        }

        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

// ============================================================================
// Sections
// ============================================================================

fn design_parameters(evaluation: &Evaluation) -> ReportSection {
    let input = &evaluation.input;
    let pf_source = if evaluation.power_factor_supplied {
        "supplied".to_string()
    } else {
        format!("from load type, {}", input.load_type.display_name())
    };

    ReportSection::new("Design Parameters")
        .row("Circuit", input.label.clone(), "")
        .row("Installed load", fixed(input.load_va, 0), "VA")
        .row("Service voltage", fixed(input.service_voltage_v, 0), "V")
        .row("System", input.phase.display_name(), "")
        .row("Load type", input.load_type.display_name(), "")
        .row("Power factor", fixed(evaluation.power_factor, 2), "")
        .row("Power factor source", pf_source, "")
        .row("Conductor", format!("{} (THW/THHN)", input.gauge), "")
        .row("Current-carrying conductors", input.active_conductors.to_string(), "")
        .row("Ambient band", input.temperature_band.clone(), "")
        .row("Circuit length", fixed(input.length_m, 1), "m")
        .row("Fault current", fixed(input.fault_current_a, 0), "A")
        .row("Clearing time", fixed(input.clearing_time_s, 3), "s")
        .row("Conduit material", input.material.display_name(), "")
        .row("Conduit trade size", input.trade_size.clone(), "")
        .row("Conductors in conduit", input.wire_count.to_string(), "")
        .row(
            "Unit area override",
            input
                .unit_area_override_mm2
                .map(|a| fixed(a, 2))
                .unwrap_or_else(|| "none".to_string()),
            "mm²",
        )
}

fn design_basis(evaluation: &Evaluation) -> ReportSection {
    evaluation
        .profile
        .describe()
        .into_iter()
        .fold(ReportSection::new("Design Basis"), |section, (label, value)| {
            section.row(label, value, "")
        })
}

fn ampacity_section(evaluation: &Evaluation, result: &AmpacityResult) -> ReportSection {
    let input = &evaluation.input;
    let denominator = match input.phase {
        SystemPhase::Single => format!("{:.0} V", input.service_voltage_v),
        SystemPhase::Three => format!("(√3 × {:.0} V)", input.service_voltage_v),
    };

    let mut section = ReportSection::new("Ampacity and Protection")
        .with_reference(nec_ref::AMPACITY_TABLE)
        .row("Load current", fixed(result.load_current_a, 2), "A")
        .row("Design current (125 %)", fixed(result.design_current_a, 2), "A")
        .row("Tabulated ampacity", fixed(result.base_ampacity_a, 1), "A")
        .row("Temperature factor", fixed(result.temperature_factor, 2), "")
        .row("Grouping factor", fixed(result.grouping_factor, 2), "")
        .row("Corrected ampacity", fixed(result.corrected_ampacity_a, 2), "A")
        .row(
            "Terminal limit",
            result
                .terminal_limit_a
                .map(|a| fixed(a, 1))
                .unwrap_or_else(|| "not applied".to_string()),
            "A",
        )
        .row("Final ampacity", fixed(result.final_ampacity_a, 2), "A")
        .row("Suggested breaker", fixed(result.suggested_breaker_a, 0), "A")
        .row("Breaker lookup saturated", yes_no(result.breaker_saturated), "")
        .explain(format!(
            "I = {:.0} VA / {} = {:.2} A; I_d = 1.25 × {:.2} A = {:.2} A.",
            input.load_va, denominator, result.load_current_a, result.load_current_a, result.design_current_a
        ))
        .explain(format!(
            "A' = {:.1} A × {:.2} × {:.2} = {:.2} A.",
            result.base_ampacity_a, result.temperature_factor, result.grouping_factor, result.corrected_ampacity_a
        ));

    if let Some(limit) = result.terminal_limit_a {
        section = section.explain(format!(
            "Limited to the 75 °C terminal rating ({}): min({:.2}, {:.1}) = {:.2} A.",
            nec_ref::TERMINAL_LIMIT,
            result.corrected_ampacity_a,
            limit,
            result.final_ampacity_a
        ));
    }

    let comparison = if result.passes() { "≥" } else { "<" };
    section = section.explain(format!(
        "{:.2} A {} {:.2} A design current ({}).",
        result.final_ampacity_a,
        comparison,
        result.design_current_a,
        nec_ref::CONTINUOUS_LOAD
    ));

    let breaker = if result.breaker_saturated {
        format!(
            "No standard rating reaches {:.2} A; the largest, {:.0} A, is shown and the circuit needs a larger device.",
            result.design_current_a, result.suggested_breaker_a
        )
    } else {
        format!(
            "Smallest standard rating ≥ {:.2} A ({}): {:.0} A.",
            result.design_current_a,
            nec_ref::STANDARD_RATINGS,
            result.suggested_breaker_a
        )
    };

    section.explain(breaker).with_verdict(result.verdict, result.verdict.label())
}

fn voltage_drop_section(evaluation: &Evaluation, result: &VoltageDropResult) -> ReportSection {
    let input = &evaluation.input;
    let theta = evaluation.power_factor.acos();

    let threshold = match (result.verdict, evaluation.profile.drop_verdict) {
        (Verdict::Complies, _) => format!(
            "{:.2} % ≤ {:.0} % branch-circuit limit.",
            result.percent_drop,
            DropVerdictPolicy::BRANCH_LIMIT_PERCENT
        ),
        (Verdict::Attention, _) => format!(
            "{:.2} % is above {:.0} % but within {:.0} %; acceptable only if the feeder keeps the total within {:.0} %.",
            result.percent_drop,
            DropVerdictPolicy::BRANCH_LIMIT_PERCENT,
            DropVerdictPolicy::TOTAL_LIMIT_PERCENT,
            DropVerdictPolicy::TOTAL_LIMIT_PERCENT
        ),
        (_, DropVerdictPolicy::Strict) => format!(
            "{:.2} % > {:.0} % limit.",
            result.percent_drop,
            DropVerdictPolicy::BRANCH_LIMIT_PERCENT
        ),
        (_, DropVerdictPolicy::Tiered) => format!(
            "{:.2} % > {:.0} % combined limit.",
            result.percent_drop,
            DropVerdictPolicy::TOTAL_LIMIT_PERCENT
        ),
    };

    ReportSection::new("Voltage Regulation")
        .with_reference(nec_ref::VOLTAGE_DROP)
        .row("Circuit current", fixed(result.current_a, 2), "A")
        .row("Current source", result.current_source.display_name(), "")
        .row("Phase factor K", fixed(result.k_factor, 3), "")
        .row("Effective impedance", fixed(result.impedance_ohm_per_km, 3), "Ω/km")
        .row("Voltage drop", fixed(result.voltage_drop_v, 2), "V")
        .row("Regulation", fixed(result.percent_drop, 2), "%")
        .explain(format!(
            "θ = arccos({:.2}) = {:.4} rad; Z = R cos θ + X sin θ = {:.3} Ω/km ({}).",
            evaluation.power_factor,
            theta,
            result.impedance_ohm_per_km,
            nec_ref::IMPEDANCE_TABLE
        ))
        .explain(format!(
            "ΔV = {:.3} × {:.2} A × {:.1} m / 1000 × {:.3} Ω/km = {:.2} V.",
            result.k_factor, result.current_a, input.length_m, result.impedance_ohm_per_km, result.voltage_drop_v
        ))
        .explain(format!(
            "e = {:.2} V / {:.0} V × 100 = {:.2} %.",
            result.voltage_drop_v, input.service_voltage_v, result.percent_drop
        ))
        .explain(threshold)
        .with_verdict(result.verdict, result.verdict.label())
}

fn conduit_fill_section(evaluation: &Evaluation, result: &ConduitFillResult) -> ReportSection {
    let input = &evaluation.input;
    let material = input.material.code();
    let comparison = if result.passes() { "≤" } else { ">" };
    let verdict_label = match result.verdict {
        Verdict::Fails => "SATURATED",
        other => other.label(),
    };

    ReportSection::new("Conduit Fill")
        .with_reference(nec_ref::CONDUIT_FILL)
        .row("Conductor area", fixed(result.unit_area_mm2, 2), "mm²")
        .row("Conductor area source", result.area_source.display_name(), "")
        .row("Occupied area", fixed(result.occupied_area_mm2, 2), "mm²")
        .row("Fill limit", fixed(result.fill_limit_percent, 0), "%")
        .row("Required area at 100 %", fixed(result.required_area_mm2, 2), "mm²")
        .row("Recommended trade size", result.recommendation_label(), "")
        .row("Verified trade size", result.verified_trade_size.clone(), "")
        .row("Conduit internal area", fixed(result.conduit_area_mm2, 0), "mm²")
        .row("Actual fill", fixed(result.fill_percent, 2), "%")
        .explain(format!(
            "A_occ = {} × {:.2} mm² = {:.2} mm²; limit for {} conductor(s) is {:.0} %.",
            input.wire_count,
            result.unit_area_mm2,
            result.occupied_area_mm2,
            input.wire_count,
            result.fill_limit_percent
        ))
        .explain(format!(
            "A_req = {:.2} × 100 / {:.0} = {:.2} mm²; smallest {} size ({}): {}.",
            result.occupied_area_mm2,
            result.fill_limit_percent,
            result.required_area_mm2,
            material,
            nec_ref::CONDUIT_DIMENSIONS,
            result.recommendation_label()
        ))
        .explain(format!(
            "Fill of {} {} = {:.2} / {:.0} × 100 = {:.2} % {} {:.0} %.",
            result.verified_trade_size,
            material,
            result.occupied_area_mm2,
            result.conduit_area_mm2,
            result.fill_percent,
            comparison,
            result.fill_limit_percent
        ))
        .with_verdict(result.verdict, verdict_label)
}

fn short_circuit_section(gauge: &str, result: &ShortCircuitResult) -> ReportSection {
    let section = ReportSection::new("Short-Circuit Withstand")
        .with_reference(nec_ref::SHORT_CIRCUIT_WITHSTAND)
        .row("Fault current", fixed(result.fault_current_a, 0), "A")
        .row("Clearing time", fixed(result.clearing_time_s, 3), "s")
        .row("Thermal constant K", fixed(result.thermal_constant, 1), "")
        .row("Conductor section", fixed(result.conductor_kcmil, 2), "kcmil")
        .row("Minimum section", optional(result.min_required_kcmil, 2), "kcmil")
        .row("Minimum sufficient gauge", result.minimum_gauge_label(), "")
        .row("Maximum withstand current", optional(result.max_withstand_a, 0), "A");

    let section = match (result.min_required_kcmil, result.max_withstand_a) {
        (Some(required), Some(withstand)) => {
            let comparison = if result.passes() { "≥" } else { "<" };
            section
                .explain(format!(
                    "kcmil_min = {:.0} A × √{:.3} s / {:.1} = {:.2} kcmil; smallest sufficient gauge: {}.",
                    result.fault_current_a,
                    result.clearing_time_s,
                    result.thermal_constant,
                    required,
                    result.minimum_gauge_label()
                ))
                .explain(format!(
                    "I_max = {:.1} × {:.2} kcmil / √{:.3} s = {:.0} A.",
                    result.thermal_constant, result.conductor_kcmil, result.clearing_time_s, withstand
                ))
                .explain(format!(
                    "{} ({:.2} kcmil) {} {:.2} kcmil required.",
                    gauge, result.conductor_kcmil, comparison, required
                ))
        }
        _ => section.explain("Fault current or clearing time is zero; the withstand check is not computed.".to_string()),
    };

    section.with_verdict(result.verdict, result.verdict.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{evaluate, CalculationInput};
    use crate::nec_factors::{CodeProfile, TerminalCapPolicy};

    fn example_report() -> Report {
        let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();
        Report::from_evaluation(&evaluation)
    }

    #[test]
    fn test_sections_and_verdicts() {
        let report = example_report();

        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Design Parameters",
                "Design Basis",
                "Ampacity and Protection",
                "Voltage Regulation",
                "Conduit Fill",
                "Short-Circuit Withstand"
            ]
        );

        let verdicts: Vec<Verdict> = report.sections.iter().filter_map(|s| s.verdict.as_ref()).map(|v| v.verdict).collect();
        assert_eq!(verdicts, vec![Verdict::Complies, Verdict::Fails, Verdict::Complies, Verdict::Fails]);
        assert_eq!(report.overall, Verdict::Fails);
    }

    #[test]
    fn test_every_result_field_present_once() {
        let report = example_report();
        let expected = [
            ("Ampacity", 10),
            ("Voltage", 6),
            ("Conduit", 9),
            ("Short", 7),
        ];
        for (prefix, rows) in expected {
            let section = report.section(prefix).unwrap();
            assert_eq!(section.rows.len(), rows, "{}", section.title);

            let mut labels: Vec<&str> = section.rows.iter().map(|r| r.label.as_str()).collect();
            labels.sort();
            labels.dedup();
            assert_eq!(labels.len(), rows, "duplicate label in {}", section.title);
        }
    }

    #[test]
    fn test_reference_values_in_rows() {
        let report = example_report();

        let ampacity = report.section("Ampacity").unwrap();
        assert_eq!(ampacity.value_of("Load current"), Some("10.50"));
        assert_eq!(ampacity.value_of("Corrected ampacity"), Some("22.75"));
        assert_eq!(ampacity.value_of("Terminal limit"), Some("not applied"));
        assert_eq!(ampacity.value_of("Suggested breaker"), Some("15"));

        let drop = report.section("Voltage").unwrap();
        assert_eq!(drop.value_of("Regulation"), Some("5.23"));
        assert_eq!(drop.value_of("Current source"), Some("derived from load"));

        let fill = report.section("Conduit").unwrap();
        assert_eq!(fill.value_of("Required area at 100 %"), Some("33.10"));
        assert_eq!(fill.value_of("Recommended trade size"), Some("1/2\""));

        let short = report.section("Short").unwrap();
        assert_eq!(short.value_of("Minimum section"), Some("67.34"));
        assert_eq!(short.value_of("Minimum sufficient gauge"), Some("2/0 AWG"));
    }

    #[test]
    fn test_saturated_conduit_label() {
        let mut input = CalculationInput::example();
        input.unit_area_override_mm2 = Some(53.5);
        let evaluation = evaluate(&input, &CodeProfile::default()).unwrap();
        let report = Report::from_evaluation(&evaluation);

        let fill = report.section("Conduit").unwrap();
        assert_eq!(fill.verdict.as_ref().unwrap().label, "SATURATED");
        assert_eq!(fill.value_of("Conductor area source"), Some("user override"));
    }

    #[test]
    fn test_not_computed_short_circuit() {
        let mut input = CalculationInput::example();
        input.clearing_time_s = 0.0;
        let evaluation = evaluate(&input, &CodeProfile::default()).unwrap();
        let report = Report::from_evaluation(&evaluation);

        let short = report.section("Short").unwrap();
        assert_eq!(short.value_of("Minimum section"), Some("not computed"));
        assert_eq!(short.value_of("Minimum sufficient gauge"), Some("N/A"));
        assert_eq!(short.verdict.as_ref().unwrap().label, "NOT COMPUTED");
        assert_eq!(short.derivation.len(), 1);
    }

    #[test]
    fn test_terminal_limit_derivation() {
        let profile = CodeProfile::new().with_terminal_cap(TerminalCapPolicy::Column90CappedAt75);
        let evaluation = evaluate(&CalculationInput::example(), &profile).unwrap();
        let report = Report::from_evaluation(&evaluation);

        let ampacity = report.section("Ampacity").unwrap();
        assert_eq!(ampacity.value_of("Terminal limit"), Some("25.0"));
        assert!(ampacity.derivation.iter().any(|s| s.contains("75 °C terminal rating")));
    }

    #[test]
    fn test_text_rendering() {
        let text = example_report().to_text();

        assert!(text.starts_with(&"=".repeat(72)));
        assert!(text.contains("ELECTRICAL CALCULATION RECORD"));
        assert!(text.contains("Circuit: C-1 Receptacles"));
        assert!(text.contains("3. Ampacity and Protection (Table 310.16)"));
        assert!(text.contains("Result: COMPLIES"));
        assert!(text.contains("Result: FAILS"));
        assert!(text.contains("ΔV = 5.000 × 10.50 A × 20.0 m / 1000"));
        assert_eq!(text, format!("{}", example_report()));
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_string(&example_report()).unwrap();
        assert!(json.contains("\"circuit_label\":\"C-1 Receptacles\""));
    }
}
