//! # PDF Generation Module
//!
//! Renders calculation records to PDF using Typst.
//!
//! ## Architecture
//!
//! - The renderer-neutral [`Report`] model supplies every section
//! - Typst markup is assembled with string formatting before compilation
//! - Fonts come from `typst-assets` and are loaded once per process
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use circuit_core::calculations::CalculationInput;
//! use circuit_core::pdf::render_study_pdf;
//! use circuit_core::study::Study;
//!
//! let mut study = Study::new("Jane Engineer", "25-042", "ACME Corp");
//! study.add_circuit(CalculationInput::example());
//!
//! let pdf_bytes = render_study_pdf(&study).unwrap();
//! std::fs::write("circuits.pdf", pdf_bytes).unwrap();
//! ```

use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::debug;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::{Evaluation, Verdict};
use crate::equations::registry::EquationTracker;
use crate::errors::{CalcError, CalcResult};
use crate::nec_factors::CodeProfile;
use crate::report::{Report, ReportSection, REPORT_TITLE};
use crate::study::{Study, StudyMetadata};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Bundled fonts, parsed once.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect()
});

/// A minimal Typst world for compiling documents without external files.
struct PdfWorld {
    /// The main source document
    main: Source,
    book: LazyHash<FontBook>,
    fonts: &'static [Font],
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = FONTS.as_slice();
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(fonts)),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

/// Compile Typst markup to PDF bytes.
fn compile_pdf(source: String) -> CalcResult<Vec<u8>> {
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report("typst compilation", messages.join("; "))
    })?;

    let bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report("pdf export", messages.join("; "))
    })?;

    debug!(bytes = bytes.len(), "rendered pdf");
    Ok(bytes)
}

// ============================================================================
// Markup Builders
// ============================================================================

/// Escape special Typst characters in user-provided text
pub fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '/' | '=' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn verdict_fill(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Complies => "rgb(\"#d4edda\")",
        Verdict::Attention => "rgb(\"#fff3cd\")",
        Verdict::Fails => "rgb(\"#f8d7da\")",
        Verdict::NotComputed => "rgb(\"#e2e3e5\")",
    }
}

fn preamble(meta: &StudyMetadata, date: &str) -> String {
    let title = if meta.project_title.is_empty() {
        REPORT_TITLE.to_string()
    } else {
        format!("{} | {}", REPORT_TITLE, escape_typst(&meta.project_title))
    };

    format!(
        r##"
#set page(
  paper: "a4",
  margin: (top: 2.5cm, bottom: 2.5cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[{title}]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[Job: {job_id}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display("1 of 1", both: true)]],
      align(right)[#text(size: 9pt)[{date}]],
    )
  ]
)

#set text(font: "DejaVu Sans Mono", size: 10pt)
"##,
        title = title,
        job_id = escape_typst(&meta.job_id),
        date = date,
    )
}

fn project_block(meta: &StudyMetadata, profile: &CodeProfile, date: &str) -> String {
    let basis_rows: String = profile
        .describe()
        .into_iter()
        .map(|(label, value)| format!("      [{}:], [{}],\n", label, escape_typst(&value)))
        .collect();

    format!(
        r##"
#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Project Information*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Engineer:], [{engineer}],
      [Job ID:], [{job_id}],
      [Client:], [{client}],
      [Project:], [{project}],
      [Date:], [{date}],
    )
  ],
  [
    *Design Basis*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
{basis_rows}    )
  ]
)
"##,
        engineer = escape_typst(&meta.engineer),
        job_id = escape_typst(&meta.job_id),
        client = escape_typst(&meta.client),
        project = escape_typst(&meta.project_title),
        date = date,
        basis_rows = basis_rows,
    )
}

fn summary_table(reports: &[Report]) -> String {
    let rows: String = reports
        .iter()
        .enumerate()
        .map(|(i, report)| {
            let mut cells = vec![format!("[{}]", i + 1), format!("[{}]", escape_typst(&report.circuit_label))];
            for verdict in report.sections.iter().filter_map(|s| s.verdict.as_ref()) {
                cells.push(format!("table.cell(fill: {})[{}]", verdict_fill(verdict.verdict), verdict.label));
            }
            cells.push(format!(
                "table.cell(fill: {})[*{}*]",
                verdict_fill(report.overall),
                report.overall.label()
            ));
            format!("  {},\n", cells.join(", "))
        })
        .collect();

    format!(
        r##"
== Circuit Summary

#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, left, center, center, center, center, center),
  table.header([*No.*], [*Circuit*], [*Ampacity*], [*Drop*], [*Fill*], [*Fault*], [*Overall*]),
{rows})
"##,
        rows = rows
    )
}

fn section_markup(number: usize, section: &ReportSection) -> String {
    let mut out = format!("\n== {}\\. {}\n\n", number, escape_typst(&section.title));

    if let Some(reference) = &section.reference {
        out.push_str(&format!("#text(size: 9pt, fill: gray)[{}]\n\n", escape_typst(reference)));
    }

    if !section.rows.is_empty() {
        out.push_str("#table(\n");
        out.push_str("  columns: (1fr, auto, auto),\n");
        out.push_str("  inset: 6pt,\n");
        out.push_str("  stroke: 0.5pt,\n");
        out.push_str("  align: (left, right, left),\n");
        out.push_str("  table.header([*Parameter*], [*Value*], [*Unit*]),\n");
        for row in &section.rows {
            out.push_str(&format!(
                "  [{}], [{}], [{}],\n",
                escape_typst(&row.label),
                escape_typst(&row.value),
                escape_typst(&row.unit)
            ));
        }
        out.push_str(")\n\n");
    }

    for sentence in &section.derivation {
        out.push_str(&format!("{}\n\n", escape_typst(sentence)));
    }

    if let Some(verdict) = &section.verdict {
        out.push_str(&format!(
            "#block(width: 100%, fill: {}, inset: 8pt, radius: 4pt)[*Result:* {}]\n",
            verdict_fill(verdict.verdict),
            verdict.label
        ));
    }

    out.push_str("#v(8pt)\n");
    out
}

fn circuit_markup(report: &Report) -> String {
    let mut out = format!(
        r##"
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Branch Circuit Check]
    #v(4pt)
    #text(size: 13pt)[{label}]
  ]
]

#v(8pt)
"##,
        label = escape_typst(&report.circuit_label),
    );

    for (i, section) in report.sections.iter().enumerate() {
        out.push_str(&section_markup(i + 1, section));
    }

    out.push_str(&format!(
        r##"
#v(8pt)
#align(center)[
  #block(width: auto, fill: {fill}, inset: 14pt, radius: 4pt)[
    #text(size: 14pt, weight: "bold")[OVERALL: {label}]
  ]
]
"##,
        fill = verdict_fill(report.overall),
        label = report.overall.label(),
    ));

    out
}

const DISCLAIMER: &str = r##"
#v(16pt)
#text(size: 9pt, fill: gray)[
  Calculations should be verified by a licensed professional engineer.
]
"##;

/// Build the Typst source for a study document.
///
/// A single evaluation gives a one-circuit record; several give a cover page
/// with a summary table followed by one page per circuit. Both end with the
/// list of equations applied.
pub fn document_source(meta: &StudyMetadata, profile: &CodeProfile, evaluations: &[Evaluation]) -> String {
    let date = Utc::now().format("%Y-%m-%d").to_string();
    let reports: Vec<Report> = evaluations.iter().map(Report::from_evaluation).collect();

    let mut source = preamble(meta, &date);

    source.push_str(&format!(
        r##"
#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 16pt, radius: 4pt)[
    #text(size: 20pt, weight: "bold")[{title}]
    #v(6pt)
    #text(size: 13pt)[{client}]
  ]
]

#v(12pt)
"##,
        title = REPORT_TITLE,
        client = escape_typst(&meta.client),
    ));
    source.push_str(&project_block(meta, profile, &date));

    if reports.len() > 1 {
        source.push_str(&summary_table(&reports));
        source.push_str(DISCLAIMER);
        for report in &reports {
            source.push_str("\n#pagebreak()\n");
            source.push_str(&circuit_markup(report));
        }
    } else {
        for report in &reports {
            source.push_str("\n#v(12pt)\n");
            source.push_str(&circuit_markup(report));
        }
        source.push_str(DISCLAIMER);
    }

    let mut tracker = EquationTracker::new();
    for evaluation in evaluations {
        tracker.merge(EquationTracker::from_evaluation(evaluation));
    }
    source.push_str(&tracker.generate_appendix_typst());

    source
}

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Render one evaluated circuit to PDF.
///
/// # Example
///
/// ```rust,no_run
/// use circuit_core::calculations::{evaluate, CalculationInput};
/// use circuit_core::nec_factors::CodeProfile;
/// use circuit_core::pdf::render_circuit_pdf;
/// use circuit_core::study::Study;
///
/// let profile = CodeProfile::default();
/// let evaluation = evaluate(&CalculationInput::example(), &profile).unwrap();
/// let study = Study::new("Jane Engineer", "25-042", "ACME Corp");
/// let pdf = render_circuit_pdf(&evaluation, &study.meta).unwrap();
/// ```
pub fn render_circuit_pdf(evaluation: &Evaluation, meta: &StudyMetadata) -> CalcResult<Vec<u8>> {
    let source = document_source(meta, &evaluation.profile, std::slice::from_ref(evaluation));
    compile_pdf(source)
}

/// Render every circuit of a study to a single PDF.
///
/// Fails when the study is empty or any circuit input is rejected.
pub fn render_study_pdf(study: &Study) -> CalcResult<Vec<u8>> {
    if study.circuits.is_empty() {
        return Err(CalcError::report("collect circuits", "study has no circuits to export"));
    }

    let evaluations: Vec<Evaluation> = study.evaluate_all()?.into_iter().map(|(_, e)| e).collect();
    let source = document_source(&study.meta, &study.profile, &evaluations);
    compile_pdf(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{evaluate, CalculationInput};

    fn meta() -> StudyMetadata {
        Study::new("Test Engineer", "TEST_001", "Client #1").with_title("Guard House").meta
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("C_1 #2"), "C\\_1 \\#2");
        assert_eq!(escape_typst("a // b"), "a \\/\\/ b");
        assert_eq!(escape_typst("[x]"), "\\[x\\]");
        assert_eq!(escape_typst("plain 1.5 mm"), "plain 1.5 mm");
    }

    #[test]
    fn test_single_circuit_source() {
        let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();
        let source = document_source(&meta(), &evaluation.profile, std::slice::from_ref(&evaluation));

        assert!(source.contains(REPORT_TITLE));
        assert!(source.contains("TEST\\_001"));
        assert!(source.contains("Client \\#1"));
        assert!(source.contains("== 1\\. Design Parameters"));
        assert!(source.contains("== 6\\. Short-Circuit Withstand"));
        assert!(source.contains("Appendix: List of Equations"));
        assert!(!source.contains("Circuit Summary"));
    }

    #[test]
    fn test_multi_circuit_source_has_summary() {
        let profile = CodeProfile::default();
        let mut second = CalculationInput::example();
        second.label = "C-2 Lighting".to_string();
        let evaluations = vec![
            evaluate(&CalculationInput::example(), &profile).unwrap(),
            evaluate(&second, &profile).unwrap(),
        ];

        let source = document_source(&meta(), &profile, &evaluations);
        assert!(source.contains("Circuit Summary"));
        assert_eq!(source.matches("Branch Circuit Check").count(), 2);
        assert_eq!(source.matches("#pagebreak()").count(), 3);
    }

    #[test]
    fn test_empty_study_rejected() {
        let err = render_study_pdf(&Study::default()).unwrap_err();
        assert_eq!(err.error_code(), "REPORT_ERROR");
    }

    #[test]
    fn test_pdf_generation() {
        let evaluation = evaluate(&CalculationInput::example(), &CodeProfile::default()).unwrap();
        let pdf = render_circuit_pdf(&evaluation, &meta());

        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_study_pdf_generation() {
        let mut study = Study::new("Engineer", "25-001", "Client");
        study.add_circuit(CalculationInput::example());
        let mut second = CalculationInput::example();
        second.label = "C-2".to_string();
        second.length_m = 5.0;
        study.add_circuit(second);

        let pdf_bytes = render_study_pdf(&study).unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"));
    }
}
