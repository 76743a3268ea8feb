//! # circuit_cli
//!
//! Command line shell for the branch-circuit sizing engine.
//!
//! ```text
//! circuit_cli check circuit.json            # text record on stdout
//! circuit_cli check circuit.json --json     # full evaluation as JSON
//! circuit_cli report circuit.json -o c1.pdf # one-circuit PDF
//! circuit_cli study study.json -o all.pdf   # multi-circuit PDF
//! circuit_cli new-study -o study.json       # starter study file
//! circuit_cli tables                        # reference data
//! circuit_cli demo                          # prompted worked example
//! ```
//!
//! Logging goes to stderr and honours `RUST_LOG`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use circuit_core::nec_factors::{DropVerdictPolicy, GroupingPolicy, LoadType, SystemPhase, TerminalCapPolicy};
use circuit_core::pdf::{render_circuit_pdf, render_study_pdf};
use circuit_core::tables::{ConduitMaterial, CONDUCTORS, CONDUITS, STANDARD_BREAKERS_A, TEMPERATURE_BANDS};
use circuit_core::{evaluate, CalculationInput, CodeProfile, Evaluation, Report, Study};

/// Branch-circuit sizing checks
#[derive(Parser)]
#[command(name = "circuit_cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one circuit and print its calculation record
    Check {
        /// Circuit input file (JSON)
        input: PathBuf,

        /// Code profile file (JSON); defaults apply when omitted
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Print the full evaluation as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when any check fails
        #[arg(long)]
        strict: bool,
    },

    /// Render one circuit to PDF
    Report {
        /// Circuit input file (JSON)
        input: PathBuf,

        /// Output PDF path
        #[arg(short, long)]
        output: PathBuf,

        /// Code profile file (JSON)
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Responsible engineer
        #[arg(long, default_value = "")]
        engineer: String,

        /// Job number
        #[arg(long, default_value = "")]
        job: String,

        /// Client name
        #[arg(long, default_value = "")]
        client: String,
    },

    /// Evaluate every circuit of a study file
    Study {
        /// Study file (JSON)
        input: PathBuf,

        /// Write a PDF instead of printing text records
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a starter study file containing the worked example
    NewStudy {
        /// Output study path
        #[arg(short, long)]
        output: PathBuf,

        /// Responsible engineer
        #[arg(long, default_value = "")]
        engineer: String,

        /// Job number
        #[arg(long, default_value = "")]
        job: String,

        /// Client name
        #[arg(long, default_value = "")]
        client: String,
    },

    /// Print the reference tables
    Tables,

    /// Prompt for a load and length, then check the example circuit with them
    Demo {
        /// Print the full evaluation as JSON
        #[arg(long)]
        json: bool,

        /// Skip the prompts and use the example values
        #[arg(long)]
        defaults: bool,
    },
}

/// Conductor counts shown in the grouping table, one per tier boundary
const GROUPING_SAMPLE_COUNTS: [u32; 6] = [3, 4, 7, 9, 10, 21];

/// `--verbose` forces debug; otherwise `RUST_LOG` wins over the info default
fn build_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = Registry::default()
        .with(build_filter(verbose, rust_log.as_deref()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_profile(path: Option<&Path>) -> Result<CodeProfile> {
    let profile = match path {
        Some(path) => read_json(path)?,
        None => CodeProfile::default(),
    };
    profile.validate()?;
    Ok(profile)
}

/// Read a number from stdin, keeping `default` on empty or unparsable input
fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{} [{}]: ", prompt, default);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn print_evaluation(evaluation: &Evaluation, json: bool) -> Result<()> {
    if json {
        println!("{}", evaluation.to_json()?);
    } else {
        print!("{}", Report::from_evaluation(evaluation));
    }
    Ok(())
}

fn write_pdf(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote pdf");
    Ok(())
}

fn print_tables() {
    println!("CONDUCTORS (copper, THW/THHN)");
    println!(
        "{:<10} {:>9} {:>9} {:>10} {:>10} {:>7} {:>7} {:>9}",
        "Gauge", "Area mm²", "Dia mm", "R Ω/km", "X Ω/km", "75 °C", "90 °C", "kcmil"
    );
    for c in CONDUCTORS.iter() {
        println!(
            "{:<10} {:>9.2} {:>9.2} {:>10.3} {:>10.3} {:>7.0} {:>7.0} {:>9.2}",
            c.gauge,
            c.area_mm2,
            c.diameter_mm,
            c.resistance_ohm_per_km,
            c.reactance_ohm_per_km,
            c.ampacity_75c_a,
            c.ampacity_90c_a,
            c.kcmil
        );
    }

    println!();
    println!("STANDARD OVERCURRENT DEVICES (A)");
    let ratings: Vec<String> = STANDARD_BREAKERS_A.iter().map(|r| format!("{:.0}", r)).collect();
    println!("{}", ratings.join(", "));

    println!();
    println!("AMBIENT TEMPERATURE CORRECTION");
    for band in TEMPERATURE_BANDS.iter() {
        println!("{:<18} {:.2}", band.label, band.factor);
    }

    println!();
    println!("CONDUIT INTERNAL AREA (mm²)");
    print!("{:<8}", "Size");
    for material in ConduitMaterial::ALL {
        print!(" {:>8}", material.code());
    }
    println!();
    for conduit in CONDUITS.iter() {
        print!("{:<8}", conduit.trade_size);
        for material in ConduitMaterial::ALL {
            print!(" {:>8.0}", conduit.area_mm2(material));
        }
        println!();
    }

    println!();
    println!("GROUPING ADJUSTMENT (current-carrying conductors)");
    print!("{:<28}", "Policy");
    for count in GROUPING_SAMPLE_COUNTS {
        print!(" {:>5}", count);
    }
    println!();
    for policy in GroupingPolicy::ALL {
        print!("{:<28}", policy.display_name());
        for count in GROUPING_SAMPLE_COUNTS {
            print!(" {:>5.2}", policy.factor(count));
        }
        println!();
    }

    println!();
    println!("LOAD TYPES (default power factor)");
    for load in LoadType::ALL {
        println!("{:<18} {:.2}", format!("{:?}", load), load.power_factor());
    }

    println!();
    println!("PROFILE OPTIONS");
    let phases: Vec<&str> = SystemPhase::ALL.iter().map(|p| p.display_name()).collect();
    let terminals: Vec<&str> = TerminalCapPolicy::ALL.iter().map(|p| p.display_name()).collect();
    let verdicts: Vec<&str> = DropVerdictPolicy::ALL.iter().map(|p| p.display_name()).collect();
    println!("{:<18} {}", "Phase", phases.join(", "));
    println!("{:<18} {}", "Terminal limit", terminals.join(", "));
    println!("{:<18} {}", "Drop verdict", verdicts.join(", "));
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            input,
            profile,
            json,
            strict,
        } => {
            let circuit: CalculationInput = read_json(&input)?;
            let profile = load_profile(profile.as_deref())?;
            let evaluation = evaluate(&circuit, &profile)?;
            print_evaluation(&evaluation, json)?;

            if strict && !evaluation.passes() {
                bail!("circuit '{}' {}", circuit.label, evaluation.overall());
            }
        }

        Commands::Report {
            input,
            output,
            profile,
            engineer,
            job,
            client,
        } => {
            let circuit: CalculationInput = read_json(&input)?;
            let profile = load_profile(profile.as_deref())?;
            let evaluation = evaluate(&circuit, &profile)?;
            let meta = Study::new(engineer, job, client).meta;
            write_pdf(&output, &render_circuit_pdf(&evaluation, &meta)?)?;
        }

        Commands::Study { input, output } => {
            let text = fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
            let study = Study::from_json(&text)?;
            study.profile.validate()?;
            info!(circuits = study.circuit_count(), "loaded study");

            match output {
                Some(output) => write_pdf(&output, &render_study_pdf(&study)?)?,
                None => {
                    for (_, evaluation) in study.evaluate_all()? {
                        print_evaluation(&evaluation, false)?;
                        println!();
                    }
                }
            }
        }

        Commands::NewStudy {
            output,
            engineer,
            job,
            client,
        } => {
            let mut study = Study::new(engineer, job, client);
            study.add_circuit(CalculationInput::example());
            fs::write(&output, study.to_json()?).with_context(|| format!("writing {}", output.display()))?;
            info!(path = %output.display(), "wrote study");
        }

        Commands::Tables => print_tables(),

        Commands::Demo { json, defaults } => {
            let mut circuit = CalculationInput::example();
            if !defaults {
                println!("{} on {}, {:.0} V", circuit.label, circuit.gauge, circuit.service_voltage_v);
                circuit.load_va = prompt_f64("Load (VA)", circuit.load_va);
                circuit.length_m = prompt_f64("Circuit length (m)", circuit.length_m);
                println!();
            }

            let evaluation = evaluate(&circuit, &CodeProfile::default())?;
            print_evaluation(&evaluation, json)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_kept_without_verbose() {
        assert_eq!(build_filter(false, Some("warn")).to_string(), "warn");
        assert_eq!(build_filter(false, Some("circuit_core=trace")).to_string(), "circuit_core=trace");
    }

    #[test]
    fn test_filter_defaults() {
        assert_eq!(build_filter(false, None).to_string(), "info");
        assert_eq!(build_filter(true, Some("warn")).to_string(), "debug");
    }
}
