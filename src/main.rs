//! Sondage CLI - Flatten XFDF survey forms and reshape the results
//!
//! # Main Commands
//!
//! ```bash
//! sondage flatten forms/ -o table.csv    # Forms directory to wide CSV
//! sondage reshape table.csv -q Q1        # Count view for a question
//! sondage reshape table.csv -q Q2 -v network
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! sondage inspect table.csv              # Show table dimensions and encoding
//! sondage questions                      # List questions and their views
//! ```

use clap::{Parser, Subcommand};
use sondage::{
    detect_encoding, flatten_dir, load_table, parse_question, parse_view_kind, reshape,
    save_table, FlattenOptions, Question, ViewKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sondage")]
#[command(about = "Flatten XFDF survey forms and reshape the results into analysis views", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a directory of XFDF forms into a wide CSV table
    Flatten {
        /// Directory containing .xfdf form files
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip unreadable or malformed forms instead of aborting
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Reshape a wide table into one view dataset (JSON)
    Reshape {
        /// Input wide CSV table
        input: PathBuf,

        /// Question key: Department, Q1, Q2, Q3 or Q4
        #[arg(short, long)]
        question: String,

        /// View kind: counts, contingency, network or long
        #[arg(short, long, default_value = "counts")]
        view: String,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show dimensions and encoding of a wide table
    Inspect {
        /// Input wide CSV table
        input: PathBuf,
    },

    /// List questions, their prompts and the views each supports
    Questions,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Flatten {
            input,
            output,
            skip_invalid,
        } => cmd_flatten(&input, output.as_deref(), skip_invalid),

        Commands::Reshape {
            input,
            question,
            view,
            output,
        } => cmd_reshape(&input, &question, &view, output.as_deref()),

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Questions => cmd_questions(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_flatten(
    input: &Path,
    output: Option<&Path>,
    skip_invalid: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Flattening forms in: {}", input.display());

    let options = FlattenOptions { skip_invalid };
    let report = flatten_dir(input, &options)?;

    eprintln!("   Respondents: {}", report.table.len());
    if report.ignored_count > 0 {
        eprintln!("   Ignored (not .xfdf): {}", report.ignored_count);
    }
    if !report.skipped.is_empty() {
        eprintln!("   ⚠️  Skipped {} invalid form(s):", report.skipped.len());
        for skipped in report.skipped.iter().take(5) {
            eprintln!("     - {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    match output {
        Some(path) => {
            save_table(&report.table, path)?;
            eprintln!("💾 Table written to: {}", path.display());
        }
        None => {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(sondage::table::DELIMITER)
                .from_writer(std::io::stdout());
            writer.write_record(sondage::COLUMNS.iter())?;
            for record in report.table.rows() {
                writer.write_record(record.values())?;
            }
            writer.flush()?;
        }
    }

    eprintln!("✅ Flattened {} form(s)", report.table.len());
    Ok(())
}

fn cmd_reshape(
    input: &Path,
    question: &str,
    view: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📊 Reshaping: {}", input.display());

    let question = parse_question(question)?;
    let view = parse_view_kind(view)?;
    eprintln!("   Question: {} ({})", question, question.prompt());
    eprintln!("   View: {}", view);

    let table = load_table(input)?;
    eprintln!("   Respondents: {}", table.len());

    let dataset = reshape(&table, question, view)?;

    let json = serde_json::to_string_pretty(&dataset)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔍 Inspecting: {}", input.display());

    let bytes = fs::read(input)?;
    let encoding = detect_encoding(&bytes);
    let table = load_table(input)?;

    eprintln!("   Encoding: {}", encoding);
    eprintln!("   Columns: {}", sondage::COLUMNS.len());
    eprintln!("   Respondents: {}", table.len());

    for record in table.rows() {
        println!("  👤 {} ({})", record.name(), record.department());
    }

    Ok(())
}

fn cmd_questions() -> Result<(), Box<dyn std::error::Error>> {
    for question in Question::ALL {
        let views: Vec<&str> = ViewKind::ALL
            .iter()
            .filter(|v| v.available_for(question))
            .map(|v| v.code())
            .collect();
        println!("📋 {}", question.code());
        println!("   {}", question.prompt());
        println!("   Views: {}", views.join(", "));
        println!();
    }
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
