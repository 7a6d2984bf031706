//! Triage CLI - Command-line interface for review-triage
//!
//! Commands:
//! - classify: Classify reviews from tabular rows or plain text (batch mode)
//! - schema: Print the accepted input columns and the output shape
//! - doctor: Diagnose engine health and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use review_triage::config::ClassifierConfig;
use review_triage::pipeline::{BatchOutput, ReviewClassifier};
use review_triage::schema::{self, CanonicalField};
use review_triage::types::ClassificationResult;
use review_triage::{EngineError, ENGINE_VERSION, PRODUCER_NAME};

/// Triage - deterministic, explainable classification for short review text
#[derive(Parser)]
#[command(name = "triage")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Classify reviews into valid/ad/rant/irrelevant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify reviews (batch mode)
    Classify {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Confidence threshold for counting flagged reviews
        #[arg(long, default_value = "0.6")]
        confidence_threshold: f64,

        /// Maximum rows processed per batch
        #[arg(long)]
        max_rows: Option<usize>,

        /// Comma-separated category keywords (enables the relevance signal)
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,

        /// Print a batch summary to stderr
        #[arg(long)]
        summary: bool,
    },

    /// Print schema information
    Schema {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one row object per line)
    Ndjson,
    /// JSON array of row objects
    Json,
    /// Plain text (one review per line)
    Text,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one result per line)
    Ndjson,
    /// JSON array of results
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TriageCliError> {
    match cli.command {
        Commands::Classify {
            input,
            output,
            input_format,
            output_format,
            confidence_threshold,
            max_rows,
            keywords,
            summary,
        } => cmd_classify(
            &input,
            &output,
            input_format,
            output_format,
            confidence_threshold,
            max_rows,
            keywords,
            summary,
        ),

        Commands::Schema { json } => cmd_schema(json),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_classify(
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
    confidence_threshold: f64,
    max_rows: Option<usize>,
    keywords: Vec<String>,
    summary: bool,
) -> Result<(), TriageCliError> {
    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    // Build the classifier
    let mut config = ClassifierConfig::default()
        .with_confidence_threshold(confidence_threshold);
    if let Some(limit) = max_rows {
        config = config.with_max_rows(limit);
    }
    let keywords: Vec<String> = keywords
        .into_iter()
        .filter(|k| !k.trim().is_empty())
        .collect();
    if !keywords.is_empty() {
        config = config.with_keywords(keywords);
    }
    let classifier = ReviewClassifier::with_config(config);

    // Classify
    let batch: BatchOutput = match input_format {
        InputFormat::Ndjson => {
            let rows = schema::parse_ndjson_rows(&input_data)?;
            classifier.classify_rows(&rows)
        }
        InputFormat::Json => {
            let rows = schema::parse_array_rows(&input_data)?;
            classifier.classify_rows(&rows)
        }
        InputFormat::Text => {
            let texts: Vec<String> = input_data
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.to_string())
                .collect();
            let results = classifier.classify_texts(&texts);
            let count = texts.len();
            BatchOutput {
                results,
                input_count: count,
                processed_count: count,
            }
        }
    };

    if batch.input_count == 0 {
        return Err(TriageCliError::NoRecords);
    }

    // Write output
    let output_data = format_output(&batch.results, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    if summary {
        let report = BatchSummary {
            input_count: batch.input_count,
            processed_count: batch.processed_count,
            truncated: batch.truncated(),
            flagged_count: classifier.flagged_count(&batch.results),
            confidence_threshold,
        };
        eprintln!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}

fn cmd_schema(json: bool) -> Result<(), TriageCliError> {
    let classifier = ReviewClassifier::new();
    let table = classifier.alias_table();

    let fields = [
        ("id", CanonicalField::Id),
        ("text", CanonicalField::Text),
        ("rating", CanonicalField::Rating),
        ("user", CanonicalField::User),
        ("timestamp", CanonicalField::Timestamp),
    ];

    if json {
        let mut entries = serde_json::Map::new();
        for (name, field) in fields {
            entries.insert(
                name.to_string(),
                serde_json::json!(table.aliases(field)),
            );
        }
        let doc = serde_json::json!({
            "input_columns": entries,
            "output_fields": ["label", "scores", "violations", "spans"],
            "labels": ["valid", "ad", "rant", "irrelevant"],
            "span_categories": ["url", "promo", "rant", "novisit"],
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("Input columns (canonical field: accepted aliases)");
        println!("=================================================");
        for (name, field) in fields {
            println!("  {:10} {}", name, table.aliases(field).join(", "));
        }
        println!();
        println!("Unrecognized extra columns are ignored.");
        println!();
        println!("Output per record:");
        println!("  label      one of valid|ad|rant|irrelevant");
        println!("  scores     object with all four labels, sums to 1");
        println!("  violations array of human-readable reasons");
        println!("  spans      array of [category, start, end] char offsets");
    }

    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), TriageCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, ENGINE_VERSION),
    });

    // Smoke-test the pipeline on the canonical fixtures
    let classifier = ReviewClassifier::new();
    let fixtures = [
        (
            "Visit our website www.bestdeals.com for exclusive deals!",
            review_triage::Label::Ad,
        ),
        ("TERRIBLE!!!! WORST PLACE EVER!!!!", review_triage::Label::Rant),
        (
            "Never been here but heard bad things.",
            review_triage::Label::Irrelevant,
        ),
        ("Great food and amazing service!", review_triage::Label::Valid),
    ];
    let mut failed = 0;
    for (text, expected) in fixtures {
        let result = classifier.classify(&review_triage::NormalizedRecord::from_text("probe", text));
        if result.label != expected {
            failed += 1;
        }
    }
    checks.push(if failed == 0 {
        DoctorCheck {
            name: "pipeline".to_string(),
            status: CheckStatus::Ok,
            message: format!("{} fixture classifications passed", fixtures.len()),
        }
    } else {
        DoctorCheck {
            name: "pipeline".to_string(),
            status: CheckStatus::Error,
            message: format!("{} of {} fixture classifications failed", failed, fixtures.len()),
        }
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Triage Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(TriageCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn format_output(
    results: &[ClassificationResult],
    format: &OutputFormat,
) -> Result<String, TriageCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for result in results {
                lines.push(serde_json::to_string(result)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(results)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(results)?),
    }
}

// Error types

#[derive(Debug)]
enum TriageCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoRecords,
    DoctorFailed,
}

impl From<io::Error> for TriageCliError {
    fn from(e: io::Error) -> Self {
        TriageCliError::Io(e)
    }
}

impl From<EngineError> for TriageCliError {
    fn from(e: EngineError) -> Self {
        TriageCliError::Engine(e)
    }
}

impl From<serde_json::Error> for TriageCliError {
    fn from(e: serde_json::Error) -> Self {
        TriageCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TriageCliError> for CliError {
    fn from(e: TriageCliError) -> Self {
        match e {
            TriageCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TriageCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'triage schema' to see the accepted input shape".to_string()),
            },
            TriageCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TriageCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            TriageCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct BatchSummary {
    input_count: usize,
    processed_count: usize,
    truncated: bool,
    flagged_count: usize,
    confidence_threshold: f64,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
