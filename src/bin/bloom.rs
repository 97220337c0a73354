//! Bloom CLI - Command-line interface for Bloom Core
//!
//! Commands:
//! - init: Create a state file (sample data or empty)
//! - log: Write a daily log from JSON
//! - period-start: Record the start of a period
//! - cycle / garden / insights / context: Print derived values
//! - validate: Check a state file
//! - doctor: Diagnose configuration

use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bloom_core::context::ChatContext;
use bloom_core::cycle::days_until_next_period;
use bloom_core::types::{parse_date, NewDailyLog, Snapshot};
use bloom_core::{BloomError, LogStore, ValidationError, BLOOM_VERSION, PRODUCER_NAME};

/// Bloom - On-device analytics for a daily wellness journal
#[derive(Parser)]
#[command(name = "bloom")]
#[command(author = "Bloom Wellness")]
#[command(version = BLOOM_VERSION)]
#[command(about = "Track daily wellness logs and derive cycle, garden and insights", long_about = None)]
struct Cli {
    /// State file holding the store snapshot
    #[arg(long, global = true, env = "BLOOM_STATE", default_value = "bloom.json")]
    state: PathBuf,

    /// Reference date (YYYY-MM-DD), defaults to the local date
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a state file
    Init {
        /// Seed for the sample data generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Start with an empty store instead of sample data
        #[arg(long)]
        empty: bool,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Write a daily log (replaces any log for the same date)
    Log {
        /// Input file with a daily log JSON object (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Record the start of a period
    PeriodStart {
        /// Start date (YYYY-MM-DD), defaults to the reference date
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show the current cycle phase
    Cycle,

    /// Show monthly plants and the garden summary
    Garden,

    /// Show insights for the current month
    Insights,

    /// Print the chat assistant briefing
    Context,

    /// Validate a state file
    Validate {
        /// State file to check (defaults to --state, use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Diagnose configuration
    Doctor,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), BloomCliError> {
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let state = cli.state.as_path();
    let format = cli.format;

    match cli.command {
        Commands::Init { seed, empty, force } => cmd_init(state, today, seed, empty, force),
        Commands::Log { input } => cmd_log(state, &input, format),
        Commands::PeriodStart { date } => cmd_period_start(state, date.unwrap_or(today), today, format),
        Commands::Cycle => cmd_cycle(state, today, format),
        Commands::Garden => cmd_garden(state, today, format),
        Commands::Insights => cmd_insights(state, today, format),
        Commands::Context => cmd_context(state, today, format),
        Commands::Validate { input } => cmd_validate(input.as_deref().unwrap_or(state), format),
        Commands::Doctor => cmd_doctor(state, format),
    }
}

fn cmd_init(state: &Path, today: NaiveDate, seed: u64, empty: bool, force: bool) -> Result<(), BloomCliError> {
    if state.exists() && !force {
        return Err(BloomCliError::StateExists(state.display().to_string()));
    }

    let store = if empty {
        LogStore::new()
    } else {
        LogStore::with_sample_data(today, seed)
    };
    save_store(state, &store)?;

    info!(path = %state.display(), logs = store.logs().len(), "initialized state file");
    println!("Initialized {} with {} logs", state.display(), store.logs().len());
    Ok(())
}

fn cmd_log(state: &Path, input: &Path, format: OutputFormat) -> Result<(), BloomCliError> {
    let input_data = read_input(input)?;
    let entry: NewDailyLog = serde_json::from_str(&input_data)
        .map_err(|e| BloomCliError::ParseError(format!("Failed to parse daily log: {}", e)))?;

    let mut store = load_store(state)?;
    let stored = store.upsert(entry, Utc::now())?.clone();
    save_store(state, &store)?;

    match format {
        OutputFormat::Text => {
            let plant = store.get_plant(bloom_core::MonthKey::of(stored.date));
            println!("Logged {} ({}, energy {}/5)", stored.date, stored.mood.label(), stored.energy);
            if let Some(plant) = plant {
                println!(
                    "Plant for {}: {} ({}%)",
                    plant.month,
                    plant.stage().label(),
                    plant.growth_score
                );
            }
        }
        _ => println!("{}", to_json(&stored, format)?),
    }
    Ok(())
}

fn cmd_period_start(state: &Path, date: NaiveDate, today: NaiveDate, format: OutputFormat) -> Result<(), BloomCliError> {
    let mut store = load_store(state)?;
    store.log_period_start(date);
    save_store(state, &store)?;

    match format {
        OutputFormat::Text => println!("Period start recorded for {}", date),
        _ => println!("{}", to_json(&store.cycle_data(), format)?),
    }
    debug!(%today, "cycle position after period start: {:?}", store.current_position(today));
    Ok(())
}

fn cmd_cycle(state: &Path, today: NaiveDate, format: OutputFormat) -> Result<(), BloomCliError> {
    let store = load_store(state)?;
    let cycle = store.cycle_data().copied().ok_or(BloomCliError::NoCycleData)?;
    let position = bloom_core::phase_for(cycle.period_start_date, today);
    let guide = position.phase.guide();
    let days_until = days_until_next_period(cycle.period_start_date, today);

    let report = CycleReport {
        date: today,
        period_start_date: cycle.period_start_date,
        phase: position.phase.as_str(),
        cycle_day: position.cycle_day,
        days_until_next_period: days_until,
        description: guide.description,
        energy_level: guide.energy_level,
    };

    match format {
        OutputFormat::Text => {
            println!("{} - Day {} of 28", guide.name, report.cycle_day);
            println!("{}", report.description);
            println!("{}", report.energy_level);
            if days_until == 0 {
                println!("A new cycle starts today");
            } else {
                println!("Next period in {} days", days_until);
            }
        }
        _ => println!("{}", to_json(&report, format)?),
    }
    Ok(())
}

fn cmd_garden(state: &Path, today: NaiveDate, format: OutputFormat) -> Result<(), BloomCliError> {
    let store = load_store(state)?;
    let summary = store.garden_summary();

    match format {
        OutputFormat::Text => {
            println!("Garden");
            println!("======");
            if store.plants().is_empty() {
                println!("No plants yet. Log a day to plant your first seed.");
            }
            for plant in store.plants() {
                let marker = if plant.month.contains(today) { " (current)" } else { "" };
                println!(
                    "  {}{}: {} {}% ({}/{} days)",
                    plant.month,
                    marker,
                    plant.stage().label(),
                    plant.growth_score,
                    plant.days_logged,
                    plant.total_days
                );
            }
            println!();
            println!("Total days logged: {}", summary.total_days_logged);
            println!("Average growth:    {}%", summary.average_growth);
            println!("Plants in bloom:   {}", summary.plants_grown);
        }
        _ => {
            let report = GardenReport {
                plants: store.plants(),
                summary,
            };
            println!("{}", to_json(&report, format)?);
        }
    }
    Ok(())
}

fn cmd_insights(state: &Path, today: NaiveDate, format: OutputFormat) -> Result<(), BloomCliError> {
    let store = load_store(state)?;
    let report = store.insights(today);

    match format {
        OutputFormat::Text => {
            let averages = report.averages.rounded();
            println!("Insights for {}", report.month);
            println!("====================");
            println!("Days logged:   {} (consistency {}%)", report.days_logged, report.consistency_rate);
            println!("Avg energy:    {:.1}/5", averages.energy);
            println!("Avg movement:  {}%", averages.movement);
            println!("Avg nutrition: {}%", averages.nutrition);
            println!("Avg sleep:     {}%", averages.sleep);
            println!("Energy trend:  {}", report.energy_trend.as_str());

            let moods: Vec<String> = report
                .mood_distribution
                .present()
                .iter()
                .map(|(mood, count)| format!("{} {}", mood.label(), count))
                .collect();
            if !moods.is_empty() {
                println!("Moods:         {}", moods.join(", "));
            }

            let symptoms: Vec<String> = report
                .top_symptoms
                .iter()
                .map(|s| format!("{} ({})", s.symptom, s.count))
                .collect();
            if !symptoms.is_empty() {
                println!("Top symptoms:  {}", symptoms.join(", "));
            }
        }
        _ => println!("{}", to_json(&report, format)?),
    }
    Ok(())
}

fn cmd_context(state: &Path, today: NaiveDate, format: OutputFormat) -> Result<(), BloomCliError> {
    let store = load_store(state)?;
    let context = ChatContext::from_store(&store, today);

    match format {
        OutputFormat::Text => println!("{}", context.briefing_or_default()),
        _ => println!("{}", to_json(&context, format)?),
    }
    Ok(())
}

fn cmd_validate(input: &Path, format: OutputFormat) -> Result<(), BloomCliError> {
    let input_data = read_input(input)?;
    let snapshot: Snapshot = serde_json::from_str(&input_data)?;

    let mut errors: Vec<ValidationErrorDetail> = Vec::new();
    for (index, log) in snapshot.daily_logs.iter().enumerate() {
        if let Err(e) = NewDailyLog::from(log).validate() {
            errors.push(ValidationErrorDetail {
                index,
                date: log.date,
                error: e.to_string(),
            });
        }
    }

    let mut dates: Vec<NaiveDate> = snapshot.daily_logs.iter().map(|l| l.date).collect();
    dates.sort();
    dates.dedup();

    let report = ValidationReport {
        total_logs: snapshot.daily_logs.len(),
        valid_logs: snapshot.daily_logs.len() - errors.len(),
        invalid_logs: errors.len(),
        duplicate_dates: snapshot.daily_logs.len() - dates.len(),
        plants: snapshot.plants.len(),
        has_cycle_data: snapshot.cycle_data.is_some(),
        errors,
    };

    match format {
        OutputFormat::Text => {
            println!("Validation Report");
            println!("=================");
            println!("Total logs:      {}", report.total_logs);
            println!("Valid logs:      {}", report.valid_logs);
            println!("Invalid logs:    {}", report.invalid_logs);
            println!("Duplicate dates: {}", report.duplicate_dates);
            println!("Plants:          {}", report.plants);
            println!("Cycle data:      {}", if report.has_cycle_data { "yes" } else { "no" });

            if !report.errors.is_empty() {
                println!("\nErrors:");
                for err in &report.errors {
                    println!("  - Log {} (index {}): {}", err.date, err.index, err.error);
                }
            }
        }
        _ => println!("{}", to_json(&report, format)?),
    }

    if report.invalid_logs > 0 {
        Err(BloomCliError::ValidationFailed(report.invalid_logs))
    } else {
        Ok(())
    }
}

fn cmd_doctor(state: &Path, format: OutputFormat) -> Result<(), BloomCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "bloom_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Bloom version {}", BLOOM_VERSION),
    });

    if state.exists() {
        match fs::read_to_string(state) {
            Ok(content) => match LogStore::from_json(&content) {
                Ok(store) => checks.push(DoctorCheck {
                    name: "state".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "State file valid ({} logs, {} plants)",
                        store.logs().len(),
                        store.plants().len()
                    ),
                }),
                Err(e) => checks.push(DoctorCheck {
                    name: "state".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid state JSON: {}", e),
                }),
            },
            Err(e) => checks.push(DoctorCheck {
                name: "state".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read state file: {}", e),
            }),
        }
    } else {
        checks.push(DoctorCheck {
            name: "state".to_string(),
            status: CheckStatus::Warning,
            message: format!("State file {} does not exist (run 'bloom init')", state.display()),
        });
    }

    // Piped input is how `bloom log --input -` receives entries
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
            message: "stdin is a pipe (ready for 'bloom log --input -')".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: BLOOM_VERSION.to_string(),
        checks,
    };

    match format {
        OutputFormat::Text => {
            println!("Bloom Doctor Report");
            println!("===================");
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
        _ => println!("{}", to_json(&report, format)?),
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(BloomCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, BloomCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_store(state: &Path) -> Result<LogStore, BloomCliError> {
    if !state.exists() {
        debug!(path = %state.display(), "state file missing, starting empty");
        return Ok(LogStore::new());
    }
    let json = fs::read_to_string(state)?;
    Ok(LogStore::from_json(&json)?)
}

fn save_store(state: &Path, store: &LogStore) -> Result<(), BloomCliError> {
    fs::write(state, store.to_json()?)?;
    debug!(path = %state.display(), "state file written");
    Ok(())
}

fn to_json<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, BloomCliError> {
    match format {
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

// Error types

#[derive(Debug)]
enum BloomCliError {
    Io(io::Error),
    Store(BloomError),
    Json(serde_json::Error),
    Validation(ValidationError),
    StateExists(String),
    NoCycleData,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for BloomCliError {
    fn from(e: io::Error) -> Self {
        BloomCliError::Io(e)
    }
}

impl From<BloomError> for BloomCliError {
    fn from(e: BloomError) -> Self {
        BloomCliError::Store(e)
    }
}

impl From<serde_json::Error> for BloomCliError {
    fn from(e: serde_json::Error) -> Self {
        BloomCliError::Json(e)
    }
}

impl From<ValidationError> for BloomCliError {
    fn from(e: ValidationError) -> Self {
        BloomCliError::Validation(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BloomCliError> for CliError {
    fn from(e: BloomCliError) -> Self {
        match e {
            BloomCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            BloomCliError::Store(e) => CliError {
                code: "STATE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'bloom validate' to inspect the state file".to_string()),
            },
            BloomCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            BloomCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Energy is 1-5, percentages 0-100, at most 3 keywords".to_string()),
            },
            BloomCliError::StateExists(path) => CliError {
                code: "STATE_EXISTS".to_string(),
                message: format!("State file {} already exists", path),
                hint: Some("Pass --force to overwrite it".to_string()),
            },
            BloomCliError::NoCycleData => CliError {
                code: "NO_CYCLE_DATA".to_string(),
                message: "No period start recorded".to_string(),
                hint: Some("Run 'bloom period-start' first".to_string()),
            },
            BloomCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} logs failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            BloomCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            BloomCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycleReport {
    date: NaiveDate,
    period_start_date: NaiveDate,
    phase: &'static str,
    cycle_day: u32,
    days_until_next_period: u32,
    description: &'static str,
    energy_level: &'static str,
}

#[derive(Serialize)]
struct GardenReport<'a> {
    plants: &'a [bloom_core::PlantData],
    summary: bloom_core::GardenSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    total_logs: usize,
    valid_logs: usize,
    invalid_logs: usize,
    duplicate_dates: usize,
    plants: usize,
    has_cycle_data: bool,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: NaiveDate,
    error: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
