//! liftstreak CLI - Command-line interface for the activity streak engine
//!
//! Commands:
//! - streak: Compute the current streak from an activity history
//! - report: Streak plus the qualification calendar
//! - validate: Validate store activity-log rows
//! - plan: Build generation prompts and check generated plans
//! - doctor: Diagnose configuration

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use liftstreak::calendar::parse_day;
use liftstreak::plan::{
    accept_gateway_reply, ExperienceLevel, Gender, PlanRequest, PlanValidationError, TrainingGoal,
};
use liftstreak::schema::{ActivityLogAdapter, RecordIssue};
use liftstreak::types::{ActivityEvent, StreakReport};
use liftstreak::{
    ComputeError, EngineConfig, ReferenceCalendar, StreakEngine, LIFTSTREAK_VERSION,
    PRODUCER_NAME,
};

/// liftstreak - Daily activity streaks from strength and cardio logs
#[derive(Parser)]
#[command(name = "liftstreak")]
#[command(version = LIFTSTREAK_VERSION)]
#[command(about = "Compute training streaks from activity logs", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the current streak
    Streak {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Compute the streak and the qualification calendar
    Report {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Days shown in the calendar, ending today
        #[arg(long)]
        calendar_days: Option<u32>,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,
    },

    /// Validate store activity-log rows
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Workout plan generation helpers
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Diagnose configuration
    Doctor {
        /// Check an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Print the generation prompt for a request
    Prompt {
        #[command(flatten)]
        request: PlanRequestArgs,

        /// Print the chat messages as JSON instead of the bare prompt
        #[arg(long)]
        messages: bool,
    },

    /// Parse and validate a generator reply
    Check {
        /// Generator reply (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Request JSON the reply answers; enables the session count check
        #[arg(long)]
        request: Option<PathBuf>,

        /// HTTP status the gateway answered with
        #[arg(long, default_value_t = 200)]
        status: u16,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format
    #[arg(long, default_value = "log")]
    input_format: InputFormat,

    /// Current day as YYYY-MM-DD (defaults to today in the reference calendar)
    #[arg(long)]
    today: Option<String>,
}

#[derive(Args)]
struct EngineArgs {
    /// Load engine configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference calendar as a UTC offset, e.g. "UTC" or "+02:00"
    #[arg(long)]
    utc_offset: Option<String>,

    /// Days walked backward from today
    #[arg(long)]
    horizon_days: Option<u32>,

    /// Strength sets needed for a day to qualify
    #[arg(long)]
    min_strength_sets: Option<u32>,

    /// Cardio sessions needed for a day to qualify
    #[arg(long)]
    min_cardio_sessions: Option<u32>,
}

#[derive(Args)]
struct PlanRequestArgs {
    #[arg(long, value_enum)]
    goal: GoalArg,

    #[arg(long, value_enum)]
    gender: GenderArg,

    /// Body weight in kilograms
    #[arg(long)]
    weight: f64,

    #[arg(long, value_enum)]
    level: LevelArg,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Store document with workout_logs and cardio_logs arrays
    Log,
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable text
    Text,
}

#[derive(Clone, Copy, ValueEnum)]
enum GoalArg {
    FatBurning,
    Hypertrophy,
}

#[derive(Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    Beginner,
    Intermediate,
    Advanced,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

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

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("liftstreak=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<(), LiftstreakCliError> {
    match cli.command {
        Commands::Streak {
            input,
            engine,
            output_format,
        } => cmd_streak(&input, &engine, output_format),

        Commands::Report {
            input,
            engine,
            calendar_days,
            output_format,
        } => cmd_report(&input, &engine, calendar_days, output_format),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Plan { command } => match command {
            PlanCommands::Prompt { request, messages } => cmd_plan_prompt(&request, messages),
            PlanCommands::Check {
                input,
                request,
                status,
            } => cmd_plan_check(&input, request.as_deref(), status),
        },

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_streak(
    input: &InputArgs,
    engine_args: &EngineArgs,
    output_format: OutputFormat,
) -> Result<(), LiftstreakCliError> {
    let config = build_config(engine_args, None)?;
    let today = resolve_today(input.today.as_deref(), &config.calendar)?;
    let events = load_events(input)?;

    let engine = StreakEngine::with_config(config)?;
    let streak = engine.streak(&events, today);

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&streak)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&streak)?),
        OutputFormat::Text => println!("{} day streak as of {}", streak.count, streak.as_of_day),
    }

    Ok(())
}

fn cmd_report(
    input: &InputArgs,
    engine_args: &EngineArgs,
    calendar_days: Option<u32>,
    output_format: OutputFormat,
) -> Result<(), LiftstreakCliError> {
    let config = build_config(engine_args, calendar_days)?;
    let today = resolve_today(input.today.as_deref(), &config.calendar)?;
    let events = load_events(input)?;

    let engine = StreakEngine::with_config(config)?;
    let report = engine.report(&events, today);

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &StreakReport) {
    println!("Streak Report");
    println!("=============");
    println!("Current streak: {} day(s)", report.streak.count);
    println!("As of:          {} ({})", report.streak.as_of_day, report.utc_offset);
    println!("Horizon:        {} days", report.horizon_days);
    println!(
        "Qualified:      {} of {} days",
        report.qualified_days_in_window,
        report.calendar.len()
    );
    println!("\nCalendar:");
    for day in &report.calendar {
        let mark = if day.qualified { "[x]" } else { "[ ]" };
        println!(
            "  {} {}  sets: {:>3}  cardio: {}",
            mark, day.day, day.strength_set_count, day.cardio_session_count
        );
    }
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), LiftstreakCliError> {
    let input_data = read_input(input)?;
    let log = ActivityLogAdapter::parse_log(&input_data)?;
    let issues = ActivityLogAdapter::validate_log(&log);

    let report = ValidationReport {
        total_records: log.len(),
        valid_records: log.len() - issues.len(),
        invalid_records: issues.len(),
        errors: issues.iter().map(ValidationErrorDetail::from).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - {} {} (index {}): {}",
                    err.table,
                    err.record_id.as_deref().unwrap_or("without id"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(LiftstreakCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_plan_prompt(args: &PlanRequestArgs, messages: bool) -> Result<(), LiftstreakCliError> {
    let request = args.to_request();
    request.validate()?;

    if messages {
        println!("{}", serde_json::to_string_pretty(&request.chat_messages())?);
    } else {
        println!("{}", request.build_prompt());
    }
    Ok(())
}

fn cmd_plan_check(
    input: &Path,
    request: Option<&Path>,
    status: u16,
) -> Result<(), LiftstreakCliError> {
    let raw = read_input(input)?;
    let request = match request {
        Some(path) => Some(serde_json::from_str::<PlanRequest>(&fs::read_to_string(path)?)?),
        None => None,
    };

    let plan = accept_gateway_reply(status, &raw, request.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), LiftstreakCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("liftstreak version {}", LIFTSTREAK_VERSION),
    });

    if let Some(config_path) = config {
        if config_path.exists() {
            let check = match fs::read_to_string(config_path) {
                Ok(content) => match EngineConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (>= {} sets or >= {} cardio, {} day horizon, calendar {})",
                            config.policy.min_strength_sets,
                            config.policy.min_cardio_sessions,
                            config.horizon_days,
                            config.calendar
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            };
            checks.push(check);
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist, defaults will be used".to_string(),
            });
        }
    } else {
        let defaults = EngineConfig::default();
        checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Using defaults (>= {} sets or >= {} cardio, {} day horizon, calendar {})",
                defaults.policy.min_strength_sets,
                defaults.policy.min_cardio_sessions,
                defaults.horizon_days,
                defaults.calendar
            ),
        });
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input FILE)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: LIFTSTREAK_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("liftstreak Doctor Report");
        println!("========================");
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
        Err(LiftstreakCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, LiftstreakCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_events(input: &InputArgs) -> Result<Vec<ActivityEvent>, LiftstreakCliError> {
    let input_data = read_input(&input.input)?;

    let events = match input.input_format {
        InputFormat::Log => {
            let log = ActivityLogAdapter::parse_log(&input_data)?;
            ActivityLogAdapter::to_events(&log)?
        }
        InputFormat::Ndjson => ActivityLogAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => ActivityLogAdapter::parse_array(&input_data)?,
    };

    tracing::info!(events = events.len(), "Loaded activity events");
    Ok(events)
}

/// Config file first, then flag overrides
fn build_config(
    args: &EngineArgs,
    calendar_days: Option<u32>,
) -> Result<EngineConfig, LiftstreakCliError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };

    if let Some(offset) = &args.utc_offset {
        config.calendar = ReferenceCalendar::parse(offset)?;
    }
    if let Some(horizon) = args.horizon_days {
        config.horizon_days = horizon;
    }
    if let Some(sets) = args.min_strength_sets {
        config.policy.min_strength_sets = sets;
    }
    if let Some(sessions) = args.min_cardio_sessions {
        config.policy.min_cardio_sessions = sessions;
    }
    if let Some(days) = calendar_days {
        config.calendar_days = days;
    }

    config.validate()?;
    Ok(config)
}

/// The only place the system clock is read
fn resolve_today(
    today: Option<&str>,
    calendar: &ReferenceCalendar,
) -> Result<NaiveDate, LiftstreakCliError> {
    match today {
        Some(day) => Ok(parse_day(day)?),
        None => Ok(calendar.today(&Utc::now())),
    }
}

impl PlanRequestArgs {
    fn to_request(&self) -> PlanRequest {
        PlanRequest {
            goal: match self.goal {
                GoalArg::FatBurning => TrainingGoal::FatBurning,
                GoalArg::Hypertrophy => TrainingGoal::Hypertrophy,
            },
            gender: match self.gender {
                GenderArg::Male => Gender::Male,
                GenderArg::Female => Gender::Female,
            },
            weight_kg: self.weight,
            level: match self.level {
                LevelArg::Beginner => ExperienceLevel::Beginner,
                LevelArg::Intermediate => ExperienceLevel::Intermediate,
                LevelArg::Advanced => ExperienceLevel::Advanced,
            },
        }
    }
}

// Error types

#[derive(Debug)]
enum LiftstreakCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for LiftstreakCliError {
    fn from(e: io::Error) -> Self {
        LiftstreakCliError::Io(e)
    }
}

impl From<ComputeError> for LiftstreakCliError {
    fn from(e: ComputeError) -> Self {
        LiftstreakCliError::Compute(e)
    }
}

impl From<serde_json::Error> for LiftstreakCliError {
    fn from(e: serde_json::Error) -> Self {
        LiftstreakCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl From<LiftstreakCliError> for CliError {
    fn from(e: LiftstreakCliError) -> Self {
        match e {
            LiftstreakCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
                details: Vec::new(),
            },
            LiftstreakCliError::Compute(e) => compute_error(e),
            LiftstreakCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
                details: Vec::new(),
            },
            LiftstreakCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix the listed records and retry".to_string()),
                details: Vec::new(),
            },
            LiftstreakCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
                details: Vec::new(),
            },
        }
    }
}

fn compute_error(e: ComputeError) -> CliError {
    let (code, hint) = match &e {
        ComputeError::ParseError(_) | ComputeError::JsonError(_) => {
            ("PARSE_ERROR", "Check the input format")
        }
        ComputeError::InvalidTimezone(_) => (
            "INVALID_UTC_OFFSET",
            "Use UTC or an offset such as +02:00 or -0530",
        ),
        ComputeError::DateParseError(_) => ("INVALID_DATE", "Use YYYY-MM-DD"),
        ComputeError::InvalidConfig(_) => (
            "INVALID_CONFIG",
            "Thresholds and horizon must be at least 1, calendar_days at most 366",
        ),
        ComputeError::InvalidRecord { .. } => (
            "INVALID_RECORD",
            "Run 'liftstreak validate' for details",
        ),
        ComputeError::SourceUnavailable(_) => ("SOURCE_UNAVAILABLE", "Retry once the store is reachable"),
        ComputeError::InvalidPlan(_) => ("INVALID_PLAN", "Regenerate the plan"),
        ComputeError::GatewayError(_) => ("GATEWAY_ERROR", "Try again later"),
    };

    let details = match &e {
        ComputeError::InvalidPlan(problems) => {
            problems.iter().map(PlanValidationError::to_string).collect()
        }
        _ => Vec::new(),
    };

    CliError {
        code: code.to_string(),
        message: e.to_string(),
        hint: Some(hint.to_string()),
        details,
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    table: String,
    index: usize,
    record_id: Option<String>,
    error: String,
}

impl From<&RecordIssue> for ValidationErrorDetail {
    fn from(issue: &RecordIssue) -> Self {
        Self {
            table: issue.table.to_string(),
            index: issue.index,
            record_id: issue.record_id.clone(),
            error: issue.error.to_string(),
        }
    }
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
