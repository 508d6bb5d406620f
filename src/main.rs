//! Entry point for the `rs485-bootstrap` binary.
//!
//! Runs once at deployment bring-up and performs the full provisioning
//! sequence for the RS485 services' database:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Validating the admin credentials before touching the database
//! - Connecting to MongoDB and pinging the target database
//! - Creating collections, indexes and the admin account (`bootstrap::run`)
//! - Logging (and optionally printing as JSON) the resulting schema
//!
//! # Environment Variables
//! - `MONGODB_URI` (**required**) – MongoDB connection string
//! - `MONGO_INITDB_ROOT_USERNAME` (**required**) – admin account username
//! - `MONGO_INITDB_ROOT_PASSWORD` (**required**) – admin account password
//! - `MONGO_DB_NAME` (optional) – target database (default: `rs485_db`)
//! - `MONGO_TIMEOUT_MS` (optional) – server selection/connect timeout (default: 3000)
//! - `BOOTSTRAP_VERIFY_LOGIN` (optional) – log in as the new account afterwards (default: false)
//! - `BOOTSTRAP_REPORT` (optional) – `text` or `json` on stdout (default: `text`)
//! - `BOOTSTRAP_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `BOOTSTRAP_SPAN_EVENTS` (optional) – span event mode for tracing
//! - `FORCE_COLOR` (optional) – force ANSI colors on or off
//!
//! Any failure ends the process with a non-zero exit code and the error chain
//! on stderr. Nothing is retried or rolled back.
use std::env;

use anyhow::Result;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use rs485_bootstrap::{config, db, ReportFormat};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    // Fails before any connection is opened
    let cfg = config::load_from_env()?;
    cfg.log_config();

    let client = db::connect(&cfg.mongodb_uri, &cfg.db_name, cfg.timeout).await?;
    let database = client.database(&cfg.db_name);

    let outcome = rs485_bootstrap::run(&database, &cfg).await?;
    outcome.report.log_summary();

    if cfg.report_format == ReportFormat::Json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    }

    tracing::info!("Bootstrap of '{}' complete", cfg.db_name);
    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `BOOTSTRAP_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `BOOTSTRAP_LOG_LEVEL` env var
///
/// Called once at startup, after `.env` is loaded so that the variables above
/// may come from it.
fn init_tracing() {
    // ---
    let span_events = match env::var("BOOTSTRAP_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to BOOTSTRAP_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("BOOTSTRAP_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},mongodb=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
