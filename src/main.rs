//! Moodle Reminder main entry point
//!
//! This is the command-line interface for the Moodle Reminder assignment
//! scraper.

use chrono::Local;
use clap::Parser;
use moodle_reminder::assignment::filter_due_within;
use moodle_reminder::config::{load_config_from_env, load_config_with_hash, Config};
use moodle_reminder::fetch_assignments;
use moodle_reminder::output::{
    format_assignment, format_reminder_message, split_message, PUSH_TEXT_LIMIT,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Moodle Reminder: upcoming assignment deadlines from a Moodle portal
///
/// Signs into the portal through whatever login, SSO and two-factor pages it
/// serves, collects assignments from the calendar and the dashboard, and
/// prints a reminder for those due soon.
#[derive(Parser, Debug)]
#[command(name = "moodle-reminder")]
#[command(version = "1.0.0")]
#[command(about = "Upcoming assignment deadlines from a Moodle portal", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (environment variables only if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Remind about assignments due within this many days
    #[arg(long, value_name = "N")]
    days: Option<u32>,

    /// List every assignment found instead of the reminder
    #[arg(long, conflicts_with = "dry_run")]
    all: bool,

    /// Validate config and show what would be done without contacting the portal
    #[arg(long, conflicts_with = "all")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(days) = cli.days {
        config.reminder.days = days;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.all {
        handle_list_all(&config).await?;
    } else {
        handle_reminder(&config).await?;
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<Config, moodle_reminder::ConfigError> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, reading environment");
            load_config_from_env()
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("moodle_reminder=info,warn"),
            1 => EnvFilter::new("moodle_reminder=debug,info"),
            2 => EnvFilter::new("moodle_reminder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "(not set)"
    } else {
        "********"
    }
}

/// Handles the --dry-run mode: validates config and shows what would be done
fn handle_dry_run(config: &Config) {
    println!("=== Moodle Reminder Dry Run ===\n");

    println!("Portal:");
    println!("  Base URL: {}", config.portal.base_url);
    println!("  Username: {}", config.portal.username);
    println!("  Password: {}", mask(&config.portal.password));
    println!(
        "  TOTP secret: {}",
        mask(config.portal.totp_secret.as_deref().unwrap_or(""))
    );

    println!("\nHTTP:");
    println!("  Access interval: {}s", config.http.access_interval);
    println!("  Request timeout: {}s", config.http.request_timeout);
    println!("  User agent: {}", config.http.user_agent);

    println!("\nReminder:");
    println!("  Window: {} days", config.reminder.days);

    println!("\n✓ Configuration is valid");
}

/// Handles the --all mode: prints every assignment found
async fn handle_list_all(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let assignments = fetch_assignments(config).await?;
    tracing::info!("Assignments found: {}", assignments.len());

    for assignment in &assignments {
        println!("{}\n", format_assignment(assignment, &config.portal.base_url));
    }
    println!("Total: {}", assignments.len());

    Ok(())
}

/// Handles the main run: prints the reminder for assignments due soon
async fn handle_reminder(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let days = config.reminder.days;
    tracing::info!("Starting reminder run (due within {} days)", days);

    let assignments = match fetch_assignments(config).await {
        Ok(found) => found,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Assignments found: {}", assignments.len());

    let due_soon = filter_due_within(&assignments, days, Local::now().date_naive());
    tracing::info!("Due within {} days: {}", days, due_soon.len());

    let message = format_reminder_message(&due_soon, days, &config.portal.base_url);
    for chunk in split_message(&message, PUSH_TEXT_LIMIT) {
        println!("{}\n", chunk);
    }

    Ok(())
}
