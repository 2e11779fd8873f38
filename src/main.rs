mod api;
mod calendar;
mod cli;
mod config;
mod db;
mod stats;

use crate::cli::onboard::run_onboarding;
use crate::cli::{Cli, Commands, ConfigCommands};
use crate::config::Config;
use crate::db::Database;
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Onboard => {
            let _ = run_onboarding()?;
            Ok(())
        }
        Commands::Config { command } => handle_config_command(command),
        Commands::Status => handle_status(),
        Commands::Doctor => handle_doctor(),
        Commands::Serve => {
            let config = load_config()?;
            run_serve(config).await
        }
        Commands::Streaks => handle_streaks(),
        Commands::Summary => handle_summary(),
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.ensure_bootstrap_files()?;
            config.save()?;

            println!("Config saved: {key} = {value}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_status() -> Result<()> {
    let config = load_config()?;
    let database = Database::open(&config.db_path)?;

    println!("habitd status");
    println!("- habits: {}", database.habit_count()?);
    println!("- tracked_days: {}", database.day_count()?);
    println!("- completions: {}", database.completion_count()?);
    println!(
        "- latest_completion: {}",
        database
            .latest_completion_date()?
            .map(calendar::format_day)
            .unwrap_or_else(|| "none".to_string())
    );
    println!("- api_port: {}", config.api_port);

    Ok(())
}

fn handle_doctor() -> Result<()> {
    let config_path = Config::config_path()?;
    let mut issues = Vec::new();

    if config_path.exists() {
        println!("[OK] config.json found: {}", config_path.display());
    } else {
        println!("[WARN] config.json not found: {}", config_path.display());
        issues.push("config missing".to_string());
    }

    let config = load_or_default_config()?;

    match Database::open(&config.db_path) {
        Ok(_) => println!("[OK] SQLite reachable: {}", config.db_path.display()),
        Err(error) => {
            println!("[WARN] SQLite check failed: {error}");
            issues.push("db unreachable".to_string());
        }
    }

    if config.api_port == 0 {
        println!("[WARN] api_port is 0; the server would bind a random port");
        issues.push("api_port unset".to_string());
    } else {
        println!("[OK] api_port: {}", config.api_port);
    }

    if issues.is_empty() {
        println!("doctor result: no issues");
    } else {
        println!("doctor result: {} warning(s)", issues.len());
    }

    Ok(())
}

fn handle_streaks() -> Result<()> {
    let config = load_config()?;
    let database = Database::open(&config.db_path)?;
    let rows = stats::habit_streaks(&database)?;

    if rows.is_empty() {
        println!("No habits yet. Run `habitd onboard` or POST /api/v1/habits.");
        return Ok(());
    }

    for row in rows {
        println!(
            "#{:<4} {:<32} {:>3} day(s)",
            row.id, row.title, row.count_consecutive
        );
    }

    Ok(())
}

fn handle_summary() -> Result<()> {
    let config = load_config()?;
    let database = Database::open(&config.db_path)?;
    let mut rows = stats::daily_summary(&database)?;

    if rows.is_empty() {
        println!("No tracked days yet.");
        return Ok(());
    }

    rows.sort_by_key(|row| row.date);
    for row in &rows {
        println!(
            "{}  {:>2.0} of {:>2.0} habits completed",
            calendar::format_day(row.date),
            row.completed,
            row.amount
        );
    }

    Ok(())
}

async fn run_serve(config: Config) -> Result<()> {
    config.ensure_bootstrap_files()?;
    let _ = Database::open(&config.db_path)?;

    let shared_config = Arc::new(config);

    info!(utc_offset = %Local::now().format("%:z"), "habitd service starting");

    tokio::select! {
        api_result = api::run_server(Arc::clone(&shared_config)) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn load_or_default_config() -> Result<Config> {
    Config::load().or_else(|_| {
        let config = Config::default();
        config.ensure_bootstrap_files()?;
        config.save()?;
        Ok(config)
    })
}

fn load_config() -> Result<Config> {
    Config::load().with_context(|| "Config file not found. Run `habitd onboard` first.".to_string())
}
