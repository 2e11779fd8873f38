use crate::calendar;
use crate::config::{Config, expand_home};
use crate::db::Database;
use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

pub fn run_onboarding() -> Result<Config> {
    println!("──────────────────────────────────────────");
    println!("  Welcome to habitd onboarding.");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();
    let defaults = Config::default();

    println!("\n[1/3] Database location");
    let db_path_input: String = Input::with_theme(&theme)
        .with_prompt("  Where should the habit database live?")
        .default(defaults.db_path.display().to_string())
        .interact_text()
        .context("Failed to read database path")?;

    let db_path = expand_home(&db_path_input);
    println!("  ✓ {}", db_path.display());

    println!("\n[2/3] API port");
    let api_port_input: String = Input::with_theme(&theme)
        .with_prompt("  Port for the HTTP API")
        .default(defaults.api_port.to_string())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            input
                .parse::<u16>()
                .map(|_| ())
                .map_err(|_| "Use a number between 1 and 65535")
        })
        .interact_text()
        .context("Failed to read API port")?;
    let api_port = api_port_input.parse::<u16>().context("Invalid API port")?;
    println!("  ✓ API will listen on port {api_port}");

    let config = Config { db_path, api_port };
    config.ensure_bootstrap_files()?;
    config.save()?;

    println!("\n[3/3] First habit");
    let create_first = Confirm::with_theme(&theme)
        .with_prompt("  Create your first habit now?")
        .default(true)
        .interact()
        .context("Failed to read habit prompt input")?;

    if create_first {
        let title: String = Input::with_theme(&theme)
            .with_prompt("  Habit title")
            .interact_text()
            .context("Failed to read habit title")?;

        let week_days_input: String = Input::with_theme(&theme)
            .with_prompt("  Scheduled weekdays, 0-6 with Sunday = 0 (example: 1,3,5)")
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                parse_week_days(input)
                    .map(|_| ())
                    .map_err(|_| "Use comma-separated numbers between 0 and 6")
            })
            .interact_text()
            .context("Failed to read habit weekdays")?;
        let week_days = parse_week_days(&week_days_input)?;

        let mut database = Database::open(&config.db_path)?;
        let habit = database.create_habit(title.trim(), &week_days, calendar::today())?;
        println!("  ✓ Created habit #{} ({})", habit.id, habit.title);
    } else {
        let _ = Database::open(&config.db_path)?;
        println!("  ✓ Skipped");
    }

    println!("\n──────────────────────────────────────────");
    println!("  Onboarding complete!");
    println!("  Run `habitd serve` to start the API.");
    println!("  Run `habitd status` to check current state.");
    println!("──────────────────────────────────────────");

    Ok(config)
}

fn parse_week_days(input: &str) -> Result<Vec<u8>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let week_day = part
                .parse::<u8>()
                .with_context(|| format!("Invalid weekday: {part}"))?;
            if week_day > 6 {
                bail!("week_day out of range 0-6: {week_day}");
            }

            Ok(week_day)
        })
        .collect()
}
