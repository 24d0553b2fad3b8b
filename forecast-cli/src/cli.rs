use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use forecast_core::{Config, DaySummary, ForecastClient, summarize};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "forecast",
    version,
    about = "Per-day forecast summaries with rain, cold and heat alerts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for the forecast provider.
    Configure,

    /// Show per-day forecast summaries for a location.
    Show {
        /// City name or location query, e.g. "Curitiba".
        location: String,

        /// Print raw JSON instead of the formatted lines.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, json } => show(&location, json).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(location: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let client = ForecastClient::new(config.api_key);

    let payload = client.fetch(location).await?;

    let Some(days) = summarize(&payload) else {
        bail!("Upstream returned an unusable forecast payload");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
    } else {
        for day in &days {
            print_day(day);
        }
    }

    Ok(())
}

fn print_day(day: &DaySummary) {
    let range = match (day.temp_min, day.temp_max) {
        (Some(min), Some(max)) => format!("{min:.1}..{max:.1} C"),
        _ => "n/a".to_string(),
    };

    let condition = day.condition.as_deref().unwrap_or("unknown");

    let mut alerts = Vec::new();
    if day.alert_cold {
        alerts.push("cold");
    }
    if day.alert_heat {
        alerts.push("heat");
    }
    if day.alert_rain {
        alerts.push("rain");
    }

    if alerts.is_empty() {
        println!("{}  {:<14} {}", day.day, range, condition);
    } else {
        println!(
            "{}  {:<14} {} [alerts: {}]",
            day.day,
            range,
            condition,
            alerts.join(", ")
        );
    }
}
