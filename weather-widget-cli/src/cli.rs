use std::{io::IsTerminal, sync::Arc};

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tracing::debug;
use weather_widget_core::{Config, FixedLocation, ProviderId, Query, WorkflowController};

use crate::{card::RenderOptions, screen::Screen};

const HERE: &str = "@here";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Weather widget for the terminal")]
pub struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the default city, then keep prompting for more lookups.
    Interactive,

    /// Show weather once and exit.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        /// Use the current location instead of a city.
        #[arg(long, conflicts_with = "city")]
        here: bool,

        /// Latitude to treat as the current location.
        #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to treat as the current location.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Configure a provider (and its API key, if it needs one).
    Configure {
        /// Provider short name: "mock" or "openweather".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let opts = RenderOptions {
            color: !self.no_color && std::io::stdout().is_terminal(),
        };

        match self.command.unwrap_or(Command::Interactive) {
            Command::Interactive => interactive(&Config::load()?, opts).await,
            Command::Show { city, here, lat, lon } => {
                let config = Config::load()?;
                let mut controller = WorkflowController::from_config(&config)?;

                let query = match (city, lat.zip(lon)) {
                    (_, Some((lat, lon))) => {
                        controller =
                            controller.with_locator(Arc::new(FixedLocation::at(lat, lon)));
                        Query::CurrentLocation
                    }
                    (Some(city), None) => Query::City(city),
                    (None, None) if here => Query::CurrentLocation,
                    (None, None) => Query::City(controller.default_city().to_string()),
                };

                show(&controller, query, opts).await
            }
            Command::Configure { provider } => configure(&provider),
        }
    }
}

async fn show(
    controller: &WorkflowController,
    query: Query,
    opts: RenderOptions,
) -> anyhow::Result<()> {
    let ticket = match query {
        Query::City(city) => controller
            .submit_city(&city)
            .ok_or_else(|| anyhow!("City name must not be empty"))?,
        Query::CurrentLocation => controller.submit_current_location(),
    };

    let mut screen = Screen::new(opts);
    screen.show(&controller.state())?;
    controller.run(ticket).await;

    let state = controller.state();
    if let Some(message) = state.error_message() {
        screen.clear()?;
        bail!("{message}");
    }
    screen.show(&state)?;
    Ok(())
}

async fn interactive(config: &Config, opts: RenderOptions) -> anyhow::Result<()> {
    let controller = WorkflowController::from_config(config)?;
    let mut screen = Screen::new(opts);

    screen.present(&controller, controller.activate()).await?;

    while let Some(input) = read_input().await? {
        match input.trim() {
            ":q" | ":quit" => break,
            HERE => {
                screen.present(&controller, controller.use_current_location()).await?;
            }
            city => {
                if screen.present(&controller, controller.search_city(city)).await?.is_none() {
                    debug!("blank input, nothing submitted");
                }
            }
        }
    }

    Ok(())
}

/// Prompt for the next city. `None` when the user cancels.
async fn read_input() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Text::new("City:")
            .with_placeholder("Enter city name...")
            .with_help_message("@here uses your current location, :q quits")
            .prompt()
    })
    .await
    .context("Input prompt task failed")?;

    match answer {
        Ok(text) => Ok(Some(text)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read input"),
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        let key = Password::new(&format!("API key for {id}:"))
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;

        let key = key.trim();
        if key.is_empty() {
            bail!("API key must not be empty");
        }
        config.upsert_provider_api_key(id, key.to_string());
    }

    let current_city = config.default_city().to_string();
    let city = Text::new("Default city:")
        .with_default(&current_city)
        .prompt()
        .context("Failed to read default city")?;
    config.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());

    config.set_default_provider(id);
    config.save()?;

    println!(
        "Saved {id} as default provider in {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: RenderOptions = RenderOptions { color: false };

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weather-widget"]).expect("parses");
        assert!(cli.command.is_none());
        assert!(!cli.no_color);
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "weather-widget",
            "show",
            "--lat",
            "-33.87",
            "--lon",
            "151.21",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Show { lat, lon, city, .. }) => {
                assert_eq!(lat, Some(-33.87));
                assert_eq!(lon, Some(151.21));
                assert!(city.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weather-widget", "show", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn here_conflicts_with_city() {
        assert!(Cli::try_parse_from(["weather-widget", "show", "Paris", "--here"]).is_err());
    }

    #[test]
    fn no_color_is_global() {
        let cli = Cli::try_parse_from(["weather-widget", "show", "Paris", "--no-color"])
            .expect("parses");
        assert!(cli.no_color);
    }

    #[tokio::test]
    async fn show_reports_not_found_as_error() {
        let mut config = Config::default();
        config.mock.latency_ms = 0;
        let controller = WorkflowController::from_config(&config).expect("mock");

        let err = show(&controller, Query::City("Errorville".into()), PLAIN)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "City not found");
    }

    #[tokio::test]
    async fn show_rejects_blank_city() {
        let mut config = Config::default();
        config.mock.latency_ms = 0;
        let controller = WorkflowController::from_config(&config).expect("mock");

        let err = show(&controller, Query::City("  ".into()), PLAIN)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }
}
