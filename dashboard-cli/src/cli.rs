use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};

use dashboard_core::{
    Config, Dashboard, DashboardContext, DistanceUnit, Panel, ProviderId, SearchOrigin,
    SearchOutcome, TemperatureUnit, ViewState,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Weather, astronomy, marine & nearby-location dashboard")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider ("weatherapi" or "zipcodestack").
    Configure {
        provider: String,
    },

    /// Run one search and print the dashboard.
    Show {
        /// City name, postal code or "lat,lon".
        query: String,

        #[arg(long)]
        fahrenheit: bool,

        /// Use kilometres instead of miles.
        #[arg(long)]
        km: bool,

        /// Nearby-search radius, clamped to 1..=100.
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Detect your location, then keep searching from a prompt.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { query, fahrenheit, km, radius } => {
                show(&query, fahrenheit, km, radius).await
            }
            Command::Interactive => interactive().await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load_file()?;

    if config.is_provider_configured(id) {
        println!("{id} already has an API key; entering a new one replaces it.");
    }

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key.to_string());
    config.save()?;

    println!("Saved {id} credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    let ctx = DashboardContext::from_config(config).context("Failed to build HTTP client")?;
    let state = ViewState::new(config.dashboard.units(), config.dashboard.search_radius);
    Ok(Dashboard::new(ctx, state))
}

async fn show(query: &str, fahrenheit: bool, km: bool, radius: Option<u32>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let dashboard = build_dashboard(&config)?;

    dashboard.update(|state| {
        if fahrenheit {
            state.set_temperature_unit(TemperatureUnit::Fahrenheit);
        }
        if km {
            state.set_distance_unit(DistanceUnit::Kilometers);
        }
        if let Some(radius) = radius {
            state.set_search_radius(radius);
        }
    });

    dashboard.icons().warm().await;

    match dashboard.search(query, SearchOrigin::Manual).await {
        SearchOutcome::Failed(err) => {
            let shown = dashboard.view(|state| state.error().map(str::to_string));
            Err(anyhow!(err).context(shown.unwrap_or_else(|| "Search failed".to_string())))
        }
        _ => {
            print!("{}", dashboard.view(|state| render::dashboard(state, dashboard.icons())));
            Ok(())
        }
    }
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let dashboard = build_dashboard(&config)?;

    let outcome = dashboard.initial_load().await;
    tracing::debug!(?outcome, "initial load finished");
    print!("{}", dashboard.view(|state| render::dashboard(state, dashboard.icons())));

    loop {
        let input = match Text::new("Search:")
            .with_help_message("location, or :units c|f  :distance mi|km  :radius N  :toggle <panel>  :nearby N  :history N  :quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read input"),
        };

        let action = match PromptAction::parse(&input) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let query = match action {
            PromptAction::Quit => break,
            PromptAction::Search(query) => Some(query),
            PromptAction::Nearby(n) => {
                let code = dashboard.view(|s| s.nearby().get(n - 1).map(|loc| loc.code.clone()));
                if code.is_none() {
                    println!("No nearby location #{n}");
                }
                code
            }
            PromptAction::History(n) => {
                let query = dashboard.view(|s| s.history_entry(n - 1).map(|e| e.query.clone()));
                if query.is_none() {
                    println!("No history entry #{n}");
                }
                query
            }
            PromptAction::Units(unit) => {
                dashboard.update(|s| s.set_temperature_unit(unit));
                None
            }
            PromptAction::Distance(unit) => {
                dashboard.update(|s| s.set_distance_unit(unit));
                None
            }
            PromptAction::Radius(radius) => {
                let stored = dashboard.update(|s| s.set_search_radius(radius));
                println!("Nearby radius is now {stored}");
                None
            }
            PromptAction::Toggle(panel) => {
                let visible = dashboard.update(|s| s.toggle_panel(panel));
                println!("{panel} panel {}", if visible { "shown" } else { "hidden" });
                None
            }
        };

        if let Some(query) = query {
            dashboard.search(&query, SearchOrigin::Manual).await;
        }

        print!("{}", dashboard.view(|state| render::dashboard(state, dashboard.icons())));
    }

    Ok(())
}

/// One line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq)]
enum PromptAction {
    Search(String),
    Units(TemperatureUnit),
    Distance(DistanceUnit),
    Radius(u32),
    Toggle(Panel),
    /// 1-based index into the nearby list.
    Nearby(usize),
    /// 1-based index into the history, newest first.
    History(usize),
    Quit,
}

impl PromptAction {
    /// Blank input yields `Ok(None)`.
    fn parse(input: &str) -> anyhow::Result<Option<Self>> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let Some(command) = input.strip_prefix(':') else {
            return Ok(Some(PromptAction::Search(input.to_string())));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        let need = |what: &str| arg.ok_or_else(|| anyhow!(":{name} needs {what}"));

        let action = match name {
            "quit" | "q" => PromptAction::Quit,
            "units" => PromptAction::Units(need("c or f")?.parse()?),
            "distance" => PromptAction::Distance(need("mi or km")?.parse()?),
            "radius" => PromptAction::Radius(
                need("a number")?.parse().context("Radius must be a whole number")?,
            ),
            "toggle" => PromptAction::Toggle(need("a panel name")?.parse()?),
            "nearby" => PromptAction::Nearby(index(need("an entry number")?)?),
            "history" => PromptAction::History(index(need("an entry number")?)?),
            other => bail!("Unknown command :{other}"),
        };
        Ok(Some(action))
    }
}

fn index(raw: &str) -> anyhow::Result<usize> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => bail!("Entry numbers start at 1"),
    }
}
