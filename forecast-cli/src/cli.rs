use std::{sync::Arc, time::Duration};

use anyhow::{Result, anyhow, bail};
use chrono::Local;
use clap::{ArgAction, Args, Parser, Subcommand};
use forecast_core::{
    AppSettings, Config, LocationQuery, PendingFetch, ProviderId, Providers, TemperatureUnit,
    WeatherApp,
    provider::{default_provider_from_config, provider_from_config},
    suggest::should_fetch,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};

use crate::{picker::SuggestionPicker, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that shows weather.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Temperature unit: c | celsius | f | fahrenheit.
    #[arg(long, value_parser = parse_unit)]
    pub unit: Option<TemperatureUnit>,

    /// Provider to use instead of the configured default, "mock" or "weatherapi".
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a provider's credentials, or the home location with "home".
    Configure {
        /// "mock", "weatherapi" or "home".
        target: String,
    },

    /// Show current weather and the forecast for a location.
    Show {
        /// Place name or "lat,lon". Defaults to the configured default query.
        query: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show weather for the configured home location.
    Here {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// List location suggestions for a partial name.
    Suggest {
        partial: String,

        #[arg(long)]
        provider: Option<String>,
    },

    /// Keep prompting for locations until `:q`.
    Interactive {
        #[command(flatten)]
        view: ViewArgs,
    },
}

const INTERACTIVE_HELP: &str =
    "Enter a location, ?partial to pick from suggestions, :c / :f / :u (unit), :r (retry), :here, :q (quit)";

impl Cli {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { target } => configure(&target),
            Command::Show { query, view } => show(query, &view).await,
            Command::Here { view } => here(&view).await,
            Command::Suggest { partial, provider } => suggest(&partial, provider.as_deref()).await,
            Command::Interactive { view } => interactive(&view).await,
        }
    }
}

fn parse_unit(value: &str) -> Result<TemperatureUnit, String> {
    TemperatureUnit::try_from(value).map_err(|err| err.to_string())
}

fn select_providers(config: &Config, provider: Option<&str>) -> Result<Providers> {
    match provider {
        Some(name) => provider_from_config(ProviderId::try_from(name)?, config),
        None => default_provider_from_config(config),
    }
}

fn build_app(config: &Config, view: &ViewArgs) -> Result<(WeatherApp, Providers)> {
    let providers = select_providers(config, view.provider.as_deref())?;
    tracing::info!(provider = %providers.id, "weather provider selected");

    let mut settings = AppSettings::from(config);
    if let Some(unit) = view.unit {
        settings.unit = unit;
    }

    let app = WeatherApp::new(
        Arc::clone(&providers.weather),
        Arc::clone(&providers.geolocation),
        settings,
    );
    Ok((app, providers))
}

fn print_state(app: &WeatherApp) {
    print!("{}", render::render_state(app.state(), Local::now().naive_local()));
}

/// One-shot display: a failed fetch is reported as the command's error.
fn finish_one_shot(app: &WeatherApp) -> Result<()> {
    if let Some(failure) = app.state().error() {
        bail!("{}\n{}", failure.message, failure.detail);
    }
    print_state(app);
    Ok(())
}

async fn show(query: Option<String>, view: &ViewArgs) -> Result<()> {
    let config = Config::load()?;
    let (mut app, _) = build_app(&config, view)?;

    let fetch = match query {
        Some(query) => app.search(&query).ok_or_else(|| anyhow!("Location query is empty"))?,
        None => app.start(),
    };
    app.run(fetch).await;

    finish_one_shot(&app)
}

async fn here(view: &ViewArgs) -> Result<()> {
    let config = Config::load()?;
    let (mut app, _) = build_app(&config, view)?;

    match app.locate().await {
        Some(fetch) => {
            app.run(fetch).await;
            finish_one_shot(&app)
        }
        None => {
            print_state(&app);
            Ok(())
        }
    }
}

fn picker_for(config: &Config, providers: &Providers) -> SuggestionPicker {
    let delay = Duration::from_millis(config.suggestion_debounce_ms);
    SuggestionPicker::new(Arc::clone(&providers.suggestions), delay)
}

async fn suggest(partial: &str, provider: Option<&str>) -> Result<()> {
    if !should_fetch(partial) {
        println!("{}", render::short_input_hint());
        return Ok(());
    }

    let config = Config::load()?;
    let providers = select_providers(&config, provider)?;
    let mut picker = picker_for(&config, &providers);

    picker.lookup(partial).await;
    print!("{}", render::render_suggestions(picker.list().items()));
    Ok(())
}

fn configure(target: &str) -> Result<()> {
    let mut config = Config::load()?;

    if target.trim().eq_ignore_ascii_case("home") {
        configure_home(&mut config)?;
    } else {
        let id = ProviderId::try_from(target)?;

        if id.needs_api_key() {
            let api_key = Password::new(&format!("API key for {id}:"))
                .with_display_mode(PasswordDisplayMode::Masked)
                .without_confirmation()
                .prompt()?;

            let api_key = api_key.trim();
            if api_key.is_empty() {
                bail!("API key must not be empty");
            }
            config.upsert_provider_api_key(id, api_key.to_string());
        }

        config.set_default_provider(id);
        println!("Default provider set to {id}.");
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn configure_home(config: &mut Config) -> Result<()> {
    let current = config.home.map(|home| home.to_query());
    let mut prompt = Text::new("Home location (lat,lon):").with_help_message("e.g. 40.71,-74.01");
    if let Some(current) = current.as_deref() {
        prompt = prompt.with_default(current);
    }

    let input = prompt.prompt()?;
    match LocationQuery::parse(&input)? {
        LocationQuery::Coordinates(coords) => {
            config.set_home(coords);
            println!("Home location set to {}.", coords.to_query());
            Ok(())
        }
        LocationQuery::Place(name) => {
            bail!("'{name}' is not a coordinate pair. Use the form lat,lon.")
        }
    }
}

async fn interactive(view: &ViewArgs) -> Result<()> {
    let config = Config::load()?;
    let (mut app, providers) = build_app(&config, view)?;
    let mut picker = picker_for(&config, &providers);

    println!("{INTERACTIVE_HELP}\n");
    let first = app.start();
    refresh(&mut app, first).await;

    loop {
        let input = match Text::new(">").with_help_message(INTERACTIVE_HELP).prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        let fetch = match input.trim() {
            ":q" | ":quit" => break,
            ":c" => {
                app.set_unit(TemperatureUnit::Celsius);
                None
            }
            ":f" => {
                app.set_unit(TemperatureUnit::Fahrenheit);
                None
            }
            ":u" => {
                app.toggle_unit();
                None
            }
            ":r" => {
                let retry = app.retry();
                if retry.is_none() {
                    println!("Nothing to retry.");
                }
                retry
            }
            ":here" => app.locate().await,
            query => match query.strip_prefix('?') {
                Some(partial) => match picker.pick(partial).await? {
                    Some(name) => app.search(&name),
                    None => continue,
                },
                None => app.search(query),
            },
        };

        match fetch {
            Some(fetch) => refresh(&mut app, fetch).await,
            None => show_and_clear_notice(&mut app),
        }
    }

    Ok(())
}

async fn refresh(app: &mut WeatherApp, fetch: PendingFetch) {
    eprintln!("Loading weather for {}...", fetch.query());
    app.run(fetch).await;
    show_and_clear_notice(app);
}

fn show_and_clear_notice(app: &mut WeatherApp) {
    print_state(app);
    app.dismiss_notice();
}
