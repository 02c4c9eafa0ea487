use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use weather_dashboard_core::{
    Completion, Config, Dashboard, FetchError, FetchOutcome, FetchStatus, FileStore, Hydration,
    PendingFetch, Persistence, WeatherProvider, provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-dashboard",
    version,
    about = "Current weather by city, with a short recent-search history"
)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Keep history and the last viewed city in memory for this run only.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Increase log verbosity (-v, -vv). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Defaults to the interactive dashboard.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the provider API key.
    Configure,

    /// Show weather for a city once, or for the last viewed city.
    Show {
        /// City name; may span several words.
        city: Vec<String>,
    },

    /// List recently searched cities, most recent first.
    History,

    /// Interactive search prompt.
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli {
            config: config_path,
            ephemeral,
            command,
            ..
        } = self;

        let config_path = match config_path {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&config_path)?;

        match command.unwrap_or(Command::Dashboard) {
            Command::Configure => configure(config, &config_path),
            Command::Show { city } => {
                let persistence = open_persistence(&config, ephemeral)?;
                let dash = open_dashboard(&config, persistence)?;
                show(dash, &city.join(" ")).await
            }
            Command::History => {
                let history = open_persistence(&config, ephemeral)?.load_history();
                print!("{}", render::history(&history));
                Ok(())
            }
            Command::Dashboard => {
                let persistence = open_persistence(&config, ephemeral)?;
                let dash = open_dashboard(&config, persistence)?;
                interactive(dash).await
            }
        }
    }
}

fn open_persistence(config: &Config, ephemeral: bool) -> anyhow::Result<Persistence> {
    if ephemeral {
        return Ok(Persistence::in_memory());
    }
    let dir = config.storage_dir()?;
    debug!(dir = %dir.display(), "using file storage");
    Ok(Persistence::new(Arc::new(FileStore::in_dir(&dir))))
}

fn open_dashboard(config: &Config, persistence: Persistence) -> anyhow::Result<Dashboard> {
    let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(config)?);
    Ok(Dashboard::new(provider, persistence))
}

fn configure(mut config: Config, path: &Path) -> anyhow::Result<()> {
    let key = Password::new("RapidAPI key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(key);
    if config.api_key.is_none() {
        bail!("No API key entered; configuration left unchanged.");
    }

    let host = Text::new("Provider host:")
        .with_default(&config.provider.host)
        .prompt()
        .context("Failed to read provider host")?;
    if !host.trim().is_empty() {
        config.provider.host = host.trim().to_string();
    }

    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(mut dash: Dashboard, city: &str) -> anyhow::Result<()> {
    if city.trim().is_empty() {
        if dash.resume().await == Hydration::NoPriorSession {
            bail!("No city given and no previously viewed city.");
        }
    } else {
        dash.search(city).await;
    }

    let state = dash.state();
    if state.status() == FetchStatus::Failed {
        let message = state.error().unwrap_or("Failed to fetch weather");
        return Err(anyhow!("{message}"));
    }
    print!("{}", render::dashboard(state));
    Ok(())
}

async fn interactive(mut dash: Dashboard) -> anyhow::Result<()> {
    match dash.hydrate() {
        Hydration::Resume(city) => {
            run_search(&mut dash, &city).await;
            print!("{}", render::dashboard(dash.state()));
        }
        Hydration::NoPriorSession => {
            println!("{}", render::welcome());
            print!("{}", render::history(dash.state().history()));
        }
    }

    while let Some(input) = prompt_city().await? {
        let input = input.trim();
        if matches!(input, ":q" | "quit" | "exit") {
            break;
        }

        // A new query replaces whatever failure was on screen.
        dash.dismiss_error();
        if input.is_empty() {
            continue;
        }

        run_search(&mut dash, input).await;
        print!("{}", render::dashboard(dash.state()));
    }

    Ok(())
}

async fn run_search(dash: &mut Dashboard, text: &str) {
    let Some(pending) = dash.submit_search(text) else {
        return;
    };
    println!("{}", render::loading(&pending.city));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _task = dash.orchestrator().spawn(pending.clone(), tx);
    let completion = receive(&mut rx, pending).await;
    dash.apply(completion);
}

/// Wait for the fetch task's result. A task that ends without sending one
/// still settles the request as a failure.
async fn receive(
    rx: &mut mpsc::UnboundedReceiver<Completion>,
    pending: PendingFetch,
) -> Completion {
    if let Some(completion) = rx.recv().await {
        return completion;
    }

    warn!(city = %pending.city, "fetch task ended without a result");
    Completion {
        id: pending.id,
        city: pending.city,
        outcome: FetchOutcome::Failure(FetchError::Unexpected("fetch task was lost".into())),
    }
}

async fn prompt_city() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Text::new("City:")
            .with_placeholder("Enter city name... (:q to quit)")
            .prompt()
    })
    .await?;

    match answer {
        Ok(text) => Ok(Some(text)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use weather_dashboard_core::error::MSG_UNEXPECTED;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_joins_multi_word_city() {
        let args = ["weather-dashboard", "show", "New", "York"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Some(Command::Show { city }) => assert_eq!(city.join(" "), "New York"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let args = ["weather-dashboard", "-vv", "--ephemeral"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.ephemeral);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = ["weather-dashboard", "history", "--config", "/tmp/c.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.command, Some(Command::History)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn ephemeral_persistence_starts_empty() {
        let persistence = open_persistence(&Config::default(), true).unwrap();
        assert!(persistence.load_history().is_empty());
    }

    #[test]
    fn dashboard_opens_with_api_key() {
        let mut config = Config::default();
        config.set_api_key("KEY".into());
        assert!(open_dashboard(&config, Persistence::in_memory()).is_ok());
    }

    #[tokio::test]
    async fn lost_fetch_task_settles_as_failure() {
        let mut config = Config::default();
        config.set_api_key("KEY".into());
        let mut dash = open_dashboard(&config, Persistence::in_memory()).unwrap();
        let pending = dash.submit_search("Paris").unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(tx);

        let completion = receive(&mut rx, pending.clone()).await;

        assert_eq!(completion.id, pending.id);
        assert!(dash.apply(completion));
        assert_eq!(dash.state().status(), FetchStatus::Failed);
        assert_eq!(dash.state().error(), Some(MSG_UNEXPECTED));
    }
}
