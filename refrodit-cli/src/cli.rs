use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use refrodit_core::{
    Config, CryptoScreen, Delivery, WeatherFeed, WeatherScreen, WeatherView,
    feed::{crypto_feed_from_config, weather_feed_from_config},
    screen::CryptoPhase,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "refrodit", version, about = "Crypto prices and weather lookup")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// List crypto prices.
    Crypto {
        /// Only show currencies containing this text (case-insensitive).
        #[arg(long, short)]
        search: Option<String>,

        /// Keep prompting for new search queries until cancelled.
        #[arg(long, short)]
        interactive: bool,
    },

    /// Show current weather for a city.
    Weather {
        /// City name; falls back to the configured default city.
        city: Option<String>,

        /// Keep prompting for another city until cancelled.
        #[arg(long, short)]
        interactive: bool,
    },
}

/// How waiting for a fetch ended.
#[derive(Debug, PartialEq, Eq)]
enum Wait {
    Settled,
    Interrupted,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli { config, command } = self;

        let path = match config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&path)?;

        match command {
            Command::Configure => configure(config, &path),
            Command::Crypto { search, interactive } => {
                show_crypto(&config, search, interactive).await
            }
            Command::Weather { city, interactive } => {
                show_weather(&config, city, interactive).await
            }
        }
    }
}

fn configure(mut config: Config, path: &Path) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let default_city = config.weather.default_city.clone();
    let city = Text::new("Default city:")
        .with_default(&default_city)
        .prompt()
        .context("Failed to read default city")?;

    config.set_weather_api_key(api_key.trim().to_string());
    config.weather.default_city = city.trim().to_string();
    config.save_to(path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show_crypto(config: &Config, search: Option<String>, interactive: bool) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut screen = CryptoScreen::new();
    screen.attach(crypto_feed_from_config(config), tx);
    eprintln!("{}", render::crypto(&screen.view(), Local::now()));

    if wait_for(&mut rx, |delivery| screen.apply(delivery)).await? == Wait::Interrupted {
        screen.detach();
        eprintln!("Cancelled.");
        return Ok(());
    }
    let fetched_at = Local::now();

    if let Some(query) = search {
        screen.set_query(query);
    }
    println!("{}", render::crypto(&screen.view(), fetched_at));

    if interactive && matches!(screen.phase(), CryptoPhase::Loaded(_)) {
        loop {
            let query = match Text::new("Search:").with_initial_value(screen.query()).prompt() {
                Ok(query) => query,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
                Err(err) => return Err(err).context("Failed to read search query"),
            };
            screen.set_query(query);
            println!("{}", render::crypto(&screen.view(), fetched_at));
        }
    }

    screen.detach();
    Ok(())
}

async fn show_weather(config: &Config, city: Option<String>, interactive: bool) -> Result<()> {
    let feed = weather_feed_from_config(config)?;
    let units = config.weather.units;

    let mut screen = WeatherScreen::new(config.weather.default_city.clone());
    if let Some(city) = city {
        screen.set_city(city);
    }

    loop {
        eprintln!("{}", render::weather(&WeatherView::Loading, units, Local::now()));
        if lookup(&mut screen, &feed).await? == Wait::Interrupted {
            eprintln!("Cancelled.");
            return Ok(());
        }
        println!("{}", render::weather(&screen.view(), units, Local::now()));

        if !interactive {
            break;
        }

        let city = match Text::new("City:").with_initial_value(screen.city()).prompt() {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city"),
        };
        screen.set_city(city.trim());
    }

    screen.detach();
    Ok(())
}

/// Submits the screen's current city and waits for the outcome on this task.
/// An interrupted lookup leaves the screen detached.
async fn lookup(screen: &mut WeatherScreen, feed: &Arc<dyn WeatherFeed>) -> Result<Wait> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    screen.submit(Arc::clone(feed), tx);

    let wait = wait_for(&mut rx, |delivery| screen.apply(delivery)).await?;
    if wait == Wait::Interrupted {
        screen.detach();
    }
    Ok(wait)
}

/// Drains deliveries on the rendering task until `apply` accepts one or the
/// user hits Ctrl-C.
async fn wait_for<T>(
    rx: &mut UnboundedReceiver<Delivery<T>>,
    mut apply: impl FnMut(Delivery<T>) -> bool,
) -> Result<Wait> {
    loop {
        tokio::select! {
            delivery = rx.recv() => match delivery {
                Some(delivery) => {
                    if apply(delivery) {
                        return Ok(Wait::Settled);
                    }
                }
                None => bail!("Fetch ended without delivering a result"),
            },
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted while waiting for fetch");
                return Ok(Wait::Interrupted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use refrodit_core::{FetchError, FetchOutcome, WeatherReading, screen::WeatherPhase};

    /// Knows every city except Atlantis.
    #[derive(Debug)]
    struct CityFeed;

    #[async_trait]
    impl WeatherFeed for CityFeed {
        async fn fetch_weather(&self, city: &str) -> Result<WeatherReading, FetchError> {
            if city == "Atlantis" {
                return Err(FetchError::Decode(serde_json::from_str::<u8>("").unwrap_err()));
            }
            Ok(WeatherReading {
                city_name: city.to_string(),
                temperature: 9.5,
                humidity: 81,
                description: "overcast clouds".to_string(),
            })
        }
    }

    #[test]
    fn parses_crypto_flags() {
        let cli = Cli::try_parse_from(["refrodit", "crypto", "--search", "btc", "-i"]).unwrap();
        match cli.command {
            Command::Crypto { search, interactive } => {
                assert_eq!(search.as_deref(), Some("btc"));
                assert!(interactive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_weather_with_global_config() {
        let cli =
            Cli::try_parse_from(["refrodit", "weather", "Istanbul", "--config", "/tmp/c.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(
            cli.command,
            Command::Weather { city: Some(ref c), interactive: false } if c == "Istanbul"
        ));
    }

    #[test]
    fn parses_interactive_weather() {
        let cli = Cli::try_parse_from(["refrodit", "weather", "-i"]).unwrap();
        assert!(matches!(cli.command, Command::Weather { city: None, interactive: true }));
    }

    #[tokio::test]
    async fn lookup_resubmits_on_same_screen_after_error() {
        let feed: Arc<dyn WeatherFeed> = Arc::new(CityFeed);
        let mut screen = WeatherScreen::new("Atlantis");

        assert_eq!(lookup(&mut screen, &feed).await.unwrap(), Wait::Settled);
        assert_eq!(screen.view(), WeatherView::Error("empty or malformed response"));

        screen.set_city("Edirne");
        assert_eq!(lookup(&mut screen, &feed).await.unwrap(), Wait::Settled);
        assert!(matches!(
            screen.phase(),
            WeatherPhase::Loaded(reading) if reading.city_name == "Edirne"
        ));

        screen.set_city("Atlantis");
        assert_eq!(lookup(&mut screen, &feed).await.unwrap(), Wait::Settled);
        assert!(matches!(screen.phase(), WeatherPhase::Error(_)));
    }

    #[tokio::test]
    async fn wait_for_skips_rejected_deliveries() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(Delivery { generation: 1, outcome: FetchOutcome::Success(1u8) }).unwrap();
        tx.send(Delivery { generation: 2, outcome: FetchOutcome::Success(2u8) }).unwrap();

        let mut applied = Vec::new();
        let wait = wait_for(&mut rx, |d| {
            applied.push(d.generation);
            d.generation == 2
        })
        .await
        .unwrap();

        assert_eq!(wait, Wait::Settled);
        assert_eq!(applied, vec![1, 2]);
    }

    #[tokio::test]
    async fn wait_for_errors_when_channel_closes() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Delivery<u8>>();
        drop(tx);

        let err = wait_for(&mut rx, |_| true).await.unwrap_err();
        assert!(err.to_string().contains("without delivering"));
    }
}
