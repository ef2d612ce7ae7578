use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, path::PathBuf};

/// Where the crypto feed lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub base_url: String,
    pub path: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://raw.githubusercontent.com/".to_string(),
            path: "atilsamancioglu/K21-JSONDataSet/master/crypto.json".to_string(),
        }
    }
}

/// Unit system requested from the weather feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Standard => "K",
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OpenWeather settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub units: Units,
    /// City pre-filled on the weather screen.
    pub default_city: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/".to_string(),
            api_key: None,
            units: Units::default(),
            default_city: "Edirne".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [crypto]
/// base_url = "https://raw.githubusercontent.com/"
///
/// [weather]
/// api_key = "..."
/// units = "metric"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crypto: CryptoConfig,
    pub weather: WeatherConfig,
}

impl Config {
    /// Load config from the platform location, or defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "refrodit", "refrodit")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn crypto_feed_url(&self) -> String {
        join_url(&self.crypto.base_url, &self.crypto.path)
    }

    pub fn weather_endpoint_url(&self) -> String {
        join_url(&self.weather.base_url, "data/2.5/weather")
    }

    /// Returns the OpenWeather key, or an error telling the user how to set one.
    pub fn weather_api_key(&self) -> Result<&str> {
        self.weather
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `refrodit configure` and enter your API key."
                )
            })
    }

    pub fn set_weather_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_feeds() {
        let cfg = Config::default();
        assert_eq!(
            cfg.crypto_feed_url(),
            "https://raw.githubusercontent.com/atilsamancioglu/K21-JSONDataSet/master/crypto.json"
        );
        assert_eq!(
            cfg.weather_endpoint_url(),
            "https://api.openweathermap.org/data/2.5/weather"
        );
        assert_eq!(cfg.weather.units, Units::Metric);
        assert_eq!(cfg.weather.default_city, "Edirne");
    }

    #[test]
    fn weather_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.weather_api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `refrodit configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_weather_api_key("   ".into());
        assert!(cfg.weather_api_key().is_err());

        cfg.set_weather_api_key("KEY".into());
        assert_eq!(cfg.weather_api_key().unwrap(), "KEY");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [weather]
            api_key = "abc"
            units = "imperial"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(cfg.weather.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.weather.units, Units::Imperial);
        assert_eq!(cfg.weather.default_city, "Edirne");
        assert_eq!(cfg.crypto, CryptoConfig::default());
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("http://h/", "/a/b.json"), "http://h/a/b.json");
        assert_eq!(join_url("http://h", "a/b.json"), "http://h/a/b.json");
    }

    #[test]
    fn save_and_load_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let mut cfg = Config::default();
        cfg.set_weather_api_key("KEY".into());
        cfg.weather.default_city = "Istanbul".into();
        cfg.save_to(&path).expect("save should succeed");

        let loaded = Config::load_from(&path).expect("load should succeed");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn unreadable_toml_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "weather = 5").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
