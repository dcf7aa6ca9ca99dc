use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::plot::PlotBuffer;

/// Application settings.
///
/// Read from `battery_tester.json` in the working directory, if present. Every
/// field is optional in the file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// How often the sensors are polled, in milliseconds.
    pub poll_interval_ms: u64,

    /// How often the battery percentage is appended to the log, in milliseconds.
    pub log_interval_ms: u64,

    pub log_path: PathBuf,

    /// Readings kept for the plot.
    pub plot_capacity: usize,

    /// Use the bundled fixture instead of the real sensors.
    pub dummy_sensors: bool,
}

impl Config {
    pub const FILE_NAME: &'static str = "battery_tester.json";

    /// Environment variable that forces dummy sensors when set to `1` or `true`.
    pub const DUMMY_ENV: &'static str = "BATTERY_TESTER_DUMMY";

    /// Loads [`Config::FILE_NAME`] from the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new(Self::FILE_NAME))?;

        if std::env::var(Self::DUMMY_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
            config.dummy_sensors = true;
        }

        Ok(config)
    }

    /// Loads the config from `path`, falling back to the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Using config {}", path.display());
                Ok(serde_json::from_str(&json)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn log_interval(&self) -> Duration {
        Duration::from_millis(self.log_interval_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            log_interval_ms: 15_000,
            log_path: PathBuf::from("battery_log.csv"),
            plot_capacity: PlotBuffer::DEFAULT_CAPACITY,
            dummy_sensors: false,
        }
    }
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config: Config = serde_json::from_str(r#"{ "poll_interval_ms": 2000 }"#).unwrap();

    assert_eq!(config.poll_interval(), Duration::from_secs(2));
    assert_eq!(config.log_interval(), Duration::from_secs(15));
    assert_eq!(config.log_path, PathBuf::from("battery_log.csv"));
    assert!(!config.dummy_sensors);
}

#[test]
fn test_missing_config_file() {
    let path = std::env::temp_dir().join("battery-tester-no-such-config.json");
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_malformed_config_file() {
    let path = std::env::temp_dir().join(format!("battery-tester-config-{}.json", std::process::id()));
    std::fs::write(&path, "{ poll_interval_ms: }").unwrap();

    assert!(matches!(Config::load_from(&path), Err(ConfigError::Json(_))));

    std::fs::remove_file(path).unwrap();
}
