//! Sensors, battery log, CPU load and plot data of the battery life tester.
//!
//! Nothing in here depends on the UI, so the whole crate can be tested headless.

pub mod config;
pub mod display;
pub mod error;
pub mod load;
pub mod logger;
pub mod monitor;
pub mod plot;
pub mod sensor;

pub use config::Config;
pub use error::{ConfigError, LoggerError, SensorError};
pub use load::{available_cores, clamp_cores, LoadGenerator, LoadState};
pub use logger::CsvLogger;
pub use monitor::{LogOutcome, Monitor};
pub use plot::PlotBuffer;
