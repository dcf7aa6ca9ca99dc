use thiserror::Error;

/// Errors that can occur when querying a single sensor.
///
/// None of these are fatal: the reader turns them into
/// [`Sensor::Unavailable`](crate::sensor::Sensor::Unavailable) for the current tick.
#[derive(Error, Debug)]
pub enum SensorError {
    /// No such sensor was found on this machine.
    #[error("sensor not available")]
    NotAvailable,

    /// The sensor cannot be queried on this platform.
    #[error("sensor not supported on this platform")]
    NotSupported,

    /// Reading the sensor's backing file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The sensor returned something we could not make sense of.
    #[error("unexpected sensor value: {0}")]
    Parse(String),
}

/// Errors that can occur when appending to the battery log.
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Opening or writing the log file failed (disk full, permission denied, ...).
    #[error("could not write battery log: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}
