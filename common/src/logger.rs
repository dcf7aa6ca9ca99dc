//! Append-only battery log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::error::LoggerError;

/// Appends `(time, battery percentage)` rows to a CSV file.
///
/// Rows end in `\r\n`.
///
/// The file is opened for every row, so a failed write (disk full, file removed,
/// permission changed) only affects that row and the next append tries again.
pub struct CsvLogger {
    path: PathBuf,
}

impl CsvLogger {
    pub const HEADER: &'static str = "Time,Battery Percentage";
    const TIME_FORMAT: &'static str = "%H:%M:%S";
    const LINE_END: &'static str = "\r\n";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the log file with its header row, unless it already has rows.
    pub fn ensure_header(&self) -> Result<(), LoggerError> {
        self.open().map(drop)
    }

    /// Appends one row.
    pub fn append(&self, timestamp: DateTime<Local>, battery_percent: f32) -> Result<(), LoggerError> {
        let mut file = self.open()?;
        write!(file, "{}{}", Self::row(timestamp, battery_percent), Self::LINE_END)?;
        Ok(())
    }

    /// Opens the file for appending. An empty file gets the header first.
    fn open(&self) -> Result<File, LoggerError> {
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;

        if file.metadata()?.len() == 0 {
            write!(file, "{}{}", Self::HEADER, Self::LINE_END)?;
            log::info!("Created battery log {}", self.path.display());
        }

        Ok(file)
    }

    fn row(timestamp: DateTime<Local>, battery_percent: f32) -> String {
        format!(
            "{},{:.1}",
            timestamp.format(Self::TIME_FORMAT),
            battery_percent
        )
    }
}

#[cfg(test)]
fn temp_log(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "battery-tester-{name}-{}.csv",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

#[test]
fn test_writes_header_once_and_appends_rows() {
    let path = temp_log("append");
    let time = chrono::TimeZone::with_ymd_and_hms(&Local, 2024, 5, 1, 9, 30, 15).unwrap();

    let logger = CsvLogger::new(&path);
    logger.ensure_header().unwrap();
    logger.append(time, 73.0).unwrap();
    logger.append(time, 72.5).unwrap();

    // A second logger must not rewrite the header or drop rows.
    let logger = CsvLogger::new(&path);
    logger.ensure_header().unwrap();
    logger.append(time, 72.0).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        [
            "Time,Battery Percentage",
            "09:30:15,73.0",
            "09:30:15,72.5",
            "09:30:15,72.0",
        ]
    );

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_reports_unwritable_file() {
    let dir = std::env::temp_dir().join(format!("battery-tester-missing-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let logger = CsvLogger::new(dir.join("battery_log.csv"));
    assert!(matches!(logger.ensure_header(), Err(LoggerError::Io(_))));
    assert!(matches!(
        logger.append(Local::now(), 50.0),
        Err(LoggerError::Io(_))
    ));
}

#[test]
fn test_rows_end_with_crlf() {
    let path = temp_log("crlf");
    let time = chrono::TimeZone::with_ymd_and_hms(&Local, 2024, 5, 1, 9, 30, 15).unwrap();

    CsvLogger::new(&path).append(time, 73.0).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "Time,Battery Percentage\r\n09:30:15,73.0\r\n");

    std::fs::remove_file(path).unwrap();
}
