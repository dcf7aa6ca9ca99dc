//! Poll and log ticks, independent of the UI.

use crate::error::LoggerError;
use crate::logger::CsvLogger;
use crate::plot::PlotBuffer;
use crate::sensor::{Clock, Reading, SensorReader, SensorSource};

/// What a log tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogOutcome {
    /// A row with this battery percentage was appended.
    Written(f32),
    /// There was no battery reading to log.
    Skipped,
}

/// Samples the sensors into the plot buffer and logs the battery percentage.
pub struct Monitor<S, C> {
    reader: SensorReader<S, C>,
    buffer: PlotBuffer,
    logger: CsvLogger,
}

impl<S: SensorSource, C: Clock> Monitor<S, C> {
    pub fn new(reader: SensorReader<S, C>, buffer: PlotBuffer, logger: CsvLogger) -> Self {
        Self {
            reader,
            buffer,
            logger,
        }
    }

    /// One poll tick: reads the sensors and records the reading.
    pub fn poll(&mut self) -> Reading {
        let reading = self.reader.read();
        self.buffer.record(reading);
        reading
    }

    /// One log tick: appends the latest battery percentage to the log.
    pub fn log(&self) -> Result<LogOutcome, LoggerError> {
        let Some((timestamp, percent)) = self
            .latest()
            .and_then(|reading| Some((reading.timestamp, reading.battery_percent()?)))
        else {
            log::debug!("No battery reading, skipping log row");
            return Ok(LogOutcome::Skipped);
        };

        self.logger.append(timestamp, percent)?;
        Ok(LogOutcome::Written(percent))
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.buffer.latest()
    }

    pub fn buffer(&self) -> &PlotBuffer {
        &self.buffer
    }
}

#[cfg(test)]
fn test_monitor(
    log_path: std::path::PathBuf,
    sensors: crate::sensor::ScriptedSensors,
    ticks: usize,
) -> Monitor<crate::sensor::ScriptedSensors, crate::sensor::MockClock> {
    use chrono::TimeZone;

    let start = chrono::Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let clock = crate::sensor::MockClock::stepping(start, std::time::Duration::from_secs(2), ticks);
    Monitor::new(
        SensorReader::new(sensors, clock),
        PlotBuffer::default(),
        CsvLogger::new(log_path),
    )
}

#[cfg(test)]
fn temp_log(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "battery-tester-monitor-{name}-{}.csv",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

#[cfg(test)]
fn battery_at(percent: f32) -> crate::sensor::ScriptedSensors {
    crate::sensor::ScriptedSensors {
        battery: Some(crate::sensor::BatteryState {
            percent,
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn test_thirty_seconds_at_73_percent() {
    let path = temp_log("scenario");
    let mut monitor = test_monitor(path.clone(), battery_at(73.0), 15);

    // Poll every 2 s, log every 15 s.
    for second in 1..=30 {
        if second % 2 == 0 {
            monitor.poll();
        }
        if second % 15 == 0 {
            assert_eq!(monitor.log().unwrap(), LogOutcome::Written(73.0));
        }
    }

    assert_eq!(monitor.buffer().len(), 15);
    let times = monitor.buffer().snapshot().map(|r| r.timestamp).collect::<Vec<_>>();
    assert!(times.windows(2).all(|w| w[0] < w[1]));

    let content = std::fs::read_to_string(&path).unwrap();
    let rows = content.lines().skip(1).collect::<Vec<_>>();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.ends_with(",73.0")));

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_no_battery_skips_log_but_still_plots() {
    let path = temp_log("no-battery");
    let sensors = crate::sensor::ScriptedSensors {
        cpu_temperature: Some(50.0),
        ..Default::default()
    };
    let mut monitor = test_monitor(path.clone(), sensors, 3);

    assert_eq!(monitor.log().unwrap(), LogOutcome::Skipped);
    for _ in 0..3 {
        monitor.poll();
    }
    assert_eq!(monitor.buffer().len(), 3);
    assert_eq!(monitor.log().unwrap(), LogOutcome::Skipped);

    assert!(!path.exists());
}

#[test]
fn test_failed_log_does_not_stop_polling() {
    let dir = std::env::temp_dir().join(format!("battery-tester-monitor-gone-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut monitor = test_monitor(dir.join("battery_log.csv"), battery_at(73.0), 4);

    monitor.poll();
    monitor.poll();
    assert!(matches!(monitor.log(), Err(LoggerError::Io(_))));

    monitor.poll();
    monitor.poll();
    assert_eq!(monitor.buffer().len(), 4);
    assert_eq!(monitor.latest().and_then(|r| r.battery_percent()), Some(73.0));
    assert!(matches!(monitor.log(), Err(LoggerError::Io(_))));
}
