// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Local, TimeDelta};

use crate::error::SensorError;
use crate::sensor::{Clock, Reading, Sensor, SensorSource};

/// Turns the individual sensor queries of a [`SensorSource`] into [`Reading`]s.
///
/// A failing sensor only affects its own field of the reading, and only for the
/// current tick. Timestamps of consecutive readings are strictly increasing, even
/// if the clock does not advance between two reads.
pub struct SensorReader<S, C> {
    source: S,
    clock: C,
    last_timestamp: Option<DateTime<Local>>,
}

impl<S: SensorSource, C: Clock> SensorReader<S, C> {
    pub fn new(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            last_timestamp: None,
        }
    }

    /// Samples all sensors once.
    pub fn read(&mut self) -> Reading {
        let timestamp = self.next_timestamp();

        Reading {
            timestamp,
            battery: available("battery", self.source.battery()),
            cpu_temperature: available("cpu temperature", self.source.cpu_temperature()),
            fan_speed: available("fan speed", self.source.fan_speed()),
        }
    }

    fn next_timestamp(&mut self) -> DateTime<Local> {
        let mut timestamp = self.clock.now();
        if let Some(last) = self.last_timestamp {
            if timestamp <= last {
                timestamp = last + TimeDelta::microseconds(1);
            }
        }
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}

fn available<T>(name: &str, result: Result<T, SensorError>) -> Sensor<T> {
    match result {
        Ok(value) => Sensor::Available(value),
        Err(e) => {
            log::debug!("{name} unavailable: {e}");
            Sensor::Unavailable
        }
    }
}

#[test]
fn test_missing_fan_still_reports_battery() {
    let source = crate::sensor::ScriptedSensors {
        battery: Some(crate::sensor::BatteryState {
            percent: 73.0,
            ..Default::default()
        }),
        cpu_temperature: Some(48.5),
        fan_speed: None,
    };
    let mut reader = SensorReader::new(source, crate::sensor::MockClock::new([Local::now()]));

    let reading = reader.read();
    assert_eq!(reading.fan_speed, Sensor::Unavailable);
    assert_eq!(reading.battery_percent(), Some(73.0));
    assert_eq!(reading.cpu_temperature, Sensor::Available(48.5));
}

#[test]
fn test_timestamps_increase_when_clock_stalls() {
    let now = Local::now();
    let earlier = now - TimeDelta::seconds(5);
    let mut reader = SensorReader::new(
        crate::sensor::ScriptedSensors::default(),
        crate::sensor::MockClock::new([now, now, earlier, now + TimeDelta::seconds(1)]),
    );

    let timestamps = (0..4).map(|_| reader.read().timestamp).collect::<Vec<_>>();
    assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(timestamps[0], now);
    assert_eq!(timestamps[3], now + TimeDelta::seconds(1));
}
