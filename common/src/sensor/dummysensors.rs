// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::error::SensorError;
use crate::sensor::sensorsource::{BatteryState, SensorSource, TimeRemaining};

/// A sensor source that replays a bundled fixture.
///
/// Used on machines without a battery, and to try out the UI. The battery slowly
/// drains by `discharge_per_read` percent per query so the plot has something to show.
#[derive(Deserialize, Default)]
pub struct DummySensors {
    battery: Option<BatteryState>,
    cpu_temperature: Option<f32>,
    fan_speed: Option<u32>,
    #[serde(default)]
    discharge_per_read: f32,
}

impl DummySensors {
    pub fn new() -> Result<Self, serde_json::Error> {
        let json_data = std::include_str!("./dummyreading.json");

        serde_json::from_str::<Self>(json_data)
    }
}

impl SensorSource for DummySensors {
    fn battery(&mut self) -> Result<BatteryState, SensorError> {
        let battery = self.battery.as_mut().ok_or(SensorError::NotAvailable)?;
        let current = *battery;

        if !battery.power_plugged && battery.percent > 0.0 {
            let drained = (battery.percent - self.discharge_per_read).max(0.0);
            if let TimeRemaining::Seconds(seconds) = battery.time_remaining {
                let ratio = drained / battery.percent;
                battery.time_remaining = TimeRemaining::Seconds((seconds as f32 * ratio) as u64);
            }
            battery.percent = drained;
        }

        Ok(current)
    }

    fn cpu_temperature(&mut self) -> Result<f32, SensorError> {
        self.cpu_temperature.ok_or(SensorError::NotAvailable)
    }

    fn fan_speed(&mut self) -> Result<u32, SensorError> {
        self.fan_speed.ok_or(SensorError::NotAvailable)
    }
}

#[test]
fn test_dummy_sensors() {
    let mut sensors = DummySensors::new().unwrap();

    let first = sensors.battery().unwrap();
    assert_eq!(first.percent, 73.0);
    assert!(!first.power_plugged);
    assert_eq!(first.time_remaining, TimeRemaining::Seconds(9000));

    let second = sensors.battery().unwrap();
    assert!(second.percent < first.percent);

    assert_eq!(sensors.cpu_temperature().unwrap(), 46.5);
    assert_eq!(sensors.fan_speed().unwrap(), 2100);
}

#[test]
fn test_dummy_sensors_without_fan() {
    let mut sensors = DummySensors::default();

    assert!(matches!(sensors.fan_speed(), Err(SensorError::NotAvailable)));
    assert!(matches!(sensors.battery(), Err(SensorError::NotAvailable)));
}
