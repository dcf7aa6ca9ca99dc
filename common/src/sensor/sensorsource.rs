// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::error::SensorError;

/// The value of an optional sensor.
///
/// Machines without a fan or temperature sensor are normal, so a missing sensor is
/// an explicit value rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Sensor<T> {
    Available(T),
    #[default]
    Unavailable,
}

impl<T> Sensor<T> {
    /// Returns the value if the sensor could be read.
    pub fn available(&self) -> Option<&T> {
        match self {
            Sensor::Available(value) => Some(value),
            Sensor::Unavailable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sensor<U> {
        match self {
            Sensor::Available(value) => Sensor::Available(f(value)),
            Sensor::Unavailable => Sensor::Unavailable,
        }
    }
}

impl<T> From<Option<T>> for Sensor<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Sensor::Unavailable, Sensor::Available)
    }
}

/// How long the battery will last.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeRemaining {
    /// The battery is connected to a power source.
    Charging,
    /// The battery never runs out, e.g. on a permanently powered machine.
    Unlimited,
    /// The OS has not estimated the remaining time yet.
    #[default]
    Unknown,
    /// Estimated seconds until the battery is empty.
    Seconds(u64),
}

/// The battery state.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct BatteryState {
    /// Charge in percent (0 - 100).
    pub percent: f32,

    /// Whether a power source is connected.
    pub power_plugged: bool,

    #[serde(default)]
    pub time_remaining: TimeRemaining,
}

/// One sampled snapshot of battery, temperature and fan values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Local>,
    pub battery: Sensor<BatteryState>,
    /// CPU temperature in degrees Celsius.
    pub cpu_temperature: Sensor<f32>,
    /// Fan speed in RPM.
    pub fan_speed: Sensor<u32>,
}

impl Reading {
    /// The battery charge in percent, if a battery was found.
    pub fn battery_percent(&self) -> Option<f32> {
        self.battery.available().map(|battery| battery.percent)
    }
}

pub type SensorSourcePointer = Box<dyn SensorSource + Send>;

/// The sensor source trait that queries the hardware.
///
/// Every sensor is queried on its own so that one failing sensor does not hide
/// the others.
pub trait SensorSource {
    /// Fetches the battery state.
    fn battery(&mut self) -> Result<BatteryState, SensorError>;

    /// Fetches the CPU temperature in degrees Celsius.
    fn cpu_temperature(&mut self) -> Result<f32, SensorError>;

    /// Fetches the fan speed in RPM.
    fn fan_speed(&mut self) -> Result<u32, SensorError>;
}

impl<S: SensorSource + ?Sized> SensorSource for Box<S> {
    fn battery(&mut self) -> Result<BatteryState, SensorError> {
        (**self).battery()
    }

    fn cpu_temperature(&mut self) -> Result<f32, SensorError> {
        (**self).cpu_temperature()
    }

    fn fan_speed(&mut self) -> Result<u32, SensorError> {
        (**self).fan_speed()
    }
}

#[test]
fn test_sensor_from_option() {
    assert_eq!(Sensor::from(Some(42u32)), Sensor::Available(42));
    assert_eq!(Sensor::<u32>::from(None), Sensor::Unavailable);
    assert_eq!(Sensor::Available(2).map(|v| v * 2).available(), Some(&4));
}
