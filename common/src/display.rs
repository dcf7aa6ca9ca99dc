//! Texts of the status labels.

use crate::load::LoadState;
use crate::sensor::{BatteryState, Reading, Sensor, TimeRemaining};

pub const STATUS_PREFIX: &str = "Status: ";
pub const TEMP_PREFIX: &str = "CPU Temperature: ";
pub const FAN_PREFIX: &str = "Fan Speed: ";
pub const BATTERY_PREFIX: &str = "Battery: ";
pub const TIME_REMAINING_PREFIX: &str = "Time: ";

const NOT_AVAILABLE: &str = "N/A";

/// The label texts for one reading.
#[derive(Clone, Debug, PartialEq)]
pub struct Labels {
    pub temperature: String,
    pub fan: String,
    pub battery: String,
    pub time_remaining: String,
}

impl From<&Reading> for Labels {
    fn from(reading: &Reading) -> Self {
        Self {
            temperature: temperature(reading.cpu_temperature),
            fan: fan(reading.fan_speed),
            battery: battery(reading.battery),
            time_remaining: time_remaining(reading.battery),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            temperature: format!("{TEMP_PREFIX}{NOT_AVAILABLE}"),
            fan: format!("{FAN_PREFIX}{NOT_AVAILABLE}"),
            battery: format!("{BATTERY_PREFIX}{NOT_AVAILABLE}"),
            time_remaining: format!("{TIME_REMAINING_PREFIX}{NOT_AVAILABLE}"),
        }
    }
}

pub fn status(state: LoadState) -> String {
    match state {
        LoadState::Idle => format!("{STATUS_PREFIX}Idle"),
        LoadState::Running { .. } => format!("{STATUS_PREFIX}Loading CPU..."),
    }
}

pub fn temperature(celsius: Sensor<f32>) -> String {
    match celsius {
        Sensor::Available(celsius) => format!("{TEMP_PREFIX}{celsius:.1}°C"),
        Sensor::Unavailable => format!("{TEMP_PREFIX}{NOT_AVAILABLE}"),
    }
}

pub fn fan(rpm: Sensor<u32>) -> String {
    match rpm {
        Sensor::Available(rpm) => format!("{FAN_PREFIX}{rpm} RPM"),
        Sensor::Unavailable => format!("{FAN_PREFIX}{NOT_AVAILABLE}"),
    }
}

pub fn battery(battery: Sensor<BatteryState>) -> String {
    match battery {
        Sensor::Available(battery) => format!("{BATTERY_PREFIX}{:.1}%", battery.percent),
        Sensor::Unavailable => format!("{BATTERY_PREFIX}{NOT_AVAILABLE}"),
    }
}

pub fn time_remaining(battery: Sensor<BatteryState>) -> String {
    let Sensor::Available(battery) = battery else {
        return format!("{TIME_REMAINING_PREFIX}{NOT_AVAILABLE}");
    };

    let remaining = if battery.power_plugged {
        "Charging".to_string()
    } else {
        match battery.time_remaining {
            TimeRemaining::Charging => "Charging".to_string(),
            TimeRemaining::Unlimited => "Unlimited".to_string(),
            TimeRemaining::Unknown => "Calculating...".to_string(),
            TimeRemaining::Seconds(seconds) => {
                let minutes = seconds / 60;
                format!("{}:{:02} remaining", minutes / 60, minutes % 60)
            }
        }
    };

    format!("{TIME_REMAINING_PREFIX}{remaining}")
}

#[test]
fn test_unavailable_labels() {
    let labels = Labels::default();

    assert_eq!(labels.temperature, "CPU Temperature: N/A");
    assert_eq!(labels.fan, "Fan Speed: N/A");
    assert_eq!(labels.battery, "Battery: N/A");
    assert_eq!(labels.time_remaining, "Time: N/A");
}

#[test]
fn test_available_labels() {
    let reading = Reading {
        timestamp: chrono::Local::now(),
        battery: Sensor::Available(BatteryState {
            percent: 73.0,
            power_plugged: false,
            time_remaining: TimeRemaining::Seconds(3_900),
        }),
        cpu_temperature: Sensor::Available(45.3),
        fan_speed: Sensor::Available(2100),
    };
    let labels = Labels::from(&reading);

    assert_eq!(labels.temperature, "CPU Temperature: 45.3°C");
    assert_eq!(labels.fan, "Fan Speed: 2100 RPM");
    assert_eq!(labels.battery, "Battery: 73.0%");
    assert_eq!(labels.time_remaining, "Time: 1:05 remaining");
}

#[test]
fn test_time_remaining_texts() {
    let state = |power_plugged, time_remaining| {
        Sensor::Available(BatteryState {
            percent: 50.0,
            power_plugged,
            time_remaining,
        })
    };

    assert_eq!(time_remaining(state(true, TimeRemaining::Unknown)), "Time: Charging");
    assert_eq!(time_remaining(state(false, TimeRemaining::Unlimited)), "Time: Unlimited");
    assert_eq!(time_remaining(state(false, TimeRemaining::Unknown)), "Time: Calculating...");
    assert_eq!(status(LoadState::Idle), "Status: Idle");
    assert_eq!(status(LoadState::Running { cores: 2 }), "Status: Loading CPU...");
}
