// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use sysinfo::Components;

use crate::error::SensorError;
use crate::sensor::sensorsource::{BatteryState, SensorSource};

/// Label fragments of CPU temperature sensors (coretemp, k10temp, ...).
const CPU_LABELS: [&str; 5] = ["cpu", "package", "core", "tctl", "tdie"];

/// Reads the sensors of the machine we are running on.
///
/// The CPU temperature comes from `sysinfo`. Battery and fan speed are read from
/// sysfs and are only available on Linux.
pub struct SystemSensors {
    components: Components,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    sysfs_root: PathBuf,
}

impl SystemSensors {
    const SYSFS_CLASS: &'static str = "/sys/class";

    pub fn new() -> Self {
        Self::with_sysfs_root(Self::SYSFS_CLASS)
    }

    /// Reads battery and fan from `root` instead of `/sys/class`.
    pub fn with_sysfs_root(root: impl Into<PathBuf>) -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
            sysfs_root: root.into(),
        }
    }
}

impl Default for SystemSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SystemSensors {
    #[cfg(target_os = "linux")]
    fn battery(&mut self) -> Result<BatteryState, SensorError> {
        linux::battery(&self.sysfs_root)
    }

    #[cfg(not(target_os = "linux"))]
    fn battery(&mut self) -> Result<BatteryState, SensorError> {
        Err(SensorError::NotSupported)
    }

    fn cpu_temperature(&mut self) -> Result<f32, SensorError> {
        self.components.refresh(true);

        let cpu = self.components.iter().find(|c| {
            let label = c.label().to_lowercase();
            CPU_LABELS.iter().any(|pattern| label.contains(pattern))
        });

        // Fall back to whatever sensor comes first, like most monitors do.
        cpu.and_then(|c| c.temperature())
            .or_else(|| self.components.iter().find_map(|c| c.temperature()))
            .ok_or(SensorError::NotAvailable)
    }

    #[cfg(target_os = "linux")]
    fn fan_speed(&mut self) -> Result<u32, SensorError> {
        linux::fan_speed(&self.sysfs_root)
    }

    #[cfg(not(target_os = "linux"))]
    fn fan_speed(&mut self) -> Result<u32, SensorError> {
        Err(SensorError::NotSupported)
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::error::SensorError;
    use crate::sensor::sensorsource::{BatteryState, TimeRemaining};

    /// Names of mains adapters in `power_supply`.
    const ADAPTERS: [&str; 4] = ["AC", "AC0", "ADP1", "ACAD"];

    fn read_trimmed(path: &Path) -> Option<String> {
        fs::read_to_string(path).ok().map(|s| s.trim().to_string())
    }

    fn read_number(path: &Path) -> Option<f64> {
        read_trimmed(path).and_then(|s| s.parse().ok())
    }

    /// Entries of `dir` sorted by name, so the "first" sensor is stable between ticks.
    fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, SensorError> {
        let mut entries = fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        entries.sort();
        Ok(entries)
    }

    pub fn battery(root: &Path) -> Result<BatteryState, SensorError> {
        let power_supply = root.join("power_supply");
        let battery = sorted_entries(&power_supply)
            .map_err(|_| SensorError::NotAvailable)?
            .into_iter()
            .find(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("BAT"))
            })
            .ok_or(SensorError::NotAvailable)?;

        let capacity = read_trimmed(&battery.join("capacity")).ok_or(SensorError::NotAvailable)?;
        let percent = capacity
            .parse::<f32>()
            .map_err(|_| SensorError::Parse(capacity.clone()))?
            .clamp(0.0, 100.0);

        let status = read_trimmed(&battery.join("status")).unwrap_or_default();
        let power_plugged = match status.to_lowercase().as_str() {
            "discharging" => false,
            "charging" | "full" | "not charging" => true,
            _ => adapter_online(&power_supply),
        };

        let time_remaining = if power_plugged {
            TimeRemaining::Charging
        } else {
            seconds_left(&battery)
        };

        Ok(BatteryState {
            percent,
            power_plugged,
            time_remaining,
        })
    }

    fn adapter_online(power_supply: &Path) -> bool {
        ADAPTERS
            .iter()
            .filter_map(|name| read_trimmed(&power_supply.join(name).join("online")))
            .any(|online| online == "1")
    }

    /// Remaining time from energy/power (µWh, µW) or charge/current (µAh, µA).
    fn seconds_left(battery: &Path) -> TimeRemaining {
        let pairs = [("energy_now", "power_now"), ("charge_now", "current_now")];

        for (amount, rate) in pairs {
            let (Some(amount), Some(rate)) = (
                read_number(&battery.join(amount)),
                read_number(&battery.join(rate)),
            ) else {
                continue;
            };

            if rate <= 0.0 {
                return TimeRemaining::Unknown;
            }
            return TimeRemaining::Seconds((amount / rate * 3600.0) as u64);
        }

        TimeRemaining::Unknown
    }

    pub fn fan_speed(root: &Path) -> Result<u32, SensorError> {
        let hwmon = sorted_entries(&root.join("hwmon")).map_err(|_| SensorError::NotAvailable)?;

        for chip in hwmon {
            let Ok(files) = sorted_entries(&chip) else {
                continue;
            };

            let rpm = files
                .iter()
                .filter(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.starts_with("fan") && name.ends_with("_input"))
                })
                .find_map(|path| read_trimmed(path).and_then(|s| s.parse::<u32>().ok()));

            if let Some(rpm) = rpm {
                return Ok(rpm);
            }
        }

        Err(SensorError::NotAvailable)
    }
}

#[cfg(all(test, target_os = "linux"))]
fn fake_sysfs(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!(
        "battery-tester-sysfs-{name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(root.join("power_supply")).unwrap();
    std::fs::create_dir_all(root.join("hwmon")).unwrap();
    root
}

#[cfg(all(test, target_os = "linux"))]
fn write(root: &std::path::Path, file: &str, content: &str) {
    let path = root.join(file);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
#[cfg(target_os = "linux")]
fn test_discharging_battery_with_fan() {
    let root = fake_sysfs("discharging");
    write(&root, "power_supply/BAT0/capacity", "73\n");
    write(&root, "power_supply/BAT0/status", "Discharging\n");
    write(&root, "power_supply/BAT0/energy_now", "36500000\n");
    write(&root, "power_supply/BAT0/power_now", "14600000\n");
    write(&root, "hwmon/hwmon0/name", "thinkpad\n");
    write(&root, "hwmon/hwmon0/fan1_input", "2100\n");

    let mut sensors = SystemSensors::with_sysfs_root(&root);
    let battery = sensors.battery().unwrap();
    assert_eq!(battery.percent, 73.0);
    assert!(!battery.power_plugged);
    assert_eq!(battery.time_remaining, crate::sensor::TimeRemaining::Seconds(9000));
    assert_eq!(sensors.fan_speed().unwrap(), 2100);

    std::fs::remove_dir_all(root).unwrap();
}

#[test]
#[cfg(target_os = "linux")]
fn test_charging_battery_without_fan() {
    let root = fake_sysfs("charging");
    write(&root, "power_supply/AC/online", "1\n");
    write(&root, "power_supply/BAT1/capacity", "40\n");
    write(&root, "power_supply/BAT1/status", "Unknown\n");
    write(&root, "hwmon/hwmon0/temp1_input", "45000\n");

    let mut sensors = SystemSensors::with_sysfs_root(&root);
    let battery = sensors.battery().unwrap();
    assert!(battery.power_plugged);
    assert_eq!(battery.time_remaining, crate::sensor::TimeRemaining::Charging);
    assert!(matches!(sensors.fan_speed(), Err(SensorError::NotAvailable)));

    std::fs::remove_dir_all(root).unwrap();
}

#[test]
#[cfg(target_os = "linux")]
fn test_no_battery() {
    let root = fake_sysfs("desktop");
    write(&root, "power_supply/AC/online", "1\n");

    let mut sensors = SystemSensors::with_sysfs_root(&root);
    assert!(matches!(sensors.battery(), Err(SensorError::NotAvailable)));

    std::fs::remove_dir_all(root).unwrap();
}
