// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

mod clock;
mod dummysensors;
mod sensorreader;
mod sensorsource;
mod systemsensors;

pub use clock::{Clock, SystemClock};
pub use dummysensors::DummySensors;
pub use sensorreader::SensorReader;
pub use sensorsource::{
    BatteryState, Reading, Sensor, SensorSource, SensorSourcePointer, TimeRemaining,
};
pub use systemsensors::SystemSensors;

#[cfg(test)]
pub(crate) use clock::MockClock;

/// A sensor source returning fixed values, for tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ScriptedSensors {
    pub battery: Option<BatteryState>,
    pub cpu_temperature: Option<f32>,
    pub fan_speed: Option<u32>,
}

#[cfg(test)]
impl SensorSource for ScriptedSensors {
    fn battery(&mut self) -> Result<BatteryState, crate::error::SensorError> {
        self.battery.ok_or(crate::error::SensorError::NotAvailable)
    }

    fn cpu_temperature(&mut self) -> Result<f32, crate::error::SensorError> {
        self.cpu_temperature
            .ok_or(crate::error::SensorError::NotAvailable)
    }

    fn fan_speed(&mut self) -> Result<u32, crate::error::SensorError> {
        self.fan_speed.ok_or(crate::error::SensorError::NotAvailable)
    }
}
