// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Local};

/// A source of wall-clock timestamps for readings.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A scripted clock for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MockClock {
    times: std::cell::RefCell<std::collections::VecDeque<DateTime<Local>>>,
}

#[cfg(test)]
impl MockClock {
    pub fn new(times: impl IntoIterator<Item = DateTime<Local>>) -> Self {
        Self {
            times: std::cell::RefCell::new(times.into_iter().collect()),
        }
    }

    /// A clock that returns `count` timestamps, `step` apart, starting at `start`.
    pub fn stepping(start: DateTime<Local>, step: std::time::Duration, count: usize) -> Self {
        let step = chrono::TimeDelta::from_std(step).expect("step fits into a TimeDelta");
        Self::new((0..count as i32).map(|i| start + step * i))
    }
}

#[cfg(test)]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Local> {
        self.times
            .borrow_mut()
            .pop_front()
            .expect("mock times should not be empty")
    }
}
