//! In-memory battery series for the live plot.

use std::collections::VecDeque;
use std::fmt::Write;

use crate::sensor::Reading;

/// Readings in time order, oldest first.
///
/// Holds at most `capacity` readings; recording into a full buffer drops the oldest.
pub struct PlotBuffer {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl PlotBuffer {
    /// One day of one-second polls.
    pub const DEFAULT_CAPACITY: usize = 24 * 60 * 60;

    /// Upper bound of vertices in [`path_commands`](Self::path_commands).
    const MAX_PATH_POINTS: usize = 1000;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn record(&mut self, reading: Reading) {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn snapshot(&self) -> impl ExactSizeIterator<Item = &Reading> + '_ {
        self.readings.iter()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// SVG path commands drawing the battery percentage into a `width` x `height` box.
    ///
    /// The y axis always spans 0 - 100 %. Readings without a battery leave a gap.
    /// Long series are thinned out to keep the path small; a gap between two kept
    /// points still breaks the line.
    pub fn path_commands(&self, width: f32, height: f32) -> String {
        let n = self.readings.len();
        let mut commands = String::new();
        if n == 0 {
            return commands;
        }

        let stride = n.div_ceil(Self::MAX_PATH_POINTS);
        let x_step = if n > 1 { width / (n - 1) as f32 } else { 0.0 };

        let mut pen_down = false;
        let mut indices = (0..n).step_by(stride).collect::<Vec<_>>();
        if indices.last() != Some(&(n - 1)) {
            indices.push(n - 1);
        }

        let mut previous: Option<usize> = None;
        for i in indices {
            if let Some(previous) = previous {
                if (previous + 1..i).any(|j| self.readings[j].battery_percent().is_none()) {
                    pen_down = false;
                }
            }
            previous = Some(i);

            let Some(percent) = self.readings[i].battery_percent() else {
                pen_down = false;
                continue;
            };

            let x = i as f32 * x_step;
            let y = height * (1.0 - percent.clamp(0.0, 100.0) / 100.0);
            let command = if pen_down { 'L' } else { 'M' };
            if !commands.is_empty() {
                commands.push(' ');
            }
            let _ = write!(commands, "{command} {x:.2} {y:.2}");
            pen_down = true;
        }

        commands
    }

    /// Up to `max` evenly spaced `HH:MM:SS` labels for the time axis.
    pub fn time_labels(&self, max: usize) -> Vec<String> {
        let n = self.readings.len();
        if n == 0 || max == 0 {
            return Vec::new();
        }

        let count = n.min(max);
        (0..count)
            .map(|k| if count == 1 { n - 1 } else { k * (n - 1) / (count - 1) })
            .map(|i| self.readings[i].timestamp.format("%H:%M:%S").to_string())
            .collect()
    }
}

impl Default for PlotBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
fn reading(second: i64, percent: Option<f32>) -> Reading {
    use chrono::TimeZone;

    let start = chrono::Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Reading {
        timestamp: start + chrono::TimeDelta::seconds(second),
        battery: percent
            .map(|percent| crate::sensor::BatteryState {
                percent,
                ..Default::default()
            })
            .into(),
        cpu_temperature: crate::sensor::Sensor::Unavailable,
        fan_speed: crate::sensor::Sensor::Unavailable,
    }
}

#[test]
fn test_records_in_order_and_evicts_oldest() {
    let mut buffer = PlotBuffer::new(3);
    for second in 0..5 {
        buffer.record(reading(second, Some(50.0)));
    }

    assert_eq!(buffer.len(), 3);
    let times = buffer.snapshot().map(|r| r.timestamp).collect::<Vec<_>>();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(buffer.latest().unwrap().timestamp, reading(4, None).timestamp);
}

#[test]
fn test_path_spans_box_and_breaks_on_gaps() {
    let mut buffer = PlotBuffer::default();
    buffer.record(reading(0, Some(100.0)));
    buffer.record(reading(1, Some(50.0)));
    buffer.record(reading(2, None));
    buffer.record(reading(3, Some(50.0)));
    buffer.record(reading(4, Some(0.0)));

    assert_eq!(
        buffer.path_commands(400.0, 100.0),
        "M 0.00 0.00 L 100.00 50.00 M 300.00 50.00 L 400.00 100.00"
    );
}

#[test]
fn test_long_series_is_thinned() {
    let mut buffer = PlotBuffer::default();
    for second in 0..10_000 {
        buffer.record(reading(second, Some(80.0)));
    }

    let commands = buffer.path_commands(1000.0, 100.0);
    let points = commands.matches(['M', 'L']).count();
    assert!(points <= PlotBuffer::MAX_PATH_POINTS + 1);
    assert!(commands.ends_with("L 1000.00 20.00"));
}

#[test]
fn test_time_labels_include_first_and_last() {
    let mut buffer = PlotBuffer::default();
    assert!(buffer.time_labels(10).is_empty());

    for second in 0..30 {
        buffer.record(reading(second, Some(80.0)));
    }

    let labels = buffer.time_labels(10);
    assert_eq!(labels.len(), 10);
    assert_eq!(labels.first().unwrap(), "12:00:00");
    assert_eq!(labels.last().unwrap(), "12:00:29");
}

#[test]
fn test_gap_between_thinned_points_breaks_line() {
    let mut buffer = PlotBuffer::default();
    for second in 0..3000 {
        let percent = if second == 1001 { None } else { Some(80.0) };
        buffer.record(reading(second, percent));
    }

    // 1001 is not one of the kept points (stride 3), but still lifts the pen.
    let commands = buffer.path_commands(1000.0, 100.0);
    assert_eq!(commands.matches('M').count(), 2);
}
