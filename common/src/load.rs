//! Synthetic CPU load.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Whether a load session is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Running { cores: usize },
}

/// Number of cores the load can be spread across.
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Clamps a requested core count to `[1, available_cores()]`.
pub fn clamp_cores(requested: usize) -> usize {
    requested.clamp(1, available_cores())
}

/// Keeps `n` cores busy until stopped.
///
/// Each worker is a thread spinning on integer arithmetic. Workers check the
/// session's running flag between bursts, so [`stop`](Self::stop) returns shortly
/// after the flag is cleared.
#[derive(Default)]
pub struct LoadGenerator {
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl LoadGenerator {
    const BURST: u32 = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoadState {
        if self.workers.is_empty() {
            LoadState::Idle
        } else {
            LoadState::Running {
                cores: self.workers.len(),
            }
        }
    }

    /// Number of worker threads that have not been joined yet.
    pub fn active_workers(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_finished()).count()
    }

    /// Starts a load session on `cores` cores, stopping the current one first.
    pub fn start(&mut self, cores: usize) {
        self.stop();

        let clamped = clamp_cores(cores);
        if clamped != cores {
            log::warn!("Requested load on {cores} cores, using {clamped}");
        }

        // Each session owns its flag.
        self.running = Arc::new(AtomicBool::new(true));
        self.workers = (0..clamped)
            .map(|i| {
                let running = self.running.clone();
                std::thread::Builder::new()
                    .name(format!("cpu-load-{i}"))
                    .spawn(move || Self::spin(&running))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("Could not spawn load worker: {e}");
                    None
                }
            })
            .collect();

        log::info!("Started CPU load on {} cores", self.workers.len());
    }

    /// Stops the load session and waits for all workers to exit.
    pub fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        self.running.store(false, Ordering::Relaxed);
        let count = self.workers.len();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("A load worker panicked");
            }
        }

        log::info!("Stopped CPU load on {count} cores");
    }

    fn spin(running: &AtomicBool) {
        let mut x = 0u64;
        while running.load(Ordering::Relaxed) {
            for _ in 0..Self::BURST {
                x = x.wrapping_mul(1664525).wrapping_add(1013904223).rotate_left(5);
            }
            x = std::hint::black_box(x);
        }
    }
}

impl Drop for LoadGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[test]
fn test_start_then_stop_leaves_no_workers() {
    let mut load = LoadGenerator::new();
    assert_eq!(load.state(), LoadState::Idle);

    load.start(2.min(available_cores()));
    assert!(matches!(load.state(), LoadState::Running { .. }));

    load.stop();
    assert_eq!(load.state(), LoadState::Idle);
    assert_eq!(load.active_workers(), 0);
}

#[test]
fn test_restart_replaces_workers() {
    let cores = available_cores();
    let mut load = LoadGenerator::new();

    load.start(cores);
    load.start(1);
    assert_eq!(load.state(), LoadState::Running { cores: 1 });
    assert_eq!(load.active_workers(), 1);

    load.stop();
    assert_eq!(load.active_workers(), 0);
}

#[test]
fn test_core_count_is_clamped() {
    assert_eq!(clamp_cores(0), 1);
    assert_eq!(clamp_cores(usize::MAX), available_cores());

    let mut load = LoadGenerator::new();
    load.start(0);
    assert_eq!(load.state(), LoadState::Running { cores: 1 });
}
