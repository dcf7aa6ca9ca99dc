// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

use std::cell::RefCell;
use std::rc::Rc;

use battery_tester_common::display::{self, Labels};
use battery_tester_common::sensor::{
    DummySensors, Reading, SensorReader, SensorSourcePointer, SystemClock, SystemSensors,
};
use battery_tester_common::{
    available_cores, clamp_cores, Config, CsvLogger, LoadGenerator, LoadState, LogOutcome,
    Monitor, PlotBuffer,
};

type SharedMonitor = Rc<RefCell<Monitor<SensorSourcePointer, SystemClock>>>;

/// Our App struct that holds the UI, the monitor and the load generator.
///
/// It owns two timers: one polls the sensors and refreshes the labels and the plot,
/// the other appends the battery percentage to the log file.
/// Everything runs on the UI thread, only the load workers have threads of their own.
struct App {
    ui: AppWindow,
    config: Config,
    monitor: SharedMonitor,
    load: Rc<RefCell<LoadGenerator>>,
    time_labels: Rc<slint::VecModel<slint::SharedString>>,
    poll_timer: slint::Timer,
    log_timer: slint::Timer,
}

impl App {
    /// Size of the box the plot path is drawn in, see `plot-commands` in appwindow.slint.
    const PLOT_WIDTH: f32 = 1000.0;
    const PLOT_HEIGHT: f32 = 100.0;
    const MAX_TIME_LABELS: usize = 10;

    /// Create a new App struct.
    ///
    /// Loads the config and picks the sensor source: the bundled dummy data if
    /// configured, otherwise the machine's sensors.
    fn new() -> anyhow::Result<Self> {
        // Make a new AppWindow
        let ui = AppWindow::new()?;
        let config = Config::load()?;

        let source: SensorSourcePointer = if config.dummy_sensors {
            log::info!("Using dummy sensors");
            Box::new(DummySensors::new()?)
        } else {
            Box::new(SystemSensors::new())
        };

        let logger = CsvLogger::new(&config.log_path);
        let time_labels: Rc<slint::VecModel<slint::SharedString>> = Rc::default();

        {
            let model = ui.global::<ViewModel>();

            // A broken log file is not fatal, the monitoring keeps running.
            if let Err(e) = logger.ensure_header() {
                log::warn!("{e}");
                model.set_warning(slint::format!("Warning: {e}"));
            }

            model.set_max_cores(available_cores() as i32);
            model.set_cores(1);
            model.set_status(display::status(LoadState::Idle).into());
            model.set_time_labels(slint::ModelRc::from(time_labels.clone()));
        }

        let monitor = Monitor::new(
            SensorReader::new(source, SystemClock),
            PlotBuffer::new(config.plot_capacity),
            logger,
        );

        Ok(Self {
            ui,
            config,
            monitor: Rc::new(RefCell::new(monitor)),
            load: Rc::default(),
            time_labels,
            poll_timer: slint::Timer::default(),
            log_timer: slint::Timer::default(),
        })
    }

    /// Run the App: connect the load controls, start both timers and show the window.
    fn run(&mut self) -> anyhow::Result<()> {
        self.connect_load_controls();
        self.start_poll_timer();
        self.start_log_timer();

        let result = self.ui.run();

        // Do not leave spinning threads behind when the window is closed.
        self.load.borrow_mut().stop();

        // Run the UI (and map an error to an anyhow::Error).
        result.map_err(|e| e.into())
    }

    fn connect_load_controls(&self) {
        let ui_handle = self.ui.as_weak();
        let load = self.load.clone();
        self.ui.global::<ViewModel>().on_start_load(move |cores| {
            let Some(ui) = ui_handle.upgrade() else {
                return;
            };

            let mut load = load.borrow_mut();
            if load.state() == LoadState::Idle {
                load.start(clamp_cores(cores.max(1) as usize));
            }
            Self::show_load_state(&ViewModel::get(&ui), load.state());
        });

        let ui_handle = self.ui.as_weak();
        let load = self.load.clone();
        self.ui.global::<ViewModel>().on_stop_load(move || {
            let Some(ui) = ui_handle.upgrade() else {
                return;
            };

            let mut load = load.borrow_mut();
            load.stop();
            Self::show_load_state(&ViewModel::get(&ui), load.state());
        });
    }

    fn show_load_state(model: &ViewModel, state: LoadState) {
        model.set_load_running(state != LoadState::Idle);
        model.set_status(display::status(state).into());
    }

    fn start_poll_timer(&self) {
        let ui_handle = self.ui.as_weak();
        let monitor = self.monitor.clone();
        let time_labels = self.time_labels.clone();

        self.poll_timer.start(
            slint::TimerMode::Repeated,
            self.config.poll_interval(),
            move || {
                let Some(ui) = ui_handle.upgrade() else {
                    return;
                };
                let model = ViewModel::get(&ui);

                let mut monitor = monitor.borrow_mut();
                let reading = monitor.poll();
                Self::show_reading(&model, &reading);

                let buffer = monitor.buffer();
                model.set_plot_commands(
                    buffer
                        .path_commands(Self::PLOT_WIDTH, Self::PLOT_HEIGHT)
                        .into(),
                );
                time_labels.set_vec(
                    buffer
                        .time_labels(Self::MAX_TIME_LABELS)
                        .into_iter()
                        .map(slint::SharedString::from)
                        .collect::<Vec<_>>(),
                );
            },
        );
    }

    fn start_log_timer(&self) {
        let ui_handle = self.ui.as_weak();
        let monitor = self.monitor.clone();

        self.log_timer.start(
            slint::TimerMode::Repeated,
            self.config.log_interval(),
            move || {
                let Some(ui) = ui_handle.upgrade() else {
                    return;
                };
                let model = ViewModel::get(&ui);

                match monitor.borrow().log() {
                    Ok(LogOutcome::Written(percent)) => {
                        log::debug!("Logged battery at {percent:.1}%");
                        model.set_warning(slint::SharedString::default());
                    }
                    Ok(LogOutcome::Skipped) => {}
                    Err(e) => {
                        log::warn!("{e}");
                        model.set_warning(slint::format!("Warning: {e}"));
                    }
                }
            },
        );
    }

    fn show_reading(model: &ViewModel, reading: &Reading) {
        let labels = Labels::from(reading);

        model.set_temperature(labels.temperature.into());
        model.set_fan(labels.fan.into());
        model.set_battery(labels.battery.into());
        model.set_time_remaining(labels.time_remaining.into());
    }
}

/// A minimal main function that initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut app = App::new()?;

    app.run()
}
