//! Application service: the cluster's hexagonal core.
//!
//! [`ClusterService`] owns both sensors, the three cluster pages and the
//! display orchestrator. It runs one cooperative tick at a time and turns
//! inbound commands into sensor/display calls. All I/O flows through port
//! traits, so the whole service runs on the host against mock adapters.
//!
//! ```text
//!  Clock ─────────┐
//!  PulseCounter ──┤   ┌─────────────────────────┐ ──▶ EventSink
//!  AnalogPort ────┼──▶│     ClusterService      │
//!  Panel ─────────┘   │ tach · coolant · display│ ──▶ LightsPort
//!                     └─────────────────────────┘
//! ```
//!
//! Within a tick the sensors always run before the display decides whether
//! to repaint, so a value change and its dirty flag land in the same frame.

use core::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use super::commands::{AppCommand, CommandError};
use super::events::{AppEvent, TelemetryData};
use super::ports::{AnalogPort, Clock, EventSink, LightsPort, Panel};
use crate::config::SystemConfig;
use crate::display::orchestrator::DisplayOrchestrator;
use crate::display::overlay::OverlayColors;
use crate::display::page::{PageHandle, RefreshHandle};
use crate::display::pages::{StaticTextPage, TachPage, WaterTempPage};
use crate::error::DisplayError;
use crate::sensors::calibration::CalibrationCurve;
use crate::sensors::pulse_counter::PulseCounter;
use crate::sensors::tachometer::TachometerSensor;
use crate::sensors::temperature::{TempStatus, TemperatureSensor};

/// Page order on the panel.
pub const BOOT_PAGE: usize = 0;
pub const WATER_PAGE: usize = 1;
pub const TACH_PAGE: usize = 2;

pub type ClusterTach<'a> = TachometerSensor<'a, Rc<RefCell<TachPage>>, RefreshHandle>;
pub type ClusterCoolant<A, D> =
    TemperatureSensor<A, D, Rc<RefCell<WaterTempPage>>, RefreshHandle>;

// ───────────────────────────────────────────────────────────────
// ClusterService
// ───────────────────────────────────────────────────────────────

pub struct ClusterService<'a, P: Panel, A, D> {
    config: SystemConfig,
    tach: ClusterTach<'a>,
    coolant: ClusterCoolant<A, D>,
    display: DisplayOrchestrator<P>,
    boot_page: Rc<RefCell<StaticTextPage>>,
    water_page: Rc<RefCell<WaterTempPage>>,
    tach_page: Rc<RefCell<TachPage>>,
    low_power: bool,
    lights_on: bool,
    last_telemetry_ms: u32,
}

impl<'a, P, A, D> ClusterService<'a, P, A, D>
where
    P: Panel,
    P::Surface: 'static,
    A: AnalogPort,
    D: DelayNs,
{
    /// Wire sensors to their pages and register the pages. Nothing touches
    /// hardware until [`begin`](Self::begin).
    pub fn new(
        config: SystemConfig,
        counter: &'a PulseCounter,
        panel: P,
        adc: A,
        delay: D,
    ) -> Self {
        let mut display = DisplayOrchestrator::new(config.display, panel);
        let refresh = display.refresh_handle();

        let boot_page = Rc::new(RefCell::new(StaticTextPage::new("Miata", "Booting")));
        let water_page = Rc::new(RefCell::new(WaterTempPage::new()));
        let tach_page = Rc::new(RefCell::new(TachPage::new()));

        let handle: PageHandle<P::Surface> = boot_page.clone();
        display.add_page(handle);
        let handle: PageHandle<P::Surface> = water_page.clone();
        display.add_page(handle);
        let handle: PageHandle<P::Surface> = tach_page.clone();
        display.add_page(handle);

        let tach = TachometerSensor::new(config.tach, counter, tach_page.clone(), refresh.clone());
        let coolant = TemperatureSensor::new(
            config.temperature,
            CalibrationCurve::miata_coolant(),
            adc,
            delay,
            water_page.clone(),
            refresh,
        );

        Self {
            config,
            tach,
            coolant,
            display,
            boot_page,
            water_page,
            tach_page,
            low_power: false,
            lights_on: false,
            last_telemetry_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the panel up on the boot page.
    pub fn begin(&mut self, clock: &impl Clock, sink: &mut impl EventSink) -> Result<(), DisplayError> {
        if let Err(e) = self.display.begin(clock) {
            sink.emit(&AppEvent::DisplayFailed(e));
            return Err(e);
        }
        self.display.tick(clock);
        Ok(())
    }

    /// Add a line to the boot screen and paint it right away.
    pub fn boot_log(&mut self, line: &str, clock: &impl Clock) {
        self.boot_page.borrow_mut().append_line(line);
        self.display.request_refresh();
        self.display.tick(clock);
    }

    /// Arm the sensors and switch to the tachometer page.
    pub fn start(&mut self, clock: &impl Clock, sink: &mut impl EventSink) {
        self.tach.begin(clock);
        self.coolant.begin(clock);
        self.display.show_page(TACH_PAGE);
        self.display.tick(clock);
        self.last_telemetry_ms = clock.now_ms();
        sink.emit(&AppEvent::Started);
        info!("cluster: started");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One cooperative tick: tach, coolant, display, telemetry. Returns
    /// `true` if the panel was repainted.
    pub fn tick(&mut self, clock: &impl Clock, sink: &mut impl EventSink) -> bool {
        self.tach.update(clock);
        self.coolant.update(clock);
        let rendered = self.display.tick(clock);

        let interval = self.config.telemetry_interval_ms;
        let now = clock.now_ms();
        if interval > 0 && now.wrapping_sub(self.last_telemetry_ms) >= interval {
            self.last_telemetry_ms = now;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
        rendered
    }

    // ── Command handling ──────────────────────────────────────

    /// Parse and run one text line from the command link.
    pub fn handle_line(
        &mut self,
        line: &str,
        lights: &mut impl LightsPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        if line.trim_start().starts_with('{') {
            self.handle_config_json(line, clock);
            return;
        }
        match AppCommand::parse(line) {
            Ok(cmd) => self.handle_command(cmd, lights, clock, sink),
            Err(CommandError::Empty) => {}
            Err(e) => {
                warn!("cluster: {e}: {:?}", line.trim());
                self.show_status("Unknown cmd", clock);
                sink.emit(&AppEvent::CommandRejected(e));
            }
        }
    }

    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        lights: &mut impl LightsPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        info!("cluster: command {:?}", cmd);
        match cmd {
            AppCommand::ToggleLights => self.set_lights(!self.lights_on, lights, clock, sink),
            AppCommand::SetLights(on) => self.set_lights(on, lights, clock, sink),
            AppCommand::NextPage => self.navigate(sink, |d| d.next_page()),
            AppCommand::PreviousPage => self.navigate(sink, |d| d.previous_page()),
            AppCommand::ShowPage(index) => self.navigate(sink, |d| d.show_page(index)),
            AppCommand::Sleep => self.enter_low_power(clock, sink),
            AppCommand::Wake => self.exit_low_power(clock, sink),
            AppCommand::Message(text) => self.show_status(&text, clock),
            AppCommand::ClientConnected => self.show_status("Connected", clock),
            AppCommand::ClientDisconnected => self.show_status("Disconnected", clock),
            AppCommand::Ignored => {}
        }
    }

    fn set_lights(
        &mut self,
        on: bool,
        lights: &mut impl LightsPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        lights.set_lights(on);
        self.lights_on = on;
        self.show_status(if on { "Lights ON" } else { "Lights OFF" }, clock);
        sink.emit(&AppEvent::LightsChanged(on));
    }

    fn navigate(
        &mut self,
        sink: &mut impl EventSink,
        go: impl FnOnce(&mut DisplayOrchestrator<P>),
    ) {
        let from = self.display.current_page_index();
        go(&mut self.display);
        let to = self.display.current_page_index();
        if from != to {
            sink.emit(&AppEvent::PageChanged { from, to });
        }
    }

    /// Transient status overlay. While the panel is dark the message only
    /// goes to the log.
    pub fn show_status(&mut self, text: &str, clock: &impl Clock) {
        if !self.display.is_ready() {
            return;
        }
        if self.display.is_suspended() {
            info!("status (suspended): {}", text);
            return;
        }
        self.display.show_transient_message(
            text,
            self.config.overlay_duration_ms,
            OverlayColors::default(),
            clock,
        );
    }

    fn handle_config_json(&mut self, json: &str, clock: &impl Clock) {
        match SystemConfig::from_json(json) {
            Ok(config) => {
                let restart = self.apply_config(config);
                self.show_status(if restart { "Restart to apply" } else { "Config applied" }, clock);
            }
            Err(e) => {
                warn!("cluster: {e}");
                self.show_status("Bad config", clock);
            }
        }
    }

    /// Take over the timing settings of `config` immediately. Returns `true`
    /// if it also changes sensor or panel settings, which only apply at the
    /// next boot.
    pub fn apply_config(&mut self, config: SystemConfig) -> bool {
        let restart = config.tach != self.config.tach
            || config.temperature != self.config.temperature
            || config.display != self.config.display;
        self.config.overlay_duration_ms = config.overlay_duration_ms;
        self.config.telemetry_interval_ms = config.telemetry_interval_ms;
        self.config.loop_period_ms = config.loop_period_ms;
        if restart {
            warn!("config: sensor/display changes take effect after restart");
        } else {
            info!("config: timing updated");
        }
        restart
    }

    // ── Low-power mode ────────────────────────────────────────

    pub fn enter_low_power(&mut self, clock: &impl Clock, sink: &mut impl EventSink) {
        if self.low_power {
            return;
        }
        info!("cluster: entering low power mode");
        self.low_power = true;
        self.coolant.set_enabled(false);
        self.tach.set_enabled(false, clock);
        self.display.set_suspended(true);
        sink.emit(&AppEvent::LowPowerChanged(true));
    }

    pub fn exit_low_power(&mut self, clock: &impl Clock, sink: &mut impl EventSink) {
        if !self.low_power {
            return;
        }
        info!("cluster: leaving low power mode");
        self.low_power = false;
        self.display.set_suspended(false);
        self.coolant.set_enabled(true);
        self.tach.set_enabled(true, clock);
        self.show_status("Awake", clock);
        sink.emit(&AppEvent::LowPowerChanged(false));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            rpm: self.tach.last_rpm().round() as u32,
            water_c: match self.coolant.status() {
                TempStatus::SensorError => None,
                _ => self.coolant.last_celsius(),
            },
            low_power: self.low_power,
            page: self.display.current_page_index(),
        }
    }

    pub fn is_low_power(&self) -> bool {
        self.low_power
    }

    pub fn lights_on(&self) -> bool {
        self.lights_on
    }

    pub fn display(&self) -> &DisplayOrchestrator<P> {
        &self.display
    }

    pub fn tach(&self) -> &ClusterTach<'a> {
        &self.tach
    }

    pub fn coolant(&self) -> &ClusterCoolant<A, D> {
        &self.coolant
    }

    pub fn tach_page(&self) -> &Rc<RefCell<TachPage>> {
        &self.tach_page
    }

    pub fn water_page(&self) -> &Rc<RefCell<WaterTempPage>> {
        &self.water_page
    }

    pub fn boot_page(&self) -> &Rc<RefCell<StaticTextPage>> {
        &self.boot_page
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}
