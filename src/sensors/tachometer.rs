//! Engine speed from the ignition pulse train.
//!
//! Once per `update_interval_ms` the sensor drains the [`PulseCounter`],
//! turns the count into RPM over the actual elapsed window, and pushes the
//! value to its view only when it moved by at least `change_threshold_rpm`.
//!
//! ```text
//!   rpm = pulses / (elapsed_ms / 1000) * 60 / pulses_per_revolution
//! ```

use log::{info, warn};

use super::calibration::Hysteresis;
use super::pulse_counter::PulseCounter;
use crate::app::ports::{Clock, RefreshSink, TachometerView};
use crate::config::TachConfig;

/// Below this the engine is considered stopped.
const ENGINE_OFF_RPM: f32 = 100.0;
/// Below this (and above [`ENGINE_OFF_RPM`]) the engine is idling.
const IDLE_RPM: f32 = 1200.0;
/// Above this the driver is told to shift.
const SHIFT_RPM: f32 = 5500.0;

/// Status line shown under the RPM figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TachStatus {
    EngineOff,
    Idle,
    Normal,
    Redline,
    Sleeping,
    AwaitingSignal,
}

impl TachStatus {
    /// Classify a propagated RPM value.
    pub fn classify(rpm: f32) -> Self {
        if rpm < ENGINE_OFF_RPM {
            Self::EngineOff
        } else if rpm < IDLE_RPM {
            Self::Idle
        } else if rpm > SHIFT_RPM {
            Self::Redline
        } else {
            Self::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EngineOff => "Engine off",
            Self::Idle => "Idle",
            Self::Normal => "",
            Self::Redline => "Shift pls",
            Self::Sleeping => "Sleeping",
            Self::AwaitingSignal => "Awaiting tach signal",
        }
    }
}

/// Tachometer front end.
pub struct TachometerSensor<'a, V, R> {
    config: TachConfig,
    counter: &'a PulseCounter,
    view: V,
    refresh: R,
    enabled: bool,
    last_update_ms: u32,
    gate: Hysteresis,
    status: TachStatus,
}

impl<'a, V: TachometerView, R: RefreshSink> TachometerSensor<'a, V, R> {
    pub fn new(config: TachConfig, counter: &'a PulseCounter, view: V, refresh: R) -> Self {
        if !(config.pulses_per_revolution > 0.0) {
            warn!(
                "tach: pulses_per_revolution {} is not positive, RPM will read 0",
                config.pulses_per_revolution
            );
        }
        Self {
            config,
            counter,
            view,
            refresh,
            enabled: true,
            last_update_ms: 0,
            gate: Hysteresis::starting_at(config.change_threshold_rpm, 0.0),
            status: TachStatus::AwaitingSignal,
        }
    }

    /// Start the first measurement window at `now` and arm the counter.
    pub fn begin(&mut self, clock: &impl Clock) {
        self.last_update_ms = clock.now_ms();
        self.gate = Hysteresis::starting_at(self.config.change_threshold_rpm, 0.0);
        self.counter.set_min_edge_interval(self.config.min_edge_interval_us);
        self.counter.set_armed(self.enabled);
        info!(
            "tach: started (pin {}, {} ms window, {} pulses/rev)",
            self.config.signal_pin, self.config.update_interval_ms, self.config.pulses_per_revolution
        );
    }

    /// Close the current window if it has elapsed. Returns the RPM if it was
    /// propagated to the view.
    pub fn update(&mut self, clock: &impl Clock) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        let now = clock.now_ms();
        let elapsed = now.wrapping_sub(self.last_update_ms);
        if elapsed < self.config.update_interval_ms {
            return None;
        }
        self.last_update_ms = now;

        let pulses = self.counter.drain();
        let rpm = compute_rpm(pulses, elapsed, self.config.pulses_per_revolution);

        if !self.gate.accept(rpm, now) {
            return None;
        }
        self.status = TachStatus::classify(rpm);
        self.view.set_rpm(rpm);
        self.view.set_status(self.status);
        self.refresh.request_refresh();
        Some(rpm)
    }

    /// Enter or leave low-power mode. Same-state calls do nothing.
    pub fn set_enabled(&mut self, enabled: bool, clock: &impl Clock) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.counter.set_armed(enabled);

        let now = clock.now_ms();
        if enabled {
            // New window so the first reading is not averaged over the sleep.
            self.last_update_ms = now;
            self.status = TachStatus::AwaitingSignal;
            info!("tach: enabled");
        } else {
            self.gate.force(0.0, now);
            self.view.set_rpm(0.0);
            self.status = TachStatus::Sleeping;
            info!("tach: disabled");
        }
        self.view.set_status(self.status);
        self.refresh.request_refresh();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last value propagated to the view.
    pub fn last_rpm(&self) -> f32 {
        self.gate.last().unwrap_or(0.0)
    }

    pub fn status(&self) -> TachStatus {
        self.status
    }

    pub fn config(&self) -> &TachConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}

/// RPM over a window; 0 for an empty window, no pulses, or a nonsensical
/// pulses-per-revolution.
pub fn compute_rpm(pulses: u32, elapsed_ms: u32, pulses_per_revolution: f32) -> f32 {
    if elapsed_ms == 0 || pulses == 0 || !(pulses_per_revolution > 0.0) {
        return 0.0;
    }
    let seconds = elapsed_ms as f32 / 1000.0;
    (pulses as f32 / seconds) * 60.0 / pulses_per_revolution
}
