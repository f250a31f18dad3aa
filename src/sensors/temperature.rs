//! Coolant temperature from a resistive sender.
//!
//! The sender sits on the low side of a voltage divider with a fixed
//! pull-up to the ADC reference:
//!
//! ```text
//!   Vref ──[ R_pullup ]──┬── ADC pin
//!                        │
//!                    [ R_sender ]
//!                        │
//!                       GND
//!
//!   V        = avg_counts / resolution * Vref
//!   R_sender = V * R_pullup / (Vref - V)
//! ```
//!
//! `R_sender` is mapped to °C through a [`CalibrationCurve`]. A mean at
//! either ADC rail means an open or shorted sender; that is reported as a
//! status label and retried on the next sample interval.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use super::calibration::{CalibrationCurve, Hysteresis};
use crate::app::ports::{AnalogPort, Clock, RefreshSink, TemperatureView};
use crate::config::TemperatureConfig;
use crate::error::SensorError;

/// Spacing between oversampled ADC reads.
const SAMPLE_SPACING_US: u32 = 150;

const WARM_C: f32 = 80.0;
const HOT_C: f32 = 105.0;

/// Status line shown under the temperature figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempStatus {
    WarmingUp,
    Normal,
    Hot,
    SensorError,
    Sleeping,
}

impl TempStatus {
    pub fn classify(celsius: f32) -> Self {
        if celsius < WARM_C {
            Self::WarmingUp
        } else if celsius < HOT_C {
            Self::Normal
        } else {
            Self::Hot
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::WarmingUp => "Warming up",
            Self::Normal => "",
            Self::Hot => "Hot!",
            Self::SensorError => "Sensor error",
            Self::Sleeping => "Sleeping",
        }
    }
}

pub struct TemperatureSensor<A, D, V, R> {
    config: TemperatureConfig,
    curve: CalibrationCurve,
    adc: A,
    delay: D,
    view: V,
    refresh: R,
    enabled: bool,
    last_sample_ms: u32,
    gate: Hysteresis,
    status: TempStatus,
}

impl<A, D, V, R> TemperatureSensor<A, D, V, R>
where
    A: AnalogPort,
    D: DelayNs,
    V: TemperatureView,
    R: RefreshSink,
{
    pub fn new(
        config: TemperatureConfig,
        curve: CalibrationCurve,
        adc: A,
        delay: D,
        view: V,
        refresh: R,
    ) -> Self {
        if config.samples == 0 {
            warn!("coolant: samples = 0, reading once per interval");
        }
        Self {
            config,
            curve,
            adc,
            delay,
            view,
            refresh,
            enabled: true,
            last_sample_ms: 0,
            gate: Hysteresis::new(config.change_threshold_c),
            status: TempStatus::Normal,
        }
    }

    /// Back-date the last sample so the first `update` reads immediately.
    pub fn begin(&mut self, clock: &impl Clock) {
        self.last_sample_ms = clock.now_ms().wrapping_sub(self.config.sample_interval_ms);
        info!(
            "coolant: started (pin {}, every {} ms, {} samples)",
            self.config.analog_pin, self.config.sample_interval_ms, self.config.samples
        );
    }

    /// Sample if the interval elapsed. Returns the temperature if it was
    /// propagated to the view.
    pub fn update(&mut self, clock: &impl Clock) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        let now = clock.now_ms();
        if now.wrapping_sub(self.last_sample_ms) < self.config.sample_interval_ms {
            return None;
        }
        self.last_sample_ms = now;

        let celsius = match self.read_celsius() {
            Ok(c) => c,
            Err(e) => {
                warn!("coolant: {e}, retrying next interval");
                self.status = TempStatus::SensorError;
                self.view.set_status(self.status);
                self.refresh.request_refresh();
                return None;
            }
        };

        // Recovering from a sensor error always repaints the label.
        let recovering = self.status == TempStatus::SensorError;
        if !self.gate.accept(celsius, now) {
            if !recovering {
                return None;
            }
            self.gate.force(celsius, now);
        }

        self.status = TempStatus::classify(celsius);
        self.view.set_temperature(celsius);
        self.view.set_status(self.status);
        self.refresh.request_refresh();
        Some(celsius)
    }

    /// One oversampled acquisition, converted to °C.
    pub fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let average = self.average_counts();
        let resistance = divider_resistance(
            average,
            self.config.adc_resolution,
            self.config.reference_voltage,
            self.config.pullup_resistor_ohms,
        )?;
        Ok(self.curve.temperature_for(resistance))
    }

    fn average_counts(&mut self) -> f32 {
        let samples = u32::from(self.config.samples.max(1));
        let mut sum: u32 = 0;
        for i in 0..samples {
            if i > 0 {
                self.delay.delay_us(SAMPLE_SPACING_US);
            }
            sum += u32::from(self.adc.read_analog(self.config.analog_pin));
        }
        sum as f32 / samples as f32
    }

    /// Enter or leave low-power mode. Same-state calls do nothing.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            if let Some(last) = self.gate.last() {
                self.status = TempStatus::classify(last);
                self.view.set_status(self.status);
            }
            info!("coolant: enabled");
        } else {
            self.status = TempStatus::Sleeping;
            self.view.set_status(self.status);
            info!("coolant: disabled");
        }
        self.refresh.request_refresh();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last temperature shown, `None` before the first valid reading.
    pub fn last_celsius(&self) -> Option<f32> {
        self.gate.last()
    }

    pub fn status(&self) -> TempStatus {
        self.status
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}

/// Sender resistance from an averaged ADC count.
pub fn divider_resistance(
    average_counts: f32,
    resolution: u16,
    reference_voltage: f32,
    pullup_ohms: f32,
) -> Result<f32, SensorError> {
    let full_scale = f32::from(resolution);
    if average_counts <= 1.0 || average_counts >= full_scale - 1.0 {
        return Err(SensorError::AdcSaturated);
    }
    let volts = average_counts / full_scale * reference_voltage;
    let resistance = volts * pullup_ohms / (reference_voltage - volts);
    if !(resistance > 0.0) || !resistance.is_finite() {
        return Err(SensorError::InvalidResistance);
    }
    Ok(resistance)
}
