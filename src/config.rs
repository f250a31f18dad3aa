//! System configuration parameters
//!
//! All tunable parameters for the cluster. Defaults are the values the car
//! runs with; a JSON override can be pushed over the command link.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tachometer acquisition settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TachConfig {
    /// GPIO carrying the conditioned ignition pulse train.
    pub signal_pin: i32,
    /// Measurement window length (milliseconds).
    pub update_interval_ms: u32,
    /// Ignition pulses per crank revolution (2 for a wasted-spark 4-cylinder).
    pub pulses_per_revolution: f32,
    /// Minimum RPM change before the display is touched.
    pub change_threshold_rpm: f32,
    /// Edges closer together than this are treated as bounce (microseconds).
    pub min_edge_interval_us: u32,
}

impl Default for TachConfig {
    fn default() -> Self {
        Self {
            signal_pin: crate::pins::TACH_SIGNAL_GPIO,
            update_interval_ms: 250,
            pulses_per_revolution: 2.0,
            change_threshold_rpm: 25.0,
            min_edge_interval_us: 2000,
        }
    }
}

/// Coolant temperature sender settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureConfig {
    /// ADC-capable GPIO wired to the sender divider.
    pub analog_pin: i32,
    /// ADC reference voltage (volts).
    pub reference_voltage: f32,
    /// Full-scale ADC count.
    pub adc_resolution: u16,
    /// Pull-up resistor between the reference and the sender (ohms).
    pub pullup_resistor_ohms: f32,
    /// Time between acquisitions (milliseconds).
    pub sample_interval_ms: u32,
    /// ADC reads averaged per acquisition.
    pub samples: u8,
    /// Minimum temperature change before the display is touched (°C).
    pub change_threshold_c: f32,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            analog_pin: crate::pins::COOLANT_ADC_GPIO,
            reference_voltage: 3.3,
            adc_resolution: 4095,
            pullup_resistor_ohms: 4700.0,
            sample_interval_ms: 500,
            samples: 16,
            change_threshold_c: 0.5,
        }
    }
}

/// Round panel settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Panel rotation in quarter turns (0-3).
    pub rotation: u8,
    /// Background colour as raw RGB565.
    pub background_rgb565: u16,
    /// Periodic repaint interval; 0 = repaint only when marked dirty.
    pub refresh_interval_ms: u32,
    pub width: u16,
    pub height: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rotation: 0,
            background_rgb565: 0x0000,
            refresh_interval_ms: 0, // event-driven, no flicker
            width: 240,
            height: 240,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub tach: TachConfig,
    pub temperature: TemperatureConfig,
    pub display: DisplayConfig,

    // --- Timing ---
    /// How long status overlays stay on screen (milliseconds).
    pub overlay_duration_ms: u32,
    /// Telemetry report interval (milliseconds).
    pub telemetry_interval_ms: u32,
    /// Main loop pacing (milliseconds).
    pub loop_period_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            tach: TachConfig::default(),
            temperature: TemperatureConfig::default(),
            display: DisplayConfig::default(),
            overlay_duration_ms: 2000,
            telemetry_interval_ms: 500,
            loop_period_ms: 50,
        }
    }
}

impl SystemConfig {
    /// Parse a JSON config blob. Missing or malformed fields are an error;
    /// the caller keeps its current config in that case.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed config JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks. The sensors clamp defensively anyway; this is for
    /// rejecting a bad override before it is applied.
    pub fn validate(&self) -> Result<()> {
        let reals = [
            self.tach.pulses_per_revolution,
            self.tach.change_threshold_rpm,
            self.temperature.reference_voltage,
            self.temperature.pullup_resistor_ohms,
            self.temperature.change_threshold_c,
        ];
        if reals.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("non-finite value"));
        }
        if self.tach.pulses_per_revolution <= 0.0 {
            return Err(Error::Config("tach.pulses_per_revolution must be > 0"));
        }
        if self.tach.update_interval_ms == 0 {
            return Err(Error::Config("tach.update_interval_ms must be > 0"));
        }
        if self.tach.change_threshold_rpm < 0.0 {
            return Err(Error::Config("tach.change_threshold_rpm must be >= 0"));
        }
        if self.temperature.samples == 0 {
            return Err(Error::Config("temperature.samples must be > 0"));
        }
        if self.temperature.adc_resolution < 2 {
            return Err(Error::Config("temperature.adc_resolution too small"));
        }
        if self.temperature.reference_voltage <= 0.0 {
            return Err(Error::Config("temperature.reference_voltage must be > 0"));
        }
        if self.temperature.pullup_resistor_ohms <= 0.0 {
            return Err(Error::Config("temperature.pullup_resistor_ohms must be > 0"));
        }
        if self.display.rotation > 3 {
            return Err(Error::Config("display.rotation must be 0-3"));
        }
        Ok(())
    }
}
