//! Sensor acquisition: the ISR edge counter, the two sensor front ends, and
//! the calibration helpers they share.
//!
//! ```text
//!   GPIO ISR ──▶ PulseCounter ──▶ TachometerSensor ──▶ TachometerView ─┐
//!                                                                        ├─▶ RefreshSink
//!   ADC ─────────────────────────▶ TemperatureSensor ─▶ TemperatureView ─┘
//! ```
//!
//! Sensors never draw. They mutate their view and flag the display dirty;
//! the orchestrator decides when to repaint.

pub mod calibration;
pub mod pulse_counter;
pub mod tachometer;
pub mod temperature;

pub use calibration::{CalibrationCurve, CalibrationPoint, Hysteresis, SensorReading};
pub use pulse_counter::PulseCounter;
pub use tachometer::{TachStatus, TachometerSensor};
pub use temperature::{TempStatus, TemperatureSensor};
