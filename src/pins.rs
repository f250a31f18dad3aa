//! GPIO / peripheral pin assignments for the cluster board (ESP32 DevKit).
//!
//! Pins driven through raw `esp-idf-sys` calls are numbered here. The panel's
//! SPI bus (SCL 18, SDA 23, CS 5, DC 16, RST 17) is claimed as typed
//! `esp-idf-hal` peripherals in `main.rs` instead.

// ---------------------------------------------------------------------------
// Round display (GC9A01, SPI)
// ---------------------------------------------------------------------------

/// Backlight enable (active HIGH).
pub const TFT_BACKLIGHT_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Coolant temperature sender — divider tap into ADC1 channel 6.
pub const COOLANT_ADC_GPIO: i32 = 34;
/// ADC1 channel number for [`COOLANT_ADC_GPIO`].
pub const COOLANT_ADC_CHANNEL: u32 = 6;

/// Conditioned ignition pulse train — input-only pin, rising-edge interrupt.
pub const TACH_SIGNAL_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Auxiliary lights relay (active HIGH).
pub const LIGHTS_GPIO: i32 = 2;
