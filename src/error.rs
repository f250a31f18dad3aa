//! Unified error types for the cluster firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! main loop's error handling uniform. All variants are `Copy` so they can be
//! passed around without allocation.
//!
//! Only one of these is fatal at run time: [`DisplayError::AllocationFailed`].
//! Sensor errors are surfaced as status labels and retried on the next sample
//! interval; configuration errors are clamped to safe defaults.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor reading was rejected.
    Sensor(SensorError),
    /// The display could not be brought up or used.
    Display(DisplayError),
    /// The calibration table is unusable.
    Calibration(CalibrationError),
    /// The interrupt source is already bound to another pulse counter.
    Bind(BindError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Calibration(e) => write!(f, "calibration: {e}"),
            Self::Bind(e) => write!(f, "bind: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Averaged ADC count sits at either rail (open or shorted sender).
    AdcSaturated,
    /// Voltage-divider math produced a non-positive resistance.
    InvalidResistance,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcSaturated => write!(f, "ADC reading at rail"),
            Self::InvalidResistance => write!(f, "sender resistance out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The panel driver could not be constructed. Not recoverable without
    /// a power cycle.
    AllocationFailed,
    /// The panel peripherals were already handed out.
    AlreadyAllocated,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed => write!(f, "surface allocation failed"),
            Self::AlreadyAllocated => write!(f, "surface already allocated"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Calibration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The table has no points at all.
    Empty,
    /// Points are not ordered by decreasing resistance / increasing
    /// temperature. Carries the index of the first offending point.
    Unsorted(usize),
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "calibration table is empty"),
            Self::Unsorted(i) => write!(f, "calibration point {i} out of order"),
        }
    }
}

impl From<CalibrationError> for Error {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e)
    }
}

// ---------------------------------------------------------------------------
// Interrupt binding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    /// Only one pulse source can own the edge interrupt at a time.
    AlreadyBound,
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyBound => write!(f, "pulse interrupt already bound"),
        }
    }
}

impl From<BindError> for Error {
    fn from(e: BindError) -> Self {
        Self::Bind(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
