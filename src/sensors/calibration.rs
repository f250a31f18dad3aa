//! Calibration curves and change thresholds shared by the sensors.
//!
//! ## Curve interpolation
//!
//! A sender is described by a fixed table of `(temperature, resistance)`
//! points ordered by decreasing resistance / increasing temperature (NTC
//! behaviour). Resistances outside the table clamp to the end points;
//! anything in between is linearly interpolated on the bracketing pair.
//!
//! ## Hysteresis
//!
//! [`Hysteresis`] remembers the last value that was propagated to the display
//! and only lets a new one through once it differs by at least the configured
//! threshold. This keeps sub-threshold jitter from invalidating the screen.

use log::warn;

use crate::error::CalibrationError;

/// One point of a sender's resistance/temperature curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    pub temperature_c: f32,
    pub resistance_ohms: f32,
}

impl CalibrationPoint {
    pub const fn new(temperature_c: f32, resistance_ohms: f32) -> Self {
        Self {
            temperature_c,
            resistance_ohms,
        }
    }
}

/// Stock NA/NB coolant temperature sender.
pub const MIATA_COOLANT_CURVE: &[CalibrationPoint] = &[
    CalibrationPoint::new(0.0, 5200.0),
    CalibrationPoint::new(20.0, 2300.0),
    CalibrationPoint::new(40.0, 1200.0),
    CalibrationPoint::new(60.0, 600.0),
    CalibrationPoint::new(80.0, 300.0),
    CalibrationPoint::new(100.0, 180.0),
];

/// A validated, sorted calibration table.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationCurve {
    points: &'static [CalibrationPoint],
}

impl CalibrationCurve {
    /// Validate ordering once, up front.
    ///
    /// A single-point table is accepted (every lookup clamps to it) but
    /// logged, since it cannot describe a real sender.
    pub fn new(points: &'static [CalibrationPoint]) -> Result<Self, CalibrationError> {
        if points.is_empty() {
            return Err(CalibrationError::Empty);
        }
        for (i, pair) in points.windows(2).enumerate() {
            let (prev, curr) = (pair[0], pair[1]);
            if curr.resistance_ohms >= prev.resistance_ohms
                || curr.temperature_c <= prev.temperature_c
            {
                return Err(CalibrationError::Unsorted(i + 1));
            }
        }
        if points.len() == 1 {
            warn!(
                "calibration: single-point table, temperature pinned at {:.1}C",
                points[0].temperature_c
            );
        }
        Ok(Self { points })
    }

    /// The stock coolant sender curve.
    pub fn miata_coolant() -> Self {
        Self {
            points: MIATA_COOLANT_CURVE,
        }
    }

    /// Temperature for a sender resistance.
    pub fn temperature_for(&self, resistance_ohms: f32) -> f32 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        if resistance_ohms >= first.resistance_ohms {
            return first.temperature_c;
        }
        if resistance_ohms <= last.resistance_ohms {
            return last.temperature_c;
        }

        for pair in self.points.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            if resistance_ohms >= curr.resistance_ohms {
                let span = prev.resistance_ohms - curr.resistance_ohms;
                let fraction = (resistance_ohms - curr.resistance_ohms) / span;
                return curr.temperature_c + (prev.temperature_c - curr.temperature_c) * fraction;
            }
        }

        // Unreachable for a validated table; NaN input lands here.
        last.temperature_c
    }
}

// ---------------------------------------------------------------------------
// Change threshold
// ---------------------------------------------------------------------------

/// Last value accepted for display, and when.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    /// `None` until the first valid reading.
    pub value: Option<f32>,
    pub accepted_at_ms: u32,
}

/// Minimum-change gate between a sensor and its page.
#[derive(Debug, Clone, Copy)]
pub struct Hysteresis {
    threshold: f32,
    reading: SensorReading,
}

impl Hysteresis {
    /// Gate with no prior value; the first finite reading always passes.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: sanitize_threshold(threshold),
            reading: SensorReading::default(),
        }
    }

    /// Gate seeded with a known starting value.
    pub fn starting_at(threshold: f32, value: f32) -> Self {
        Self {
            threshold: sanitize_threshold(threshold),
            reading: SensorReading {
                value: Some(value),
                accepted_at_ms: 0,
            },
        }
    }

    /// Returns `true` (and remembers `value`) if it should be propagated.
    pub fn accept(&mut self, value: f32, now_ms: u32) -> bool {
        if !value.is_finite() {
            return false;
        }
        let changed = match self.reading.value {
            None => true,
            Some(last) => (value - last).abs() >= self.threshold,
        };
        if changed {
            self.force(value, now_ms);
        }
        changed
    }

    /// Overwrite the remembered value without checking the threshold.
    pub fn force(&mut self, value: f32, now_ms: u32) {
        self.reading = SensorReading {
            value: Some(value),
            accepted_at_ms: now_ms,
        };
    }

    pub fn last(&self) -> Option<f32> {
        self.reading.value
    }

    pub fn reading(&self) -> SensorReading {
        self.reading
    }
}

fn sanitize_threshold(threshold: f32) -> f32 {
    if threshold.is_finite() && threshold > 0.0 {
        threshold
    } else {
        if threshold != 0.0 {
            warn!("hysteresis: invalid threshold {}, using 0", threshold);
        }
        0.0
    }
}
