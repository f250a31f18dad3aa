//! Outbound application events.
//!
//! The [`ClusterService`](super::service::ClusterService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them: log to serial, notify the
//! wireless client, etc.

use serde::Serialize;

use super::commands::CommandError;
use crate::error::DisplayError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Sensors armed and the first data page is up.
    Started,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// Low-power mode was entered (`true`) or left.
    LowPowerChanged(bool),

    /// The visible page changed.
    PageChanged { from: usize, to: usize },

    /// The lights relay was switched.
    LightsChanged(bool),

    /// A command line could not be understood.
    CommandRejected(CommandError),

    /// The panel could not be brought up.
    DisplayFailed(DisplayError),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryData {
    /// Last propagated engine speed, whole rpm.
    pub rpm: u32,
    /// Last propagated coolant temperature; `null` before the first reading.
    pub water_c: Option<f32>,
    pub low_power: bool,
    /// Index of the visible page.
    pub page: usize,
}

impl TelemetryData {
    /// Compact JSON payload for the wireless link.
    pub fn to_json(&self) -> serde_json::Result<std::string::String> {
        serde_json::to_string(self)
    }
}
