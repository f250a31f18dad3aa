//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production). Telemetry goes out as the same
//! compact JSON the wireless link carries, prefixed so it can be grepped
//! out of a serial capture.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    telemetry_sent: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Telemetry frames written so far.
    pub fn telemetry_sent(&self) -> u32 {
        self.telemetry_sent
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match t.to_json() {
                Ok(json) => {
                    self.telemetry_sent = self.telemetry_sent.wrapping_add(1);
                    info!("TELEM | {}", json);
                }
                Err(e) => warn!("TELEM | encode failed: {}", e),
            },
            AppEvent::Started => info!("START | cluster running"),
            AppEvent::LowPowerChanged(on) => {
                info!("POWER | low power {}", if *on { "on" } else { "off" });
            }
            AppEvent::PageChanged { from, to } => info!("PAGE  | {} -> {}", from, to),
            AppEvent::LightsChanged(on) => {
                info!("LIGHT | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::CommandRejected(e) => warn!("CMD   | rejected: {}", e),
            AppEvent::DisplayFailed(e) => error!("DISP  | {}", e),
        }
    }
}
