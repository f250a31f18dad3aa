//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ sensors / DisplayOrchestrator / ClusterService
//! ```
//!
//! Driven adapters (clock, ADC, panel, lights, event sinks) implement these
//! traits. The domain core consumes them via generics, so nothing in
//! `sensors` or `display` touches hardware directly and every component can
//! be driven from a host test with a manual clock.

use core::cell::RefCell;
use std::rc::Rc;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::config::DisplayConfig;
use crate::error::DisplayError;
use crate::sensors::tachometer::TachStatus;
use crate::sensors::temperature::TempStatus;

// ───────────────────────────────────────────────────────────────
// Hardware abstraction (driven adapters: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source. Both counters wrap at `u32::MAX`; consumers
/// compare with `wrapping_sub`.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u32;

    /// Microseconds since boot.
    fn now_us(&self) -> u32;
}

/// Raw ADC access.
pub trait AnalogPort {
    /// One conversion on `pin`, in counts.
    fn read_analog(&mut self, pin: i32) -> u16;
}

/// The physical panel. Allocation happens exactly once, from
/// [`DisplayOrchestrator::begin`](crate::display::orchestrator::DisplayOrchestrator::begin).
pub trait Panel {
    type Surface: DrawTarget<Color = Rgb565>;

    /// Construct the panel driver, apply rotation, and hand back the drawable
    /// surface.
    fn allocate(&mut self, config: &DisplayConfig) -> Result<Self::Surface, DisplayError>;

    /// Drive the backlight, if the board has one.
    fn set_backlight(&mut self, _on: bool) {}
}

/// Auxiliary lights relay.
pub trait LightsPort {
    fn set_lights(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Sensor → display plumbing
// ───────────────────────────────────────────────────────────────

/// Tells the display orchestrator that page content changed.
///
/// Implementations must only flip a flag; they may be called before the
/// panel exists.
pub trait RefreshSink {
    fn request_refresh(&self);
}

/// Setter surface of whatever shows the engine speed.
pub trait TachometerView {
    fn set_rpm(&mut self, rpm: f32);
    fn set_status(&mut self, status: TachStatus);
}

/// Setter surface of whatever shows the coolant temperature.
pub trait TemperatureView {
    fn set_temperature(&mut self, celsius: f32);
    fn set_status(&mut self, status: TempStatus);
}

impl<T: TachometerView + ?Sized> TachometerView for Rc<RefCell<T>> {
    fn set_rpm(&mut self, rpm: f32) {
        self.borrow_mut().set_rpm(rpm);
    }

    fn set_status(&mut self, status: TachStatus) {
        self.borrow_mut().set_status(status);
    }
}

impl<T: TemperatureView + ?Sized> TemperatureView for Rc<RefCell<T>> {
    fn set_temperature(&mut self, celsius: f32) {
        self.borrow_mut().set_temperature(celsius);
    }

    fn set_status(&mut self, status: TempStatus) {
        self.borrow_mut().set_status(status);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The service emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, the
/// wireless link, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
