//! Ownership of the tach edge interrupt.
//!
//! The GPIO interrupt vector is a process-wide resource: exactly one
//! [`PulseCounter`] may be wired to it at a time. [`EdgeBinding`] is the
//! handle that proves ownership. Claiming a second binding fails with
//! [`BindError::AlreadyBound`]; dropping the handle detaches the ISR and
//! frees the slot.

use core::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::drivers::hw_init;
use crate::error::{BindError, Error, Result};
use crate::sensors::pulse_counter::PulseCounter;

static BOUND: AtomicBool = AtomicBool::new(false);

pub struct EdgeBinding {
    counter: &'static PulseCounter,
    pin: i32,
}

impl EdgeBinding {
    /// Route rising edges on `pin` to `counter`.
    pub fn claim(counter: &'static PulseCounter, pin: i32) -> Result<Self> {
        if BOUND
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BindError::AlreadyBound.into());
        }
        if let Err(e) = hw_init::attach_tach_isr(pin, counter) {
            BOUND.store(false, Ordering::Release);
            log::error!("edge binding: {e}");
            return Err(Error::Init("tach ISR attach failed"));
        }
        info!("edge binding: GPIO{} bound", pin);
        Ok(Self { counter, pin })
    }

    pub fn counter(&self) -> &'static PulseCounter {
        self.counter
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    pub fn is_bound() -> bool {
        BOUND.load(Ordering::Acquire)
    }
}

impl Drop for EdgeBinding {
    fn drop(&mut self) {
        hw_init::detach_tach_isr(self.pin);
        self.counter.set_armed(false);
        BOUND.store(false, Ordering::Release);
        info!("edge binding: GPIO{} released", self.pin);
    }
}
