//! Interrupt-driven tachometer edge counter.
//!
//! ```text
//!   GPIO rising edge ──▶ ISR ──▶ on_edge_at(now_us) ─┐
//!                                                     │  critical section
//!   main loop ──▶ TachometerSensor::update ──▶ drain()┘
//! ```
//!
//! The ISR and the cooperative loop share exactly two values: the pending
//! pulse count and the timestamp of the last accepted edge. Both live in one
//! `critical_section::Mutex<Cell<_>>`, so an edge landing during a drain is
//! either in the returned count or in the next one, never both and never
//! neither.
//!
//! Debounce is by minimum interval: an edge arriving less than
//! `min_interval_us` after the previous *accepted* edge is dropped. An edge
//! exactly at the boundary is accepted. At 2 pulses/rev a 2000 µs spacing
//! caps the measurable speed at 15 000 rpm, so the default leaves headroom;
//! tighten the interval if a sender produces more pulses per revolution.

use core::cell::Cell;

use critical_section::Mutex;

use crate::app::ports::Clock;

#[derive(Debug, Clone, Copy)]
struct EdgeState {
    count: u32,
    last_edge_us: Option<u32>,
    min_interval_us: u32,
    armed: bool,
}

/// Shared ISR/loop edge tally. Meant to live in a `static`.
pub struct PulseCounter {
    state: Mutex<Cell<EdgeState>>,
}

impl PulseCounter {
    /// A disarmed counter; edges are ignored until [`set_armed`](Self::set_armed).
    pub const fn new(min_interval_us: u32) -> Self {
        Self {
            state: Mutex::new(Cell::new(EdgeState {
                count: 0,
                last_edge_us: None,
                min_interval_us,
                armed: false,
            })),
        }
    }

    /// ISR entry point. Bounded integer work only; returns whether the edge
    /// was counted.
    pub fn on_edge_at(&self, now_us: u32) -> bool {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            if !s.armed {
                return false;
            }
            if let Some(last) = s.last_edge_us {
                if now_us.wrapping_sub(last) < s.min_interval_us {
                    return false;
                }
            }
            s.count = s.count.wrapping_add(1);
            s.last_edge_us = Some(now_us);
            cell.set(s);
            true
        })
    }

    /// ISR entry point reading the microsecond clock itself.
    pub fn on_edge(&self, clock: &impl Clock) -> bool {
        self.on_edge_at(clock.now_us())
    }

    /// Read-and-clear the pending count.
    pub fn drain(&self) -> u32 {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            let count = s.count;
            s.count = 0;
            cell.set(s);
            count
        })
    }

    /// Pending count without clearing it.
    pub fn pending(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow(cs).get().count)
    }


    /// Arm or disarm edge counting. Either way the count and debounce
    /// timestamp are cleared in the same critical section.
    pub fn set_armed(&self, armed: bool) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            s.count = 0;
            s.last_edge_us = None;
            s.armed = armed;
            cell.set(s);
        });
    }

    pub fn is_armed(&self) -> bool {
        critical_section::with(|cs| self.state.borrow(cs).get().armed)
    }

    pub fn set_min_edge_interval(&self, min_interval_us: u32) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut s = cell.get();
            s.min_interval_us = min_interval_us;
            cell.set(s);
        });
    }
}
