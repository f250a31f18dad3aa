//! Miata cluster firmware library.
//!
//! Exposes the sensor pipeline, the display orchestrator and the
//! application service for integration testing on the host. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod display;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod sensors;

#[cfg(test)]
mod test_support;
