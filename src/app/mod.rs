//! Application core: cluster orchestration behind port traits.
//!
//! [`service::ClusterService`] ties the tachometer, the coolant sender and
//! the display orchestrator together, interprets text commands from the
//! wireless link and reports telemetry. All interaction with hardware
//! happens through the traits in [`ports`], so this layer runs on the host
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
