//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements          | Connects to                |
//! |----------------|---------------------|----------------------------|
//! | `edge_binding` | (ISR ownership)     | GPIO ISR service           |
//! | `hardware`     | AnalogPort          | ESP32 ADC1 oneshot         |
//! |                | LightsPort          | ESP32 GPIO                 |
//! | `log_sink`     | EventSink           | Serial log output          |
//! | `panel`        | Panel               | GC9A01 over SPI (mipidsi)  |
//! | `time`         | Clock               | ESP32 system timer         |

pub mod edge_binding;
pub mod hardware;
pub mod log_sink;
pub mod panel;
pub mod time;
