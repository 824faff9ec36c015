//! Embassy tasks
//!
//! Generic over the radio and serial port so `main.rs` only supplies the
//! concrete peripherals.

pub mod serial;
pub mod transmitter;

pub use serial::serial_task;
pub use transmitter::transmitter_task;
