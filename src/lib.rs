#![cfg_attr(not(test), no_std)]

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod lora;
pub mod protocol;
pub mod radio;
pub mod serial;
pub mod transmitter;

// Embassy tasks need the executor and timers, only available with the embedded feature
#[cfg(feature = "embedded")]
pub mod tasks;
