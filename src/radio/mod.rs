//! LoRa PHY configuration: typed parameters, validation and register encoding

pub mod active;
pub mod device;
pub mod error;
pub mod registers;
pub mod timing;
pub mod types;
pub mod validate;

pub use active::ActiveConfig;
pub use device::{Device, DeviceLimits};
pub use error::{ConfigError, ConfigField};
pub use timing::PacketShape;
pub use types::{Bandwidth, CodeRate, LdroMode, RadioConfig, RawRadioConfig, SpreadingFactor};
pub use validate::{RadioConfigValidator, ValidatedConfig};
