//! Configuration rejection reasons

use core::fmt;

/// Enumerated configuration field, used to report which raw code was bad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Bandwidth,
    SpreadingFactor,
    CodeRate,
    Ldro,
}

/// Why a configuration was rejected
///
/// A rejected configuration is never applied, even in part. The caller keeps
/// running on the last configuration that validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Centre frequency, or centre plus offset, outside the device band
    OutOfBandFrequency { frequency_hz: u32, offset_hz: i32 },
    /// Calibration offset larger than the device allows
    OffsetOutOfRange { offset_hz: i32 },
    /// Spreading factor and bandwidth give a symbol longer than the device limit
    IncompatibleModulationParams { symbol_duration_us: u32 },
    /// Transmit power outside the device range (never clamped)
    PowerOutOfRange { tx_power_dbm: i8 },
    /// Raw register code that names no enumerated value
    InvalidEnumValue { field: ConfigField, value: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBandFrequency {
                frequency_hz,
                offset_hz,
            } => write!(
                f,
                "frequency {frequency_hz} Hz (offset {offset_hz} Hz) outside device band"
            ),
            Self::OffsetOutOfRange { offset_hz } => {
                write!(f, "calibration offset {offset_hz} Hz out of range")
            }
            Self::IncompatibleModulationParams { symbol_duration_us } => write!(
                f,
                "symbol duration {symbol_duration_us} us exceeds device limit"
            ),
            Self::PowerOutOfRange { tx_power_dbm } => {
                write!(f, "tx power {tx_power_dbm} dBm outside device range")
            }
            Self::InvalidEnumValue { field, value } => {
                write!(f, "invalid {field:?} code {value:#04x}")
            }
        }
    }
}
