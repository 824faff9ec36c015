//! Typed LoRa modulation parameters and the configuration value objects
//!
//! Raw codes match the SX126x `SetModulationParams` register values, which are
//! also the values the configuration constants and the serial protocol carry.

use crate::radio::error::{ConfigError, ConfigField};

/// LoRa signal bandwidth
///
/// Every SX126x LoRa bandwidth is 500 kHz divided by an integer, which keeps
/// symbol timing exact in integer microseconds.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    /// 7.81 kHz
    Bw7_8 = 0x00,
    /// 10.42 kHz
    Bw10_4 = 0x08,
    /// 15.63 kHz
    Bw15_6 = 0x01,
    /// 20.83 kHz
    Bw20_8 = 0x09,
    /// 31.25 kHz
    Bw31_25 = 0x02,
    /// 41.67 kHz
    Bw41_7 = 0x0A,
    /// 62.5 kHz
    Bw62_5 = 0x03,
    /// 125 kHz
    Bw125 = 0x04,
    /// 250 kHz
    Bw250 = 0x05,
    /// 500 kHz
    Bw500 = 0x06,
}

impl Bandwidth {
    /// All bandwidths, narrowest first
    pub const ALL: [Bandwidth; 10] = [
        Self::Bw7_8,
        Self::Bw10_4,
        Self::Bw15_6,
        Self::Bw20_8,
        Self::Bw31_25,
        Self::Bw41_7,
        Self::Bw62_5,
        Self::Bw125,
        Self::Bw250,
        Self::Bw500,
    ];

    /// Divisor applied to 500 kHz to get this bandwidth
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Bw7_8 => 64,
            Self::Bw10_4 => 48,
            Self::Bw15_6 => 32,
            Self::Bw20_8 => 24,
            Self::Bw31_25 => 16,
            Self::Bw41_7 => 12,
            Self::Bw62_5 => 8,
            Self::Bw125 => 4,
            Self::Bw250 => 2,
            Self::Bw500 => 1,
        }
    }

    /// Bandwidth in Hz, rounded down
    pub const fn hz(self) -> u32 {
        500_000 / self.divisor()
    }

    /// Register code for `SetModulationParams`
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Bandwidth {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Bw7_8),
            0x08 => Ok(Self::Bw10_4),
            0x01 => Ok(Self::Bw15_6),
            0x09 => Ok(Self::Bw20_8),
            0x02 => Ok(Self::Bw31_25),
            0x0A => Ok(Self::Bw41_7),
            0x03 => Ok(Self::Bw62_5),
            0x04 => Ok(Self::Bw125),
            0x05 => Ok(Self::Bw250),
            0x06 => Ok(Self::Bw500),
            _ => Err(ConfigError::InvalidEnumValue {
                field: ConfigField::Bandwidth,
                value,
            }),
        }
    }
}

/// LoRa spreading factor
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpreadingFactor {
    Sf5 = 0x05,
    Sf6 = 0x06,
    Sf7 = 0x07,
    Sf8 = 0x08,
    Sf9 = 0x09,
    Sf10 = 0x0A,
    Sf11 = 0x0B,
    Sf12 = 0x0C,
}

impl SpreadingFactor {
    pub const ALL: [SpreadingFactor; 8] = [
        Self::Sf5,
        Self::Sf6,
        Self::Sf7,
        Self::Sf8,
        Self::Sf9,
        Self::Sf10,
        Self::Sf11,
        Self::Sf12,
    ];

    /// Spreading factor exponent (chips per symbol = 2^value)
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Register code for `SetModulationParams`
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SpreadingFactor {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x05 => Ok(Self::Sf5),
            0x06 => Ok(Self::Sf6),
            0x07 => Ok(Self::Sf7),
            0x08 => Ok(Self::Sf8),
            0x09 => Ok(Self::Sf9),
            0x0A => Ok(Self::Sf10),
            0x0B => Ok(Self::Sf11),
            0x0C => Ok(Self::Sf12),
            _ => Err(ConfigError::InvalidEnumValue {
                field: ConfigField::SpreadingFactor,
                value,
            }),
        }
    }
}

/// LoRa forward error correction rate
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRate {
    /// 4/5
    Cr4_5 = 0x01,
    /// 4/6
    Cr4_6 = 0x02,
    /// 4/7
    Cr4_7 = 0x03,
    /// 4/8
    Cr4_8 = 0x04,
}

impl CodeRate {
    /// Redundancy bits added per four data bits (1 for 4/5 .. 4 for 4/8)
    pub const fn redundancy(self) -> u8 {
        self as u8
    }

    /// Register code for `SetModulationParams`
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CodeRate {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Cr4_5),
            0x02 => Ok(Self::Cr4_6),
            0x03 => Ok(Self::Cr4_7),
            0x04 => Ok(Self::Cr4_8),
            _ => Err(ConfigError::InvalidEnumValue {
                field: ConfigField::CodeRate,
                value,
            }),
        }
    }
}

/// Low data rate optimisation setting
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LdroMode {
    Off = 0x00,
    On = 0x01,
    /// Resolved from the symbol duration during validation
    Auto = 0x02,
}

impl LdroMode {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LdroMode {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Off),
            0x01 => Ok(Self::On),
            0x02 => Ok(Self::Auto),
            _ => Err(ConfigError::InvalidEnumValue {
                field: ConfigField::Ldro,
                value,
            }),
        }
    }
}

/// Requested PHY configuration, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioConfig {
    /// Centre frequency in Hz
    pub frequency_hz: u32,
    /// Calibration offset in Hz, added to the centre frequency
    pub offset_hz: i32,
    pub bandwidth: Bandwidth,
    pub spreading_factor: SpreadingFactor,
    pub code_rate: CodeRate,
    pub ldro: LdroMode,
    /// Transmit power in dBm
    pub tx_power_dbm: i8,
    /// Delay between transmitted packets
    pub inter_packet_delay_ms: u16,
}

impl Default for RadioConfig {
    fn default() -> Self {
        crate::config::lora_defaults::radio_config()
    }
}

/// A configuration with the enumerated fields still as raw register codes
///
/// This is the form the configuration arrives in over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRadioConfig {
    pub frequency_hz: u32,
    pub offset_hz: i32,
    pub bandwidth: u8,
    pub spreading_factor: u8,
    pub code_rate: u8,
    pub ldro: u8,
    pub tx_power_dbm: i8,
    pub inter_packet_delay_ms: u16,
}

impl TryFrom<RawRadioConfig> for RadioConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRadioConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            frequency_hz: raw.frequency_hz,
            offset_hz: raw.offset_hz,
            bandwidth: Bandwidth::try_from(raw.bandwidth)?,
            spreading_factor: SpreadingFactor::try_from(raw.spreading_factor)?,
            code_rate: CodeRate::try_from(raw.code_rate)?,
            ldro: LdroMode::try_from(raw.ldro)?,
            tx_power_dbm: raw.tx_power_dbm,
            inter_packet_delay_ms: raw.inter_packet_delay_ms,
        })
    }
}

impl From<RadioConfig> for RawRadioConfig {
    fn from(config: RadioConfig) -> Self {
        Self {
            frequency_hz: config.frequency_hz,
            offset_hz: config.offset_hz,
            bandwidth: config.bandwidth.code(),
            spreading_factor: config.spreading_factor.code(),
            code_rate: config.code_rate.code(),
            ldro: config.ldro.code(),
            tx_power_dbm: config.tx_power_dbm,
            inter_packet_delay_ms: config.inter_packet_delay_ms,
        }
    }
}
