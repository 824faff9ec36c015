//! Command and response types for the binary protocol
//!
//! # Protocol Format
//!
//! All frames use COBS encoding with a zero byte delimiter:
//! ```text
//! [COBS-encoded payload][0x00]
//! ```
//!
//! The payload format (before COBS encoding):
//! ```text
//! [version: u8][cmd_id: u8][length: u16 LE][payload: [u8; length]][crc16: u16 LE]
//! ```
//!
//! - `version`: Protocol version (currently 1)
//! - `cmd_id`: Command or response identifier
//! - `length`: Payload length in bytes (little-endian)
//! - `crc16`: CRC-16-XMODEM checksum over all preceding bytes
//!
//! # Config record
//!
//! `SetConfig` and the `Config` response carry the same 15-byte record:
//! ```text
//! [frequency: u32 LE][offset: i32 LE][bw: u8][sf: u8][cr: u8][ldro: u8][power: i8][delay_ms: u16 LE]
//! ```
//! The enumerated fields are SX126x register codes.

use crate::radio::{ConfigError, RawRadioConfig};

/// Length of the config record on the wire
pub const CONFIG_RECORD_LEN: usize = 15;

/// Command IDs for the binary protocol
///
/// Commands are sent from the host to the device. Each command has a specific
/// payload format and expected response.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    /// Get firmware version (0x01)
    ///
    /// - Payload: None (length = 0)
    /// - Response: [`Response::Version`]
    GetVersion = 0x01,

    /// Read the active radio configuration (0x20)
    ///
    /// - Payload: None (length = 0)
    /// - Response: [`Response::Config`]
    GetConfig = 0x20,

    /// Replace the radio configuration (0x21)
    ///
    /// - Payload: config record (15 bytes)
    /// - Response: [`Response::Config`] with the applied configuration, or
    ///   [`Response::Error`] if it was rejected
    SetConfig = 0x21,
}

impl CommandId {
    /// Try to convert a byte to a CommandId
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::GetVersion),
            0x20 => Some(Self::GetConfig),
            0x21 => Some(Self::SetConfig),
            _ => None,
        }
    }
}

/// Parsed command with associated data
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Get firmware version
    GetVersion,

    /// Read the active configuration
    GetConfig,

    /// Validate and apply a new configuration
    SetConfig { config: RawRadioConfig },
}

impl Command {
    /// Get the command ID for this command
    pub fn id(&self) -> CommandId {
        match self {
            Command::GetVersion => CommandId::GetVersion,
            Command::GetConfig => CommandId::GetConfig,
            Command::SetConfig { .. } => CommandId::SetConfig,
        }
    }
}

/// Response status codes
///
/// Used in [`Response::Error`] to indicate why a command failed.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Command executed successfully (0x00)
    Success = 0x00,

    /// Unknown or invalid command ID (0x01)
    InvalidCommand = 0x01,

    /// Payload length invalid for the command (0x02)
    ///
    /// Examples: non-zero payload for GetVersion, short SetConfig record
    InvalidLength = 0x02,

    /// CRC-16 checksum mismatch (0x03)
    CrcError = 0x03,

    /// Protocol version not supported (0x04)
    InvalidVersion = 0x04,

    /// LoRa radio error during operation (0x10)
    LoraError = 0x10,

    /// Operation timed out (0x11)
    Timeout = 0x11,

    /// Frequency outside the device band (0x20)
    OutOfBandFrequency = 0x20,

    /// Calibration offset beyond the device bound (0x21)
    OffsetOutOfRange = 0x21,

    /// Spreading factor and bandwidth give too long a symbol (0x22)
    IncompatibleModulationParams = 0x22,

    /// Transmit power outside the device range (0x23)
    PowerOutOfRange = 0x23,

    /// Unknown register code for an enumerated field (0x24)
    InvalidEnumValue = 0x24,
}

impl From<ConfigError> for ResponseStatus {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::OutOfBandFrequency { .. } => Self::OutOfBandFrequency,
            ConfigError::OffsetOutOfRange { .. } => Self::OffsetOutOfRange,
            ConfigError::IncompatibleModulationParams { .. } => {
                Self::IncompatibleModulationParams
            }
            ConfigError::PowerOutOfRange { .. } => Self::PowerOutOfRange,
            ConfigError::InvalidEnumValue { .. } => Self::InvalidEnumValue,
        }
    }
}

/// Response to a command
///
/// # Response IDs
///
/// | ID   | Response   | Description                    |
/// |------|------------|--------------------------------|
/// | 0x01 | Version    | Firmware version               |
/// | 0x20 | Config     | Active radio configuration     |
/// | 0xFF | Error      | Error with status code         |
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Version response (ID: 0x01)
    ///
    /// Payload: `[major: u8][minor: u8][patch: u8]`
    Version { major: u8, minor: u8, patch: u8 },

    /// Active configuration (ID: 0x20)
    ///
    /// Payload: `[config record][ldro_enabled: u8][symbol_us: u32 LE]`
    Config {
        config: RawRadioConfig,
        ldro_enabled: bool,
        symbol_us: u32,
    },

    /// Error response (ID: 0xFF)
    ///
    /// Payload: `[status: u8][original_command_id: u8]`
    Error {
        status: ResponseStatus,
        original_command_id: u8,
    },
}

impl Response {
    /// Create an error response for a given command
    pub fn error(status: ResponseStatus, command_id: CommandId) -> Self {
        Self::Error {
            status,
            original_command_id: command_id as u8,
        }
    }

    /// Create an error response with raw command ID (for unknown commands)
    pub fn error_raw(status: ResponseStatus, original_command_id: u8) -> Self {
        Self::Error {
            status,
            original_command_id,
        }
    }
}

/// Encode a configuration as the wire record
pub fn encode_config_record(config: &RawRadioConfig) -> [u8; CONFIG_RECORD_LEN] {
    let mut out = [0u8; CONFIG_RECORD_LEN];
    out[0..4].copy_from_slice(&config.frequency_hz.to_le_bytes());
    out[4..8].copy_from_slice(&config.offset_hz.to_le_bytes());
    out[8] = config.bandwidth;
    out[9] = config.spreading_factor;
    out[10] = config.code_rate;
    out[11] = config.ldro;
    out[12] = config.tx_power_dbm as u8;
    out[13..15].copy_from_slice(&config.inter_packet_delay_ms.to_le_bytes());
    out
}

/// Decode the wire record
///
/// Returns `None` unless `data` is exactly one record long. Enum codes are
/// not checked here.
pub fn decode_config_record(data: &[u8]) -> Option<RawRadioConfig> {
    let record: &[u8; CONFIG_RECORD_LEN] = data.try_into().ok()?;
    Some(RawRadioConfig {
        frequency_hz: u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
        offset_hz: i32::from_le_bytes([record[4], record[5], record[6], record[7]]),
        bandwidth: record[8],
        spreading_factor: record[9],
        code_rate: record[10],
        ldro: record[11],
        tx_power_dbm: record[12] as i8,
        inter_packet_delay_ms: u16::from_le_bytes([record[13], record[14]]),
    })
}
