//! Command parser for COBS-decoded frames

use crate::commands::types::{decode_config_record, Command, CommandId, ResponseStatus};
use crate::config::protocol::PROTOCOL_VERSION;
use crc::{Crc, CRC_16_XMODEM};

const CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Header (version, id, length) plus CRC
const FRAME_OVERHEAD: usize = 6;

/// Parser for binary protocol commands
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a COBS-decoded frame into a command
    ///
    /// Frame format: [version: u8][cmd_id: u8][length: u16 LE][payload][crc16: u16 LE]
    ///
    /// Only framing and record length are checked here. Whether a `SetConfig`
    /// record holds a usable configuration is decided by the validator.
    pub fn parse(&self, data: &[u8]) -> Result<Command, ResponseStatus> {
        if data.len() < FRAME_OVERHEAD {
            return Err(ResponseStatus::InvalidLength);
        }

        let version = data[0];
        let command_id_byte = data[1];
        let length = u16::from_le_bytes([data[2], data[3]]) as usize;

        if version != PROTOCOL_VERSION {
            return Err(ResponseStatus::InvalidVersion);
        }

        if data.len() < FRAME_OVERHEAD + length {
            return Err(ResponseStatus::InvalidLength);
        }

        let payload = &data[4..4 + length];
        let received_crc = u16::from_le_bytes([data[4 + length], data[5 + length]]);
        if calculate_crc(&data[..4 + length]) != received_crc {
            return Err(ResponseStatus::CrcError);
        }

        match CommandId::from_byte(command_id_byte) {
            Some(CommandId::GetVersion) => {
                if length != 0 {
                    return Err(ResponseStatus::InvalidLength);
                }
                Ok(Command::GetVersion)
            }
            Some(CommandId::GetConfig) => {
                if length != 0 {
                    return Err(ResponseStatus::InvalidLength);
                }
                Ok(Command::GetConfig)
            }
            Some(CommandId::SetConfig) => {
                let config = decode_config_record(payload).ok_or(ResponseStatus::InvalidLength)?;
                Ok(Command::SetConfig { config })
            }
            None => Err(ResponseStatus::InvalidCommand),
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC-16-XMODEM over a frame body
pub fn calculate_crc(data: &[u8]) -> u16 {
    CRC.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::{encode_config_record, CONFIG_RECORD_LEN};
    use crate::radio::{RadioConfig, RawRadioConfig};
    use heapless::Vec;

    fn build_frame(cmd_id: u8, payload: &[u8]) -> Vec<u8, 64> {
        let mut frame = Vec::new();
        frame.push(PROTOCOL_VERSION).unwrap();
        frame.push(cmd_id).unwrap();
        frame
            .extend_from_slice(&(payload.len() as u16).to_le_bytes())
            .unwrap();
        frame.extend_from_slice(payload).unwrap();

        let crc = calculate_crc(&frame);
        frame.extend_from_slice(&crc.to_le_bytes()).unwrap();
        frame
    }

    #[test]
    fn test_parse_get_version() {
        let parser = CommandParser::new();
        let frame = build_frame(0x01, &[]);

        let cmd = parser.parse(&frame).expect("Should parse");
        assert!(matches!(cmd, Command::GetVersion));
    }

    #[test]
    fn test_parse_get_config() {
        let parser = CommandParser::new();
        let frame = build_frame(0x20, &[]);
        assert_eq!(parser.parse(&frame), Ok(Command::GetConfig));

        let frame = build_frame(0x20, &[0x00]);
        assert_eq!(parser.parse(&frame), Err(ResponseStatus::InvalidLength));
    }

    #[test]
    fn test_parse_set_config() {
        let parser = CommandParser::new();
        let raw = RawRadioConfig {
            frequency_hz: 868_100_000,
            spreading_factor: 0x0C,
            ..RawRadioConfig::from(RadioConfig::default())
        };
        let frame = build_frame(0x21, &encode_config_record(&raw));

        match parser.parse(&frame).expect("Should parse") {
            Command::SetConfig { config } => assert_eq!(config, raw),
            other => panic!("Expected SetConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_set_config_keeps_bad_enum_codes() {
        // Bad codes are the validator's call, not the parser's
        let parser = CommandParser::new();
        let raw = RawRadioConfig {
            bandwidth: 0x07,
            ..RawRadioConfig::from(RadioConfig::default())
        };
        let frame = build_frame(0x21, &encode_config_record(&raw));
        assert!(matches!(
            parser.parse(&frame),
            Ok(Command::SetConfig { config }) if config.bandwidth == 0x07
        ));
    }

    #[test]
    fn test_parse_set_config_short_record() {
        let parser = CommandParser::new();
        let frame = build_frame(0x21, &[0u8; CONFIG_RECORD_LEN - 1]);
        assert_eq!(parser.parse(&frame), Err(ResponseStatus::InvalidLength));
    }

    #[test]
    fn test_invalid_crc() {
        let parser = CommandParser::new();
        let mut frame = build_frame(0x01, &[]);
        let len = frame.len();
        frame[len - 1] ^= 0xFF;

        assert_eq!(parser.parse(&frame), Err(ResponseStatus::CrcError));
    }

    #[test]
    fn test_invalid_command() {
        let parser = CommandParser::new();
        let frame = build_frame(0x10, &[]);

        assert_eq!(parser.parse(&frame), Err(ResponseStatus::InvalidCommand));
    }

    #[test]
    fn test_invalid_version() {
        let parser = CommandParser::new();
        let mut frame = build_frame(0x01, &[]);
        frame[0] = 0x00;

        assert_eq!(parser.parse(&frame), Err(ResponseStatus::InvalidVersion));
    }

    #[test]
    fn test_length_past_end() {
        let parser = CommandParser::new();
        // Claims 15 payload bytes, carries none
        let frame = [PROTOCOL_VERSION, 0x21, 15, 0, 0xAA, 0xBB];
        assert_eq!(parser.parse(&frame), Err(ResponseStatus::InvalidLength));
    }

    #[test]
    fn test_too_short() {
        let parser = CommandParser::new();
        assert_eq!(
            parser.parse(&[0x01, 0x01, 0x00]),
            Err(ResponseStatus::InvalidLength)
        );
    }
}
