//! Response serialiser with COBS encoding

use crate::commands::parser::calculate_crc;
use crate::commands::types::{encode_config_record, Response};
use crate::config::protocol::{MAX_FRAME_SIZE, PROTOCOL_VERSION};
use heapless::Vec;

/// Response IDs
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum ResponseId {
    Version = 0x01,
    Config = 0x20,
    Error = 0xFF,
}

/// Serialiser for response frames
pub struct ResponseSerialiser;

impl ResponseSerialiser {
    pub fn new() -> Self {
        Self
    }

    /// Serialise a response to a COBS-encoded frame, trailing delimiter included
    pub fn serialise(&self, response: &Response) -> Vec<u8, MAX_FRAME_SIZE> {
        let raw = self.build_raw_frame(response);
        cobs_encode(&raw)
    }

    /// Frame format: [version: u8][resp_id: u8][length: u16 LE][payload][crc16: u16 LE]
    fn build_raw_frame(&self, response: &Response) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut payload: Vec<u8, MAX_FRAME_SIZE> = Vec::new();

        let id = match response {
            Response::Version {
                major,
                minor,
                patch,
            } => {
                let _ = payload.extend_from_slice(&[*major, *minor, *patch]);
                ResponseId::Version
            }
            Response::Config {
                config,
                ldro_enabled,
                symbol_us,
            } => {
                let _ = payload.extend_from_slice(&encode_config_record(config));
                let _ = payload.push(*ldro_enabled as u8);
                let _ = payload.extend_from_slice(&symbol_us.to_le_bytes());
                ResponseId::Config
            }
            Response::Error {
                status,
                original_command_id,
            } => {
                let _ = payload.extend_from_slice(&[*status as u8, *original_command_id]);
                ResponseId::Error
            }
        };

        let mut frame: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
        let _ = frame.push(PROTOCOL_VERSION);
        let _ = frame.push(id as u8);
        let _ = frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        let _ = frame.extend_from_slice(&payload);

        let crc = calculate_crc(&frame);
        let _ = frame.extend_from_slice(&crc.to_le_bytes());

        frame
    }
}

impl Default for ResponseSerialiser {
    fn default() -> Self {
        Self::new()
    }
}

/// COBS encode using corncobs (output ends with the zero delimiter)
pub fn cobs_encode(data: &[u8]) -> Vec<u8, MAX_FRAME_SIZE> {
    let mut output: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
    output.resize(corncobs::max_encoded_len(data.len()), 0).ok();
    let len = corncobs::encode_buf(data, &mut output);
    output.truncate(len);
    output
}

/// COBS decode using corncobs (input must include the zero delimiter)
#[allow(clippy::result_unit_err)]
pub fn cobs_decode(encoded: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, ()> {
    let mut output: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
    output.resize(encoded.len(), 0).map_err(|_| ())?;
    let len = corncobs::decode_buf(encoded, &mut output).map_err(|_| ())?;
    output.truncate(len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::types::{CommandId, ResponseStatus};
    use crate::config::protocol::FRAME_DELIMITER;
    use crate::radio::{RadioConfig, RawRadioConfig};

    #[test]
    fn test_serialise_version() {
        let serialiser = ResponseSerialiser::new();
        let response = Response::Version {
            major: 0,
            minor: 1,
            patch: 0,
        };

        let encoded = serialiser.serialise(&response);
        assert_eq!(encoded[encoded.len() - 1], FRAME_DELIMITER);

        let decoded = cobs_decode(&encoded).expect("Should decode");

        // [version][resp_id][length LE][major][minor][patch][crc LE]
        assert_eq!(decoded[0], PROTOCOL_VERSION);
        assert_eq!(decoded[1], ResponseId::Version as u8);
        assert_eq!(&decoded[2..4], &[3, 0]);
        assert_eq!(&decoded[4..7], &[0, 1, 0]);
    }

    #[test]
    fn test_serialise_config() {
        let serialiser = ResponseSerialiser::new();
        let config = RawRadioConfig::from(RadioConfig::default());
        let response = Response::Config {
            config,
            ldro_enabled: false,
            symbol_us: 1_024,
        };

        let encoded = serialiser.serialise(&response);
        let decoded = cobs_decode(&encoded).expect("Should decode");

        assert_eq!(decoded[1], ResponseId::Config as u8);
        let length = u16::from_le_bytes([decoded[2], decoded[3]]) as usize;
        assert_eq!(length, 20);
        assert_eq!(&decoded[4..19], &encode_config_record(&config));
        assert_eq!(decoded[19], 0);
        assert_eq!(&decoded[20..24], &1_024u32.to_le_bytes());

        let crc = u16::from_le_bytes([decoded[24], decoded[25]]);
        assert_eq!(crc, calculate_crc(&decoded[..24]));
    }

    #[test]
    fn test_serialise_error() {
        let serialiser = ResponseSerialiser::new();
        let response = Response::Error {
            status: ResponseStatus::PowerOutOfRange,
            original_command_id: CommandId::SetConfig as u8,
        };

        let encoded = serialiser.serialise(&response);
        assert_eq!(encoded[encoded.len() - 1], FRAME_DELIMITER);

        let decoded = cobs_decode(&encoded).expect("Should decode");

        // [version][resp_id][length LE][status][cmd_id][crc LE]
        assert_eq!(decoded[1], ResponseId::Error as u8);
        assert_eq!(decoded[4], 0x23);
        assert_eq!(decoded[5], 0x21);
    }

    #[test]
    fn test_cobs_encoding_removes_zeros() {
        let data_with_zeros = [0x01, 0x00, 0x02, 0x00, 0x03];
        let encoded = cobs_encode(&data_with_zeros);

        assert_eq!(encoded[encoded.len() - 1], 0x00, "Should end with zero");
        for &byte in &encoded[..encoded.len() - 1] {
            assert_ne!(byte, 0, "COBS encoded data should not contain zeros");
        }

        let decoded = cobs_decode(&encoded).expect("Should decode");
        assert_eq!(decoded.as_slice(), &data_with_zeros);
    }
}
