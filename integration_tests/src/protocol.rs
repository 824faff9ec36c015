//! Host side of the firmware's serial protocol.

#![allow(dead_code)]

use crc::{Crc, CRC_16_XMODEM};

/// Protocol version (must match firmware)
pub const PROTOCOL_VERSION: u8 = 1;

/// Length of the config record carried by SetConfig and Config
pub const CONFIG_RECORD_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    GetVersion = 0x01,
    GetConfig = 0x20,
    SetConfig = 0x21,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseStatus {
    InvalidCommand = 0x01,
    InvalidLength = 0x02,
    CrcError = 0x03,
    InvalidVersion = 0x04,
    LoraError = 0x10,
    Timeout = 0x11,
    OutOfBandFrequency = 0x20,
    OffsetOutOfRange = 0x21,
    IncompatibleModulationParams = 0x22,
    PowerOutOfRange = 0x23,
    InvalidEnumValue = 0x24,
}

const CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Build a command frame (without COBS encoding).
/// Format: [version: u8][cmd_id: u8][length: u16 LE][payload][crc16: u16 LE]
pub fn build_command_payload(cmd_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(6 + payload.len());

    data.push(PROTOCOL_VERSION);
    data.push(cmd_id);
    data.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    data.extend_from_slice(payload);

    let checksum = CRC.checksum(&data);
    data.extend_from_slice(&checksum.to_le_bytes());

    data
}

/// COBS encode (corncobs includes zero delimiter).
pub fn cobs_encode(data: &[u8]) -> Vec<u8> {
    let mut encoded = vec![0u8; corncobs::max_encoded_len(data.len())];
    let len = corncobs::encode_buf(data, &mut encoded);
    encoded.truncate(len);
    encoded
}

/// COBS decode a frame (including the zero delimiter).
pub fn cobs_decode(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut decoded = vec![0u8; data.len()];
    let len = corncobs::decode_buf(data, &mut decoded)
        .map_err(|e| anyhow::anyhow!("COBS decode error: {:?}", e))?;
    decoded.truncate(len);
    Ok(decoded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseId {
    Version = 0x01,
    Config = 0x20,
    Error = 0xFF,
}

impl TryFrom<u8> for ResponseId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, <Self as TryFrom<u8>>::Error> {
        match value {
            0x01 => Ok(ResponseId::Version),
            0x20 => Ok(ResponseId::Config),
            0xFF => Ok(ResponseId::Error),
            _ => Err(value),
        }
    }
}

/// Parsed response from the device.
#[derive(Debug)]
pub struct Response {
    pub resp_id: ResponseId,
    pub payload: Vec<u8>,
}

impl Response {
    /// Status byte of an Error response
    pub fn error_status(&self) -> Option<u8> {
        match self.resp_id {
            ResponseId::Error => self.payload.first().copied(),
            _ => None,
        }
    }
}

/// Parse a COBS-decoded response.
/// Format: [version: u8][resp_id: u8][length: u16 LE][payload][crc: u16 LE]
pub fn parse_response(data: &[u8]) -> anyhow::Result<Response> {
    if data.len() < 6 {
        anyhow::bail!("Response too short: {} bytes", data.len());
    }

    let version = data[0];
    let length = u16::from_le_bytes([data[2], data[3]]) as usize;

    if data.len() < 4 + length + 2 {
        anyhow::bail!(
            "Response payload incomplete: expected {}, got {}",
            4 + length + 2,
            data.len()
        );
    }

    let received_crc = u16::from_le_bytes([data[4 + length], data[5 + length]]);
    let calculated_crc = CRC.checksum(&data[..4 + length]);
    if calculated_crc != received_crc {
        anyhow::bail!(
            "CRC mismatch: expected {:04x}, got {:04x}",
            calculated_crc,
            received_crc
        );
    }

    if version != PROTOCOL_VERSION {
        anyhow::bail!(
            "Protocol version mismatch: expected {}, got {}",
            PROTOCOL_VERSION,
            version
        );
    }

    let resp_id = ResponseId::try_from(data[1])
        .map_err(|v| anyhow::anyhow!("Unknown response ID: {:#04x}", v))?;

    Ok(Response {
        resp_id,
        payload: data[4..4 + length].to_vec(),
    })
}

/// Radio configuration as carried on the wire, enum fields as register codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRecord {
    pub frequency_hz: u32,
    pub offset_hz: i32,
    pub bandwidth: u8,
    pub spreading_factor: u8,
    pub code_rate: u8,
    pub ldro: u8,
    pub tx_power_dbm: i8,
    pub inter_packet_delay_ms: u16,
}

impl ConfigRecord {
    /// Firmware boot configuration: 434 MHz, 125 kHz, SF7, CR 4/5, LDRO auto, 10 dBm
    pub fn boot_default() -> Self {
        Self {
            frequency_hz: 434_000_000,
            offset_hz: 0,
            bandwidth: 0x04,
            spreading_factor: 0x07,
            code_rate: 0x01,
            ldro: 0x02,
            tx_power_dbm: 10,
            inter_packet_delay_ms: 1000,
        }
    }

    pub fn encode(&self) -> [u8; CONFIG_RECORD_LEN] {
        let mut out = [0u8; CONFIG_RECORD_LEN];
        out[0..4].copy_from_slice(&self.frequency_hz.to_le_bytes());
        out[4..8].copy_from_slice(&self.offset_hz.to_le_bytes());
        out[8] = self.bandwidth;
        out[9] = self.spreading_factor;
        out[10] = self.code_rate;
        out[11] = self.ldro;
        out[12] = self.tx_power_dbm as u8;
        out[13..15].copy_from_slice(&self.inter_packet_delay_ms.to_le_bytes());
        out
    }

    pub fn decode(data: &[u8]) -> anyhow::Result<Self> {
        if data.len() < CONFIG_RECORD_LEN {
            anyhow::bail!("Config record too short: {} bytes", data.len());
        }
        Ok(Self {
            frequency_hz: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            offset_hz: i32::from_le_bytes([data[4], data[5], data[6], data[7]]),
            bandwidth: data[8],
            spreading_factor: data[9],
            code_rate: data[10],
            ldro: data[11],
            tx_power_dbm: data[12] as i8,
            inter_packet_delay_ms: u16::from_le_bytes([data[13], data[14]]),
        })
    }
}

/// Payload of a Config response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveConfig {
    pub record: ConfigRecord,
    pub ldro_enabled: bool,
    pub symbol_us: u32,
}

impl ActiveConfig {
    pub fn decode(payload: &[u8]) -> anyhow::Result<Self> {
        if payload.len() != CONFIG_RECORD_LEN + 5 {
            anyhow::bail!("Config payload: expected 20 bytes, got {}", payload.len());
        }
        let tail = &payload[CONFIG_RECORD_LEN..];
        Ok(Self {
            record: ConfigRecord::decode(payload)?,
            ldro_enabled: tail[0] != 0,
            symbol_us: u32::from_le_bytes([tail[1], tail[2], tail[3], tail[4]]),
        })
    }
}
