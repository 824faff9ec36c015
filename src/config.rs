//! Hardware and radio configuration constants for the ESP32-S3 with WIO-SX1262

use crate::radio::{Bandwidth, CodeRate, Device, LdroMode, RadioConfig, SpreadingFactor};

/// SPI bus to the LoRa module
///
/// SCLK GPIO7, MISO GPIO8, MOSI GPIO9. Control lines: NSS GPIO41, DIO1 GPIO39,
/// NRST GPIO42, BUSY GPIO40. DIO2 drives the RF switch from inside the radio
/// and DIO3 powers the TCXO, so neither is wired to the MCU.
pub mod spi {
    pub const FREQUENCY_MHZ: u32 = 1;
}

/// TCXO configuration
pub mod tcxo {
    /// TCXO voltage code for SX1262 register
    /// 0x02 = 1.8V
    pub const VOLTAGE_CODE: u8 = 0x02;

    /// Startup delay in units of 15.625us (~5ms)
    pub const STARTUP_DELAY: u32 = 0x000140;
}

/// Default LoRa configuration, applied at boot
pub mod lora_defaults {
    use super::*;

    pub const DEVICE: Device = Device::Sx1262;
    pub const FREQUENCY_HZ: u32 = 434_000_000;
    /// Calibration offset added to the centre frequency
    pub const OFFSET_HZ: i32 = 0;
    pub const BANDWIDTH: Bandwidth = Bandwidth::Bw125;
    pub const SPREADING_FACTOR: SpreadingFactor = SpreadingFactor::Sf7;
    pub const CODE_RATE: CodeRate = CodeRate::Cr4_5;
    pub const LDRO: LdroMode = LdroMode::Auto;
    pub const TX_POWER_DBM: i8 = 10;
    pub const PACKET_DELAY_MS: u16 = 1000;

    /// The boot configuration as a single value
    pub const fn radio_config() -> RadioConfig {
        RadioConfig {
            frequency_hz: FREQUENCY_HZ,
            offset_hz: OFFSET_HZ,
            bandwidth: BANDWIDTH,
            spreading_factor: SPREADING_FACTOR,
            code_rate: CODE_RATE,
            ldro: LDRO,
            tx_power_dbm: TX_POWER_DBM,
            inter_packet_delay_ms: PACKET_DELAY_MS,
        }
    }
}

/// Transmit loop configuration
pub mod transmitter {
    /// Packet sent on every cycle
    pub const PAYLOAD: &[u8] = b"Hello World 1234567890*";

    /// Preamble length in symbols
    pub const PREAMBLE_LEN: u16 = 8;

    /// Extra time allowed on top of the computed time on air before a
    /// transmission is declared failed
    pub const TX_TIMEOUT_MARGIN_MS: u32 = 1000;
}

/// Serial configuration
pub mod serial {
    pub const READ_CHUNK_SIZE: usize = 64;
}

/// Protocol constants
pub mod protocol {
    /// Frame delimiter for COBS encoding
    pub const FRAME_DELIMITER: u8 = 0x00;

    /// Maximum frame size
    pub const MAX_FRAME_SIZE: usize = 128;

    /// Maximum payload size for LoRa (SX126x buffer limit)
    pub const MAX_LORA_PAYLOAD: usize = 255;

    /// Protocol version (increment when message format changes)
    pub const PROTOCOL_VERSION: u8 = 1;

    /// Firmware version
    pub const VERSION_MAJOR: u8 = 0;
    pub const VERSION_MINOR: u8 = 1;
    pub const VERSION_PATCH: u8 = 0;
}
