//! SX126x command payloads derived from a validated configuration
//!
//! Pure byte encoding, kept apart from the SPI driver so it can be checked on
//! the host.

use crate::radio::device::Device;
use crate::radio::timing::{time_on_air_us, PacketShape};
use crate::radio::validate::ValidatedConfig;

/// SX126x crystal frequency
const XTAL_HZ: u64 = 32_000_000;

/// PA ramp time code for 200us
const RAMP_200U: u8 = 0x04;

/// `SetRfFrequency` word: `f * 2^25 / f_xtal`
pub fn rf_frequency_word(frequency_hz: u32) -> u32 {
    ((frequency_hz as u64 * (1 << 25)) / XTAL_HZ) as u32
}

/// `SetRfFrequency` payload
pub fn rf_frequency(config: &ValidatedConfig) -> [u8; 4] {
    rf_frequency_word(config.frequency_hz()).to_be_bytes()
}

/// `SetModulationParams` payload for LoRa
pub fn modulation_params(config: &ValidatedConfig) -> [u8; 4] {
    [
        config.spreading_factor().code(),
        config.bandwidth().code(),
        config.code_rate().code(),
        config.low_data_rate_optimize() as u8,
    ]
}

/// `SetPaConfig` payload: `[paDutyCycle, hpMax, deviceSel, paLut]`
///
/// Values from the datasheet's optimal PA settings table.
pub fn pa_config(config: &ValidatedConfig) -> [u8; 4] {
    match config.device() {
        Device::Sx1261 if config.tx_power_dbm() >= 15 => [0x06, 0x00, 0x01, 0x01],
        Device::Sx1261 => [0x04, 0x00, 0x01, 0x01],
        Device::Sx1262 => [0x04, 0x07, 0x00, 0x01],
        Device::Sx1268 => [0x04, 0x06, 0x00, 0x01],
    }
}

/// Over-current limit register value, in 2.5 mA steps
///
/// `SetPaConfig` resets OCP to the device default, so this is written after it.
pub fn ocp_configuration(device: Device) -> u8 {
    let limit_ma: u32 = match device {
        Device::Sx1261 => 60,
        Device::Sx1262 | Device::Sx1268 => 140,
    };
    ((limit_ma * 10) / 25) as u8
}

/// `SetTxParams` payload: power as two's complement, 200us ramp
pub fn tx_params(config: &ValidatedConfig) -> [u8; 2] {
    [config.tx_power_dbm() as u8, RAMP_200U]
}

/// Image calibration bands from the datasheet, in MHz with their
/// `CalibrateImage` bytes
const IMAGE_BANDS: [(u32, u32, [u8; 2]); 5] = [
    (430, 440, [0x6B, 0x6F]),
    (470, 510, [0x75, 0x81]),
    (779, 787, [0xC1, 0xC5]),
    (863, 870, [0xD7, 0xDB]),
    (902, 928, [0xE1, 0xE9]),
];

/// `CalibrateImage` payload for the operating frequency
///
/// Frequencies outside the datasheet bands get an 8 MHz window around the
/// carrier, in the same 4 MHz steps.
pub fn calibrate_image(frequency_hz: u32) -> [u8; 2] {
    let mhz = frequency_hz / 1_000_000;
    for (low, high, bytes) in IMAGE_BANDS {
        if (low..=high).contains(&mhz) {
            return bytes;
        }
    }

    let low = (mhz.saturating_sub(4) / 4).min(0xFF) as u8;
    let high = ((mhz + 4).div_ceil(4)).min(0xFF) as u8;
    [low, high]
}

/// `SetPacketParams` payload for LoRa
pub fn packet_params(shape: &PacketShape) -> [u8; 6] {
    let preamble = shape.preamble_len.to_be_bytes();
    [
        preamble[0],
        preamble[1],
        // 0x00 = explicit (variable length) header
        if shape.explicit_header { 0x00 } else { 0x01 },
        shape.payload_len,
        shape.crc_on as u8,
        0x00, // Standard IQ
    ]
}

/// `SetDIO3AsTcxoCtrl` payload
pub fn tcxo_control(voltage_code: u8, delay: u32) -> [u8; 4] {
    let delay = delay.to_be_bytes();
    [voltage_code, delay[1], delay[2], delay[3]]
}

/// `SetTx` timeout field in 15.625us steps, from the time on air plus margin
///
/// Saturates at the 24-bit field maximum.
pub fn tx_timeout(config: &ValidatedConfig, shape: &PacketShape, margin_ms: u32) -> [u8; 3] {
    let budget_us = time_on_air_us(config, shape) as u64 + margin_ms as u64 * 1000;
    // 1 step = 15.625us = 1000us / 64
    let steps = (budget_us * 64 / 1000).min(0xFF_FFFF) as u32;
    let bytes = steps.to_be_bytes();
    [bytes[1], bytes[2], bytes[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::{
        Bandwidth, LdroMode, RadioConfig, RadioConfigValidator, SpreadingFactor,
    };

    fn validated(config: RadioConfig, device: Device) -> ValidatedConfig {
        RadioConfigValidator::for_device(device)
            .validate(&config)
            .expect("Should validate")
    }

    fn boot() -> ValidatedConfig {
        validated(RadioConfig::default(), Device::Sx1262)
    }

    #[test]
    fn test_ocp_per_device() {
        assert_eq!(ocp_configuration(Device::Sx1262), 0x38);
        assert_eq!(ocp_configuration(Device::Sx1268), 0x38);
        assert_eq!(ocp_configuration(Device::Sx1261), 0x18);
    }

    #[test]
    fn test_rf_frequency_word() {
        // 434 MHz * 2^25 / 32 MHz
        assert_eq!(rf_frequency_word(434_000_000), 0x1B20_0000);
        assert_eq!(rf_frequency_word(868_000_000), 0x3640_0000);
        assert_eq!(rf_frequency(&boot()), [0x1B, 0x20, 0x00, 0x00]);
    }

    #[test]
    fn test_rf_frequency_uses_offset() {
        let config = RadioConfig {
            offset_hz: 1_000,
            ..RadioConfig::default()
        };
        let word = u32::from_be_bytes(rf_frequency(&validated(config, Device::Sx1262)));
        assert_eq!(word, rf_frequency_word(434_001_000));
        assert!(word > rf_frequency_word(434_000_000));
    }

    #[test]
    fn test_modulation_params() {
        assert_eq!(modulation_params(&boot()), [0x07, 0x04, 0x01, 0x00]);

        let slow = RadioConfig {
            spreading_factor: SpreadingFactor::Sf12,
            bandwidth: Bandwidth::Bw62_5,
            ldro: LdroMode::Auto,
            ..RadioConfig::default()
        };
        assert_eq!(
            modulation_params(&validated(slow, Device::Sx1262)),
            [0x0C, 0x03, 0x01, 0x01]
        );
    }

    #[test]
    fn test_tx_params_negative_power() {
        let config = RadioConfig {
            tx_power_dbm: -9,
            ..RadioConfig::default()
        };
        assert_eq!(tx_params(&validated(config, Device::Sx1262)), [0xF7, 0x04]);
        assert_eq!(tx_params(&boot()), [0x0A, 0x04]);
    }

    #[test]
    fn test_pa_config_per_device() {
        assert_eq!(pa_config(&boot()), [0x04, 0x07, 0x00, 0x01]);

        let low_power = RadioConfig {
            tx_power_dbm: 14,
            ..RadioConfig::default()
        };
        assert_eq!(
            pa_config(&validated(low_power, Device::Sx1261)),
            [0x04, 0x00, 0x01, 0x01]
        );

        let full_power = RadioConfig {
            tx_power_dbm: 15,
            ..RadioConfig::default()
        };
        assert_eq!(
            pa_config(&validated(full_power, Device::Sx1261)),
            [0x06, 0x00, 0x01, 0x01]
        );
    }

    #[test]
    fn test_calibrate_image_bands() {
        assert_eq!(calibrate_image(434_000_000), [0x6B, 0x6F]);
        assert_eq!(calibrate_image(868_100_000), [0xD7, 0xDB]);
        assert_eq!(calibrate_image(915_000_000), [0xE1, 0xE9]);
    }

    #[test]
    fn test_calibrate_image_outside_bands() {
        // 169 MHz: window 165..173 MHz
        assert_eq!(calibrate_image(169_000_000), [41, 44]);
    }

    #[test]
    fn test_packet_params() {
        let shape = PacketShape {
            preamble_len: 8,
            payload_len: 23,
            explicit_header: true,
            crc_on: true,
        };
        assert_eq!(packet_params(&shape), [0x00, 0x08, 0x00, 23, 0x01, 0x00]);
    }

    #[test]
    fn test_tcxo_control() {
        assert_eq!(tcxo_control(0x02, 0x000140), [0x02, 0x00, 0x01, 0x40]);
    }

    #[test]
    fn test_tx_timeout() {
        let shape = PacketShape {
            preamble_len: 8,
            payload_len: 23,
            explicit_header: true,
            crc_on: true,
        };
        // 61_696us + 1000ms = 1_061_696us -> 67_948 steps
        assert_eq!(tx_timeout(&boot(), &shape, 1000), [0x01, 0x09, 0x6C]);
    }
}
