//! Configuration validation
//!
//! Turns a requested [`RadioConfig`] into a [`ValidatedConfig`] that the
//! driver can program without further checks. Validation is a pure function
//! of the request and the device limits.

use crate::radio::device::{Device, DeviceLimits};
use crate::radio::error::ConfigError;
use crate::radio::timing::symbol_duration_us;
use crate::radio::types::{
    Bandwidth, CodeRate, LdroMode, RadioConfig, RawRadioConfig, SpreadingFactor,
};

/// A configuration that passed validation, ready to apply to the radio
///
/// Only [`RadioConfigValidator`] can build one, so holding a
/// `ValidatedConfig` proves every field is within the device limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedConfig {
    requested: RadioConfig,
    device: Device,
    frequency_hz: u32,
    low_data_rate_optimize: bool,
    symbol_duration_us: u32,
}

impl ValidatedConfig {
    /// The configuration as requested, with LDRO still possibly `Auto`
    pub fn requested(&self) -> &RadioConfig {
        &self.requested
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Centre frequency with the calibration offset applied
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.requested.bandwidth
    }

    pub fn spreading_factor(&self) -> SpreadingFactor {
        self.requested.spreading_factor
    }

    pub fn code_rate(&self) -> CodeRate {
        self.requested.code_rate
    }

    /// Resolved LDRO setting
    pub fn low_data_rate_optimize(&self) -> bool {
        self.low_data_rate_optimize
    }

    pub fn symbol_duration_us(&self) -> u32 {
        self.symbol_duration_us
    }

    pub fn tx_power_dbm(&self) -> i8 {
        self.requested.tx_power_dbm
    }

    pub fn inter_packet_delay_ms(&self) -> u16 {
        self.requested.inter_packet_delay_ms
    }
}

/// Validates radio configurations against one device's limits
#[derive(Debug, Clone, Copy)]
pub struct RadioConfigValidator {
    limits: DeviceLimits,
}

impl RadioConfigValidator {
    pub fn new(limits: DeviceLimits) -> Self {
        Self { limits }
    }

    pub fn for_device(device: Device) -> Self {
        Self::new(device.limits())
    }

    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Validate a typed configuration
    pub fn validate(&self, config: &RadioConfig) -> Result<ValidatedConfig, ConfigError> {
        let frequency_hz = self.check_frequency(config)?;
        let symbol_duration_us = self.check_modulation(config)?;
        let low_data_rate_optimize = self.resolve_ldro(config.ldro, symbol_duration_us);
        self.check_power(config.tx_power_dbm)?;

        log::trace!(
            "radio::validate ok: {} Hz, symbol {} us, ldro {}",
            frequency_hz,
            symbol_duration_us,
            low_data_rate_optimize
        );

        Ok(ValidatedConfig {
            requested: *config,
            device: self.limits.device,
            frequency_hz,
            low_data_rate_optimize,
            symbol_duration_us,
        })
    }

    /// Convert raw register codes and validate the result
    pub fn validate_raw(&self, raw: &RawRadioConfig) -> Result<ValidatedConfig, ConfigError> {
        let config = RadioConfig::try_from(*raw)?;
        self.validate(&config)
    }

    /// Returns the effective frequency (centre plus offset)
    fn check_frequency(&self, config: &RadioConfig) -> Result<u32, ConfigError> {
        let out_of_band = ConfigError::OutOfBandFrequency {
            frequency_hz: config.frequency_hz,
            offset_hz: config.offset_hz,
        };

        if !self.limits.frequency_in_band(config.frequency_hz) {
            return Err(out_of_band);
        }

        if config.offset_hz.unsigned_abs() > self.limits.max_offset_hz {
            return Err(ConfigError::OffsetOutOfRange {
                offset_hz: config.offset_hz,
            });
        }

        let effective = config
            .frequency_hz
            .checked_add_signed(config.offset_hz)
            .ok_or(out_of_band)?;

        if !self.limits.frequency_in_band(effective) {
            return Err(out_of_band);
        }

        Ok(effective)
    }

    /// Returns the symbol duration in microseconds
    fn check_modulation(&self, config: &RadioConfig) -> Result<u32, ConfigError> {
        let symbol_duration_us = symbol_duration_us(config.spreading_factor, config.bandwidth);
        if symbol_duration_us > self.limits.max_symbol_duration_us {
            return Err(ConfigError::IncompatibleModulationParams { symbol_duration_us });
        }
        Ok(symbol_duration_us)
    }

    fn resolve_ldro(&self, mode: LdroMode, symbol_duration_us: u32) -> bool {
        match mode {
            LdroMode::On => true,
            LdroMode::Off => false,
            LdroMode::Auto => symbol_duration_us >= self.limits.ldro_threshold_us,
        }
    }

    fn check_power(&self, tx_power_dbm: i8) -> Result<(), ConfigError> {
        if self.limits.power_in_range(tx_power_dbm) {
            Ok(())
        } else {
            Err(ConfigError::PowerOutOfRange { tx_power_dbm })
        }
    }
}
