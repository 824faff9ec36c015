//! Last-known-good configuration holder
//!
//! Keeps the configuration currently programmed into the radio. A rejected
//! candidate never replaces it.

use crate::radio::error::ConfigError;
use crate::radio::types::RadioConfig;
use crate::radio::validate::{RadioConfigValidator, ValidatedConfig};

pub struct ActiveConfig {
    validator: RadioConfigValidator,
    current: ValidatedConfig,
}

impl ActiveConfig {
    /// Validate the initial configuration and make it current
    pub fn new(validator: RadioConfigValidator, initial: &RadioConfig) -> Result<Self, ConfigError> {
        let current = validator.validate(initial)?;
        Ok(Self { validator, current })
    }

    pub fn current(&self) -> &ValidatedConfig {
        &self.current
    }

    /// Validate a candidate without making it current
    ///
    /// Used when the candidate must be applied to hardware before it is
    /// committed.
    pub fn stage(&self, candidate: &RadioConfig) -> Result<ValidatedConfig, ConfigError> {
        self.validator.validate(candidate).map_err(|err| {
            log::warn!("radio: rejected configuration: {err}");
            err
        })
    }

    /// Make a staged configuration current
    pub fn commit(&mut self, validated: ValidatedConfig) {
        log::info!(
            "radio: configuration now {} Hz, {:?}, {:?}, {:?}, ldro {}, {} dBm",
            validated.frequency_hz(),
            validated.spreading_factor(),
            validated.bandwidth(),
            validated.code_rate(),
            validated.low_data_rate_optimize(),
            validated.tx_power_dbm()
        );
        self.current = validated;
    }
}
