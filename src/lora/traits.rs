//! LoRa radio trait for abstraction and testability
//!
//! This trait defines the interface for LoRa radio operations,
//! allowing the actual hardware driver to be swapped with a mock for testing.

use crate::radio::ValidatedConfig;
use core::future::Future;

/// Errors that can occur during LoRa operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoraError {
    /// Operation timed out
    Timeout,
    /// Transmission failed
    TransmitFailed,
    /// Payload empty or larger than the radio buffer
    InvalidPayload,
    /// Radio busy timeout
    BusyTimeout,
    /// SPI communication error
    SpiError,
    /// Radio not initialised
    NotInitialised,
}

/// Abstract LoRa radio interface for testability
///
/// Every configuration a radio sees has already passed validation; the
/// trait only accepts [`ValidatedConfig`].
pub trait LoraRadio {
    /// Initialise the radio hardware and apply the first configuration
    fn init(&mut self, config: &ValidatedConfig) -> impl Future<Output = Result<(), LoraError>>;

    /// Transmit data over LoRa
    ///
    /// Blocks until transmission is complete or an error occurs.
    fn transmit(&mut self, data: &[u8]) -> impl Future<Output = Result<(), LoraError>>;

    /// Reprogram the modulation, frequency and power
    ///
    /// Fails with [`LoraError::NotInitialised`] until `init` has succeeded.
    fn configure(&mut self, config: &ValidatedConfig)
        -> impl Future<Output = Result<(), LoraError>>;
}

#[cfg(test)]
pub mod mock {
    //! Mock LoRa radio for testing

    use super::*;
    use crate::config::protocol::MAX_LORA_PAYLOAD;
    use core::cell::RefCell;
    use heapless::Vec;

    /// Mock LoRa radio for unit testing
    pub struct MockLoraRadio {
        /// Record of transmitted packets
        tx_history: RefCell<Vec<Vec<u8, MAX_LORA_PAYLOAD>, 8>>,
        /// Every configuration applied, in order
        config_history: RefCell<Vec<ValidatedConfig, 8>>,
        /// Error to return on next transmit
        next_tx_error: RefCell<Option<LoraError>>,
        /// Error to return on next configure
        next_configure_error: RefCell<Option<LoraError>>,
        /// Whether init has been called
        initialised: RefCell<bool>,
    }

    impl MockLoraRadio {
        /// Create a new mock radio
        pub fn new() -> Self {
            Self {
                tx_history: RefCell::new(Vec::new()),
                config_history: RefCell::new(Vec::new()),
                next_tx_error: RefCell::new(None),
                next_configure_error: RefCell::new(None),
                initialised: RefCell::new(false),
            }
        }

        /// Set an error to be returned by the next transmit() call
        pub fn set_next_tx_error(&self, error: LoraError) {
            *self.next_tx_error.borrow_mut() = Some(error);
        }

        /// Set an error to be returned by the next configure() call
        pub fn set_next_configure_error(&self, error: LoraError) {
            *self.next_configure_error.borrow_mut() = Some(error);
        }

        /// Get all transmitted packets
        pub fn get_tx_history(&self) -> Vec<Vec<u8, MAX_LORA_PAYLOAD>, 8> {
            self.tx_history.borrow().clone()
        }

        /// Get every configuration applied so far
        pub fn get_config_history(&self) -> Vec<ValidatedConfig, 8> {
            self.config_history.borrow().clone()
        }

        /// Get the configuration most recently applied
        pub fn get_config(&self) -> Option<ValidatedConfig> {
            self.config_history.borrow().last().copied()
        }

        /// Check if the radio has been initialised
        pub fn is_initialised(&self) -> bool {
            *self.initialised.borrow()
        }

        fn apply(&self, config: &ValidatedConfig) -> Result<(), LoraError> {
            if let Some(error) = self.next_configure_error.borrow_mut().take() {
                return Err(error);
            }

            let _ = self.config_history.borrow_mut().push(*config);
            Ok(())
        }
    }

    impl Default for MockLoraRadio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LoraRadio for MockLoraRadio {
        async fn init(&mut self, config: &ValidatedConfig) -> Result<(), LoraError> {
            *self.initialised.borrow_mut() = false;
            self.apply(config)?;
            *self.initialised.borrow_mut() = true;
            Ok(())
        }

        async fn transmit(&mut self, data: &[u8]) -> Result<(), LoraError> {
            if !self.is_initialised() {
                return Err(LoraError::NotInitialised);
            }

            if let Some(error) = self.next_tx_error.borrow_mut().take() {
                return Err(error);
            }

            if data.is_empty() {
                return Err(LoraError::InvalidPayload);
            }

            let mut packet = Vec::new();
            packet
                .extend_from_slice(data)
                .map_err(|_| LoraError::InvalidPayload)?;
            let _ = self.tx_history.borrow_mut().push(packet);

            Ok(())
        }

        async fn configure(&mut self, config: &ValidatedConfig) -> Result<(), LoraError> {
            if !self.is_initialised() {
                return Err(LoraError::NotInitialised);
            }
            self.apply(config)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::radio::{Device, RadioConfig, RadioConfigValidator};

        fn boot_config() -> ValidatedConfig {
            RadioConfigValidator::for_device(Device::Sx1262)
                .validate(&RadioConfig::default())
                .unwrap()
        }

        #[test]
        fn test_mock_transmit() {
            let mut radio = MockLoraRadio::new();

            // Use a simple blocking executor for testing
            futures::executor::block_on(async {
                radio.init(&boot_config()).await.unwrap();

                let data = [0x01, 0x02, 0x03];
                radio.transmit(&data).await.unwrap();

                let history = radio.get_tx_history();
                assert_eq!(history.len(), 1);
                assert_eq!(history[0].as_slice(), &data);
            });
        }

        #[test]
        fn test_mock_transmit_before_init() {
            let mut radio = MockLoraRadio::new();

            futures::executor::block_on(async {
                let result = radio.transmit(&[0x01]).await;
                assert_eq!(result, Err(LoraError::NotInitialised));
            });
        }

        #[test]
        fn test_mock_init_records_config() {
            let mut radio = MockLoraRadio::new();

            futures::executor::block_on(async {
                radio.init(&boot_config()).await.unwrap();
                assert!(radio.is_initialised());
                assert_eq!(radio.get_config(), Some(boot_config()));
            });
        }

        #[test]
        fn test_mock_configure_before_init() {
            let mut radio = MockLoraRadio::new();

            futures::executor::block_on(async {
                let result = radio.configure(&boot_config()).await;
                assert_eq!(result, Err(LoraError::NotInitialised));
                assert_eq!(radio.get_config(), None);
            });
        }

        #[test]
        fn test_mock_failed_init_stays_uninitialised() {
            let mut radio = MockLoraRadio::new();

            futures::executor::block_on(async {
                radio.set_next_configure_error(LoraError::BusyTimeout);
                assert_eq!(
                    radio.init(&boot_config()).await,
                    Err(LoraError::BusyTimeout)
                );
                assert!(!radio.is_initialised());
                assert_eq!(
                    radio.configure(&boot_config()).await,
                    Err(LoraError::NotInitialised)
                );
                assert_eq!(radio.transmit(&[0x01]).await, Err(LoraError::NotInitialised));

                radio.init(&boot_config()).await.unwrap();
                radio.transmit(&[0x01]).await.unwrap();
            });
        }

        #[test]
        fn test_mock_tx_error() {
            let mut radio = MockLoraRadio::new();

            futures::executor::block_on(async {
                radio.init(&boot_config()).await.unwrap();
                radio.set_next_tx_error(LoraError::TransmitFailed);

                let result = radio.transmit(&[0x01]).await;
                assert_eq!(result, Err(LoraError::TransmitFailed));

                // Error should be cleared, next call should succeed
                radio.transmit(&[0x02]).await.unwrap();
            });
        }
    }
}
