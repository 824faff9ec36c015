//! Periodic transmit loop state
//!
//! One [`Transmitter`] owns the running packet counters. The task that drives
//! it decides when to send; this type only sends and keeps count.

use crate::lora::traits::{LoraError, LoraRadio};
use crate::radio::ValidatedConfig;

/// Packet counters since boot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxStats {
    pub sent: u32,
    pub failed: u32,
}

/// Sends packets and keeps count of the outcome
#[derive(Debug, Default)]
pub struct Transmitter {
    stats: TxStats,
    last_error: Option<LoraError>,
}

impl Transmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> TxStats {
        self.stats
    }

    pub fn last_error(&self) -> Option<LoraError> {
        self.last_error
    }

    /// Transmit one packet
    ///
    /// A failed send is counted and returned; the caller keeps looping.
    pub async fn send_packet<R: LoraRadio>(
        &mut self,
        radio: &mut R,
        payload: &[u8],
    ) -> Result<(), LoraError> {
        match radio.transmit(payload).await {
            Ok(()) => {
                self.stats.sent = self.stats.sent.wrapping_add(1);
                log::info!("tx: packet {} sent, {} bytes", self.stats.sent, payload.len());
                Ok(())
            }
            Err(err) => {
                self.stats.failed = self.stats.failed.wrapping_add(1);
                self.last_error = Some(err);
                log::warn!("tx: packet failed: {:?} ({} failures)", err, self.stats.failed);
                Err(err)
            }
        }
    }
}

/// Pause between packets for the given configuration, in milliseconds
pub fn packet_delay_ms(config: &ValidatedConfig) -> u64 {
    config.inter_packet_delay_ms() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::transmitter::PAYLOAD;
    use crate::lora::traits::mock::MockLoraRadio;
    use crate::radio::{Device, RadioConfig, RadioConfigValidator};

    fn boot_config() -> ValidatedConfig {
        RadioConfigValidator::for_device(Device::Sx1262)
            .validate(&RadioConfig::default())
            .unwrap()
    }

    #[test]
    fn test_send_packet_counts_success() {
        let mut radio = MockLoraRadio::new();
        let mut tx = Transmitter::new();

        futures::executor::block_on(async {
            radio.init(&boot_config()).await.unwrap();

            tx.send_packet(&mut radio, PAYLOAD).await.unwrap();
            tx.send_packet(&mut radio, PAYLOAD).await.unwrap();
        });

        assert_eq!(tx.stats(), TxStats { sent: 2, failed: 0 });
        assert_eq!(radio.get_tx_history()[0].as_slice(), PAYLOAD);
        assert_eq!(tx.last_error(), None);
    }

    #[test]
    fn test_send_packet_counts_failure() {
        let mut radio = MockLoraRadio::new();
        let mut tx = Transmitter::new();

        futures::executor::block_on(async {
            radio.init(&boot_config()).await.unwrap();
            radio.set_next_tx_error(LoraError::Timeout);

            assert_eq!(
                tx.send_packet(&mut radio, PAYLOAD).await,
                Err(LoraError::Timeout)
            );
            tx.send_packet(&mut radio, PAYLOAD).await.unwrap();
        });

        assert_eq!(tx.stats(), TxStats { sent: 1, failed: 1 });
        assert_eq!(tx.last_error(), Some(LoraError::Timeout));
    }

    #[test]
    fn test_send_before_init_fails() {
        let mut radio = MockLoraRadio::new();
        let mut tx = Transmitter::new();

        let result = futures::executor::block_on(tx.send_packet(&mut radio, PAYLOAD));
        assert_eq!(result, Err(LoraError::NotInitialised));
        assert_eq!(tx.stats().failed, 1);
    }

    #[test]
    fn test_packet_delay_follows_config() {
        assert_eq!(packet_delay_ms(&boot_config()), 1000);

        let config = RadioConfig {
            inter_packet_delay_ms: 0,
            ..RadioConfig::default()
        };
        let validated = RadioConfigValidator::for_device(Device::Sx1262)
            .validate(&config)
            .unwrap();
        assert_eq!(packet_delay_ms(&validated), 0);
    }
}
