//! SX126x LoRa transmit driver
//!
//! Implements the LoraRadio trait over an async SPI bus with manual NSS
//! control. Command payloads come from [`crate::radio::registers`].

use crate::config::protocol::MAX_LORA_PAYLOAD;
use crate::config::{tcxo, transmitter};
use crate::lora::traits::{LoraError, LoraRadio};
use crate::radio::registers;
use crate::radio::{PacketShape, ValidatedConfig};
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::spi::SpiBus;

/// SX126x command opcodes
mod cmd {
    pub const SET_STANDBY: u8 = 0x80;
    pub const SET_TX: u8 = 0x83;
    pub const SET_RF_FREQUENCY: u8 = 0x86;
    pub const SET_PACKET_TYPE: u8 = 0x8A;
    pub const SET_MODULATION_PARAMS: u8 = 0x8B;
    pub const SET_PACKET_PARAMS: u8 = 0x8C;
    pub const SET_BUFFER_BASE_ADDRESS: u8 = 0x8F;
    pub const SET_PA_CONFIG: u8 = 0x95;
    pub const SET_DIO3_AS_TCXO_CTRL: u8 = 0x97;
    pub const SET_DIO2_AS_RF_SWITCH_CTRL: u8 = 0x9D;
    pub const SET_TX_PARAMS: u8 = 0x8E;
    pub const CALIBRATE_IMAGE: u8 = 0x98;
    pub const WRITE_BUFFER: u8 = 0x0E;
    pub const WRITE_REGISTER: u8 = 0x0D;
    pub const GET_IRQ_STATUS: u8 = 0x12;
    pub const CLEAR_IRQ_STATUS: u8 = 0x02;
    pub const SET_DIO_IRQ_PARAMS: u8 = 0x08;
}

/// SX126x register addresses
mod reg {
    /// Over-current protection register
    pub const OCP_CONFIGURATION: u16 = 0x08E7;
}

mod standby {
    pub const STDBY_RC: u8 = 0x00;
}

mod packet_type {
    pub const LORA: u8 = 0x01;
}

/// IRQ masks
mod irq {
    pub const TX_DONE: u16 = 0x0001;
    pub const TIMEOUT: u16 = 0x0200;
    pub const ALL: u16 = 0xFFFF;
}

/// Control pins for the SX126x
pub struct Sx126xPins<Nss, Dio1, Nrst, Busy> {
    pub nss: Nss,
    pub dio1: Dio1,
    pub nrst: Nrst,
    pub busy: Busy,
}

/// SX126x LoRa transmitter driver
///
/// Holds the last configuration it applied so each transmit can size its
/// timeout from the time on air. `configure` and `transmit` refuse to run
/// until `init` has completed.
pub struct Sx126xDriver<Spi, Nss, Dio1, Nrst, Busy>
where
    Spi: SpiBus,
    Nss: OutputPin,
    Dio1: InputPin,
    Nrst: OutputPin,
    Busy: InputPin,
{
    spi: Spi,
    nss: Nss,
    dio1: Dio1,
    nrst: Nrst,
    busy: Busy,
    config: Option<ValidatedConfig>,
    initialised: bool,
}

impl<Spi, Nss, Dio1, Nrst, Busy> Sx126xDriver<Spi, Nss, Dio1, Nrst, Busy>
where
    Spi: SpiBus,
    Nss: OutputPin,
    Dio1: InputPin,
    Nrst: OutputPin,
    Busy: InputPin,
{
    pub fn new(spi: Spi, pins: Sx126xPins<Nss, Dio1, Nrst, Busy>) -> Self {
        Self {
            spi,
            nss: pins.nss,
            dio1: pins.dio1,
            nrst: pins.nrst,
            busy: pins.busy,
            config: None,
            initialised: false,
        }
    }

    async fn reset(&mut self) {
        let _ = self.nrst.set_low();
        Timer::after(Duration::from_millis(10)).await;
        let _ = self.nrst.set_high();
        Timer::after(Duration::from_millis(20)).await;
    }

    /// Wait for the BUSY pin to go low
    async fn wait_not_busy(&mut self) -> Result<(), LoraError> {
        for _ in 0..1000 {
            if self.busy.is_low().unwrap_or(false) {
                return Ok(());
            }
            Timer::after(Duration::from_micros(100)).await;
        }
        Err(LoraError::BusyTimeout)
    }

    async fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), LoraError> {
        self.wait_not_busy().await?;

        let mut buf = [0u8; 16];
        buf[0] = cmd;
        let len = 1 + data.len().min(15);
        buf[1..len].copy_from_slice(&data[..len - 1]);

        let _ = self.nss.set_low();
        let result = self.spi.write(&buf[..len]).await;
        let _ = self.nss.set_high();

        result.map_err(|_| LoraError::SpiError)
    }

    async fn read_command(&mut self, cmd: u8, len: usize) -> Result<[u8; 16], LoraError> {
        self.wait_not_busy().await?;

        // Command byte + NOP, then the response
        let mut tx_buf = [0u8; 18];
        let mut rx_buf = [0u8; 18];
        tx_buf[0] = cmd;

        let total_len = 2 + len;
        let _ = self.nss.set_low();
        let result = self
            .spi
            .transfer(&mut rx_buf[..total_len], &tx_buf[..total_len])
            .await;
        let _ = self.nss.set_high();
        result.map_err(|_| LoraError::SpiError)?;

        let mut out = [0u8; 16];
        out[..len].copy_from_slice(&rx_buf[2..2 + len]);
        Ok(out)
    }

    async fn write_register(&mut self, addr: u16, value: u8) -> Result<(), LoraError> {
        let addr = addr.to_be_bytes();
        self.write_command(cmd::WRITE_REGISTER, &[addr[0], addr[1], value])
            .await
    }


    async fn set_standby(&mut self) -> Result<(), LoraError> {
        self.write_command(cmd::SET_STANDBY, &[standby::STDBY_RC])
            .await
    }

    async fn configure_irq(&mut self, irq_mask: u16) -> Result<(), LoraError> {
        let mask = irq_mask.to_be_bytes();
        let data = [
            mask[0], mask[1], // IRQ mask
            mask[0], mask[1], // DIO1
            0x00, 0x00, // DIO2
            0x00, 0x00, // DIO3
        ];
        self.write_command(cmd::SET_DIO_IRQ_PARAMS, &data).await
    }

    async fn clear_irq(&mut self, irq_mask: u16) -> Result<(), LoraError> {
        self.write_command(cmd::CLEAR_IRQ_STATUS, &irq_mask.to_be_bytes())
            .await
    }

    async fn get_irq_status(&mut self) -> Result<u16, LoraError> {
        let result = self.read_command(cmd::GET_IRQ_STATUS, 2).await?;
        Ok(u16::from_be_bytes([result[0], result[1]]))
    }

    async fn write_buffer(&mut self, offset: u8, data: &[u8]) -> Result<(), LoraError> {
        self.wait_not_busy().await?;

        let mut buf = [0u8; 2 + MAX_LORA_PAYLOAD];
        buf[0] = cmd::WRITE_BUFFER;
        buf[1] = offset;
        let len = data.len().min(MAX_LORA_PAYLOAD);
        buf[2..2 + len].copy_from_slice(&data[..len]);

        let _ = self.nss.set_low();
        let result = self.spi.write(&buf[..2 + len]).await;
        let _ = self.nss.set_high();

        result.map_err(|_| LoraError::SpiError)
    }

    /// Wait for DIO1 with a deadline
    async fn wait_for_irq(&mut self, timeout_ms: u32) -> Result<u16, LoraError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);

        loop {
            if self.dio1.is_high().unwrap_or(false) {
                return self.get_irq_status().await;
            }

            if Instant::now() >= deadline {
                return Err(LoraError::Timeout);
            }

            Timer::after(Duration::from_micros(100)).await;
        }
    }

    /// Program frequency, modulation and power
    async fn apply_config(&mut self, config: &ValidatedConfig) -> Result<(), LoraError> {
        self.set_standby().await?;

        self.write_command(
            cmd::CALIBRATE_IMAGE,
            &registers::calibrate_image(config.frequency_hz()),
        )
        .await?;
        self.write_command(cmd::SET_RF_FREQUENCY, &registers::rf_frequency(config))
            .await?;
        self.write_command(
            cmd::SET_MODULATION_PARAMS,
            &registers::modulation_params(config),
        )
        .await?;
        // PA config must precede SetTxParams
        self.write_command(cmd::SET_PA_CONFIG, &registers::pa_config(config))
            .await?;
        self.write_register(
            reg::OCP_CONFIGURATION,
            registers::ocp_configuration(config.device()),
        )
        .await?;
        self.write_command(cmd::SET_TX_PARAMS, &registers::tx_params(config))
            .await?;

        log::debug!(
            "lora: applied {} Hz {:?} {:?} ldro={}",
            config.frequency_hz(),
            config.spreading_factor(),
            config.bandwidth(),
            config.low_data_rate_optimize()
        );
        self.config = Some(*config);
        Ok(())
    }

    fn packet_shape(payload_len: u8) -> PacketShape {
        PacketShape {
            preamble_len: transmitter::PREAMBLE_LEN,
            payload_len,
            explicit_header: true,
            crc_on: true,
        }
    }
}

impl<Spi, Nss, Dio1, Nrst, Busy> LoraRadio for Sx126xDriver<Spi, Nss, Dio1, Nrst, Busy>
where
    Spi: SpiBus,
    Nss: OutputPin,
    Dio1: InputPin,
    Nrst: OutputPin,
    Busy: InputPin,
{
    async fn init(&mut self, config: &ValidatedConfig) -> Result<(), LoraError> {
        self.initialised = false;
        self.reset().await;
        self.wait_not_busy().await?;
        self.set_standby().await?;

        let tcxo = registers::tcxo_control(tcxo::VOLTAGE_CODE, tcxo::STARTUP_DELAY);
        self.write_command(cmd::SET_DIO3_AS_TCXO_CTRL, &tcxo).await?;
        Timer::after(Duration::from_millis(10)).await;

        self.write_command(cmd::SET_DIO2_AS_RF_SWITCH_CTRL, &[0x01])
            .await?;
        self.write_command(cmd::SET_PACKET_TYPE, &[packet_type::LORA])
            .await?;
        self.write_command(cmd::SET_BUFFER_BASE_ADDRESS, &[0x00, 0x00])
            .await?;

        self.apply_config(config).await?;
        self.initialised = true;
        log::info!("lora: {:?} initialised", config.device());
        Ok(())
    }

    async fn transmit(&mut self, data: &[u8]) -> Result<(), LoraError> {
        if !self.initialised {
            return Err(LoraError::NotInitialised);
        }
        let config = self.config.ok_or(LoraError::NotInitialised)?;

        if data.is_empty() || data.len() > MAX_LORA_PAYLOAD {
            return Err(LoraError::InvalidPayload);
        }

        let shape = Self::packet_shape(data.len() as u8);

        self.set_standby().await?;
        self.write_command(cmd::SET_PACKET_PARAMS, &registers::packet_params(&shape))
            .await?;
        self.write_buffer(0x00, data).await?;

        self.configure_irq(irq::TX_DONE | irq::TIMEOUT).await?;
        self.clear_irq(irq::ALL).await?;

        let timeout = registers::tx_timeout(&config, &shape, transmitter::TX_TIMEOUT_MARGIN_MS);
        self.write_command(cmd::SET_TX, &timeout).await?;

        // Host-side deadline sits past the radio's own timeout
        let toa_ms = crate::radio::timing::time_on_air_us(&config, &shape).div_ceil(1000);
        let irq_status = self
            .wait_for_irq(toa_ms + 2 * transmitter::TX_TIMEOUT_MARGIN_MS)
            .await?;
        self.clear_irq(irq::ALL).await?;

        if irq_status & irq::TIMEOUT != 0 {
            log::warn!("lora: radio reported tx timeout");
            return Err(LoraError::Timeout);
        }
        if irq_status & irq::TX_DONE == 0 {
            return Err(LoraError::TransmitFailed);
        }
        Ok(())
    }

    async fn configure(&mut self, config: &ValidatedConfig) -> Result<(), LoraError> {
        if !self.initialised {
            return Err(LoraError::NotInitialised);
        }
        self.apply_config(config).await
    }
}
