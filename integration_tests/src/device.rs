//! Device communication client.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use serialport::SerialPort;

use crate::protocol::{
    build_command_payload, cobs_decode, cobs_encode, parse_response, ActiveConfig, CommandId,
    ConfigRecord, Response, ResponseId,
};

/// Find the data port by scanning ttyACM devices and probing with GetVersion.
pub fn find_data_port() -> Result<String> {
    for port_info in serialport::available_ports()? {
        if !port_info.port_name.contains("ttyACM") {
            continue;
        }

        if let Ok(mut client) = DeviceClient::new(&port_info.port_name, 115200) {
            client.set_timeout(Duration::from_millis(500));
            if let Ok(response) = client.send_command(CommandId::GetVersion, &[]) {
                if response.resp_id == ResponseId::Version {
                    return Ok(port_info.port_name);
                }
            }
        }
    }

    anyhow::bail!("No data port found - ensure device is connected")
}

/// Resolve a port argument - returns the port path if not "auto", otherwise auto-detects.
pub fn resolve_port(port_arg: &str) -> Result<String> {
    if port_arg == "auto" {
        find_data_port()
    } else {
        Ok(port_arg.to_string())
    }
}

/// Client for talking to the transmitter firmware.
pub struct DeviceClient {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl DeviceClient {
    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;

        Ok(Self {
            port,
            timeout: Duration::from_secs(3),
        })
    }

    /// Set the response timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Clear any pending data in the serial buffer.
    pub fn clear_buffer(&mut self) -> Result<()> {
        self.port.clear(serialport::ClearBuffer::All)?;
        Ok(())
    }

    /// Send a command and wait for response.
    pub fn send_command(&mut self, cmd_id: CommandId, payload: &[u8]) -> Result<Response> {
        self.send_raw_command(cmd_id as u8, payload)
    }

    /// Send a command with an arbitrary ID byte (for testing invalid commands).
    pub fn send_raw_command(&mut self, cmd_id: u8, payload: &[u8]) -> Result<Response> {
        let encoded = cobs_encode(&build_command_payload(cmd_id, payload));
        self.send_encoded(&encoded)
    }

    /// Send pre-encoded bytes and wait for one response frame.
    pub fn send_encoded(&mut self, encoded: &[u8]) -> Result<Response> {
        self.port.write_all(encoded)?;
        self.port.flush()?;

        let mut frame = self.read_frame()?;
        // corncobs expects the delimiter
        frame.push(0x00);
        parse_response(&cobs_decode(&frame)?)
    }

    /// Read bytes until zero delimiter.
    fn read_frame(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut buf = [0u8; 1];
        let start = Instant::now();

        // The transmitter serves commands between packets, so a reply can
        // lag by up to one time-on-air
        while start.elapsed() < self.timeout {
            match self.port.read(&mut buf) {
                Ok(1) => {
                    if buf[0] == 0x00 {
                        if !data.is_empty() {
                            return Ok(data);
                        }
                    } else {
                        data.push(buf[0]);
                    }
                }
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e.into()),
            }
        }

        anyhow::bail!(
            "Timeout waiting for response, got {} bytes: {:02x?}",
            data.len(),
            data
        );
    }

    /// Read the active configuration.
    pub fn get_config(&mut self) -> Result<ActiveConfig> {
        let response = self.send_command(CommandId::GetConfig, &[])?;
        if response.resp_id != ResponseId::Config {
            anyhow::bail!("Expected Config response, got {:?}", response);
        }
        ActiveConfig::decode(&response.payload)
    }

    /// Request a new configuration; returns the raw response so callers can
    /// check rejections.
    pub fn set_config(&mut self, record: &ConfigRecord) -> Result<Response> {
        self.send_command(CommandId::SetConfig, &record.encode())
    }
}
