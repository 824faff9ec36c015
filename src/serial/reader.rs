//! Serial command reader
//!
//! Reads bytes from a serial port, accumulates COBS frames, decodes them and
//! parses commands.

use crate::commands::parser::CommandParser;
use crate::commands::serialiser::cobs_decode;
use crate::commands::types::{Command, ResponseStatus};
use crate::config::protocol::{FRAME_DELIMITER, MAX_FRAME_SIZE};
use crate::config::serial::READ_CHUNK_SIZE;
use crate::protocol::framing::FrameAccumulator;
use crate::serial::traits::{SerialError, SerialPort};
use heapless::Vec;

/// Result of attempting to read a command
#[derive(Debug, PartialEq)]
pub enum ReadResult {
    /// Successfully parsed a command
    Command(Command),
    /// Parse error: status and the command ID byte it refers to
    ParseError(ResponseStatus, u8),
    /// Serial error
    SerialError(SerialError),
}

/// Serial command reader
///
/// Bytes read past the end of a frame are kept for the next call, so
/// dropping a `read_command` future while it waits on the port loses nothing.
pub struct SerialCommandReader {
    accumulator: FrameAccumulator,
    parser: CommandParser,
    sequence_counter: u16,
    chunk: [u8; READ_CHUNK_SIZE],
    chunk_pos: usize,
    chunk_len: usize,
}

impl SerialCommandReader {
    pub fn new() -> Self {
        Self {
            accumulator: FrameAccumulator::new(),
            parser: CommandParser::new(),
            sequence_counter: 0,
            chunk: [0u8; READ_CHUNK_SIZE],
            chunk_pos: 0,
            chunk_len: 0,
        }
    }

    /// Get the next sequence ID
    pub fn next_sequence_id(&mut self) -> u16 {
        let id = self.sequence_counter;
        self.sequence_counter = self.sequence_counter.wrapping_add(1);
        id
    }

    /// Read and parse the next complete frame from the serial port
    ///
    /// Frames that fail COBS decoding are dropped silently.
    pub async fn read_command<S: SerialPort>(&mut self, serial: &mut S) -> ReadResult {
        loop {
            while self.chunk_pos < self.chunk_len {
                let byte = self.chunk[self.chunk_pos];
                self.chunk_pos += 1;

                if let Some(frame) = self.accumulator.push(byte) {
                    if let Some(result) = self.process_frame(frame) {
                        return result;
                    }
                }
            }

            match serial.read(&mut self.chunk).await {
                Ok(n) => {
                    self.chunk_pos = 0;
                    self.chunk_len = n;
                }
                Err(e) => return ReadResult::SerialError(e),
            }
        }
    }

    /// Decode and parse one frame as produced by the accumulator
    pub fn process_frame(&self, mut frame: Vec<u8, MAX_FRAME_SIZE>) -> Option<ReadResult> {
        // corncobs expects the delimiter the accumulator strips
        if frame.push(FRAME_DELIMITER).is_err() {
            log::warn!("serial: frame of {} bytes has no room for delimiter", frame.len());
            return None;
        }

        let decoded = cobs_decode(&frame).ok()?;
        if decoded.is_empty() {
            return None;
        }

        // [version][cmd_id]...
        let command_id = decoded.get(1).copied().unwrap_or(0);

        match self.parser.parse(&decoded) {
            Ok(cmd) => Some(ReadResult::Command(cmd)),
            Err(status) => {
                log::debug!("serial: rejected frame for 0x{:02x}: {:?}", command_id, status);
                Some(ReadResult::ParseError(status, command_id))
            }
        }
    }

    /// Discard any partial frame and buffered bytes
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.chunk_pos = 0;
        self.chunk_len = 0;
    }
}

impl Default for SerialCommandReader {
    fn default() -> Self {
        Self::new()
    }
}
