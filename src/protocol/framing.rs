//! Frame accumulator for the COBS-encoded serial protocol

use crate::config::protocol::{FRAME_DELIMITER, MAX_FRAME_SIZE};
use heapless::Vec;

/// Longest frame body, excluding the delimiter
pub const MAX_FRAME_LEN: usize = MAX_FRAME_SIZE - 1;

/// Accumulates incoming bytes and extracts complete COBS frames.
///
/// Frames are delimited by zero bytes. The delimiter itself is not part of
/// the returned frame, but one byte of capacity is left free so the decoder
/// can put it back.
pub struct FrameAccumulator {
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    overflowed: bool,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
        }
    }

    /// Push a byte into the accumulator.
    ///
    /// Returns `Some(frame)` when a delimiter ends a non-empty frame. A frame
    /// that outgrows the buffer is dropped up to its delimiter.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8, MAX_FRAME_SIZE>> {
        if byte == FRAME_DELIMITER {
            if self.overflowed {
                self.overflowed = false;
                return None;
            }
            if self.buffer.is_empty() {
                return None;
            }
            return Some(core::mem::take(&mut self.buffer));
        }

        if self.overflowed {
            return None;
        }

        if self.buffer.len() >= MAX_FRAME_LEN || self.buffer.push(byte).is_err() {
            log::warn!("framing: frame over {} bytes dropped", MAX_FRAME_LEN);
            self.buffer.clear();
            self.overflowed = true;
        }

        None
    }

    /// Reset the accumulator, discarding any partial frame.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
    }

    /// Returns true if no partial frame is in progress.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame() {
        let mut acc = FrameAccumulator::new();

        assert!(acc.push(0x01).is_none());
        assert!(acc.push(0x02).is_none());
        assert!(acc.push(0x03).is_none());

        let frame = acc.push(0x00).expect("Should return frame");
        assert_eq!(frame.as_slice(), &[0x01, 0x02, 0x03]);
        assert!(acc.is_empty());
    }

    #[test]
    fn test_empty_frames_ignored() {
        let mut acc = FrameAccumulator::new();

        assert!(acc.push(0x00).is_none());
        assert!(acc.push(0x00).is_none());
        assert!(acc.is_empty());
    }

    #[test]
    fn test_oversized_frame_dropped_whole() {
        let mut acc = FrameAccumulator::new();

        for _ in 0..MAX_FRAME_SIZE + 10 {
            assert!(acc.push(0xAA).is_none());
        }
        // The tail of the oversized frame must not come out as a frame
        assert!(acc.push(0x00).is_none());

        acc.push(0x05);
        let frame = acc.push(0x00).expect("Should return frame");
        assert_eq!(frame.as_slice(), &[0x05]);
    }

    #[test]
    fn test_frame_leaves_room_for_delimiter() {
        let mut acc = FrameAccumulator::new();

        for _ in 0..MAX_FRAME_LEN {
            acc.push(0xAA);
        }
        let mut frame = acc.push(0x00).expect("Longest frame should pass");
        assert_eq!(frame.len(), MAX_FRAME_LEN);
        assert!(frame.push(FRAME_DELIMITER).is_ok());

        // One byte more is an overflow
        for _ in 0..MAX_FRAME_SIZE {
            acc.push(0xAA);
        }
        assert!(acc.push(0x00).is_none());
    }

    #[test]
    fn test_reset() {
        let mut acc = FrameAccumulator::new();

        acc.push(0x01);
        acc.push(0x02);
        assert!(!acc.is_empty());

        acc.reset();
        assert!(acc.is_empty());

        acc.push(0x03);
        let frame = acc.push(0x00).expect("Should return frame");
        assert_eq!(frame.as_slice(), &[0x03]);
    }
}
