//! LoRa symbol timing and time-on-air
//!
//! All arithmetic is integer. Bandwidths are 500 kHz / divisor, so a symbol
//! lasts exactly `2^SF * divisor * 2` microseconds.

use crate::radio::types::{Bandwidth, CodeRate, SpreadingFactor};
use crate::radio::validate::ValidatedConfig;

/// Duration of one LoRa symbol in microseconds
pub const fn symbol_duration_us(sf: SpreadingFactor, bw: Bandwidth) -> u32 {
    (1u32 << sf.value()) * bw.divisor() * 2
}

/// Packet framing that affects time on air
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketShape {
    /// Preamble length in symbols
    pub preamble_len: u16,
    pub payload_len: u8,
    /// Explicit (variable length) header
    pub explicit_header: bool,
    pub crc_on: bool,
}

/// Time on air for one packet, in microseconds
pub fn time_on_air_us(config: &ValidatedConfig, shape: &PacketShape) -> u32 {
    packet_time_us(
        config.spreading_factor(),
        config.bandwidth(),
        config.code_rate(),
        config.low_data_rate_optimize(),
        shape,
    )
}

/// Time on air computed from the raw modulation parameters
///
/// Follows the SX126x datasheet formula, including the shorter header
/// overhead of SF5 and SF6. Symbol counts are kept in quarter symbols so the
/// fractional preamble tail (4.25 or 6.25) stays exact.
pub fn packet_time_us(
    sf: SpreadingFactor,
    bw: Bandwidth,
    cr: CodeRate,
    ldro: bool,
    shape: &PacketShape,
) -> u32 {
    let sf_bits = sf.value() as i32;
    let short_sf = matches!(sf, SpreadingFactor::Sf5 | SpreadingFactor::Sf6);

    let mut bits = 8 * shape.payload_len as i32 - 4 * sf_bits;
    if shape.crc_on {
        bits += 16;
    }
    if shape.explicit_header {
        bits += 20;
    }
    if !short_sf {
        bits += 8;
    }

    let bits_per_block = if ldro && !short_sf {
        4 * (sf_bits - 2)
    } else {
        4 * sf_bits
    };

    let blocks = if bits > 0 {
        (bits + bits_per_block - 1) / bits_per_block
    } else {
        0
    };

    let payload_symbols = 8 + blocks as u32 * (cr.redundancy() as u32 + 4);
    let preamble_tail_quarters = if short_sf { 25 } else { 17 };
    let quarter_symbols =
        4 * shape.preamble_len as u32 + preamble_tail_quarters + 4 * payload_symbols;

    let symbol_us = symbol_duration_us(sf, bw) as u64;
    ((quarter_symbols as u64 * symbol_us) / 4) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(payload_len: u8) -> PacketShape {
        PacketShape {
            preamble_len: 8,
            payload_len,
            explicit_header: true,
            crc_on: true,
        }
    }

    #[test]
    fn test_symbol_duration() {
        assert_eq!(
            symbol_duration_us(SpreadingFactor::Sf7, Bandwidth::Bw125),
            1_024
        );
        assert_eq!(
            symbol_duration_us(SpreadingFactor::Sf9, Bandwidth::Bw125),
            4_096
        );
        assert_eq!(
            symbol_duration_us(SpreadingFactor::Sf12, Bandwidth::Bw125),
            32_768
        );
        assert_eq!(
            symbol_duration_us(SpreadingFactor::Sf5, Bandwidth::Bw500),
            64
        );
        assert_eq!(
            symbol_duration_us(SpreadingFactor::Sf12, Bandwidth::Bw7_8),
            524_288
        );
    }

    #[test]
    fn test_time_on_air_sf7() {
        // 8 + 4.25 + 8 + 8 * 5 = 60.25 symbols of 1.024 ms
        let toa = packet_time_us(
            SpreadingFactor::Sf7,
            Bandwidth::Bw125,
            CodeRate::Cr4_5,
            false,
            &shape(23),
        );
        assert_eq!(toa, 61_696);
    }

    #[test]
    fn test_time_on_air_sf12_with_ldro() {
        // 10 data bytes: ceil(76 / 40) = 2 blocks of 5 symbols
        let toa = packet_time_us(
            SpreadingFactor::Sf12,
            Bandwidth::Bw125,
            CodeRate::Cr4_5,
            true,
            &shape(10),
        );
        // (8 + 4.25 + 8 + 10) symbols of 32.768 ms
        assert_eq!(toa, 991_232);
    }

    #[test]
    fn test_time_on_air_sf5_short_header() {
        // 8*4 - 20 + 16 + 20 = 48 bits, 20 bits per block -> 3 blocks
        let toa = packet_time_us(
            SpreadingFactor::Sf5,
            Bandwidth::Bw125,
            CodeRate::Cr4_5,
            false,
            &shape(4),
        );
        // (8 + 6.25 + 8 + 15) symbols of 256 us
        assert_eq!(toa, 9_536);
    }

    #[test]
    fn test_empty_implicit_packet_has_fixed_overhead() {
        let shape = PacketShape {
            preamble_len: 8,
            payload_len: 0,
            explicit_header: false,
            crc_on: false,
        };
        let toa = packet_time_us(
            SpreadingFactor::Sf7,
            Bandwidth::Bw125,
            CodeRate::Cr4_8,
            false,
            &shape,
        );
        // (8 + 4.25 + 8) symbols, no payload blocks
        assert_eq!(toa, 20_736);
    }

    #[test]
    fn test_longer_code_rate_takes_longer() {
        let short = packet_time_us(
            SpreadingFactor::Sf9,
            Bandwidth::Bw125,
            CodeRate::Cr4_5,
            false,
            &shape(32),
        );
        let long = packet_time_us(
            SpreadingFactor::Sf9,
            Bandwidth::Bw125,
            CodeRate::Cr4_8,
            false,
            &shape(32),
        );
        assert!(long > short);
    }
}
