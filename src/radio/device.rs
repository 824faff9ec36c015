//! Per-device limits for the SX126x family

/// Supported radio chips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// Low power PA, +15 dBm max
    Sx1261,
    /// High power PA, +22 dBm max
    Sx1262,
    /// High power PA, restricted to the 410-810 MHz band
    Sx1268,
}

/// Limits the validator enforces for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    pub device: Device,
    pub min_frequency_hz: u32,
    pub max_frequency_hz: u32,
    /// Largest calibration offset magnitude accepted
    pub max_offset_hz: u32,
    pub min_power_dbm: i8,
    pub max_power_dbm: i8,
    /// Longest symbol the receiver can track, even with LDRO
    pub max_symbol_duration_us: u32,
    /// Auto LDRO switches on at or above this symbol duration
    pub ldro_threshold_us: u32,
}

/// SF12 at 15.6 kHz, or SF11 at 7.8 kHz
const MAX_SYMBOL_DURATION_US: u32 = 262_144;

const LDRO_THRESHOLD_US: u32 = 4_000;

const MAX_OFFSET_HZ: u32 = 100_000;

impl Device {
    pub const fn limits(self) -> DeviceLimits {
        match self {
            Self::Sx1261 => DeviceLimits {
                device: self,
                min_frequency_hz: 150_000_000,
                max_frequency_hz: 960_000_000,
                max_offset_hz: MAX_OFFSET_HZ,
                min_power_dbm: -17,
                max_power_dbm: 15,
                max_symbol_duration_us: MAX_SYMBOL_DURATION_US,
                ldro_threshold_us: LDRO_THRESHOLD_US,
            },
            Self::Sx1262 => DeviceLimits {
                device: self,
                min_frequency_hz: 150_000_000,
                max_frequency_hz: 960_000_000,
                max_offset_hz: MAX_OFFSET_HZ,
                min_power_dbm: -9,
                max_power_dbm: 22,
                max_symbol_duration_us: MAX_SYMBOL_DURATION_US,
                ldro_threshold_us: LDRO_THRESHOLD_US,
            },
            Self::Sx1268 => DeviceLimits {
                device: self,
                min_frequency_hz: 410_000_000,
                max_frequency_hz: 810_000_000,
                max_offset_hz: MAX_OFFSET_HZ,
                min_power_dbm: -9,
                max_power_dbm: 22,
                max_symbol_duration_us: MAX_SYMBOL_DURATION_US,
                ldro_threshold_us: LDRO_THRESHOLD_US,
            },
        }
    }
}

impl DeviceLimits {
    pub fn frequency_in_band(&self, frequency_hz: u32) -> bool {
        (self.min_frequency_hz..=self.max_frequency_hz).contains(&frequency_hz)
    }

    pub fn power_in_range(&self, tx_power_dbm: i8) -> bool {
        (self.min_power_dbm..=self.max_power_dbm).contains(&tx_power_dbm)
    }
}
