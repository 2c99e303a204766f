//! Stream configuration records reported by the device's capability exchange.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signal::SignalType;

/// Byte layout of 16-bit samples. Firmware revisions changed it, so it is
/// chosen per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sample16Encoding {
    /// `(b0 << 8 | b1) - 32768`
    #[default]
    BigEndianOffset,
    /// Native signed 16-bit, little-endian.
    LittleEndianSigned,
}

/// Configuration of one (device, signal type) stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample width on the wire: 8, 16 or 24 bits.
    pub resolution_bits: u8,
    /// Sample rate in Hz. Must divide 1000.
    pub sample_rate: u32,
    /// Number of channels the stream exposes (active or not).
    pub channel_count: u32,
    /// Bit i set means channel i is active.
    pub channel_mask: u64,
    /// Samples per channel carried by one packet.
    pub package_sample_count: u32,
    /// Linear scale: `raw * k` is the physical value.
    pub k: f64,
    /// Layout of 16-bit samples; ignored at other resolutions.
    #[serde(default)]
    pub sample16_encoding: Sample16Encoding,
}

impl StreamConfig {
    /// Check the record against the invariants of `signal`'s stream.
    pub fn validate(&self, signal: SignalType) -> Result<(), ConfigError> {
        if !matches!(self.resolution_bits, 8 | 16 | 24) {
            return Err(ConfigError::UnsupportedResolution(self.resolution_bits));
        }
        if self.sample_rate == 0 || self.sample_rate > 1000 || 1000 % self.sample_rate != 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        let mask_width = signal.strategy().mask_width;
        if self.channel_count > mask_width {
            return Err(ConfigError::TooManyChannels {
                signal_type: signal,
                channel_count: self.channel_count,
                mask_width,
            });
        }
        if self.package_sample_count == 0 {
            return Err(ConfigError::ZeroPackageSampleCount);
        }
        if !self.k.is_finite() {
            return Err(ConfigError::InvalidScale(self.k));
        }
        Ok(())
    }

    pub fn is_channel_active(&self, channel: u32) -> bool {
        channel < self.channel_count && channel < 64 && self.channel_mask & (1u64 << channel) != 0
    }

    /// Active channel indices in ascending order.
    pub fn active_channels(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.channel_count).filter(move |&ch| self.is_channel_active(ch))
    }

    pub fn active_channel_count(&self) -> usize {
        self.active_channels().count()
    }

    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.resolution_bits / 8)
    }

    /// Payload bytes (after the header) one packet of this stream carries.
    pub fn payload_len(&self) -> usize {
        self.active_channel_count() * self.package_sample_count as usize * self.bytes_per_sample()
    }

    pub fn sample_interval_ms(&self) -> u64 {
        1000 / u64::from(self.sample_rate.max(1))
    }
}
