//! Errors reported across the decoder's boundaries.

use serde::{Deserialize, Serialize};

use crate::signal::SignalType;

/// A packet that could not be decoded.
///
/// These are reported to the delivery side; none of them ends the device
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DecodeError {
    /// The notification carried no bytes at all.
    #[error("empty notification packet")]
    EmptyPacket,
    /// Byte 0 is not a known signal type.
    #[error("unknown signal type discriminant 0x{0:02x}")]
    UnknownSignalType(u8),
    /// The payload is shorter than the stream configuration requires.
    #[error("truncated {signal_type} packet: expected {expected} bytes, got {actual}")]
    Truncated {
        signal_type: SignalType,
        expected: usize,
        actual: usize,
    },
    /// A sample packet arrived before its stream was configured.
    #[error("{0} stream is not configured")]
    Unconfigured(SignalType),
    /// The impedance payload is not a whole number of float pairs.
    #[error("malformed impedance packet of {len} bytes")]
    MalformedImpedance { len: usize },
}

/// A stream configuration that violates the stream's invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported resolution: {0} bits (expected 8, 16 or 24)")]
    UnsupportedResolution(u8),
    #[error("sample rate {0} Hz does not divide 1000")]
    InvalidSampleRate(u32),
    #[error("{signal_type} stream declares {channel_count} channels but its mask is {mask_width} bits wide")]
    TooManyChannels {
        signal_type: SignalType,
        channel_count: u32,
        mask_width: u32,
    },
    #[error("package sample count must be greater than 0")]
    ZeroPackageSampleCount,
    #[error("scale factor {0} is not finite")]
    InvalidScale(f64),
}
