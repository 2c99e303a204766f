//! Signal types multiplexed onto the device's notification channel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant byte of an accelerometer packet.
pub const NTF_ACC: u8 = 0x01;
/// Discriminant byte of a gyroscope packet.
pub const NTF_GYRO: u8 = 0x02;
/// Discriminant byte of an EEG packet.
pub const NTF_EEG: u8 = 0x10;
/// Discriminant byte of an ECG packet.
pub const NTF_ECG: u8 = 0x11;
/// Discriminant byte of an impedance/saturation telemetry packet.
pub const NTF_IMPEDANCE: u8 = 0x12;

/// A sample-carrying stream on the notification channel.
///
/// Impedance telemetry is not a sample stream; it is represented by
/// [`PacketType::Impedance`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    /// Accelerometer (inertial)
    Acc,
    /// Gyroscope (inertial)
    Gyro,
    /// Primary bioelectric stream
    Eeg,
    /// Bioelectric stream sharing the EEG electrode set
    Ecg,
}

/// How samples of a stream pick their impedance/saturation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpedanceRule {
    /// Never tagged; impedance and saturation stay 0.
    Untagged,
    /// The Nth active channel reads snapshot entry N.
    Primary,
    /// The Nth active channel reads snapshot entry `channel_count(of) + N`.
    OffsetBy(SignalType),
}

/// Per-variant decode strategy, selected once from the signal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStrategy {
    /// Width of the channel bitmask the device reports for this stream.
    pub mask_width: u32,
    /// Impedance tagging rule.
    pub impedance: ImpedanceRule,
}

impl SignalType {
    /// All sample streams, in storage order.
    pub const ALL: [SignalType; 4] = [SignalType::Acc, SignalType::Gyro, SignalType::Eeg, SignalType::Ecg];

    /// Dense index used for per-stream storage.
    pub fn index(self) -> usize {
        match self {
            SignalType::Acc => 0,
            SignalType::Gyro => 1,
            SignalType::Eeg => 2,
            SignalType::Ecg => 3,
        }
    }

    /// The discriminant byte this stream uses on the wire.
    pub fn discriminant(self) -> u8 {
        match self {
            SignalType::Acc => NTF_ACC,
            SignalType::Gyro => NTF_GYRO,
            SignalType::Eeg => NTF_EEG,
            SignalType::Ecg => NTF_ECG,
        }
    }

    pub fn strategy(self) -> DecodeStrategy {
        match self {
            SignalType::Eeg => DecodeStrategy {
                mask_width: 64,
                impedance: ImpedanceRule::Primary,
            },
            SignalType::Ecg => DecodeStrategy {
                mask_width: 32,
                impedance: ImpedanceRule::OffsetBy(SignalType::Eeg),
            },
            SignalType::Acc | SignalType::Gyro => DecodeStrategy {
                mask_width: 32,
                impedance: ImpedanceRule::Untagged,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SignalType::Acc => "acc",
            SignalType::Gyro => "gyro",
            SignalType::Eeg => "eeg",
            SignalType::Ecg => "ecg",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// What byte 0 of a notification says the packet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Samples(SignalType),
    Impedance,
}

impl PacketType {
    /// Classify a discriminant byte. Returns `None` for unknown values.
    pub fn from_discriminant(byte: u8) -> Option<Self> {
        match byte {
            NTF_ACC => Some(PacketType::Samples(SignalType::Acc)),
            NTF_GYRO => Some(PacketType::Samples(SignalType::Gyro)),
            NTF_EEG => Some(PacketType::Samples(SignalType::Eeg)),
            NTF_ECG => Some(PacketType::Samples(SignalType::Ecg)),
            NTF_IMPEDANCE => Some(PacketType::Impedance),
            _ => None,
        }
    }
}
