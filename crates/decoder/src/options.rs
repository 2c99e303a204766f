//! Decoder behaviour that differs between firmware revisions.

use serde::{Deserialize, Serialize};

/// Per-decoder options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderOptions {
    /// Drop packets whose counter equals the last accepted one.
    #[serde(default = "default_reject_repeated_counter")]
    pub reject_repeated_counter: bool,
    /// Largest loss, in packets, that is gap-filled. Larger jumps resync.
    #[serde(default = "default_max_gap_packets")]
    pub max_gap_packets: u32,
    /// Largest gap fill, in placeholder samples over all active channels.
    /// Larger losses resync.
    #[serde(default = "default_max_gap_samples")]
    pub max_gap_samples: u64,
    /// Divisor applied to saturation values of impedance packets.
    #[serde(default)]
    pub saturation_divisor: Option<f32>,
}

fn default_reject_repeated_counter() -> bool { true }
fn default_max_gap_packets() -> u32 { 32_768 }
fn default_max_gap_samples() -> u64 { 20_000 }

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            reject_repeated_counter: default_reject_repeated_counter(),
            max_gap_packets: default_max_gap_packets(),
            max_gap_samples: default_max_gap_samples(),
            saturation_divisor: None,
        }
    }
}
