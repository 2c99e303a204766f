use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::StreamConfig;
use crate::signal::SignalType;

/// One reconstructed sample of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Channel the sample belongs to.
    pub channel_index: u32,
    /// Absolute index since the stream was configured. Monotonic per stream.
    pub sample_index: u64,
    /// `sample_index * (1000 / sample_rate)`.
    pub timestamp_ms: u64,
    /// Signed raw value decoded from the wire.
    pub raw: i32,
    /// `raw * k` narrowed to `f32`.
    pub value: f32,
    /// Impedance of the channel's electrode when the sample was decoded.
    pub impedance: f32,
    /// Saturation of the channel's electrode when the sample was decoded.
    pub saturation: f32,
    /// True only for placeholders synthesized for lost packets.
    pub is_lost: bool,
}

/// Where the samples of a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    /// Decoded from a received packet.
    Packet,
    /// Synthesized for packets the transport dropped.
    GapFill,
}

/// Per-channel samples produced by one decode pass of one stream.
///
/// `channel_samples` holds one list per configured channel; inactive
/// channels stay empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleBatch {
    pub signal_type: SignalType,
    pub kind: BatchKind,
    /// Configuration the batch was decoded with.
    #[serde(with = "arc_stream_config")]
    pub config: Arc<StreamConfig>,
    pub channel_samples: Vec<Vec<Sample>>,
}

mod arc_stream_config {
    use super::StreamConfig;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::sync::Arc;

    pub fn serialize<S>(arc: &Arc<StreamConfig>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        arc.as_ref().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Arc<StreamConfig>, D::Error>
    where
        D: Deserializer<'de>,
    {
        StreamConfig::deserialize(deserializer).map(Arc::new)
    }
}

impl SampleBatch {
    /// An empty batch with one list per configured channel.
    pub fn new(signal_type: SignalType, kind: BatchKind, config: Arc<StreamConfig>) -> Self {
        let channel_samples = (0..config.channel_count).map(|_| Vec::new()).collect();
        Self {
            signal_type,
            kind,
            config,
            channel_samples,
        }
    }

    pub fn channel(&self, channel: usize) -> Option<&[Sample]> {
        self.channel_samples.get(channel).map(Vec::as_slice)
    }

    /// Total samples over all channels.
    pub fn sample_count(&self) -> usize {
        self.channel_samples.iter().map(Vec::len).sum()
    }

    pub fn lost_count(&self) -> usize {
        self.samples().filter(|s| s.is_lost).count()
    }

    pub fn is_empty(&self) -> bool {
        self.channel_samples.iter().all(Vec::is_empty)
    }

    /// All samples, channel by channel.
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.channel_samples.iter().flatten()
    }
}

/// Impedance and saturation of one electrode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectrodeReading {
    pub impedance: f32,
    pub saturation: f32,
}

/// The latest complete set of electrode readings, indexed by electrode
/// position. Replaced wholesale, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpedanceSnapshot {
    electrodes: Vec<ElectrodeReading>,
}

impl ImpedanceSnapshot {
    /// Pair up two equally long halves. Extra values in the longer half are
    /// dropped.
    pub fn from_halves(impedance: &[f32], saturation: &[f32]) -> Self {
        let electrodes = impedance
            .iter()
            .zip(saturation)
            .map(|(&impedance, &saturation)| ElectrodeReading { impedance, saturation })
            .collect();
        Self { electrodes }
    }

    pub fn get(&self, electrode: usize) -> Option<ElectrodeReading> {
        self.electrodes.get(electrode).copied()
    }

    /// Reading for `electrode`, or zeros when the snapshot has no such entry.
    pub fn reading_or_default(&self, electrode: usize) -> ElectrodeReading {
        self.get(electrode).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.electrodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.electrodes.is_empty()
    }
}
