//! Placeholder samples for packets the transport dropped.

use biosignal_types::SampleBatch;
use std::convert::Infallible;

use crate::demux::{ChannelDemultiplexer, SlotValue};

pub struct GapFiller;

impl GapFiller {
    /// Append `lost_packets * package_sample_count` lost samples per active
    /// channel, numbered from `first_index`.
    ///
    /// Placeholders carry raw 0, value 0 and the same impedance tagging as
    /// real samples.
    pub fn fill(
        demux: &ChannelDemultiplexer<'_>,
        batch: &mut SampleBatch,
        first_index: u64,
        lost_packets: u32,
    ) {
        let slots = u64::from(lost_packets) * u64::from(demux.config().package_sample_count);
        demux
            .demux(batch, first_index, slots, |_| Ok::<_, Infallible>(SlotValue::LOST))
            .unwrap_or_else(|never| match never {});
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosignal_types::{BatchKind, ImpedanceSnapshot, Sample16Encoding, SignalType, StreamConfig};
    use std::sync::Arc;

    #[test]
    fn test_fills_every_active_channel() {
        let config = Arc::new(StreamConfig {
            resolution_bits: 24,
            sample_rate: 500,
            channel_count: 3,
            channel_mask: 0b011,
            package_sample_count: 4,
            k: 1.0,
            sample16_encoding: Sample16Encoding::default(),
        });
        let snapshot = ImpedanceSnapshot::from_halves(&[7.0, 8.0], &[0.0, 1.0]);
        let demux = ChannelDemultiplexer::new(&config, &snapshot, Some(0));
        let mut batch = SampleBatch::new(SignalType::Eeg, BatchKind::GapFill, config.clone());

        GapFiller::fill(&demux, &mut batch, 44, 2);

        assert_eq!(batch.sample_count(), 2 * 2 * 4);
        assert_eq!(batch.lost_count(), batch.sample_count());
        assert!(batch.channel_samples[2].is_empty());

        let ch1 = &batch.channel_samples[1];
        let indices: Vec<u64> = ch1.iter().map(|s| s.sample_index).collect();
        assert_eq!(indices, (44..52).collect::<Vec<_>>());
        assert!(ch1.iter().all(|s| s.raw == 0 && s.value == 0.0 && s.impedance == 8.0));
        assert_eq!(ch1[0].timestamp_ms, 88);
    }
}
