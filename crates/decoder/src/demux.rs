//! Channel bitmask demultiplexing.
//!
//! Payload samples are slot-major: for every sample slot of the packet, one
//! field per active channel in ascending channel order.

use biosignal_types::{ElectrodeReading, ImpedanceSnapshot, Sample, SampleBatch, StreamConfig};

use crate::sample::{OutOfRange, SampleDecoder};

/// Value of one slot of one channel before tagging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotValue {
    pub raw: i32,
    pub value: f32,
    pub is_lost: bool,
}

impl SlotValue {
    pub const LOST: SlotValue = SlotValue {
        raw: 0,
        value: 0.0,
        is_lost: true,
    };
}

/// Walks a stream's active channels and appends samples to a batch.
pub struct ChannelDemultiplexer<'a> {
    config: &'a StreamConfig,
    snapshot: &'a ImpedanceSnapshot,
    /// Snapshot entry of the first active channel; `None` leaves samples untagged.
    electrode_base: Option<usize>,
}

impl<'a> ChannelDemultiplexer<'a> {
    pub fn new(
        config: &'a StreamConfig,
        snapshot: &'a ImpedanceSnapshot,
        electrode_base: Option<usize>,
    ) -> Self {
        Self {
            config,
            snapshot,
            electrode_base,
        }
    }

    pub fn config(&self) -> &StreamConfig {
        self.config
    }

    /// Impedance/saturation for the `nth_active` active channel.
    pub fn reading_for(&self, nth_active: usize) -> ElectrodeReading {
        match self.electrode_base {
            Some(base) => self.snapshot.reading_or_default(base + nth_active),
            None => ElectrodeReading::default(),
        }
    }

    /// Append `slots` samples per active channel, numbered from `first_index`.
    ///
    /// `read` is called once per (slot, active channel) in payload order.
    pub fn demux<F, E>(
        &self,
        batch: &mut SampleBatch,
        first_index: u64,
        slots: u64,
        mut read: F,
    ) -> Result<(), E>
    where
        F: FnMut(u32) -> Result<SlotValue, E>,
    {
        let interval = self.config.sample_interval_ms();
        let active: Vec<(u32, ElectrodeReading)> = self
            .config
            .active_channels()
            .enumerate()
            .map(|(nth, channel)| (channel, self.reading_for(nth)))
            .collect();

        for slot in 0..slots {
            let sample_index = first_index + slot;
            for &(channel, reading) in &active {
                let slot_value = read(channel)?;
                let Some(samples) = batch.channel_samples.get_mut(channel as usize) else {
                    continue;
                };
                samples.push(Sample {
                    channel_index: channel,
                    sample_index,
                    timestamp_ms: sample_index * interval,
                    raw: slot_value.raw,
                    value: slot_value.value,
                    impedance: reading.impedance,
                    saturation: reading.saturation,
                    is_lost: slot_value.is_lost,
                });
            }
        }
        Ok(())
    }

    /// Decode one packet's payload into `batch`. Returns the bytes consumed.
    pub fn decode_payload(
        &self,
        batch: &mut SampleBatch,
        first_index: u64,
        payload: &[u8],
        decoder: &SampleDecoder,
    ) -> Result<usize, OutOfRange> {
        let mut offset = 0;
        self.demux(
            batch,
            first_index,
            u64::from(self.config.package_sample_count),
            |_| {
                let (raw, value) = decoder.read(payload, &mut offset)?;
                Ok::<_, OutOfRange>(SlotValue {
                    raw,
                    value,
                    is_lost: false,
                })
            },
        )?;
        Ok(offset)
    }
}
