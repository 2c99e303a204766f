//! Per-device packet dispatch.
//!
//! A decode pass is a bounded computation with no suspension points: the
//! packet is checked, the gap-fill and real batches are built, and only then
//! is the stream's sequence state advanced and the batches emitted.

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace, warn};

use biosignal_types::{
    BatchKind, ConfigError, DecodeError, DeviceId, PacketType, SampleBatch, SignalType, StreamConfig,
};

use crate::context::StreamContext;
use crate::demux::ChannelDemultiplexer;
use crate::gap::GapFiller;
use crate::options::DecoderOptions;
use crate::sequence::SequenceStep;
use crate::sink::SampleSink;

/// Signal type byte plus little-endian 16-bit package counter.
pub const HEADER_LEN: usize = 3;

/// Decoder of one device's notification stream.
#[derive(Debug)]
pub struct DeviceDecoder {
    device: DeviceId,
    context: StreamContext,
    options: DecoderOptions,
}

impl DeviceDecoder {
    pub fn new(device: DeviceId, options: DecoderOptions) -> Self {
        Self {
            device,
            context: StreamContext::new(),
            options,
        }
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    pub fn context(&self) -> &StreamContext {
        &self.context
    }

    /// Accept a stream configuration from the capability exchange.
    pub fn on_configured(&mut self, signal: SignalType, config: StreamConfig) -> Result<(), ConfigError> {
        self.context.reconfigure(signal, config).map_err(|e| {
            warn!(device = %self.device, signal = %signal, error = %e, "Rejected stream configuration");
            e
        })
    }

    /// Forget all stream state of the device.
    pub fn on_disconnect(&mut self) {
        self.context.reset_on_disconnect();
    }

    /// Decode one raw notification and hand the results to `sink`.
    pub fn on_packet(&mut self, bytes: &[u8], sink: &mut dyn SampleSink) {
        let Some(&discriminant) = bytes.first() else {
            sink.emit_decode_error(&self.device, None, DecodeError::EmptyPacket);
            return;
        };

        match PacketType::from_discriminant(discriminant) {
            Some(PacketType::Impedance) => {
                if let Err(e) = self
                    .context
                    .apply_impedance_packet(bytes, self.options.saturation_divisor)
                {
                    sink.emit_decode_error(&self.device, None, e);
                }
            }
            Some(PacketType::Samples(signal)) => {
                match self.decode_samples(signal, bytes) {
                    Ok(batches) => {
                        for batch in batches.into_iter().flatten() {
                            sink.emit_samples(&self.device, signal, batch);
                        }
                    }
                    Err(e) => sink.emit_decode_error(&self.device, Some(signal), e),
                }
            }
            None => {
                sink.emit_decode_error(&self.device, None, DecodeError::UnknownSignalType(discriminant));
            }
        }
    }

    /// Returns the gap-fill batch and the packet batch, in emission order.
    /// Empty batches come back as `None`.
    fn decode_samples(
        &mut self,
        signal: SignalType,
        bytes: &[u8],
    ) -> Result<[Option<SampleBatch>; 2], DecodeError> {
        let electrode_base = self.context.electrode_base(signal);
        let snapshot = self.context.snapshot();
        let stream = self
            .context
            .stream(signal)
            .ok_or(DecodeError::Unconfigured(signal))?;

        let config = stream.config.clone();
        let expected = HEADER_LEN + config.payload_len();
        if bytes.len() < expected {
            return Err(DecodeError::Truncated {
                signal_type: signal,
                expected,
                actual: bytes.len(),
            });
        }
        if bytes.len() > expected {
            trace!(signal = %signal, extra = bytes.len() - expected, "Ignoring trailing packet bytes");
        }

        let counter = LittleEndian::read_u16(&bytes[1..HEADER_LEN]);
        let samples_per_packet =
            u64::from(config.package_sample_count) * config.active_channel_count() as u64;
        let step = stream
            .sequence
            .classify(counter, &self.options)
            .bound_fill(samples_per_packet, self.options.max_gap_samples);
        let first_index = stream.sequence.next_sample_index(config.package_sample_count);
        let demux = ChannelDemultiplexer::new(&config, &snapshot, electrode_base);

        let mut gap_batch = None;
        let mut packet_index = first_index;
        match step {
            SequenceStep::Duplicate => {
                debug!(device = %self.device, signal = %signal, counter, "Dropping repeated package counter");
                return Ok([None, None]);
            }
            SequenceStep::Gap { lost, .. } => {
                warn!(
                    device = %self.device,
                    signal = %signal,
                    counter,
                    lost_packets = lost,
                    lost_samples = u64::from(lost) * u64::from(config.package_sample_count),
                    "Packets lost"
                );
                let mut batch = SampleBatch::new(signal, BatchKind::GapFill, config.clone());
                GapFiller::fill(&demux, &mut batch, first_index, lost);
                packet_index += u64::from(lost) * u64::from(config.package_sample_count);
                gap_batch = Some(batch);
            }
            SequenceStep::Resync { skipped } => {
                warn!(
                    device = %self.device,
                    signal = %signal,
                    last_counter = stream.sequence.last_counter(),
                    counter,
                    skipped_packets = skipped,
                    "Loss too large to gap-fill; resyncing"
                );
            }
            SequenceStep::InOrder => {}
        }

        let mut packet_batch = SampleBatch::new(signal, BatchKind::Packet, config.clone());
        demux
            .decode_payload(&mut packet_batch, packet_index, &bytes[HEADER_LEN..], &stream.decoder)
            .map_err(|e| DecodeError::Truncated {
                signal_type: signal,
                expected: HEADER_LEN + e.offset + e.width,
                actual: bytes.len(),
            })?;

        if let Some(stream) = self.context.stream_mut(signal) {
            stream.sequence.advance(counter, step);
        }

        let non_empty = |batch: SampleBatch| (!batch.is_empty()).then_some(batch);
        Ok([gap_batch.and_then(non_empty), non_empty(packet_batch)])
    }
}
