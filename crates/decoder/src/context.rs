//! Per-device decode state.

use std::sync::Arc;

use biosignal_types::{
    ConfigError, DecodeError, ImpedanceRule, ImpedanceSnapshot, SignalType, StreamConfig,
};
use tracing::{debug, info};

use crate::impedance::parse_impedance_packet;
use crate::sample::SampleDecoder;
use crate::sequence::SequenceState;

/// Active configuration and sequence state of one stream.
#[derive(Debug, Clone)]
pub struct StreamState {
    pub config: Arc<StreamConfig>,
    pub decoder: SampleDecoder,
    pub sequence: SequenceState,
}

/// Everything one device's decode passes read and write.
///
/// Mutation goes through `&mut self`, so a context has a single writer.
#[derive(Debug, Default)]
pub struct StreamContext {
    streams: [Option<StreamState>; 4],
    snapshot: Arc<ImpedanceSnapshot>,
}

impl StreamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stream's configuration and restart its sequence.
    ///
    /// An invalid configuration leaves the previous one in place.
    pub fn reconfigure(&mut self, signal: SignalType, config: StreamConfig) -> Result<(), ConfigError> {
        config.validate(signal)?;
        let decoder = SampleDecoder::from_config(&config)?;
        info!(
            signal = %signal,
            sample_rate = config.sample_rate,
            channels = config.active_channel_count(),
            resolution_bits = config.resolution_bits,
            "Stream configured"
        );
        self.streams[signal.index()] = Some(StreamState {
            config: Arc::new(config),
            decoder,
            sequence: SequenceState::new(),
        });
        Ok(())
    }

    /// Forget all streams and the impedance snapshot. Idempotent.
    pub fn reset_on_disconnect(&mut self) {
        for stream in self.streams.iter_mut() {
            *stream = None;
        }
        self.snapshot = Arc::new(ImpedanceSnapshot::default());
        debug!("Stream context reset");
    }

    /// Parse an impedance packet and swap it in as the current snapshot.
    pub fn apply_impedance_packet(
        &mut self,
        bytes: &[u8],
        saturation_divisor: Option<f32>,
    ) -> Result<(), DecodeError> {
        let snapshot = parse_impedance_packet(bytes, saturation_divisor)?;
        self.replace_snapshot(snapshot);
        Ok(())
    }

    pub fn replace_snapshot(&mut self, snapshot: ImpedanceSnapshot) {
        self.snapshot = Arc::new(snapshot);
    }

    /// The current snapshot. Later replacements do not affect the returned value.
    pub fn snapshot(&self) -> Arc<ImpedanceSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn stream(&self, signal: SignalType) -> Option<&StreamState> {
        self.streams[signal.index()].as_ref()
    }

    pub fn stream_mut(&mut self, signal: SignalType) -> Option<&mut StreamState> {
        self.streams[signal.index()].as_mut()
    }

    pub fn is_configured(&self, signal: SignalType) -> bool {
        self.stream(signal).is_some()
    }

    /// Snapshot entry of `signal`'s first active channel, if it is tagged.
    pub fn electrode_base(&self, signal: SignalType) -> Option<usize> {
        match signal.strategy().impedance {
            ImpedanceRule::Untagged => None,
            ImpedanceRule::Primary => Some(0),
            // An unconfigured primary stream contributes no electrodes.
            ImpedanceRule::OffsetBy(primary) => Some(
                self.stream(primary)
                    .map_or(0, |stream| stream.config.channel_count as usize),
            ),
        }
    }
}
