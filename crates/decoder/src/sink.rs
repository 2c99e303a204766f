//! The delivery boundary.

use biosignal_types::{DecodeError, DeviceId, SampleBatch, SignalType};

/// Receives what decode passes produce.
///
/// One `emit_samples` call per decode pass that produced samples; errors are
/// reported, never raised.
pub trait SampleSink {
    fn emit_samples(&mut self, device: &DeviceId, signal: SignalType, batch: SampleBatch);

    /// `signal` is `None` when the packet's signal type could not be determined.
    fn emit_decode_error(&mut self, device: &DeviceId, signal: Option<SignalType>, error: DecodeError);
}

/// One emission, as recorded by a buffering sink.
#[derive(Debug, Clone)]
pub enum SinkEvent {
    Samples {
        device: DeviceId,
        signal: SignalType,
        batch: SampleBatch,
    },
    DecodeError {
        device: DeviceId,
        signal: Option<SignalType>,
        error: DecodeError,
    },
}

impl SinkEvent {
    pub fn device(&self) -> &DeviceId {
        match self {
            SinkEvent::Samples { device, .. } | SinkEvent::DecodeError { device, .. } => device,
        }
    }

    pub fn batch(&self) -> Option<&SampleBatch> {
        match self {
            SinkEvent::Samples { batch, .. } => Some(batch),
            SinkEvent::DecodeError { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            SinkEvent::DecodeError { error, .. } => Some(error),
            SinkEvent::Samples { .. } => None,
        }
    }
}

/// Buffers emissions in order.
impl SampleSink for Vec<SinkEvent> {
    fn emit_samples(&mut self, device: &DeviceId, signal: SignalType, batch: SampleBatch) {
        self.push(SinkEvent::Samples {
            device: device.clone(),
            signal,
            batch,
        });
    }

    fn emit_decode_error(&mut self, device: &DeviceId, signal: Option<SignalType>, error: DecodeError) {
        self.push(SinkEvent::DecodeError {
            device: device.clone(),
            signal,
            error,
        });
    }
}
