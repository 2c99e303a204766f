//! What the hub hands to subscribers.

use biosignal_decoder::SinkEvent;
use biosignal_types::{DecodeError, DeviceId, SampleBatch, SignalType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeliveryEvent {
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

impl DeliveryEvent {
    pub fn device(&self) -> &DeviceId {
        match self {
            DeliveryEvent::Samples { device, .. } | DeliveryEvent::DecodeError { device, .. } => device,
        }
    }
}

impl From<SinkEvent> for DeliveryEvent {
    fn from(event: SinkEvent) -> Self {
        match event {
            SinkEvent::Samples { device, signal, batch } => DeliveryEvent::Samples { device, signal, batch },
            SinkEvent::DecodeError { device, signal, error } => {
                DeliveryEvent::DecodeError { device, signal, error }
            }
        }
    }
}
