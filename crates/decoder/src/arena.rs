//! Device-keyed decoders for single-threaded callers.

use std::collections::HashMap;

use biosignal_types::{ConfigError, DeviceId, SignalType, StreamConfig};
use tracing::info;

use crate::dispatcher::DeviceDecoder;
use crate::options::DecoderOptions;
use crate::sink::SampleSink;

/// One [`DeviceDecoder`] per device, created on first use.
///
/// Devices share nothing; the arena only routes by id.
#[derive(Debug, Default)]
pub struct DecoderArena {
    decoders: HashMap<DeviceId, DeviceDecoder>,
    options: DecoderOptions,
}

impl DecoderArena {
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            decoders: HashMap::new(),
            options,
        }
    }

    fn decoder_mut(&mut self, device: &DeviceId) -> &mut DeviceDecoder {
        let options = &self.options;
        self.decoders
            .entry(device.clone())
            .or_insert_with(|| DeviceDecoder::new(device.clone(), options.clone()))
    }

    pub fn on_configured(
        &mut self,
        device: &DeviceId,
        signal: SignalType,
        config: StreamConfig,
    ) -> Result<(), ConfigError> {
        self.decoder_mut(device).on_configured(signal, config)
    }

    pub fn on_packet(&mut self, device: &DeviceId, bytes: &[u8], sink: &mut dyn SampleSink) {
        self.decoder_mut(device).on_packet(bytes, sink)
    }

    /// Drop the device's decoder. Later packets start from an empty context.
    pub fn on_disconnect(&mut self, device: &DeviceId) {
        if let Some(mut decoder) = self.decoders.remove(device) {
            decoder.on_disconnect();
            info!(device = %device, "Device disconnected; decode state discarded");
        }
    }

    pub fn decoder(&self, device: &DeviceId) -> Option<&DeviceDecoder> {
        self.decoders.get(device)
    }

    pub fn device_count(&self) -> usize {
        self.decoders.len()
    }
}
