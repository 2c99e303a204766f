//! Recorded notification captures and their replay through a hub.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use biosignal_types::{DeviceId, SignalType, StreamConfig};
use serde::{Deserialize, Serialize};

use crate::error::HubError;
use crate::event::DeliveryEvent;
use crate::hub::DeviceHub;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedConfig {
    pub signal: SignalType,
    pub config: StreamConfig,
}

/// One device's recorded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    pub device: DeviceId,
    #[serde(default)]
    pub configs: Vec<CapturedConfig>,
    /// Raw notifications in arrival order.
    pub packets: Vec<Vec<u8>>,
    /// Disconnect the device after the last packet.
    #[serde(default)]
    pub disconnect: bool,
}

impl Capture {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HubError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| HubError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| HubError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configure the device, then feed every packet in order.
    pub async fn replay(&self, hub: &DeviceHub) -> Result<(), HubError> {
        for captured in &self.configs {
            hub.on_configured(&self.device, captured.signal, captured.config.clone())
                .await?;
        }
        for packet in &self.packets {
            hub.on_packet(&self.device, packet.clone()).await?;
        }
        if self.disconnect {
            hub.on_disconnect(&self.device).await;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalSummary {
    pub batches: usize,
    pub samples: usize,
    pub lost_samples: usize,
    pub errors: usize,
}

/// Delivery totals per signal type. Errors without a signal type are kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub signals: BTreeMap<SignalType, SignalSummary>,
    pub unattributed_errors: usize,
}

impl ReplaySummary {
    pub fn record(&mut self, event: &DeliveryEvent) {
        match event {
            DeliveryEvent::Samples { signal, batch, .. } => {
                let entry = self.signals.entry(*signal).or_default();
                entry.batches += 1;
                entry.samples += batch.sample_count();
                entry.lost_samples += batch.lost_count();
            }
            DeliveryEvent::DecodeError { signal: Some(signal), .. } => {
                self.signals.entry(*signal).or_default().errors += 1;
            }
            DeliveryEvent::DecodeError { signal: None, .. } => self.unattributed_errors += 1,
        }
    }

    pub fn get(&self, signal: SignalType) -> SignalSummary {
        self.signals.get(&signal).copied().unwrap_or_default()
    }
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (signal, s) in &self.signals {
            writeln!(
                f,
                "{:<5} batches={} samples={} lost={} errors={}",
                signal, s.batches, s.samples, s.lost_samples, s.errors
            )?;
        }
        if self.unattributed_errors > 0 {
            writeln!(f, "other errors={}", self.unattributed_errors)?;
        }
        Ok(())
    }
}
