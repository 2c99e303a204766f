use std::path::Path;

use biosignal_decoder::DecoderOptions;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::HubError;

/// Configuration for the device hub
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Commands buffered per device before senders wait
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Delivery events buffered for subscribers before actors wait
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Options shared by every device decoder
    #[serde(default)]
    pub decoder: DecoderOptions,
}

fn default_queue_capacity() -> usize { 256 }
fn default_event_capacity() -> usize { 1024 }

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            event_capacity: default_event_capacity(),
            decoder: DecoderOptions::default(),
        }
    }
}

/// Load the hub configuration from `path`, or the defaults if there is no such file.
pub fn load_config(path: impl AsRef<Path>) -> Result<HubConfig, HubError> {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No configuration file, using defaults");
            return Ok(HubConfig::default());
        }
        Err(source) => {
            return Err(HubError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = serde_json::from_str(&contents).map_err(|source| HubError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
