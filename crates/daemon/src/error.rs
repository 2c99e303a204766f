use std::path::PathBuf;

use biosignal_types::{ConfigError, DeviceId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("Stream configuration rejected: {0}")]
    Config(#[from] ConfigError),
    #[error("Device {0} stopped accepting commands")]
    DeviceClosed(DeviceId),
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
