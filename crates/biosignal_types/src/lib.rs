//! Shared types for the biosignal notification decoder
//!
//! This crate contains the data model exchanged between the transport bridge,
//! the resequencing engine and the delivery side: signal types, per-stream
//! configuration records, decoded samples and the error types that cross the
//! delivery boundary.

pub mod signal;
pub mod config;
pub mod data;
pub mod error;

// Re-export commonly used types
pub use signal::*;
pub use config::*;
pub use data::*;
pub use error::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a physical device, typically its BLE address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
