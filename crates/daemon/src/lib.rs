//! Device hub and replay tooling on top of `biosignal_decoder`.

pub mod config;
pub mod error;
pub mod event;
pub mod hub;
pub mod replay;

pub use config::{load_config, HubConfig};
pub use error::HubError;
pub use event::DeliveryEvent;
pub use hub::DeviceHub;
pub use replay::{Capture, CapturedConfig, ReplaySummary, SignalSummary};
