//! Packet resequencing and sample reconstruction for biosignal notifications
//!
//! Raw notification payloads arrive per device in arrival order. This crate
//! tracks each stream's 16-bit rolling package counter, synthesizes placeholder
//! samples for lost packets, demultiplexes the channel bitmask, converts the
//! fixed-point fields to physical values and tags bioelectric samples with the
//! latest impedance/saturation snapshot.
//!
//! The entry points are [`DeviceDecoder`] (one device, single writer) and
//! [`DecoderArena`] (many devices behind one `&mut` owner). Decoded output and
//! decode errors leave through a [`SampleSink`].

pub mod options;
pub mod sequence;
pub mod sample;
pub mod gap;
pub mod demux;
pub mod impedance;
pub mod context;
pub mod sink;
pub mod dispatcher;
pub mod arena;

// Re-export commonly used types
pub use options::*;
pub use sequence::*;
pub use sample::*;
pub use gap::*;
pub use demux::*;
pub use impedance::*;
pub use context::*;
pub use sink::*;
pub use dispatcher::*;
pub use arena::*;

pub use biosignal_types::*;
