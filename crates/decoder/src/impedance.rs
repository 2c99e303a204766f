//! Impedance/saturation telemetry packets.
//!
//! After the 3-byte header the payload is a flat array of little-endian
//! `f32`: the first half impedance values, the second half saturation values,
//! one of each per electrode.

use byteorder::{ByteOrder, LittleEndian};

use biosignal_types::{DecodeError, ImpedanceSnapshot};

use crate::dispatcher::HEADER_LEN;

const FLOAT_LEN: usize = 4;

/// Parse an impedance packet into a complete snapshot.
///
/// Saturation values are divided by `saturation_divisor` when the firmware
/// reports them pre-scaled.
pub fn parse_impedance_packet(
    bytes: &[u8],
    saturation_divisor: Option<f32>,
) -> Result<ImpedanceSnapshot, DecodeError> {
    let malformed = DecodeError::MalformedImpedance { len: bytes.len() };
    let payload = bytes.get(HEADER_LEN..).ok_or(malformed.clone())?;
    if payload.len() % (2 * FLOAT_LEN) != 0 {
        return Err(malformed);
    }

    let electrodes = payload.len() / (2 * FLOAT_LEN);
    let (impedance_bytes, saturation_bytes) = payload.split_at(electrodes * FLOAT_LEN);

    let impedance: Vec<f32> = impedance_bytes.chunks_exact(FLOAT_LEN).map(LittleEndian::read_f32).collect();
    let saturation: Vec<f32> = saturation_bytes
        .chunks_exact(FLOAT_LEN)
        .map(LittleEndian::read_f32)
        .map(|value| match saturation_divisor {
            Some(divisor) if divisor != 0.0 => value / divisor,
            _ => value,
        })
        .collect();

    Ok(ImpedanceSnapshot::from_halves(&impedance, &saturation))
}
