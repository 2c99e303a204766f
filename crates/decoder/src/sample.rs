//! Fixed-point sample fields to raw integers and physical values.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::trace;

use biosignal_types::{ConfigError, Sample16Encoding, StreamConfig};

/// A read past the end of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sample read of {width} bytes at offset {offset} exceeds payload of {len} bytes")]
pub struct OutOfRange {
    pub offset: usize,
    pub width: usize,
    pub len: usize,
}

/// Wire layout of one sample field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Bits8,
    Bits16(Sample16Encoding),
    Bits24,
}

impl Resolution {
    pub fn from_config(config: &StreamConfig) -> Result<Self, ConfigError> {
        match config.resolution_bits {
            8 => Ok(Resolution::Bits8),
            16 => Ok(Resolution::Bits16(config.sample16_encoding)),
            24 => Ok(Resolution::Bits24),
            other => Err(ConfigError::UnsupportedResolution(other)),
        }
    }

    pub fn width(self) -> usize {
        match self {
            Resolution::Bits8 => 1,
            Resolution::Bits16(_) => 2,
            Resolution::Bits24 => 3,
        }
    }
}

/// Decodes the sample fields of one stream.
#[derive(Debug, Clone, Copy)]
pub struct SampleDecoder {
    resolution: Resolution,
    k: f64,
}

impl SampleDecoder {
    pub fn new(resolution: Resolution, k: f64) -> Self {
        Self { resolution, k }
    }

    pub fn from_config(config: &StreamConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Resolution::from_config(config)?, config.k))
    }

    pub fn width(&self) -> usize {
        self.resolution.width()
    }

    /// Read the raw value at `*offset` and advance the offset past it.
    pub fn read_raw(&self, buf: &[u8], offset: &mut usize) -> Result<i32, OutOfRange> {
        let width = self.width();
        let start = *offset;
        let field = start
            .checked_add(width)
            .and_then(|end| buf.get(start..end))
            .ok_or(OutOfRange { offset: start, width, len: buf.len() })?;

        let raw = match self.resolution {
            Resolution::Bits8 => i32::from(field[0]) - 128,
            Resolution::Bits16(Sample16Encoding::BigEndianOffset) => {
                i32::from(BigEndian::read_u16(field)) - 32_768
            }
            Resolution::Bits16(Sample16Encoding::LittleEndianSigned) => {
                i32::from(LittleEndian::read_i16(field))
            }
            Resolution::Bits24 => BigEndian::read_u24(field) as i32 - 8_388_608,
        };
        trace!("sample at {}: bytes {:02X?} -> raw {}", start, field, raw);

        *offset = start + width;
        Ok(raw)
    }

    /// `raw * k`, computed in double precision.
    pub fn physical(&self, raw: i32) -> f32 {
        (f64::from(raw) * self.k) as f32
    }

    /// Read one field and convert it.
    pub fn read(&self, buf: &[u8], offset: &mut usize) -> Result<(i32, f32), OutOfRange> {
        let raw = self.read_raw(buf, offset)?;
        Ok((raw, self.physical(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(resolution: Resolution, raw: i32) -> Vec<u8> {
        match resolution {
            Resolution::Bits8 => vec![(raw + 128) as u8],
            Resolution::Bits16(Sample16Encoding::BigEndianOffset) => {
                ((raw + 32_768) as u16).to_be_bytes().to_vec()
            }
            Resolution::Bits16(Sample16Encoding::LittleEndianSigned) => {
                (raw as i16).to_le_bytes().to_vec()
            }
            Resolution::Bits24 => ((raw + 8_388_608) as u32).to_be_bytes()[1..].to_vec(),
        }
    }

    #[test]
    fn test_known_values_at_each_width() {
        let k = 0.5;
        let cases = [
            (Resolution::Bits8, -128),
            (Resolution::Bits8, 127),
            (Resolution::Bits16(Sample16Encoding::BigEndianOffset), -32_768),
            (Resolution::Bits16(Sample16Encoding::BigEndianOffset), 1_234),
            (Resolution::Bits16(Sample16Encoding::LittleEndianSigned), -2),
            (Resolution::Bits16(Sample16Encoding::LittleEndianSigned), 32_767),
            (Resolution::Bits24, -8_388_608),
            (Resolution::Bits24, 8_388_607),
            (Resolution::Bits24, 0),
        ];
        for (resolution, raw) in cases {
            let decoder = SampleDecoder::new(resolution, k);
            let bytes = encode(resolution, raw);
            let mut offset = 0;
            let (decoded, value) = decoder.read(&bytes, &mut offset).unwrap();
            assert_eq!(decoded, raw, "{:?}", resolution);
            assert_eq!(value, (f64::from(raw) * k) as f32);
            assert_eq!(offset, resolution.width());
        }
    }

    #[test]
    fn test_byte_layouts() {
        let mut offset = 0;
        let be = SampleDecoder::new(Resolution::Bits16(Sample16Encoding::BigEndianOffset), 1.0);
        assert_eq!(be.read_raw(&[0x80, 0x01], &mut offset), Ok(1));

        let mut offset = 0;
        let le = SampleDecoder::new(Resolution::Bits16(Sample16Encoding::LittleEndianSigned), 1.0);
        assert_eq!(le.read_raw(&[0xff, 0xff], &mut offset), Ok(-1));

        let mut offset = 1;
        let b24 = SampleDecoder::new(Resolution::Bits24, 1.0);
        assert_eq!(b24.read_raw(&[0xaa, 0x80, 0x00, 0x02], &mut offset), Ok(2));
        assert_eq!(offset, 4);
    }

    #[test]
    fn test_short_buffer_is_out_of_range() {
        let decoder = SampleDecoder::new(Resolution::Bits24, 1.0);
        let mut offset = 1;
        assert_eq!(
            decoder.read_raw(&[0, 0, 0], &mut offset),
            Err(OutOfRange { offset: 1, width: 3, len: 3 })
        );
        assert_eq!(offset, 1);
    }

    #[test]
    fn test_unsupported_resolution_is_rejected() {
        let config = StreamConfig {
            resolution_bits: 12,
            sample_rate: 250,
            channel_count: 1,
            channel_mask: 1,
            package_sample_count: 1,
            k: 1.0,
            sample16_encoding: Sample16Encoding::default(),
        };
        assert_eq!(
            SampleDecoder::from_config(&config).unwrap_err(),
            ConfigError::UnsupportedResolution(12)
        );
    }
}
