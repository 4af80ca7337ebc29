//! Sample format model.
//!
//! Six binary encodings are supported, ordered by decreasing quality
//! (`Float32` is the best). The bit values of [`SampleFormatMask`] are the
//! ones exchanged with host audio backends and must not change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Runtime sample format descriptor.
///
/// The declaration order is the quality order used by format negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    Float32,
    Int32,
    Int24,
    Int16,
    Int8,
    UInt8,
}

impl SampleFormat {
    /// All formats, best quality first.
    pub const ALL: [SampleFormat; 6] = [
        SampleFormat::Float32,
        SampleFormat::Int32,
        SampleFormat::Int24,
        SampleFormat::Int16,
        SampleFormat::Int8,
        SampleFormat::UInt8,
    ];

    /// Size in bytes of one packed sample.
    #[inline(always)]
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Float32 | SampleFormat::Int32 => 4,
            SampleFormat::Int24 => 3,
            SampleFormat::Int16 => 2,
            SampleFormat::Int8 | SampleFormat::UInt8 => 1,
        }
    }

    /// Quality rank, 0 being the best.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single bit identifying this format in a [`SampleFormatMask`].
    #[inline(always)]
    pub const fn mask_bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Inverse of [`SampleFormat::mask_bit`], returning `None` for anything
    /// that is not exactly one known format bit.
    pub const fn from_mask_bit(bit: u32) -> Option<Self> {
        match bit {
            0x01 => Some(SampleFormat::Float32),
            0x02 => Some(SampleFormat::Int32),
            0x04 => Some(SampleFormat::Int24),
            0x08 => Some(SampleFormat::Int16),
            0x10 => Some(SampleFormat::Int8),
            0x20 => Some(SampleFormat::UInt8),
            _ => None,
        }
    }

    /// `true` for the integer encodings using two's complement.
    #[inline(always)]
    pub const fn is_signed_integer(self) -> bool {
        matches!(
            self,
            SampleFormat::Int32 | SampleFormat::Int24 | SampleFormat::Int16 | SampleFormat::Int8
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            SampleFormat::Float32 => "Float32",
            SampleFormat::Int32 => "Int32",
            SampleFormat::Int24 => "Int24",
            SampleFormat::Int16 => "Int16",
            SampleFormat::Int8 => "Int8",
            SampleFormat::UInt8 => "UInt8",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<SampleFormat> for SampleFormatMask {
    fn from(format: SampleFormat) -> Self {
        SampleFormatMask(format.mask_bit())
    }
}

impl TryFrom<SampleFormatMask> for SampleFormat {
    type Error = ConvertError;

    /// Extracts the single format carried by a mask, ignoring the
    /// non-interleaved bit.
    fn try_from(mask: SampleFormatMask) -> Result<Self, Self::Error> {
        let bits = mask.without_non_interleaved();
        SampleFormat::from_mask_bit(bits.bits())
            .ok_or(ConvertError::SampleFormatNotSupported(mask.bits()))
    }
}

/// Bit set of sample formats, as advertised by a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SampleFormatMask(u32);

impl SampleFormatMask {
    pub const EMPTY: SampleFormatMask = SampleFormatMask(0);
    pub const FLOAT32: SampleFormatMask = SampleFormatMask(0x0000_0001);
    pub const INT32: SampleFormatMask = SampleFormatMask(0x0000_0002);
    pub const INT24: SampleFormatMask = SampleFormatMask(0x0000_0004);
    pub const INT16: SampleFormatMask = SampleFormatMask(0x0000_0008);
    pub const INT8: SampleFormatMask = SampleFormatMask(0x0000_0010);
    pub const UINT8: SampleFormatMask = SampleFormatMask(0x0000_0020);
    /// Sentinel for device specific encodings, never convertible.
    pub const CUSTOM_FORMAT: SampleFormatMask = SampleFormatMask(0x0001_0000);
    /// Layout hint, masked out before any format decision.
    pub const NON_INTERLEAVED: SampleFormatMask = SampleFormatMask(0x8000_0000);
    /// Union of the six real formats.
    pub const ALL_FORMATS: SampleFormatMask = SampleFormatMask(0x0000_003f);

    #[inline(always)]
    pub const fn from_bits(bits: u32) -> Self {
        SampleFormatMask(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn contains(self, format: SampleFormat) -> bool {
        self.0 & format.mask_bit() != 0
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn without_non_interleaved(self) -> Self {
        SampleFormatMask(self.0 & !Self::NON_INTERLEAVED.0)
    }

    #[inline(always)]
    pub const fn is_non_interleaved(self) -> bool {
        self.0 & Self::NON_INTERLEAVED.0 != 0
    }

    /// Formats present in the mask, best quality first.
    pub fn formats(self) -> impl Iterator<Item = SampleFormat> {
        SampleFormat::ALL
            .into_iter()
            .filter(move |format| self.contains(*format))
    }
}

impl std::ops::BitOr for SampleFormatMask {
    type Output = SampleFormatMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        SampleFormatMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<SampleFormat> for SampleFormatMask {
    type Output = SampleFormatMask;

    fn bitor(self, rhs: SampleFormat) -> Self::Output {
        SampleFormatMask(self.0 | rhs.mask_bit())
    }
}

impl FromIterator<SampleFormat> for SampleFormatMask {
    fn from_iter<T: IntoIterator<Item = SampleFormat>>(iter: T) -> Self {
        iter.into_iter()
            .fold(SampleFormatMask::EMPTY, |mask, format| mask | format)
    }
}

/// Flags modulating a conversion. Immutable for the duration of a call.
///
/// Clipping and dithering are enabled unless the matching `*_OFF` bit is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ConversionFlags(u32);

impl ConversionFlags {
    /// Clip and dither.
    pub const NONE: ConversionFlags = ConversionFlags(0);
    pub const CLIP_OFF: ConversionFlags = ConversionFlags(0x0000_0001);
    pub const DITHER_OFF: ConversionFlags = ConversionFlags(0x0000_0002);
    /// Ignored by the kernels.
    pub const NON_INTERLEAVED: ConversionFlags = ConversionFlags(0x8000_0000);

    #[inline(always)]
    pub const fn from_bits(bits: u32) -> Self {
        ConversionFlags(bits)
    }

    #[inline(always)]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds flags from the two boolean switches.
    pub const fn new(clip: bool, dither: bool) -> Self {
        let mut bits = 0;
        if !clip {
            bits |= Self::CLIP_OFF.0;
        }
        if !dither {
            bits |= Self::DITHER_OFF.0;
        }
        ConversionFlags(bits)
    }

    #[inline(always)]
    pub const fn clip(self) -> bool {
        self.0 & Self::CLIP_OFF.0 == 0
    }

    #[inline(always)]
    pub const fn dither(self) -> bool {
        self.0 & Self::DITHER_OFF.0 == 0
    }

    #[inline(always)]
    pub const fn with_dither(self, dither: bool) -> Self {
        ConversionFlags::new(self.clip(), dither)
    }
}

impl std::ops::BitOr for ConversionFlags {
    type Output = ConversionFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ConversionFlags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_order_follows_mask_bits() {
        for pair in SampleFormat::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].mask_bit() < pair[1].mask_bit());
        }
        assert_eq!(SampleFormat::Float32.mask_bit(), 0x01);
        assert_eq!(SampleFormat::UInt8.mask_bit(), 0x20);
    }

    #[test]
    fn test_bytes_per_sample() {
        let sizes: Vec<usize> = SampleFormat::ALL.iter().map(|f| f.bytes_per_sample()).collect();
        assert_eq!(sizes, vec![4, 4, 3, 2, 1, 1]);
    }

    #[test]
    fn test_mask_single_format() {
        let mask = SampleFormatMask::INT24 | SampleFormatMask::NON_INTERLEAVED;
        assert_eq!(SampleFormat::try_from(mask), Ok(SampleFormat::Int24));

        let both = SampleFormatMask::INT16 | SampleFormatMask::INT32;
        assert!(SampleFormat::try_from(both).is_err());
        assert_eq!(
            SampleFormat::try_from(SampleFormatMask::CUSTOM_FORMAT),
            Err(ConvertError::SampleFormatNotSupported(0x0001_0000))
        );
    }

    #[test]
    fn test_mask_iteration() {
        let mask: SampleFormatMask = [SampleFormat::UInt8, SampleFormat::Float32]
            .into_iter()
            .collect();
        let formats: Vec<_> = mask.formats().collect();
        assert_eq!(formats, vec![SampleFormat::Float32, SampleFormat::UInt8]);
    }

    #[test]
    fn test_flags() {
        assert!(ConversionFlags::NONE.clip());
        assert!(ConversionFlags::NONE.dither());

        let flags = ConversionFlags::CLIP_OFF | ConversionFlags::NON_INTERLEAVED;
        assert!(!flags.clip());
        assert!(flags.dither());

        assert_eq!(ConversionFlags::new(false, false).bits(), 0x3);
        assert!(!flags.with_dither(false).dither());
        assert!(!flags.with_dither(false).clip());
    }

    #[test]
    fn test_serde_lowercase() {
        let format: SampleFormat = serde_yaml::from_str("int24").unwrap();
        assert_eq!(format, SampleFormat::Int24);
    }
}
