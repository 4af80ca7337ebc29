//! Noyaux de conversion scalaires.
//!
//! Un noyau parcourt un buffer source et un buffer destination au pas donné
//! (en éléments) et convertit `count` échantillons. Les noyaux ne valident
//! rien : [`Converter::convert`](crate::Converter::convert) vérifie pas et
//! tailles avant de les appeler. Un accès hors limites panique au lieu de
//! corrompre la mémoire.

mod copy;
mod float;
mod integer;

pub use copy::{copy_16, copy_24, copy_32, copy_8};
pub use float::*;
pub use integer::*;

use crate::buffer::PcmWord;
use crate::dither::DitherState;
use crate::format::SampleFormat;

/// `(dst, dst_stride, src, src_stride, count, dither)`
pub type ConverterFn = fn(&mut [u8], usize, &[u8], usize, usize, &mut DitherState);

/// Applique `convert` à chaque élément, en respectant les deux pas.
#[inline(always)]
pub(crate) fn map<S: PcmWord, D: PcmWord>(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    count: usize,
    mut convert: impl FnMut(S) -> D,
) {
    for i in 0..count {
        convert(S::load(src, i * src_stride)).store(dst, i * dst_stride);
    }
}

macro_rules! kernel_fn {
    (unimplemented) => {
        None
    };
    ($path:path) => {
        Some($path as ConverterFn)
    };
}

macro_rules! kernel_catalogue {
    ($( $variant:ident : $from:ident -> $to:ident = [$($kernel:tt)+]; )*) => {
        /// Identifiant stable de chaque noyau de conversion.
        ///
        /// Les noyaux de copie (`Copy*`) sont indexés par largeur en bits ;
        /// leurs formats source/destination sont indicatifs.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KernelId {
            $( $variant, )*
        }

        impl KernelId {
            pub const ALL: &'static [KernelId] = &[ $( KernelId::$variant, )* ];

            pub const fn name(self) -> &'static str {
                match self {
                    $( KernelId::$variant => stringify!($variant), )*
                }
            }

            pub const fn source(self) -> SampleFormat {
                match self {
                    $( KernelId::$variant => SampleFormat::$from, )*
                }
            }

            pub const fn destination(self) -> SampleFormat {
                match self {
                    $( KernelId::$variant => SampleFormat::$to, )*
                }
            }

            /// Implémentation scalaire, `None` pour les conversions tramées
            /// qui n'existent pas.
            pub fn scalar_fn(self) -> Option<ConverterFn> {
                match self {
                    $( KernelId::$variant => kernel_fn!($($kernel)+), )*
                }
            }
        }
    };
}

kernel_catalogue! {
    Float32ToInt32: Float32 -> Int32 = [float32_to_int32];
    Float32ToInt32Dither: Float32 -> Int32 = [float32_to_int32_dither];
    Float32ToInt32Clip: Float32 -> Int32 = [float32_to_int32_clip];
    Float32ToInt32DitherClip: Float32 -> Int32 = [float32_to_int32_dither_clip];

    Float32ToInt24: Float32 -> Int24 = [float32_to_int24];
    Float32ToInt24Dither: Float32 -> Int24 = [float32_to_int24_dither];
    Float32ToInt24Clip: Float32 -> Int24 = [float32_to_int24_clip];
    Float32ToInt24DitherClip: Float32 -> Int24 = [float32_to_int24_dither_clip];

    Float32ToInt16: Float32 -> Int16 = [float32_to_int16];
    Float32ToInt16Dither: Float32 -> Int16 = [float32_to_int16_dither];
    Float32ToInt16Clip: Float32 -> Int16 = [float32_to_int16_clip];
    Float32ToInt16DitherClip: Float32 -> Int16 = [float32_to_int16_dither_clip];

    Float32ToInt8: Float32 -> Int8 = [float32_to_int8];
    Float32ToInt8Dither: Float32 -> Int8 = [float32_to_int8_dither];
    Float32ToInt8Clip: Float32 -> Int8 = [float32_to_int8_clip];
    Float32ToInt8DitherClip: Float32 -> Int8 = [float32_to_int8_dither_clip];

    Float32ToUInt8: Float32 -> UInt8 = [float32_to_uint8];
    Float32ToUInt8Dither: Float32 -> UInt8 = [float32_to_uint8_dither];
    Float32ToUInt8Clip: Float32 -> UInt8 = [float32_to_uint8_clip];
    Float32ToUInt8DitherClip: Float32 -> UInt8 = [float32_to_uint8_dither_clip];

    Int32ToFloat32: Int32 -> Float32 = [int32_to_float32];
    Int32ToInt24: Int32 -> Int24 = [int32_to_int24];
    Int32ToInt24Dither: Int32 -> Int24 = [unimplemented];
    Int32ToInt16: Int32 -> Int16 = [int32_to_int16];
    Int32ToInt16Dither: Int32 -> Int16 = [int32_to_int16_dither];
    Int32ToInt8: Int32 -> Int8 = [int32_to_int8];
    Int32ToInt8Dither: Int32 -> Int8 = [int32_to_int8_dither];
    Int32ToUInt8: Int32 -> UInt8 = [int32_to_uint8];
    Int32ToUInt8Dither: Int32 -> UInt8 = [unimplemented];

    Int24ToFloat32: Int24 -> Float32 = [int24_to_float32];
    Int24ToInt32: Int24 -> Int32 = [int24_to_int32];
    Int24ToInt16: Int24 -> Int16 = [int24_to_int16];
    Int24ToInt16Dither: Int24 -> Int16 = [int24_to_int16_dither];
    Int24ToInt8: Int24 -> Int8 = [int24_to_int8];
    Int24ToInt8Dither: Int24 -> Int8 = [int24_to_int8_dither];
    Int24ToUInt8: Int24 -> UInt8 = [int24_to_uint8];
    Int24ToUInt8Dither: Int24 -> UInt8 = [unimplemented];

    Int16ToFloat32: Int16 -> Float32 = [int16_to_float32];
    Int16ToInt32: Int16 -> Int32 = [int16_to_int32];
    Int16ToInt24: Int16 -> Int24 = [int16_to_int24];
    Int16ToInt8: Int16 -> Int8 = [int16_to_int8];
    Int16ToInt8Dither: Int16 -> Int8 = [unimplemented];
    Int16ToUInt8: Int16 -> UInt8 = [int16_to_uint8];
    Int16ToUInt8Dither: Int16 -> UInt8 = [unimplemented];

    Int8ToFloat32: Int8 -> Float32 = [int8_to_float32];
    Int8ToInt32: Int8 -> Int32 = [int8_to_int32];
    Int8ToInt24: Int8 -> Int24 = [int8_to_int24];
    Int8ToInt16: Int8 -> Int16 = [int8_to_int16];
    Int8ToUInt8: Int8 -> UInt8 = [int8_to_uint8];

    UInt8ToFloat32: UInt8 -> Float32 = [uint8_to_float32];
    UInt8ToInt32: UInt8 -> Int32 = [uint8_to_int32];
    UInt8ToInt24: UInt8 -> Int24 = [uint8_to_int24];
    UInt8ToInt16: UInt8 -> Int16 = [uint8_to_int16];
    UInt8ToInt8: UInt8 -> Int8 = [uint8_to_int8];

    Copy8: Int8 -> Int8 = [copy_8];
    Copy16: Int16 -> Int16 = [copy_16];
    Copy24: Int24 -> Int24 = [copy_24];
    Copy32: Int32 -> Int32 = [copy_32];
}

impl KernelId {
    #[inline]
    pub fn is_implemented(self) -> bool {
        self.scalar_fn().is_some()
    }

    /// Noyau de copie brute pour des éléments de `format`.
    pub const fn copy_for(format: SampleFormat) -> KernelId {
        match format.bytes_per_sample() {
            1 => KernelId::Copy8,
            2 => KernelId::Copy16,
            3 => KernelId::Copy24,
            _ => KernelId::Copy32,
        }
    }
}

impl std::fmt::Display for KernelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_size() {
        assert_eq!(KernelId::ALL.len(), 58);
        let missing: Vec<_> = KernelId::ALL
            .iter()
            .filter(|k| !k.is_implemented())
            .map(|k| k.name())
            .collect();
        assert_eq!(
            missing,
            vec![
                "Int32ToInt24Dither",
                "Int32ToUInt8Dither",
                "Int24ToUInt8Dither",
                "Int16ToInt8Dither",
                "Int16ToUInt8Dither",
            ]
        );
    }

    #[test]
    fn test_copy_for() {
        assert_eq!(KernelId::copy_for(SampleFormat::Float32), KernelId::Copy32);
        assert_eq!(KernelId::copy_for(SampleFormat::Int24), KernelId::Copy24);
        assert_eq!(KernelId::copy_for(SampleFormat::UInt8), KernelId::Copy8);
    }

    #[test]
    fn test_map_honours_strides() {
        let src = crate::buffer::to_bytes(&[1i16, -1, 2, -2, 3, -3]);
        let mut dst = vec![0u8; 3 * 4 * 3];
        map::<i16, i32>(&mut dst, 3, &src, 2, 3, |x| x as i32 * 10);
        assert_eq!(
            crate::buffer::from_bytes::<i32>(&dst, 1, 9),
            vec![10, 0, 0, 20, 0, 0, 30, 0, 0]
        );
    }
}
