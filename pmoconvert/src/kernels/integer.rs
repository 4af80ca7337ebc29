//! Conversions depuis les formats entiers.
//!
//! Int32 et Int24 passent par une valeur 32 bits justifiée à gauche. Les
//! élargissements sont de purs décalages (les bits de poids faible sont à
//! zéro), les rétrécissements tronquent ou ajoutent le dither entier avant
//! un décalage de 15 bits.

use crate::dither::DitherState;
use crate::int24::I24;
use crate::kernels::map;

const INV_2_POW_31: f64 = 1.0 / 2_147_483_648.0;
const INV_32768: f32 = 1.0 / 32_768.0;
const INV_128: f32 = 1.0 / 128.0;

#[inline(always)]
fn msb_to_float32(value: i32) -> f32 {
    (value as f64 * INV_2_POW_31) as f32
}

/// `((x >> 1) + d) >> 15`, soit un 16 bits tramé.
#[inline(always)]
fn msb_to_i16_dither(value: i32, dither: &mut DitherState) -> i16 {
    (((value >> 1) + dither.generate_i16()) >> 15) as i16
}

#[inline(always)]
fn msb_to_i8_dither(value: i32, dither: &mut DitherState) -> i8 {
    (((value >> 1) + dither.generate_i16()) >> 23) as i8
}

#[inline(always)]
fn msb_to_u8(value: i32) -> u8 {
    ((value >> 24) + 128) as u8
}

/// Déclare un noyau sans état de dither : `name(S) -> D` via une expression.
macro_rules! plain_kernel {
    ($name:ident, $src:ty => $dst:ty, |$x:ident| $body:expr) => {
        pub fn $name(
            dst: &mut [u8],
            dst_stride: usize,
            src: &[u8],
            src_stride: usize,
            count: usize,
            _dither: &mut DitherState,
        ) {
            map::<$src, $dst>(dst, dst_stride, src, src_stride, count, |$x: $src| $body);
        }
    };
}

macro_rules! dither_kernel {
    ($name:ident, $src:ty => $dst:ty, |$x:ident, $d:ident| $body:expr) => {
        pub fn $name(
            dst: &mut [u8],
            dst_stride: usize,
            src: &[u8],
            src_stride: usize,
            count: usize,
            dither: &mut DitherState,
        ) {
            let $d = dither;
            map::<$src, $dst>(dst, dst_stride, src, src_stride, count, |$x: $src| $body);
        }
    };
}

// Int32
plain_kernel!(int32_to_float32, i32 => f32, |x| msb_to_float32(x));
plain_kernel!(int32_to_int24, i32 => I24, |x| I24::from_msb_i32(x));
plain_kernel!(int32_to_int16, i32 => i16, |x| (x >> 16) as i16);
dither_kernel!(int32_to_int16_dither, i32 => i16, |x, d| msb_to_i16_dither(x, d));
plain_kernel!(int32_to_int8, i32 => i8, |x| (x >> 24) as i8);
dither_kernel!(int32_to_int8_dither, i32 => i8, |x, d| msb_to_i8_dither(x, d));
plain_kernel!(int32_to_uint8, i32 => u8, |x| msb_to_u8(x));

// Int24 : extension de signe puis mêmes règles que Int32
plain_kernel!(int24_to_float32, I24 => f32, |x| msb_to_float32(x.to_msb_i32()));
plain_kernel!(int24_to_int32, I24 => i32, |x| x.to_msb_i32());
plain_kernel!(int24_to_int16, I24 => i16, |x| (x.as_i32() >> 8) as i16);
dither_kernel!(int24_to_int16_dither, I24 => i16, |x, d| msb_to_i16_dither(x.to_msb_i32(), d));
plain_kernel!(int24_to_int8, I24 => i8, |x| (x.as_i32() >> 16) as i8);
dither_kernel!(int24_to_int8_dither, I24 => i8, |x, d| msb_to_i8_dither(x.to_msb_i32(), d));
plain_kernel!(int24_to_uint8, I24 => u8, |x| msb_to_u8(x.to_msb_i32()));

// Int16
plain_kernel!(int16_to_float32, i16 => f32, |x| x as f32 * INV_32768);
plain_kernel!(int16_to_int32, i16 => i32, |x| (x as i32) << 16);
plain_kernel!(int16_to_int24, i16 => I24, |x| I24::from_msb_i32((x as i32) << 16));
plain_kernel!(int16_to_int8, i16 => i8, |x| (x >> 8) as i8);
plain_kernel!(int16_to_uint8, i16 => u8, |x| ((x >> 8) + 128) as u8);

// Int8
plain_kernel!(int8_to_float32, i8 => f32, |x| x as f32 * INV_128);
plain_kernel!(int8_to_int32, i8 => i32, |x| (x as i32) << 24);
plain_kernel!(int8_to_int24, i8 => I24, |x| I24::from_msb_i32((x as i32) << 24));
plain_kernel!(int8_to_int16, i8 => i16, |x| (x as i16) << 8);
plain_kernel!(int8_to_uint8, i8 => u8, |x| (x as u8).wrapping_add(128));

// UInt8 : biais de 128 retiré avant l'élargissement
plain_kernel!(uint8_to_float32, u8 => f32, |x| (x as i32 - 128) as f32 * INV_128);
plain_kernel!(uint8_to_int32, u8 => i32, |x| (x as i32 - 128) << 24);
plain_kernel!(uint8_to_int24, u8 => I24, |x| I24::from_msb_i32((x as i32 - 128) << 24));
plain_kernel!(uint8_to_int16, u8 => i16, |x| ((x as i32 - 128) << 8) as i16);
plain_kernel!(uint8_to_int8, u8 => i8, |x| x.wrapping_sub(128) as i8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{from_bytes, to_bytes, PcmWord};
    use crate::kernels::ConverterFn;

    fn run<S: PcmWord, D: PcmWord>(kernel: ConverterFn, input: &[S]) -> Vec<D> {
        let src = to_bytes(input);
        let mut dst = vec![0u8; input.len() * D::SIZE];
        let mut dither = DitherState::new();
        kernel(&mut dst, 1, &src, 1, input.len(), &mut dither);
        from_bytes(&dst, 1, input.len())
    }

    #[test]
    fn test_widening_is_shift() {
        let out: Vec<i32> = run(int16_to_int32, &[1i16, -1, i16::MAX, i16::MIN]);
        assert_eq!(out, vec![1 << 16, -(1 << 16), 0x7fff_0000, i32::MIN]);

        let out: Vec<I24> = run(int8_to_int24, &[-128i8, 1]);
        assert_eq!(out, vec![I24::MIN, I24::new(0x01_0000).unwrap()]);
    }

    #[test]
    fn test_uint8_bias() {
        let out: Vec<i8> = run(uint8_to_int8, &[0u8, 128, 255]);
        assert_eq!(out, vec![-128, 0, 127]);

        let back: Vec<u8> = run(int8_to_uint8, &[-128i8, 0, 127]);
        assert_eq!(back, vec![0, 128, 255]);

        let wide: Vec<i16> = run(uint8_to_int16, &[0u8, 128, 255]);
        assert_eq!(wide, vec![-32768, 0, 127 << 8]);
    }

    #[test]
    fn test_to_float_scaling() {
        let out: Vec<f32> = run(int16_to_float32, &[i16::MIN, 0, 16384]);
        assert_eq!(out, vec![-1.0, 0.0, 0.5]);

        let out: Vec<f32> = run(int24_to_float32, &[I24::MIN, I24::new(0x40_0000).unwrap()]);
        assert_eq!(out, vec![-1.0, 0.5]);

        let out: Vec<f32> = run(uint8_to_float32, &[0u8, 128, 192]);
        assert_eq!(out, vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_narrowing_truncates() {
        let out: Vec<i16> = run(int24_to_int16, &[I24::new(0x12_3456).unwrap(), I24::new(-1).unwrap()]);
        assert_eq!(out, vec![0x1234, -1]);

        let out: Vec<u8> = run(int32_to_uint8, &[i32::MIN, 0, i32::MAX]);
        assert_eq!(out, vec![0, 128, 255]);

        let out: Vec<I24> = run(int32_to_int24, &[0x1234_56ff_i32]);
        assert_eq!(out[0].as_i32(), 0x12_3456);
    }

    #[test]
    fn test_dithered_narrowing_stays_within_one_lsb() {
        let input: Vec<i32> = (0..1024).map(|i| (i - 512) * 4_000_000).collect();
        let out: Vec<i16> = run(int32_to_int16_dither, &input);
        for (x, y) in input.iter().zip(out) {
            let exact = (*x >> 16) as i32;
            assert!((y as i32 - exact).abs() <= 1, "{x} -> {y}");
        }
    }
}
