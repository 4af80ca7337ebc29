//! Float32 vers entiers.
//!
//! Le chemin simple tronque vers zéro. Les variantes tramées utilisent une
//! échelle réduite d'une unité pour que le dither ne déborde pas. Le
//! clipping borne la valeur avant troncature (32/24 bits, en double
//! précision) ou l'entier intermédiaire 32 bits (16/8 bits, en simple
//! précision). Sans clipping, une entrée hors de [-1.0, 1.0] donne un
//! résultat replié qui n'est pas une erreur.

use paste::paste;

use crate::dither::DitherState;
use crate::int24::I24;
use crate::kernels::map;

const INT32_SCALE: f64 = 2_147_483_647.0;
const INT32_DITHER_SCALE: f64 = 2_147_483_646.0;
const INT32_MIN_F64: f64 = -2_147_483_648.0;
const INT32_MAX_F64: f64 = 2_147_483_647.0;

/// Intermédiaire 32 bits justifié à gauche, commun à Int32 et Int24.
#[inline(always)]
pub(crate) fn scale_i32(x: f32) -> i32 {
    (x as f64 * INT32_SCALE) as i32
}

#[inline(always)]
pub(crate) fn scale_i32_dither(x: f32, dither: f32) -> i32 {
    (x as f64 * INT32_DITHER_SCALE + dither as f64) as i32
}

#[inline(always)]
pub(crate) fn scale_i32_clip(x: f32) -> i32 {
    (x as f64 * INT32_SCALE).clamp(INT32_MIN_F64, INT32_MAX_F64) as i32
}

#[inline(always)]
pub(crate) fn scale_i32_dither_clip(x: f32, dither: f32) -> i32 {
    (x as f64 * INT32_DITHER_SCALE + dither as f64).clamp(INT32_MIN_F64, INT32_MAX_F64) as i32
}

/// Famille Float32 -> destination large (intermédiaire en double précision).
macro_rules! float_to_wide {
    ($name:ident, $dst:ty, $pack:path, $dither:ident) => {
        paste! {
            pub fn [<float32_to_ $name>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                _dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| $pack(scale_i32(x)));
            }

            pub fn [<float32_to_ $name _dither>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| {
                    $pack(scale_i32_dither(x, dither.$dither()))
                });
            }

            pub fn [<float32_to_ $name _clip>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                _dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| {
                    $pack(scale_i32_clip(x))
                });
            }

            pub fn [<float32_to_ $name _dither_clip>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| {
                    $pack(scale_i32_dither_clip(x, dither.$dither()))
                });
            }
        }
    };
}

/// Famille Float32 -> 16/8 bits (simple précision, biais pour UInt8).
macro_rules! float_to_narrow {
    ($name:ident, $dst:ty, $scale:literal, $dither_scale:literal, $bias:literal, $lo:literal, $hi:literal) => {
        paste! {
            pub fn [<float32_to_ $name>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                _dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| {
                    ((x * $scale) as i32).saturating_add($bias) as $dst
                });
            }

            pub fn [<float32_to_ $name _dither>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| {
                    let dithered = x * $dither_scale + dither.generate_f32();
                    (dithered as i32).saturating_add($bias) as $dst
                });
            }

            pub fn [<float32_to_ $name _clip>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                _dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| {
                    ((x * $scale) as i32).saturating_add($bias).clamp($lo, $hi) as $dst
                });
            }

            pub fn [<float32_to_ $name _dither_clip>](
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                dither: &mut DitherState,
            ) {
                map::<f32, $dst>(dst, dst_stride, src, src_stride, count, |x| {
                    let dithered = x * $dither_scale + dither.generate_f32();
                    (dithered as i32).saturating_add($bias).clamp($lo, $hi) as $dst
                });
            }
        }
    };
}

#[inline(always)]
fn keep_i32(value: i32) -> i32 {
    value
}

float_to_wide!(int32, i32, keep_i32, generate_f32);
float_to_wide!(int24, I24, I24::from_msb_i32, generate_f32_24);

float_to_narrow!(int16, i16, 32767.0f32, 32766.0f32, 0, -32768, 32767);
float_to_narrow!(int8, i8, 127.0f32, 126.0f32, 0, -128, 127);
float_to_narrow!(uint8, u8, 127.0f32, 126.0f32, 128, 0, 255);
