//! Noyaux NEON pour Float32 vers Int32, Int24 et Int16.
//!
//! Même découpage que les noyaux x86 : [`LANES`] échantillons par
//! itération, double précision pour 32/24 bits, simple précision pour
//! 16 bits, reste confié au noyau scalaire. `fcvtzs` sature et envoie NaN
//! vers 0, exactement comme `as i32`. Float32 vers Int32 tramé n'ajoute pas
//! de dither dans la partie vectorielle (écart borné à 3 LSB).

use std::arch::aarch64::*;

use crate::buffer::PcmWord;
use crate::dither::{DitherState, LANES};
use crate::int24::I24;
use crate::kernels::{self, ConverterFn, KernelId};

const INT32_SCALE: f64 = 2_147_483_647.0;
const INT32_DITHER_SCALE: f64 = 2_147_483_646.0;

const INT16_SCALE: f32 = 32_767.0;
const INT16_DITHER_SCALE: f32 = 32_766.0;

/// Octets de poids fort de chaque voie 32 bits ; 0xff donne un octet nul.
const INT24_PACK: [u8; 16] = [1, 2, 3, 5, 6, 7, 9, 10, 11, 13, 14, 15, 0xff, 0xff, 0xff, 0xff];

/// Variante vectorielle d'un noyau, `None` s'il n'en a pas.
pub(super) fn kernel(id: KernelId) -> Option<ConverterFn> {
    let function: ConverterFn = match id {
        KernelId::Float32ToInt32 => float32_to_int32,
        KernelId::Float32ToInt32Dither => float32_to_int32_dither,
        KernelId::Float32ToInt32Clip => float32_to_int32_clip,
        KernelId::Float32ToInt32DitherClip => float32_to_int32_dither_clip,
        KernelId::Float32ToInt24 => float32_to_int24,
        KernelId::Float32ToInt24Dither => float32_to_int24_dither,
        KernelId::Float32ToInt24Clip => float32_to_int24_clip,
        KernelId::Float32ToInt24DitherClip => float32_to_int24_dither_clip,
        KernelId::Float32ToInt16 => float32_to_int16,
        KernelId::Float32ToInt16Dither => float32_to_int16_dither,
        KernelId::Float32ToInt16Clip => float32_to_int16_clip,
        KernelId::Float32ToInt16DitherClip => float32_to_int16_dither_clip,
        _ => return None,
    };
    Some(function)
}

macro_rules! entry_points {
    ($( $name:ident => $core:ident::<$($flag:tt),+>, $tail:path; )*) => {
        $(
            fn $name(
                dst: &mut [u8],
                dst_stride: usize,
                src: &[u8],
                src_stride: usize,
                count: usize,
                dither: &mut DitherState,
            ) {
                // SAFETY: distribuées par `kernel` seulement pour une
                // `Acceleration` vectorielle, donc après détection de NEON.
                unsafe { $core::<$($flag),+>(dst, dst_stride, src, src_stride, count, dither, $tail) }
            }
        )*
    };
}

// 32/24 bits : la conversion sature toujours, clip et non-clip coïncident.
entry_points! {
    float32_to_int32 => float32_to_wide::<false, false>, kernels::float32_to_int32;
    float32_to_int32_dither => float32_to_wide::<false, false>, kernels::float32_to_int32_dither;
    float32_to_int32_clip => float32_to_wide::<false, false>, kernels::float32_to_int32_clip;
    float32_to_int32_dither_clip => float32_to_wide::<false, false>, kernels::float32_to_int32_dither_clip;

    float32_to_int24 => float32_to_wide::<false, true>, kernels::float32_to_int24;
    float32_to_int24_dither => float32_to_wide::<true, true>, kernels::float32_to_int24_dither;
    float32_to_int24_clip => float32_to_wide::<false, true>, kernels::float32_to_int24_clip;
    float32_to_int24_dither_clip => float32_to_wide::<true, true>, kernels::float32_to_int24_dither_clip;

    float32_to_int16 => float32_to_int16_lanes::<false, false>, kernels::float32_to_int16;
    float32_to_int16_dither => float32_to_int16_lanes::<true, false>, kernels::float32_to_int16_dither;
    float32_to_int16_clip => float32_to_int16_lanes::<false, true>, kernels::float32_to_int16_clip;
    float32_to_int16_dither_clip => float32_to_int16_lanes::<true, true>, kernels::float32_to_int16_dither_clip;
}

/// Lit [`LANES`] flottants à partir de l'élément `first`.
///
/// Pas 2 : `ld2` désentrelace directement, si les 8 éléments sont dans le
/// buffer.
#[inline(always)]
unsafe fn load_f32x4(src: &[u8], first: usize, stride: usize) -> float32x4_t {
    let offset = first * 4;
    match stride {
        1 => {
            let bytes = &src[offset..offset + 16];
            vld1q_f32(bytes.as_ptr() as *const f32)
        }
        2 if src.len() >= offset + 32 => {
            let bytes = &src[offset..offset + 32];
            vld2q_f32(bytes.as_ptr() as *const f32).0
        }
        _ => {
            let lanes = [
                f32::load(src, first),
                f32::load(src, first + stride),
                f32::load(src, first + 2 * stride),
                f32::load(src, first + 3 * stride),
            ];
            vld1q_f32(lanes.as_ptr())
        }
    }
}

#[inline(always)]
unsafe fn lanes_i32(v: int32x4_t) -> [i32; LANES] {
    let mut out = [0i32; LANES];
    vst1q_s32(out.as_mut_ptr(), v);
    out
}

#[inline(always)]
unsafe fn store_i32x4(dst: &mut [u8], first: usize, stride: usize, v: int32x4_t) {
    if stride == 1 {
        let offset = first * 4;
        let bytes = &mut dst[offset..offset + 16];
        vst1q_s32(bytes.as_mut_ptr() as *mut i32, v);
    } else {
        for (lane, value) in lanes_i32(v).into_iter().enumerate() {
            value.store(dst, first + lane * stride);
        }
    }
}

/// Compacte 4 × 32 bits en 12 octets Int24 par table de permutation.
#[inline(always)]
unsafe fn store_i24x4(dst: &mut [u8], first: usize, stride: usize, v: int32x4_t) {
    if stride == 1 && cfg!(target_endian = "little") {
        let offset = first * 3;
        let packed = vqtbl1q_u8(vreinterpretq_u8_s32(v), vld1q_u8(INT24_PACK.as_ptr()));
        let mut bytes = [0u8; 16];
        vst1q_u8(bytes.as_mut_ptr(), packed);
        dst[offset..offset + 12].copy_from_slice(&bytes[..12]);
    } else {
        for (lane, value) in lanes_i32(v).into_iter().enumerate() {
            I24::from_msb_i32(value).store(dst, first + lane * stride);
        }
    }
}

/// Écrit les 16 bits de poids faible de chaque voie (repli en complément à deux).
#[inline(always)]
unsafe fn store_i16x4(dst: &mut [u8], first: usize, stride: usize, v: int32x4_t) {
    let narrowed = vmovn_s32(v);
    if stride == 1 {
        let offset = first * 2;
        let bytes = &mut dst[offset..offset + 8];
        vst1_s16(bytes.as_mut_ptr() as *mut i16, narrowed);
    } else {
        let mut lanes = [0i16; LANES];
        vst1_s16(lanes.as_mut_ptr(), narrowed);
        for (lane, value) in lanes.into_iter().enumerate() {
            value.store(dst, first + lane * stride);
        }
    }
}

/// Tronque deux voies f64 vers i32 en saturant (`fcvtzs` puis `sqxtn`).
#[inline(always)]
unsafe fn cvt_saturating_pd(v: float64x2_t) -> int32x2_t {
    vqmovn_s64(vcvtq_s64_f64(v))
}

#[allow(clippy::too_many_arguments)]
#[inline(always)]
fn finish(
    tail: ConverterFn,
    dst: &mut [u8],
    dst_stride: usize,
    dst_size: usize,
    src: &[u8],
    src_stride: usize,
    done: usize,
    count: usize,
    dither: &mut DitherState,
) {
    if done < count {
        tail(
            &mut dst[done * dst_stride * dst_size..],
            dst_stride,
            &src[done * src_stride * 4..],
            src_stride,
            count - done,
            dither,
        );
    }
}

#[allow(clippy::too_many_arguments)]
#[target_feature(enable = "neon")]
unsafe fn float32_to_wide<const DITHER: bool, const PACK24: bool>(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    count: usize,
    dither: &mut DitherState,
    tail: ConverterFn,
) {
    let scale = vdupq_n_f64(if DITHER { INT32_DITHER_SCALE } else { INT32_SCALE });

    let mut done = 0;
    while done + LANES <= count {
        let x = load_f32x4(src, done * src_stride, src_stride);
        let mut lo = vmulq_f64(vcvt_f64_f32(vget_low_f32(x)), scale);
        let mut hi = vmulq_f64(vcvt_high_f64_f32(x), scale);

        if DITHER {
            let lanes = if PACK24 {
                dither.generate_f32_24_lanes()
            } else {
                dither.generate_f32_lanes()
            };
            let d = vld1q_f32(lanes.as_ptr());
            lo = vaddq_f64(lo, vcvt_f64_f32(vget_low_f32(d)));
            hi = vaddq_f64(hi, vcvt_high_f64_f32(d));
        }

        let v = vcombine_s32(cvt_saturating_pd(lo), cvt_saturating_pd(hi));
        if PACK24 {
            store_i24x4(dst, done * dst_stride, dst_stride, v);
        } else {
            store_i32x4(dst, done * dst_stride, dst_stride, v);
        }
        done += LANES;
    }

    let dst_size = if PACK24 { 3 } else { 4 };
    finish(tail, dst, dst_stride, dst_size, src, src_stride, done, count, dither);
}

#[allow(clippy::too_many_arguments)]
#[target_feature(enable = "neon")]
unsafe fn float32_to_int16_lanes<const DITHER: bool, const CLIP: bool>(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    count: usize,
    dither: &mut DitherState,
    tail: ConverterFn,
) {
    let scale = vdupq_n_f32(if DITHER { INT16_DITHER_SCALE } else { INT16_SCALE });
    let min = vdupq_n_s32(i16::MIN as i32);
    let max = vdupq_n_s32(i16::MAX as i32);

    let mut done = 0;
    while done + LANES <= count {
        let x = load_f32x4(src, done * src_stride, src_stride);
        // Multiplication puis addition séparées : pas de fma, comme le scalaire
        let mut scaled = vmulq_f32(x, scale);
        if DITHER {
            let lanes = dither.generate_f32_lanes();
            scaled = vaddq_f32(scaled, vld1q_f32(lanes.as_ptr()));
        }
        let mut v = vcvtq_s32_f32(scaled);
        if CLIP {
            v = vmaxq_s32(vminq_s32(v, max), min);
        }
        store_i16x4(dst, done * dst_stride, dst_stride, v);
        done += LANES;
    }

    finish(tail, dst, dst_stride, 2, src, src_stride, done, count, dither);
}
