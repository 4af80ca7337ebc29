//! Noyaux SSE2/SSSE3 pour Float32 vers Int32, Int24 et Int16.
//!
//! Chaque itération traite [`LANES`] échantillons. Les chemins 32/24 bits
//! calculent en double précision comme les noyaux scalaires, le chemin
//! 16 bits en simple précision : à entrée identique le résultat est
//! identique au scalaire. Seule exception, Float32 vers Int32 tramé n'ajoute
//! pas de dither dans la partie vectorielle (écart borné à 3 LSB).
//!
//! Les conversions flottant vers entier reproduisent `as i32` : saturation
//! aux bornes, NaN vers 0. Les instructions `cvtt*` rendent `0x8000_0000`
//! dans ces cas et sont donc corrigées.
//!
//! Le reste (`count % LANES`) est confié au noyau scalaire correspondant.

use std::arch::x86_64::*;

use crate::buffer::PcmWord;
use crate::dither::{DitherState, LANES};
use crate::int24::I24;
use crate::kernels::{self, ConverterFn, KernelId};

const INT32_SCALE: f64 = 2_147_483_647.0;
const INT32_DITHER_SCALE: f64 = 2_147_483_646.0;
const INT32_MIN_F64: f64 = -2_147_483_648.0;
const INT32_MAX_F64: f64 = 2_147_483_647.0;

const INT16_SCALE: f32 = 32_767.0;
const INT16_DITHER_SCALE: f32 = 32_766.0;
const INT16_MIN_F32: f32 = -32_768.0;
const INT16_MAX_F32: f32 = 32_767.0;

/// 2^31, premier flottant hors de la plage i32.
const INT32_OVERFLOW_F32: f32 = 2_147_483_648.0;

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
                // SAFETY: ces fonctions ne sont distribuées que par `kernel`,
                // appelé uniquement pour une `Acceleration` vectorielle, donc
                // après détection de SSSE3.
                unsafe { $core::<$($flag),+>(dst, dst_stride, src, src_stride, count, dither, $tail) }
            }
        )*
    };
}

// Int32 : pas de dither vectoriel, les variantes tramées gardent le reste tramé.
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
/// Pas 1 : un seul chargement. Pas 2 : deux chargements et un
/// désentrelacement, si les 8 éléments sont dans le buffer. Sinon les voies
/// sont assemblées une à une.
#[inline(always)]
unsafe fn load_f32x4(src: &[u8], first: usize, stride: usize) -> __m128 {
    let offset = first * 4;
    match stride {
        1 => {
            let bytes = &src[offset..offset + 16];
            _mm_loadu_ps(bytes.as_ptr() as *const f32)
        }
        2 if src.len() >= offset + 32 => {
            let bytes = &src[offset..offset + 32];
            let lo = _mm_loadu_ps(bytes.as_ptr() as *const f32);
            let hi = _mm_loadu_ps(bytes[16..].as_ptr() as *const f32);
            _mm_shuffle_ps::<0b10_00_10_00>(lo, hi)
        }
        _ => _mm_setr_ps(
            f32::load(src, first),
            f32::load(src, first + stride),
            f32::load(src, first + 2 * stride),
            f32::load(src, first + 3 * stride),
        ),
    }
}

/// Borne en double précision avec la sémantique de `as i32` (NaN vers 0).
#[inline(always)]
unsafe fn saturate_pd(v: __m128d) -> __m128d {
    let v = _mm_and_pd(v, _mm_cmpord_pd(v, v));
    _mm_max_pd(_mm_min_pd(v, _mm_set1_pd(INT32_MAX_F64)), _mm_set1_pd(INT32_MIN_F64))
}

/// `_mm_cvttps_epi32` avec la sémantique de `as i32`.
///
/// Les voies au-delà de 2^31 valent `0x8000_0000` après conversion ; le
/// masque de dépassement les inverse en `i32::MAX`. Les NaN sont remis à 0.
#[inline(always)]
unsafe fn cvtt_saturating_ps(v: __m128) -> __m128i {
    let ordered = _mm_castps_si128(_mm_cmpord_ps(v, v));
    let overflow = _mm_castps_si128(_mm_cmpge_ps(v, _mm_set1_ps(INT32_OVERFLOW_F32)));
    _mm_and_si128(_mm_xor_si128(_mm_cvttps_epi32(v), overflow), ordered)
}

#[inline(always)]
unsafe fn lanes_i32(v: __m128i) -> [i32; LANES] {
    let mut out = [0i32; LANES];
    _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, v);
    out
}

#[inline(always)]
unsafe fn store_i32x4(dst: &mut [u8], first: usize, stride: usize, v: __m128i) {
    if stride == 1 {
        let offset = first * 4;
        let bytes = &mut dst[offset..offset + 16];
        _mm_storeu_si128(bytes.as_mut_ptr() as *mut __m128i, v);
    } else {
        for (lane, value) in lanes_i32(v).into_iter().enumerate() {
            value.store(dst, first + lane * stride);
        }
    }
}

/// Compacte 4 × 32 bits en 12 octets Int24 (octets de poids fort), écrits
/// en deux transactions de 8 puis 4 octets.
#[inline]
#[target_feature(enable = "ssse3")]
unsafe fn store_i24x4(dst: &mut [u8], first: usize, stride: usize, v: __m128i) {
    if stride == 1 {
        let offset = first * 3;
        let bytes = &mut dst[offset..offset + 12];
        let shuffle = _mm_setr_epi8(1, 2, 3, 5, 6, 7, 9, 10, 11, 13, 14, 15, -1, -1, -1, -1);
        let packed = _mm_shuffle_epi8(v, shuffle);
        _mm_storel_epi64(bytes.as_mut_ptr() as *mut __m128i, packed);
        let tail = _mm_cvtsi128_si32(_mm_srli_si128::<8>(packed));
        bytes[8..12].copy_from_slice(&tail.to_le_bytes());
    } else {
        for (lane, value) in lanes_i32(v).into_iter().enumerate() {
            I24::from_msb_i32(value).store(dst, first + lane * stride);
        }
    }
}

/// Écrit les 16 bits de poids faible de chaque voie (repli en complément à deux).
#[inline(always)]
unsafe fn store_i16x4(dst: &mut [u8], first: usize, stride: usize, v: __m128i) {
    let wrapped = _mm_srai_epi32::<16>(_mm_slli_epi32::<16>(v));
    if stride == 1 {
        let offset = first * 2;
        let bytes = &mut dst[offset..offset + 8];
        let packed = _mm_packs_epi32(wrapped, wrapped);
        _mm_storel_epi64(bytes.as_mut_ptr() as *mut __m128i, packed);
    } else {
        for (lane, value) in lanes_i32(wrapped).into_iter().enumerate() {
            (value as i16).store(dst, first + lane * stride);
        }
    }
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
#[target_feature(enable = "ssse3")]
unsafe fn float32_to_wide<const DITHER: bool, const PACK24: bool>(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    count: usize,
    dither: &mut DitherState,
    tail: ConverterFn,
) {
    let scale = _mm_set1_pd(if DITHER { INT32_DITHER_SCALE } else { INT32_SCALE });

    let mut done = 0;
    while done + LANES <= count {
        let x = load_f32x4(src, done * src_stride, src_stride);
        let mut lo = _mm_mul_pd(_mm_cvtps_pd(x), scale);
        let mut hi = _mm_mul_pd(_mm_cvtps_pd(_mm_movehl_ps(x, x)), scale);

        if DITHER {
            let lanes = if PACK24 {
                dither.generate_f32_24_lanes()
            } else {
                dither.generate_f32_lanes()
            };
            let d = _mm_loadu_ps(lanes.as_ptr());
            lo = _mm_add_pd(lo, _mm_cvtps_pd(d));
            hi = _mm_add_pd(hi, _mm_cvtps_pd(_mm_movehl_ps(d, d)));
        }
        lo = saturate_pd(lo);
        hi = saturate_pd(hi);

        let v = _mm_unpacklo_epi64(_mm_cvttpd_epi32(lo), _mm_cvttpd_epi32(hi));
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
#[target_feature(enable = "ssse3")]
unsafe fn float32_to_int16_lanes<const DITHER: bool, const CLIP: bool>(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    count: usize,
    dither: &mut DitherState,
    tail: ConverterFn,
) {
    let scale = _mm_set1_ps(if DITHER { INT16_DITHER_SCALE } else { INT16_SCALE });
    let min = _mm_set1_ps(INT16_MIN_F32);
    let max = _mm_set1_ps(INT16_MAX_F32);

    let mut done = 0;
    while done + LANES <= count {
        let x = load_f32x4(src, done * src_stride, src_stride);
        let mut scaled = _mm_mul_ps(x, scale);
        if DITHER {
            let lanes = dither.generate_f32_lanes();
            scaled = _mm_add_ps(scaled, _mm_loadu_ps(lanes.as_ptr()));
        }
        if CLIP {
            // NaN en second opérande : il traverse min/max et finit à 0
            scaled = _mm_max_ps(min, _mm_min_ps(max, scaled));
        }
        store_i16x4(dst, done * dst_stride, dst_stride, cvtt_saturating_ps(scaled));
        done += LANES;
    }

    finish(tail, dst, dst_stride, 2, src, src_stride, done, count, dither);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{from_bytes, to_bytes};

    #[test]
    fn test_int24_shuffle_matches_scalar_packing() {
        if !std::is_x86_feature_detected!("ssse3") {
            return;
        }
        let values = [0x7fff_ff00_u32 as i32, -256, 0x1234_5678, i32::MIN];
        let mut dst = vec![0u8; 12];
        unsafe {
            let v = _mm_loadu_si128(values.as_ptr() as *const __m128i);
            store_i24x4(&mut dst, 0, 1, v);
        }
        let packed: Vec<I24> = from_bytes(&dst, 1, 4);
        let expected: Vec<I24> = values.iter().map(|v| I24::from_msb_i32(*v)).collect();
        assert_eq!(packed, expected);
    }

    #[test]
    fn test_stride_two_load() {
        let input: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let src = to_bytes(&input);
        let mut lanes = [0f32; 4];
        unsafe {
            _mm_storeu_ps(lanes.as_mut_ptr(), load_f32x4(&src, 0, 2));
        }
        assert_eq!(lanes, [0.0, 2.0, 4.0, 6.0]);

        // 7 éléments seulement : assemblage voie par voie
        let short = to_bytes(&input[..7]);
        unsafe {
            _mm_storeu_ps(lanes.as_mut_ptr(), load_f32x4(&short, 0, 2));
        }
        assert_eq!(lanes, [0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_conversions_saturate_like_as() {
        let input = [f32::NAN, 1.0e10, -1.0e10, 2_147_483_648.0];
        let mut ints = [0i32; 4];
        unsafe {
            let v = cvtt_saturating_ps(_mm_loadu_ps(input.as_ptr()));
            _mm_storeu_si128(ints.as_mut_ptr() as *mut __m128i, v);
        }
        assert_eq!(ints, input.map(|x| x as i32));

        let mut wide = [0f64; 2];
        unsafe {
            let v = saturate_pd(_mm_set_pd(3.0e9, f64::NAN));
            _mm_storeu_pd(wide.as_mut_ptr(), v);
        }
        assert_eq!(wide, [0.0, INT32_MAX_F64]);
    }
}
