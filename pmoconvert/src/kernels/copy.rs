//! Copies brutes pour les conversions unitaires (source == destination).

use crate::dither::DitherState;

#[inline(always)]
fn copy_strided<const SIZE: usize>(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    count: usize,
) {
    if count == 0 {
        return;
    }
    if dst_stride == 1 && src_stride == 1 {
        let len = count * SIZE;
        dst[..len].copy_from_slice(&src[..len]);
        return;
    }
    for i in 0..count {
        let s = i * src_stride * SIZE;
        let d = i * dst_stride * SIZE;
        dst[d..d + SIZE].copy_from_slice(&src[s..s + SIZE]);
    }
}

macro_rules! copy_kernel {
    ($name:ident, $size:literal) => {
        pub fn $name(
            dst: &mut [u8],
            dst_stride: usize,
            src: &[u8],
            src_stride: usize,
            count: usize,
            _dither: &mut DitherState,
        ) {
            copy_strided::<$size>(dst, dst_stride, src, src_stride, count);
        }
    };
}

copy_kernel!(copy_8, 1);
copy_kernel!(copy_16, 2);
copy_kernel!(copy_24, 3);
copy_kernel!(copy_32, 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_24_strided() {
        let src: Vec<u8> = (0..18).collect();
        let mut dst = vec![0xaa; 9];
        copy_24(&mut dst, 1, &src, 2, 3, &mut DitherState::new());
        assert_eq!(dst, vec![0, 1, 2, 6, 7, 8, 12, 13, 14]);
    }

    #[test]
    fn test_copy_leaves_gaps_untouched() {
        let src = [1u8, 2, 3];
        let mut dst = [0u8; 5];
        copy_8(&mut dst, 2, &src, 1, 3, &mut DitherState::new());
        assert_eq!(dst, [1, 0, 2, 0, 3]);
    }
}
