//! Écriture du silence numérique.
//!
//! 0 pour les formats en complément à deux et Float32, 128 pour UInt8.

use tracing::debug;

use crate::buffer::check_buffer;
use crate::error::{BufferRole, Result};
use crate::format::{SampleFormat, SampleFormatMask};

/// `(dst, dst_stride, count)`
pub type ZeroerFn = fn(&mut [u8], usize, usize);

#[inline(always)]
fn fill_strided<const SIZE: usize>(dst: &mut [u8], stride: usize, count: usize, value: u8) {
    if stride == 1 {
        dst[..count * SIZE].fill(value);
        return;
    }
    for i in 0..count {
        let offset = i * stride * SIZE;
        dst[offset..offset + SIZE].fill(value);
    }
}

pub fn zero_u8(dst: &mut [u8], stride: usize, count: usize) {
    fill_strided::<1>(dst, stride, count, 128);
}

pub fn zero_8(dst: &mut [u8], stride: usize, count: usize) {
    fill_strided::<1>(dst, stride, count, 0);
}

pub fn zero_16(dst: &mut [u8], stride: usize, count: usize) {
    fill_strided::<2>(dst, stride, count, 0);
}

pub fn zero_24(dst: &mut [u8], stride: usize, count: usize) {
    fill_strided::<3>(dst, stride, count, 0);
}

pub fn zero_32(dst: &mut [u8], stride: usize, count: usize) {
    fill_strided::<4>(dst, stride, count, 0);
}

/// Indexée par [`SampleFormat::index`] ; Float32 partage le zéro 32 bits.
const ZEROERS: [ZeroerFn; 6] = [zero_32, zero_32, zero_24, zero_16, zero_8, zero_u8];

/// Remplisseur de silence pour un format donné.
#[derive(Clone, Copy)]
pub struct Zeroer {
    format: SampleFormat,
    function: ZeroerFn,
}

impl std::fmt::Debug for Zeroer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zeroer").field("format", &self.format).finish()
    }
}

impl Zeroer {
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn function(&self) -> ZeroerFn {
        self.function
    }

    /// Écrit `count` échantillons silencieux au pas `stride` (en éléments).
    pub fn zero(&self, dst: &mut [u8], stride: usize, count: usize) -> Result<()> {
        check_buffer(BufferRole::Destination, dst.len(), self.format, stride, count)?;
        if count > 0 {
            (self.function)(dst, stride, count);
        }
        Ok(())
    }
}

pub fn select_zeroer(format: SampleFormat) -> Zeroer {
    debug!(%format, "Selected zeroer");
    Zeroer {
        format,
        function: ZEROERS[format.index()],
    }
}

/// Variante sur masque brut (exactement un format connu).
pub fn select_zeroer_for_mask(mask: SampleFormatMask) -> Result<Zeroer> {
    Ok(select_zeroer(SampleFormat::try_from(mask)?))
}
