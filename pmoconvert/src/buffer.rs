//! Accès typé aux buffers d'échantillons opaques.
//!
//! Un buffer est une tranche d'octets et un pas (stride) exprimé en nombre
//! d'éléments. Pour Int24, un élément occupe 3 octets : le pas effectif en
//! octets est donc `3 × stride`.

use crate::error::{BufferRole, ConvertError, Result};
use crate::format::SampleFormat;
use crate::int24::I24;

/// Mot PCM natif lisible/écrivable à un index d'élément d'un buffer d'octets.
///
/// Les accès sont non alignés et bornés : un index hors du buffer panique,
/// d'où la validation faite par [`check_buffer`] avant chaque noyau.
pub trait PcmWord: Copy + Send + Sync + 'static {
    const FORMAT: SampleFormat;
    const SIZE: usize;

    fn load(buf: &[u8], index: usize) -> Self;

    fn store(self, buf: &mut [u8], index: usize);
}

macro_rules! native_word {
    ($ty:ty, $format:ident) => {
        impl PcmWord for $ty {
            const FORMAT: SampleFormat = SampleFormat::$format;
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline(always)]
            fn load(buf: &[u8], index: usize) -> Self {
                let offset = index * Self::SIZE;
                bytemuck::pod_read_unaligned(&buf[offset..offset + Self::SIZE])
            }

            #[inline(always)]
            fn store(self, buf: &mut [u8], index: usize) {
                let offset = index * Self::SIZE;
                buf[offset..offset + Self::SIZE].copy_from_slice(bytemuck::bytes_of(&self));
            }
        }
    };
}

native_word!(f32, Float32);
native_word!(i32, Int32);
native_word!(i16, Int16);
native_word!(i8, Int8);
native_word!(u8, UInt8);

impl PcmWord for I24 {
    const FORMAT: SampleFormat = SampleFormat::Int24;
    const SIZE: usize = 3;

    #[inline(always)]
    fn load(buf: &[u8], index: usize) -> Self {
        let offset = index * 3;
        I24::from_bytes([buf[offset], buf[offset + 1], buf[offset + 2]])
    }

    #[inline(always)]
    fn store(self, buf: &mut [u8], index: usize) {
        let offset = index * 3;
        buf[offset..offset + 3].copy_from_slice(&self.to_bytes());
    }
}

/// Nombre d'octets nécessaires pour `count` éléments espacés de `stride`.
///
/// Retourne `None` en cas de débordement arithmétique.
#[inline]
pub fn required_bytes(count: usize, stride: usize, element_size: usize) -> Option<usize> {
    if count == 0 {
        return Some(0);
    }
    (count - 1)
        .checked_mul(stride)?
        .checked_add(1)?
        .checked_mul(element_size)
}

/// Vérifie qu'un buffer peut recevoir `count` éléments de `format` au pas `stride`.
pub fn check_buffer(
    role: BufferRole,
    len: usize,
    format: SampleFormat,
    stride: usize,
    count: usize,
) -> Result<()> {
    if stride == 0 {
        return Err(ConvertError::InvalidStride(role));
    }
    let needed = required_bytes(count, stride, format.bytes_per_sample()).unwrap_or(usize::MAX);
    if len < needed {
        return Err(ConvertError::BufferTooSmall {
            role,
            needed,
            actual: len,
        });
    }
    Ok(())
}

/// Sérialise des échantillons natifs dans un buffer contigu.
pub fn to_bytes<W: PcmWord>(samples: &[W]) -> Vec<u8> {
    let mut buf = vec![0u8; samples.len() * W::SIZE];
    for (index, sample) in samples.iter().enumerate() {
        sample.store(&mut buf, index);
    }
    buf
}

/// Relit `count` échantillons espacés de `stride` éléments.
pub fn from_bytes<W: PcmWord>(buf: &[u8], stride: usize, count: usize) -> Vec<W> {
    (0..count).map(|i| W::load(buf, i * stride)).collect()
}
