//! Outils partagés par les tests d'intégration.

#![allow(dead_code)]

use pmoconvert::buffer::{from_bytes, to_bytes, PcmWord};
use pmoconvert::{Converter, DitherState};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Buffer source où seul un élément sur `stride` porte un échantillon.
pub fn strided_source<W: PcmWord + Default>(samples: &[W], stride: usize) -> Vec<u8> {
    let mut padded = vec![W::default(); samples.len() * stride];
    for (i, sample) in samples.iter().enumerate() {
        padded[i * stride] = *sample;
    }
    to_bytes(&padded)
}

/// Exécute une conversion et relit les échantillons produits.
pub fn run_converter<D: PcmWord>(
    converter: &Converter,
    src: &[u8],
    src_stride: usize,
    dst_stride: usize,
    count: usize,
    dither: &mut DitherState,
) -> Vec<D> {
    let mut dst = vec![0u8; count.max(1) * dst_stride * D::SIZE];
    converter
        .convert(&mut dst, dst_stride, src, src_stride, count, dither)
        .unwrap();
    from_bytes(&dst, dst_stride, count)
}
