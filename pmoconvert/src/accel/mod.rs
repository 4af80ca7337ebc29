//! Stratégie d'accélération vectorielle.
//!
//! Les capacités du processeur sont détectées une seule fois. Une
//! [`Acceleration`] est une valeur passée explicitement au sélecteur : deux
//! appelants d'un même processus peuvent demander des politiques
//! différentes sans état global modifiable.

#[cfg(all(target_arch = "x86_64", not(feature = "scalar-only")))]
mod x86;

#[cfg(all(target_arch = "aarch64", not(feature = "scalar-only")))]
mod aarch64;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::kernels::{ConverterFn, KernelId};

pub use crate::dither::LANES;

/// Politique demandée par la configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelerationPolicy {
    /// Vectoriel si le processeur le permet
    #[default]
    Auto,
    Scalar,
    /// Vectoriel exigé (retombe en scalaire avec un avertissement si absent)
    Vector,
}

/// Implémentation effectivement retenue pour un noyau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelStrategy {
    Scalar,
    Vector,
}

impl std::fmt::Display for KernelStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelStrategy::Scalar => f.write_str("scalar"),
            KernelStrategy::Vector => f.write_str("vector"),
        }
    }
}

static VECTOR_SUPPORT: Lazy<bool> = Lazy::new(|| {
    let supported = detect_vector_support();
    info!(vector = supported, "Detected conversion kernel capabilities");
    supported
});

#[cfg(all(target_arch = "x86_64", not(feature = "scalar-only")))]
fn detect_vector_support() -> bool {
    std::is_x86_feature_detected!("ssse3")
}

#[cfg(all(target_arch = "aarch64", not(feature = "scalar-only")))]
fn detect_vector_support() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(all(
    any(target_arch = "x86_64", target_arch = "aarch64"),
    not(feature = "scalar-only")
)))]
fn detect_vector_support() -> bool {
    false
}

/// Capacité d'accélération, résolue au démarrage d'une session.
///
/// Le champ est privé : une valeur vectorielle ne peut être construite que
/// si la détection matérielle l'a autorisée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acceleration {
    vector: bool,
}

impl Default for Acceleration {
    fn default() -> Self {
        Self::detect()
    }
}

impl Acceleration {
    /// Noyaux scalaires uniquement.
    pub const fn scalar() -> Self {
        Self { vector: false }
    }

    /// Meilleure stratégie disponible sur ce processeur.
    pub fn detect() -> Self {
        Self {
            vector: *VECTOR_SUPPORT,
        }
    }

    pub fn from_policy(policy: AccelerationPolicy) -> Self {
        match policy {
            AccelerationPolicy::Scalar => Self::scalar(),
            AccelerationPolicy::Auto => Self::detect(),
            AccelerationPolicy::Vector => {
                let detected = Self::detect();
                if !detected.vector {
                    warn!("Vector acceleration requested but not supported, using scalar kernels");
                }
                detected
            }
        }
    }

    #[inline]
    pub const fn is_vector(&self) -> bool {
        self.vector
    }

    /// Variante vectorielle d'un noyau, si elle existe et si elle est permise.
    pub fn vector_fn(&self, kernel: KernelId) -> Option<ConverterFn> {
        if !self.vector {
            return None;
        }
        vector_kernel(kernel)
    }

    /// Noyau à exécuter et stratégie retenue.
    pub fn resolve(&self, kernel: KernelId, scalar: ConverterFn) -> (ConverterFn, KernelStrategy) {
        match self.vector_fn(kernel) {
            Some(function) => (function, KernelStrategy::Vector),
            None => (scalar, KernelStrategy::Scalar),
        }
    }
}

#[cfg(all(target_arch = "x86_64", not(feature = "scalar-only")))]
fn vector_kernel(kernel: KernelId) -> Option<ConverterFn> {
    x86::kernel(kernel)
}

#[cfg(all(target_arch = "aarch64", not(feature = "scalar-only")))]
fn vector_kernel(kernel: KernelId) -> Option<ConverterFn> {
    aarch64::kernel(kernel)
}

#[cfg(not(all(
    any(target_arch = "x86_64", target_arch = "aarch64"),
    not(feature = "scalar-only")
)))]
fn vector_kernel(_kernel: KernelId) -> Option<ConverterFn> {
    None
}

/// Noyaux disposant d'une variante vectorielle.
pub const ACCELERATED_KERNELS: [KernelId; 12] = [
    KernelId::Float32ToInt32,
    KernelId::Float32ToInt32Dither,
    KernelId::Float32ToInt32Clip,
    KernelId::Float32ToInt32DitherClip,
    KernelId::Float32ToInt24,
    KernelId::Float32ToInt24Dither,
    KernelId::Float32ToInt24Clip,
    KernelId::Float32ToInt24DitherClip,
    KernelId::Float32ToInt16,
    KernelId::Float32ToInt16Dither,
    KernelId::Float32ToInt16Clip,
    KernelId::Float32ToInt16DitherClip,
];
