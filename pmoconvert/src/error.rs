//! Erreurs de sélection et d'exécution des conversions PCM.

use crate::format::SampleFormat;
use crate::kernels::KernelId;

/// Rôle d'un buffer dans un appel de conversion (pour les messages d'erreur).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    Source,
    Destination,
}

impl std::fmt::Display for BufferRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferRole::Source => f.write_str("source"),
            BufferRole::Destination => f.write_str("destination"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Masque vide, sentinelle `CUSTOM_FORMAT` ou aucun format disponible
    #[error("sample format not supported (mask 0x{0:08x})")]
    SampleFormatNotSupported(u32),

    /// Paire valide dont le noyau tramé n'existe pas
    #[error("conversion {from} -> {to} has no implementation ({kernel})")]
    NotImplemented {
        kernel: KernelId,
        from: SampleFormat,
        to: SampleFormat,
    },

    #[error("{0} stride must be at least 1")]
    InvalidStride(BufferRole),

    #[error("{role} buffer too small: {needed} bytes needed, {actual} available")]
    BufferTooSmall {
        role: BufferRole,
        needed: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
