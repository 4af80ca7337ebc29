//! Session de conversion : politique d'accélération et drapeaux résolus une
//! fois à partir d'une [`ConvertConfig`].

use tracing::warn;

use crate::accel::Acceleration;
use crate::config::ConvertConfig;
use crate::dither::DitherState;
use crate::error::{ConvertError, Result};
use crate::format::{ConversionFlags, SampleFormat};
use crate::selector::{select_converter, Converter};
use crate::zeroer::{select_zeroer, Zeroer};

/// Valeur immuable partageable entre threads ; chaque flux garde son propre
/// [`DitherState`] obtenu par [`new_dither_state`](Self::new_dither_state).
#[derive(Debug, Clone, Copy)]
pub struct ConversionSession {
    acceleration: Acceleration,
    flags: ConversionFlags,
    fallback_to_undithered: bool,
}

impl Default for ConversionSession {
    fn default() -> Self {
        Self::new(&ConvertConfig::default())
    }
}

impl ConversionSession {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            acceleration: config.acceleration(),
            flags: config.flags(),
            fallback_to_undithered: config.fallback_to_undithered,
        }
    }

    /// Session explicite, sans passer par la configuration.
    pub fn with_acceleration(acceleration: Acceleration, flags: ConversionFlags) -> Self {
        Self {
            acceleration,
            flags,
            fallback_to_undithered: false,
        }
    }

    pub fn acceleration(&self) -> Acceleration {
        self.acceleration
    }

    pub fn flags(&self) -> ConversionFlags {
        self.flags
    }

    /// Convertisseur `source -> destination` avec les drapeaux de la session.
    pub fn select_converter(&self, source: SampleFormat, destination: SampleFormat) -> Result<Converter> {
        self.select_converter_with_flags(source, destination, self.flags)
    }

    /// Comme [`select_converter`](Self::select_converter) avec des drapeaux
    /// propres à l'appel.
    ///
    /// Si la session l'autorise, une variante tramée inexistante est
    /// remplacée par la variante non tramée.
    pub fn select_converter_with_flags(
        &self,
        source: SampleFormat,
        destination: SampleFormat,
        flags: ConversionFlags,
    ) -> Result<Converter> {
        match select_converter(source, destination, flags, self.acceleration) {
            Err(ConvertError::NotImplemented { kernel, .. }) if self.fallback_to_undithered => {
                warn!(%kernel, %source, %destination, "Dithered conversion not implemented, falling back to undithered");
                select_converter(source, destination, flags.with_dither(false), self.acceleration)
            }
            other => other,
        }
    }

    pub fn select_zeroer(&self, format: SampleFormat) -> Zeroer {
        select_zeroer(format)
    }

    pub fn new_dither_state(&self) -> DitherState {
        DitherState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::AccelerationPolicy;
    use crate::kernels::KernelId;

    #[test]
    fn test_fallback_to_undithered() {
        let strict = ConversionSession::new(&ConvertConfig {
            acceleration: AccelerationPolicy::Scalar,
            ..ConvertConfig::default()
        });
        assert!(matches!(
            strict.select_converter(SampleFormat::Int32, SampleFormat::Int24),
            Err(ConvertError::NotImplemented { .. })
        ));

        let lenient = ConversionSession::new(&ConvertConfig {
            acceleration: AccelerationPolicy::Scalar,
            fallback_to_undithered: true,
            ..ConvertConfig::default()
        });
        let converter = lenient
            .select_converter(SampleFormat::Int32, SampleFormat::Int24)
            .unwrap();
        assert_eq!(converter.kernel(), KernelId::Int32ToInt24);
    }

    #[test]
    fn test_session_flags() {
        let session = ConversionSession::new(&ConvertConfig {
            dither: false,
            ..ConvertConfig::default()
        });
        let converter = session
            .select_converter(SampleFormat::Float32, SampleFormat::Int16)
            .unwrap();
        assert_eq!(converter.kernel(), KernelId::Float32ToInt16Clip);
    }
}
