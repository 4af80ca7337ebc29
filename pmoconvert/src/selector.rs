//! Sélection du noyau de conversion.
//!
//! Une table `(source, destination)` donne une [`Route`] ; le sous-choix
//! dither/clip se résout ensuite dans la route. La recherche est en temps
//! constant et sans effet de bord.

use tracing::debug;

use crate::accel::{Acceleration, KernelStrategy};
use crate::buffer::check_buffer;
use crate::dither::DitherState;
use crate::error::{BufferRole, ConvertError, Result};
use crate::format::{ConversionFlags, SampleFormat, SampleFormatMask};
use crate::kernels::{ConverterFn, KernelId};

#[derive(Debug, Clone, Copy)]
enum Route {
    /// Même format : copie brute, indépendamment des drapeaux
    Unity(KernelId),
    /// Élargissement ou conversion sans variante
    Single(KernelId),
    Dither {
        plain: KernelId,
        dither: KernelId,
    },
    DitherClip {
        plain: KernelId,
        dither: KernelId,
        clip: KernelId,
        dither_clip: KernelId,
    },
}

impl Route {
    #[inline]
    const fn resolve(self, flags: ConversionFlags) -> KernelId {
        match self {
            Route::Unity(kernel) | Route::Single(kernel) => kernel,
            Route::Dither { plain, dither } => {
                if flags.dither() {
                    dither
                } else {
                    plain
                }
            }
            Route::DitherClip {
                plain,
                dither,
                clip,
                dither_clip,
            } => match (flags.dither(), flags.clip()) {
                (false, false) => plain,
                (true, false) => dither,
                (false, true) => clip,
                (true, true) => dither_clip,
            },
        }
    }
}

use KernelId as K;

const fn from_float(plain: K, dither: K, clip: K, dither_clip: K) -> Route {
    Route::DitherClip {
        plain,
        dither,
        clip,
        dither_clip,
    }
}

const fn dithered(plain: K, dither: K) -> Route {
    Route::Dither { plain, dither }
}

/// Indexée par `[source.index()][destination.index()]`.
const ROUTES: [[Route; 6]; 6] = [
    // Float32 ->
    [
        Route::Unity(K::Copy32),
        from_float(
            K::Float32ToInt32,
            K::Float32ToInt32Dither,
            K::Float32ToInt32Clip,
            K::Float32ToInt32DitherClip,
        ),
        from_float(
            K::Float32ToInt24,
            K::Float32ToInt24Dither,
            K::Float32ToInt24Clip,
            K::Float32ToInt24DitherClip,
        ),
        from_float(
            K::Float32ToInt16,
            K::Float32ToInt16Dither,
            K::Float32ToInt16Clip,
            K::Float32ToInt16DitherClip,
        ),
        from_float(
            K::Float32ToInt8,
            K::Float32ToInt8Dither,
            K::Float32ToInt8Clip,
            K::Float32ToInt8DitherClip,
        ),
        from_float(
            K::Float32ToUInt8,
            K::Float32ToUInt8Dither,
            K::Float32ToUInt8Clip,
            K::Float32ToUInt8DitherClip,
        ),
    ],
    // Int32 ->
    [
        Route::Single(K::Int32ToFloat32),
        Route::Unity(K::Copy32),
        dithered(K::Int32ToInt24, K::Int32ToInt24Dither),
        dithered(K::Int32ToInt16, K::Int32ToInt16Dither),
        dithered(K::Int32ToInt8, K::Int32ToInt8Dither),
        dithered(K::Int32ToUInt8, K::Int32ToUInt8Dither),
    ],
    // Int24 ->
    [
        Route::Single(K::Int24ToFloat32),
        Route::Single(K::Int24ToInt32),
        Route::Unity(K::Copy24),
        dithered(K::Int24ToInt16, K::Int24ToInt16Dither),
        dithered(K::Int24ToInt8, K::Int24ToInt8Dither),
        dithered(K::Int24ToUInt8, K::Int24ToUInt8Dither),
    ],
    // Int16 ->
    [
        Route::Single(K::Int16ToFloat32),
        Route::Single(K::Int16ToInt32),
        Route::Single(K::Int16ToInt24),
        Route::Unity(K::Copy16),
        dithered(K::Int16ToInt8, K::Int16ToInt8Dither),
        dithered(K::Int16ToUInt8, K::Int16ToUInt8Dither),
    ],
    // Int8 ->
    [
        Route::Single(K::Int8ToFloat32),
        Route::Single(K::Int8ToInt32),
        Route::Single(K::Int8ToInt24),
        Route::Single(K::Int8ToInt16),
        Route::Unity(K::Copy8),
        Route::Single(K::Int8ToUInt8),
    ],
    // UInt8 ->
    [
        Route::Single(K::UInt8ToFloat32),
        Route::Single(K::UInt8ToInt32),
        Route::Single(K::UInt8ToInt24),
        Route::Single(K::UInt8ToInt16),
        Route::Single(K::UInt8ToInt8),
        Route::Unity(K::Copy8),
    ],
];

/// Noyau désigné par la table pour une paire et des drapeaux.
///
/// Le noyau peut ne pas être implémenté ; voir [`KernelId::is_implemented`].
pub fn kernel_for(source: SampleFormat, destination: SampleFormat, flags: ConversionFlags) -> KernelId {
    ROUTES[source.index()][destination.index()].resolve(flags)
}

/// Convertisseur prêt à l'emploi pour une paire de formats.
#[derive(Clone, Copy)]
pub struct Converter {
    kernel: KernelId,
    source: SampleFormat,
    destination: SampleFormat,
    strategy: KernelStrategy,
    function: ConverterFn,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("kernel", &self.kernel)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl Converter {
    pub fn kernel(&self) -> KernelId {
        self.kernel
    }

    pub fn source(&self) -> SampleFormat {
        self.source
    }

    pub fn destination(&self) -> SampleFormat {
        self.destination
    }

    pub fn strategy(&self) -> KernelStrategy {
        self.strategy
    }

    /// Fonction brute du noyau, sans validation des buffers.
    pub fn function(&self) -> ConverterFn {
        self.function
    }

    /// Convertit `count` échantillons de `src` (pas `src_stride`) vers `dst`
    /// (pas `dst_stride`). Les pas sont en éléments ; `count == 0` ne fait rien.
    pub fn convert(
        &self,
        dst: &mut [u8],
        dst_stride: usize,
        src: &[u8],
        src_stride: usize,
        count: usize,
        dither: &mut DitherState,
    ) -> Result<()> {
        check_buffer(BufferRole::Destination, dst.len(), self.destination, dst_stride, count)?;
        check_buffer(BufferRole::Source, src.len(), self.source, src_stride, count)?;
        if count > 0 {
            (self.function)(dst, dst_stride, src, src_stride, count, dither);
        }
        Ok(())
    }
}

/// Choisit le convertisseur `source -> destination` pour ces drapeaux.
///
/// Les paires identiques donnent toujours une copie brute. Une variante
/// tramée inexistante donne [`ConvertError::NotImplemented`].
pub fn select_converter(
    source: SampleFormat,
    destination: SampleFormat,
    flags: ConversionFlags,
    acceleration: Acceleration,
) -> Result<Converter> {
    let kernel = kernel_for(source, destination, flags);
    let scalar = kernel.scalar_fn().ok_or(ConvertError::NotImplemented {
        kernel,
        from: source,
        to: destination,
    })?;
    let (function, strategy) = acceleration.resolve(kernel, scalar);

    debug!(
        %source,
        %destination,
        flags = flags.bits(),
        %kernel,
        %strategy,
        "Selected converter"
    );

    Ok(Converter {
        kernel,
        source,
        destination,
        strategy,
        function,
    })
}

/// Variante sur masques bruts, tels qu'échangés avec les backends audio.
///
/// Chaque masque doit porter exactement un format connu (le bit
/// non-entrelacé est ignoré) ; `CUSTOM_FORMAT` donne
/// [`ConvertError::SampleFormatNotSupported`].
pub fn select_converter_for_masks(
    source: SampleFormatMask,
    destination: SampleFormatMask,
    flags: ConversionFlags,
    acceleration: Acceleration,
) -> Result<Converter> {
    let source = SampleFormat::try_from(source)?;
    let destination = SampleFormat::try_from(destination)?;
    select_converter(source, destination, flags, acceleration)
}
