//! Négociation du format le plus proche parmi ceux d'un périphérique.

use crate::error::{ConvertError, Result};
use crate::format::{SampleFormat, SampleFormatMask};

/// Choisit, parmi `available`, le format le plus proche de `requested`.
///
/// Le bit non-entrelacé est ignoré des deux côtés. Si le format demandé est
/// disponible il est retourné ; sinon on cherche d'abord une qualité
/// supérieure (du plus proche au meilleur), puis une qualité inférieure. On
/// préfère ne jamais perdre de précision plutôt que de respecter exactement
/// la demande.
///
/// # Errors
///
/// [`ConvertError::SampleFormatNotSupported`] si `requested` ne désigne pas
/// exactement un format connu, ou si aucun format connu n'est disponible.
pub fn select_closest_available_format(
    available: SampleFormatMask,
    requested: SampleFormatMask,
) -> Result<SampleFormat> {
    let requested = SampleFormat::try_from(requested)?;
    closest_format(available, requested)
}

/// Variante typée de [`select_closest_available_format`].
pub fn closest_format(available: SampleFormatMask, requested: SampleFormat) -> Result<SampleFormat> {
    let available = available.without_non_interleaved();
    if available.contains(requested) {
        return Ok(requested);
    }

    let rank = requested.index();
    let better = SampleFormat::ALL[..rank].iter().rev();
    let worse = SampleFormat::ALL[rank + 1..].iter();
    better
        .chain(worse)
        .copied()
        .find(|format| available.contains(*format))
        .ok_or(ConvertError::SampleFormatNotSupported(available.bits()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use SampleFormat::*;

    fn mask(formats: &[SampleFormat]) -> SampleFormatMask {
        formats.iter().copied().collect()
    }

    #[test]
    fn test_exact_match() {
        let available = mask(&[Int16, Int32]) | SampleFormatMask::NON_INTERLEAVED;
        assert_eq!(closest_format(available, Int16), Ok(Int16));
        assert_eq!(
            select_closest_available_format(
                available,
                SampleFormatMask::INT32 | SampleFormatMask::NON_INTERLEAVED
            ),
            Ok(Int32)
        );
    }

    #[test]
    fn test_prefers_nearest_better() {
        let available = mask(&[Float32, Int24, Int8]);
        assert_eq!(closest_format(available, Int16), Ok(Int24));
        assert_eq!(closest_format(available, Int32), Ok(Float32));
    }

    #[test]
    fn test_falls_back_to_worse() {
        let available = mask(&[Int16, UInt8]);
        assert_eq!(closest_format(available, Float32), Ok(Int16));
        assert_eq!(closest_format(mask(&[UInt8]), Int24), Ok(UInt8));
    }

    #[test]
    fn test_every_mask_gives_nearest_format() {
        for bits in 0..64u32 {
            let available = SampleFormatMask::from_bits(bits);
            let formats: Vec<SampleFormat> = available.formats().collect();
            for requested in SampleFormat::ALL {
                let result = closest_format(available, requested);
                assert_eq!(
                    closest_format(available | SampleFormatMask::NON_INTERLEAVED, requested),
                    result
                );
                if formats.is_empty() {
                    assert_eq!(result, Err(ConvertError::SampleFormatNotSupported(bits)));
                    continue;
                }

                let expected = if available.contains(requested) {
                    requested
                } else if let Some(better) = formats.iter().filter(|f| **f < requested).max() {
                    *better
                } else {
                    formats.iter().copied().filter(|f| *f > requested).min().unwrap()
                };
                let chosen = result.unwrap();
                assert!(available.contains(chosen), "{bits:#x} {requested}");
                assert_eq!(chosen, expected, "{bits:#x} {requested}");
            }
        }
    }

    #[test]
    fn test_nothing_available() {
        assert_eq!(
            closest_format(SampleFormatMask::NON_INTERLEAVED, Int16),
            Err(ConvertError::SampleFormatNotSupported(0))
        );
        assert!(select_closest_available_format(mask(&[Int16]), SampleFormatMask::CUSTOM_FORMAT).is_err());
    }
}
