//! Échantillon 24 bits compacté sur 3 octets.
//!
//! L'ordre des octets suit l'endianness de la cible de compilation ; il est
//! fixé pour toute la durée de vie du binaire et correspond au format
//! échangé avec les backends audio.

use std::fmt;

/// Échantillon audio 24-bit signé, stocké dans un i32 étendu en signe
///
/// Plage valide : [-8_388_608, 8_388_607] (±2^23)
///
/// # Exemples
///
/// ```
/// use pmoconvert::I24;
///
/// let sample = I24::new(0x123456).unwrap();
/// assert_eq!(I24::from_bytes(sample.to_bytes()), sample);
///
/// // Hors plage : erreur
/// assert!(I24::new(10_000_000).is_none());
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct I24(i32);

impl I24 {
    /// Valeur minimale : -2^23
    pub const MIN_VALUE: i32 = -8_388_608;

    /// Valeur maximale : 2^23 - 1
    pub const MAX_VALUE: i32 = 8_388_607;

    pub const ZERO: I24 = I24(0);
    pub const MIN: I24 = I24(Self::MIN_VALUE);
    pub const MAX: I24 = I24(Self::MAX_VALUE);

    /// Crée un I24 depuis un i32, en vérifiant la plage valide
    #[inline]
    pub const fn new(value: i32) -> Option<Self> {
        if value >= Self::MIN_VALUE && value <= Self::MAX_VALUE {
            Some(I24(value))
        } else {
            None
        }
    }

    /// Crée un I24 depuis un i32, en clampant à la plage valide
    #[inline]
    pub const fn new_clamped(value: i32) -> Self {
        let clamped = if value < Self::MIN_VALUE {
            Self::MIN_VALUE
        } else if value > Self::MAX_VALUE {
            Self::MAX_VALUE
        } else {
            value
        };
        I24(clamped)
    }

    /// Garde les 24 bits de poids fort d'un entier 32 bits justifié à gauche.
    ///
    /// L'octet de poids faible est perdu : c'est la règle de tout passage
    /// vers Int24 depuis un intermédiaire 32 bits.
    #[inline(always)]
    pub const fn from_msb_i32(value: i32) -> Self {
        I24(value >> 8)
    }

    /// Valeur justifiée à gauche sur 32 bits (octet de poids faible à zéro).
    #[inline(always)]
    pub const fn to_msb_i32(self) -> i32 {
        self.0 << 8
    }

    /// Retourne la valeur i32 interne
    #[inline(always)]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Reconstitue l'échantillon à partir de ses 3 octets, avec extension de signe.
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        #[cfg(target_endian = "little")]
        let word = ((bytes[0] as u32) << 8) | ((bytes[1] as u32) << 16) | ((bytes[2] as u32) << 24);
        #[cfg(target_endian = "big")]
        let word = ((bytes[2] as u32) << 8) | ((bytes[1] as u32) << 16) | ((bytes[0] as u32) << 24);
        I24((word as i32) >> 8)
    }

    /// Compacte l'échantillon sur 3 octets.
    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; 3] {
        let word = self.0 as u32;
        #[cfg(target_endian = "little")]
        let bytes = [word as u8, (word >> 8) as u8, (word >> 16) as u8];
        #[cfg(target_endian = "big")]
        let bytes = [(word >> 16) as u8, (word >> 8) as u8, word as u8];
        bytes
    }
}

impl fmt::Debug for I24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I24({})", self.0)
    }
}

impl fmt::Display for I24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<I24> for i32 {
    #[inline]
    fn from(i24: I24) -> i32 {
        i24.0
    }
}

impl TryFrom<i32> for I24 {
    type Error = &'static str;

    #[inline]
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        I24::new(value).ok_or("i32 value out of I24 range")
    }
}
