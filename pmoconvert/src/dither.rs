//! Générateur de dither triangulaire filtré passe-haut.
//!
//! Chaque valeur est la somme de deux suites pseudo-aléatoires uniformes
//! indépendantes, moins la somme précédente (filtre à un pôle). Le bruit
//! obtenu a une densité triangulaire et son énergie est repoussée vers les
//! hautes fréquences.
//!
//! La forme par lots ([`DitherState::generate_i16_lanes`] et dérivées)
//! produit exactement la même suite que [`LANES`] appels scalaires
//! consécutifs : les graines de chaque voie sont obtenues par saut en avant
//! dans la récurrence linéaire congruentielle.

/// Largeur d'un lot (voies traitées ensemble par le chemin vectoriel).
pub const LANES: usize = 4;

const LCG_MUL: u32 = 196_314_165;
const LCG_ADD: u32 = 907_633_515;

const DITHER_BITS: u32 = 15;
/// `32 - 15 + 1`
pub const DITHER_SHIFT: u32 = i32::BITS - DITHER_BITS + 1;

/// Multiplier une valeur entière de dither par ce facteur la ramène vers ±2 LSB flottants.
pub const FLOAT_DITHER_SCALE: f32 = 1.0 / ((1 << DITHER_BITS) - 1) as f32;
/// Variante pour un intermédiaire 32 bits destiné à Int24 (un LSB = 256).
pub const FLOAT_DITHER_SCALE_24: f32 = FLOAT_DITHER_SCALE * 256.0;

const INITIAL_SEED1: u32 = 22_222;
const INITIAL_SEED2: u32 = 5_555_555;

/// Coefficients `(a^k, c_k)` pour avancer une graine de `k = 1..=LANES` pas.
const fn jump_table() -> ([u32; LANES], [u32; LANES]) {
    let mut mul = [0u32; LANES];
    let mut add = [0u32; LANES];
    let mut m = 1u32;
    let mut c = 0u32;
    let mut k = 0;
    while k < LANES {
        m = m.wrapping_mul(LCG_MUL);
        c = c.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
        mul[k] = m;
        add[k] = c;
        k += 1;
    }
    (mul, add)
}

const JUMP: ([u32; LANES], [u32; LANES]) = jump_table();

#[inline(always)]
const fn advance(seed: u32) -> u32 {
    seed.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD)
}

#[inline(always)]
const fn jump(seed: u32, lane: usize) -> u32 {
    seed.wrapping_mul(JUMP.0[lane]).wrapping_add(JUMP.1[lane])
}

#[inline(always)]
const fn triangular(seed1: u32, seed2: u32) -> i32 {
    ((seed1 as i32) >> DITHER_SHIFT) + ((seed2 as i32) >> DITHER_SHIFT)
}

/// État de dither d'un flux de conversion.
///
/// Un état appartient à un seul flux : chaque appel de noyau le modifie
/// (`&mut`), il ne peut donc pas être partagé entre deux conversions
/// simultanées.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DitherState {
    previous: i32,
    seed1: u32,
    seed2: u32,
}

impl Default for DitherState {
    fn default() -> Self {
        Self::new()
    }
}

impl DitherState {
    pub const fn new() -> Self {
        Self {
            previous: 0,
            seed1: INITIAL_SEED1,
            seed2: INITIAL_SEED2,
        }
    }

    /// Remet l'état dans sa configuration initiale.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Dither entier dans [-32768, 32767], à ajouter à un échantillon 32 bits
    /// décalé d'un bit à droite avant un décalage de 15 :
    /// `((x >> 1) + d) >> 15`.
    #[inline(always)]
    pub fn generate_i16(&mut self) -> i32 {
        self.seed1 = advance(self.seed1);
        self.seed2 = advance(self.seed2);
        let current = triangular(self.seed1, self.seed2);
        let high_pass = current - self.previous;
        self.previous = current;
        high_pass
    }

    /// Dither flottant dans ]-2.0, +2.0[, à ajouter à un échantillon déjà
    /// mis à l'échelle de la destination.
    #[inline(always)]
    pub fn generate_f32(&mut self) -> f32 {
        self.generate_i16() as f32 * FLOAT_DITHER_SCALE
    }

    /// Dither flottant pour un intermédiaire 32 bits compacté ensuite en Int24.
    #[inline(always)]
    pub fn generate_f32_24(&mut self) -> f32 {
        self.generate_i16() as f32 * FLOAT_DITHER_SCALE_24
    }

    /// Lot de [`LANES`] valeurs, identique à autant d'appels à
    /// [`generate_i16`](Self::generate_i16).
    #[inline]
    pub fn generate_i16_lanes(&mut self) -> [i32; LANES] {
        let mut current = [0i32; LANES];
        for (lane, value) in current.iter_mut().enumerate() {
            *value = triangular(jump(self.seed1, lane), jump(self.seed2, lane));
        }
        self.seed1 = jump(self.seed1, LANES - 1);
        self.seed2 = jump(self.seed2, LANES - 1);

        // Le retard du filtre passe-haut est un décalage d'une voie ; la
        // dernière voie est reportée sur le lot suivant.
        let mut out = [0i32; LANES];
        out[0] = current[0] - self.previous;
        for lane in 1..LANES {
            out[lane] = current[lane] - current[lane - 1];
        }
        self.previous = current[LANES - 1];
        out
    }

    #[inline]
    pub fn generate_f32_lanes(&mut self) -> [f32; LANES] {
        self.generate_i16_lanes().map(|d| d as f32 * FLOAT_DITHER_SCALE)
    }

    #[inline]
    pub fn generate_f32_24_lanes(&mut self) -> [f32; LANES] {
        self.generate_i16_lanes().map(|d| d as f32 * FLOAT_DITHER_SCALE_24)
    }

    /// Remplit `out` de dither flottant : par lots tant que possible, puis
    /// en scalaire pour le reste.
    pub fn fill_f32(&mut self, out: &mut [f32]) {
        let mut chunks = out.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.generate_f32_lanes());
        }
        for value in chunks.into_remainder() {
            *value = self.generate_f32();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = DitherState::new();
        assert_eq!(state.seed1, 22_222);
        assert_eq!(state.seed2, 5_555_555);
        assert_eq!(state.previous, 0);
        assert_eq!(DITHER_SHIFT, 18);
    }

    #[test]
    fn test_first_value_matches_recurrence() {
        let mut state = DitherState::new();
        let s1 = 22_222u32.wrapping_mul(196_314_165).wrapping_add(907_633_515);
        let s2 = 5_555_555u32.wrapping_mul(196_314_165).wrapping_add(907_633_515);
        let expected = ((s1 as i32) >> 18) + ((s2 as i32) >> 18);
        assert_eq!(state.generate_i16(), expected);
        assert_eq!(state.previous, expected);
    }

    #[test]
    fn test_jump_table() {
        let mut seed = 12_345u32;
        for lane in 0..LANES {
            seed = advance(seed);
            assert_eq!(jump(12_345, lane), seed);
        }
    }

    #[test]
    fn test_lanes_match_scalar() {
        let mut batched = DitherState::new();
        let mut scalar = DitherState::new();
        for _ in 0..1000 {
            let lanes = batched.generate_i16_lanes();
            let expected: [i32; LANES] = std::array::from_fn(|_| scalar.generate_i16());
            assert_eq!(lanes, expected);
            assert_eq!(batched, scalar);
        }
    }

    #[test]
    fn test_mixed_scalar_and_lanes() {
        let mut mixed = DitherState::new();
        let mut scalar = DitherState::new();
        let _ = mixed.generate_f32();
        let _ = scalar.generate_f32();
        let lanes = mixed.generate_f32_24_lanes();
        for value in lanes {
            assert_eq!(value, scalar.generate_f32_24());
        }
    }

    #[test]
    fn test_fill_f32_matches_scalar() {
        let mut batched = DitherState::new();
        let mut scalar = DitherState::new();
        let mut out = [0.0f32; 11];
        batched.fill_f32(&mut out);
        for value in out {
            assert_eq!(value, scalar.generate_f32());
        }
    }

    #[test]
    fn test_reset() {
        let mut state = DitherState::new();
        let first = state.generate_i16();
        state.generate_i16();
        state.reset();
        assert_eq!(state.generate_i16(), first);
    }
}
