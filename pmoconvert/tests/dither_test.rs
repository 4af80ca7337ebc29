//! Propriétés statistiques du générateur de dither.

use pmoconvert::DitherState;

const DRAWS: usize = 100_000;

#[test]
fn test_float_dither_is_bounded_and_centered() {
    let mut state = DitherState::new();
    let mut sum = 0.0f64;
    for _ in 0..DRAWS {
        let d = state.generate_f32();
        assert!(d > -2.0 && d < 2.0, "{d}");
        sum += d as f64;
    }
    let mean = sum / DRAWS as f64;
    assert!(mean.abs() < 1e-3, "mean = {mean}");
}

#[test]
fn test_integer_dither_fits_sixteen_bits() {
    let mut state = DitherState::new();
    let mut min = i32::MAX;
    let mut max = i32::MIN;
    for _ in 0..DRAWS {
        let d = state.generate_i16();
        min = min.min(d);
        max = max.max(d);
    }
    assert!(min >= i16::MIN as i32 && max <= i16::MAX as i32);
    // La suite n'est pas dégénérée
    assert!(min < -10_000 && max > 10_000, "[{min}, {max}]");
}

#[test]
fn test_dither_is_triangular() {
    // Densité triangulaire : plus de tirages près de zéro qu'aux extrêmes.
    let mut state = DitherState::new();
    let mut center = 0usize;
    let mut edges = 0usize;
    for _ in 0..DRAWS {
        let d = state.generate_f32().abs();
        if d < 0.25 {
            center += 1;
        } else if d > 0.75 {
            edges += 1;
        }
    }
    assert!(center > edges, "center={center} edges={edges}");
}

#[test]
fn test_sequence_is_deterministic() {
    let mut a = DitherState::new();
    let mut b = DitherState::default();
    let first: Vec<i32> = (0..1000).map(|_| a.generate_i16()).collect();
    let second: Vec<i32> = (0..1000).map(|_| b.generate_i16()).collect();
    assert_eq!(first, second);

    a.reset();
    assert_eq!(a, DitherState::new());
    assert_eq!(a.generate_i16(), first[0]);
}

#[test]
fn test_fill_matches_scalar_sequence() {
    let mut batched = DitherState::new();
    let mut scalar = DitherState::new();
    let mut out = vec![0.0f32; 1027];
    batched.fill_f32(&mut out);
    for (i, value) in out.iter().enumerate() {
        assert_eq!(*value, scalar.generate_f32(), "index {i}");
    }
    assert_eq!(batched, scalar);
}
