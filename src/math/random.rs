//! Uniform random sampling for particle emission.

use rand::Rng;

use super::Vector3;

/// Sample a uniform float in `[low, high]`.
#[inline]
pub fn uniform_float<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    let r: f32 = rng.gen();
    (1.0 - r) * low + r * high
}

/// Sample a point uniformly distributed inside a ball of the given radius,
/// centered at the origin.
pub fn ball_rand<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vector3 {
    // Rejection-sample the unit ball, then scale to the requested radius.
    loop {
        let v = Vector3::new(
            uniform_float(rng, -1.0, 1.0),
            uniform_float(rng, -1.0, 1.0),
            uniform_float(rng, -1.0, 1.0),
        );
        if v.length_squared() <= 1.0 {
            return v * radius;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_float_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = uniform_float(&mut rng, -3.0, 5.0);
            assert!((-3.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn test_uniform_float_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(uniform_float(&mut rng, 2.5, 2.5), 2.5);
    }

    #[test]
    fn test_ball_rand_within_radius() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let v = ball_rand(&mut rng, 4.0);
            assert!(v.length() <= 4.0 + 1e-5);
        }
    }

    #[test]
    fn test_seeded_determinism() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            assert_eq!(uniform_float(&mut a, 0.0, 1.0), uniform_float(&mut b, 0.0, 1.0));
        }
    }
}
