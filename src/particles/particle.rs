//! Single particle state and per-step integration.

use rand::Rng;

use crate::math::random::{ball_rand, uniform_float};
use crate::math::{Color, Vector3};

use super::emitter::EmitterConfig;

/// A single transient point particle.
///
/// The motion law is a deliberate visual stylization, not physics: velocity
/// is damped by the square of twice the remaining-life fraction, so
/// particles race outward at birth and coast to a stop as they fade. The
/// fraction is not clamped, which makes dead particles creep again as it
/// grows past -0.5; that overshoot is part of the look.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Stylistic sign multiplier, ±1, resampled at every rebirth.
    charge: f32,
    /// Constant 1.0; stored but not applied by the integration step.
    mass: f32,
    /// Sampled in [0, 0.02); stored but not applied by the integration step.
    drag: f32,
    /// World-space position.
    position: Vector3,
    /// World-space velocity.
    velocity: Vector3,
    /// Seconds between birth and expiry.
    lifespan: f32,
    /// Absolute simulation time at which this particle expires.
    death_time: f32,
    /// Render scale factor in [0.2, 1.0]; consumed by the renderer only.
    scale: f32,
    /// Sprite tint. Alpha is recomputed every step from remaining life.
    color: Color,
    /// Set once simulation time passes `death_time`; never cleared.
    done: bool,
}

impl Particle {
    /// Create a particle at the given position with inert defaults.
    /// `rebirth` gives it its real state.
    pub fn new(position: Vector3) -> Self {
        Self {
            charge: 1.0,
            mass: 1.0,
            drag: 0.0,
            position,
            velocity: Vector3::ZERO,
            lifespan: 1.0,
            death_time: 0.0,
            scale: 1.0,
            color: Color::WHITE,
            done: false,
        }
    }

    /// (Re)initialize the particle's full state from the emitter
    /// configuration, sampling every randomized field.
    ///
    /// `done` is left untouched: the flag is monotonic for the particle's
    /// lifetime and completion tracking belongs to the owning system.
    pub fn rebirth<R: Rng + ?Sized>(
        &mut self,
        now: f32,
        source: Vector3,
        config: &EmitterConfig,
        rng: &mut R,
    ) {
        self.charge = if uniform_float(rng, 0.0, 1.0) < 0.5 { -1.0 } else { 1.0 };
        self.mass = 1.0;
        self.drag = uniform_float(rng, 0.0, 0.02);
        self.position = if config.spawn_radius == 0.0 {
            source
        } else {
            source + ball_rand(rng, config.spawn_radius)
        };
        self.velocity = Vector3::new(
            config.velocity_bias.x
                + uniform_float(rng, -config.velocity_spread.x, config.velocity_spread.x),
            config.velocity_bias.y
                + uniform_float(rng, -config.velocity_spread.y, config.velocity_spread.y),
            config.velocity_bias.z
                + uniform_float(rng, -config.velocity_spread.z, config.velocity_spread.z),
        );
        self.lifespan = config.lifespan_min + uniform_float(rng, 0.0, config.lifespan_spread);
        self.death_time = now + self.lifespan;
        self.scale = uniform_float(rng, 0.2, 1.0);
        self.color = Color::new(
            config.base_color.r + uniform_float(rng, -0.1, 0.1),
            config.base_color.g + uniform_float(rng, -0.1, 0.1),
            config.base_color.b + uniform_float(rng, -0.1, 0.1),
            1.0,
        );
    }

    /// Pin the particle to a position and force it fully opaque,
    /// regardless of lifecycle state. Lifespan and done-state are not
    /// touched; `now` is accepted for signature parity and unused.
    pub fn lock(&mut self, _now: f32, position: Vector3) {
        self.position = position;
        self.color.a = 1.0;
    }

    /// Advance the particle one simulation step.
    ///
    /// Marks the particle done once `now` passes its death time, derives
    /// alpha from the remaining-life fraction without clamping, and moves
    /// the particle by `velocity * step * (alpha * 2)²`. Gravity and the
    /// emitter anchor are accepted but do not enter the trajectory.
    pub fn update(&mut self, now: f32, step_size: f32, _gravity: &Vector3, _anchor: &Vector3) {
        if now > self.death_time {
            self.done = true;
        }
        let alpha = (self.death_time - now) / self.lifespan;
        self.color.a = alpha;
        self.position += self.velocity * (step_size * (alpha * 2.0).powi(2));
    }

    /// World-space position.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// World-space velocity.
    #[inline]
    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    /// Current tint, alpha included.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Render scale factor.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sign multiplier sampled at birth.
    #[inline]
    pub fn charge(&self) -> f32 {
        self.charge
    }

    /// Stored mass (always 1.0).
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Stored drag coefficient.
    #[inline]
    pub fn drag(&self) -> f32 {
        self.drag
    }

    /// Seconds between birth and expiry.
    #[inline]
    pub fn lifespan(&self) -> f32 {
        self.lifespan
    }

    /// Absolute expiry time.
    #[inline]
    pub fn death_time(&self) -> f32 {
        self.death_time
    }

    /// Whether a past update observed this particle beyond its death time.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const STEP: f32 = 0.01;
    const GRAVITY: Vector3 = Vector3::new(0.0, -0.098, 0.0);

    fn reborn(config: &EmitterConfig, seed: u64) -> Particle {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut p = Particle::new(config.source);
        p.rebirth(0.0, config.source, config, &mut rng);
        p
    }

    #[test]
    fn test_rebirth_samples_within_ranges() {
        let config = EmitterConfig {
            source: Vector3::new(1.0, 2.0, 3.0),
            spawn_radius: 0.5,
            velocity_bias: Vector3::new(0.0, 1.0, 0.0),
            velocity_spread: Vector3::splat(2.0),
            lifespan_min: 2.0,
            lifespan_spread: 3.0,
            ..Default::default()
        };

        for seed in 0..50 {
            let p = reborn(&config, seed);
            assert!(p.position().distance_to(&config.source) <= 0.5 + 1e-5);
            assert!((2.0..5.0).contains(&p.lifespan()));
            assert_eq!(p.death_time(), p.lifespan());
            assert!((0.2..=1.0).contains(&p.scale()));
            assert!((0.0..0.02).contains(&p.drag()));
            assert!(p.charge() == 1.0 || p.charge() == -1.0);
            assert_eq!(p.mass(), 1.0);
            assert_eq!(p.color().a, 1.0);
            let v = p.velocity();
            assert!(v.x.abs() <= 2.0 && v.z.abs() <= 2.0);
            assert!((-1.0..=3.0).contains(&v.y));
        }
    }

    #[test]
    fn test_rebirth_zero_radius_spawns_exactly_at_source() {
        let config = EmitterConfig {
            source: Vector3::new(-4.0, 0.5, 9.0),
            spawn_radius: 0.0,
            ..Default::default()
        };
        for seed in 0..20 {
            assert_eq!(reborn(&config, seed).position(), config.source);
        }
    }

    #[test]
    fn test_update_damping_law() {
        let config = EmitterConfig {
            velocity_bias: Vector3::new(1.0, 0.0, 0.0),
            velocity_spread: Vector3::ZERO,
            lifespan_min: 2.0,
            lifespan_spread: 0.0,
            ..Default::default()
        };
        let mut p = reborn(&config, 3);
        assert_eq!(p.velocity(), Vector3::new(1.0, 0.0, 0.0));

        // alpha = 1 at birth: displacement is step * v * (2)^2
        p.update(0.0, STEP, &GRAVITY, &Vector3::ZERO);
        assert!((p.position().x - 0.04).abs() < 1e-6);

        // next step uses the freshly derived alpha
        let alpha = (2.0 - 0.01) / 2.0;
        let expected = 0.04 + STEP * (alpha * 2.0) * (alpha * 2.0);
        p.update(0.01, STEP, &GRAVITY, &Vector3::ZERO);
        assert!((p.position().x - expected).abs() < 1e-6);
        assert!((p.color().a - alpha).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_and_anchor_do_not_affect_trajectory() {
        let config = EmitterConfig {
            velocity_bias: Vector3::new(0.0, 3.0, 0.0),
            velocity_spread: Vector3::ZERO,
            lifespan_min: 1.0,
            lifespan_spread: 0.0,
            ..Default::default()
        };
        let mut a = reborn(&config, 5);
        let mut b = a.clone();

        a.update(0.0, STEP, &GRAVITY, &Vector3::ZERO);
        b.update(0.0, STEP, &Vector3::new(0.0, -999.0, 0.0), &Vector3::splat(42.0));
        assert_eq!(a.position(), b.position());
    }

    #[test]
    fn test_alpha_unclamped_past_death_and_done_monotonic() {
        let config = EmitterConfig {
            velocity_bias: Vector3::new(1.0, 0.0, 0.0),
            velocity_spread: Vector3::ZERO,
            lifespan_min: 2.0,
            lifespan_spread: 0.0,
            ..Default::default()
        };
        let mut p = reborn(&config, 8);

        p.update(3.0, STEP, &GRAVITY, &Vector3::ZERO);
        assert!(p.is_done());
        assert!((p.color().a - (-0.5)).abs() < 1e-6);

        // The damping term grows again as alpha overshoots past death,
        // so later steps displace further than earlier ones.
        let x0 = p.position().x;
        p.update(4.0, STEP, &GRAVITY, &Vector3::ZERO);
        let d1 = p.position().x - x0;
        let x1 = p.position().x;
        p.update(5.0, STEP, &GRAVITY, &Vector3::ZERO);
        let d2 = p.position().x - x1;
        assert!(d2 > d1 && d1 > 0.0);
        assert!(p.is_done());
    }

    #[test]
    fn test_lock_pins_position_and_alpha() {
        let config = EmitterConfig {
            lifespan_min: 1.0,
            lifespan_spread: 0.0,
            ..Default::default()
        };
        let mut p = reborn(&config, 13);
        p.update(5.0, STEP, &GRAVITY, &Vector3::ZERO);
        assert!(p.is_done());
        assert!(p.color().a < 0.0);

        let anchor = Vector3::new(7.0, -1.0, 2.5);
        p.lock(5.0, anchor);
        assert_eq!(p.position(), anchor);
        assert_eq!(p.color().a, 1.0);
        // lock does not resurrect
        assert!(p.is_done());
    }

    #[test]
    fn test_rebirth_does_not_clear_done() {
        let config = EmitterConfig {
            lifespan_min: 1.0,
            lifespan_spread: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(21);
        let mut p = Particle::new(Vector3::ZERO);
        p.rebirth(0.0, Vector3::ZERO, &config, &mut rng);
        p.update(2.0, STEP, &GRAVITY, &Vector3::ZERO);
        assert!(p.is_done());

        p.rebirth(2.0, Vector3::ZERO, &config, &mut rng);
        assert!(p.is_done());
        assert_eq!(p.color().a, 1.0);
    }
}
