//! Emitter configuration for particle systems.

use serde::{Deserialize, Serialize};

use crate::math::{Color, Vector3};

/// Hard cap on the number of particles a single system may own.
/// Requested counts above this are silently clamped.
pub const MAX_PARTICLES: usize = 300;

/// Immutable sampling parameters describing how a batch of particles is
/// born: where, how fast, what color, and for how long.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// World-space emission source.
    pub source: Vector3,
    /// Requested particle count; systems clamp this to [`MAX_PARTICLES`].
    pub count: usize,
    /// Spawn jitter radius. Zero spawns every particle exactly at the
    /// source; positive values sample uniformly inside a ball of this
    /// radius around it.
    pub spawn_radius: f32,
    /// Base velocity given to every particle.
    pub velocity_bias: Vector3,
    /// Per-axis velocity jitter: the final velocity per axis is the bias
    /// plus a uniform sample in `[-spread, spread]`.
    pub velocity_spread: Vector3,
    /// Base sprite tint; each rgb channel is jittered by ±0.1 at birth.
    pub base_color: Color,
    /// Minimum lifespan in seconds.
    pub lifespan_min: f32,
    /// Width of the lifespan range; lifespans sample uniformly from
    /// `[lifespan_min, lifespan_min + lifespan_spread)`.
    pub lifespan_spread: f32,
    /// Point-sprite scale used by the renderer for screen-space sizing.
    pub point_scale: f32,
    /// Index into the caller-owned sprite texture list.
    pub texture_index: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            source: Vector3::ZERO,
            count: 100,
            spawn_radius: 0.0,
            velocity_bias: Vector3::ZERO,
            velocity_spread: Vector3::ONE,
            base_color: Color::rgb(0.5, 0.2, 0.0),
            lifespan_min: 2.0,
            lifespan_spread: 3.0,
            point_scale: 1.0,
            texture_index: 0,
        }
    }
}

impl EmitterConfig {
    /// Large explosion: a full pool of embers scattered from a small shell.
    pub fn explosion(source: Vector3, spawn_radius: f32) -> Self {
        Self {
            source,
            count: 300,
            spawn_radius,
            velocity_spread: Vector3::splat(2.0),
            ..Default::default()
        }
    }

    /// Smaller debris puff.
    pub fn burst(source: Vector3, spawn_radius: f32) -> Self {
        Self {
            source,
            count: 100,
            spawn_radius,
            velocity_spread: Vector3::splat(1.0),
            ..Default::default()
        }
    }

    /// Single stationary glow sprite with an effectively infinite lifespan.
    pub fn glow(source: Vector3, point_scale: f32) -> Self {
        Self {
            source,
            count: 1,
            velocity_spread: Vector3::ZERO,
            base_color: Color::rgb(1.0, 0.7, 0.0),
            lifespan_min: 100_000.0,
            lifespan_spread: 0.0,
            point_scale,
            ..Default::default()
        }
    }

    /// Single beam anchor sprite, meant to be re-positioned every frame
    /// through `ParticleSystem::lock`.
    pub fn beam(source: Vector3) -> Self {
        Self {
            source,
            count: 1,
            velocity_spread: Vector3::ZERO,
            base_color: Color::rgb(0.5, 1.0, 0.0),
            lifespan_min: 1.0,
            lifespan_spread: 0.0,
            point_scale: 15.0,
            texture_index: 1,
            ..Default::default()
        }
    }
}
