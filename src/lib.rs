//! # Ember - Instanced Point-Sprite Particle Engine
//!
//! Ember simulates bounded pools of transient particles on the CPU and
//! renders them with single instanced draw calls through wgpu. Particles
//! are integrated with a fixed time step, depth-sorted back-to-front
//! against the current camera for correct alpha blending, and mirrored
//! into GPU vertex buffers rewritten in full every frame.
//!
//! ## Features
//!
//! - **Math**: self-contained vectors, matrices, quaternions, and RGBA
//!   color with `glam` interop
//! - **Particles**: fixed-capacity pools, randomized emission, camera
//!   depth sorting, instanced point-sprite rendering
//! - **Core**: headless wgpu context acquisition and object identity
//! - **Texture**: sprite/alpha-mask textures and samplers
//!
//! ## Example
//!
//! ```ignore
//! use ember::prelude::*;
//!
//! let context = Context::new().await?;
//! let pipeline = ParticlePipeline::new(&context.device, surface_format, Some(depth_format));
//! let sprite_texture = Texture2D::radial_falloff(&context.device, &context.queue, 64);
//! let sampler = Sampler::linear(&context.device);
//! let sprite = pipeline.create_sprite_bind_group(&context.device, &sprite_texture, &sampler);
//!
//! let mut system = ParticleSystem::new(EmitterConfig::explosion(Vector3::ZERO, 0.5));
//! system.init_gpu(&context.device, &pipeline);
//!
//! // per frame
//! system.set_camera(view);
//! system.update(&context.queue);
//! system.draw(&mut render_pass, &pipeline, &sprite);
//! if system.is_done() {
//!     // drop the system
//! }
//! ```

#![warn(missing_docs)]

pub mod core;
pub mod math;
pub mod particles;
pub mod texture;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::core::*;
    pub use crate::math::*;
    pub use crate::particles::*;
    pub use crate::texture::*;
}

/// Engine version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const NAME: &str = "Ember";
