//! CPU-simulated, GPU-instanced point-sprite particle systems.
//!
//! Each [`ParticleSystem`] owns a fixed pool of particles simulated on the
//! CPU with a fixed time step, depth-sorted back-to-front against the
//! current camera every frame, and mirrored into instance-stepped vertex
//! buffers for a single instanced draw call.
//!
//! ```text
//! setCamera ──▶ update ──▶ draw
//!               │
//!               ├─ integrate every particle, collect expired ones
//!               ├─ sort pool by camera-space depth
//!               ├─ repack flat position/color arrays
//!               └─ re-upload both GPU buffers in full
//! ```

mod emitter;
mod gpu_resources;
mod particle;
mod particle_system;
mod pipeline;
mod sorter;

pub use emitter::{EmitterConfig, MAX_PARTICLES};
pub use gpu_resources::{ParticleGpuResources, SpriteParams};
pub use particle::Particle;
pub use particle_system::ParticleSystem;
pub use pipeline::{FrameUniform, ParticlePipeline};
pub use sorter::DepthSorter;
