//! # Texture Module
//!
//! Sprite textures and samplers for particle rendering. Textures are owned
//! by the caller; a particle system only stores an index selecting which
//! of the caller's textures to bind for its draw.

mod sampler;
mod texture2d;

pub use sampler::{AddressMode, FilterMode, Sampler, SamplerDescriptor};
pub use texture2d::{Texture2D, TextureError};
