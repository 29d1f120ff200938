//! # Core Module
//!
//! wgpu context acquisition and object identity. The particle engine does
//! not own a window or swapchain; the context here is headless and the
//! host renderer is free to supply its own device and queue instead.

mod context;
mod id;

pub use context::{Context, ContextError};
pub use id::Id;
