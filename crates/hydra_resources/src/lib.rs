//! # Hydra Resources
//!
//! CPU-side resources in the renderer's native shape:
//!
//! - [`geometry`]: flat per-vertex attribute buffers and the index expansion
//! - [`image`] / [`texture`]: decoded pixels and sampled textures
//! - [`material`]: the fixed-schema physical material

pub mod geometry;
pub mod image;
pub mod material;
pub mod texture;

pub use geometry::{Attribute, Expanded, Geometry, expand_by_indices};
pub use image::Image;
pub use material::{ColorProperty, MaterialProperty, PhysicalMaterial, ScalarProperty, Side, TextureSlot};
pub use texture::{ChannelLayout, ColorSpace, Texture, TextureSampler};
