//! # Hydra Delegate
//!
//! The scene-delegate side of the synchronization layer:
//!
//! - [`mesh`]: streams indexed primvar data into flat vertex buffers
//! - [`graph`]: the material node/relationship arena
//! - [`material`]: resolves a shading graph into a [`PhysicalMaterial`](hydra_resources::PhysicalMaterial)
//! - [`binding`]: applying asynchronously loaded textures to material slots
//! - [`delegate`]: the [`RenderDelegate`] session that owns all of the above

pub mod binding;
pub mod delegate;
pub mod graph;
pub mod material;
pub mod mesh;

pub use binding::{BindAction, TextureBindCompletion, TextureBindRequest};
pub use delegate::{MATERIAL_TYPE_ID, RenderDelegate};
pub use graph::{MaterialGraph, NodeHandle, ParamValue, ParameterBag, Relationship, RelationshipHandle};
pub use material::{HydraMaterial, PROPERTIES, Resolution, TEXTURE_SLOTS};
pub use mesh::{DisplayColor, HydraMesh, Interpolation, MaterialBinding};
