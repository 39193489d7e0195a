//! # Hydra Sync
//!
//! Synchronizes a Hydra-style scene delegate stream (meshes, primvars,
//! shading graphs and texture references) into renderer-native state: flat
//! per-vertex buffers and fixed-schema physical materials.
//!
//! The workspace is split into:
//!
//! - [`hydra_core`]: errors, diagnostics and session settings
//! - [`hydra_resources`]: geometry, images, textures and the physical material
//! - [`hydra_assets`]: the asset backend contract and the texture resolver
//! - [`hydra_delegate`]: mesh and material synchronization behind [`RenderDelegate`]
//!
//! ```no_run
//! use std::rc::Rc;
//! use hydra_sync::prelude::*;
//!
//! let backend = Rc::new(MemoryBackend::new());
//! let mut delegate = RenderDelegate::new(SessionSettings::default(), backend);
//!
//! let mesh = delegate.create_rprim("mesh", "/World/Cube", None);
//! mesh.update_points(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
//! mesh.update_indices(&[0, 1, 2]);
//! delegate.commit_resources();
//! ```

pub use hydra_assets;
pub use hydra_core;
pub use hydra_delegate;
pub use hydra_resources;

pub use glam;

pub use hydra_assets::{AssetBackend, MemoryBackend, NullBackend, TextureResolver};
pub use hydra_core::{Diagnostic, DiagnosticKind, Diagnostics, Error, Result, SessionSettings, TextureError};
pub use hydra_delegate::{HydraMaterial, HydraMesh, Interpolation, ParamValue, Relationship, RenderDelegate};
pub use hydra_resources::{Geometry, PhysicalMaterial, Texture, TextureSlot};

pub mod prelude {
    pub use crate::{
        AssetBackend, DiagnosticKind, Diagnostics, HydraMaterial, HydraMesh, Interpolation, MemoryBackend,
        NullBackend, ParamValue, PhysicalMaterial, Relationship, RenderDelegate, SessionSettings, TextureSlot,
    };
    pub use hydra_delegate::{MaterialBinding, ParameterBag};
}
