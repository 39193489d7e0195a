//! Texture binds
//!
//! Finalizing a material produces one [`TextureBindRequest`] per wired slot.
//! The delegate drives each request's future on its local pool and sends a
//! [`TextureBindCompletion`] back over a channel; the completion is applied
//! to the material only if it still belongs to the material's current
//! resolution generation.

use glam::Vec3;
use hydra_assets::{TextureFuture, TextureResult};
use hydra_resources::{ChannelLayout, ColorSpace, PhysicalMaterial, Texture, TextureSampler, TextureSlot};

/// What to do with a texture once it has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindAction {
    /// Bind a copy of the texture into the slot.
    Bind {
        channels: ChannelLayout,
        /// The opacity input reads this texture's alpha channel.
        carries_alpha: bool,
    },
    /// Only flag the material transparent; the slot stays empty.
    MarkTransparent,
}

/// A texture load scheduled by one material resolution.
pub struct TextureBindRequest {
    pub slot: TextureSlot,
    pub path: String,
    pub action: BindAction,
    pub future: TextureFuture,
}

impl std::fmt::Debug for TextureBindRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureBindRequest")
            .field("slot", &self.slot)
            .field("path", &self.path)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// The outcome of a [`TextureBindRequest`], tagged with its origin.
#[derive(Debug, Clone)]
pub struct TextureBindCompletion {
    pub material: String,
    pub generation: u64,
    pub slot: TextureSlot,
    pub path: String,
    pub action: BindAction,
    pub result: TextureResult,
}

impl TextureBindRequest {
    /// Awaits the texture and tags the result for `material` at `generation`.
    pub async fn into_completion(self, material: String, generation: u64) -> TextureBindCompletion {
        let result = self.future.await;
        TextureBindCompletion {
            material,
            generation,
            slot: self.slot,
            path: self.path,
            action: self.action,
            result,
        }
    }
}

/// Applies a loaded texture to `material` according to `action`.
///
/// The cached texture is never bound directly: every slot gets its own copy
/// with repeat addressing, so two slots sharing one file keep independent
/// sampler and color space settings.
pub fn apply_texture(material: &mut PhysicalMaterial, slot: TextureSlot, action: BindAction, texture: &Texture) {
    let (channels, carries_alpha) = match action {
        BindAction::MarkTransparent => {
            material.set_transparent(true);
            return;
        }
        BindAction::Bind { channels, carries_alpha } => (channels, carries_alpha),
    };

    match slot {
        TextureSlot::MetalnessMap => material.set_metalness(1.0),
        TextureSlot::EmissiveMap => material.set_emissive(Vec3::ONE),
        _ => {}
    }

    let mut bound = texture.clone();
    bound.sampler = TextureSampler::repeat();
    bound.channels = channels;
    if matches!(slot, TextureSlot::Map | TextureSlot::EmissiveMap) {
        bound.color_space = ColorSpace::Srgb;
    }
    if carries_alpha {
        bound.channels = ChannelLayout::Quad;
        material.set_transparent(true);
    }
    material.set_texture(slot, Some(bound));
}
