use wgpu::{AddressMode, FilterMode, TextureFormat};

use crate::image::Image;

/// How color values stored in a texture are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Gamma-encoded color (base color and emissive maps).
    Srgb,
    #[default]
    Linear,
}

/// Channel layout a material slot samples from a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// One channel (`r`).
    Single,
    /// Color without alpha (`rgb`).
    Triple,
    /// Color with alpha (`rgba`).
    #[default]
    Quad,
}

impl ChannelLayout {
    /// Maps a shading-network output name onto a layout the schema accepts.
    #[must_use]
    pub fn from_channel(channel: &str) -> Option<Self> {
        match channel {
            "r" => Some(Self::Single),
            "rgb" => Some(Self::Triple),
            "rgba" => Some(Self::Quad),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
        }
    }
}

impl TextureSampler {
    /// Sampler that wraps on both axes.
    #[must_use]
    pub fn repeat() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            ..Default::default()
        }
    }
}

/// A sampled view of an [`Image`].
///
/// Cloning a texture shares the pixel data; sampler, color space and channel
/// layout are per clone, so one decoded image can be bound into several
/// material slots with different settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Originating resource path.
    pub name: String,
    pub image: Image,
    pub sampler: TextureSampler,
    pub color_space: ColorSpace,
    pub channels: ChannelLayout,
}

impl Texture {
    #[must_use]
    pub fn new(name: &str, image: Image) -> Self {
        Self {
            name: name.to_string(),
            image,
            sampler: TextureSampler::default(),
            color_space: ColorSpace::default(),
            channels: ChannelLayout::default(),
        }
    }

    /// Texture format a GPU upload should use.
    #[must_use]
    pub fn format(&self) -> TextureFormat {
        match self.color_space {
            ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => TextureFormat::Rgba8Unorm,
        }
    }

    #[must_use]
    pub fn has_alpha(&self) -> bool {
        self.channels == ChannelLayout::Quad
    }

    /// Returns `true` if both textures view the same decoded image.
    #[must_use]
    pub fn shares_image(&self, other: &Texture) -> bool {
        self.image == other.image
    }

    /// 1x1 texture of a single color.
    #[must_use]
    pub fn create_solid_color(name: &str, color: [u8; 4]) -> Self {
        Self::new(name, Image::new(1, 1, color.to_vec()))
    }
}
