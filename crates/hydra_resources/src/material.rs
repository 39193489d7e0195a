//! The flat physical material schema.
//!
//! Every resolved material conforms to [`PhysicalMaterial`]: a fixed set of
//! scalar and color factors plus nine named texture slots. Renderers bind by
//! the slot names returned from [`TextureSlot::name`].

use glam::Vec3;

use crate::texture::Texture;

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Named texture slots of the physical material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Map,
    ClearcoatMap,
    ClearcoatRoughnessMap,
    EmissiveMap,
    AoMap,
    RoughnessMap,
    MetalnessMap,
    NormalMap,
    AlphaMap,
}

impl TextureSlot {
    pub const COUNT: usize = 9;

    pub const ALL: [TextureSlot; Self::COUNT] = [
        Self::Map,
        Self::ClearcoatMap,
        Self::ClearcoatRoughnessMap,
        Self::EmissiveMap,
        Self::AoMap,
        Self::RoughnessMap,
        Self::MetalnessMap,
        Self::NormalMap,
        Self::AlphaMap,
    ];

    /// Schema name of the slot.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::ClearcoatMap => "clearcoatMap",
            Self::ClearcoatRoughnessMap => "clearcoatRoughnessMap",
            Self::EmissiveMap => "emissiveMap",
            Self::AoMap => "aoMap",
            Self::RoughnessMap => "roughnessMap",
            Self::MetalnessMap => "metalnessMap",
            Self::NormalMap => "normalMap",
            Self::AlphaMap => "alphaMap",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Scalar factors addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarProperty {
    Clearcoat,
    ClearcoatRoughness,
    Ior,
    Metalness,
    Opacity,
    Roughness,
}

/// Color factors addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorProperty {
    Color,
    Emissive,
}

/// Any literal-valued property of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialProperty {
    Scalar(ScalarProperty),
    Color(ColorProperty),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalUniforms {
    pub color: Vec3,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Vec3,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub ior: f32,
}

impl Default for PhysicalUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Vec3::ZERO,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            ior: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialSettings {
    pub transparent: bool,
    pub side: Side,
    pub vertex_colors: bool,
}

/// Generates version-bumping accessors for the uniform and settings fields.
macro_rules! impl_material_api {
    (
        $struct_name:ident,
        uniforms: [ $(($u_field:ident, $u_type:ty, $u_doc:expr)),* $(,)? ],
        settings: [ $(($s_field:ident, $s_type:ty, $s_doc:expr)),* $(,)? ]
    ) => {
        impl $struct_name {
            $(
                paste::paste! {
                    #[doc = $u_doc]
                    pub fn [<set_ $u_field>](&mut self, value: $u_type) {
                        if self.uniforms.$u_field != value {
                            self.uniforms.$u_field = value;
                            self.version = self.version.wrapping_add(1);
                        }
                    }
                }

                #[must_use]
                pub fn $u_field(&self) -> $u_type {
                    self.uniforms.$u_field
                }
            )*

            $(
                paste::paste! {
                    #[doc = $s_doc]
                    pub fn [<set_ $s_field>](&mut self, value: $s_type) {
                        if self.settings.$s_field != value {
                            self.settings.$s_field = value;
                            self.version = self.version.wrapping_add(1);
                        }
                    }
                }

                #[must_use]
                pub fn $s_field(&self) -> $s_type {
                    self.settings.$s_field
                }
            )*
        }
    };
}

/// Fixed-schema physically based material.
#[derive(Debug, Clone, Default)]
pub struct PhysicalMaterial {
    uniforms: PhysicalUniforms,
    settings: MaterialSettings,
    textures: [Option<Texture>; TextureSlot::COUNT],
    version: u64,
}

impl_material_api!(
    PhysicalMaterial,
    uniforms: [
        (color,               Vec3, "Base color."),
        (opacity,             f32,  "Opacity value."),
        (roughness,           f32,  "Roughness factor."),
        (metalness,           f32,  "Metalness factor."),
        (emissive,            Vec3, "Emissive color."),
        (clearcoat,           f32,  "Clearcoat intensity."),
        (clearcoat_roughness, f32,  "Clearcoat roughness."),
        (ior,                 f32,  "Index of Refraction."),
    ],
    settings: [
        (transparent,   bool, "Enables alpha blending."),
        (side,          Side, "Face culling mode."),
        (vertex_colors, bool, "Multiplies the base color by the `color` vertex attribute."),
    ]
);

impl PhysicalMaterial {
    #[must_use]
    pub fn new(color: Vec3) -> Self {
        Self {
            uniforms: PhysicalUniforms { color, ..Default::default() },
            ..Default::default()
        }
    }

    /// The sentinel drawn for prims without a resolved material.
    #[must_use]
    pub fn missing(color: Vec3) -> Self {
        let mut material = Self::new(color);
        material.settings.side = Side::Double;
        material
    }

    /// Monotonic change counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn uniforms(&self) -> &PhysicalUniforms {
        &self.uniforms
    }

    #[must_use]
    pub fn texture(&self, slot: TextureSlot) -> Option<&Texture> {
        self.textures[slot.index()].as_ref()
    }

    pub fn texture_mut(&mut self, slot: TextureSlot) -> Option<&mut Texture> {
        let texture = self.textures[slot.index()].as_mut()?;
        self.version = self.version.wrapping_add(1);
        Some(texture)
    }

    pub fn set_texture(&mut self, slot: TextureSlot, texture: Option<Texture>) {
        self.textures[slot.index()] = texture;
        self.version = self.version.wrapping_add(1);
    }

    /// Slots that currently hold a texture, in schema order.
    pub fn bound_textures(&self) -> impl Iterator<Item = (TextureSlot, &Texture)> {
        TextureSlot::ALL
            .into_iter()
            .filter_map(|slot| self.texture(slot).map(|texture| (slot, texture)))
    }

    pub fn set_scalar(&mut self, property: ScalarProperty, value: f32) {
        match property {
            ScalarProperty::Clearcoat => self.set_clearcoat(value),
            ScalarProperty::ClearcoatRoughness => self.set_clearcoat_roughness(value),
            ScalarProperty::Ior => self.set_ior(value),
            ScalarProperty::Metalness => self.set_metalness(value),
            ScalarProperty::Opacity => self.set_opacity(value),
            ScalarProperty::Roughness => self.set_roughness(value),
        }
    }

    pub fn set_color_property(&mut self, property: ColorProperty, value: Vec3) {
        match property {
            ColorProperty::Color => self.set_color(value),
            ColorProperty::Emissive => self.set_emissive(value),
        }
    }
}
