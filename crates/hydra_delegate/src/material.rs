//! Material Graph Resolver
//!
//! A [`HydraMaterial`] accumulates shading nodes through
//! [`update_node`](HydraMaterial::update_node) and resolves them into a flat
//! [`PhysicalMaterial`] on [`update_finished`](HydraMaterial::update_finished).
//!
//! Resolution always starts from a fresh material. Literal properties are
//! applied immediately; wired texture inputs become [`TextureBindRequest`]s
//! that land later through [`apply_completion`](HydraMaterial::apply_completion).
//! Every finalize starts a new generation, and completions from an older
//! generation are dropped.

use glam::Vec3;
use hydra_assets::{AssetBackend, TextureResolver};
use hydra_core::{DiagnosticKind, Diagnostics};
use hydra_resources::{
    ChannelLayout, ColorProperty, MaterialProperty, PhysicalMaterial, ScalarProperty, TextureSlot,
};

use crate::binding::{BindAction, TextureBindCompletion, TextureBindRequest, apply_texture};
use crate::graph::{MaterialGraph, NodeHandle, ParamValue, ParameterBag, Relationship};

/// Field that identifies the main shading node.
pub const MAIN_NODE_FIELD: &str = "diffuseColor";

/// Shading-node inputs that can be wired to a texture, and the slot each
/// one feeds. `diffuseColor` comes before `opacity`: the opacity input may
/// reuse the base color map's alpha channel.
pub const TEXTURE_SLOTS: [(&str, TextureSlot); TextureSlot::COUNT] = [
    ("diffuseColor", TextureSlot::Map),
    ("clearcoat", TextureSlot::ClearcoatMap),
    ("clearcoatRoughness", TextureSlot::ClearcoatRoughnessMap),
    ("emissiveColor", TextureSlot::EmissiveMap),
    ("occlusion", TextureSlot::AoMap),
    ("roughness", TextureSlot::RoughnessMap),
    ("metallic", TextureSlot::MetalnessMap),
    ("normal", TextureSlot::NormalMap),
    ("opacity", TextureSlot::AlphaMap),
];

/// Shading-node inputs that can carry a literal value.
pub const PROPERTIES: [(&str, MaterialProperty); 8] = [
    ("clearcoat", MaterialProperty::Scalar(ScalarProperty::Clearcoat)),
    ("clearcoatRoughness", MaterialProperty::Scalar(ScalarProperty::ClearcoatRoughness)),
    ("diffuseColor", MaterialProperty::Color(ColorProperty::Color)),
    ("emissiveColor", MaterialProperty::Color(ColorProperty::Emissive)),
    ("ior", MaterialProperty::Scalar(ScalarProperty::Ior)),
    ("metallic", MaterialProperty::Scalar(ScalarProperty::Metalness)),
    ("opacity", MaterialProperty::Scalar(ScalarProperty::Opacity)),
    ("roughness", MaterialProperty::Scalar(ScalarProperty::Roughness)),
];

/// Parameter of a texture node holding its resource path.
const FILE_PARAM: &str = "file";

/// Output of one [`HydraMaterial::update_finished`] call.
#[derive(Debug, Default)]
pub struct Resolution {
    pub generation: u64,
    /// Texture loads to drive; each completion must be fed back through
    /// [`HydraMaterial::apply_completion`].
    pub binds: Vec<TextureBindRequest>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug)]
pub struct HydraMaterial {
    id: String,
    graph: MaterialGraph,
    /// `None` resolves to the session's missing material.
    resolved: Option<PhysicalMaterial>,
    generation: u64,
}

impl HydraMaterial {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            graph: MaterialGraph::new(),
            resolved: None,
            generation: 0,
        }
    }

    /// Creates a material whose generations continue after `generation`.
    ///
    /// A material recreated under a retired id starts here so completions
    /// addressed to its predecessor stay stale.
    pub fn with_generation(id: &str, generation: u64) -> Self {
        Self {
            generation,
            ..Self::new(id)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph(&self) -> &MaterialGraph {
        &self.graph
    }

    /// The resolved material, or `None` when the missing material applies.
    pub fn resolved(&self) -> Option<&PhysicalMaterial> {
        self.resolved.as_ref()
    }

    pub fn is_missing(&self) -> bool {
        self.resolved.is_none()
    }

    /// Current resolution generation; zero before the first finalize.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stores the parameters of the node at `path`. The last write wins.
    pub fn update_node(&mut self, network_id: &str, path: &str, parameters: ParameterBag) {
        log::trace!("Updating material node {network_id} {path}");
        self.graph.update_node(path, parameters);
    }

    /// Wires `relationships` and rebuilds the flat material from scratch.
    ///
    /// Relationships replace those of the previous finalize.
    pub fn update_finished<B: AssetBackend>(
        &mut self,
        material_type: &str,
        relationships: &[Relationship],
        resolver: &mut TextureResolver<B>,
    ) -> Resolution {
        self.generation += 1;
        log::debug!(
            "Finalizing material {} ({material_type}), generation {}",
            self.id,
            self.generation
        );

        let mut diagnostics = Diagnostics::new();
        self.graph.clear_relationships();
        for relationship in relationships {
            if let Err(diagnostic) = self.graph.link(relationship) {
                diagnostics.record(diagnostic);
            }
        }

        let Some(main) = self.graph.first_with_field(MAIN_NODE_FIELD) else {
            log::debug!("Material {} has no main node, using the missing material", self.id);
            self.resolved = None;
            return Resolution {
                generation: self.generation,
                binds: Vec::new(),
                diagnostics,
            };
        };

        let mut material = PhysicalMaterial::default();
        let binds = self.collect_texture_binds(main, &mut material, resolver, &mut diagnostics);
        self.assign_properties(main, &mut material, &mut diagnostics);
        self.resolved = Some(material);

        Resolution {
            generation: self.generation,
            binds,
            diagnostics,
        }
    }

    /// Applies a finished texture load. Completions from an older generation
    /// are discarded.
    pub fn apply_completion(&mut self, completion: TextureBindCompletion) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if completion.generation != self.generation {
            diagnostics.push(
                DiagnosticKind::StaleTextureBinding,
                format!(
                    "{}: {} from generation {} (current {})",
                    self.id,
                    completion.path,
                    completion.generation,
                    self.generation
                ),
            );
            return diagnostics;
        }

        let Some(material) = self.resolved.as_mut() else {
            return diagnostics;
        };

        match completion.result {
            Ok(texture) => apply_texture(material, completion.slot, completion.action, &texture),
            Err(err) => diagnostics.push(
                DiagnosticKind::TextureLoadFailed,
                format!("{}: {} for '{}': {err}", self.id, completion.path, completion.slot.name()),
            ),
        }
        diagnostics
    }

    // ========================================================================
    // Resolution steps
    // ========================================================================

    /// File and channel of the texture node wired into `field`.
    fn texture_source(&self, main: NodeHandle, field: &str) -> Option<(Option<&str>, &str)> {
        let edge = self.graph.source_of(main, field)?;
        let file = self
            .graph
            .node(edge.input)
            .and_then(|node| node.parameters.get(FILE_PARAM))
            .and_then(ParamValue::as_str);
        Some((file, edge.input_name.as_str()))
    }

    fn collect_texture_binds<B: AssetBackend>(
        &self,
        main: NodeHandle,
        material: &mut PhysicalMaterial,
        resolver: &mut TextureResolver<B>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<TextureBindRequest> {
        let diffuse_file = self
            .texture_source(main, MAIN_NODE_FIELD)
            .and_then(|(file, _)| file);

        let mut binds: Vec<TextureBindRequest> = Vec::new();
        let mut alpha_from_map = false;

        for (field, slot) in TEXTURE_SLOTS {
            let Some((file, channel)) = self.texture_source(main, field) else {
                continue;
            };
            let Some(file) = file else {
                diagnostics.push(
                    DiagnosticKind::MissingTextureFile,
                    format!("{}: texture wired into '{field}' has no file", self.id),
                );
                continue;
            };

            let action = match slot {
                TextureSlot::AlphaMap => {
                    if diffuse_file == Some(file) && channel == "a" {
                        alpha_from_map = true;
                        continue;
                    }
                    diagnostics.push(
                        DiagnosticKind::AlphaExtractionUnsupported,
                        format!("{}: channel '{channel}' of {file}", self.id),
                    );
                    BindAction::MarkTransparent
                }
                TextureSlot::MetalnessMap | TextureSlot::EmissiveMap => BindAction::Bind {
                    channels: ChannelLayout::from_channel(channel).unwrap_or_default(),
                    carries_alpha: false,
                },
                _ => match ChannelLayout::from_channel(channel) {
                    Some(channels) => BindAction::Bind {
                        channels,
                        carries_alpha: false,
                    },
                    None => {
                        diagnostics.push(
                            DiagnosticKind::UnsupportedTextureChannel,
                            format!("{}: channel '{channel}' for '{}'", self.id, slot.name()),
                        );
                        continue;
                    }
                },
            };

            match resolver.resolve(file) {
                Ok(request) => {
                    diagnostics.extend(request.diagnostics);
                    binds.push(TextureBindRequest {
                        slot,
                        path: file.to_string(),
                        action,
                        future: request.future,
                    });
                }
                Err(err) => diagnostics.push(
                    DiagnosticKind::TextureLoadFailed,
                    format!("{}: '{}': {err}", self.id, slot.name()),
                ),
            }
        }

        if alpha_from_map {
            let map = binds.iter_mut().find(|bind| bind.slot == TextureSlot::Map);
            match map {
                Some(TextureBindRequest {
                    action: BindAction::Bind { carries_alpha, .. },
                    ..
                }) => *carries_alpha = true,
                _ => material.set_transparent(true),
            }
        }

        binds
    }

    fn assign_properties(&self, main: NodeHandle, material: &mut PhysicalMaterial, diagnostics: &mut Diagnostics) {
        for (field, property) in PROPERTIES {
            let Some(value) = self.graph.literal(main, field) else {
                continue;
            };

            match (property, value.as_vector(), value.as_scalar()) {
                (MaterialProperty::Color(color), Some(v), _) if v.len() >= 3 => {
                    material.set_color_property(color, Vec3::from_slice(&v[..3]));
                }
                (MaterialProperty::Scalar(scalar), _, Some(factor)) => {
                    material.set_scalar(scalar, factor);
                    if scalar == ScalarProperty::Opacity && factor < 1.0 {
                        material.set_transparent(true);
                    }
                }
                _ => diagnostics.push(
                    DiagnosticKind::PropertyTypeMismatch,
                    format!("{}: '{field}' = {value:?}", self.id),
                ),
            }
        }
    }
}
