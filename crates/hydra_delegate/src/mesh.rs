//! Mesh Synchronizer
//!
//! A [`HydraMesh`] owns the vertex buffers of one renderable mesh. The host
//! streams indexed attribute data into it in any order; every update
//! re-derives the affected buffers in full from the latest raw arrays and
//! the latest index list, so buffers can never drift out of sync with the
//! topology.

use std::str::FromStr;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use hydra_core::{DiagnosticKind, Diagnostics};
use hydra_resources::geometry::{self, Attribute, Geometry, expand_by_indices};

/// How a primvar's values map onto the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Constant,
    Uniform,
    Varying,
    Vertex,
    #[serde(alias = "faceVarying")]
    FaceVarying,
    Instance,
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constant" => Ok(Self::Constant),
            "uniform" => Ok(Self::Uniform),
            "varying" => Ok(Self::Varying),
            "vertex" => Ok(Self::Vertex),
            "facevarying" => Ok(Self::FaceVarying),
            "instance" => Ok(Self::Instance),
            other => Err(format!("unknown interpolation '{other}'")),
        }
    }
}

/// The material a mesh draws with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MaterialBinding {
    /// The session's missing-material sentinel.
    #[default]
    Missing,
    /// A material prim, by id.
    Material(String),
}

/// Per-mesh display color state, applied on top of the bound material.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DisplayColor {
    #[default]
    None,
    /// One color for the whole mesh.
    Constant(Vec3),
    /// Colors come from the `color` vertex buffer.
    Vertex,
}

#[derive(Debug, Clone)]
struct Primvar {
    data: Vec<f32>,
    dimension: usize,
}

fn source(primvar: &Option<Primvar>) -> (Option<&[f32]>, usize) {
    match primvar {
        Some(primvar) => (Some(primvar.data.as_slice()), primvar.dimension),
        None => (None, 0),
    }
}

#[derive(Debug)]
pub struct HydraMesh {
    id: String,
    geometry: Geometry,

    indices: Option<Vec<u32>>,
    points: Option<Vec<f32>>,
    normals: Option<Vec<f32>>,
    // vertex-interpolated, expanded through the index list
    colors: Option<Primvar>,
    uvs: Option<Primvar>,
    // already per face-vertex, assigned as is
    face_varying_uvs: Option<Primvar>,

    transform: Mat4,
    auto_update_transform: bool,
    material: MaterialBinding,
    display_color: DisplayColor,

    pub cast_shadow: bool,
    pub receive_shadow: bool,

    commits: u64,
}

impl HydraMesh {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            geometry: Geometry::new(),
            indices: None,
            points: None,
            normals: None,
            colors: None,
            uvs: None,
            face_varying_uvs: None,
            transform: Mat4::IDENTITY,
            auto_update_transform: true,
            material: MaterialBinding::Missing,
            display_color: DisplayColor::None,
            cast_shadow: true,
            receive_shadow: true,
            commits: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// `false` once the host has supplied an explicit transform.
    pub fn auto_update_transform(&self) -> bool {
        self.auto_update_transform
    }

    pub fn material(&self) -> &MaterialBinding {
        &self.material
    }

    pub fn display_color(&self) -> DisplayColor {
        self.display_color
    }

    /// Number of commit barriers seen.
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    // ========================================================================
    // Topology and core attributes
    // ========================================================================

    /// Replaces the index list and re-derives every buffer from it.
    pub fn update_indices(&mut self, indices: &[u32]) -> Diagnostics {
        self.indices = Some(indices.to_vec());

        let mut diagnostics = Diagnostics::new();
        self.derive(geometry::POSITION, &mut diagnostics);
        self.derive(geometry::NORMAL, &mut diagnostics);
        self.derive(geometry::COLOR, &mut diagnostics);
        self.derive(geometry::UV, &mut diagnostics);
        diagnostics
    }

    pub fn update_points(&mut self, points: &[f32]) -> Diagnostics {
        self.points = Some(points.to_vec());
        let mut diagnostics = Diagnostics::new();
        self.derive(geometry::POSITION, &mut diagnostics);
        diagnostics
    }

    pub fn update_normals(&mut self, normals: &[f32]) -> Diagnostics {
        self.normals = Some(normals.to_vec());
        let mut diagnostics = Diagnostics::new();
        self.derive(geometry::NORMAL, &mut diagnostics);
        diagnostics
    }

    /// Stores a row-major matrix as the renderer's column-major transform and
    /// stops automatic transform updates for this mesh.
    pub fn set_transform(&mut self, matrix: &[f32; 16]) {
        // Reading row-major data as columns is the transpose.
        self.transform = Mat4::from_cols_array(matrix);
        self.auto_update_transform = false;
    }

    pub fn set_material(&mut self, material: MaterialBinding) {
        self.material = material;
    }

    /// Marks a batch of updates as visible.
    ///
    /// All derived state is already current when each update returns, so
    /// there is nothing to flush here.
    pub fn commit(&mut self) {
        self.commits += 1;
        log::trace!("Committed mesh {}", self.id);
    }

    // ========================================================================
    // Primvars
    // ========================================================================

    /// Routes a primvar to the attribute it feeds.
    ///
    /// `points` and `normals` are set through their own calls and ignored
    /// here. Any name starting with `st` is the UV set. Anything else is
    /// reported and skipped.
    pub fn update_primvar(
        &mut self,
        name: &str,
        data: &[f32],
        dimension: usize,
        interpolation: Interpolation,
    ) -> Diagnostics {
        match name {
            "points" | "normals" => Diagnostics::new(),
            "displayColor" => self.set_display_color(data, dimension, interpolation),
            _ if name.starts_with("st") => self.set_uv(data, dimension, interpolation),
            _ => Diagnostics::from(hydra_core::Diagnostic::new(
                DiagnosticKind::UnsupportedPrimvar,
                format!("{}: primvar '{name}'", self.id),
            )),
        }
    }

    fn set_display_color(
        &mut self,
        data: &[f32],
        dimension: usize,
        interpolation: Interpolation,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        match interpolation {
            Interpolation::Constant => {
                if data.len() < 3 {
                    diagnostics.push(
                        DiagnosticKind::InvalidDimension,
                        format!("{}: constant displayColor needs 3 components, got {}", self.id, data.len()),
                    );
                    return diagnostics;
                }
                self.colors = None;
                self.geometry.remove_attribute(geometry::COLOR);
                self.display_color = DisplayColor::Constant(Vec3::from_slice(&data[..3]));
            }
            Interpolation::Vertex => {
                self.colors = Some(Primvar {
                    data: data.to_vec(),
                    dimension,
                });
                self.display_color = DisplayColor::Vertex;
                self.derive(geometry::COLOR, &mut diagnostics);
            }
            other => diagnostics.push(
                DiagnosticKind::UnsupportedInterpolation,
                format!("{}: displayColor with {other:?} interpolation", self.id),
            ),
        }
        diagnostics
    }

    fn set_uv(&mut self, data: &[f32], dimension: usize, interpolation: Interpolation) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        match interpolation {
            Interpolation::FaceVarying => {
                self.uvs = None;
                self.face_varying_uvs = Some(Primvar {
                    data: data.to_vec(),
                    dimension,
                });
                self.derive(geometry::UV, &mut diagnostics);
            }
            Interpolation::Vertex => {
                self.face_varying_uvs = None;
                self.uvs = Some(Primvar {
                    data: data.to_vec(),
                    dimension,
                });
                self.derive(geometry::UV, &mut diagnostics);
            }
            other => diagnostics.push(
                DiagnosticKind::UnsupportedInterpolation,
                format!("{}: uv with {other:?} interpolation", self.id),
            ),
        }
        diagnostics
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    /// Rebuilds one named buffer from its raw source.
    fn derive(&mut self, name: &str, diagnostics: &mut Diagnostics) {
        if name == geometry::UV
            && let Some(primvar) = &self.face_varying_uvs
        {
            let (data, dimension) = (primvar.data.clone(), primvar.dimension);
            self.assign_uv(data, dimension, diagnostics);
            return;
        }

        let (values, dimension) = match name {
            geometry::POSITION => (self.points.as_deref(), 3),
            geometry::NORMAL => (self.normals.as_deref(), 3),
            geometry::COLOR => source(&self.colors),
            geometry::UV => source(&self.uvs),
            _ => return,
        };

        let (Some(values), Some(indices)) = (values, self.indices.as_deref()) else {
            self.clear(name);
            return;
        };

        let expanded = expand_by_indices(values, indices, dimension);
        if expanded.out_of_range > 0 {
            diagnostics.push(
                DiagnosticKind::IndexOutOfRange,
                format!(
                    "{}: {} of {} '{name}' indices exceed {} control points",
                    self.id,
                    expanded.out_of_range,
                    indices.len(),
                    values.len() / dimension.max(1)
                ),
            );
        }

        if name == geometry::UV {
            self.assign_uv(expanded.data, dimension, diagnostics);
        } else {
            self.assign(name, expanded.data, dimension, diagnostics);
        }
    }

    fn assign_uv(&mut self, data: Vec<f32>, dimension: usize, diagnostics: &mut Diagnostics) {
        if !self.assign(geometry::UV, data, dimension, diagnostics) {
            self.geometry.remove_attribute(geometry::UV1);
            return;
        }
        // Occlusion maps sample the second UV set.
        if let Some(uv) = self.geometry.get_attribute(geometry::UV).cloned() {
            self.geometry.set_attribute(geometry::UV1, uv);
        }
    }

    /// Drops a derived buffer whose source can no longer produce it.
    fn clear(&mut self, name: &str) {
        self.geometry.remove_attribute(name);
        if name == geometry::UV {
            self.geometry.remove_attribute(geometry::UV1);
        }
    }

    fn assign(&mut self, name: &str, data: Vec<f32>, dimension: usize, diagnostics: &mut Diagnostics) -> bool {
        match Attribute::new_planar(data, dimension) {
            Some(attr) => {
                self.geometry.set_attribute(name, attr);
                true
            }
            None => {
                diagnostics.push(
                    DiagnosticKind::InvalidDimension,
                    format!("{}: '{name}' with dimension {dimension}", self.id),
                );
                self.geometry.remove_attribute(name);
                false
            }
        }
    }
}
