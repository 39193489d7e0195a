use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use rustc_hash::FxHashMap;
use wgpu::VertexFormat;

/// Vertex attribute names the renderer binds by.
pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const COLOR: &str = "color";
pub const UV: &str = "uv";
/// Second UV set, mirrored from [`UV`] so occlusion maps can sample it.
pub const UV1: &str = "uv1";

static NEXT_ATTR_VERSION: AtomicU64 = AtomicU64::new(1);

/// Maps an attribute item size to the matching float vertex format.
#[must_use]
pub fn vertex_format(item_size: usize) -> Option<VertexFormat> {
    match item_size {
        1 => Some(VertexFormat::Float32),
        2 => Some(VertexFormat::Float32x2),
        3 => Some(VertexFormat::Float32x3),
        4 => Some(VertexFormat::Float32x4),
        _ => None,
    }
}

/// A planar float attribute: `count` items of `item_size` components each.
///
/// Data is shared through `Arc`, so cloning an attribute (for example to
/// alias `uv1` onto `uv`) does not copy the buffer.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub data: Arc<Vec<f32>>,
    pub item_size: usize,
    pub format: VertexFormat,
    pub count: u32,
    /// Data version for change detection
    pub version: u64,
}

impl Attribute {
    /// Returns `None` when `item_size` has no float vertex format.
    #[must_use]
    pub fn new_planar(data: Vec<f32>, item_size: usize) -> Option<Self> {
        let format = vertex_format(item_size)?;
        let count = (data.len() / item_size) as u32;
        Some(Self {
            data: Arc::new(data),
            item_size,
            format,
            count,
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
        })
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Raw bytes for upload.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.data.as_slice())
    }

    /// Components of item `i`.
    #[must_use]
    pub fn read(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.item_size)?;
        self.data.get(start..start + self.item_size)
    }

    #[must_use]
    pub fn read_vec3(&self, i: usize) -> Option<Vec3> {
        if self.item_size != 3 {
            return None;
        }
        self.read(i).map(Vec3::from_slice)
    }
}

/// Result of [`expand_by_indices`].
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded {
    pub data: Vec<f32>,
    /// Number of indices that pointed past the end of the input.
    pub out_of_range: usize,
}

/// Expands per-control-point values into per-face-vertex order.
///
/// Output slot `i` holds the `dimension` components of control point
/// `indices[i]`, so the result always has `indices.len() * dimension`
/// values. Indices past the end of `values` produce zeros and are counted
/// in [`Expanded::out_of_range`].
#[must_use]
pub fn expand_by_indices(values: &[f32], indices: &[u32], dimension: usize) -> Expanded {
    let mut data = Vec::with_capacity(indices.len() * dimension);
    let mut out_of_range = 0;

    for &index in indices {
        let item = (index as usize)
            .checked_mul(dimension)
            .and_then(|start| values.get(start..start.checked_add(dimension)?));
        match item {
            Some(item) => data.extend_from_slice(item),
            None => {
                out_of_range += 1;
                data.extend(std::iter::repeat_n(0.0, dimension));
            }
        }
    }

    Expanded { data, out_of_range }
}

/// Named, non-indexed vertex buffers of one mesh.
#[derive(Debug, Default)]
pub struct Geometry {
    // vertex layout versioning
    layout_version: u64,
    data_version: u64,

    attributes: FxHashMap<String, Attribute>,
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout_version(&self) -> u64 {
        self.layout_version
    }

    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        let layout_changed = self
            .attributes
            .get(name)
            .is_none_or(|old| old.format != attr.format);

        self.attributes.insert(name.to_string(), attr);

        if layout_changed {
            self.layout_version = self.layout_version.wrapping_add(1);
        }
        self.data_version = self.data_version.wrapping_add(1);
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let removed = self.attributes.remove(name);
        if removed.is_some() {
            self.layout_version = self.layout_version.wrapping_add(1);
            self.data_version = self.data_version.wrapping_add(1);
        }
        removed
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Number of vertices to draw, taken from the position buffer.
    pub fn vertex_count(&self) -> u32 {
        self.attributes.get(POSITION).map_or(0, |attr| attr.count)
    }
}
