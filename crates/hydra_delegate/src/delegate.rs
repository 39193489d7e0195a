//! Delegate Facade
//!
//! [`RenderDelegate`] is one synchronization session: it owns the session
//! settings, the texture cache, and every mesh and material the host has
//! created. Nothing is process-global, so independent scenes can run side
//! by side in one process.
//!
//! Texture binds run as tasks on a single-threaded [`LocalPool`]. Finished
//! tasks report back through a channel and are applied when the host calls
//! [`process_texture_loads`](RenderDelegate::process_texture_loads) or
//! [`finish_texture_loads`](RenderDelegate::finish_texture_loads).

use std::collections::hash_map::Entry;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use glam::Vec3;
use rustc_hash::FxHashMap;

use hydra_assets::{AssetBackend, TextureResolver};
use hydra_core::{DiagnosticKind, Diagnostics, Error, Result, SessionSettings};
use hydra_resources::PhysicalMaterial;

use crate::binding::TextureBindCompletion;
use crate::graph::Relationship;
use crate::material::HydraMaterial;
use crate::mesh::{DisplayColor, HydraMesh, MaterialBinding};

/// The only sprim type the delegate handles.
pub const MATERIAL_TYPE_ID: &str = "material";

pub struct RenderDelegate<B: AssetBackend> {
    settings: SessionSettings,
    resolver: TextureResolver<B>,
    missing_material: PhysicalMaterial,

    meshes: FxHashMap<String, HydraMesh>,
    materials: FxHashMap<String, HydraMaterial>,
    /// Last generation of destroyed materials, by id.
    retired_generations: FxHashMap<String, u64>,

    pool: LocalPool,
    spawner: LocalSpawner,
    completion_tx: flume::Sender<TextureBindCompletion>,
    completion_rx: flume::Receiver<TextureBindCompletion>,
    pending_loads: usize,
}

impl<B: AssetBackend> RenderDelegate<B> {
    pub fn new(settings: SessionSettings, backend: Rc<B>) -> Self {
        let resolver = TextureResolver::new(&settings, backend);
        let missing_material = PhysicalMaterial::missing(settings.missing_material_color);
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let (completion_tx, completion_rx) = flume::unbounded();

        log::info!("Created render delegate for {}", settings.scene_name);

        Self {
            settings,
            resolver,
            missing_material,
            meshes: FxHashMap::default(),
            materials: FxHashMap::default(),
            retired_generations: FxHashMap::default(),
            pool,
            spawner,
            completion_tx,
            completion_rx,
            pending_loads: 0,
        }
    }

    #[inline]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[inline]
    pub fn resolver(&self) -> &TextureResolver<B> {
        &self.resolver
    }

    #[inline]
    pub fn backend(&self) -> &Rc<B> {
        self.resolver.backend()
    }

    /// The material drawn for meshes without a resolved material.
    #[inline]
    pub fn missing_material(&self) -> &PhysicalMaterial {
        &self.missing_material
    }

    // ========================================================================
    // Prim lifecycle
    // ========================================================================

    /// Creates (or recreates) the mesh `id`.
    pub fn create_rprim(&mut self, type_id: &str, id: &str, instancer_id: Option<&str>) -> &mut HydraMesh {
        log::debug!("Creating rprim {type_id} {id} (instancer: {instancer_id:?})");
        match self.meshes.entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(HydraMesh::new(id));
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(HydraMesh::new(id)),
        }
    }

    /// Accepted for protocol completeness; buffer prims carry no state here.
    pub fn create_bprim(&mut self, type_id: &str, id: &str) {
        log::debug!("Ignoring bprim {type_id} {id}");
    }

    /// Creates the material `id`. Any type other than `"material"` yields
    /// no prim.
    pub fn create_sprim(&mut self, type_id: &str, id: &str) -> Option<&mut HydraMaterial> {
        if type_id != MATERIAL_TYPE_ID {
            log::debug!("Ignoring sprim {type_id} {id}");
            return None;
        }

        let previous = self
            .materials
            .get(id)
            .map(HydraMaterial::generation)
            .or_else(|| self.retired_generations.remove(id))
            .unwrap_or(0);
        let material = HydraMaterial::with_generation(id, previous);
        Some(match self.materials.entry(id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(material);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(material),
        })
    }

    pub fn destroy_rprim(&mut self, id: &str) -> Option<HydraMesh> {
        self.meshes.remove(id)
    }

    /// Removes the material `id`. Loads still in flight for it are dropped
    /// when they complete.
    pub fn destroy_sprim(&mut self, id: &str) -> Option<HydraMaterial> {
        let material = self.materials.remove(id)?;
        self.retired_generations
            .insert(id.to_string(), material.generation());
        Some(material)
    }

    pub fn mesh(&self, id: &str) -> Option<&HydraMesh> {
        self.meshes.get(id)
    }

    pub fn mesh_mut(&mut self, id: &str) -> Option<&mut HydraMesh> {
        self.meshes.get_mut(id)
    }

    pub fn material(&self, id: &str) -> Option<&HydraMaterial> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: &str) -> Option<&mut HydraMaterial> {
        self.materials.get_mut(id)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &HydraMesh> {
        self.meshes.values()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Resolves the material `id` and schedules its texture binds.
    ///
    /// Binds from an earlier finalize of the same material are superseded.
    /// Meshes pick up the new material on their next
    /// [`surface_material`](Self::surface_material).
    pub fn finalize_material(
        &mut self,
        id: &str,
        material_type: &str,
        relationships: &[Relationship],
    ) -> Result<Diagnostics> {
        let material = self
            .materials
            .get_mut(id)
            .ok_or_else(|| Error::UnknownPrim(id.to_string()))?;

        let resolution = material.update_finished(material_type, relationships, &mut self.resolver);
        let generation = resolution.generation;

        for bind in resolution.binds {
            let tx = self.completion_tx.clone();
            let task = bind.into_completion(id.to_string(), generation);
            self.spawner
                .spawn_local(async move {
                    let completion = task.await;
                    // The receiver lives as long as the delegate.
                    let _ = tx.send(completion);
                })
                .map_err(|err| Error::TaskSpawn(err.to_string()))?;
            self.pending_loads += 1;
        }

        Ok(resolution.diagnostics)
    }

    /// Points the mesh at a material. An unknown material id leaves the
    /// current binding in place.
    pub fn bind_material(&mut self, mesh_id: &str, material_id: &str) -> Result<Diagnostics> {
        let known = self.materials.contains_key(material_id);
        let mesh = self
            .meshes
            .get_mut(mesh_id)
            .ok_or_else(|| Error::UnknownPrim(mesh_id.to_string()))?;

        let mut diagnostics = Diagnostics::new();
        if known {
            mesh.set_material(MaterialBinding::Material(material_id.to_string()));
        } else {
            diagnostics.push(
                DiagnosticKind::UnknownPrim,
                format!("{mesh_id}: material {material_id}"),
            );
        }
        Ok(diagnostics)
    }

    /// The flat material a renderer should draw `mesh_id` with.
    ///
    /// This is the bound material (or the missing material) with the mesh's
    /// display color applied to a copy, so a shared material is never
    /// changed by one mesh.
    pub fn surface_material(&self, mesh_id: &str) -> Option<PhysicalMaterial> {
        let mesh = self.meshes.get(mesh_id)?;

        let resolved = match mesh.material() {
            MaterialBinding::Material(id) => self.materials.get(id).and_then(HydraMaterial::resolved),
            MaterialBinding::Missing => None,
        };
        let is_missing = resolved.is_none();
        let mut material = resolved.unwrap_or(&self.missing_material).clone();

        match mesh.display_color() {
            DisplayColor::None => {}
            DisplayColor::Constant(color) => material.set_color(color),
            DisplayColor::Vertex => {
                material.set_vertex_colors(true);
                if is_missing {
                    material.set_color(Vec3::ONE);
                }
            }
        }
        Some(material)
    }

    // ========================================================================
    // Frame barriers and texture loads
    // ========================================================================

    /// Commit barrier over every mesh.
    pub fn commit_resources(&mut self) {
        for mesh in self.meshes.values_mut() {
            mesh.commit();
        }
    }

    /// Number of scheduled binds that have not been applied yet.
    pub fn pending_texture_loads(&self) -> usize {
        self.pending_loads
    }

    /// Runs texture tasks until none can make progress and applies every
    /// bind that finished.
    pub fn process_texture_loads(&mut self) -> Diagnostics {
        self.pool.run_until_stalled();
        self.apply_completions()
    }

    /// Runs texture tasks to completion and applies every bind.
    ///
    /// Blocks the calling thread; meant for synchronous hosts and tests.
    pub fn finish_texture_loads(&mut self) -> Diagnostics {
        self.pool.run();
        self.apply_completions()
    }

    fn apply_completions(&mut self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.pending_loads = self.pending_loads.saturating_sub(1);
            match self.materials.get_mut(&completion.material) {
                Some(material) => diagnostics.extend(material.apply_completion(completion)),
                None => log::debug!(
                    "Dropping texture {} for destroyed material {}",
                    completion.path,
                    completion.material
                ),
            }
        }
        diagnostics
    }
}
