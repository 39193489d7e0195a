//! Render Delegate Tests
//!
//! Tests for:
//! - Prim creation and destruction
//! - Material binding and the surface material a renderer draws
//! - Display color overrides on shared materials
//! - Scheduled texture loads, supersession and destroyed materials
//! - Session isolation

mod common;

use std::rc::Rc;

use glam::Vec3;

use hydra_sync::hydra_core::settings::MISSING_MATERIAL_COLOR;
use hydra_sync::hydra_resources::Side;
use hydra_sync::prelude::*;
use hydra_sync::{Error, TextureSlot};

use common::{bag, color, file, png_bytes};

#[rustfmt::skip]
const TRIANGLE: [f32; 9] = [
    0.0, 0.0, 0.0,
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
];

fn delegate() -> RenderDelegate<MemoryBackend> {
    let backend = Rc::new(MemoryBackend::new());
    backend.insert("textures/albedo.png", png_bytes(2, 2, [200, 150, 100, 255]));
    RenderDelegate::new(SessionSettings::default().with_scene_name("test.usda"), backend)
}

fn textured_material(delegate: &mut RenderDelegate<MemoryBackend>, id: &str) {
    let material = delegate.create_sprim("material", id).unwrap();
    material.update_node(id, &format!("{id}/Albedo"), bag(&[("file", file("textures/albedo.png"))]));
    material.update_node(id, &format!("{id}/Surface"), bag(&[("diffuseColor", color(1.0, 1.0, 1.0))]));
}

fn albedo_wire(id: &str) -> Relationship {
    Relationship::new(format!("{id}/Albedo"), "rgb", format!("{id}/Surface"), "diffuseColor")
}

// ============================================================================
// Prim lifecycle
// ============================================================================

#[test]
fn only_material_sprims_are_created() {
    let mut delegate = delegate();
    assert!(delegate.create_sprim("light", "/Sun").is_none());
    assert!(delegate.create_sprim("material", "/Looks/Mat").is_some());
    assert_eq!(delegate.material_count(), 1);
}

#[test]
fn bprims_are_accepted_and_ignored() {
    let mut delegate = delegate();
    delegate.create_bprim("renderBuffer", "/Buffers/Color");
    assert_eq!(delegate.mesh_count(), 0);
    assert_eq!(delegate.material_count(), 0);
}

#[test]
fn rprims_register_and_destroy() {
    let mut delegate = delegate();
    delegate
        .create_rprim("mesh", "/World/Tri", None)
        .update_points(&TRIANGLE);
    assert!(delegate.mesh("/World/Tri").is_some());

    let mesh = delegate.destroy_rprim("/World/Tri").unwrap();
    assert_eq!(mesh.id(), "/World/Tri");
    assert!(delegate.mesh("/World/Tri").is_none());
    assert!(delegate.destroy_rprim("/World/Tri").is_none());
}

#[test]
fn recreating_an_rprim_starts_fresh() {
    let mut delegate = delegate();
    let mesh = delegate.create_rprim("mesh", "/World/Tri", None);
    mesh.update_points(&TRIANGLE);
    mesh.update_indices(&[0, 1, 2]);

    let mesh = delegate.create_rprim("mesh", "/World/Tri", Some("/World/Instancer"));
    assert!(mesh.geometry().attributes().is_empty());
    assert_eq!(delegate.mesh_count(), 1);
}

#[test]
fn commit_resources_reaches_every_mesh() {
    let mut delegate = delegate();
    delegate.create_rprim("mesh", "/A", None);
    delegate.create_rprim("mesh", "/B", None);

    delegate.commit_resources();
    delegate.commit_resources();

    assert!(delegate.meshes().all(|mesh| mesh.commit_count() == 2));
}

// ============================================================================
// Surface materials
// ============================================================================

#[test]
fn unbound_mesh_draws_missing_material() {
    let mut delegate = delegate();
    delegate.create_rprim("mesh", "/World/Tri", None);

    let surface = delegate.surface_material("/World/Tri").unwrap();
    assert_eq!(surface.color(), MISSING_MATERIAL_COLOR);
    assert_eq!(surface.side(), Side::Double);
    assert!(delegate.surface_material("/Nope").is_none());
}

#[test]
fn bound_mesh_draws_resolved_material() {
    let mut delegate = delegate();
    delegate
        .create_sprim("material", "/Looks/Grey")
        .unwrap()
        .update_node("/Looks/Grey", "/Looks/Grey/Surface", bag(&[("diffuseColor", color(0.2, 0.2, 0.2))]));
    delegate.finalize_material("/Looks/Grey", "UsdPreviewSurface", &[]).unwrap();

    delegate.create_rprim("mesh", "/World/Tri", None);
    assert!(delegate.bind_material("/World/Tri", "/Looks/Grey").unwrap().is_empty());

    let surface = delegate.surface_material("/World/Tri").unwrap();
    assert!(surface.color().abs_diff_eq(Vec3::splat(0.2), 1e-6));
    assert_eq!(surface.bound_textures().count(), 0);
}

#[test]
fn bound_but_unresolved_material_draws_missing() {
    let mut delegate = delegate();
    delegate.create_sprim("material", "/Looks/Empty");
    delegate.finalize_material("/Looks/Empty", "UsdPreviewSurface", &[]).unwrap();

    delegate.create_rprim("mesh", "/World/Tri", None);
    delegate.bind_material("/World/Tri", "/Looks/Empty").unwrap();

    let surface = delegate.surface_material("/World/Tri").unwrap();
    assert_eq!(surface.color(), MISSING_MATERIAL_COLOR);
}

#[test]
fn binding_unknown_material_keeps_previous() {
    let mut delegate = delegate();
    delegate.create_sprim("material", "/Looks/A");
    delegate.create_rprim("mesh", "/World/Tri", None);
    delegate.bind_material("/World/Tri", "/Looks/A").unwrap();

    let diagnostics = delegate.bind_material("/World/Tri", "/Looks/Ghost").unwrap();
    assert!(diagnostics.has(DiagnosticKind::UnknownPrim));
    assert_eq!(
        delegate.mesh("/World/Tri").unwrap().material(),
        &MaterialBinding::Material("/Looks/A".to_string())
    );
}

#[test]
fn binding_to_unknown_mesh_is_an_error() {
    let mut delegate = delegate();
    delegate.create_sprim("material", "/Looks/A");
    let err = delegate.bind_material("/World/Ghost", "/Looks/A").unwrap_err();
    assert!(matches!(err, Error::UnknownPrim(ref id) if id == "/World/Ghost"));
}

#[test]
fn constant_display_color_overrides_a_copy() {
    let mut delegate = delegate();
    delegate
        .create_sprim("material", "/Looks/Shared")
        .unwrap()
        .update_node("/Looks/Shared", "/Looks/Shared/Surface", bag(&[("diffuseColor", color(0.5, 0.5, 0.5))]));
    delegate.finalize_material("/Looks/Shared", "UsdPreviewSurface", &[]).unwrap();

    for id in ["/World/Red", "/World/Plain"] {
        delegate.create_rprim("mesh", id, None);
        delegate.bind_material(id, "/Looks/Shared").unwrap();
    }
    delegate
        .mesh_mut("/World/Red")
        .unwrap()
        .update_primvar("displayColor", &[1.0, 0.0, 0.0], 3, Interpolation::Constant);

    assert_eq!(delegate.surface_material("/World/Red").unwrap().color(), Vec3::X);
    assert_eq!(
        delegate.surface_material("/World/Plain").unwrap().color(),
        Vec3::splat(0.5)
    );
    assert_eq!(
        delegate.material("/Looks/Shared").unwrap().resolved().unwrap().color(),
        Vec3::splat(0.5)
    );
}

#[test]
fn constant_display_color_replaces_vertex_colors() {
    let mut delegate = delegate();
    let mesh = delegate.create_rprim("mesh", "/World/Tri", None);
    mesh.update_points(&TRIANGLE);
    mesh.update_indices(&[0, 1, 2]);
    mesh.update_primvar("displayColor", &[0.0, 1.0, 0.0].repeat(3), 3, Interpolation::Vertex);
    mesh.update_primvar("displayColor", &[1.0, 0.0, 0.0], 3, Interpolation::Constant);

    let mesh = delegate.mesh("/World/Tri").unwrap();
    assert!(mesh.geometry().get_attribute("color").is_none());

    let surface = delegate.surface_material("/World/Tri").unwrap();
    assert_eq!(surface.color(), Vec3::X);
    assert!(!surface.vertex_colors());
}

#[test]
fn vertex_display_color_on_missing_material_is_white() {
    let mut delegate = delegate();
    let mesh = delegate.create_rprim("mesh", "/World/Tri", None);
    mesh.update_points(&TRIANGLE);
    mesh.update_indices(&[0, 1, 2]);
    mesh.update_primvar("displayColor", &[0.0, 1.0, 0.0].repeat(3), 3, Interpolation::Vertex);

    let surface = delegate.surface_material("/World/Tri").unwrap();
    assert!(surface.vertex_colors());
    assert_eq!(surface.color(), Vec3::ONE);
    assert_eq!(delegate.missing_material().color(), MISSING_MATERIAL_COLOR);
}

#[test]
fn vertex_display_color_keeps_resolved_base_color() {
    let mut delegate = delegate();
    delegate
        .create_sprim("material", "/Looks/Tint")
        .unwrap()
        .update_node("/Looks/Tint", "/Looks/Tint/Surface", bag(&[("diffuseColor", color(0.5, 0.5, 0.5))]));
    delegate.finalize_material("/Looks/Tint", "UsdPreviewSurface", &[]).unwrap();

    let mesh = delegate.create_rprim("mesh", "/World/Tri", None);
    mesh.update_primvar("displayColor", &[0.0, 1.0, 0.0].repeat(3), 3, Interpolation::Vertex);
    delegate.bind_material("/World/Tri", "/Looks/Tint").unwrap();

    let surface = delegate.surface_material("/World/Tri").unwrap();
    assert!(surface.vertex_colors());
    assert_eq!(surface.color(), Vec3::splat(0.5));
}

// ============================================================================
// Texture loads
// ============================================================================

#[test]
fn finalizing_unknown_material_is_an_error() {
    let mut delegate = delegate();
    let err = delegate
        .finalize_material("/Looks/Ghost", "UsdPreviewSurface", &[])
        .unwrap_err();
    assert!(matches!(err, Error::UnknownPrim(_)));
}

#[test]
fn scheduled_loads_apply_on_processing() {
    let mut delegate = delegate();
    textured_material(&mut delegate, "/Looks/Wood");
    delegate.create_rprim("mesh", "/World/Table", None);
    delegate.bind_material("/World/Table", "/Looks/Wood").unwrap();

    let diagnostics = delegate
        .finalize_material("/Looks/Wood", "UsdPreviewSurface", &[albedo_wire("/Looks/Wood")])
        .unwrap();
    assert!(diagnostics.is_empty());
    assert_eq!(delegate.pending_texture_loads(), 1);

    // Nothing lands until the host processes loads.
    let before = delegate.surface_material("/World/Table").unwrap();
    assert!(before.texture(TextureSlot::Map).is_none());

    let diagnostics = delegate.process_texture_loads();
    assert!(diagnostics.is_empty());
    assert_eq!(delegate.pending_texture_loads(), 0);

    let after = delegate.surface_material("/World/Table").unwrap();
    let map = after.texture(TextureSlot::Map).unwrap();
    assert_eq!(map.name, "textures/albedo.png");
    assert_eq!(map.image.width(), 2);
}

#[test]
fn materials_sharing_a_file_fetch_it_once() {
    let mut delegate = delegate();
    for id in ["/Looks/A", "/Looks/B"] {
        textured_material(&mut delegate, id);
        delegate
            .finalize_material(id, "UsdPreviewSurface", &[albedo_wire(id)])
            .unwrap();
    }
    delegate.finish_texture_loads();

    assert_eq!(delegate.backend().request_count("textures/albedo.png"), 1);
    let a = delegate.material("/Looks/A").unwrap().resolved().unwrap();
    let b = delegate.material("/Looks/B").unwrap().resolved().unwrap();
    assert!(
        a.texture(TextureSlot::Map)
            .unwrap()
            .shares_image(b.texture(TextureSlot::Map).unwrap())
    );
}

#[test]
fn newer_finalize_supersedes_pending_binds() {
    let mut delegate = delegate();
    textured_material(&mut delegate, "/Looks/Wood");
    delegate
        .finalize_material("/Looks/Wood", "UsdPreviewSurface", &[albedo_wire("/Looks/Wood")])
        .unwrap();
    // Texture removed before the first load ran.
    delegate
        .finalize_material("/Looks/Wood", "UsdPreviewSurface", &[])
        .unwrap();

    let diagnostics = delegate.finish_texture_loads();
    assert!(diagnostics.has(DiagnosticKind::StaleTextureBinding));

    let resolved = delegate.material("/Looks/Wood").unwrap().resolved().unwrap();
    assert!(resolved.texture(TextureSlot::Map).is_none());
}

#[test]
fn destroyed_material_drops_its_loads() {
    let mut delegate = delegate();
    textured_material(&mut delegate, "/Looks/Wood");
    delegate
        .finalize_material("/Looks/Wood", "UsdPreviewSurface", &[albedo_wire("/Looks/Wood")])
        .unwrap();
    assert!(delegate.destroy_sprim("/Looks/Wood").is_some());

    let diagnostics = delegate.finish_texture_loads();
    assert!(diagnostics.is_empty());
    assert_eq!(delegate.pending_texture_loads(), 0);
}

#[test]
fn recreated_material_ignores_predecessor_loads() {
    let mut delegate = delegate();
    textured_material(&mut delegate, "/Looks/Wood");
    delegate
        .finalize_material("/Looks/Wood", "UsdPreviewSurface", &[albedo_wire("/Looks/Wood")])
        .unwrap();
    delegate.destroy_sprim("/Looks/Wood");

    delegate
        .create_sprim("material", "/Looks/Wood")
        .unwrap()
        .update_node("/Looks/Wood", "/Looks/Wood/Surface", bag(&[("diffuseColor", color(0.1, 0.1, 0.1))]));
    delegate
        .finalize_material("/Looks/Wood", "UsdPreviewSurface", &[])
        .unwrap();

    let diagnostics = delegate.finish_texture_loads();
    assert!(diagnostics.has(DiagnosticKind::StaleTextureBinding));
    let resolved = delegate.material("/Looks/Wood").unwrap().resolved().unwrap();
    assert!(resolved.texture(TextureSlot::Map).is_none());
}

#[test]
fn missing_texture_is_reported_when_processed() {
    let mut delegate = delegate();
    let material = delegate.create_sprim("material", "/Looks/Broken").unwrap();
    material.update_node("/Looks/Broken", "/Looks/Broken/Tex", bag(&[("file", file("missing.png"))]));
    material.update_node("/Looks/Broken", "/Looks/Broken/Surface", bag(&[("diffuseColor", color(1.0, 1.0, 1.0))]));
    delegate
        .finalize_material(
            "/Looks/Broken",
            "UsdPreviewSurface",
            &[Relationship::new("/Looks/Broken/Tex", "rgb", "/Looks/Broken/Surface", "diffuseColor")],
        )
        .unwrap();

    let diagnostics = delegate.finish_texture_loads();
    assert!(diagnostics.has(DiagnosticKind::TextureLoadFailed));
    assert!(!delegate.material("/Looks/Broken").unwrap().is_missing());
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn sessions_do_not_share_state() {
    let mut first = delegate();
    let mut second = delegate();

    for delegate in [&mut first, &mut second] {
        textured_material(delegate, "/Looks/Wood");
        delegate
            .finalize_material("/Looks/Wood", "UsdPreviewSurface", &[albedo_wire("/Looks/Wood")])
            .unwrap();
        delegate.finish_texture_loads();
    }

    assert_eq!(first.backend().request_count("textures/albedo.png"), 1);
    assert_eq!(second.backend().request_count("textures/albedo.png"), 1);

    first.destroy_sprim("/Looks/Wood");
    assert!(second.material("/Looks/Wood").is_some());
}

#[test]
fn settings_from_source_file_set_fallback_root() {
    let delegate = RenderDelegate::new(
        SessionSettings::from_source_file("https://cdn.example.com/scenes/kitchen.usdz"),
        Rc::new(NullBackend),
    );
    assert_eq!(delegate.settings().base_url.as_deref(), Some("https://cdn.example.com/scenes"));
}
