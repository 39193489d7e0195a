//! Sync Scene
//!
//! Replays the update stream a scene delegate sends for a small scene (one
//! textured quad and one vertex-colored triangle) and prints the buffers
//! and materials a renderer would receive.
//!
//! Run with: RUST_LOG=debug cargo run --example sync_scene

use std::io::Cursor;
use std::rc::Rc;

use hydra_sync::prelude::*;

fn checker_png() -> anyhow::Result<Vec<u8>> {
    let img = image::RgbaImage::from_fn(8, 8, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([240, 240, 240, 255])
        } else {
            image::Rgba([30, 30, 30, 128])
        }
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let backend = Rc::new(MemoryBackend::new());
    backend.insert("textures/checker.png", checker_png()?);

    let settings = SessionSettings::from_source_file("scenes/demo.usda");
    let mut delegate = RenderDelegate::new(settings, backend);

    // Material: checker albedo whose alpha drives opacity.
    let material = delegate
        .create_sprim("material", "/Looks/Checker")
        .ok_or_else(|| anyhow::anyhow!("material sprim rejected"))?;
    material.update_node(
        "/Looks/Checker",
        "/Looks/Checker/Tex",
        ParameterBag::from_iter([("file".to_string(), ParamValue::from("textures/checker.png"))]),
    );
    material.update_node(
        "/Looks/Checker",
        "/Looks/Checker/Surface",
        ParameterBag::from_iter([
            ("diffuseColor".to_string(), ParamValue::Vector(vec![1.0, 1.0, 1.0])),
            ("roughness".to_string(), ParamValue::Float(0.4)),
        ]),
    );
    let diagnostics = delegate.finalize_material(
        "/Looks/Checker",
        "UsdPreviewSurface",
        &[
            Relationship::new("/Looks/Checker/Tex", "rgb", "/Looks/Checker/Surface", "diffuseColor"),
            Relationship::new("/Looks/Checker/Tex", "a", "/Looks/Checker/Surface", "opacity"),
        ],
    )?;
    println!("finalize: {} diagnostics", diagnostics.len());

    // Quad with per-vertex UVs.
    let quad = delegate.create_rprim("mesh", "/World/Quad", None);
    quad.update_points(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
    quad.update_indices(&[0, 1, 2, 0, 2, 3]);
    quad.update_primvar("st", &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0], 2, Interpolation::Vertex);
    #[rustfmt::skip]
    let row_major = [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        2.0, 0.0, 0.0, 1.0,
    ];
    quad.set_transform(&row_major);
    delegate.bind_material("/World/Quad", "/Looks/Checker")?;

    // Triangle with vertex colors and no material.
    let tri = delegate.create_rprim("mesh", "/World/Tri", None);
    tri.update_points(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    tri.update_indices(&[0, 1, 2]);
    tri.update_primvar(
        "displayColor",
        &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        3,
        Interpolation::Vertex,
    );
    let skipped = tri.update_primvar("velocities", &[0.0; 9], 3, Interpolation::Vertex);
    println!("velocities: {} diagnostics", skipped.len());

    delegate.commit_resources();
    let diagnostics = delegate.finish_texture_loads();
    println!("texture loads: {} diagnostics", diagnostics.len());

    for id in ["/World/Quad", "/World/Tri"] {
        let (Some(mesh), Some(surface)) = (delegate.mesh(id), delegate.surface_material(id)) else {
            continue;
        };
        println!("{id}");
        println!("  vertices: {}", mesh.geometry().vertex_count());
        let mut names: Vec<_> = mesh.geometry().attributes().keys().collect();
        names.sort();
        println!("  attributes: {names:?}");
        println!("  translation: {}", mesh.transform().w_axis.truncate());
        println!(
            "  material: color {} transparent {} vertex colors {}",
            surface.color(),
            surface.transparent(),
            surface.vertex_colors()
        );
        for (slot, texture) in surface.bound_textures() {
            println!(
                "  {}: {} ({}x{}, {:?})",
                slot.name(),
                texture.name,
                texture.image.width(),
                texture.image.height(),
                texture.format()
            );
        }
    }

    Ok(())
}
