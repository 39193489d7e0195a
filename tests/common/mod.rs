//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use hydra_sync::ParamValue;
use hydra_sync::hydra_delegate::ParameterBag;

/// Encodes a solid `width` x `height` PNG.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub fn bag(entries: &[(&str, ParamValue)]) -> ParameterBag {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

pub fn color(r: f32, g: f32, b: f32) -> ParamValue {
    ParamValue::Vector(vec![r, g, b])
}

pub fn file(path: &str) -> ParamValue {
    ParamValue::String(path.to_string())
}

/// Unique scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("hydra_sync_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
