use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// Global Image ID generator
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct ImageInner {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels.
    pub data: Vec<u8>,
}

/// Decoded pixel data, shared between every texture cloned from it.
#[derive(Debug, Clone)]
pub struct Image(Arc<ImageInner>);

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Image {}

impl Image {
    #[must_use]
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self(Arc::new(ImageInner {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            data,
        }))
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.0.data
    }
}
