//! Texture Resolver
//!
//! Resolves logical resource paths to decoded [`Texture`]s.
//!
//! Every distinct path gets exactly one cache entry for the lifetime of the
//! resolver: a [`Shared`] future that is handed out to every caller. The
//! fetch and decode run once, when the entry is first polled, and the
//! outcome (success or failure) is what every later caller observes. A
//! failed path is never retried.
//!
//! Loading a path works in three steps:
//!
//! 1. Ask the host [`AssetBackend`] for the bytes.
//! 2. If it has none, read `base_url/path` through the fallback reader, or
//!    fail with [`TextureError::UnknownFile`] when no base URL is configured.
//! 3. Decode the bytes and tag the texture with its path.

use std::rc::Rc;
use std::sync::Arc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use hydra_core::{Diagnostics, SessionSettings, TextureError};
use hydra_resources::{Image, Texture};
use rustc_hash::FxHashMap;

use crate::file_type::FileType;
use crate::io::{AssetBackend, AssetReaderVariant};

pub type TextureResult = Result<Arc<Texture>, TextureError>;

/// Single-flight handle to a texture that may still be loading.
pub type TextureFuture = Shared<LocalBoxFuture<'static, TextureResult>>;

/// Outcome of [`TextureResolver::resolve`].
pub struct TextureRequest {
    pub future: TextureFuture,
    /// `true` if the entry already existed.
    pub cached: bool,
    /// File type signals; only produced when the entry is created.
    pub diagnostics: Diagnostics,
}

type Fallback = Option<Result<AssetReaderVariant, TextureError>>;

pub struct TextureResolver<B: AssetBackend> {
    scene_name: String,
    backend: Rc<B>,
    fallback: Fallback,
    cache: FxHashMap<String, TextureFuture>,
}

impl<B: AssetBackend> TextureResolver<B> {
    pub fn new(settings: &SessionSettings, backend: Rc<B>) -> Self {
        let fallback = settings.base_url.as_deref().map(|base_url| {
            AssetReaderVariant::from_source(base_url).inspect_err(|err| {
                log::warn!("Texture fallback for {base_url} is unavailable: {err}");
            })
        });
        Self {
            scene_name: settings.scene_name.clone(),
            backend,
            fallback,
            cache: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn backend(&self) -> &Rc<B> {
        &self.backend
    }

    /// Returns the cache entry for `path`, creating it on first request.
    ///
    /// An empty path fails immediately and is never cached.
    pub fn resolve(&mut self, path: &str) -> Result<TextureRequest, TextureError> {
        if path.is_empty() {
            return Err(TextureError::EmptyPath {
                scene: self.scene_name.clone(),
            });
        }

        if let Some(future) = self.cache.get(path) {
            return Ok(TextureRequest {
                future: future.clone(),
                cached: true,
                diagnostics: Diagnostics::new(),
            });
        }

        let file_type = FileType::classify(path);
        log::debug!(
            "Resolving texture {path} ({})",
            file_type.mime().unwrap_or("unknown type")
        );
        let mut diagnostics = Diagnostics::new();
        file_type.report(path, &mut diagnostics);

        let future = load_texture(
            Rc::clone(&self.backend),
            self.fallback.clone(),
            path.to_string(),
            file_type,
        )
        .boxed_local()
        .shared();
        self.cache.insert(path.to_string(), future.clone());

        Ok(TextureRequest {
            future,
            cached: false,
            diagnostics,
        })
    }

    #[must_use]
    pub fn is_cached(&self, path: &str) -> bool {
        self.cache.contains_key(path)
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

async fn load_texture<B: AssetBackend>(
    backend: Rc<B>,
    fallback: Fallback,
    path: String,
    file_type: FileType,
) -> TextureResult {
    let fetched = backend.get_file(&path).await;
    let bytes = match fetched {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => match fallback {
            Some(Ok(reader)) => {
                // Not part of the backend's file system; try the network.
                log::info!("File not found in asset backend, trying to fetch {path}");
                reader
                    .read_bytes(&path)
                    .await
                    .map_err(|err| match err {
                        hydra_core::Error::Texture(err) => err,
                        other => TextureError::Fetch {
                            uri: reader.describe(&path),
                            message: other.to_string(),
                        },
                    })?
            }
            Some(Err(err)) => return Err(err),
            None => return Err(TextureError::UnknownFile { path }),
        },
    };

    let image = decode_image(&bytes, file_type, &path)?;
    log::debug!("Loaded texture {path} ({}x{})", image.width(), image.height());
    Ok(Arc::new(Texture::new(&path, image)))
}

/// Decodes to RGBA8, sniffing the container first and falling back to the
/// extension hint for formats without a magic number.
fn decode_image(bytes: &[u8], file_type: FileType, path: &str) -> Result<Image, TextureError> {
    let decoded = image::load_from_memory(bytes).or_else(|err| match file_type.image_format() {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => Err(err),
    });

    let img = decoded.map_err(|err| TextureError::Decode {
        path: path.to_string(),
        message: err.to_string(),
    })?;

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::new(width, height, rgba.into_raw()))
}
