use std::cell::RefCell;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use futures::channel::oneshot;
use hydra_core::{Result, TextureError};
use rustc_hash::FxHashMap;

/// Asset backend provided by the host.
///
/// `get_file` resolves to the raw bytes of a logical resource path, or
/// `None` when this backend does not have the file. An empty buffer is
/// treated the same as `None`.
pub trait AssetBackend: 'static {
    fn get_file(&self, path: &str) -> impl Future<Output = Option<Vec<u8>>>;
}

/// Backend that never has any file; every texture goes through the fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl AssetBackend for NullBackend {
    fn get_file(&self, _path: &str) -> impl Future<Output = Option<Vec<u8>>> {
        std::future::ready(None)
    }
}

/// In-memory backend, for hosts that unpack a scene archive up front.
///
/// Counts requests per path so callers can observe how often the
/// resolver went to the backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: RefCell<FxHashMap<String, Vec<u8>>>,
    requests: RefCell<FxHashMap<String, usize>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.borrow_mut().insert(path.into(), bytes);
    }

    /// Number of `get_file` calls made for `path`.
    #[must_use]
    pub fn request_count(&self, path: &str) -> usize {
        self.requests.borrow().get(path).copied().unwrap_or(0)
    }

    /// Total number of `get_file` calls.
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.requests.borrow().values().sum()
    }
}

impl AssetBackend for MemoryBackend {
    fn get_file(&self, path: &str) -> impl Future<Output = Option<Vec<u8>>> {
        *self.requests.borrow_mut().entry(path.to_string()).or_default() += 1;
        std::future::ready(self.files.borrow().get(path).cloned())
    }
}

/// Direct reader used when the backend has no file.
pub trait AssetReader {
    /// Reads the bytes of `uri`, relative to the reader's root.
    fn read_bytes(&self, uri: &str) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Local file reader
#[derive(Debug)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        // Read on a helper thread so the session's executor keeps polling
        // other loads. No runtime is assumed.
        let (tx, rx) = oneshot::channel();
        std::thread::Builder::new()
            .name("hydra-file-read".into())
            .spawn(move || {
                let _ = tx.send(std::fs::read(&path));
            })?;
        let data = rx
            .await
            .map_err(|_| std::io::Error::other("file read thread exited"))??;
        Ok(data)
    }
}

/// HTTP reader (conditional compilation)
#[cfg(feature = "http")]
#[derive(Debug)]
pub struct HttpAssetReader {
    root_url: String,
}

#[cfg(feature = "http")]
impl HttpAssetReader {
    pub fn new(url: &str) -> Self {
        Self {
            root_url: url.trim_end_matches('/').to_string(),
        }
    }

    #[inline]
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// `base + "/" + path`
    #[must_use]
    pub fn url_for(&self, uri: &str) -> String {
        format!("{}/{}", self.root_url, uri)
    }
}

#[cfg(feature = "http")]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let url = self.url_for(uri);
        let response = ehttp::fetch_async(ehttp::Request::get(&url))
            .await
            .map_err(|message| TextureError::Fetch {
                uri: url.clone(),
                message,
            })?;
        if !response.ok {
            return Err(TextureError::Fetch {
                uri: url,
                message: format!("HTTP {} {}", response.status, response.status_text),
            }
            .into());
        }
        Ok(response.bytes)
    }
}

/// Reader variants, dispatched without trait objects.
#[derive(Debug, Clone)]
pub enum AssetReaderVariant {
    File(Rc<FileAssetReader>),
    #[cfg(feature = "http")]
    Http(Rc<HttpAssetReader>),
}

impl AssetReaderVariant {
    /// Picks a reader for a base path or URL.
    pub fn from_source(source: &str) -> std::result::Result<Self, TextureError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            #[cfg(feature = "http")]
            {
                Ok(Self::Http(Rc::new(HttpAssetReader::new(source))))
            }
            #[cfg(not(feature = "http"))]
            {
                Err(TextureError::FeatureNotEnabled(
                    "HTTP feature is not enabled. Enable it with `features = [\"http\"]`".to_string(),
                ))
            }
        } else {
            Ok(Self::File(Rc::new(FileAssetReader::new(source))))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            #[cfg(feature = "http")]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }

    /// Human readable location of `uri` for logs and errors.
    #[must_use]
    pub fn describe(&self, uri: &str) -> String {
        match self {
            Self::File(r) => r.root_path().join(uri).display().to_string(),
            #[cfg(feature = "http")]
            Self::Http(r) => r.url_for(uri),
        }
    }
}
