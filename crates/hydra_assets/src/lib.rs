//! # Hydra Assets
//!
//! Asset IO and texture resolution:
//!
//! - [`io`]: the host asset backend contract and direct readers used as a fallback
//! - [`file_type`]: extension based classification of texture files
//! - [`resolver`]: the single-flight [`TextureResolver`]

pub mod file_type;
pub mod io;
pub mod resolver;

pub use file_type::{FileType, Support};
pub use io::{AssetBackend, AssetReader, AssetReaderVariant, FileAssetReader, MemoryBackend, NullBackend};
pub use resolver::{TextureFuture, TextureRequest, TextureResolver, TextureResult};
