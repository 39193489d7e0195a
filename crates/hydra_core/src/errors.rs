//! Error Types
//!
//! This module defines the error types used throughout the synchronization
//! layer.
//!
//! # Overview
//!
//! Nothing in this layer is fatal to the session. Failures are scoped to a
//! single texture, material or mesh:
//!
//! - [`TextureError`] is carried by shared texture futures, so it is `Clone`
//!   and every waiter on the same resource path sees the same rejection.
//! - [`Error`] is the umbrella type for the fallible host-facing APIs.
//!
//! Skips that are not failures (unsupported primvars, channels, file types)
//! are reported through [`crate::diagnostics`] instead.

use thiserror::Error;

/// Failure of a single texture resolution.
///
/// The variants are distinct kinds so callers can tell an empty resource
/// path (a configuration error detected before anything is cached) apart
/// from a path that simply could not be found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// The resource path was empty.
    #[error("Empty resource path for file at {scene}")]
    EmptyPath {
        /// Name of the scene that owns the resolver.
        scene: String,
    },

    /// The asset backend has no such file and no base URL is configured.
    #[error("Unknown file: {path}")]
    UnknownFile {
        /// The logical resource path.
        path: String,
    },

    /// The direct fetch through the base URL failed.
    #[error("Failed to fetch {uri}: {message}")]
    Fetch {
        /// The full URI that was requested.
        uri: String,
        /// Reader error message.
        message: String,
    },

    /// The bytes could not be decoded as an image.
    #[error("Failed to decode texture {path}: {message}")]
    Decode {
        /// The logical resource path.
        path: String,
        /// Decoder error message.
        message: String,
    },

    /// A reader needed for the fallback is compiled out.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

/// The main error type of the synchronization layer.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// A texture could not be resolved.
    #[error(transparent)]
    Texture(#[from] TextureError),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Delegate Errors
    // ========================================================================
    /// No prim with the given id is registered.
    #[error("Unknown prim: {0}")]
    UnknownPrim(String),

    /// A background task could not be scheduled.
    #[error("Task spawn error: {0}")]
    TaskSpawn(String),
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
