//! # Hydra Core
//!
//! Foundational types shared by every hydra-sync crate:
//!
//! - [`errors`]: the [`Error`] and [`TextureError`] types
//! - [`diagnostics`]: structured skip/degrade reports returned to callers
//! - [`settings`]: per-session configuration

pub mod diagnostics;
pub mod errors;
pub mod settings;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use errors::{Error, Result, TextureError};
pub use settings::SessionSettings;
