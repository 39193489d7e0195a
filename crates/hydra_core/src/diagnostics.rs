//! Structured diagnostics.
//!
//! Every path that skips or degrades work (instead of failing) produces a
//! [`Diagnostic`]. Diagnostics are returned to the caller so hosts and tests
//! can assert on them, and are logged at the level that matches their kind
//! when they are recorded.

use std::fmt;

use smallvec::SmallVec;

/// What kind of skip or degradation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Mesh
    /// A primvar name the renderer has no attribute for.
    UnsupportedPrimvar,
    /// A known primvar with an interpolation mode that is not handled.
    UnsupportedInterpolation,
    /// A primvar dimension of zero.
    InvalidDimension,
    /// The index list references a control point the attribute does not have.
    IndexOutOfRange,

    // Material
    /// A texture channel the flat material schema does not accept.
    UnsupportedTextureChannel,
    /// An opacity map that is not the base color map's alpha channel.
    AlphaExtractionUnsupported,
    /// A relationship naming a node that was never updated.
    UnknownNode,
    /// A literal whose shape does not match the target property.
    PropertyTypeMismatch,
    /// A wired texture node without a `file` parameter.
    MissingTextureFile,
    /// A texture binding that arrived after a newer finalize.
    StaleTextureBinding,
    /// A texture whose resolution failed; the slot stays empty.
    TextureLoadFailed,

    // Assets
    /// A recognised file type with limited support (EXR, TGA).
    DegradedFileType,
    /// A file extension that could not be classified.
    UnknownFileType,

    // Delegate
    /// An update addressed to an id that is not registered.
    UnknownPrim,
}

impl DiagnosticKind {
    /// Log level used when a diagnostic of this kind is recorded.
    #[must_use]
    pub fn level(self) -> log::Level {
        match self {
            Self::UnknownFileType | Self::TextureLoadFailed => log::Level::Error,
            Self::UnsupportedPrimvar | Self::StaleTextureBinding => log::Level::Debug,
            _ => log::Level::Warn,
        }
    }
}

/// A single skip or degradation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Human readable context: the primvar, slot, path or id involved.
    pub context: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }

    /// Writes the diagnostic to the `log` facade.
    pub fn log(&self) {
        log::log!(self.kind.level(), "{self}");
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

/// An ordered list of diagnostics produced by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(SmallVec<[Diagnostic; 2]>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records and logs a diagnostic.
    pub fn push(&mut self, kind: DiagnosticKind, context: impl Into<String>) {
        self.record(Diagnostic::new(kind, context));
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.0.push(diagnostic);
    }

    /// Appends already-logged diagnostics.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if any diagnostic of `kind` was recorded.
    #[must_use]
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.0.iter().any(|d| d.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = smallvec::IntoIter<[Diagnostic; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        diagnostic.log();
        let mut list = SmallVec::new();
        list.push(diagnostic);
        Self(list)
    }
}
