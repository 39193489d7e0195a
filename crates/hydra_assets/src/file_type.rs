use hydra_core::{DiagnosticKind, Diagnostics};
use image::ImageFormat;

/// Texture container classified from a resource path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Png,
    Jpeg,
    Exr,
    Tga,
    Unknown,
}

/// How well a file type is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Support {
    Full,
    /// Recognised, loaded best-effort.
    Degraded,
    /// Not recognised; loading is still attempted.
    Unknown,
}

impl FileType {
    #[must_use]
    pub fn classify(path: &str) -> Self {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return Self::Unknown;
        };
        match extension.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "exr" => Self::Exr,
            "tga" => Self::Tga,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn support(self) -> Support {
        match self {
            Self::Png | Self::Jpeg => Support::Full,
            Self::Exr | Self::Tga => Support::Degraded,
            Self::Unknown => Support::Unknown,
        }
    }

    #[must_use]
    pub fn mime(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            Self::Exr => Some("image/x-exr"),
            Self::Tga => Some("image/tga"),
            Self::Unknown => None,
        }
    }

    /// Decoder hint for formats that cannot be sniffed reliably.
    #[must_use]
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Png => Some(ImageFormat::Png),
            Self::Jpeg => Some(ImageFormat::Jpeg),
            Self::Exr => Some(ImageFormat::OpenExr),
            Self::Tga => Some(ImageFormat::Tga),
            Self::Unknown => None,
        }
    }

    /// Records the degraded-support signal for `path`, if any.
    pub fn report(self, path: &str, diagnostics: &mut Diagnostics) {
        match self.support() {
            Support::Full => {}
            Support::Degraded => diagnostics.push(
                DiagnosticKind::DegradedFileType,
                format!("{self:?} textures are not fully supported yet: {path}"),
            ),
            Support::Unknown => diagnostics.push(
                DiagnosticKind::UnknownFileType,
                format!("Unknown texture filetype: {path}"),
            ),
        }
    }
}
