//! Supported raster encodings.
//!
//! Conversion targets are a closed set: PNG, JPEG and WebP. Resize keeps the
//! source's own encoding, which is detected from the file's magic bytes and
//! only falls back to the extension when the content is not recognisable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A raster encoding the pipeline can produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 3] = [Self::Png, Self::Jpeg, Self::Webp];

    /// Extension written on output files. `jpg` and `jpeg` requests both write `.jpg`.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WebP",
        }
    }

    /// Map a file extension (any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Detect the encoding of `bytes`, falling back to the extension of `file_name`.
    pub fn detect(bytes: &[u8], file_name: &str) -> Option<Self> {
        let guessed = image::guess_format(bytes)
            .ok()
            .and_then(|guess| Self::ALL.into_iter().find(|f| f.image_format() == guess));
        guessed.or_else(|| {
            file_name
                .rsplit_once('.')
                .and_then(|(_, ext)| Self::from_extension(ext))
        })
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| {
            format!("unsupported image format: {s} (expected png, jpeg or webp)")
        })
    }
}
