//! High-level image operations.
//!
//! Each function takes a codec, a staged file and a target, and returns an
//! encoded [`Blob`]. Nothing here touches the filesystem; emitting the blob is
//! the caller's job.

use super::codec::{CodecError, ImageCodec};
use super::format::TargetFormat;
use super::params::{Dimensions, Quality, ResizeFilter};
use crate::staging::StagedFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("could not decode {file}: {reason}")]
    Decode { file: String, reason: String },
    #[error("could not encode {file}: {reason}")]
    Encode { file: String, reason: String },
    #[error("invalid target size {width}x{height}: both sides must be positive")]
    InvalidDimension { width: u32, height: u32 },
}

impl ConvertError {
    fn from_codec(file: &str, err: CodecError) -> Self {
        match err {
            CodecError::Decode(reason) => Self::Decode {
                file: file.to_string(),
                reason,
            },
            CodecError::Encode(reason) => Self::Encode {
                file: file.to_string(),
                reason,
            },
        }
    }

    /// Short category name for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::InvalidDimension { .. } => "invalid-dimension",
        }
    }
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Encoded output with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub format: TargetFormat,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

fn encode_checked(
    codec: &impl ImageCodec,
    file: &StagedFile,
    surface: &super::codec::RasterSurface,
    format: TargetFormat,
    quality: Quality,
) -> Result<Blob> {
    let bytes = codec
        .encode(surface, format, quality)
        .map_err(|e| ConvertError::from_codec(file.name(), e))?;
    if bytes.is_empty() {
        return Err(ConvertError::Encode {
            file: file.name().to_string(),
            reason: format!("{} encoder produced no output", format.label()),
        });
    }
    Ok(Blob { bytes, format })
}

/// Re-encode `file` to `target` at its native size.
pub fn convert(
    codec: &impl ImageCodec,
    file: &StagedFile,
    target: TargetFormat,
    quality: Quality,
) -> Result<Blob> {
    let surface = codec
        .decode(file.bytes())
        .map_err(|e| ConvertError::from_codec(file.name(), e))?;
    encode_checked(codec, file, &surface, target, quality)
}

/// Redraw `file` at exactly `target` pixels and re-encode it in its own encoding.
///
/// The output encoding follows the file extension, so `photo_resized.jpg` is
/// always a JPEG. Content sniffing only applies when the extension names no
/// supported encoding. Sources whose encoding cannot be determined fail as
/// decode errors.
pub fn resize(
    codec: &impl ImageCodec,
    file: &StagedFile,
    target: Dimensions,
    filter: ResizeFilter,
    quality: Quality,
) -> Result<Blob> {
    if !target.is_drawable() {
        return Err(ConvertError::InvalidDimension {
            width: target.width,
            height: target.height,
        });
    }
    let surface = codec
        .decode(file.bytes())
        .map_err(|e| ConvertError::from_codec(file.name(), e))?;
    let format = file.source_format().ok_or_else(|| ConvertError::Decode {
        file: file.name().to_string(),
        reason: "unknown source encoding".into(),
    })?;
    let scaled = surface.scaled(target, filter);
    encode_checked(codec, file, &scaled, format, quality)
}
