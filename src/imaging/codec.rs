//! Codec capability trait and shared types.
//!
//! The [`ImageCodec`] trait is the only platform dependency of the pipeline:
//! turning bytes into a [`RasterSurface`] and back. Everything above it
//! (conversion, resizing, batching) is written against the trait, so it can
//! run against the production [`RustCodec`](super::rust_codec::RustCodec) or
//! a recording mock.

use super::format::TargetFormat;
use super::params::{Dimensions, Quality, ResizeFilter};
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// In-memory pixel buffer between decode and encode.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: DynamicImage,
}

impl RasterSurface {
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }

    /// A transparent surface of the given size.
    pub fn blank(dims: Dimensions) -> Self {
        Self::from_image(DynamicImage::new_rgba8(dims.width, dims.height))
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    /// Redraw into a surface of exactly `target` pixels. Aspect ratio is not preserved.
    pub fn scaled(&self, target: Dimensions, filter: ResizeFilter) -> Self {
        if self.dimensions() == target {
            return self.clone();
        }
        Self::from_image(
            self.image
                .resize_exact(target.width, target.height, filter.filter_type()),
        )
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Decode/encode capability.
///
/// `Sync` so a single codec can be shared across rayon workers.
pub trait ImageCodec: Sync {
    /// Decode arbitrary bytes into a surface at the image's native size.
    fn decode(&self, bytes: &[u8]) -> Result<RasterSurface, CodecError>;

    /// Encode a surface. An empty result is treated as an encoder failure by callers.
    fn encode(
        &self,
        surface: &RasterSurface,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;
}
