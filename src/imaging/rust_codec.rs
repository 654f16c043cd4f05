//! Pure Rust codec built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::ImageReader` with content sniffing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless, quality ignored) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless, quality ignored) |
//!
//! JPEG has no alpha channel, so surfaces are flattened to RGB before
//! encoding. PNG and WebP keep RGBA.

use super::codec::{CodecError, ImageCodec, RasterSurface};
use super::format::TargetFormat;
use super::params::Quality;
use image::{ExtendedColorType, ImageEncoder, ImageReader};
use std::io::Cursor;

/// Production codec. Stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for RustCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RasterSurface, CodecError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        if reader.format().is_none() {
            return Err(CodecError::Decode("unrecognised image data".into()));
        }
        reader
            .decode()
            .map(RasterSurface::from_image)
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode(
        &self,
        surface: &RasterSurface,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        let img = surface.image();
        let mut buffer = Vec::new();
        let result = match format {
            TargetFormat::Jpeg => {
                let rgb = img.to_rgb8();
                image::codecs::jpeg::JpegEncoder::new_with_quality(
                    Cursor::new(&mut buffer),
                    quality.value(),
                )
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
            }
            TargetFormat::Png => {
                let rgba = img.to_rgba8();
                image::codecs::png::PngEncoder::new(Cursor::new(&mut buffer)).write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    ExtendedColorType::Rgba8,
                )
            }
            TargetFormat::Webp => {
                let rgba = img.to_rgba8();
                image::codecs::webp::WebPEncoder::new_lossless(Cursor::new(&mut buffer))
                    .write_image(
                        rgba.as_raw(),
                        rgba.width(),
                        rgba.height(),
                        ExtendedColorType::Rgba8,
                    )
            }
        };
        result.map_err(|e| CodecError::Encode(format!("{} encode failed: {e}", format.label())))?;
        Ok(buffer)
    }
}
