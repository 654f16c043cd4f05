//! Shared test utilities: synthetic images encoded in memory.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let file = staged_jpeg("holiday.jpg", 64, 48);
//! assert_eq!(file.source_format(), Some(TargetFormat::Jpeg));
//! ```

use crate::staging::StagedFile;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

/// Horizontal red ramp, vertical green ramp, constant blue.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

pub fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(
            gradient(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            gradient(width, height).as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        )
        .unwrap();
    out
}

pub fn staged_jpeg(name: &str, width: u32, height: u32) -> StagedFile {
    StagedFile::new(name, gradient_jpeg(width, height))
}

pub fn staged_png(name: &str, width: u32, height: u32) -> StagedFile {
    StagedFile::new(name, gradient_png(width, height))
}
