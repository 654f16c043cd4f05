//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with content sniffing |
//! | **Convert** | decode → encode at native size |
//! | **Resize** | decode → `resize_exact` → encode in the source's own format |
//!
//! The module is split into:
//! - **Parameters**: quality, dimensions, resampling filter
//! - **Format**: the closed set of target encodings
//! - **Codec**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: [`convert`] and [`resize`], written against the trait

pub mod codec;
mod format;
pub mod operations;
mod params;
pub mod rust_codec;

pub use codec::{CodecError, ImageCodec, RasterSurface};
pub use format::TargetFormat;
pub use operations::{Blob, ConvertError, convert, resize};
pub use params::{Dimensions, Quality, ResizeFilter};
pub use rust_codec::RustCodec;
