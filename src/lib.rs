//! # quickconvert
//!
//! Stage image files, convert them between PNG, JPEG and WebP, or resize them
//! to exact pixel sizes (including ID-photo print presets), and save the
//! results into an output directory. Everything happens locally; files are
//! read into memory, re-encoded and written out again.
//!
//! # Pipeline
//!
//! ```text
//! paths / session  →  FileStaging  →  run_batch  →  Emitter  →  converted/
//!                                        │
//!                                        └──→ HistoryLedger
//! ```
//!
//! A batch converts independent files in parallel but emits them strictly in
//! the order they were staged. A failing file is reported and skipped; the
//! rest of the batch still runs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`staging`] | Ordered list of files awaiting conversion, directory intake |
//! | [`imaging`] | Codec seam, format conversion and exact-size resizing |
//! | [`presets`] | ID-photo presets (mm → px) and preset/custom size selection |
//! | [`naming`] | Output file names: extension swap, `_resized`, ` (n)` collisions |
//! | [`emit`] | Saving finished blobs into a directory without overwriting |
//! | [`history`] | Session-scoped ledger of completed conversions |
//! | [`batch`] | Parallel conversion, ordered emission, cancellation, progress events |
//! | [`session`] | Interactive session state and its line commands |
//! | [`config`] | `quickconvert.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Injected Codec
//!
//! All pixel work goes through the [`imaging::ImageCodec`] trait. The
//! production [`imaging::RustCodec`] is pure Rust (the `image` crate), and the
//! test suite swaps in a mock that records every call without touching real
//! pixels.
//!
//! ## Fixed Millimeter Factor
//!
//! Presets convert millimeters to pixels with a flat factor of 10
//! ([`presets::PIXELS_PER_MM`]), so a 35×45 mm photo becomes 350×450 px. It is
//! not a DPI calculation and is intentionally left that way.

pub mod batch;
pub mod config;
pub mod emit;
pub mod history;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod presets;
pub mod session;
pub mod staging;

#[cfg(test)]
pub(crate) mod test_helpers;
