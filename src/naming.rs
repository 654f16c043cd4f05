//! Output file naming.
//!
//! - Conversion swaps the final extension: `holiday.jpeg` → `holiday.png`.
//! - Resize inserts a suffix before the extension: `visa.jpg` → `visa_resized.jpg`.
//! - Collisions in the output directory get a browser-style counter:
//!   `visa_resized (1).jpg`, `visa_resized (2).jpg`, ...
//!
//! Only the last dot counts, and a leading dot (`.hidden`) is part of the
//! stem, not an extension.

use crate::imaging::TargetFormat;

/// Suffix inserted by the resizer.
pub const RESIZED_SUFFIX: &str = "_resized";

/// Split `name` into `(stem, Some(extension))` at its last dot.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

/// Lowercased extension of `name`, or empty.
pub fn file_extension(name: &str) -> String {
    split_extension(name)
        .1
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Name for a file converted to `target`.
///
/// A name without an extension gets the target extension appended.
pub fn converted_name(name: &str, target: TargetFormat) -> String {
    let (stem, _) = split_extension(name);
    format!("{stem}.{}", target.extension())
}

/// Name for a resized copy of `name`, keeping its original extension (and case).
pub fn resized_name(name: &str) -> String {
    match split_extension(name) {
        (stem, Some(ext)) => format!("{stem}{RESIZED_SUFFIX}.{ext}"),
        (stem, None) => format!("{stem}{RESIZED_SUFFIX}"),
    }
}

/// The `n`th alternative for a name that is already taken (`n >= 1`).
pub fn numbered_name(name: &str, n: u32) -> String {
    match split_extension(name) {
        (stem, Some(ext)) => format!("{stem} ({n}).{ext}"),
        (stem, None) => format!("{stem} ({n})"),
    }
}
