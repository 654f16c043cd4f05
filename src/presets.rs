//! ID-photo size presets and target size selection.
//!
//! Presets are print sizes in millimeters, converted to pixels with a fixed
//! linear factor of [`PIXELS_PER_MM`]. The factor is not derived from a DPI;
//! it is the historical constant and is kept as-is.
//!
//! | Preset | Print size | Pixels |
//! |---|---|---|
//! | Thailand | 35×45 mm | 350×450 |
//! | Malaysia | 35×50 mm | 350×500 |
//! | Singapore | 35×45 mm | 350×450 |
//!
//! [`SizeSelection`] holds the user's choice between a preset and custom
//! pixel dimensions. Only one of them is authoritative at a time.

use crate::imaging::Dimensions;
use serde::Serialize;

/// Fixed millimeter-to-pixel factor.
pub const PIXELS_PER_MM: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResizePreset {
    pub id: &'static str,
    pub display_name: &'static str,
    pub width_mm: u32,
    pub height_mm: u32,
}

impl ResizePreset {
    pub fn pixels(&self) -> Dimensions {
        Dimensions::new(
            self.width_mm * PIXELS_PER_MM,
            self.height_mm * PIXELS_PER_MM,
        )
    }
}

pub const PRESETS: &[ResizePreset] = &[
    ResizePreset {
        id: "thailand",
        display_name: "Thailand",
        width_mm: 35,
        height_mm: 45,
    },
    ResizePreset {
        id: "malaysia",
        display_name: "Malaysia",
        width_mm: 35,
        height_mm: 50,
    },
    ResizePreset {
        id: "singapore",
        display_name: "Singapore",
        width_mm: 35,
        height_mm: 45,
    },
];

/// Look up a preset by id (case-insensitive).
pub fn find(id: &str) -> Option<&'static ResizePreset> {
    PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

/// Pixel dimensions for a preset id.
pub fn resolve(id: &str) -> Option<Dimensions> {
    find(id).map(ResizePreset::pixels)
}

/// User-entered pixel dimensions pass through unchanged.
pub fn custom_dimensions(width: u32, height: u32) -> Dimensions {
    Dimensions::new(width, height)
}

/// Mutually exclusive choice between a preset and custom dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSelection {
    preset: Option<&'static ResizePreset>,
    custom: Dimensions,
}

impl SizeSelection {
    pub fn new(default_custom: Dimensions) -> Self {
        Self {
            preset: None,
            custom: default_custom,
        }
    }

    /// Select a preset by id. Returns false (and changes nothing) for unknown ids.
    pub fn select_preset(&mut self, id: &str) -> bool {
        match find(id) {
            Some(preset) => {
                self.preset = Some(preset);
                true
            }
            None => false,
        }
    }

    /// Editing a custom field deselects any preset.
    pub fn set_custom_width(&mut self, width: u32) {
        self.custom.width = width;
        self.preset = None;
    }

    pub fn set_custom_height(&mut self, height: u32) {
        self.custom.height = height;
        self.preset = None;
    }

    pub fn selected_preset(&self) -> Option<&'static ResizePreset> {
        self.preset
    }

    pub fn custom(&self) -> Dimensions {
        self.custom
    }

    /// The dimensions a resize run would use right now.
    pub fn target(&self) -> Dimensions {
        self.preset
            .map(ResizePreset::pixels)
            .unwrap_or_else(|| custom_dimensions(self.custom.width, self.custom.height))
    }
}

impl Default for SizeSelection {
    fn default() -> Self {
        Self::new(Dimensions::new(300, 400))
    }
}
