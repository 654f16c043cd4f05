//! CLI output formatting.
//!
//! Every display has a `format_*` function returning `Vec<String>` and, where
//! the CLI needs it, a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O and never read the clock, so they are unit tested
//! directly.
//!
//! # Output Format
//!
//! ## Batch progress
//!
//! ```text
//! Converting to PNG (3 files)
//! 001 holiday.jpg → converted/holiday.png (1.21 MB)
//! 002 notes.txt ✗ could not decode notes.txt: unrecognised image data
//! 003 visa.jpg → converted/visa.png (348.5 KB)
//! Done: 2 converted, 1 failed
//! ```
//!
//! ## Staging list
//!
//! ```text
//! Staged files (2, 1.56 MB)
//! 001 holiday.jpg (1.21 MB)
//! 002 visa.jpg (348.5 KB)
//! ```
//!
//! ## History
//!
//! ```text
//! Recent conversions (1)
//! holiday.jpg jpg → png
//!     1.21 MB, Just now
//! ```

use crate::batch::BatchEvent;
use crate::history::{ConversionHistoryEntry, format_time_ago};
use crate::presets::{PIXELS_PER_MM, ResizePreset};
use crate::staging::FileStaging;
use chrono::{DateTime, Utc};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Human-readable byte count: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`.
///
/// Uses 1024 steps and at most two decimals, with trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

// ============================================================================
// Batch progress
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { label, total } => {
            vec![format!("{label} ({})", plural(*total, "file"))]
        }
        BatchEvent::FileEmitted {
            index,
            name,
            output,
            size,
            ..
        } => vec![format!(
            "{} {} → {} ({})",
            format_index(*index),
            name,
            output.display(),
            format_file_size(*size)
        )],
        BatchEvent::FileFailed {
            index, name, error, ..
        } => vec![format!("{} {} ✗ {}", format_index(*index), name, error)],
        BatchEvent::FileCancelled { index, name, .. } => {
            vec![format!("{} {} (cancelled)", format_index(*index), name)]
        }
        BatchEvent::Finished {
            succeeded,
            failed,
            cancelled,
        } => {
            let mut parts = vec![format!("{succeeded} converted")];
            if *failed > 0 {
                parts.push(format!("{failed} failed"));
            }
            if *cancelled > 0 {
                parts.push(format!("{cancelled} cancelled"));
            }
            vec![format!("Done: {}", parts.join(", "))]
        }
    }
}

// ============================================================================
// Staging
// ============================================================================

pub fn format_staging(staging: &FileStaging) -> Vec<String> {
    if staging.is_empty() {
        return vec!["No files staged".to_string()];
    }
    let mut lines = vec![format!(
        "Staged files ({}, {})",
        staging.len(),
        format_file_size(staging.total_bytes())
    )];
    for (i, file) in staging.files().iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            file.name(),
            format_file_size(file.len())
        ));
    }
    lines
}

// ============================================================================
// Presets
// ============================================================================

pub fn format_presets(presets: &[ResizePreset], selected: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("Presets ({PIXELS_PER_MM} px per mm)")];
    for preset in presets {
        let marker = if selected == Some(preset.id) { "*" } else { " " };
        lines.push(format!(
            "{marker} {:<10} {:<10} {}mm × {}mm → {}",
            preset.id,
            preset.display_name,
            preset.width_mm,
            preset.height_mm,
            preset.pixels()
        ));
    }
    lines
}

pub fn print_presets(presets: &[ResizePreset]) {
    for line in format_presets(presets, None) {
        println!("{}", line);
    }
}

// ============================================================================
// History
// ============================================================================

/// Format the ledger, newest entry first, with ages relative to `now`.
pub fn format_history(entries: &[ConversionHistoryEntry], now: DateTime<Utc>) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No conversions yet".to_string()];
    }
    let mut lines = vec![format!("Recent conversions ({})", entries.len())];
    for entry in entries.iter().rev() {
        lines.push(format!(
            "{} {} → {}",
            entry.file_name, entry.from_format, entry.to_format
        ));
        let mut detail = format!(
            "    {}, {}",
            format_file_size(entry.file_size),
            format_time_ago(entry.timestamp, now)
        );
        if let Some(reference) = &entry.download_reference {
            detail.push_str(&format!(", {}", reference.display()));
        }
        lines.push(detail);
    }
    lines
}

pub fn print_history(entries: &[ConversionHistoryEntry]) {
    for line in format_history(entries, Utc::now()) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::PRESETS;
    use crate::staging::StagedFile;
    use chrono::{Duration, TimeZone};
    use std::path::PathBuf;

    #[test]
    fn file_size_units() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024 + 256 * 1024), "5.25 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn file_size_caps_at_gigabytes() {
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn batch_started_line() {
        let lines = format_batch_event(&BatchEvent::Started {
            label: "Converting to PNG".to_string(),
            total: 1,
        });
        assert_eq!(lines, vec!["Converting to PNG (1 file)"]);
    }

    #[test]
    fn batch_emitted_line() {
        let lines = format_batch_event(&BatchEvent::FileEmitted {
            index: 2,
            total: 3,
            name: "visa.jpg".to_string(),
            output: PathBuf::from("converted/visa_resized.jpg"),
            size: 2048,
        });
        assert_eq!(
            lines,
            vec!["002 visa.jpg → converted/visa_resized.jpg (2 KB)"]
        );
    }

    #[test]
    fn batch_failed_and_cancelled_lines() {
        let failed = format_batch_event(&BatchEvent::FileFailed {
            index: 1,
            total: 2,
            name: "notes.txt".to_string(),
            error: "could not decode notes.txt: bad data".to_string(),
        });
        assert_eq!(
            failed,
            vec!["001 notes.txt ✗ could not decode notes.txt: bad data"]
        );
        let cancelled = format_batch_event(&BatchEvent::FileCancelled {
            index: 2,
            total: 2,
            name: "b.jpg".to_string(),
        });
        assert_eq!(cancelled, vec!["002 b.jpg (cancelled)"]);
    }

    #[test]
    fn batch_finished_only_lists_nonzero_problems() {
        let clean = format_batch_event(&BatchEvent::Finished {
            succeeded: 2,
            failed: 0,
            cancelled: 0,
        });
        assert_eq!(clean, vec!["Done: 2 converted"]);
        let messy = format_batch_event(&BatchEvent::Finished {
            succeeded: 1,
            failed: 1,
            cancelled: 3,
        });
        assert_eq!(messy, vec!["Done: 1 converted, 1 failed, 3 cancelled"]);
    }

    #[test]
    fn staging_listing() {
        let mut staging = FileStaging::new();
        assert_eq!(format_staging(&staging), vec!["No files staged"]);

        staging.add([
            StagedFile::new("a.jpg", vec![0; 1024]),
            StagedFile::new("b.png", vec![0; 512]),
        ]);
        assert_eq!(
            format_staging(&staging),
            vec![
                "Staged files (2, 1.5 KB)",
                "001 a.jpg (1 KB)",
                "002 b.png (512 Bytes)",
            ]
        );
    }

    #[test]
    fn presets_listing_marks_selection() {
        let lines = format_presets(PRESETS, Some("malaysia"));
        assert_eq!(lines[0], "Presets (10 px per mm)");
        assert!(lines[1].starts_with("  thailand"));
        assert!(lines[1].ends_with("35mm × 45mm → 350x450"));
        assert!(lines[2].starts_with("* malaysia"));
        assert!(lines[2].ends_with("35mm × 50mm → 350x500"));
    }

    #[test]
    fn history_newest_first() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let entry = |name: &str, ago: Duration| ConversionHistoryEntry {
            id: "abc".to_string(),
            file_name: name.to_string(),
            from_format: "jpg".to_string(),
            to_format: "png".to_string(),
            timestamp: now - ago,
            file_size: 1536,
            download_reference: None,
        };
        let entries = vec![
            entry("old.jpg", Duration::hours(2)),
            entry("new.jpg", Duration::seconds(5)),
        ];
        let lines = format_history(&entries, now);
        assert_eq!(
            lines,
            vec![
                "Recent conversions (2)",
                "new.jpg jpg → png",
                "    1.5 KB, Just now",
                "old.jpg jpg → png",
                "    1.5 KB, 2h ago",
            ]
        );
    }

    #[test]
    fn empty_history() {
        assert_eq!(format_history(&[], Utc::now()), vec!["No conversions yet"]);
    }
}
