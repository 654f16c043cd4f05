//! Session-scoped conversion history.
//!
//! The ledger is append-only while a session runs and is only ever emptied as
//! a whole. It lives in memory; nothing is written to disk unless the caller
//! serializes it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// One completed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionHistoryEntry {
    /// Short fingerprint of the source bytes and the entry's position in the session.
    pub id: String,
    pub file_name: String,
    pub from_format: String,
    pub to_format: String,
    pub timestamp: DateTime<Utc>,
    /// Size of the produced file.
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_reference: Option<PathBuf>,
}

/// Inputs for a new ledger entry; the ledger assigns `id` and `timestamp`.
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub source: &'a [u8],
    pub file_name: String,
    pub from_format: String,
    pub to_format: String,
    pub file_size: u64,
    pub download_reference: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct HistoryLedger {
    entries: Vec<ConversionHistoryEntry>,
    #[serde(skip)]
    sequence: u64,
}

/// First 12 hex digits of SHA-256 over the sequence number and source bytes.
fn entry_id(sequence: u64, source: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(source);
    hasher
        .finalize()
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current time.
    pub fn record(&mut self, entry: NewEntry<'_>) -> &ConversionHistoryEntry {
        self.record_at(entry, Utc::now())
    }

    pub fn record_at(
        &mut self,
        entry: NewEntry<'_>,
        timestamp: DateTime<Utc>,
    ) -> &ConversionHistoryEntry {
        self.sequence += 1;
        self.entries.push(ConversionHistoryEntry {
            id: entry_id(self.sequence, entry.source),
            file_name: entry.file_name,
            from_format: entry.from_format,
            to_format: entry.to_format,
            timestamp,
            file_size: entry.file_size,
            download_reference: entry.download_reference,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Entries in the order they were recorded.
    pub fn entries(&self) -> &[ConversionHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry at once. Ids keep counting so they stay unique within the session.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Relative age of `then` as seen from `now`: `Just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{days}d ago")
    }
}
