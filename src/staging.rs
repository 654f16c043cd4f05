//! File staging: the ordered holding area for files awaiting conversion.
//!
//! Staging never validates content. The per-mode extension allowlist is
//! advisory: it decides which files a directory walk picks up, but a file
//! named explicitly is always staged, and an undecodable file simply fails
//! later at decode time without disturbing the rest of the list.

use crate::imaging::TargetFormat;
use crate::naming::file_extension;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Which conversion mode a staging list feeds. Only affects the advisory allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingMode {
    Image,
    Document,
}

/// Extensions a file picker would offer for images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Extensions a file picker would offer for documents.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx"];

impl StagingMode {
    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::Document => DOCUMENT_EXTENSIONS,
        }
    }

    /// Advisory check: does `name` carry an extension this mode offers?
    pub fn accepts(self, name: &str) -> bool {
        let ext = file_extension(name);
        self.accepted_extensions().contains(&ext.as_str())
    }
}

/// An opaque named blob owned by the staging list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
    bytes: Vec<u8>,
    origin: Option<PathBuf>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            origin: None,
        }
    }

    /// Read a file from disk. The staged name is the path's file name.
    pub fn read(path: &Path) -> Result<Self, StagingError> {
        let bytes = fs::read(path).map_err(|source| StagingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            bytes,
            origin: Some(path.to_path_buf()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Encoding the file is written back in when resized.
    ///
    /// The extension wins so output names and content agree; content sniffing
    /// only decides for names without a supported extension.
    pub fn source_format(&self) -> Option<TargetFormat> {
        TargetFormat::from_extension(&file_extension(&self.name))
            .or_else(|| TargetFormat::detect(&self.bytes, &self.name))
    }
}

/// Ordered list of staged files.
#[derive(Debug, Clone, Default)]
pub struct FileStaging {
    files: Vec<StagedFile>,
}

impl FileStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append files in the given order. No deduplication.
    pub fn add(&mut self, files: impl IntoIterator<Item = StagedFile>) {
        self.files.extend(files);
    }

    /// Remove the file at `index`. Out-of-range indices are a no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<StagedFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(StagedFile::len).sum()
    }

    /// Stage files from disk, returning how many were added.
    ///
    /// Files are staged as given. Directories are walked recursively in
    /// path order and only contribute files the mode's allowlist accepts.
    /// Nothing is staged if any path fails to read.
    pub fn load_paths(
        &mut self,
        paths: &[PathBuf],
        mode: StagingMode,
    ) -> Result<usize, StagingError> {
        let mut loaded = Vec::new();
        for path in paths {
            if path.is_dir() {
                for entry in WalkDir::new(path).sort_by_file_name() {
                    let entry = entry.map_err(|source| StagingError::Walk {
                        path: path.clone(),
                        source,
                    })?;
                    if entry.file_type().is_file()
                        && mode.accepts(&entry.file_name().to_string_lossy())
                    {
                        loaded.push(StagedFile::read(entry.path())?);
                    }
                }
            } else {
                loaded.push(StagedFile::read(path)?);
            }
        }
        let count = loaded.len();
        self.add(loaded);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(staging: &FileStaging) -> Vec<&str> {
        staging.files().iter().map(StagedFile::name).collect()
    }

    fn file(name: &str) -> StagedFile {
        StagedFile::new(name, name.as_bytes().to_vec())
    }

    #[test]
    fn add_appends_in_order_without_dedup() {
        let mut staging = FileStaging::new();
        staging.add([file("a.jpg"), file("b.png")]);
        staging.add([file("a.jpg")]);
        assert_eq!(names(&staging), vec!["a.jpg", "b.png", "a.jpg"]);
    }

    #[test]
    fn add_accepts_files_outside_allowlist() {
        let mut staging = FileStaging::new();
        staging.add([file("notes.txt")]);
        assert_eq!(staging.len(), 1);
        assert!(!StagingMode::Image.accepts("notes.txt"));
    }

    #[test]
    fn remove_at_removes_one_entry() {
        let mut staging = FileStaging::new();
        staging.add([file("a.jpg"), file("b.jpg"), file("c.jpg")]);
        let removed = staging.remove_at(1).unwrap();
        assert_eq!(removed.name(), "b.jpg");
        assert_eq!(names(&staging), vec!["a.jpg", "c.jpg"]);
    }

    #[test]
    fn remove_at_out_of_range_is_noop() {
        let mut staging = FileStaging::new();
        staging.add([file("a.jpg"), file("b.jpg")]);
        assert!(staging.remove_at(2).is_none());
        assert!(staging.remove_at(usize::MAX).is_none());
        assert_eq!(names(&staging), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn clear_empties_list() {
        let mut staging = FileStaging::new();
        staging.add([file("a.jpg"), file("b.jpg")]);
        staging.clear();
        assert!(staging.is_empty());
        assert_eq!(staging.total_bytes(), 0);
    }

    #[test]
    fn allowlists_are_case_insensitive() {
        assert!(StagingMode::Image.accepts("HOLIDAY.JPEG"));
        assert!(StagingMode::Image.accepts("scan.webp"));
        assert!(!StagingMode::Image.accepts("scan.pdf"));
        assert!(StagingMode::Document.accepts("Budget.XLSX"));
        assert!(!StagingMode::Document.accepts("photo"));
    }

    #[test]
    fn load_paths_walks_directories_with_allowlist() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("trip");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("b.png"), b"b").unwrap();
        fs::write(tmp.path().join("a.jpg"), b"a").unwrap();
        fs::write(tmp.path().join("readme.md"), b"skip").unwrap();
        fs::write(nested.join("c.webp"), b"c").unwrap();

        let mut staging = FileStaging::new();
        let added = staging
            .load_paths(&[tmp.path().to_path_buf()], StagingMode::Image)
            .unwrap();

        assert_eq!(added, 3);
        assert_eq!(names(&staging), vec!["a.jpg", "b.png", "c.webp"]);
        assert_eq!(
            staging.files()[0].origin(),
            Some(tmp.path().join("a.jpg").as_path())
        );
    }

    #[test]
    fn load_paths_keeps_explicit_files_regardless_of_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dropped.txt");
        fs::write(&path, b"hello").unwrap();

        let mut staging = FileStaging::new();
        staging.load_paths(&[path], StagingMode::Image).unwrap();
        assert_eq!(names(&staging), vec!["dropped.txt"]);
        assert_eq!(staging.total_bytes(), 5);
    }

    #[test]
    fn load_paths_missing_file_stages_nothing() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("a.jpg");
        fs::write(&good, b"a").unwrap();

        let mut staging = FileStaging::new();
        let result = staging.load_paths(
            &[good, tmp.path().join("missing.jpg")],
            StagingMode::Image,
        );
        assert!(matches!(result, Err(StagingError::Io { .. })));
        assert!(staging.is_empty());
    }

    #[test]
    fn source_format_trusts_extension_over_content() {
        let png = crate::test_helpers::gradient_png(4, 4);
        assert_eq!(
            StagedFile::new("photo.jpg", png.clone()).source_format(),
            Some(TargetFormat::Jpeg)
        );
        assert_eq!(
            StagedFile::new("photo.bin", png).source_format(),
            Some(TargetFormat::Png)
        );
    }

    #[test]
    fn source_format_reads_extension_for_unknown_content() {
        assert_eq!(file("a.JPG").source_format(), Some(TargetFormat::Jpeg));
        assert_eq!(file("a.txt").source_format(), None);
    }
}
