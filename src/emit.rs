//! Saving finished blobs.
//!
//! [`Emitter`] is the "download" step: hand it a blob and a file name and it
//! saves the bytes somewhere the user can pick them up. [`DirectoryEmitter`]
//! writes into an output directory.
//!
//! Each emission stages the bytes in its own temporary file inside the output
//! directory, then persists it under the final name without clobbering. If
//! anything fails the temporary file is dropped, which deletes it, so no
//! partial files or handles outlive a single `emit` call.

use crate::imaging::Blob;
use crate::naming::numbered_name;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Give up on collision avoidance after this many numbered names.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no free file name for {0} in the output directory")]
    NameExhausted(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> EmitError + use<> {
    let path = path.to_path_buf();
    move |source| EmitError::Io { path, source }
}

/// Destination for converted files.
pub trait Emitter {
    /// Save `blob` as `file_name`, returning where it ended up.
    fn emit(&mut self, blob: &Blob, file_name: &str) -> Result<PathBuf, EmitError>;
}

/// Writes blobs into a directory, never overwriting existing files.
#[derive(Debug, Clone)]
pub struct DirectoryEmitter {
    dir: PathBuf,
}

impl DirectoryEmitter {
    /// Create the emitter, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, EmitError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| EmitError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Emitter for DirectoryEmitter {
    fn emit(&mut self, blob: &Blob, file_name: &str) -> Result<PathBuf, EmitError> {
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_error(&self.dir))?;
        tmp.write_all(&blob.bytes).map_err(io_error(tmp.path()))?;
        tmp.flush().map_err(io_error(tmp.path()))?;

        let mut candidate = file_name.to_string();
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let target = self.dir.join(&candidate);
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                    tmp = err.file;
                    candidate = numbered_name(file_name, attempt);
                }
                Err(err) => return Err(io_error(&target)(err.error)),
            }
        }
        Err(EmitError::NameExhausted(file_name.to_string()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::TargetFormat;
    use tempfile::TempDir;

    /// Emitter that keeps emissions in memory, in call order.
    #[derive(Debug, Default)]
    pub struct RecordingEmitter {
        pub emitted: Vec<(String, Blob)>,
    }

    impl RecordingEmitter {
        pub fn names(&self) -> Vec<&str> {
            self.emitted.iter().map(|(n, _)| n.as_str()).collect()
        }
    }

    impl Emitter for RecordingEmitter {
        fn emit(&mut self, blob: &Blob, file_name: &str) -> Result<PathBuf, EmitError> {
            self.emitted.push((file_name.to_string(), blob.clone()));
            Ok(PathBuf::from("memory").join(file_name))
        }
    }

    fn blob(bytes: &[u8]) -> Blob {
        Blob {
            bytes: bytes.to_vec(),
            format: TargetFormat::Png,
        }
    }

    fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_blob_under_requested_name() {
        let tmp = TempDir::new().unwrap();
        let mut emitter = DirectoryEmitter::new(tmp.path().join("out")).unwrap();

        let path = emitter.emit(&blob(b"pixels"), "a.png").unwrap();

        assert_eq!(path, tmp.path().join("out/a.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"pixels");
    }

    #[test]
    fn collisions_get_numbered_names() {
        let tmp = TempDir::new().unwrap();
        let mut emitter = DirectoryEmitter::new(tmp.path()).unwrap();

        emitter.emit(&blob(b"1"), "a.png").unwrap();
        let second = emitter.emit(&blob(b"2"), "a.png").unwrap();
        let third = emitter.emit(&blob(b"3"), "a.png").unwrap();

        assert_eq!(second.file_name().unwrap(), "a (1).png");
        assert_eq!(third.file_name().unwrap(), "a (2).png");
        assert_eq!(std::fs::read(tmp.path().join("a.png")).unwrap(), b"1");
    }

    #[test]
    fn sequential_emits_leave_no_temporary_files() {
        let tmp = TempDir::new().unwrap();
        let mut emitter = DirectoryEmitter::new(tmp.path()).unwrap();

        for name in ["a.png", "b.png", "c.png"] {
            emitter.emit(&blob(b"x"), name).unwrap();
        }

        assert_eq!(dir_listing(tmp.path()), vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn failed_emit_cleans_up_temporary_file() {
        let tmp = TempDir::new().unwrap();
        let mut emitter = DirectoryEmitter::new(tmp.path()).unwrap();

        // A name inside a missing subdirectory cannot be persisted
        let result = emitter.emit(&blob(b"x"), "missing/a.png");

        assert!(matches!(result, Err(EmitError::Io { .. })));
        assert!(dir_listing(tmp.path()).is_empty());
    }

    #[test]
    fn recording_emitter_keeps_call_order() {
        let mut emitter = RecordingEmitter::default();
        emitter.emit(&blob(b"1"), "b.png").unwrap();
        emitter.emit(&blob(b"2"), "a.png").unwrap();
        assert_eq!(emitter.names(), vec!["b.png", "a.png"]);
    }
}
