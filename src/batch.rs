//! Batch orchestration for the convert and resize modes.
//!
//! A batch walks the staged files in order and produces one output per input.
//!
//! ## Execution
//!
//! Files are taken in chunks the size of the rayon pool. Within a chunk the
//! decode/encode work runs in parallel; the ordered `collect` acts as the
//! result collector. Emission, history recording and progress events then
//! happen on the calling thread in staging order, so outputs always appear in
//! the order the files were staged and at most one chunk of encoded blobs is
//! held in memory.
//!
//! ## Failures
//!
//! A failing file never stops the batch. Its error is recorded in the
//! per-file outcome and the remaining files are still processed.
//!
//! ## Cancellation
//!
//! A [`CancelToken`] is checked before each file is converted and again
//! before it is emitted. Once cancelled, every remaining file is reported as
//! [`FileOutcome::Cancelled`] and nothing more is written.

use crate::emit::{EmitError, Emitter};
use crate::history::{HistoryLedger, NewEntry};
use crate::imaging::{
    self, Blob, ConvertError, Dimensions, ImageCodec, Quality, ResizeFilter, TargetFormat,
};
use crate::naming::{converted_name, file_extension, resized_name};
use crate::staging::StagedFile;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arm the token for another batch. Clones share the reset.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What a batch does to every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRequest {
    Convert { target: TargetFormat },
    Resize { target: Dimensions },
}

impl BatchRequest {
    pub fn label(&self) -> String {
        match self {
            Self::Convert { target } => format!("Converting to {}", target.label()),
            Self::Resize { target } => format!("Resizing to {target}"),
        }
    }

    /// Output file name for `file`.
    pub fn output_name(&self, file: &StagedFile) -> String {
        match self {
            Self::Convert { target } => converted_name(file.name(), *target),
            Self::Resize { .. } => resized_name(file.name()),
        }
    }
}

/// Encoding settings shared by every file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchJob {
    pub request: BatchRequest,
    pub quality: Quality,
    pub filter: ResizeFilter,
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self::Convert {
            target: TargetFormat::Png,
        }
    }
}

impl BatchJob {
    pub fn new(request: BatchRequest) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    fn apply(&self, codec: &impl ImageCodec, file: &StagedFile) -> Result<Blob, ConvertError> {
        match self.request {
            BatchRequest::Convert { target } => {
                imaging::convert(codec, file, target, self.quality)
            }
            BatchRequest::Resize { target } => {
                imaging::resize(codec, file, target, self.filter, self.quality)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// What happened to one staged file.
#[derive(Debug)]
pub enum FileOutcome {
    Emitted {
        output: PathBuf,
        format: TargetFormat,
        size: u64,
    },
    Failed(FileError),
    Cancelled,
}

#[derive(Debug)]
pub struct FileResult {
    /// 1-based position in the staging list.
    pub index: usize,
    pub name: String,
    pub outcome: FileOutcome,
}

/// Per-file results, in staging order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Emitted { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Cancelled))
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.cancelled() == 0
    }
}

/// Progress events, sent in staging order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started {
        label: String,
        total: usize,
    },
    FileEmitted {
        index: usize,
        total: usize,
        name: String,
        output: PathBuf,
        size: u64,
    },
    FileFailed {
        index: usize,
        total: usize,
        name: String,
        error: String,
    },
    FileCancelled {
        index: usize,
        total: usize,
        name: String,
    },
    Finished {
        succeeded: usize,
        failed: usize,
        cancelled: usize,
    },
}

fn send(events: &Option<Sender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening
        let _ = tx.send(event);
    }
}

/// Run `job` over `files`, emitting outputs and recording history in staging order.
pub fn run_batch(
    codec: &impl ImageCodec,
    files: &[StagedFile],
    job: &BatchJob,
    emitter: &mut impl Emitter,
    ledger: &mut HistoryLedger,
    cancel: &CancelToken,
    events: Option<Sender<BatchEvent>>,
) -> BatchReport {
    let total = files.len();
    let chunk_size = rayon::current_num_threads().max(1);
    let mut report = BatchReport::default();

    send(
        &events,
        BatchEvent::Started {
            label: job.request.label(),
            total,
        },
    );

    for (chunk_no, chunk) in files.chunks(chunk_size).enumerate() {
        let converted: Vec<Option<Result<Blob, ConvertError>>> = chunk
            .par_iter()
            .map(|file| (!cancel.is_cancelled()).then(|| job.apply(codec, file)))
            .collect();

        for (offset, (file, result)) in chunk.iter().zip(converted).enumerate() {
            let index = chunk_no * chunk_size + offset + 1;
            let outcome = match result {
                _ if cancel.is_cancelled() => FileOutcome::Cancelled,
                None => FileOutcome::Cancelled,
                Some(Err(err)) => FileOutcome::Failed(err.into()),
                Some(Ok(blob)) => emit_one(file, &blob, job, emitter, ledger),
            };

            let event = match &outcome {
                FileOutcome::Emitted { output, size, .. } => BatchEvent::FileEmitted {
                    index,
                    total,
                    name: file.name().to_string(),
                    output: output.clone(),
                    size: *size,
                },
                FileOutcome::Failed(err) => BatchEvent::FileFailed {
                    index,
                    total,
                    name: file.name().to_string(),
                    error: err.to_string(),
                },
                FileOutcome::Cancelled => BatchEvent::FileCancelled {
                    index,
                    total,
                    name: file.name().to_string(),
                },
            };
            send(&events, event);

            report.results.push(FileResult {
                index,
                name: file.name().to_string(),
                outcome,
            });
        }
    }

    send(
        &events,
        BatchEvent::Finished {
            succeeded: report.succeeded(),
            failed: report.failed(),
            cancelled: report.cancelled(),
        },
    );
    report
}

fn emit_one(
    file: &StagedFile,
    blob: &Blob,
    job: &BatchJob,
    emitter: &mut impl Emitter,
    ledger: &mut HistoryLedger,
) -> FileOutcome {
    let name = job.request.output_name(file);
    match emitter.emit(blob, &name) {
        Ok(output) => {
            let from_format = file
                .source_format()
                .map(|f| f.extension().to_string())
                .unwrap_or_else(|| file_extension(file.name()));
            ledger.record(NewEntry {
                source: file.bytes(),
                file_name: file.name().to_string(),
                from_format,
                to_format: blob.format.extension().to_string(),
                file_size: blob.len() as u64,
                download_reference: Some(output.clone()),
            });
            FileOutcome::Emitted {
                output,
                format: blob.format,
                size: blob.len() as u64,
            }
        }
        Err(err) => FileOutcome::Failed(err.into()),
    }
}
