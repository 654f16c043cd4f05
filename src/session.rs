//! Interactive session state and its line-command interface.
//!
//! A [`Session`] owns everything a user builds up between runs: the conversion
//! mode, the staged files, the target format, the size selection and the
//! history ledger. Nothing lives in globals, so several sessions can coexist
//! (tests create one per case).
//!
//! ## Commands
//!
//! ```text
//! add <path>...        stage files or directories
//! remove <n>           unstage the file at position n (as shown by list)
//! clear                unstage everything
//! list                 show staged files and current settings
//! mode <convert|resize>
//! format <png|jpeg|webp>
//! preset <id>          select an ID-photo preset
//! width <px>           custom width (clears the preset)
//! height <px>          custom height (clears the preset)
//! run                  process every staged file
//! history              show conversions made in this session
//! clear-history
//! presets
//! help
//! quit
//! ```
//!
//! Switching mode starts over with an empty staging list and default
//! settings for the new mode. History survives mode switches.

use crate::batch::{self, BatchJob, BatchReport, BatchRequest, CancelToken};
use crate::config::AppConfig;
use crate::emit::Emitter;
use crate::history::HistoryLedger;
use crate::imaging::{Dimensions, ImageCodec, Quality, ResizeFilter, TargetFormat};
use crate::output;
use crate::presets::{self, PRESETS, SizeSelection};
use crate::staging::{FileStaging, StagingError, StagingMode};
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid value for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("no staged file at position {0}")]
    NoSuchEntry(usize),
    #[error("nothing staged")]
    NothingStaged,
    #[error(transparent)]
    Staging(#[from] StagingError),
}

/// What a run does with the staged files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    #[default]
    Convert,
    Resize,
}

impl ConversionMode {
    /// Allowlist used when a directory is staged in this mode.
    pub fn staging_mode(self) -> StagingMode {
        StagingMode::Image
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Convert => f.write_str("convert"),
            Self::Resize => f.write_str("resize"),
        }
    }
}

impl FromStr for ConversionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "convert" | "image" => Ok(Self::Convert),
            "resize" => Ok(Self::Resize),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add(Vec<PathBuf>),
    /// 1-based position.
    Remove(usize),
    Clear,
    List,
    Mode(ConversionMode),
    Format(TargetFormat),
    Preset(String),
    Width(u32),
    Height(u32),
    Run,
    History,
    ClearHistory,
    Presets,
    Help,
    Quit,
}

fn required<'a>(command: &'static str, arg: Option<&'a str>) -> Result<&'a str, SessionError> {
    arg.ok_or(SessionError::MissingArgument(command))
}

fn parsed<T: FromStr>(command: &'static str, arg: Option<&str>) -> Result<T, SessionError> {
    let value = required(command, arg)?;
    value.parse().map_err(|_| SessionError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

impl SessionCommand {
    /// Parse a line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, SessionError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.clone().next();

        let command = match head.to_ascii_lowercase().as_str() {
            "add" => {
                let paths: Vec<PathBuf> = words.map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err(SessionError::MissingArgument("add"));
                }
                Self::Add(paths)
            }
            "remove" | "rm" => Self::Remove(parsed("remove", arg)?),
            "clear" => Self::Clear,
            "list" | "ls" => Self::List,
            "mode" => Self::Mode(parsed("mode", arg)?),
            "format" | "to" => Self::Format(parsed("format", arg)?),
            "preset" => Self::Preset(required("preset", arg)?.to_string()),
            "width" => Self::Width(parsed("width", arg)?),
            "height" => Self::Height(parsed("height", arg)?),
            "run" => Self::Run,
            "history" => Self::History,
            "clear-history" => Self::ClearHistory,
            "presets" => Self::Presets,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(SessionError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Result of executing one command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self::Lines(vec![text.into()])
    }
}

const HELP: &[&str] = &[
    "add <path>...           stage files or directories",
    "remove <n>              unstage the file at position n",
    "clear                   unstage everything",
    "list                    show staged files and settings",
    "mode <convert|resize>   switch mode (clears staged files)",
    "format <png|jpeg|webp>  target format for convert (jpeg writes .jpg)",
    "preset <id>             ID-photo preset for resize",
    "width <px>              custom resize width",
    "height <px>             custom resize height",
    "run                     process staged files",
    "history                 show this session's conversions",
    "clear-history           forget this session's conversions",
    "presets                 list ID-photo presets",
    "quit                    leave the session",
];

/// Application state for one interactive session.
#[derive(Debug, Clone)]
pub struct Session {
    mode: ConversionMode,
    staging: FileStaging,
    target_format: TargetFormat,
    selection: SizeSelection,
    ledger: HistoryLedger,
    quality: Quality,
    filter: ResizeFilter,
    default_size: Dimensions,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        let default_size = config.default_dimensions();
        Self {
            mode: ConversionMode::default(),
            staging: FileStaging::new(),
            target_format: TargetFormat::default(),
            selection: SizeSelection::new(default_size),
            ledger: HistoryLedger::new(),
            quality: config.quality(),
            filter: config.resize.filter,
            default_size,
        }
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub fn staging(&self) -> &FileStaging {
        &self.staging
    }

    pub fn staging_mut(&mut self) -> &mut FileStaging {
        &mut self.staging
    }

    pub fn target_format(&self) -> TargetFormat {
        self.target_format
    }

    pub fn selection(&self) -> &SizeSelection {
        &self.selection
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    /// Switch mode. A real switch discards staged files and per-mode settings.
    pub fn set_mode(&mut self, mode: ConversionMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.staging.clear();
        self.target_format = TargetFormat::default();
        self.selection = SizeSelection::new(self.default_size);
    }

    /// The batch the current settings describe.
    pub fn request(&self) -> BatchRequest {
        match self.mode {
            ConversionMode::Convert => BatchRequest::Convert {
                target: self.target_format,
            },
            ConversionMode::Resize => BatchRequest::Resize {
                target: self.selection.target(),
            },
        }
    }

    /// Process every staged file. Staged files stay staged afterwards.
    pub fn run(
        &mut self,
        codec: &impl ImageCodec,
        emitter: &mut impl Emitter,
        cancel: &CancelToken,
        events: Option<mpsc::Sender<batch::BatchEvent>>,
    ) -> Result<BatchReport, SessionError> {
        if self.staging.is_empty() {
            return Err(SessionError::NothingStaged);
        }
        let job = BatchJob {
            request: self.request(),
            quality: self.quality,
            filter: self.filter,
        };
        Ok(batch::run_batch(
            codec,
            self.staging.files(),
            &job,
            emitter,
            &mut self.ledger,
            cancel,
            events,
        ))
    }

    fn settings_line(&self) -> String {
        match self.mode {
            ConversionMode::Convert => {
                format!("Mode: convert → {}", self.target_format.label())
            }
            ConversionMode::Resize => match self.selection.selected_preset() {
                Some(preset) => format!(
                    "Mode: resize → {} ({})",
                    preset.pixels(),
                    preset.display_name
                ),
                None => format!("Mode: resize → {} (custom)", self.selection.target()),
            },
        }
    }

    /// Apply one command and describe the result.
    pub fn execute(
        &mut self,
        command: SessionCommand,
        codec: &impl ImageCodec,
        emitter: &mut impl Emitter,
        cancel: &CancelToken,
    ) -> Result<Reply, SessionError> {
        let reply = match command {
            SessionCommand::Add(paths) => {
                let added = self
                    .staging
                    .load_paths(&paths, self.mode.staging_mode())?;
                Reply::line(format!(
                    "Staged {} ({} total)",
                    plural_files(added),
                    self.staging.len()
                ))
            }
            SessionCommand::Remove(position) => {
                let removed = position
                    .checked_sub(1)
                    .and_then(|index| self.staging.remove_at(index))
                    .ok_or(SessionError::NoSuchEntry(position))?;
                Reply::line(format!("Removed {}", removed.name()))
            }
            SessionCommand::Clear => {
                self.staging.clear();
                Reply::line("Staging cleared")
            }
            SessionCommand::List => {
                let mut lines = vec![self.settings_line()];
                lines.extend(output::format_staging(&self.staging));
                Reply::Lines(lines)
            }
            SessionCommand::Mode(mode) => {
                self.set_mode(mode);
                Reply::line(self.settings_line())
            }
            SessionCommand::Format(format) => {
                self.target_format = format;
                Reply::line(self.settings_line())
            }
            SessionCommand::Preset(id) => {
                if !self.selection.select_preset(&id) {
                    return Err(SessionError::UnknownPreset(id));
                }
                Reply::line(self.settings_line())
            }
            SessionCommand::Width(width) => {
                self.selection.set_custom_width(width);
                Reply::line(self.settings_line())
            }
            SessionCommand::Height(height) => {
                self.selection.set_custom_height(height);
                Reply::line(self.settings_line())
            }
            SessionCommand::Run => {
                cancel.reset();
                let (tx, rx) = mpsc::channel();
                self.run(codec, emitter, cancel, Some(tx))?;
                Reply::Lines(rx.iter().flat_map(|e| output::format_batch_event(&e)).collect())
            }
            SessionCommand::History => {
                Reply::Lines(output::format_history(self.ledger.entries(), Utc::now()))
            }
            SessionCommand::ClearHistory => {
                self.ledger.clear();
                Reply::line("History cleared")
            }
            SessionCommand::Presets => {
                let selected = self.selection.selected_preset().map(|p| p.id);
                Reply::Lines(output::format_presets(PRESETS, selected))
            }
            SessionCommand::Help => Reply::Lines(HELP.iter().map(|s| s.to_string()).collect()),
            SessionCommand::Quit => Reply::Quit,
        };
        Ok(reply)
    }
}

fn plural_files(n: usize) -> String {
    if n == 1 {
        "1 file".to_string()
    } else {
        format!("{n} files")
    }
}

/// Where Ctrl-C goes during an interactive session.
///
/// While a batch runs, an interrupt cancels it and the session carries on.
/// At the prompt there is nothing to cancel, so the interrupt ends the session.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    cancel: CancelToken,
    busy: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token running batches watch.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Mark a batch as running until the guard drops. Re-arms the token.
    pub fn begin_batch(&self) -> BatchGuard<'_> {
        self.cancel.reset();
        self.busy.store(true, Ordering::SeqCst);
        BatchGuard { busy: &self.busy }
    }

    /// Route one Ctrl-C. Returns `true` when no batch is running and the
    /// session should end.
    pub fn interrupt(&self) -> bool {
        if self.busy.load(Ordering::SeqCst) {
            self.cancel.cancel();
            false
        } else {
            true
        }
    }
}

/// Held for the duration of one batch; see [`Interrupt::begin_batch`].
pub struct BatchGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Resolve a preset id against the catalog, for callers outside a session.
pub fn preset_dimensions(id: &str) -> Result<Dimensions, SessionError> {
    presets::resolve(id).ok_or_else(|| SessionError::UnknownPreset(id.to_string()))
}
