//! Configuration module.
//!
//! Handles loading and validating `quickconvert.toml`. Every value has a
//! default, so the file is optional and sparse. Command-line flags override
//! whatever the file says.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! directory = "converted"   # Where converted files are written
//!
//! [encoding]
//! quality = 90              # JPEG quality (1-100)
//!
//! [resize]
//! filter = "lanczos3"       # nearest | triangle | catmullrom | gaussian | lanczos3
//! default_width = 300       # Custom size used when no preset is chosen
//! default_height = 400
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Dimensions, Quality, ResizeFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "quickconvert.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub encoding: EncodingConfig,
    pub resize: ResizeConfig,
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encoding.quality) {
            return Err(ConfigError::Validation(
                "encoding.quality must be 1-100".into(),
            ));
        }
        if self.resize.default_width == 0 || self.resize.default_height == 0 {
            return Err(ConfigError::Validation(
                "resize.default_width and resize.default_height must be non-zero".into(),
            ));
        }
        if self.output.directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.encoding.quality)
    }

    pub fn default_dimensions(&self) -> Dimensions {
        Dimensions::new(self.resize.default_width, self.resize.default_height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("converted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG quality (1 = worst, 100 = best). PNG and WebP output is lossless.
    pub quality: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub filter: ResizeFilter,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            filter: ResizeFilter::default(),
            default_width: 300,
            default_height: 400,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel conversion workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Parse and validate config text.
pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file, or from `quickconvert.toml` in `dir`.
///
/// An explicit path must exist; the implicit one falls back to defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let implicit = dir.join(CONFIG_FILENAME);
            if !implicit.exists() {
                return Ok(AppConfig::default());
            }
            implicit
        }
    };
    parse_config(&fs::read_to_string(path)?)
}

/// A documented stock config with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# quickconvert configuration
# Every value below is the built-in default. Delete what you don't change.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory converted files are written to. Created if missing.
# Existing files are never overwritten: "a.png" becomes "a (1).png".
directory = "converted"

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality (1 = worst, 100 = best). PNG and WebP output is lossless.
quality = 90

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Resampling filter: nearest, triangle, catmullrom, gaussian, lanczos3.
filter = "lanczos3"

# Custom target size in pixels, used when no preset is selected.
default_width = 300
default_height = 400

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel conversion workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"#
}
