//! YAML configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::scan::ScanOptions;
use crate::timer::MIN_INTERVAL;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Root directory (or single file) to scan recursively for images.
    pub library_path: Option<PathBuf>,
    /// Time each image stays on screen before the timer advances.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Delay before the first timer tick after startup; defaults to `interval`.
    #[serde(with = "humantime_serde")]
    pub initial_delay: Option<Duration>,
    /// Number of past images reachable with "previous".
    pub history_size: usize,
    /// Recognised file extensions, matched case-insensitively.
    pub extensions: Vec<String>,
    /// Maximum directory depth below the root; unlimited when absent.
    pub max_depth: Option<usize>,
    /// Stop scanning after this many images; unlimited when absent.
    pub max_files: Option<usize>,
    pub follow_links: bool,
    /// Ignore dot-directories below the root.
    pub skip_hidden: bool,
    /// Optional deterministic seed for image selection.
    pub shuffle_seed: Option<u64>,
    /// Maximum number of concurrent image decodes in the loader.
    pub loader_max_concurrent_decodes: usize,
    /// Viewport size `[width, height]` the viewer fits images into.
    pub viewport: [u32; 2],
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(mut self) -> Result<Self> {
        ensure!(self.history_size >= 1, "history-size must be at least 1");
        ensure!(
            self.interval >= MIN_INTERVAL,
            "interval must be at least {}",
            humantime::format_duration(MIN_INTERVAL)
        );
        ensure!(
            self.max_depth.is_none_or(|d| d >= 1),
            "max-depth must be at least 1"
        );
        ensure!(
            self.max_files.is_none_or(|n| n >= 1),
            "max-files must be at least 1"
        );
        ensure!(
            self.loader_max_concurrent_decodes > 0,
            "loader-max-concurrent-decodes must be greater than zero"
        );
        ensure!(
            self.viewport[0] > 0 && self.viewport[1] > 0,
            "viewport dimensions must be positive"
        );
        self.extensions = self
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        ensure!(
            !self.extensions.is_empty(),
            "extensions must name at least one file type"
        );
        Ok(self)
    }

    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: true,
            max_depth: self.max_depth,
            max_files: self.max_files,
            exts: self.extensions.clone(),
            follow_links: self.follow_links,
            skip_hidden: self.skip_hidden,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            library_path: None,
            interval: Duration::from_secs(10 * 60),
            initial_delay: None,
            history_size: 5,
            extensions: vec!["jpg".to_string()],
            max_depth: None,
            max_files: None,
            follow_links: true,
            skip_hidden: true,
            shuffle_seed: None,
            loader_max_concurrent_decodes: 2,
            viewport: [500, 400],
        }
    }
}
