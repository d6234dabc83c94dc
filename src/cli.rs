//! Command-line surface: flags, config overrides and process exit codes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use crate::config::Configuration;

#[derive(Debug, Parser)]
#[command(name = "slideshow", about = "Random-order image slideshow")]
pub struct Cli {
    /// Directory (or single image) to show; overrides `library-path`
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override time per image (e.g. `15s`, `2m`)
    #[arg(long, value_name = "DURATION")]
    pub interval: Option<humantime::Duration>,

    /// Override number of images reachable with "previous"
    #[arg(long, value_name = "N")]
    pub history_size: Option<usize>,

    /// Override the cap on catalogued images
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Fixed seed for a reproducible order
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Quit when standard input is closed
    #[arg(long)]
    pub exit_on_eof: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// Failures detected before any task starts.
#[derive(Debug, thiserror::Error)]
pub enum Startup {
    #[error("no image directory given; pass ROOT or set library-path in the config")]
    MissingRoot,
    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),
}

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 64;
pub const EXIT_NO_INPUT: u8 = 66;
pub const EXIT_CONFIG: u8 = 78;

impl Cli {
    /// Read the config file (if any), apply flag overrides and validate.
    pub fn load_config(&self) -> Result<Configuration> {
        let mut cfg = match &self.config {
            Some(path) => Configuration::from_yaml_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Configuration::default(),
        };
        if let Some(root) = &self.root {
            cfg.library_path = Some(root.clone());
        }
        if let Some(interval) = self.interval {
            cfg.interval = interval.into();
        }
        if let Some(n) = self.history_size {
            cfg.history_size = n;
        }
        if self.max_files.is_some() {
            cfg.max_files = self.max_files;
        }
        if self.seed.is_some() {
            cfg.shuffle_seed = self.seed;
        }
        cfg.validated()
    }

    /// Validated configuration plus the directory to scan.
    pub fn resolve(&self) -> Result<(Configuration, PathBuf)> {
        let cfg = self.load_config().map_err(Startup::Config)?;
        let root = cfg.library_path.clone().ok_or(Startup::MissingRoot)?;
        Ok((cfg, root))
    }
}

/// Map a failure to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(startup) = err.downcast_ref::<Startup>() {
        return match startup {
            Startup::MissingRoot => EXIT_USAGE,
            Startup::Config(_) => EXIT_CONFIG,
        };
    }
    match err.downcast_ref::<crate::Error>() {
        Some(crate::Error::EmptyCatalog { .. } | crate::Error::BadRoot(_)) => EXIT_NO_INPUT,
        Some(crate::Error::InvalidCapacity(_)) => EXIT_CONFIG,
        _ => EXIT_FAILURE,
    }
}
