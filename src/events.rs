//! Messages passed between tasks, and the user command grammar.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::catalog::ImageEntry;

/// User command, as issued from the context menu or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    SetInterval(Duration),
    Previous,
    /// Skip ahead without waiting for the timer.
    Next,
    /// Report the current image number.
    Status,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`interval` needs a duration, e.g. `interval 15s`")]
    MissingInterval,
    #[error("invalid interval `{0}`: {1}")]
    BadInterval(String, String),
    #[error("`{0}` takes no argument")]
    UnexpectedArgument(String),
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandParseError::Empty);
        };
        let verb = verb.to_ascii_lowercase();
        let rest: Vec<&str> = words.collect();

        if matches!(verb.as_str(), "interval" | "i") {
            if rest.is_empty() {
                return Err(CommandParseError::MissingInterval);
            }
            let raw = rest.join(" ");
            return parse_interval(&raw).map(Command::SetInterval);
        }

        let cmd = match verb.as_str() {
            "pause" | "p" => Command::Pause,
            "resume" | "r" => Command::Resume,
            "previous" | "prev" | "back" | "b" => Command::Previous,
            "next" | "n" => Command::Next,
            "status" | "s" => Command::Status,
            _ => return Err(CommandParseError::Unknown(verb)),
        };
        if !rest.is_empty() {
            return Err(CommandParseError::UnexpectedArgument(verb));
        }
        Ok(cmd)
    }
}

// Bare integers are milliseconds; anything else goes through humantime.
fn parse_interval(raw: &str) -> Result<Duration, CommandParseError> {
    let parsed = if raw.chars().all(|c| c.is_ascii_digit()) {
        raw.parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| e.to_string())
    } else {
        humantime::parse_duration(raw).map_err(|e| e.to_string())
    };
    match parsed {
        Ok(d) if d.is_zero() => Err(CommandParseError::BadInterval(
            raw.to_string(),
            "must be positive".into(),
        )),
        Ok(d) => Ok(d),
        Err(e) => Err(CommandParseError::BadInterval(raw.to_string(), e)),
    }
}

/// Request to decode an entry. `seq` orders requests so stale results can be dropped.
#[derive(Debug, Clone)]
pub struct LoadPhoto {
    pub seq: u64,
    pub entry: Arc<ImageEntry>,
}

/// Decoded RGBA8 image ready for the viewer.
#[derive(Debug)]
pub struct PreparedImageCpu {
    pub seq: u64,
    pub entry: Arc<ImageEntry>,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug)]
pub struct PhotoLoaded(pub PreparedImageCpu);

/// The entry for request `seq` could not be decoded.
#[derive(Debug, Clone)]
pub struct InvalidPhoto {
    pub seq: u64,
    pub entry: Arc<ImageEntry>,
}
