//! Timer-driven display loop: picks images and asks the loader to decode them.

use crate::catalog::ImageEntry;
use crate::events::{Command, InvalidPhoto, LoadPhoto};
use crate::playlist::PlaylistController;
use crate::timer::{IntervalTimer, Tick};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Timing for the display loop.
#[derive(Debug, Clone, Copy)]
pub struct SlideshowOptions {
    pub interval: Duration,
    /// Delay before the first tick; `None` waits a full interval.
    pub initial_delay: Option<Duration>,
}

struct Show {
    playlist: Arc<PlaylistController>,
    timer: IntervalTimer,
    to_loader: Sender<LoadPhoto>,
    interval: Duration,
    paused: bool,
    seq: u64,
    cancel: CancellationToken,
    // decode failures since the last successful request chain started
    failures: usize,
}

impl Show {
    // Gives up quietly on cancellation; the main loop sees the token next.
    async fn request(&mut self, entry: Arc<ImageEntry>) -> Result<()> {
        self.seq += 1;
        debug!(seq = self.seq, index = entry.index(), path = %entry.path().display(), "requesting");
        let req = LoadPhoto { seq: self.seq, entry };
        select! {
            biased;
            _ = self.cancel.cancelled() => Ok(()),
            sent = self.to_loader.send(req) => sent.context("loader channel closed"),
        }
    }

    async fn advance(&mut self) -> Result<()> {
        match self.playlist.next() {
            Ok(entry) => self.request(entry).await,
            Err(err) => {
                error!(error = %err, "no image available; keeping current one");
                Ok(())
            }
        }
    }

    // manual navigation gets a full interval on screen
    fn rearm(&self) {
        if !self.paused {
            self.timer.restart();
        }
    }

    async fn apply(&mut self, cmd: Command) -> Result<()> {
        info!(?cmd, "command");
        match cmd {
            Command::Pause => {
                self.paused = true;
                self.timer.stop();
            }
            Command::Resume => {
                self.paused = false;
                self.timer.restart();
            }
            Command::SetInterval(d) => {
                self.interval = d;
                self.timer.set_interval(d);
                self.rearm();
                info!(interval = %humantime::format_duration(d), "interval changed");
            }
            Command::Previous => match self.playlist.step_back() {
                Ok(Some(entry)) => {
                    self.failures = 0;
                    self.request(entry).await?;
                    self.rearm();
                }
                Ok(None) => debug!("already at oldest remembered image"),
                Err(err) => error!(error = %err, "previous failed"),
            },
            Command::Next => {
                self.failures = 0;
                self.advance().await?;
                self.rearm();
            }
            Command::Status => {
                info!(
                    status = %self.playlist.status(),
                    paused = self.paused,
                    interval = %humantime::format_duration(self.interval),
                    "status"
                );
            }
        }
        Ok(())
    }

    async fn on_invalid(&mut self, invalid: InvalidPhoto) -> Result<()> {
        if invalid.seq != self.seq {
            debug!(seq = invalid.seq, "stale decode failure ignored");
            return Ok(());
        }
        self.failures += 1;
        let limit = self.playlist.catalog().len();
        if self.failures >= limit {
            warn!(
                failures = self.failures,
                "no decodable image found; waiting for next tick"
            );
            self.failures = 0;
            return Ok(());
        }
        info!(path = %invalid.entry.path().display(), "skipping undecodable image");
        self.advance().await
    }
}

/// Drives the show: one image at startup, then one per timer tick, with user
/// commands applied between ticks.
#[instrument(skip_all, fields(interval = ?opts.interval))]
pub async fn run(
    playlist: Arc<PlaylistController>,
    mut commands: Receiver<Command>,
    mut invalid_rx: Receiver<InvalidPhoto>,
    to_loader: Sender<LoadPhoto>,
    opts: SlideshowOptions,
    cancel: CancellationToken,
) -> Result<()> {
    let (tick_tx, mut tick_rx) = mpsc::channel::<Tick>(1);
    let (timer, _timer_task) = IntervalTimer::spawn(
        opts.interval,
        opts.initial_delay.unwrap_or(opts.interval),
        true,
        tick_tx,
        cancel.child_token(),
    );
    let mut show = Show {
        playlist,
        timer,
        to_loader,
        interval: opts.interval,
        paused: false,
        seq: 0,
        cancel: cancel.clone(),
        failures: 0,
    };

    // Something is always current before any command can ask for "previous".
    show.advance().await?;

    let mut commands_open = true;
    loop {
        select! {
            biased;

            _ = cancel.cancelled() => break,

            cmd = commands.recv(), if commands_open => match cmd {
                Some(cmd) => show.apply(cmd).await?,
                None => {
                    debug!("command source closed");
                    commands_open = false;
                }
            },

            Some(invalid) = invalid_rx.recv() => show.on_invalid(invalid).await?,

            tick = tick_rx.recv() => match tick {
                Some(_) => {
                    show.failures = 0;
                    show.advance().await?;
                }
                None => break,
            },
        }
    }
    info!("slideshow stopped");
    Ok(())
}
