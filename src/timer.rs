//! Periodic tick source with pause/resume and live interval changes.
//!
//! Control requests are applied between ticks: a tick already handed to the
//! consumer is never recalled, and a new interval only affects deadlines computed
//! after the change.

use std::time::Duration;

use tokio::select;
use tokio::sync::mpsc::{self, Sender, UnboundedReceiver, UnboundedSender, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Shortest interval accepted; shorter requests are clamped.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// One timer fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Scheduled deadline this tick was fired for.
    pub fired_at: Instant,
}

#[derive(Debug, Clone, Copy)]
enum Control {
    Start,
    Stop,
    Restart,
    SetInterval(Duration),
}

/// Handle to a running interval timer. Dropping every handle stops the timer.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    ctl: UnboundedSender<Control>,
}

impl IntervalTimer {
    /// Spawn a timer task that delivers [`Tick`]s on `ticks`.
    ///
    /// When `running` is true the first tick fires after `initial_delay`. If the
    /// consumer has not taken the previous tick yet, the new one is dropped rather
    /// than queued.
    pub fn spawn(
        interval: Duration,
        initial_delay: Duration,
        running: bool,
        ticks: Sender<Tick>,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (ctl, ctl_rx) = mpsc::unbounded_channel();
        let first = running.then(|| Instant::now() + initial_delay);
        let handle = tokio::spawn(run(clamp(interval), first, ctl_rx, ticks, cancel));
        (Self { ctl }, handle)
    }

    /// Arm the timer if it is stopped; no effect while running.
    pub fn start(&self) {
        self.send(Control::Start);
    }

    /// Disarm the timer.
    pub fn stop(&self) {
        self.send(Control::Stop);
    }

    /// Arm the timer one full interval from now, whether or not it was running.
    pub fn restart(&self) {
        self.send(Control::Restart);
    }

    /// Use `interval` for every deadline computed from now on.
    pub fn set_interval(&self, interval: Duration) {
        self.send(Control::SetInterval(interval));
    }

    fn send(&self, ctl: Control) {
        if self.ctl.send(ctl).is_err() {
            debug!(?ctl, "timer task gone; control dropped");
        }
    }
}

fn clamp(interval: Duration) -> Duration {
    interval.max(MIN_INTERVAL)
}

async fn run(
    mut interval: Duration,
    mut deadline: Option<Instant>,
    mut ctl_rx: UnboundedReceiver<Control>,
    ticks: Sender<Tick>,
    cancel: CancellationToken,
) {
    loop {
        select! {
            biased;

            _ = cancel.cancelled() => break,

            ctl = ctl_rx.recv() => {
                let Some(ctl) = ctl else { break };
                let now = Instant::now();
                match ctl {
                    Control::Start => {
                        if deadline.is_none() {
                            deadline = Some(now + interval);
                        }
                    }
                    Control::Stop => deadline = None,
                    Control::Restart => deadline = Some(now + interval),
                    Control::SetInterval(d) => interval = clamp(d),
                }
                debug!(?ctl, ?interval, armed = deadline.is_some(), "timer control");
            }

            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let Some(fired_at) = deadline else { continue };
                match ticks.try_send(Tick { fired_at }) {
                    Ok(()) => trace!("tick"),
                    Err(TrySendError::Full(_)) => debug!("previous tick still pending; skipped"),
                    Err(TrySendError::Closed(_)) => break,
                }
                let now = Instant::now();
                let mut next = fired_at + interval;
                if next <= now {
                    next = now + interval;
                }
                deadline = Some(next);
            }
        }
    }
    debug!("timer stopped");
}
