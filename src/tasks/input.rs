//! Line-oriented command source.

use crate::events::Command;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Reads one command per line and forwards it to the display loop.
///
/// Blank lines are ignored. With `exit_on_eof` the whole app is cancelled when
/// input ends; otherwise the show keeps running without a command source.
pub async fn run<R>(
    reader: R,
    to_slideshow: Sender<Command>,
    cancel: CancellationToken,
    exit_on_eof: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    if exit_on_eof {
                        info!("input closed; shutting down");
                        cancel.cancel();
                    } else {
                        debug!("input closed");
                    }
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(cmd) => select! {
                        _ = cancel.cancelled() => break,
                        sent = to_slideshow.send(cmd) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    },
                    Err(err) => warn!(input = %line.trim(), error = %err, "ignoring command"),
                }
            }
        }
    }
    Ok(())
}
