//! Headless presenter for decoded images.

use crate::events::{PhotoLoaded, PreparedImageCpu};
use crate::layout::{center_offset, fit_within};
use anyhow::Result;
use std::path::PathBuf;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Placement of one decoded image inside the viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u64,
    pub path: PathBuf,
    pub source: (u32, u32),
    pub drawn: (u32, u32),
    pub offset: (u32, u32),
}

/// Headless presenter: fits each image into the viewport and ignores results
/// that arrive after a newer one was shown.
#[derive(Debug)]
pub struct Viewer {
    viewport: (u32, u32),
    last_seq: Option<u64>,
}

impl Viewer {
    pub fn new(viewport: [u32; 2]) -> Self {
        Self {
            viewport: (viewport[0], viewport[1]),
            last_seq: None,
        }
    }

    pub fn present(&mut self, img: PreparedImageCpu) -> Option<Frame> {
        if self.last_seq.is_some_and(|s| img.seq <= s) {
            debug!(seq = img.seq, path = %img.entry.path().display(), "stale frame dropped");
            return None;
        }
        self.last_seq = Some(img.seq);
        let (vw, vh) = self.viewport;
        let drawn = fit_within(vw, vh, img.width, img.height);
        let offset = center_offset(drawn.0, drawn.1, vw, vh);
        Some(Frame {
            seq: img.seq,
            path: img.entry.path().to_path_buf(),
            source: (img.width, img.height),
            drawn,
            offset,
        })
    }
}

pub async fn run(
    mut from_loader: Receiver<PhotoLoaded>,
    viewport: [u32; 2],
    cancel: CancellationToken,
) -> Result<()> {
    let mut viewer = Viewer::new(viewport);
    loop {
        select! {
            _ = cancel.cancelled() => break,
            maybe = from_loader.recv() => {
                let Some(PhotoLoaded(img)) = maybe else { break };
                if let Some(frame) = viewer.present(img) {
                    info!(
                        title = %frame.path.display(),
                        source = ?frame.source,
                        drawn = ?frame.drawn,
                        offset = ?frame.offset,
                        "displaying"
                    );
                }
            }
        }
    }
    Ok(())
}
