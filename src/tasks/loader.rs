//! Off-runtime image decoding with EXIF orientation.

use crate::events::{InvalidPhoto, LoadPhoto, PhotoLoaded, PreparedImageCpu};
use anyhow::Result;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender, error::TrySendError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Decode to RGBA8 with EXIF orientation applied (best effort; missing metadata
/// leaves the image as stored).
pub fn decode_rgba8_apply_exif(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    let orientation = read_orientation(path).unwrap_or(1);
    Ok(apply_orientation(img, orientation))
}

fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    use image::imageops::{flip_horizontal, flip_vertical, rotate90, rotate180, rotate270};
    match orientation {
        2 => flip_horizontal(&img),
        3 => rotate180(&img),
        4 => flip_vertical(&img),
        5 => flip_horizontal(&rotate90(&img)),
        6 => rotate90(&img),
        7 => flip_horizontal(&rotate270(&img)),
        8 => rotate270(&img),
        _ => img,
    }
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let o = u16::try_from(field.value.get_uint(0)?).ok()?;
    debug!(orientation = o, path = %path.display(), "exif orientation");
    Some(o)
}

type DecodeResult = (LoadPhoto, Option<RgbaImage>);

/// Decodes requested entries off the async runtime.
///
/// Successful decodes go to the viewer; failures are reported back to the
/// display loop so it can move on. At most `max_in_flight` decodes run at once.
#[instrument(skip(load_rx, invalid_tx, to_viewer, cancel))]
pub async fn run(
    mut load_rx: Receiver<LoadPhoto>,
    invalid_tx: Sender<InvalidPhoto>,
    to_viewer: Sender<PhotoLoaded>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let max_in_flight = max_in_flight.max(1);
    let mut tasks: JoinSet<DecodeResult> = JoinSet::new();
    let mut requests_open = true;

    loop {
        select! {
            _ = cancel.cancelled() => break,

            req = load_rx.recv(), if requests_open && tasks.len() < max_in_flight => {
                match req {
                    Some(req) => {
                        debug!(seq = req.seq, path = %req.entry.path().display(), "decode requested");
                        tasks.spawn(async move {
                            let path = req.entry.path().to_path_buf();
                            let res = tokio::task::spawn_blocking(move || decode_rgba8_apply_exif(&path)).await;
                            let img = match res {
                                Ok(Ok(img)) => Some(img),
                                Ok(Err(err)) => {
                                    warn!(path = %req.entry.path().display(), error = %err, "decode failed");
                                    None
                                }
                                Err(err) => {
                                    warn!(error = %err, "decode task aborted");
                                    None
                                }
                            };
                            (req, img)
                        });
                    }
                    None => requests_open = false,
                }
            }

            Some(joined) = tasks.join_next() => {
                let Ok((req, img)) = joined else { continue };
                match img {
                    Some(rgba8) => {
                        let (width, height) = rgba8.dimensions();
                        let prepared = PreparedImageCpu {
                            seq: req.seq,
                            entry: req.entry,
                            width,
                            height,
                            pixels: rgba8.into_raw(),
                        };
                        select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            sent = to_viewer.send(PhotoLoaded(prepared)) => {
                                if sent.is_err() {
                                    debug!("viewer channel closed");
                                    break;
                                }
                            }
                        }
                    }
                    None => {
                        // never wait on the display loop; it may be waiting on us
                        let report = InvalidPhoto { seq: req.seq, entry: req.entry };
                        match invalid_tx.try_send(report) {
                            Ok(()) => {}
                            Err(TrySendError::Full(r)) => {
                                warn!(seq = r.seq, path = %r.entry.path().display(), "failure report dropped; display loop busy");
                            }
                            Err(TrySendError::Closed(_)) => debug!("display loop gone"),
                        }
                    }
                }
            }

            else => break,
        }
    }
    Ok(())
}
