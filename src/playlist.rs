//! Random playlist with bounded back-history, shared by the timer and user commands.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, warn};

use crate::catalog::{ImageCatalog, ImageEntry};
use crate::error::Error;
use crate::history::HistoryRing;

/// Source of catalog indices for [`PlaylistController::next`].
pub trait Selector: Send {
    /// Pick an index in `[0, len)`; `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform draw with replacement.
#[derive(Debug)]
pub struct Uniform<R>(pub R);

impl<R: Rng + Send> Selector for Uniform<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

struct State {
    history: HistoryRing<Arc<ImageEntry>>,
    selector: Box<dyn Selector>,
}

/// Snapshot of playlist position for status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistStatus {
    pub catalog_len: usize,
    pub history_capacity: usize,
    pub history_filled: usize,
    pub cursor: Option<usize>,
    pub recorded: u64,
    pub current: Option<(usize, PathBuf)>,
}

impl fmt::Display for PlaylistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current {
            Some((index, path)) => write!(
                f,
                "image {} of {} ({}), history {}/{}",
                index + 1,
                self.catalog_len,
                path.display(),
                self.history_filled,
                self.history_capacity
            ),
            None => write!(f, "no image shown yet, {} in catalog", self.catalog_len),
        }
    }
}

/// Chooses what is shown next and remembers what was shown before.
///
/// All operations hold a single lock for their whole read-modify-write, so a timer
/// tick and a "previous" command never interleave.
pub struct PlaylistController {
    catalog: Arc<ImageCatalog>,
    state: Mutex<State>,
}

impl PlaylistController {
    /// Controller drawing from an OS-seeded generator.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCapacity`] if `history_capacity` is zero.
    pub fn new(catalog: Arc<ImageCatalog>, history_capacity: usize) -> Result<Self, Error> {
        Self::with_selector(
            catalog,
            history_capacity,
            Uniform(StdRng::from_os_rng()),
        )
    }

    /// Controller with a reproducible draw sequence.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCapacity`] if `history_capacity` is zero.
    pub fn with_seed(
        catalog: Arc<ImageCatalog>,
        history_capacity: usize,
        seed: u64,
    ) -> Result<Self, Error> {
        Self::with_selector(
            catalog,
            history_capacity,
            Uniform(StdRng::seed_from_u64(seed)),
        )
    }

    /// # Errors
    /// Returns [`Error::InvalidCapacity`] if `history_capacity` is zero.
    pub fn with_selector(
        catalog: Arc<ImageCatalog>,
        history_capacity: usize,
        selector: impl Selector + 'static,
    ) -> Result<Self, Error> {
        let history = HistoryRing::new(history_capacity)?;
        Ok(Self {
            catalog,
            state: Mutex::new(State {
                history,
                selector: Box::new(selector),
            }),
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<ImageCatalog> {
        &self.catalog
    }

    /// Draw a random entry, record it as current and return it.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if the selector produced an index outside
    /// the catalog. History is left untouched in that case.
    pub fn next(&self) -> Result<Arc<ImageEntry>, Error> {
        let mut state = self.state.lock();
        let len = self.catalog.len();
        let index = state.selector.pick(len);
        debug_assert!(index < len, "selector returned {index} for catalog of {len}");
        let entry = match self.catalog.entry_at(index) {
            Ok(entry) => Arc::clone(entry),
            Err(err) => {
                error!(index, len, "selection outside catalog bounds");
                return Err(err);
            }
        };
        let pos = state.history.record_new(Arc::clone(&entry));
        debug!(index, slot = pos, path = %entry.path().display(), "next");
        Ok(entry)
    }

    /// Step back in history; at the oldest remembered entry this returns the
    /// current entry again.
    ///
    /// # Errors
    /// Returns [`Error::NoCurrentImage`] if [`next`](Self::next) was never called.
    pub fn previous(&self) -> Result<Arc<ImageEntry>, Error> {
        let mut state = self.state.lock();
        if let Some(entry) = Self::step_locked(&mut state)? {
            return Ok(entry);
        }
        debug!("previous: at oldest remembered image");
        match state.history.current() {
            Some(entry) => Ok(Arc::clone(entry)),
            None => {
                warn!("history cursor set but current slot empty");
                Err(Error::NoCurrentImage)
            }
        }
    }

    /// Like [`previous`](Self::previous), but `Ok(None)` when the cursor did not move.
    ///
    /// Distinguishes "stepped back onto a repeat of the same image" from "already
    /// at the oldest remembered image".
    ///
    /// # Errors
    /// Returns [`Error::NoCurrentImage`] if [`next`](Self::next) was never called.
    pub fn step_back(&self) -> Result<Option<Arc<ImageEntry>>, Error> {
        Self::step_locked(&mut self.state.lock())
    }

    fn step_locked(state: &mut State) -> Result<Option<Arc<ImageEntry>>, Error> {
        let Some(entry) = state.history.step_back()?.map(Arc::clone) else {
            return Ok(None);
        };
        debug!(slot = ?state.history.cursor(), path = %entry.path().display(), "previous");
        Ok(Some(entry))
    }

    /// The entry currently displayed, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<ImageEntry>> {
        self.state.lock().history.current().cloned()
    }

    #[must_use]
    pub fn status(&self) -> PlaylistStatus {
        let state = self.state.lock();
        PlaylistStatus {
            catalog_len: self.catalog.len(),
            history_capacity: state.history.capacity(),
            history_filled: state.history.filled(),
            cursor: state.history.cursor(),
            recorded: state.history.recorded(),
            current: state
                .history
                .current()
                .map(|e| (e.index(), e.path().to_path_buf())),
        }
    }
}

impl fmt::Debug for PlaylistController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaylistController")
            .field("catalog_len", &self.catalog.len())
            .field("status", &self.status())
            .finish()
    }
}
