//! Per-book duplicate-trigger protection.
//!
//! Each pipeline operation claims its book before touching any state.
//! The claim is an atomic check-and-set on a shared set of active book
//! ids, released when the token drops, so a second trigger while a run is
//! active is rejected without partially mutating the record.

use fabula_core::BookId;
use fabula_error::{FabulaResult, PipelineError, PipelineErrorKind};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Shared registry of books with an active pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ActiveRuns {
    inner: Arc<Mutex<HashSet<BookId>>>,
}

impl ActiveRuns {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `book_id` for a run.
    ///
    /// # Errors
    ///
    /// Returns an already-running pipeline error if a claim is held.
    pub fn begin(&self, book_id: BookId) -> FabulaResult<RunToken> {
        let mut active = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if !active.insert(book_id) {
            return Err(PipelineError::new(PipelineErrorKind::AlreadyRunning(
                book_id.to_string(),
            ))
            .into());
        }

        Ok(RunToken {
            registry: Arc::clone(&self.inner),
            book_id,
        })
    }

    /// Whether `book_id` currently has an active run.
    pub fn is_active(&self, book_id: &BookId) -> bool {
        match self.inner.lock() {
            Ok(guard) => guard.contains(book_id),
            Err(poisoned) => poisoned.into_inner().contains(book_id),
        }
    }
}

/// Claim on one book, released on drop.
#[derive(Debug)]
pub struct RunToken {
    registry: Arc<Mutex<HashSet<BookId>>>,
    book_id: BookId,
}

impl Drop for RunToken {
    fn drop(&mut self) {
        let mut active = match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        active.remove(&self.book_id);
    }
}
