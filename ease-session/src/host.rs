//! What the session needs from the surrounding application.

use ease_babel::OutlineEntry;
use std::path::PathBuf;

/// Callbacks into the host (desktop shell, CLI, tests).
///
/// Only [`Host::confirm`] is required; the notifications default to no-ops
/// and `choose_save_path` defaults to cancelling.
pub trait Host {
    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Ask where to save an untitled document. `None` cancels.
    fn choose_save_path(&mut self) -> Option<PathBuf> {
        None
    }

    fn status_changed(&mut self, _status: &str) {}

    fn recent_files_changed(&mut self, _files: &[PathBuf]) {}

    fn outline_changed(&mut self, _outline: &[OutlineEntry]) {}
}

/// Host that answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Host for FixedAnswer {
    fn confirm(&mut self, message: &str) -> bool {
        tracing::debug!(answer = self.0, "{message}");
        self.0
    }
}
