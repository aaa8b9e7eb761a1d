//! Shared helpers for session tests.

use ease_babel::OutlineEntry;
use ease_session::{Host, MemoryStore, Session};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Host with scripted answers that records everything it is told.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    pub answers: VecDeque<bool>,
    pub prompts: Vec<String>,
    pub save_path: Option<PathBuf>,
    pub statuses: Vec<String>,
    pub recents: Vec<Vec<PathBuf>>,
    pub outlines: usize,
}

impl ScriptedHost {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl Host for ScriptedHost {
    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }

    fn choose_save_path(&mut self) -> Option<PathBuf> {
        self.save_path.take()
    }

    fn status_changed(&mut self, status: &str) {
        self.statuses.push(status.to_string());
    }

    fn recent_files_changed(&mut self, files: &[PathBuf]) {
        self.recents.push(files.to_vec());
    }

    fn outline_changed(&mut self, _outline: &[OutlineEntry]) {
        self.outlines += 1;
    }
}

pub fn session(store: MemoryStore, answers: &[bool]) -> Session<MemoryStore, ScriptedHost> {
    Session::init(store, ScriptedHost::answering(answers))
}

pub fn write(path: &Path, text: &str) {
    std::fs::write(path, text).unwrap();
}
