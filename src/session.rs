//! Edit-mode lifecycle for a single text file.

use std::path::{Path, PathBuf};

use crate::editor::{EditBuffer, EditOp, DEFAULT_TAB_WIDTH};
use crate::error::Result;
use crate::ports::TextStore;

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Idle,
    Editing,
    DiscardPending,
}

#[derive(Debug)]
enum State {
    Idle,
    Editing(EditBuffer),
    DiscardPending(EditBuffer),
}

/// Owns the edit buffer and the path it belongs to.
#[derive(Debug)]
pub struct EditSession {
    state: State,
    path: Option<PathBuf>,
    tab_width: usize,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(DEFAULT_TAB_WIDTH)
    }
}

impl EditSession {
    pub fn new(tab_width: usize) -> Self {
        Self {
            state: State::Idle,
            path: None,
            tab_width,
        }
    }

    pub fn phase(&self) -> EditPhase {
        match self.state {
            State::Idle => EditPhase::Idle,
            State::Editing(_) => EditPhase::Editing,
            State::DiscardPending(_) => EditPhase::DiscardPending,
        }
    }

    /// True while a buffer exists (Editing or DiscardPending).
    pub fn is_active(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match &self.state {
            State::Idle => None,
            State::Editing(buf) | State::DiscardPending(buf) => Some(buf),
        }
    }

    /// Only the viewport height may be changed from outside; edits go through `apply`.
    pub fn set_visible_height(&mut self, height: usize) {
        if let State::Editing(buf) | State::DiscardPending(buf) = &mut self.state {
            buf.visible_height = height;
            buf.ensure_cursor_visible();
        }
    }

    /// Start editing `path`, seeding the buffer from disk.
    ///
    /// Returns `Ok(false)` when the session is not Idle. A read failure
    /// leaves the session Idle.
    pub fn enter(&mut self, store: &dyn TextStore, path: &Path) -> Result<bool> {
        if self.is_active() {
            return Ok(false);
        }
        let content = store.read(path)?;
        self.state = State::Editing(EditBuffer::new(&content).with_tab_width(self.tab_width));
        self.path = Some(path.to_path_buf());
        log::info!("editing {}", path.display());
        Ok(true)
    }

    /// Editing -> DiscardPending. Returns whether the phase changed.
    pub fn request_exit(&mut self) -> bool {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Editing(buf) => {
                self.state = State::DiscardPending(buf);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Accepting drops the buffer; declining returns to Editing untouched.
    pub fn resolve_discard(&mut self, accepted: bool) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::DiscardPending(buf) => {
                if accepted {
                    log::info!("discarded edits to {}", self.path_display());
                    self.path = None;
                } else {
                    self.state = State::Editing(buf);
                }
            }
            other => self.state = other,
        }
    }

    /// Write the buffer (trailing whitespace trimmed) and return to Idle.
    ///
    /// Returns `Ok(None)` when not Editing and `Ok(Some(path))` on success.
    /// On failure the session stays Editing with the buffer intact.
    pub fn save(&mut self, store: &dyn TextStore) -> Result<Option<PathBuf>> {
        let (State::Editing(buf), Some(path)) = (&self.state, &self.path) else {
            return Ok(None);
        };
        let text = buf.text();
        store.write(path, text.trim_end())?;
        log::info!("saved {}", path.display());
        self.state = State::Idle;
        Ok(self.path.take())
    }

    /// Undo the last edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match &mut self.state {
            State::Editing(buf) => buf.undo(),
            _ => false,
        }
    }

    pub fn apply(&mut self, op: EditOp) -> bool {
        match &mut self.state {
            State::Editing(buf) => {
                buf.apply(op);
                true
            }
            _ => false,
        }
    }

    /// Drop the buffer unconditionally.
    pub fn discard(&mut self) {
        if self.is_active() {
            log::debug!("dropping edit buffer for {}", self.path_display());
        }
        self.state = State::Idle;
        self.path = None;
    }

    fn path_display(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}
