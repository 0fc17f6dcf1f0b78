//! Collaborator interfaces the browser core talks to.
//!
//! The core never reaches for a dialog, a widget or the filesystem directly;
//! the terminal adapter (or a test) plugs in implementations of these traits.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message the core wants shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Displays error and info notices.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Yes/no confirmation prompt for synchronous drivers.
#[cfg(test)]
pub trait ConfirmPrompt {
    fn ask(&mut self, question: &str) -> bool;
}

/// Picks a folder to browse. `None` means the user cancelled.
pub trait FolderChooser {
    fn choose(&mut self) -> Option<PathBuf>;
}

/// Picks a destination path for copy/move/rename. `None` means the user cancelled.
pub trait TargetChooser {
    fn choose(&mut self, suggested_name: &str) -> Option<PathBuf>;
}

/// Raw text read/write.
pub trait TextStore {
    fn read(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// `TextStore` backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl TextStore for DiskStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        fs::write(path, text)
    }
}
