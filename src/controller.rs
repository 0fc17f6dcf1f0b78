//! Top-level browser state machine.
//!
//! Every user action enters through `NavigationController::dispatch`. Commands
//! that would move the selection or the folder while a file is being edited are
//! parked as a `PendingAction` behind a discard confirmation and replayed once
//! the user accepts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::editor::{EditBuffer, EditOp};
use crate::error::AppError;
use crate::fs::catalog::{CatalogEntry, FileCatalog};
use crate::fs::operations;
use crate::pagination::PaginationState;
#[cfg(test)]
use crate::ports::ConfirmPrompt;
use crate::ports::{FolderChooser, Notice, Notifier, TargetChooser, TextStore};
use crate::preview::{PreviewCategory, PreviewContent, PreviewDispatcher};
use crate::session::{EditPhase, EditSession};

/// A user intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenFolder(PathBuf),
    Reload,
    Select(usize),
    SelectNext,
    SelectPrevious,
    ToggleEdit,
    Save,
    Undo,
    Edit(EditOp),
    NextPage,
    PrevPage,
    CopySelected(PathBuf),
    MoveSelected(PathBuf),
    RenameSelected(PathBuf),
    DeleteSelected,
    Quit,
}

impl Command {
    /// Commands that replace the selection or the folder.
    fn leaves_file(&self) -> bool {
        matches!(
            self,
            Command::OpenFolder(_)
                | Command::Reload
                | Command::Select(_)
                | Command::CopySelected(_)
                | Command::MoveSelected(_)
                | Command::RenameSelected(_)
                | Command::DeleteSelected
                | Command::Quit
        )
    }

    /// Commands that settle the preview themselves once replayed, so the
    /// discarded file needs no re-render first.
    fn replaces_preview(&self) -> bool {
        matches!(
            self,
            Command::OpenFolder(_) | Command::Reload | Command::Select(_) | Command::Quit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    DiscardChanges,
    DeleteFile,
}

/// A yes/no question the adapter must put to the user before anything else happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub kind: ConfirmKind,
    pub title: String,
    pub question: String,
}

impl Confirmation {
    fn discard() -> Self {
        Self {
            kind: ConfirmKind::DiscardChanges,
            title: "Discard changes".to_string(),
            question: "Discard changes made in edit mode?".to_string(),
        }
    }

    fn delete(name: &str) -> Self {
        Self {
            kind: ConfirmKind::DeleteFile,
            title: "Delete file".to_string(),
            question: format!("Delete '{}'?", name),
        }
    }
}

/// Outcome of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// State changed (or a notice was queued).
    Done,
    /// Nothing to do in the current state.
    Ignored,
    /// Call `resolve` with the user's answer.
    NeedsConfirmation(Confirmation),
}

#[derive(Debug, Clone, PartialEq)]
enum PendingAction {
    /// Leave edit mode without a follow-up command.
    ExitEdit,
    /// Drop the edit buffer, then run the command.
    Replay(Command),
    DeleteFile(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadTrigger {
    /// The user asked for the folder; failure clears everything.
    Requested,
    /// Rebuild after a file operation; failure keeps the old listing.
    Refresh,
}

/// The selected catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub entry: CatalogEntry,
}

pub struct NavigationController {
    catalog: FileCatalog,
    dispatcher: PreviewDispatcher,
    pagination: PaginationState,
    session: EditSession,
    store: Box<dyn TextStore>,
    selection: Option<Selection>,
    category: Option<PreviewCategory>,
    preview: PreviewContent,
    pending: Option<(PendingAction, Confirmation)>,
    notices: Vec<Notice>,
    quit_requested: bool,
}

impl NavigationController {
    pub fn new(
        catalog: FileCatalog,
        dispatcher: PreviewDispatcher,
        session: EditSession,
        store: Box<dyn TextStore>,
    ) -> Self {
        Self {
            catalog,
            dispatcher,
            pagination: PaginationState::default(),
            session,
            store,
            selection: None,
            category: None,
            preview: PreviewContent::Empty,
            pending: None,
            notices: Vec::new(),
            quit_requested: false,
        }
    }

    // ── Read access for the adapter ───────────────────────────────────

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.as_ref().map(|s| s.index)
    }

    pub fn selected_category(&self) -> Option<PreviewCategory> {
        self.category
    }

    /// How `name` would be previewed, without rendering it.
    pub fn category_of(&self, name: &str) -> PreviewCategory {
        self.dispatcher.classify(name)
    }

    pub fn preview(&self) -> &PreviewContent {
        &self.preview
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn phase(&self) -> EditPhase {
        self.session.phase()
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.session.buffer()
    }

    pub fn set_editor_height(&mut self, height: usize) {
        self.session.set_visible_height(height);
    }

    /// Set once `Quit` got past the discard guard.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.pending.as_ref().map(|(_, c)| c)
    }

    #[cfg(test)]
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn forward_notices(&mut self, notifier: &mut dyn Notifier) {
        for notice in self.notices.drain(..) {
            notifier.notify(notice);
        }
    }

    // ── Entry points ──────────────────────────────────────────────────

    pub fn dispatch(&mut self, command: Command) -> Step {
        if self.pending.is_some() {
            log::debug!("ignoring {:?} while a confirmation is open", command);
            return Step::Ignored;
        }

        if self.session.phase() == EditPhase::Editing && command.leaves_file() {
            if let Command::Select(k) = command {
                if Some(k) == self.selected_index() || k >= self.catalog.len() {
                    return Step::Ignored;
                }
            }
            return self.ask_discard(PendingAction::Replay(command));
        }

        match command {
            Command::OpenFolder(path) => self.load_folder(&path, LoadTrigger::Requested),
            Command::Reload => match self.catalog.folder().map(Path::to_path_buf) {
                Some(folder) => self.load_folder(&folder, LoadTrigger::Requested),
                None => Step::Ignored,
            },
            Command::Select(index) => self.select(index),
            Command::SelectNext => self.step_selection(true),
            Command::SelectPrevious => self.step_selection(false),
            Command::ToggleEdit => self.toggle_edit(),
            Command::Save => self.save(),
            Command::Undo => {
                if self.session.undo() {
                    Step::Done
                } else {
                    Step::Ignored
                }
            }
            Command::Edit(op) => {
                if self.session.apply(op) {
                    Step::Done
                } else {
                    Step::Ignored
                }
            }
            Command::NextPage => self.turn_page(true),
            Command::PrevPage => self.turn_page(false),
            Command::CopySelected(dest) => self.copy_selected_to(&dest),
            Command::MoveSelected(dest) => self.move_selected_to(&dest),
            Command::RenameSelected(dest) => self.rename_selected_to(&dest),
            Command::DeleteSelected => self.ask_delete(),
            Command::Quit => {
                log::info!("quit requested");
                self.quit_requested = true;
                Step::Done
            }
        }
    }

    /// Answer the outstanding confirmation.
    pub fn resolve(&mut self, accepted: bool) -> Step {
        let Some((action, _)) = self.pending.take() else {
            return Step::Ignored;
        };
        match action {
            PendingAction::ExitEdit => {
                self.session.resolve_discard(accepted);
                if !accepted {
                    return Step::Ignored;
                }
                self.render_selected();
                Step::Done
            }
            PendingAction::Replay(command) => {
                self.session.resolve_discard(accepted);
                if !accepted {
                    return Step::Ignored;
                }
                if !command.replaces_preview() {
                    self.render_selected();
                }
                self.dispatch(command)
            }
            PendingAction::DeleteFile(path) => {
                if !accepted {
                    return Step::Ignored;
                }
                self.delete(&path)
            }
        }
    }

    /// Dispatch `command` and settle every confirmation it raises through `prompt`.
    /// The terminal answers confirmations through its own dialog, so only
    /// synchronous drivers use this.
    #[cfg(test)]
    pub fn dispatch_with(&mut self, command: Command, prompt: &mut dyn ConfirmPrompt) -> Step {
        let mut step = self.dispatch(command);
        while let Step::NeedsConfirmation(confirmation) = &step {
            let accepted = prompt.ask(&confirmation.question);
            step = self.resolve(accepted);
        }
        step
    }

    /// Ask `chooser` for a folder and open it. Cancelling is a no-op.
    /// Relative answers are taken from the current folder, like copy/move targets.
    pub fn choose_folder(&mut self, chooser: &mut dyn FolderChooser) -> Step {
        let Some(path) = chooser.choose() else {
            return Step::Ignored;
        };
        let path = match self.catalog.folder() {
            Some(folder) if path.is_relative() => {
                let joined = folder.join(path);
                fs::canonicalize(&joined).unwrap_or(joined)
            }
            _ => path,
        };
        self.dispatch(Command::OpenFolder(path))
    }

    pub fn copy_selected(&mut self, chooser: &mut dyn TargetChooser) -> Step {
        self.with_target(chooser, Command::CopySelected)
    }

    pub fn move_selected(&mut self, chooser: &mut dyn TargetChooser) -> Step {
        self.with_target(chooser, Command::MoveSelected)
    }

    pub fn rename_selected(&mut self, chooser: &mut dyn TargetChooser) -> Step {
        self.with_target(chooser, Command::RenameSelected)
    }

    fn with_target(
        &mut self,
        chooser: &mut dyn TargetChooser,
        make: fn(PathBuf) -> Command,
    ) -> Step {
        let Some(name) = self.selection.as_ref().map(|s| s.entry.name.clone()) else {
            self.notice_no_selection();
            return Step::Ignored;
        };
        match chooser.choose(&name) {
            Some(dest) => self.dispatch(make(dest)),
            None => Step::Ignored,
        }
    }

    // ── Folder and selection ──────────────────────────────────────────

    fn load_folder(&mut self, folder: &Path, trigger: LoadTrigger) -> Step {
        match self.catalog.load(folder) {
            Ok(entries) => {
                log::info!("loaded {} files from {}", entries.len(), folder.display());
                self.session.discard();
                self.clear_selection();
            }
            Err(e) => {
                log::warn!("cannot list {}: {}", folder.display(), e);
                if trigger == LoadTrigger::Requested {
                    self.session.discard();
                    self.catalog.clear();
                    self.clear_selection();
                }
                self.notices.push(Notice::error(
                    "Cannot open folder",
                    format!("{}: {}", folder.display(), e),
                ));
            }
        }
        Step::Done
    }

    fn clear_selection(&mut self) {
        self.selection = None;
        self.category = None;
        self.preview.release();
        self.pagination.reset(1);
    }

    fn select(&mut self, index: usize) -> Step {
        let Some(entry) = self.catalog.get(index).cloned() else {
            return Step::Ignored;
        };
        log::debug!("select {} ({})", index, entry.name);
        self.selection = Some(Selection { index, entry });
        self.render_selected();
        Step::Done
    }

    fn step_selection(&mut self, forward: bool) -> Step {
        if self.session.is_active() || self.catalog.is_empty() {
            return Step::Ignored;
        }
        let target = match self.selected_index() {
            None => 0,
            Some(i) if forward && i + 1 < self.catalog.len() => i + 1,
            Some(i) if !forward && i > 0 => i - 1,
            Some(_) => return Step::Ignored,
        };
        self.select(target)
    }

    /// Re-render the selected entry from disk starting at its first page.
    fn render_selected(&mut self) {
        self.preview.release();
        let Some((path, category)) = self.selected_path_and_category() else {
            self.category = None;
            self.pagination.reset(1);
            return;
        };
        let content = self
            .dispatcher
            .render(self.store.as_ref(), &path, category, 0);
        self.category = Some(category);
        self.pagination.reset(content.page_count());
        self.preview.replace(content);
    }

    fn selected_path_and_category(&self) -> Option<(PathBuf, PreviewCategory)> {
        let selection = self.selection.as_ref()?;
        let path = self.catalog.path_of(selection.index)?;
        Some((path, self.dispatcher.classify(&selection.entry.name)))
    }

    fn turn_page(&mut self, forward: bool) -> Step {
        if self.session.is_active() || !matches!(self.preview, PreviewContent::Document { .. }) {
            return Step::Ignored;
        }
        let moved = if forward {
            self.pagination.next()
        } else {
            self.pagination.prev()
        };
        if !moved {
            return Step::Ignored;
        }
        let Some((path, category)) = self.selected_path_and_category() else {
            return Step::Ignored;
        };
        self.preview.release();
        let content = self.dispatcher.render(
            self.store.as_ref(),
            &path,
            category,
            self.pagination.index(),
        );
        if !matches!(content, PreviewContent::Document { .. }) {
            self.pagination.reset(1);
        }
        self.preview.replace(content);
        Step::Done
    }

    // ── Edit mode ─────────────────────────────────────────────────────

    fn ask_discard(&mut self, action: PendingAction) -> Step {
        self.session.request_exit();
        let confirmation = Confirmation::discard();
        self.pending = Some((action, confirmation.clone()));
        Step::NeedsConfirmation(confirmation)
    }

    fn toggle_edit(&mut self) -> Step {
        if self.session.phase() == EditPhase::Editing {
            return self.ask_discard(PendingAction::ExitEdit);
        }
        let Some((path, category)) = self.selected_path_and_category() else {
            self.notice_no_selection();
            return Step::Ignored;
        };
        if !category.is_editable() {
            self.notices.push(Notice::info(
                "Edit",
                format!("{} files can't be edited", category.label()),
            ));
            return Step::Ignored;
        }
        match self.session.enter(self.store.as_ref(), &path) {
            Ok(true) => {
                self.preview.release();
                self.pagination.reset(1);
                Step::Done
            }
            Ok(false) => Step::Ignored,
            Err(e) => {
                log::warn!("cannot edit {}: {}", path.display(), e);
                self.notices
                    .push(Notice::error("Cannot edit file", e.to_string()));
                Step::Done
            }
        }
    }

    fn save(&mut self) -> Step {
        if self.session.phase() != EditPhase::Editing {
            return Step::Ignored;
        }
        match self.session.save(self.store.as_ref()) {
            Ok(Some(path)) => {
                self.notices
                    .push(Notice::info("Saved", path.display().to_string()));
                self.render_selected();
                Step::Done
            }
            Ok(None) => Step::Ignored,
            Err(e) => {
                log::warn!("save failed: {}", e);
                self.notices.push(Notice::error("Save failed", e.to_string()));
                Step::Done
            }
        }
    }

    // ── File operations ───────────────────────────────────────────────

    fn notice_no_selection(&mut self) {
        self.notices
            .push(Notice::info("No file selected", "Select a file first."));
    }

    /// Source path and a resolved destination. Relative destinations are taken
    /// from the current folder; an existing directory receives the file under its
    /// own name.
    fn resolve_target(&mut self, dest: &Path) -> Option<(PathBuf, PathBuf)> {
        let Some(selection) = self.selection.as_ref() else {
            self.notice_no_selection();
            return None;
        };
        let name = selection.entry.name.clone();
        let source = self.catalog.path_of(selection.index)?;
        let folder = self.catalog.folder()?;
        let mut target = if dest.is_absolute() {
            dest.to_path_buf()
        } else {
            folder.join(dest)
        };
        if target.is_dir() {
            target.push(name);
        }
        Some((source, target))
    }

    fn in_current_folder(&self, path: &Path) -> bool {
        let (Some(folder), Some(parent)) = (self.catalog.folder(), path.parent()) else {
            return false;
        };
        match (fs::canonicalize(folder), fs::canonicalize(parent)) {
            (Ok(a), Ok(b)) => a == b,
            _ => folder == parent,
        }
    }

    fn refresh(&mut self) {
        if let Some(folder) = self.catalog.folder().map(Path::to_path_buf) {
            self.load_folder(&folder, LoadTrigger::Refresh);
        }
    }

    fn copy_selected_to(&mut self, dest: &Path) -> Step {
        let Some((source, target)) = self.resolve_target(dest) else {
            return Step::Ignored;
        };
        match operations::copy_file(&source, &target) {
            Ok(()) => {
                log::info!("copied {} to {}", source.display(), target.display());
                if self.in_current_folder(&target) {
                    self.refresh();
                }
                self.notices
                    .push(Notice::info("Copied", target.display().to_string()));
            }
            Err(e) => self.operation_failed("Copy failed", &source, e),
        }
        Step::Done
    }

    fn move_selected_to(&mut self, dest: &Path) -> Step {
        let Some((source, target)) = self.resolve_target(dest) else {
            return Step::Ignored;
        };
        match operations::move_file(&source, &target) {
            Ok(()) => {
                log::info!("moved {} to {}", source.display(), target.display());
                self.refresh();
                self.notices
                    .push(Notice::info("Moved", target.display().to_string()));
            }
            Err(e) => self.operation_failed("Move failed", &source, e),
        }
        Step::Done
    }

    fn rename_selected_to(&mut self, dest: &Path) -> Step {
        let Some((source, target)) = self.resolve_target(dest) else {
            return Step::Ignored;
        };
        match operations::rename_file(&source, &target) {
            Ok(()) => {
                log::info!("renamed {} to {}", source.display(), target.display());
                self.refresh();
                self.notices
                    .push(Notice::info("Renamed", target.display().to_string()));
            }
            Err(e) => self.operation_failed("Rename failed", &source, e),
        }
        Step::Done
    }

    fn ask_delete(&mut self) -> Step {
        let Some(selection) = self.selection.as_ref() else {
            self.notice_no_selection();
            return Step::Ignored;
        };
        let confirmation = Confirmation::delete(&selection.entry.name);
        let Some(path) = self.catalog.path_of(selection.index) else {
            return Step::Ignored;
        };
        self.pending = Some((PendingAction::DeleteFile(path), confirmation.clone()));
        Step::NeedsConfirmation(confirmation)
    }

    fn delete(&mut self, path: &Path) -> Step {
        match operations::delete_file(path) {
            Ok(()) => {
                log::info!("deleted {}", path.display());
                self.refresh();
                self.notices
                    .push(Notice::info("Deleted", path.display().to_string()));
            }
            Err(e) => self.operation_failed("Delete failed", path, e),
        }
        Step::Done
    }

    fn operation_failed(&mut self, title: &str, path: &Path, err: AppError) {
        log::warn!("{} for {}: {}", title, path.display(), err);
        self.notices.push(Notice::error(title, err.to_string()));
    }
}
