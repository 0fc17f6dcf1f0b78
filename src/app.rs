use std::path::PathBuf;
use std::time::Instant;

use ratatui::layout::Rect;

use crate::controller::{Command, Confirmation, NavigationController, Step};
use crate::ports::{FolderChooser, Notice, NoticeLevel, Notifier, TargetChooser};
use crate::session::EditPhase;
use crate::theme::ThemeColors;

/// How long an info notice stays in the status bar.
const STATUS_TTL_SECS: u64 = 3;

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    OpenFolder,
    CopyTo,
    MoveTo,
    Rename,
    Confirm(Confirmation),
    Error { title: String, message: String },
}

impl DialogKind {
    /// Title for the path-input dialogs.
    pub fn input_title(&self) -> Option<&'static str> {
        match self {
            DialogKind::OpenFolder => Some("Open Folder"),
            DialogKind::CopyTo => Some("Copy To"),
            DialogKind::MoveTo => Some("Move To"),
            DialogKind::Rename => Some("Rename"),
            _ => None,
        }
    }
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
}

/// State for a dialog's text input.
#[derive(Debug, Default)]
pub struct DialogState {
    pub input: String,
    /// Byte offset into `input`.
    pub cursor_position: usize,
}

/// Hands the submitted dialog text to the controller as a chooser answer.
/// An empty input counts as a cancel.
pub struct InputChooser(Option<PathBuf>);

impl InputChooser {
    pub fn new(input: &str) -> Self {
        let trimmed = input.trim();
        Self((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
    }
}

impl FolderChooser for InputChooser {
    fn choose(&mut self) -> Option<PathBuf> {
        self.0.take()
    }
}

impl TargetChooser for InputChooser {
    fn choose(&mut self, _suggested_name: &str) -> Option<PathBuf> {
        self.0.take()
    }
}

/// Collects controller notices until the app turns them into UI state.
#[derive(Debug, Default)]
pub struct NoticeSink {
    pub status: Option<(String, Instant)>,
    pub errors: Vec<Notice>,
}

impl Notifier for NoticeSink {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => {
                let text = if notice.message.is_empty() {
                    notice.title
                } else {
                    format!("{}: {}", notice.title, notice.message)
                };
                self.status = Some((text, Instant::now()));
            }
            NoticeLevel::Error => self.errors.push(notice),
        }
    }
}

/// Main application state.
pub struct App {
    pub controller: NavigationController,
    pub theme: ThemeColors,
    pub should_quit: bool,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub notices: NoticeSink,
    pub show_help: bool,
    pub help_scroll: usize,
    /// Whether the file list panel is visible.
    pub show_list: bool,
    /// Inner area of the file list from the last draw, for mouse hit-testing.
    pub list_area: Rect,
    /// First visible row of the file list.
    pub list_offset: usize,
    /// Scroll offset of the text preview.
    pub preview_scroll: usize,
    pub preview_tab_width: usize,
    last_selected: Option<usize>,
}

impl App {
    pub fn new(controller: NavigationController, theme: ThemeColors) -> Self {
        Self {
            controller,
            theme,
            should_quit: false,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            notices: NoticeSink::default(),
            show_help: false,
            help_scroll: 0,
            show_list: true,
            list_area: Rect::default(),
            list_offset: 0,
            preview_scroll: 0,
            preview_tab_width: crate::editor::DEFAULT_TAB_WIDTH,
            last_selected: None,
        }
    }

    pub fn with_preview_tab_width(mut self, width: usize) -> Self {
        self.preview_tab_width = width.max(1);
        self
    }

    pub fn is_editing(&self) -> bool {
        self.controller.phase() != EditPhase::Idle
    }

    /// Dispatch a command and fold the outcome into the UI state.
    pub fn run(&mut self, command: Command) {
        let step = self.controller.dispatch(command);
        self.settle(step);
    }

    /// Answer the confirmation dialog.
    pub fn answer_confirmation(&mut self, accepted: bool) {
        self.close_dialog();
        let step = self.controller.resolve(accepted);
        self.settle(step);
    }

    /// Submit the open path-input dialog.
    pub fn submit_input(&mut self) {
        let AppMode::Dialog(kind) = self.mode.clone() else {
            return;
        };
        let mut chooser = InputChooser::new(&self.dialog_state.input);
        self.close_dialog();
        let step = match kind {
            DialogKind::OpenFolder => self.controller.choose_folder(&mut chooser),
            DialogKind::CopyTo => self.controller.copy_selected(&mut chooser),
            DialogKind::MoveTo => self.controller.move_selected(&mut chooser),
            DialogKind::Rename => self.controller.rename_selected(&mut chooser),
            _ => return,
        };
        self.settle(step);
    }

    /// Route notices, open a dialog for confirmations or errors, and reset
    /// the preview scroll when the selection moved.
    pub fn settle(&mut self, step: Step) {
        self.controller.forward_notices(&mut self.notices);
        if self.controller.quit_requested() {
            self.should_quit = true;
        }

        if let Step::NeedsConfirmation(confirmation) = step {
            self.open_dialog(DialogKind::Confirm(confirmation));
        } else if !self.notices.errors.is_empty() {
            let err = self.notices.errors.remove(0);
            self.open_dialog(DialogKind::Error {
                title: err.title,
                message: err.message,
            });
        }

        let selected = self.controller.selected_index();
        if selected != self.last_selected {
            self.preview_scroll = 0;
            self.last_selected = selected;
        }
    }

    /// Open a dialog of the given kind, pre-filling path inputs.
    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_state = DialogState::default();
        let prefill = match kind {
            DialogKind::OpenFolder => self
                .controller
                .catalog()
                .folder()
                .map(|p| p.display().to_string()),
            DialogKind::CopyTo | DialogKind::MoveTo | DialogKind::Rename => self
                .controller
                .selection()
                .map(|s| s.entry.name.clone()),
            _ => None,
        };
        if let Some(text) = prefill {
            self.dialog_state.cursor_position = text.len();
            self.dialog_state.input = text;
        }
        self.mode = AppMode::Dialog(kind);
    }

    /// Close the current dialog. Queued errors surface one at a time.
    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
        if !self.notices.errors.is_empty() && self.controller.pending_confirmation().is_none() {
            let err = self.notices.errors.remove(0);
            self.open_dialog(DialogKind::Error {
                title: err.title,
                message: err.message,
            });
        }
    }

    /// Insert a character at the current cursor position.
    pub fn dialog_input_char(&mut self, c: char) {
        self.dialog_state
            .input
            .insert(self.dialog_state.cursor_position, c);
        self.dialog_state.cursor_position += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn dialog_delete_char(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
            self.dialog_state
                .input
                .remove(self.dialog_state.cursor_position);
        }
    }

    pub fn dialog_move_cursor_left(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
        }
    }

    pub fn dialog_move_cursor_right(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(next) = self.dialog_state.input[pos..].chars().next() {
            self.dialog_state.cursor_position += next.len_utf8();
        }
    }

    pub fn dialog_cursor_home(&mut self) {
        self.dialog_state.cursor_position = 0;
    }

    pub fn dialog_cursor_end(&mut self) {
        self.dialog_state.cursor_position = self.dialog_state.input.len();
    }

    pub fn status_message(&self) -> Option<&str> {
        self.notices.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    /// Clear the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, created)) = &self.notices.status {
            if created.elapsed().as_secs() > STATUS_TTL_SECS {
                self.notices.status = None;
            }
        }
    }

    /// Map a click at terminal row `row` to a catalog index.
    pub fn list_index_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.list_area;
        if !self.show_list
            || column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let index = self.list_offset + (row - area.y) as usize;
        (index < self.controller.catalog().len()).then_some(index)
    }

    pub fn toggle_list(&mut self) {
        self.show_list = !self.show_list;
    }

    pub fn scroll_preview(&mut self, delta: isize) {
        self.preview_scroll = self.preview_scroll.saturating_add_signed(delta);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Quit, unless an edit buffer is open: then the controller asks to
    /// discard it first.
    pub fn request_quit(&mut self) {
        if self.is_editing() {
            self.run(Command::Quit);
        } else {
            self.quit();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::controller::ConfirmKind;
    use crate::fs::catalog::{CatalogFilter, FileCatalog};
    use crate::ports::DiskStore;
    use crate::preview::{
        ExtensionTable, HayroDocuments, ImageCrateDecoder, PreviewDispatcher, PreviewLimits,
    };
    use crate::session::EditSession;
    use crate::theme;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) fn setup_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let dispatcher = PreviewDispatcher::new(
            ExtensionTable::default(),
            PreviewLimits::default(),
            Box::new(ImageCrateDecoder),
            Box::new(HayroDocuments::default()),
        );
        let controller = NavigationController::new(
            FileCatalog::new(CatalogFilter::default()),
            dispatcher,
            EditSession::default(),
            Box::new(DiskStore),
        );
        let mut app = App::new(controller, theme::dark_theme());
        app.run(Command::OpenFolder(dir.path().to_path_buf()));
        (dir, app)
    }

    #[test]
    fn quit_sets_flag() {
        let (_dir, mut app) = setup_app();
        assert!(!app.should_quit);
        app.quit();
        assert!(app.should_quit);
    }

    #[test]
    fn open_folder_dialog_prefills_current_folder() {
        let (dir, mut app) = setup_app();
        app.open_dialog(DialogKind::OpenFolder);
        assert_eq!(app.mode, AppMode::Dialog(DialogKind::OpenFolder));
        assert_eq!(app.dialog_state.input, dir.path().display().to_string());
        assert_eq!(app.dialog_state.cursor_position, app.dialog_state.input.len());
    }

    #[test]
    fn rename_dialog_prefills_selected_name() {
        let (_dir, mut app) = setup_app();
        app.run(Command::Select(1));
        let expected = app.controller.catalog().get(1).unwrap().name.clone();
        app.open_dialog(DialogKind::Rename);
        assert_eq!(app.dialog_state.input, expected);
    }

    #[test]
    fn close_dialog_returns_to_normal() {
        let (_dir, mut app) = setup_app();
        app.open_dialog(DialogKind::CopyTo);
        app.close_dialog();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.dialog_state.input.is_empty());
        assert_eq!(app.dialog_state.cursor_position, 0);
    }

    #[test]
    fn dialog_input_char_inserts() {
        let (_dir, mut app) = setup_app();
        app.open_dialog(DialogKind::CopyTo);
        app.dialog_state = DialogState::default();
        app.dialog_input_char('a');
        app.dialog_input_char('b');
        app.dialog_input_char('c');
        assert_eq!(app.dialog_state.input, "abc");
        assert_eq!(app.dialog_state.cursor_position, 3);
    }

    #[test]
    fn dialog_delete_char_handles_multibyte() {
        let (_dir, mut app) = setup_app();
        app.dialog_input_char('é');
        app.dialog_input_char('x');
        app.dialog_delete_char();
        app.dialog_delete_char();
        assert!(app.dialog_state.input.is_empty());
        assert_eq!(app.dialog_state.cursor_position, 0);
        app.dialog_delete_char();
        assert_eq!(app.dialog_state.cursor_position, 0);
    }

    #[test]
    fn dialog_cursor_movement() {
        let (_dir, mut app) = setup_app();
        for c in "añb".chars() {
            app.dialog_input_char(c);
        }
        app.dialog_move_cursor_left();
        assert_eq!(app.dialog_state.cursor_position, 3);
        app.dialog_move_cursor_left();
        assert_eq!(app.dialog_state.cursor_position, 1);
        app.dialog_cursor_home();
        app.dialog_move_cursor_left();
        assert_eq!(app.dialog_state.cursor_position, 0);
        app.dialog_move_cursor_right();
        assert_eq!(app.dialog_state.cursor_position, 1);
        app.dialog_cursor_end();
        app.dialog_move_cursor_right();
        assert_eq!(app.dialog_state.cursor_position, 4);
    }

    #[test]
    fn submit_rename_renames_selected_file() {
        let (dir, mut app) = setup_app();
        app.run(Command::Select(0));
        let original = app.controller.catalog().get(0).unwrap().name.clone();
        app.open_dialog(DialogKind::Rename);
        app.dialog_state = DialogState::default();
        for c in "z.txt".chars() {
            app.dialog_input_char(c);
        }
        app.submit_input();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(dir.path().join("z.txt").exists());
        assert!(!dir.path().join(original).exists());
    }

    #[test]
    fn empty_input_is_a_cancel() {
        let (dir, mut app) = setup_app();
        app.run(Command::Select(0));
        app.open_dialog(DialogKind::CopyTo);
        app.dialog_state = DialogState::default();
        app.submit_input();
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn delete_opens_confirm_dialog() {
        let (dir, mut app) = setup_app();
        app.run(Command::Select(0));
        let name = app.controller.catalog().get(0).unwrap().name.clone();
        app.run(Command::DeleteSelected);
        match &app.mode {
            AppMode::Dialog(DialogKind::Confirm(c)) => {
                assert_eq!(c.kind, ConfirmKind::DeleteFile);
            }
            other => panic!("unexpected mode {:?}", other),
        }
        app.answer_confirmation(true);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(!dir.path().join(name).exists());
    }

    #[test]
    fn error_notice_opens_error_dialog() {
        let (dir, mut app) = setup_app();
        app.run(Command::OpenFolder(dir.path().join("missing")));
        assert!(matches!(
            app.mode,
            AppMode::Dialog(DialogKind::Error { .. })
        ));
        app.close_dialog();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn info_notice_goes_to_status_bar() {
        let (_dir, mut app) = setup_app();
        app.run(Command::ToggleEdit);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.status_message().is_some());
    }

    #[test]
    fn expired_status_is_cleared() {
        let (_dir, mut app) = setup_app();
        app.notices.status = Some((
            "old".to_string(),
            Instant::now() - std::time::Duration::from_secs(STATUS_TTL_SECS + 1),
        ));
        app.clear_expired_status();
        assert!(app.status_message().is_none());
    }

    #[test]
    fn list_index_at_maps_rows() {
        let (_dir, mut app) = setup_app();
        app.list_area = Rect::new(1, 1, 20, 10);
        assert_eq!(app.list_index_at(2, 1), Some(0));
        assert_eq!(app.list_index_at(2, 2), Some(1));
        assert_eq!(app.list_index_at(2, 3), None);
        assert_eq!(app.list_index_at(0, 1), None);
        app.toggle_list();
        assert_eq!(app.list_index_at(2, 1), None);
    }

    #[test]
    fn selection_change_resets_preview_scroll() {
        let (_dir, mut app) = setup_app();
        app.run(Command::Select(0));
        app.scroll_preview(5);
        assert_eq!(app.preview_scroll, 5);
        app.run(Command::Select(1));
        assert_eq!(app.preview_scroll, 0);
    }
}
