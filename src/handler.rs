use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode, DialogKind, InputChooser};
use crate::components::help::HelpOverlay;
use crate::controller::Command;
use crate::editor::EditOp;
use crate::session::EditPhase;

/// Lines scrolled per Ctrl+D / Ctrl+U in the text preview.
const PREVIEW_SCROLL_STEP: isize = 10;

/// Handle a key event based on the current app mode.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return;
    }

    if app.show_help {
        handle_help_mode(app, key);
        return;
    }

    match app.mode.clone() {
        AppMode::Dialog(DialogKind::Confirm(_)) => handle_confirm_mode(app, key),
        AppMode::Dialog(DialogKind::Error { .. }) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                app.close_dialog();
            }
        }
        AppMode::Dialog(_) => handle_input_mode(app, key),
        AppMode::Normal => match app.controller.phase() {
            EditPhase::Editing => handle_edit_mode(app, key),
            // The confirm dialog owns input until it is answered.
            EditPhase::DiscardPending => {}
            EditPhase::Idle => handle_normal_mode(app, key),
        },
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        KeyCode::Char('d') if ctrl => app.scroll_preview(PREVIEW_SCROLL_STEP),
        KeyCode::Char('u') if ctrl => app.scroll_preview(-PREVIEW_SCROLL_STEP),
        KeyCode::Char('r') if ctrl => app.run(Command::Reload),
        KeyCode::F(5) => app.run(Command::Reload),
        KeyCode::Char('j') | KeyCode::Down => app.run(Command::SelectNext),
        KeyCode::Char('k') | KeyCode::Up => app.run(Command::SelectPrevious),
        KeyCode::Char('g') | KeyCode::Home => app.run(Command::Select(0)),
        KeyCode::Char('G') | KeyCode::End => {
            let len = app.controller.catalog().len();
            if len > 0 {
                app.run(Command::Select(len - 1));
            }
        }
        KeyCode::Enter | KeyCode::Char('e') => app.run(Command::ToggleEdit),
        KeyCode::Char('n') | KeyCode::PageDown | KeyCode::Right => app.run(Command::NextPage),
        KeyCode::Char('p') | KeyCode::PageUp | KeyCode::Left => app.run(Command::PrevPage),
        KeyCode::Char('o') => app.open_dialog(DialogKind::OpenFolder),
        KeyCode::Char('c') => open_target_dialog(app, DialogKind::CopyTo),
        KeyCode::Char('m') => open_target_dialog(app, DialogKind::MoveTo),
        KeyCode::Char('r') => open_target_dialog(app, DialogKind::Rename),
        KeyCode::Char('d') | KeyCode::Delete => app.run(Command::DeleteSelected),
        KeyCode::Tab => app.toggle_list(),
        _ => {}
    }
}

/// Copy/move/rename need a selection before a path is worth asking for.
fn open_target_dialog(app: &mut App, kind: DialogKind) {
    if app.controller.selection().is_some() {
        app.open_dialog(kind);
    } else {
        // Let the controller report the missing selection.
        let mut cancel = InputChooser::new("");
        let step = match kind {
            DialogKind::CopyTo => app.controller.copy_selected(&mut cancel),
            DialogKind::MoveTo => app.controller.move_selected(&mut cancel),
            _ => app.controller.rename_selected(&mut cancel),
        };
        app.settle(step);
    }
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let op = match key.code {
        KeyCode::Esc => {
            app.run(Command::ToggleEdit);
            return;
        }
        KeyCode::Char('e') if ctrl => {
            app.run(Command::ToggleEdit);
            return;
        }
        KeyCode::Char('s') if ctrl => {
            app.run(Command::Save);
            return;
        }
        KeyCode::Char('z') if ctrl => {
            app.run(Command::Undo);
            return;
        }
        // Moving to a neighbouring file goes through the discard prompt.
        KeyCode::Char('n') if ctrl => {
            select_relative(app, 1);
            return;
        }
        KeyCode::Char('p') if ctrl => {
            select_relative(app, -1);
            return;
        }
        KeyCode::Home if ctrl => EditOp::Top,
        KeyCode::End if ctrl => EditOp::Bottom,
        KeyCode::Char(c) if !ctrl => EditOp::Insert(c),
        KeyCode::Tab => EditOp::Tab,
        KeyCode::Enter => EditOp::Newline,
        KeyCode::Backspace => EditOp::Backspace,
        KeyCode::Delete => EditOp::Delete,
        KeyCode::Up => EditOp::Up,
        KeyCode::Down => EditOp::Down,
        KeyCode::Left => EditOp::Left,
        KeyCode::Right => EditOp::Right,
        KeyCode::Home => EditOp::Home,
        KeyCode::End => EditOp::End,
        KeyCode::PageUp => EditOp::PageUp,
        KeyCode::PageDown => EditOp::PageDown,
        _ => return,
    };
    app.run(Command::Edit(op));
}

fn select_relative(app: &mut App, delta: isize) {
    let Some(index) = app.controller.selected_index() else {
        return;
    };
    if let Some(target) = index.checked_add_signed(delta) {
        app.run(Command::Select(target));
    }
}

fn handle_confirm_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_confirmation(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_confirmation(false),
        _ => {}
    }
}

fn handle_input_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Backspace => app.dialog_delete_char(),
        KeyCode::Left => app.dialog_move_cursor_left(),
        KeyCode::Right => app.dialog_move_cursor_right(),
        KeyCode::Home => app.dialog_cursor_home(),
        KeyCode::End => app.dialog_cursor_end(),
        KeyCode::Char(c) => app.dialog_input_char(c),
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => app.show_help = false,
        KeyCode::Char('j') | KeyCode::Down => {
            let last = HelpOverlay::total_lines().saturating_sub(1);
            app.help_scroll = (app.help_scroll + 1).min(last);
        }
        KeyCode::Char('k') | KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
        _ => {}
    }
}

/// Clicks on a list row select it; the wheel steps through the list.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.show_help || app.mode != AppMode::Normal {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(index) = app.list_index_at(mouse.column, mouse.row) {
                app.run(Command::Select(index));
            }
        }
        MouseEventKind::ScrollDown if !app.is_editing() => app.run(Command::SelectNext),
        MouseEventKind::ScrollUp if !app.is_editing() => app.run(Command::SelectPrevious),
        _ => {}
    }
}
