use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::dialog::DialogWidget;
use crate::components::editor::EditorWidget;
use crate::components::file_list::{scroll_offset, FileListWidget};
use crate::components::help::HelpOverlay;
use crate::components::page_bar::PageBarWidget;
use crate::components::preview::PreviewWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::preview::PreviewCategory;
use crate::session::EditPhase;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.area());
    let (main_area, status_area) = (chunks[0], chunks[1]);

    let preview_area = if app.show_list {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(main_area);
        render_list(app, frame, panes[0]);
        panes[1]
    } else {
        app.list_area = Rect::default();
        main_area
    };

    render_preview(app, frame, preview_area);
    render_status(app, frame, status_area);

    if app.mode != AppMode::Normal {
        let dialog = DialogWidget::new(&app.mode, &app.dialog_state, &app.theme);
        frame.render_widget(dialog, frame.area());
    }
    if app.show_help {
        frame.render_widget(HelpOverlay::new(&app.theme, app.help_scroll), frame.area());
    }
}

fn pane_block<'a>(app: &App, title: String, focused: bool) -> Block<'a> {
    let border = if focused {
        app.theme.border_focused_fg
    } else {
        app.theme.border_fg
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let folder = app
        .controller
        .catalog()
        .folder()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "No folder".to_string());
    let block = pane_block(app, format!(" {} ", folder), !app.is_editing());
    let inner = block.inner(area);

    app.list_area = inner;
    app.list_offset = scroll_offset(
        app.controller.selected_index(),
        app.list_offset,
        inner.height as usize,
    );

    let entries = app.controller.catalog().entries();
    let categories: Vec<PreviewCategory> = entries
        .iter()
        .map(|e| app.controller.category_of(&e.name))
        .collect();
    let widget = FileListWidget::new(entries, &categories, &app.theme)
        .selected(app.controller.selected_index())
        .offset(app.list_offset)
        .block(block);
    frame.render_widget(widget, area);
}

fn render_preview(app: &mut App, frame: &mut Frame, area: Rect) {
    let name = app
        .controller
        .selection()
        .map(|s| s.entry.name.clone())
        .unwrap_or_default();

    if app.is_editing() {
        let dirty = app
            .controller
            .edit_buffer()
            .map(|b| b.is_dirty())
            .unwrap_or(false);
        let title = format!(" {}{} | EDIT ", name, if dirty { " [+]" } else { "" });
        let block = pane_block(app, title, true);
        app.controller
            .set_editor_height(block.inner(area).height as usize);
        if let Some(buffer) = app.controller.edit_buffer() {
            frame.render_widget(EditorWidget::new(buffer, &app.theme).block(block), area);
        }
        return;
    }

    let paginated = app.controller.pagination().is_paginated();
    let (content_area, bar_area) = if paginated && area.height > 3 {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        (parts[0], Some(parts[1]))
    } else {
        (area, None)
    };

    if let Some(text) = app.controller.preview().as_text() {
        let last = text.lines().count().saturating_sub(1);
        app.preview_scroll = app.preview_scroll.min(last);
    }

    let title = if name.is_empty() {
        " Preview ".to_string()
    } else {
        format!(" {} | {} ", name, app.controller.preview().kind_label())
    };
    let block = pane_block(app, title, false);
    let widget = PreviewWidget::new(app.controller.preview(), &app.theme)
        .scroll(app.preview_scroll)
        .tab_width(app.preview_tab_width)
        .block(block);
    frame.render_widget(widget, content_area);

    if let Some(bar) = bar_area {
        frame.render_widget(
            PageBarWidget::new(app.controller.pagination(), &app.theme),
            bar,
        );
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let path = app
        .controller
        .catalog()
        .folder()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let info = match (app.controller.selected_index(), app.controller.selected_category()) {
        (Some(i), Some(cat)) => format!(
            "{} | {}/{} ",
            cat.label(),
            i + 1,
            app.controller.catalog().len()
        ),
        _ => format!("{} files ", app.controller.catalog().len()),
    };

    let mut bar = StatusBarWidget::new(&path, &info, &app.theme).status_message(app.status_message());
    let label = match app.controller.phase() {
        EditPhase::Idle => None,
        _ if app.controller.edit_buffer().is_some_and(|b| b.is_dirty()) => Some("EDIT [+]"),
        _ => Some("EDIT"),
    };
    if let Some(label) = label {
        bar = bar.mode_label(label, true);
    }
    frame.render_widget(bar, area);
}
