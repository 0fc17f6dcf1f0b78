use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Widget, Wrap},
};

use crate::app::{AppMode, DialogKind, DialogState};
use crate::controller::{ConfirmKind, Confirmation};
use crate::theme::ThemeColors;

/// Centered modal overlay for the current dialog, if any.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    dialog_state: &'a DialogState,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, dialog_state: &'a DialogState, theme: &'a ThemeColors) -> Self {
        Self {
            mode,
            dialog_state,
            theme,
        }
    }
}

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let AppMode::Dialog(kind) = self.mode else {
            return;
        };

        match kind {
            DialogKind::Confirm(confirmation) => self.render_confirm(confirmation, area, buf),
            DialogKind::Error { title, message } => self.render_error(title, message, area, buf),
            other => {
                let title = other.input_title().unwrap_or("Input");
                self.render_input(title, area, buf);
            }
        }
    }
}

impl<'a> DialogWidget<'a> {
    fn frame(&self, title: &str, border: Color, rect: Rect, buf: &mut Buffer) -> Rect {
        Clear.render(rect, buf);
        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        inner
    }

    fn hint(&self, text: &str, inner: Rect, buf: &mut Buffer) {
        if inner.height > 1 {
            let style = Style::default()
                .fg(self.theme.dim_fg)
                .add_modifier(Modifier::DIM);
            buf.set_line(
                inner.x,
                inner.y + inner.height - 1,
                &Line::from(Span::styled(text, style)),
                inner.width,
            );
        }
    }

    fn render_input(&self, title: &str, area: Rect, buf: &mut Buffer) {
        let rect = centered_rect(60.min(area.width.saturating_sub(4)), 5, area);
        let inner = self.frame(title, self.theme.dialog_border_fg, rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let input = &self.dialog_state.input;
        let cursor = self.dialog_state.cursor_position.min(input.len());
        let before = &input[..cursor];
        let mut rest = input[cursor..].chars();
        let cursor_char = rest.next().map(String::from).unwrap_or_else(|| " ".into());
        let after: String = rest.collect();

        // Keep the cursor in view by dropping characters from the left.
        let max_before = (inner.width as usize).saturating_sub(2);
        let before_count = before.chars().count();
        let before_display: String = before
            .chars()
            .skip(before_count.saturating_sub(max_before))
            .collect();

        let input_style = Style::default().fg(self.theme.preview_fg);
        let cursor_style = Style::default()
            .bg(self.theme.editor_cursor_bg)
            .fg(self.theme.editor_cursor_fg)
            .add_modifier(Modifier::BOLD);

        let line = Line::from(vec![
            Span::styled(before_display, input_style),
            Span::styled(cursor_char, cursor_style),
            Span::styled(after, input_style),
        ]);
        buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);
        self.hint("[Enter] Confirm  [Esc] Cancel", inner, buf);
    }

    fn render_confirm(&self, confirmation: &Confirmation, area: Rect, buf: &mut Buffer) {
        let width = (confirmation.question.chars().count() as u16 + 6)
            .max(40)
            .min(area.width.saturating_sub(4));
        let rect = centered_rect(width, 6, area);
        let border = match confirmation.kind {
            ConfirmKind::DeleteFile => self.theme.error_fg,
            ConfirmKind::DiscardChanges => self.theme.warning_fg,
        };
        let inner = self.frame(&confirmation.title, border, rect, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let question = Line::from(Span::styled(
            confirmation.question.as_str(),
            Style::default()
                .fg(self.theme.warning_fg)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(inner.x, inner.y + 1, &question, inner.width);
        self.hint("[y] Yes  [n/Esc] No", inner, buf);
    }

    fn render_error(&self, title: &str, message: &str, area: Rect, buf: &mut Buffer) {
        let width = (message.chars().count() as u16 + 6)
            .clamp(30, 70)
            .min(area.width.saturating_sub(4));
        let rect = centered_rect(width, 7, area);
        let inner = self.frame(title, self.theme.error_fg, rect, buf);
        if inner.height < 2 || inner.width == 0 {
            return;
        }

        let body = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
        Paragraph::new(message)
            .style(Style::default().fg(self.theme.error_fg))
            .wrap(Wrap { trim: true })
            .render(body, buf);
        self.hint("[Enter/Esc] Dismiss", inner, buf);
    }
}
