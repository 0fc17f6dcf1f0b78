use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Widget},
};

use crate::editor::EditBuffer;
use crate::theme::ThemeColors;

/// Draws an `EditBuffer` with a line-number gutter, cursor and current-line highlight.
pub struct EditorWidget<'a> {
    buffer: &'a EditBuffer,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> EditorWidget<'a> {
    pub fn new(buffer: &'a EditBuffer, theme: &'a ThemeColors) -> Self {
        Self {
            buffer,
            theme,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for EditorWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let gutter_w = self.buffer.gutter_width();
        let code_width = inner.width.saturating_sub(gutter_w);
        if code_width == 0 {
            return;
        }

        let lines = self.buffer.lines();
        let scroll = self.buffer.scroll_offset;
        let cursor_style = Style::default()
            .fg(self.theme.editor_cursor_fg)
            .bg(self.theme.editor_cursor_bg);
        let current_bg = Style::default().bg(self.theme.editor_current_line_bg);

        for row in 0..inner.height as usize {
            let line_idx = scroll + row;
            let y = inner.y + row as u16;

            let Some(line) = lines.get(line_idx) else {
                buf.set_string(inner.x, y, "~", Style::default().fg(self.theme.dim_fg));
                continue;
            };

            let is_current = line_idx == self.buffer.cursor_line;

            let num = format!("{:>width$} ", line_idx + 1, width = (gutter_w - 2) as usize);
            let gutter_style = if is_current {
                Style::default()
                    .fg(self.theme.editor_line_nr_current)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.line_nr_fg)
            };
            buf.set_span(inner.x, y, &Span::styled(num, gutter_style), gutter_w);
            buf.set_string(
                inner.x + gutter_w - 1,
                y,
                "│",
                Style::default().fg(self.theme.editor_gutter_sep),
            );

            let code_x = inner.x + gutter_w;
            if is_current {
                for x in code_x..inner.x + inner.width {
                    buf.set_string(x, y, " ", current_bg);
                }
            }

            let text_style = if is_current {
                current_bg.fg(self.theme.preview_fg)
            } else {
                Style::default().fg(self.theme.preview_fg)
            };
            for (col, ch) in line.chars().take(code_width as usize).enumerate() {
                let style = if is_current && col == self.buffer.cursor_col {
                    cursor_style
                } else {
                    text_style
                };
                buf.set_string(code_x + col as u16, y, ch.to_string(), style);
            }

            // Cursor sitting past the last character.
            let len = line.chars().count();
            if is_current && self.buffer.cursor_col >= len && (len as u16) < code_width {
                buf.set_string(code_x + len as u16, y, " ", cursor_style);
            }
        }
    }
}
