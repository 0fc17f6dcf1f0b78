use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const BROWSE_HINTS: &str = " e:edit  o:open  c/m/r:copy/move/ren  d:del  ?:help ";
const EDIT_HINTS: &str = " ^S:save  ^Z:undo  Esc:leave  ^N/^P:next/prev file ";

/// Bottom bar: folder path, selection info and key hints, or a transient message.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    file_info: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    mode_label: Option<&'a str>,
    editing: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, file_info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            file_info,
            theme,
            status_message: None,
            mode_label: None,
            editing: false,
        }
    }

    pub fn status_message(mut self, msg: Option<&'a str>) -> Self {
        self.status_message = msg;
        self
    }

    /// Shown as a badge on the left, e.g. "EDIT" or "EDIT [+]".
    pub fn mode_label(mut self, label: &'a str, editing: bool) -> Self {
        self.mode_label = Some(label);
        self.editing = editing;
        self
    }
}

/// Keep the tail of `s` within `budget` characters, prefixing "..." when cut.
fn truncate_left(s: &str, budget: usize) -> String {
    let count = s.chars().count();
    if count <= budget {
        return s.to_string();
    }
    if budget <= 3 {
        return s.chars().skip(count - budget).collect();
    }
    let tail: String = s.chars().skip(count - (budget - 3)).collect();
    format!("...{}", tail)
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;
        let base = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);
        buf.set_style(area, base);

        let mut spans = Vec::new();
        if let Some(label) = self.mode_label {
            spans.push(Span::styled(
                format!(" {} ", label),
                Style::default()
                    .bg(self.theme.accent_fg)
                    .fg(self.theme.status_bg)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
        }

        if let Some(msg) = self.status_message {
            spans.push(Span::styled(
                msg.to_string(),
                Style::default().fg(self.theme.success_fg),
            ));
            buf.set_line(area.x, area.y, &Line::from(spans), area.width);
            return;
        }

        let hints = if self.editing { EDIT_HINTS } else { BROWSE_HINTS };
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let info_len = self.file_info.chars().count();
        let path_budget = width
            .saturating_sub(used)
            .saturating_sub(hints.len())
            .saturating_sub(info_len + 1);
        let path_display = truncate_left(self.path_str, path_budget);
        let gap = width
            .saturating_sub(used)
            .saturating_sub(path_display.chars().count())
            .saturating_sub(info_len)
            .saturating_sub(hints.len());

        spans.push(Span::styled(path_display, Style::default().fg(self.theme.status_fg)));
        spans.push(Span::raw(" ".repeat(gap)));
        spans.push(Span::styled(
            self.file_info.to_string(),
            Style::default().fg(self.theme.info_fg),
        ));
        spans.push(Span::styled(
            hints,
            Style::default()
                .fg(self.theme.dim_fg)
                .add_modifier(Modifier::DIM),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
