use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::pagination::PaginationState;
use crate::theme::ThemeColors;

/// "< Prev  Page i/n  Next >" under a paginated preview. Arrows are dimmed
/// when the corresponding move is unavailable.
pub struct PageBarWidget<'a> {
    pagination: &'a PaginationState,
    theme: &'a ThemeColors,
}

impl<'a> PageBarWidget<'a> {
    pub fn new(pagination: &'a PaginationState, theme: &'a ThemeColors) -> Self {
        Self { pagination, theme }
    }
}

impl<'a> Widget for PageBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let active = Style::default()
            .fg(self.theme.page_bar_fg)
            .add_modifier(Modifier::BOLD);
        let inactive = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);
        let style_for = |enabled: bool| if enabled { active } else { inactive };

        let label = self.pagination.label();
        let prev = "< Prev (p)";
        let next = "(n) Next >";
        let text_len = prev.len() + label.len() + next.len() + 4;
        let pad = (area.width as usize).saturating_sub(text_len) / 2;

        let line = Line::from(vec![
            Span::raw(" ".repeat(pad)),
            Span::styled(prev, style_for(self.pagination.can_go_prev())),
            Span::raw("  "),
            Span::styled(label, Style::default().fg(self.theme.page_bar_fg)),
            Span::raw("  "),
            Span::styled(next, style_for(self.pagination.can_go_next())),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
