use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::fs::catalog::CatalogEntry;
use crate::preview::PreviewCategory;
use crate::theme::ThemeColors;

/// Flat list of the files in the current folder.
pub struct FileListWidget<'a> {
    entries: &'a [CatalogEntry],
    categories: &'a [PreviewCategory],
    selected: Option<usize>,
    offset: usize,
    theme: &'a ThemeColors,
    block: Option<Block<'a>>,
}

impl<'a> FileListWidget<'a> {
    /// `categories[i]` is the preview category of `entries[i]`.
    pub fn new(
        entries: &'a [CatalogEntry],
        categories: &'a [PreviewCategory],
        theme: &'a ThemeColors,
    ) -> Self {
        Self {
            entries,
            categories,
            selected: None,
            offset: 0,
            theme,
            block: None,
        }
    }

    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn indicator(category: Option<&PreviewCategory>) -> &'static str {
        match category {
            Some(PreviewCategory::Text) => "[T] ",
            Some(PreviewCategory::Image) => "[I] ",
            Some(PreviewCategory::Document) => "[D] ",
            Some(PreviewCategory::Unsupported) | None => "[ ] ",
        }
    }
}

/// First visible row so that `selected` stays inside a viewport of `height` rows.
pub fn scroll_offset(selected: Option<usize>, current: usize, height: usize) -> usize {
    let Some(selected) = selected else {
        return current;
    };
    if height == 0 {
        return selected;
    }
    if selected < current {
        selected
    } else if selected >= current + height {
        selected + 1 - height
    } else {
        current
    }
}

impl<'a> Widget for FileListWidget<'a> {
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

        if self.entries.is_empty() {
            let line = Line::from(Span::styled(
                "No files",
                Style::default().fg(self.theme.dim_fg),
            ));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        }

        let rows = self
            .entries
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(inner.height as usize);

        for (row, (idx, entry)) in rows.enumerate() {
            let y = inner.y + row as u16;
            let style = if Some(idx) == self.selected {
                Style::default()
                    .bg(self.theme.list_selected_bg)
                    .fg(self.theme.list_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else if entry.name.starts_with('.') {
                Style::default().fg(self.theme.list_hidden_fg)
            } else {
                Style::default().fg(self.theme.list_fg)
            };

            let text = format!(
                "{}{}",
                Self::indicator(self.categories.get(idx)),
                entry.name
            );
            // Pad so the selection bar spans the row.
            let padded = format!("{:<width$}", text, width = inner.width as usize);
            buf.set_line(inner.x, y, &Line::from(Span::styled(padded, style)), inner.width);
        }
    }
}
