use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

/// A single keybinding entry for display.
struct KeyEntry {
    key: &'static str,
    description: &'static str,
}

/// A category of keybindings.
struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const fn key(key: &'static str, description: &'static str) -> KeyEntry {
    KeyEntry { key, description }
}

const BROWSE_KEYS: &[KeyEntry] = &[
    key("j / ↓", "Next file"),
    key("k / ↑", "Previous file"),
    key("g / Home", "First file"),
    key("G / End", "Last file"),
    key("Mouse click", "Select file"),
    key("Tab", "Show / hide file list"),
    key("Ctrl+D / Ctrl+U", "Scroll text preview"),
];

const PAGE_KEYS: &[KeyEntry] = &[
    key("n / PgDn / →", "Next page"),
    key("p / PgUp / ←", "Previous page"),
];

const FILE_OPS_KEYS: &[KeyEntry] = &[
    key("o", "Open folder"),
    key("F5 / Ctrl+R", "Reload folder"),
    key("c", "Copy file to..."),
    key("m", "Move file to..."),
    key("r", "Rename file"),
    key("d / Del", "Delete file"),
];

const EDITOR_KEYS: &[KeyEntry] = &[
    key("e / Enter", "Enter edit mode (text files)"),
    key("Esc / Ctrl+E", "Leave edit mode (asks to discard)"),
    key("Ctrl+S", "Save and leave edit mode"),
    key("Ctrl+Z", "Undo"),
    key("Ctrl+N / Ctrl+P", "Switch file (asks to discard)"),
    key("Arrows", "Move cursor"),
    key("Home / End", "Start / end of line"),
    key("Ctrl+Home/End", "Top / bottom of file"),
    key("PgUp / PgDn", "Page up / page down"),
    key("Tab", "Indent to next tab stop"),
];

const GENERAL_KEYS: &[KeyEntry] = &[
    key("?", "Toggle this help overlay"),
    key("q", "Quit"),
    key("Ctrl+C", "Quit (asks to discard in edit mode)"),
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Browsing",
        entries: BROWSE_KEYS,
    },
    KeyCategory {
        name: "Pages",
        entries: PAGE_KEYS,
    },
    KeyCategory {
        name: "Files",
        entries: FILE_OPS_KEYS,
    },
    KeyCategory {
        name: "Edit Mode",
        entries: EDITOR_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Help overlay widget showing all keybindings.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
    scroll_offset: usize,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors, scroll_offset: usize) -> Self {
        Self {
            theme,
            scroll_offset,
        }
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(self.theme.accent_fg)
            .add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(" Keybinding Reference ", heading)),
            Line::from(""),
        ];

        for category in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(format!("── {} ", category.name), heading),
                Span::styled("─".repeat(40), Style::default().fg(self.theme.dim_fg)),
            ]));
            for entry in category.entries {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {:<20}", entry.key),
                        Style::default()
                            .fg(self.theme.warning_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(entry.description, Style::default().fg(self.theme.list_fg)),
                ]));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from(Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }

    /// Number of content lines, for clamping the scroll offset.
    pub fn total_lines() -> usize {
        // title, blank, then header + entries + blank per category, then footer
        2 + CATEGORIES
            .iter()
            .map(|c| c.entries.len() + 2)
            .sum::<usize>()
            + 1
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let overlay_width = (area.width as f32 * 0.70).min(80.0) as u16;
        let overlay_height = (area.height as f32 * 0.80).min(50.0) as u16;
        let x = area.x + area.width.saturating_sub(overlay_width) / 2;
        let y = area.y + area.height.saturating_sub(overlay_height) / 2;
        let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

        Clear.render(overlay_area, buf);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.dialog_bg));
        let inner = block.inner(overlay_area);
        block.render(overlay_area, buf);

        let content = self.build_content_lines();
        let visible = inner.height as usize;
        for (i, line) in content.iter().skip(self.scroll_offset).take(visible).enumerate() {
            buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(2));
        }

        if content.len() > visible && overlay_area.height > 0 {
            let total = content.len();
            let indicator = Span::styled(
                format!(" {}/{} ", (self.scroll_offset + 1).min(total), total),
                Style::default().fg(self.theme.dim_fg),
            );
            let width = indicator.width() as u16;
            let ind_x = overlay_area.x + overlay_area.width.saturating_sub(width + 1);
            let ind_y = overlay_area.y + overlay_area.height - 1;
            buf.set_span(ind_x, ind_y, &indicator, width);
        }
    }
}
