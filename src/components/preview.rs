use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::preview::{PreviewContent, Raster};
use crate::theme::ThemeColors;

const UPPER_HALF: &str = "▀";

/// Renders the live `PreviewContent`: text with line numbers, or a raster
/// drawn with half-block cells (two pixels per cell).
pub struct PreviewWidget<'a> {
    content: &'a PreviewContent,
    theme: &'a ThemeColors,
    scroll: usize,
    tab_width: usize,
    block: Option<Block<'a>>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(content: &'a PreviewContent, theme: &'a ThemeColors) -> Self {
        Self {
            content,
            theme,
            scroll: 0,
            tab_width: 4,
            block: None,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn tab_width(mut self, width: usize) -> Self {
        self.tab_width = width.max(1);
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_message(&self, msg: &str, inner: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(
            msg.to_string(),
            Style::default().fg(self.theme.dim_fg),
        ));
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }

    fn render_text(&self, text: &str, inner: Rect, buf: &mut Buffer) {
        let lines: Vec<&str> = text.lines().collect();
        let digits = lines.len().max(1).to_string().len();
        let gutter = digits as u16 + 1;
        let nr_style = Style::default().fg(self.theme.line_nr_fg);
        let text_style = Style::default().fg(self.theme.preview_fg);
        let tab = " ".repeat(self.tab_width);

        let start = self.scroll.min(lines.len().saturating_sub(1));
        for (row, (idx, line)) in lines
            .iter()
            .enumerate()
            .skip(start)
            .take(inner.height as usize)
            .enumerate()
        {
            let y = inner.y + row as u16;
            let nr = format!("{:>width$} ", idx + 1, width = digits);
            buf.set_string(inner.x, y, nr, nr_style);
            if inner.width > gutter {
                let expanded = line.replace('\t', &tab);
                buf.set_line(
                    inner.x + gutter,
                    y,
                    &Line::from(Span::styled(expanded, text_style)),
                    inner.width - gutter,
                );
            }
        }
    }

    fn render_raster(&self, raster: &Raster, inner: Rect, buf: &mut Buffer) {
        let (img_w, img_h) = raster.dimensions();
        if img_w == 0 || img_h == 0 {
            return;
        }
        let (draw_w, draw_h) = fit_raster(img_w, img_h, inner.width as u32, inner.height as u32 * 2);
        let x0 = inner.x + ((inner.width as u32 - draw_w) / 2) as u16;
        let bg = self.theme.preview_bg;

        let sample = |px: u32, py: u32| -> Color {
            let sx = (px * img_w / draw_w).min(img_w - 1);
            let sy = (py * img_h / draw_h).min(img_h - 1);
            let [r, g, b, a] = raster.get_pixel(sx, sy).0;
            if a == 0 {
                bg
            } else {
                Color::Rgb(r, g, b)
            }
        };

        for cy in 0..draw_h.div_ceil(2) {
            let y = inner.y + cy as u16;
            for cx in 0..draw_w {
                let top = sample(cx, cy * 2);
                let bottom = if cy * 2 + 1 < draw_h {
                    sample(cx, cy * 2 + 1)
                } else {
                    bg
                };
                buf.set_string(
                    x0 + cx as u16,
                    y,
                    UPPER_HALF,
                    Style::default().fg(top).bg(bottom),
                );
            }
        }
    }
}

/// Largest size with the raster's aspect ratio that fits `max_w` x `max_h`
/// pixels. Never smaller than 1x1.
pub fn fit_raster(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let scale = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    let w = ((width as f64 * scale).floor() as u32).clamp(1, max_w);
    let h = ((height as f64 * scale).floor() as u32).clamp(1, max_h);
    (w, h)
}

impl<'a> Widget for PreviewWidget<'a> {
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

        match self.content {
            PreviewContent::Empty => self.render_message("No preview", inner, buf),
            PreviewContent::Unsupported(msg) => self.render_message(msg, inner, buf),
            PreviewContent::Text(text) => self.render_text(text, inner, buf),
            PreviewContent::Image(raster) | PreviewContent::Document { page: raster, .. } => {
                self.render_raster(raster, inner, buf)
            }
        }
    }
}
