use std::time::Instant;

/// A single edit or cursor movement applied to an `EditBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Insert(char),
    Tab,
    Newline,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Top,
    Bottom,
    PageUp,
    PageDown,
}

/// A single reversible change recorded on the undo stack.
#[derive(Debug, Clone)]
enum UndoAction {
    /// Consecutive characters typed on one line.
    InsertGroup {
        line: usize,
        start_col: usize,
        chars: String,
    },
    /// Consecutive characters removed from one line.
    DeleteGroup {
        line: usize,
        start_col: usize,
        chars: String,
    },
    /// Enter at (line, col); the new line started with `indent`.
    SplitLine {
        line: usize,
        col: usize,
        indent: String,
    },
    /// Line `line + 1` was appended to `line`, which was `col` chars long.
    JoinLine { line: usize, col: usize },
}

/// Maximum entries in the undo stack.
const MAX_UNDO_ENTRIES: usize = 1000;

/// Consecutive edits within this many milliseconds are undone together.
const GROUPING_TIMEOUT_MS: u128 = 500;

pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Working text of a file in edit mode.
///
/// Columns are counted in chars, not bytes. The buffer is dirty whenever its
/// lines differ from the text it was seeded with, so undoing back to the
/// original makes it clean again.
#[derive(Debug)]
pub struct EditBuffer {
    lines: Vec<String>,
    original: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    /// Line index of the topmost visible line.
    pub scroll_offset: usize,
    /// Height of the editor viewport, updated on every draw.
    pub visible_height: usize,
    tab_width: usize,
    undo_stack: Vec<UndoAction>,
    last_edit_time: Option<Instant>,
    grouping_active: bool,
    current_group: String,
    group_start_line: usize,
    group_start_col: usize,
    group_is_delete: bool,
}

impl EditBuffer {
    pub fn new(content: &str) -> Self {
        let lines: Vec<String> = content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self {
            original: lines.clone(),
            lines,
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            visible_height: 24,
            tab_width: DEFAULT_TAB_WIDTH,
            undo_stack: Vec::new(),
            last_edit_time: None,
            grouping_active: false,
            current_group: String::new(),
            group_start_line: 0,
            group_start_col: 0,
            group_is_delete: false,
        }
    }

    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_width = width.max(1);
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The whole buffer joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_dirty(&self) -> bool {
        self.lines != self.original
    }

    /// Whether there is anything left to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || (self.grouping_active && !self.current_group.is_empty())
    }

    /// Width of the line number gutter (digits + space + separator).
    pub fn gutter_width(&self) -> u16 {
        let digits = (self.line_count().max(1) as f64).log10().floor() as u16 + 1;
        digits + 2
    }

    pub fn apply(&mut self, op: EditOp) {
        match op {
            EditOp::Insert(ch) => self.insert_char(ch),
            EditOp::Tab => self.insert_tab(),
            EditOp::Newline => self.insert_newline(),
            EditOp::Backspace => self.delete_char_before(),
            EditOp::Delete => self.delete_char_at(),
            EditOp::Up => self.move_up(),
            EditOp::Down => self.move_down(),
            EditOp::Left => self.move_left(),
            EditOp::Right => self.move_right(),
            EditOp::Home => self.move_home(),
            EditOp::End => self.move_end(),
            EditOp::Top => self.move_to_top(),
            EditOp::Bottom => self.move_to_bottom(),
            EditOp::PageUp => self.page_up(),
            EditOp::PageDown => self.page_down(),
        }
    }

    fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len().saturating_sub(1);
        }
        let len = self.current_line_len();
        if self.cursor_col > len {
            self.cursor_col = len;
        }
    }

    /// Scroll so the cursor stays inside the viewport with a small margin.
    pub fn ensure_cursor_visible(&mut self) {
        let margin = 2usize;
        if self.visible_height == 0 {
            return;
        }
        if self.cursor_line < self.scroll_offset + margin {
            self.scroll_offset = self.cursor_line.saturating_sub(margin);
        }
        let bottom = self.scroll_offset + self.visible_height;
        if self.cursor_line >= bottom.saturating_sub(margin) {
            self.scroll_offset = self
                .cursor_line
                .saturating_sub(self.visible_height.saturating_sub(margin + 1));
        }
    }

    // ── Undo infrastructure ───────────────────────────────────────────

    fn flush_group(&mut self) {
        if self.grouping_active && !self.current_group.is_empty() {
            let chars = std::mem::take(&mut self.current_group);
            let action = if self.group_is_delete {
                UndoAction::DeleteGroup {
                    line: self.group_start_line,
                    start_col: self.group_start_col,
                    chars,
                }
            } else {
                UndoAction::InsertGroup {
                    line: self.group_start_line,
                    start_col: self.group_start_col,
                    chars,
                }
            };
            self.push_undo_action(action);
        }
        self.grouping_active = false;
        self.current_group.clear();
    }

    fn push_undo_action(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
        if self.undo_stack.len() > MAX_UNDO_ENTRIES {
            let excess = self.undo_stack.len() - MAX_UNDO_ENTRIES;
            self.undo_stack.drain(..excess);
        }
    }

    fn record_action(&mut self, action: UndoAction) {
        self.flush_group();
        self.push_undo_action(action);
    }

    fn within_group_window(&self, now: Instant) -> bool {
        self.last_edit_time
            .map(|t| now.duration_since(t).as_millis() < GROUPING_TIMEOUT_MS)
            .unwrap_or(false)
    }

    fn record_char_insert(&mut self, line: usize, col: usize, ch: char) {
        let now = Instant::now();
        let contiguous = self.group_start_col + self.current_group.chars().count() == col;
        if self.grouping_active
            && !self.group_is_delete
            && self.group_start_line == line
            && contiguous
            && self.within_group_window(now)
        {
            self.current_group.push(ch);
        } else {
            self.flush_group();
            self.grouping_active = true;
            self.group_is_delete = false;
            self.group_start_line = line;
            self.group_start_col = col;
            self.current_group = ch.to_string();
        }
        self.last_edit_time = Some(now);
    }

    /// `backwards` is true for Backspace, where the group grows to the left.
    fn record_char_delete(&mut self, line: usize, col: usize, ch: char, backwards: bool) {
        let now = Instant::now();
        let contiguous = if backwards {
            col + 1 == self.group_start_col
        } else {
            col == self.group_start_col
        };
        if self.grouping_active
            && self.group_is_delete
            && self.group_start_line == line
            && contiguous
            && self.within_group_window(now)
        {
            if backwards {
                self.current_group.insert(0, ch);
                self.group_start_col = col;
            } else {
                self.current_group.push(ch);
            }
        } else {
            self.flush_group();
            self.grouping_active = true;
            self.group_is_delete = true;
            self.group_start_line = line;
            self.group_start_col = col;
            self.current_group = ch.to_string();
        }
        self.last_edit_time = Some(now);
    }

    // ── Buffer mutation ───────────────────────────────────────────────

    pub fn insert_char(&mut self, ch: char) {
        self.record_char_insert(self.cursor_line, self.cursor_col, ch);
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let byte_idx = char_to_byte_index(line, self.cursor_col);
            line.insert(byte_idx, ch);
            self.cursor_col += 1;
        }
    }

    /// Insert spaces up to the next tab stop.
    pub fn insert_tab(&mut self) {
        let spaces = self.tab_width - (self.cursor_col % self.tab_width);
        self.flush_group();
        let indent = " ".repeat(spaces);
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let byte_idx = char_to_byte_index(line, self.cursor_col);
            line.insert_str(byte_idx, &indent);
            let start_col = self.cursor_col;
            self.cursor_col += spaces;
            self.record_action(UndoAction::InsertGroup {
                line: self.cursor_line,
                start_col,
                chars: indent,
            });
        }
    }

    /// Backspace. At column 0 the line is joined onto the previous one.
    pub fn delete_char_before(&mut self) {
        if self.cursor_col > 0 {
            let cur_line = self.cursor_line;
            let cur_col = self.cursor_col;
            let (prev_byte_idx, deleted) = {
                let line = &self.lines[cur_line];
                let prev = char_to_byte_index(line, cur_col - 1);
                (prev, line[prev..].chars().next().unwrap_or(' '))
            };
            self.record_char_delete(cur_line, cur_col - 1, deleted, true);
            self.lines[cur_line].remove(prev_byte_idx);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            let join_col = self.current_line_len();
            self.lines[self.cursor_line].push_str(&current);
            self.cursor_col = join_col;
            self.record_action(UndoAction::JoinLine {
                line: self.cursor_line,
                col: join_col,
            });
            self.ensure_cursor_visible();
        }
    }

    /// Delete key. At end of line the next line is joined onto this one.
    pub fn delete_char_at(&mut self) {
        if self.cursor_col < self.current_line_len() {
            let cur_line = self.cursor_line;
            let cur_col = self.cursor_col;
            let (byte_idx, deleted) = {
                let line = &self.lines[cur_line];
                let bi = char_to_byte_index(line, cur_col);
                (bi, line[bi..].chars().next().unwrap_or(' '))
            };
            self.record_char_delete(cur_line, cur_col, deleted, false);
            self.lines[cur_line].remove(byte_idx);
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            let join_col = self.current_line_len();
            self.lines[self.cursor_line].push_str(&next);
            self.record_action(UndoAction::JoinLine {
                line: self.cursor_line,
                col: join_col,
            });
        }
    }

    /// Split the line at the cursor, carrying over its leading whitespace.
    pub fn insert_newline(&mut self) {
        self.flush_group();
        if let Some(line) = self.lines.get(self.cursor_line) {
            let indent: String = line
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            let byte_idx = char_to_byte_index(line, self.cursor_col);
            let new_line = format!("{}{}", indent, &line[byte_idx..]);

            self.lines[self.cursor_line].truncate(byte_idx);
            self.lines.insert(self.cursor_line + 1, new_line);
            self.record_action(UndoAction::SplitLine {
                line: self.cursor_line,
                col: self.cursor_col,
                indent: indent.clone(),
            });

            self.cursor_line += 1;
            self.cursor_col = indent.chars().count();
            self.ensure_cursor_visible();
        }
    }

    // ── Navigation ────────────────────────────────────────────────────

    pub fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.ensure_cursor_visible();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn move_to_top(&mut self) {
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.ensure_cursor_visible();
    }

    pub fn move_to_bottom(&mut self) {
        self.cursor_line = self.lines.len().saturating_sub(1);
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn page_up(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = self.cursor_line.saturating_sub(jump);
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn page_down(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = (self.cursor_line + jump).min(self.lines.len().saturating_sub(1));
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    // ── Undo ──────────────────────────────────────────────────────────

    /// Revert the most recent change. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.flush_group();
        let Some(action) = self.undo_stack.pop() else {
            return false;
        };
        self.apply_reverse(&action);
        true
    }

    fn apply_reverse(&mut self, action: &UndoAction) {
        match action {
            UndoAction::InsertGroup {
                line,
                start_col,
                chars,
            } => {
                if let Some(l) = self.lines.get_mut(*line) {
                    let start = char_to_byte_index(l, *start_col);
                    let end = char_to_byte_index(l, *start_col + chars.chars().count());
                    l.replace_range(start..end, "");
                }
                self.cursor_line = *line;
                self.cursor_col = *start_col;
            }
            UndoAction::DeleteGroup {
                line,
                start_col,
                chars,
            } => {
                if let Some(l) = self.lines.get_mut(*line) {
                    let byte_idx = char_to_byte_index(l, *start_col);
                    l.insert_str(byte_idx, chars);
                }
                self.cursor_line = *line;
                self.cursor_col = *start_col + chars.chars().count();
            }
            UndoAction::SplitLine { line, col, indent } => {
                if *line + 1 < self.lines.len() {
                    let next = self.lines.remove(*line + 1);
                    let rest = &next[char_to_byte_index(&next, indent.chars().count())..];
                    let trunc = char_to_byte_index(&self.lines[*line], *col);
                    self.lines[*line].truncate(trunc);
                    self.lines[*line].push_str(rest);
                }
                self.cursor_line = *line;
                self.cursor_col = *col;
            }
            UndoAction::JoinLine { line, col } => {
                if let Some(l) = self.lines.get(*line) {
                    let byte_idx = char_to_byte_index(l, *col);
                    let rest = l[byte_idx..].to_string();
                    self.lines[*line].truncate(byte_idx);
                    self.lines.insert(*line + 1, rest);
                }
                self.cursor_line = *line + 1;
                self.cursor_col = 0;
            }
        }
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }
}

/// Convert a char column to a byte index, clamped to the end of `s`.
fn char_to_byte_index(s: &str, char_col: usize) -> usize {
    s.char_indices()
        .nth(char_col)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
