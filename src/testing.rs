//! Test doubles for the collaborator traits.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{Rgba, RgbaImage};

use crate::error::{AppError, Result};
use crate::ports::{ConfirmPrompt, FolderChooser, Notice, Notifier, TargetChooser, TextStore};
use crate::preview::document::{DocumentBackend, DocumentId};
use crate::preview::raster::Raster;

/// Counters shared between a `FakeDocuments` and the test that built it.
#[derive(Debug, Default)]
pub struct DocStats {
    pub opened: usize,
    pub closed: usize,
    pub rendered: Vec<usize>,
    pub last_zoom: Option<f32>,
}

impl DocStats {
    pub fn open_handles(&self) -> usize {
        self.opened - self.closed
    }
}

/// Document backend with a fixed page count. Page `i` is filled with red = `i`.
pub struct FakeDocuments {
    pages: usize,
    corrupt: bool,
    size: (u32, u32),
    next_id: u64,
    stats: Rc<RefCell<DocStats>>,
}

impl FakeDocuments {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            corrupt: false,
            size: (40, 60),
            next_id: 1,
            stats: Rc::default(),
        }
    }

    /// A backend whose every open fails.
    pub fn corrupt() -> Self {
        Self {
            corrupt: true,
            ..Self::with_pages(0)
        }
    }

    pub fn page_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn stats(&self) -> Rc<RefCell<DocStats>> {
        Rc::clone(&self.stats)
    }
}

impl DocumentBackend for FakeDocuments {
    fn open(&mut self, path: &Path) -> Result<DocumentId> {
        if self.corrupt {
            return Err(AppError::Decode(format!(
                "corrupt document: {}",
                path.display()
            )));
        }
        self.stats.borrow_mut().opened += 1;
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    fn page_count(&self, _doc: DocumentId) -> usize {
        self.pages
    }

    fn render_page(&mut self, _doc: DocumentId, index: usize, zoom: f32) -> Result<Raster> {
        if index >= self.pages {
            return Err(AppError::Decode(format!("no page {}", index)));
        }
        let mut stats = self.stats.borrow_mut();
        stats.rendered.push(index);
        stats.last_zoom = Some(zoom);
        Ok(RgbaImage::from_pixel(
            self.size.0,
            self.size.1,
            Rgba([index as u8, 0, 0, 255]),
        ))
    }

    fn close(&mut self, _doc: DocumentId) {
        self.stats.borrow_mut().closed += 1;
    }
}

/// Confirmation prompt that replays scripted answers and records the questions.
/// Answers "no" once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    pub questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            questions: Vec::new(),
        }
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

/// Notifier that keeps every notice it was given.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Chooser that returns a fixed answer.
#[derive(Debug, Default)]
pub struct FixedChooser(pub Option<PathBuf>);

impl FolderChooser for FixedChooser {
    fn choose(&mut self) -> Option<PathBuf> {
        self.0.clone()
    }
}

impl TargetChooser for FixedChooser {
    fn choose(&mut self, _suggested_name: &str) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Store that reads from disk but refuses every write.
#[derive(Debug, Default)]
pub struct ReadOnlyStore;

impl TextStore for ReadOnlyStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, _path: &Path, _text: &str) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "read-only store",
        ))
    }
}

/// Disk-backed store that records which files were read.
#[derive(Debug, Default)]
pub struct CountingStore {
    reads: Rc<RefCell<Vec<PathBuf>>>,
}

impl CountingStore {
    pub fn reads(&self) -> Rc<RefCell<Vec<PathBuf>>> {
        Rc::clone(&self.reads)
    }
}

impl TextStore for CountingStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.reads.borrow_mut().push(path.to_path_buf());
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        std::fs::write(path, text)
    }
}

/// A well-formed PDF with `pages` pages of 50x40pt, each holding a blue
/// 30x20 box at (10, 10).
pub fn tiny_pdf(pages: usize) -> Vec<u8> {
    let content = "0 0 1 rg 10 10 30 20 re f";
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages
        ),
    ];
    for i in 0..pages {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 50 40] /Resources << >> /Contents {} 0 R >>",
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref = out.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        tail.push_str(&format!("{:010} 00000 n \n", offset));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));
    out.extend_from_slice(tail.as_bytes());
    out
}
