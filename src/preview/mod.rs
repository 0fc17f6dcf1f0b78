//! File classification and preview rendering.
//!
//! `PreviewDispatcher` maps a file to a `PreviewCategory` by extension and
//! turns it into a `PreviewContent`. Rendering never fails: read, decode and
//! open errors come back as `PreviewContent::Unsupported` carrying the message.

pub mod content;
pub mod document;
pub mod raster;

use std::path::Path;

use crate::fs::catalog::normalize_ext;
use crate::ports::TextStore;

pub use content::PreviewContent;
pub use document::{DocumentBackend, HayroDocuments, OpenDocument};
pub use raster::{thumbnail, ImageCrateDecoder, ImageDecoder, Raster};

/// Shown for files outside the extension table.
pub const UNSUPPORTED_MESSAGE: &str = "[Preview not supported for this file type]";

/// Default text extensions.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "jsp", "html", "css", "js", "py", "md", "log", "csv", "json", "toml", "rs",
];
/// Default image extensions.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
/// Default paginated document extensions.
pub const DEFAULT_DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

/// Default bound for image thumbnails, in pixels.
pub const DEFAULT_IMAGE_MAX_DIMENSION: u32 = 500;
/// Default bound for rendered document pages, in pixels.
pub const DEFAULT_DOCUMENT_MAX_DIMENSION: u32 = 600;
/// Default magnification used when rasterizing document pages.
pub const DEFAULT_DOCUMENT_ZOOM: f32 = 2.0;

/// How a file is previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewCategory {
    Text,
    Image,
    Document,
    Unsupported,
}

impl PreviewCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PreviewCategory::Text => "Text",
            PreviewCategory::Image => "Image",
            PreviewCategory::Document => "Document",
            PreviewCategory::Unsupported => "Unsupported",
        }
    }

    /// Only plain text files can enter edit mode.
    pub fn is_editable(&self) -> bool {
        matches!(self, PreviewCategory::Text)
    }
}

/// Extension-to-category lookup. Extensions are stored lowercase without a dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    pub text: Vec<String>,
    pub image: Vec<String>,
    pub document: Vec<String>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            text: owned(DEFAULT_TEXT_EXTENSIONS),
            image: owned(DEFAULT_IMAGE_EXTENSIONS),
            document: owned(DEFAULT_DOCUMENT_EXTENSIONS),
        }
    }
}

impl ExtensionTable {
    pub fn new(text: &[String], image: &[String], document: &[String]) -> Self {
        let norm = |list: &[String]| list.iter().map(|e| normalize_ext(e)).collect();
        Self {
            text: norm(text),
            image: norm(image),
            document: norm(document),
        }
    }

    /// Classify a file name by its extension, ignoring case.
    pub fn classify(&self, file_name: &str) -> PreviewCategory {
        let ext = match Path::new(file_name).extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_ascii_lowercase(),
            None => return PreviewCategory::Unsupported,
        };
        if self.text.contains(&ext) {
            PreviewCategory::Text
        } else if self.image.contains(&ext) {
            PreviewCategory::Image
        } else if self.document.contains(&ext) {
            PreviewCategory::Document
        } else {
            PreviewCategory::Unsupported
        }
    }
}

/// Size bounds and zoom for raster previews.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewLimits {
    pub image_max: u32,
    pub document_max: u32,
    pub document_zoom: f32,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            image_max: DEFAULT_IMAGE_MAX_DIMENSION,
            document_max: DEFAULT_DOCUMENT_MAX_DIMENSION,
            document_zoom: DEFAULT_DOCUMENT_ZOOM,
        }
    }
}

/// Classifies files and renders them through the image and document backends.
pub struct PreviewDispatcher {
    table: ExtensionTable,
    limits: PreviewLimits,
    images: Box<dyn ImageDecoder>,
    documents: Box<dyn DocumentBackend>,
}

impl PreviewDispatcher {
    pub fn new(
        table: ExtensionTable,
        limits: PreviewLimits,
        images: Box<dyn ImageDecoder>,
        documents: Box<dyn DocumentBackend>,
    ) -> Self {
        Self {
            table,
            limits,
            images,
            documents,
        }
    }

    pub fn classify(&self, file_name: &str) -> PreviewCategory {
        self.table.classify(file_name)
    }

    pub fn limits(&self) -> PreviewLimits {
        self.limits
    }

    /// Render `path` as `category`. `page_index` only matters for documents.
    pub fn render(
        &mut self,
        store: &dyn TextStore,
        path: &Path,
        category: PreviewCategory,
        page_index: usize,
    ) -> PreviewContent {
        match category {
            PreviewCategory::Text => render_text(store, path),
            PreviewCategory::Image => self.render_image(path),
            PreviewCategory::Document => self.render_document(path, page_index),
            PreviewCategory::Unsupported => {
                PreviewContent::Unsupported(UNSUPPORTED_MESSAGE.to_string())
            }
        }
    }

    fn render_image(&self, path: &Path) -> PreviewContent {
        match self.images.decode(path) {
            Ok(raster) => PreviewContent::Image(thumbnail(raster, self.limits.image_max)),
            Err(e) => {
                log::warn!("image preview failed for {}: {}", path.display(), e);
                PreviewContent::Unsupported(format!("[Failed to load image]\n{}", e))
            }
        }
    }

    fn render_document(&mut self, path: &Path, page_index: usize) -> PreviewContent {
        let limits = self.limits;
        let mut doc = match OpenDocument::open(self.documents.as_mut(), path) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("document open failed for {}: {}", path.display(), e);
                return PreviewContent::Unsupported(format!("[Failed to open document]\n{}", e));
            }
        };

        let page_count = doc.page_count();
        if page_count == 0 {
            return PreviewContent::Unsupported("[Document has no pages]".to_string());
        }
        if page_index >= page_count {
            return PreviewContent::Unsupported(format!(
                "[Page {} is out of range: document has {} pages]",
                page_index + 1,
                page_count
            ));
        }

        match doc.render_page(page_index, limits.document_zoom) {
            Ok(raster) => PreviewContent::Document {
                page: thumbnail(raster, limits.document_max),
                page_index,
                page_count,
            },
            Err(e) => {
                log::warn!(
                    "rendering page {} of {} failed: {}",
                    page_index,
                    path.display(),
                    e
                );
                PreviewContent::Unsupported(format!("[Failed to render page]\n{}", e))
            }
        }
    }
}

fn render_text(store: &dyn TextStore, path: &Path) -> PreviewContent {
    match store.read(path) {
        Ok(text) => PreviewContent::Text(text),
        Err(e) => {
            log::warn!("text preview failed for {}: {}", path.display(), e);
            PreviewContent::Unsupported(format!("[Failed to read file]\n{}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::DiskStore;
    use crate::testing::FakeDocuments;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use tempfile::TempDir;

    fn dispatcher_with(docs: FakeDocuments) -> PreviewDispatcher {
        PreviewDispatcher::new(
            ExtensionTable::default(),
            PreviewLimits::default(),
            Box::new(ImageCrateDecoder),
            Box::new(docs),
        )
    }

    #[test]
    fn classify_is_case_insensitive() {
        let table = ExtensionTable::default();
        assert_eq!(table.classify("notes.TXT"), PreviewCategory::Text);
        assert_eq!(table.classify("photo.JpEg"), PreviewCategory::Image);
        assert_eq!(table.classify("book.PDF"), PreviewCategory::Document);
        assert_eq!(table.classify("archive.zip"), PreviewCategory::Unsupported);
        assert_eq!(table.classify("Makefile"), PreviewCategory::Unsupported);
    }

    #[test]
    fn custom_table_normalizes_extensions() {
        let table = ExtensionTable::new(&[".MD".into()], &["Webp".into()], &[]);
        assert_eq!(table.classify("readme.md"), PreviewCategory::Text);
        assert_eq!(table.classify("pic.webp"), PreviewCategory::Image);
        assert_eq!(table.classify("doc.pdf"), PreviewCategory::Unsupported);
    }

    #[test]
    fn text_preview_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello\nworld").unwrap();
        let mut d = dispatcher_with(FakeDocuments::with_pages(1));
        let content = d.render(&DiskStore, &path, PreviewCategory::Text, 0);
        assert_eq!(content, PreviewContent::Text("hello\nworld".into()));
    }

    #[test]
    fn empty_file_is_empty_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();
        let mut d = dispatcher_with(FakeDocuments::with_pages(1));
        let content = d.render(&DiskStore, &path, PreviewCategory::Text, 0);
        assert_eq!(content, PreviewContent::Text(String::new()));
    }

    #[test]
    fn unreadable_text_becomes_unsupported() {
        let dir = TempDir::new().unwrap();
        let mut d = dispatcher_with(FakeDocuments::with_pages(1));
        let content = d.render(
            &DiskStore,
            &dir.path().join("missing.txt"),
            PreviewCategory::Text,
            0,
        );
        match content {
            PreviewContent::Unsupported(msg) => assert!(msg.contains("Failed to read")),
            other => panic!("expected unsupported, got {:?}", other.kind_label()),
        }
    }

    #[test]
    fn invalid_utf8_becomes_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0x63, 0x61, 0x66, 0xe9]).unwrap();
        let mut d = dispatcher_with(FakeDocuments::with_pages(1));
        let content = d.render(&DiskStore, &path, PreviewCategory::Text, 0);
        assert!(matches!(content, PreviewContent::Unsupported(_)));
    }

    #[test]
    fn image_preview_is_thumbnailed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        RgbaImage::from_pixel(1000, 400, Rgba([0, 128, 255, 255]))
            .save(&path)
            .unwrap();
        let mut d = dispatcher_with(FakeDocuments::with_pages(1));
        let content = d.render(&DiskStore, &path, PreviewCategory::Image, 0);
        match content {
            PreviewContent::Image(r) => assert_eq!(r.dimensions(), (500, 200)),
            other => panic!("expected image, got {}", other.kind_label()),
        }
    }

    #[test]
    fn small_image_is_not_upscaled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("icon.png");
        RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        let mut d = dispatcher_with(FakeDocuments::with_pages(1));
        let content = d.render(&DiskStore, &path, PreviewCategory::Image, 0);
        assert_eq!(content.raster().map(|r| r.dimensions()), Some((16, 16)));
    }

    #[test]
    fn corrupt_image_becomes_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"garbage").unwrap();
        let mut d = dispatcher_with(FakeDocuments::with_pages(1));
        let content = d.render(&DiskStore, &path, PreviewCategory::Image, 0);
        assert!(matches!(content, PreviewContent::Unsupported(_)));
    }

    #[test]
    fn document_page_reports_count_and_closes() {
        let docs = FakeDocuments::with_pages(3);
        let stats = docs.stats();
        let mut d = dispatcher_with(docs);
        let content = d.render(&DiskStore, Path::new("book.pdf"), PreviewCategory::Document, 1);
        match &content {
            PreviewContent::Document {
                page_index,
                page_count,
                page,
            } => {
                assert_eq!(*page_index, 1);
                assert_eq!(*page_count, 3);
                assert_eq!(page.get_pixel(0, 0)[0], 1);
            }
            other => panic!("expected document, got {}", other.kind_label()),
        }
        assert_eq!(stats.borrow().opened, 1);
        assert_eq!(stats.borrow().open_handles(), 0);
        assert_eq!(stats.borrow().last_zoom, Some(DEFAULT_DOCUMENT_ZOOM));
    }

    #[test]
    fn document_pages_are_thumbnailed() {
        let docs = FakeDocuments::with_pages(1).page_size(2000, 1000);
        let mut d = dispatcher_with(docs);
        let content = d.render(&DiskStore, Path::new("big.pdf"), PreviewCategory::Document, 0);
        assert_eq!(content.raster().map(|r| r.dimensions()), Some((600, 300)));
    }

    #[test]
    fn corrupt_document_leaves_no_open_handle() {
        let docs = FakeDocuments::corrupt();
        let stats = docs.stats();
        let mut d = dispatcher_with(docs);
        let content = d.render(&DiskStore, Path::new("bad.pdf"), PreviewCategory::Document, 0);
        match content {
            PreviewContent::Unsupported(msg) => assert!(msg.contains("corrupt")),
            other => panic!("expected unsupported, got {}", other.kind_label()),
        }
        assert_eq!(stats.borrow().open_handles(), 0);
    }

    #[test]
    fn out_of_range_page_closes_document() {
        let docs = FakeDocuments::with_pages(2);
        let stats = docs.stats();
        let mut d = dispatcher_with(docs);
        let content = d.render(&DiskStore, Path::new("a.pdf"), PreviewCategory::Document, 9);
        assert!(matches!(content, PreviewContent::Unsupported(_)));
        assert_eq!(stats.borrow().opened, 1);
        assert_eq!(stats.borrow().closed, 1);
    }

    #[test]
    fn empty_document_is_unsupported() {
        let docs = FakeDocuments::with_pages(0);
        let stats = docs.stats();
        let mut d = dispatcher_with(docs);
        let content = d.render(&DiskStore, Path::new("a.pdf"), PreviewCategory::Document, 0);
        assert!(matches!(content, PreviewContent::Unsupported(_)));
        assert_eq!(stats.borrow().open_handles(), 0);
    }

    #[test]
    fn unsupported_acquires_nothing() {
        let docs = FakeDocuments::with_pages(1);
        let stats = docs.stats();
        let mut d = dispatcher_with(docs);
        let content = d.render(&DiskStore, Path::new("x.bin"), PreviewCategory::Unsupported, 0);
        assert_eq!(content, PreviewContent::Unsupported(UNSUPPORTED_MESSAGE.into()));
        assert_eq!(stats.borrow().opened, 0);
    }
}
