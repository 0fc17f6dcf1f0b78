use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use hayro::hayro_interpret::InterpreterSettings;
use hayro::hayro_syntax::Pdf;
use hayro::RenderSettings;

use crate::error::{AppError, Result};
use crate::preview::raster::Raster;

/// Opaque handle to a document opened by a `DocumentBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

/// Page rasterizer for paginated documents.
///
/// Every successful `open` must be paired with exactly one `close`.
pub trait DocumentBackend {
    fn open(&mut self, path: &Path) -> Result<DocumentId>;
    fn page_count(&self, doc: DocumentId) -> usize;
    fn render_page(&mut self, doc: DocumentId, index: usize, zoom: f32) -> Result<Raster>;
    fn close(&mut self, doc: DocumentId);
}

/// An open document that is closed when dropped.
pub struct OpenDocument<'a, B: DocumentBackend + ?Sized> {
    backend: &'a mut B,
    id: DocumentId,
}

impl<'a, B: DocumentBackend + ?Sized> OpenDocument<'a, B> {
    pub fn open(backend: &'a mut B, path: &Path) -> Result<Self> {
        let id = backend.open(path)?;
        Ok(Self { backend, id })
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count(self.id)
    }

    pub fn render_page(&mut self, index: usize, zoom: f32) -> Result<Raster> {
        self.backend.render_page(self.id, index, zoom)
    }
}

impl<B: DocumentBackend + ?Sized> Drop for OpenDocument<'_, B> {
    fn drop(&mut self) {
        self.backend.close(self.id);
    }
}

/// PDF backend on top of the pure-Rust `hayro` renderer.
///
/// Parsed documents live in memory between `open` and `close`.
#[derive(Default)]
pub struct HayroDocuments {
    open: HashMap<DocumentId, Pdf>,
    next_id: u64,
}

impl HayroDocuments {
    fn get(&self, doc: DocumentId) -> Result<&Pdf> {
        self.open
            .get(&doc)
            .ok_or_else(|| AppError::Decode(format!("document {} is not open", doc.0)))
    }
}

impl DocumentBackend for HayroDocuments {
    fn open(&mut self, path: &Path) -> Result<DocumentId> {
        let data: Arc<dyn AsRef<[u8]> + Send + Sync> = Arc::new(std::fs::read(path)?);
        let pdf = Pdf::new(data)
            .map_err(|e| AppError::Decode(format!("{}: {:?}", path.display(), e)))?;
        self.next_id += 1;
        let id = DocumentId(self.next_id);
        log::debug!(
            "opened {} ({} pages) as {}",
            path.display(),
            pdf.pages().len(),
            id.0
        );
        self.open.insert(id, pdf);
        Ok(id)
    }

    fn page_count(&self, doc: DocumentId) -> usize {
        self.get(doc).map(|pdf| pdf.pages().len()).unwrap_or(0)
    }

    fn render_page(&mut self, doc: DocumentId, index: usize, zoom: f32) -> Result<Raster> {
        let pdf = self.get(doc)?;
        let pages = pdf.pages();
        let Some(page) = pages.get(index) else {
            return Err(AppError::Decode(format!(
                "page {} is out of range ({} pages)",
                index + 1,
                pages.len()
            )));
        };
        let settings = RenderSettings {
            x_scale: zoom,
            y_scale: zoom,
            ..Default::default()
        };
        let pixmap = hayro::render(page, &InterpreterSettings::default(), &settings);
        let png = pixmap
            .into_png()
            .map_err(|_| AppError::Decode(format!("cannot encode page {}", index + 1)))?;
        Ok(image::load_from_memory(&png)?.to_rgba8())
    }

    fn close(&mut self, doc: DocumentId) {
        self.open.remove(&doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tiny_pdf, FakeDocuments};
    use std::path::PathBuf;

    #[test]
    fn guard_closes_on_drop() {
        let mut backend = FakeDocuments::with_pages(3);
        let stats = backend.stats();
        {
            let doc = OpenDocument::open(&mut backend, &PathBuf::from("a.pdf")).unwrap();
            assert_eq!(doc.page_count(), 3);
            assert_eq!(stats.borrow().open_handles(), 1);
        }
        assert_eq!(stats.borrow().opened, 1);
        assert_eq!(stats.borrow().closed, 1);
    }

    #[test]
    fn guard_closes_after_render_error() {
        let mut backend = FakeDocuments::with_pages(2);
        let stats = backend.stats();
        {
            let mut doc = OpenDocument::open(&mut backend, &PathBuf::from("a.pdf")).unwrap();
            assert!(doc.render_page(5, 2.0).is_err());
        }
        assert_eq!(stats.borrow().open_handles(), 0);
    }

    #[test]
    fn failed_open_needs_no_close() {
        let mut backend = FakeDocuments::corrupt();
        let stats = backend.stats();
        assert!(OpenDocument::open(&mut backend, &PathBuf::from("bad.pdf")).is_err());
        assert_eq!(stats.borrow().opened, 0);
        assert_eq!(stats.borrow().closed, 0);
    }

    fn write_pdf(dir: &tempfile::TempDir, name: &str, pages: usize) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, tiny_pdf(pages)).unwrap();
        path
    }

    #[test]
    fn hayro_counts_pages() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_pdf(&dir, "three.pdf", 3);
        let mut backend = HayroDocuments::default();
        let doc = OpenDocument::open(&mut backend, &path).unwrap();
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn hayro_renders_page_at_zoom() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_pdf(&dir, "one.pdf", 1);
        let mut backend = HayroDocuments::default();
        let mut doc = OpenDocument::open(&mut backend, &path).unwrap();
        let raster = doc.render_page(0, 2.0).unwrap();
        // 50x40pt media box at 2x
        assert_eq!(raster.dimensions(), (100, 80));
        let center = raster.get_pixel(50, 40);
        assert!(center[2] > 200 && center[0] < 60, "{:?}", center);
    }

    #[test]
    fn hayro_rejects_out_of_range_page() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_pdf(&dir, "one.pdf", 1);
        let mut backend = HayroDocuments::default();
        let mut doc = OpenDocument::open(&mut backend, &path).unwrap();
        assert!(matches!(doc.render_page(1, 2.0), Err(AppError::Decode(_))));
    }

    #[test]
    fn hayro_close_forgets_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_pdf(&dir, "one.pdf", 1);
        let mut backend = HayroDocuments::default();
        let id = backend.open(&path).unwrap();
        backend.close(id);
        assert_eq!(backend.page_count(id), 0);
        assert!(backend.render_page(id, 0, 1.0).is_err());
    }

    #[test]
    fn hayro_fails_on_garbage_and_missing_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let junk = dir.path().join("junk.pdf");
        std::fs::write(&junk, b"not a pdf at all").unwrap();
        let mut backend = HayroDocuments::default();
        assert!(backend.open(&junk).is_err());
        assert!(matches!(
            backend.open(&dir.path().join("missing.pdf")),
            Err(AppError::Io(_))
        ));
    }
}
