use crate::preview::raster::Raster;

/// What the preview pane currently shows. Exactly one variant is live.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PreviewContent {
    #[default]
    Empty,
    Text(String),
    Image(Raster),
    Document {
        page: Raster,
        page_index: usize,
        page_count: usize,
    },
    Unsupported(String),
}

impl PreviewContent {
    /// Drop whatever the current variant holds and go back to `Empty`.
    pub fn release(&mut self) {
        *self = PreviewContent::Empty;
    }

    /// Release the current variant, then take `next`.
    pub fn replace(&mut self, next: PreviewContent) {
        self.release();
        *self = next;
    }

    /// Pages available for this content; 1 for anything not paginated.
    pub fn page_count(&self) -> usize {
        match self {
            PreviewContent::Document { page_count, .. } => *page_count,
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PreviewContent::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PreviewContent::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The raster to draw, for image and document previews.
    pub fn raster(&self) -> Option<&Raster> {
        match self {
            PreviewContent::Image(r) => Some(r),
            PreviewContent::Document { page, .. } => Some(page),
            _ => None,
        }
    }

    /// Short label for the status bar.
    pub fn kind_label(&self) -> &'static str {
        match self {
            PreviewContent::Empty => "Empty",
            PreviewContent::Text(_) => "Text",
            PreviewContent::Image(_) => "Image",
            PreviewContent::Document { .. } => "Document",
            PreviewContent::Unsupported(_) => "Unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn default_is_empty() {
        assert!(PreviewContent::default().is_empty());
    }

    #[test]
    fn release_returns_to_empty() {
        let mut content = PreviewContent::Image(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])));
        content.release();
        assert_eq!(content, PreviewContent::Empty);
    }

    #[test]
    fn replace_swaps_variant() {
        let mut content = PreviewContent::Text("old".into());
        content.replace(PreviewContent::Unsupported("nope".into()));
        assert_eq!(content, PreviewContent::Unsupported("nope".into()));
    }

    #[test]
    fn page_count_only_for_documents() {
        let page = RgbaImage::new(1, 1);
        let doc = PreviewContent::Document {
            page: page.clone(),
            page_index: 0,
            page_count: 7,
        };
        assert_eq!(doc.page_count(), 7);
        assert_eq!(PreviewContent::Image(page).page_count(), 1);
        assert_eq!(PreviewContent::Text(String::new()).page_count(), 1);
    }

    #[test]
    fn raster_accessor() {
        let page = RgbaImage::new(3, 2);
        let doc = PreviewContent::Document {
            page,
            page_index: 0,
            page_count: 1,
        };
        assert_eq!(doc.raster().map(|r| r.dimensions()), Some((3, 2)));
        assert!(PreviewContent::Text("x".into()).raster().is_none());
        assert_eq!(PreviewContent::Text("x".into()).as_text(), Some("x"));
    }
}
