use anyhow::{Context, Result};
use image::RgbaImage;
use pdf_book_core::Size;
use pdfium_render::prelude::*;
use std::path::Path;

/// PDF renderer using pdfium-render
pub struct PdfRenderer {
    pdfium: &'static Pdfium,
}

impl PdfRenderer {
    pub fn new() -> Result<Self> {
        let pdfium = Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?,
        );
        // Documents borrow the bindings; the viewer keeps them for the whole
        // process lifetime.
        Ok(Self {
            pdfium: Box::leak(Box::new(pdfium)),
        })
    }

    pub fn load_document(&self, path: &Path) -> Result<Document> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .with_context(|| format!("Failed to load PDF document {}", path.display()))?;
        Ok(Document { inner: document })
    }
}

pub struct Document {
    inner: PdfDocument<'static>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("page_count", &self.page_count())
            .finish()
    }
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.inner.pages().len() as usize
    }

    fn page(&self, page_index: usize) -> Result<PdfPage<'_>> {
        let index = u16::try_from(page_index).context("Page index out of bounds")?;
        self.inner
            .pages()
            .get(index)
            .context("Page index out of bounds")
    }

    /// Intrinsic size of every page in PDF points, in page order.
    pub fn page_sizes(&self) -> Result<Vec<Size>> {
        (0..self.page_count())
            .map(|index| {
                let page = self.page(index)?;
                Ok(Size::new(page.width().value, page.height().value))
            })
            .collect()
    }

    /// Rasterize one physical page at `scale` bitmap pixels per point.
    pub fn render_page(&self, page_index: usize, scale: f32) -> Result<RgbaImage> {
        let page = self.page(page_index)?;

        let render_width = (page.width().value * scale).round().max(1.0) as i32;
        let render_height = (page.height().value * scale).round().max(1.0) as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(render_width)
            .set_maximum_height(render_height)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&render_config)
            .with_context(|| format!("Failed to render page {page_index}"))?;

        RgbaImage::from_raw(
            bitmap.width() as u32,
            bitmap.height() as u32,
            bitmap.as_rgba_bytes(),
        )
        .context("Failed to create image from bitmap")
    }
}
