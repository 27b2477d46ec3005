use crate::renderer::{Document, PdfRenderer};
use anyhow::Result;
use iced::widget::image::Handle;
use image::{imageops, RgbaImage};
use pdf_book_core::page_map::{PageMapper, RenderUnit};
use pdf_book_core::{Rect, Size};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Rendered render units kept around; page turns back and forth stay cheap.
const CACHE_LIMIT: usize = 10;

/// A loaded PDF book with a cache of rendered render units
#[derive(Debug)]
pub struct PdfBook {
    path: PathBuf,
    document: Document,
    page_sizes: Vec<Size>,
    render_scale: f32,
    unit_cache: HashMap<usize, Handle>, // display_position -> rendered image
    cache_order: Vec<usize>,
}

impl PdfBook {
    /// Load a PDF document from a file path
    pub fn load(renderer: &PdfRenderer, path: &Path, render_scale: f32) -> Result<Self> {
        let document = renderer.load_document(path)?;
        let page_sizes = document.page_sizes()?;
        tracing::info!(path = %path.display(), pages = page_sizes.len(), "opened document");

        Ok(Self {
            path: path.to_path_buf(),
            document,
            page_sizes,
            render_scale,
            unit_cache: HashMap::new(),
            cache_order: Vec::new(),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }

    /// Geometry the page mapper is built from.
    pub fn page_sizes(&self) -> &[Size] {
        &self.page_sizes
    }

    /// Rendered image of the render unit at `display_position`.
    pub fn rendered_unit(&mut self, mapper: &PageMapper, display_position: usize) -> Option<Handle> {
        // Check cache first
        if let Some(handle) = self.unit_cache.get(&display_position) {
            return Some(handle.clone());
        }

        let unit = mapper.map().render_unit(display_position)?;
        match self.render_unit(unit) {
            Ok(img) => {
                let handle = Handle::from_rgba(img.width(), img.height(), img.into_raw());
                self.remember(display_position, handle.clone());
                Some(handle)
            }
            Err(e) => {
                tracing::error!("Failed to render page {}: {:#}", unit.physical.index, e);
                None
            }
        }
    }

    /// Rasterize the unit's physical page and lay its logical pages side by
    /// side, each cropped to the half it shows.
    fn render_unit(&self, unit: &RenderUnit) -> Result<RgbaImage> {
        let physical = self
            .document
            .render_page(unit.physical.index, self.render_scale)?;
        let px_per_unit = physical.width() as f32 / unit.physical.width;

        let crops: Vec<_> = unit
            .pages
            .iter()
            .map(|page| {
                let rect = page.source_rect(&unit.physical);
                let (x, width) = crop_columns(rect, px_per_unit, physical.width());
                imageops::crop_imm(&physical, x, 0, width, physical.height()).to_image()
            })
            .collect();

        let width = crops.iter().map(RgbaImage::width).sum();
        let mut composed = RgbaImage::new(width, physical.height());
        let mut x = 0i64;
        for crop in &crops {
            imageops::replace(&mut composed, crop, x, 0);
            x += i64::from(crop.width());
        }
        Ok(composed)
    }

    fn remember(&mut self, display_position: usize, handle: Handle) {
        self.unit_cache.insert(display_position, handle);
        self.cache_order.push(display_position);

        // Limit cache size to avoid memory issues, oldest entries first
        while self.cache_order.len() > CACHE_LIMIT {
            let oldest = self.cache_order.remove(0);
            self.unit_cache.remove(&oldest);
        }
    }
}

/// Pixel columns `(x, width)` of a bitmap `image_width` pixels wide that show
/// `rect`, never running past the right edge.
fn crop_columns(rect: Rect, px_per_unit: f32, image_width: u32) -> (u32, u32) {
    let x = ((rect.x * px_per_unit).round() as u32).min(image_width.saturating_sub(1));
    let width = ((rect.width * px_per_unit).round() as u32)
        .min(image_width - x)
        .max(1);
    (x, width)
}
