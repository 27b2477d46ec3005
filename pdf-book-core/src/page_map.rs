//! Logical/physical page mapping.
//!
//! A scanned book often stores a two-page spread on a single wide PDF page.
//! [`PageMapper`] classifies every physical page, derives the logical pages a
//! reader navigates by, and groups them into render units (what is actually
//! drawn for one on-screen position).
//!
//! ```
//! use pdf_book_core::geometry::Size;
//! use pdf_book_core::page_map::{classify, Direction, PageMapper};
//!
//! let sizes = [Size::new(100.0, 140.0), Size::new(200.0, 140.0), Size::new(100.0, 140.0)];
//! let mut mapper = PageMapper::default();
//! mapper.build(&classify(&sizes, 1.5));
//!
//! assert_eq!(mapper.total_logical_pages(), 4);
//! assert_eq!(mapper.navigate_by(0, Direction::Increment), 1);
//! assert_eq!(mapper.navigate_by(1, Direction::Increment), 3);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{Rect, Size};

/// Default ratio to the first page's width at which a page counts as a spread.
pub const DEFAULT_SPLIT_THRESHOLD: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// The page stands alone.
    Single,
    /// The page holds two side-by-side reading pages.
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalPage {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub classification: Classification,
}

impl PhysicalPage {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Classify renderer geometry into physical pages.
///
/// The first page is always [`Classification::Single`]; any later page at
/// least `split_threshold` times as wide as the first is a spread.
pub fn classify(sizes: &[Size], split_threshold: f32) -> Vec<PhysicalPage> {
    let Some(first) = sizes.first() else {
        return Vec::new();
    };
    let spread_width = first.width * split_threshold;

    sizes
        .iter()
        .enumerate()
        .map(|(index, size)| {
            let classification = if index > 0 && size.width >= spread_width {
                Classification::Split
            } else {
                Classification::Single
            };
            PhysicalPage {
                index,
                width: size.width,
                height: size.height,
                classification,
            }
        })
        .collect()
}

/// Which part of the physical surface a logical page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    Whole,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalPage {
    pub relative_index: usize,
    pub physical_index: usize,
    pub half: Half,
}

impl LogicalPage {
    /// Crop of `physical` (in renderer units) that this page displays.
    pub fn source_rect(&self, physical: &PhysicalPage) -> Rect {
        let half_width = physical.width / 2.0;
        match self.half {
            Half::Whole => Rect::new(0.0, 0.0, physical.width, physical.height),
            Half::Left => Rect::new(0.0, 0.0, half_width, physical.height),
            Half::Right => Rect::new(half_width, 0.0, half_width, physical.height),
        }
    }

    /// Width this page occupies once cropped.
    pub fn display_width(&self, physical: &PhysicalPage) -> f32 {
        self.source_rect(physical).width
    }
}

/// Logical pages drawn together at one display position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderUnit {
    pub display_position: usize,
    pub physical: PhysicalPage,
    pub pages: Vec<LogicalPage>,
}

impl RenderUnit {
    pub fn first_relative_index(&self) -> usize {
        self.pages
            .first()
            .map(|page| page.relative_index)
            .unwrap_or_default()
    }

    /// Box of the unit in renderer units: its pages laid side by side.
    pub fn content_size(&self) -> Size {
        let width = self
            .pages
            .iter()
            .map(|page| page.display_width(&self.physical))
            .sum();
        Size::new(width, self.physical.height)
    }
}

/// Frozen `relative index <-> display position` association for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageIndexMap {
    logical: Vec<LogicalPage>,
    display_of: Vec<usize>,
    units: Vec<RenderUnit>,
}

impl PageIndexMap {
    fn from_pages(pages: &[PhysicalPage]) -> Self {
        let uniform = pages
            .first()
            .map(|first| pages.iter().all(|page| page.width == first.width))
            .unwrap_or(true);

        let mut map = PageIndexMap::default();
        for physical in pages {
            let display_position = map.units.len();
            let halves: &[Half] = match physical.classification {
                Classification::Split if !uniform => &[Half::Left, Half::Right],
                _ => &[Half::Whole],
            };

            let unit_pages = halves
                .iter()
                .map(|&half| {
                    let page = LogicalPage {
                        relative_index: map.logical.len(),
                        physical_index: physical.index,
                        half,
                    };
                    map.logical.push(page);
                    map.display_of.push(display_position);
                    page
                })
                .collect();

            map.units.push(RenderUnit {
                display_position,
                physical: *physical,
                pages: unit_pages,
            });
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.logical.is_empty()
    }

    pub fn total_logical_pages(&self) -> usize {
        self.logical.len()
    }

    pub fn render_unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn logical_page(&self, relative_index: usize) -> Option<&LogicalPage> {
        self.logical.get(relative_index)
    }

    pub fn logical_pages(&self) -> &[LogicalPage] {
        &self.logical
    }

    pub fn display_position(&self, relative_index: usize) -> Option<usize> {
        self.display_of.get(relative_index).copied()
    }

    /// First relative index shown at `display_position`.
    pub fn relative_index(&self, display_position: usize) -> Option<usize> {
        self.units
            .get(display_position)
            .map(RenderUnit::first_relative_index)
    }

    pub fn render_unit(&self, display_position: usize) -> Option<&RenderUnit> {
        self.units.get(display_position)
    }

    pub fn render_units(&self) -> &[RenderUnit] {
        &self.units
    }

    /// Render unit containing `relative_index`.
    pub fn unit_of(&self, relative_index: usize) -> Option<&RenderUnit> {
        self.display_position(relative_index)
            .and_then(|position| self.units.get(position))
    }

    pub fn last_unit_len(&self) -> usize {
        self.units.last().map_or(1, |unit| unit.pages.len())
    }
}

/// Builds the page map once per document and answers navigation queries.
#[derive(Debug, Clone)]
pub struct PageMapper {
    split_threshold: f32,
    map: PageIndexMap,
}

impl Default for PageMapper {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_THRESHOLD)
    }
}

impl PageMapper {
    pub fn new(split_threshold: f32) -> Self {
        Self {
            split_threshold,
            map: PageIndexMap::default(),
        }
    }

    pub fn split_threshold(&self) -> f32 {
        self.split_threshold
    }

    /// Classify `sizes` with the configured threshold and build from them.
    pub fn build_from_sizes(&mut self, sizes: &[Size]) -> bool {
        let pages = classify(sizes, self.split_threshold);
        self.build(&pages)
    }

    /// Build the map from a fully loaded document.
    ///
    /// Returns `false` and leaves the map untouched when a map is already
    /// built; call [`PageMapper::reset`] before loading another document.
    pub fn build(&mut self, pages: &[PhysicalPage]) -> bool {
        if !self.map.is_empty() {
            warn!(
                physical_pages = pages.len(),
                "page map already built, ignoring rebuild"
            );
            return false;
        }

        self.map = PageIndexMap::from_pages(pages);
        debug!(
            physical_pages = pages.len(),
            logical_pages = self.map.total_logical_pages(),
            render_units = self.map.render_unit_count(),
            "built page map"
        );
        true
    }

    pub fn reset(&mut self) {
        debug!("page map reset");
        self.map = PageIndexMap::default();
    }

    pub fn map(&self) -> &PageIndexMap {
        &self.map
    }

    pub fn total_logical_pages(&self) -> usize {
        self.map.total_logical_pages()
    }

    /// Step one render unit forward or back, landing on that unit's first
    /// logical page. Out-of-range steps leave `current` unchanged.
    pub fn navigate_by(&self, current: usize, direction: Direction) -> usize {
        let Some(position) = self.map.display_position(current) else {
            return current;
        };
        let stepped = match direction {
            Direction::Increment => position.checked_add(1),
            Direction::Decrement => position.checked_sub(1),
        };
        stepped
            .and_then(|position| self.map.relative_index(position))
            .unwrap_or(current)
    }

    /// Whether the page-turn affordance for `direction` should be enabled.
    pub fn can_navigate(&self, current: usize, direction: Direction) -> bool {
        let total = self.total_logical_pages();
        if total == 0 {
            return false;
        }
        match direction {
            Direction::Decrement => current > 0,
            Direction::Increment => current < total.saturating_sub(self.map.last_unit_len()),
        }
    }

    /// Clamp an externally requested index into the valid range.
    pub fn clamp_index(&self, requested: i64) -> usize {
        let last = self.total_logical_pages().saturating_sub(1);
        usize::try_from(requested.max(0)).map_or(last, |index| index.min(last))
    }

    pub fn progress(&self, relative_index: usize) -> f32 {
        progress(relative_index, self.total_logical_pages())
    }
}

/// Reading progress as a percentage in `[0, 100]`.
pub fn progress(relative_index: usize, total_logical_pages: usize) -> f32 {
    if total_logical_pages <= 1 {
        return 0.0;
    }
    let fraction = relative_index as f32 / (total_logical_pages - 1) as f32;
    (fraction * 100.0).clamp(0.0, 100.0)
}

/// Validate the text of a 1-based page-number field.
///
/// `Some(None)` means the field is empty and may be kept; `Some(Some(n))` is a
/// page number in `1..=total`; `None` rejects the edit.
pub fn parse_page_number(text: &str, total_logical_pages: usize) -> Option<Option<usize>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(None);
    }
    let number: usize = text.parse().ok()?;
    (1..=total_logical_pages)
        .contains(&number)
        .then_some(Some(number))
}
