//! Page mapping and viewport engine for a paginated PDF book viewer.
//!
//! - [`page_map`] turns physical PDF pages (some of which are two-page
//!   spreads) into the logical pages a reader turns through.
//! - [`viewport`] keeps the displayed page fitted, panned and zoomed, with
//!   rubber-banded pinch zoom and animated settling.
//! - [`gesture`] recognizes drags and pinches from raw pointer events.

pub mod animation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod page_map;
pub mod viewport;
pub mod zoom;

pub use config::ViewerConfig;
pub use error::{BookError, Result};
pub use geometry::{Rect, Size, Transform, Vector};
pub use gesture::{Gesture, GestureRecognizer, PointerEvent, PointerId, PointerPhase};
pub use page_map::{Direction, Half, LogicalPage, PageIndexMap, PageMapper, PhysicalPage};
pub use viewport::{ContentBox, GesturePhase, ViewportTransform};
pub use zoom::ZoomLevels;
