//! Constrained pan/zoom transform driven by gestures and zoom controls.
//!
//! [`ViewportTransform`] keeps the content of one render unit centered in a
//! container, scaled by `base_scale * zoom` and offset by `pan`. Gestures
//! update it live; when a gesture ends, or the zoom is set from the controls,
//! the transform settles onto a constrained target through a
//! [`TransformAnimation`]. At most one animation is in flight at a time.

use std::time::Duration;

use tracing::{debug, trace};

use crate::animation::{SpringConfig, TransformAnimation};
use crate::config::ViewerConfig;
use crate::geometry::{rubberband_if_out_of_bounds, Rect, Size, Transform, Vector};
use crate::gesture::Gesture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    DragSettling,
    Pinching,
    PinchSettling,
}

impl GesturePhase {
    /// A pointer gesture is writing the transform directly.
    pub fn is_live(self) -> bool {
        matches!(self, GesturePhase::Dragging | GesturePhase::Pinching)
    }
}

/// Box of the displayed render unit, in renderer units.
///
/// `id` identifies what is shown (the render unit's display position), so
/// turning to a page of identical size still counts as new content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBox {
    pub id: usize,
    pub size: Size,
}

impl ContentBox {
    pub fn new(id: usize, size: Size) -> Self {
        Self { id, size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragMemo {
    start_pan: Vector,
    /// Zoom the interrupted settle was heading for, clamped into bounds.
    zoom_goal: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchMemo {
    start_pan: Vector,
    start_zoom: f32,
    /// Focal point relative to the content center at pinch start.
    focal_offset: Vector,
}

#[derive(Debug, Clone)]
pub struct ViewportTransform {
    min_zoom: f32,
    max_zoom: f32,
    page_spacing: f32,
    rubberband: f32,
    spring: SpringConfig,

    container: Option<Size>,
    content: Option<ContentBox>,
    base_scale: f32,

    pan: Vector,
    zoom: f32,
    phase: GesturePhase,
    drag: Option<DragMemo>,
    pinch: Option<PinchMemo>,
    animation: Option<TransformAnimation>,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

impl ViewportTransform {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            min_zoom: config.zoom_levels.min(),
            max_zoom: config.zoom_levels.max(),
            page_spacing: config.page_spacing,
            rubberband: config.rubberband,
            spring: config.spring,
            container: None,
            content: None,
            base_scale: 1.0,
            pan: Vector::ZERO,
            zoom: 1.0,
            phase: GesturePhase::Idle,
            drag: None,
            pinch: None,
            animation: None,
        }
    }

    pub fn pan(&self) -> Vector {
        self.pan
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.pan, self.zoom)
    }

    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    pub fn effective_scale(&self) -> f32 {
        self.base_scale * self.zoom
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn container(&self) -> Option<Size> {
        self.container
    }

    pub fn content(&self) -> Option<ContentBox> {
        self.content
    }

    pub fn zoom_bounds(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Where the current animation (or, without one, the current state) is
    /// heading.
    pub fn goal(&self) -> Transform {
        self.animation
            .as_ref()
            .map_or_else(|| self.transform(), TransformAnimation::target)
    }

    /// Both the container and the content box are known and non-empty.
    pub fn is_ready(&self) -> bool {
        matches!(
            (self.container, self.content),
            (Some(container), Some(content)) if !container.is_empty() && !content.size.is_empty()
        )
    }

    /// Size the content currently occupies on screen.
    pub fn rendered_size(&self) -> Option<Size> {
        self.content
            .map(|content| content.size.scale(self.effective_scale()))
    }

    /// On-screen rectangle of the content in container coordinates.
    pub fn content_rect(&self) -> Option<Rect> {
        let container = self.container?;
        let size = self.rendered_size()?;
        Some(Rect::centered(container.center() + self.pan, size))
    }

    /// Container position of `point`, given in unscaled content units relative
    /// to the content center.
    pub fn content_to_screen(&self, point: Vector) -> Option<Vector> {
        let container = self.container?;
        Some(container.center() + self.pan + point * self.effective_scale())
    }

    /// Inverse of [`ViewportTransform::content_to_screen`].
    pub fn screen_to_content(&self, point: Vector) -> Option<Vector> {
        let container = self.container?;
        let scale = self.effective_scale();
        if scale <= 0.0 {
            return None;
        }
        Some((point - container.center() - self.pan) * (1.0 / scale))
    }

    pub fn on_container_resize(&mut self, size: Size) {
        debug!(width = size.width, height = size.height, "container resized");
        self.container = Some(size);
        self.rescale();
    }

    /// Show new content. Unchanged content keeps the current transform.
    pub fn set_content_box(&mut self, content: ContentBox) {
        if self.content == Some(content) {
            return;
        }
        debug!(id = content.id, width = content.size.width, height = content.size.height, "content box changed");
        self.content = Some(content);
        self.rescale();
    }

    /// Drop the content (document switch). Cancels any settle in flight.
    pub fn clear_content(&mut self) {
        debug!("content cleared");
        self.content = None;
        self.base_scale = 1.0;
        self.reset();
    }

    /// Back to identity: no pan, 100% zoom, no gesture, no animation.
    pub fn reset(&mut self) {
        self.pan = Vector::ZERO;
        self.zoom = 1.0;
        self.phase = GesturePhase::Idle;
        self.drag = None;
        self.pinch = None;
        self.animation = None;
    }

    fn rescale(&mut self) {
        if let (Some(container), Some(content)) = (self.container, self.content) {
            self.base_scale = fit_scale(container, content.size, self.page_spacing);
        }
        self.reset();
    }

    /// Clamp `pan` so the content cannot be pushed past its own edges.
    pub fn constrain_pan(&self, pan: Vector, zoom: f32) -> Vector {
        let Some(content) = self.content else {
            return Vector::ZERO;
        };
        if zoom <= 1.0 {
            return Vector::ZERO;
        }
        let bound_x = content.size.width * self.base_scale * zoom / 2.0;
        let bound_y = content.size.height * self.base_scale * zoom / 2.0;
        Vector::new(pan.x.clamp(-bound_x, bound_x), pan.y.clamp(-bound_y, bound_y))
    }

    /// Feed a recognized gesture into the matching handler.
    pub fn apply(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Drag { movement } => self.on_drag(movement),
            Gesture::DragEnd => self.on_drag_end(),
            Gesture::Pinch { origin, ratio, .. } => self.on_pinch(origin, ratio),
            Gesture::PinchEnd => self.on_pinch_end(),
        }
    }

    /// `movement` is cumulative since the drag began.
    pub fn on_drag(&mut self, movement: Vector) {
        if !self.is_ready() || self.phase == GesturePhase::Pinching {
            return;
        }
        let start_pan = match self.drag {
            Some(memo) => memo.start_pan,
            None => {
                let zoom_goal = self.goal().zoom.clamp(self.min_zoom, self.max_zoom);
                self.animation = None;
                self.phase = GesturePhase::Dragging;
                self.drag = Some(DragMemo {
                    start_pan: self.pan,
                    zoom_goal,
                });
                self.pan
            }
        };
        self.pan = start_pan + movement;
        trace!(x = self.pan.x, y = self.pan.y, "drag");
    }

    pub fn on_drag_end(&mut self) {
        if self.phase != GesturePhase::Dragging {
            return;
        }
        let zoom = self
            .drag
            .take()
            .map_or(self.zoom, |memo| memo.zoom_goal)
            .clamp(self.min_zoom, self.max_zoom);
        self.settle(zoom, GesturePhase::DragSettling);
    }

    /// `origin` is the focal point in container coordinates, `ratio` the
    /// finger distance relative to the start of the pinch.
    pub fn on_pinch(&mut self, origin: Vector, ratio: f32) {
        if !self.is_ready() || !(ratio.is_finite() && ratio > 0.0) {
            return;
        }
        let memo = match self.pinch {
            Some(memo) => memo,
            None => self.begin_pinch(origin),
        };

        let raw_zoom = memo.start_zoom * ratio;
        let zoom = rubberband_if_out_of_bounds(raw_zoom, self.min_zoom, self.max_zoom, self.rubberband);
        let displacement = zoom / memo.start_zoom - 1.0;

        self.zoom = zoom;
        self.pan = memo.start_pan - memo.focal_offset * displacement;
        trace!(zoom, x = self.pan.x, y = self.pan.y, "pinch");
    }

    fn begin_pinch(&mut self, origin: Vector) -> PinchMemo {
        if self.phase == GesturePhase::Dragging {
            debug!("pinch cancels drag");
        }
        self.drag = None;
        self.animation = None;
        self.phase = GesturePhase::Pinching;

        let content_center = self
            .container
            .map_or(Vector::ZERO, |container| container.center() + self.pan);
        let memo = PinchMemo {
            start_pan: self.pan,
            start_zoom: self.zoom,
            focal_offset: origin - content_center,
        };
        self.pinch = Some(memo);
        memo
    }

    pub fn on_pinch_end(&mut self) {
        if self.phase != GesturePhase::Pinching {
            return;
        }
        self.pinch = None;
        let zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        self.settle(zoom, GesturePhase::PinchSettling);
    }

    /// Wheel/trackpad scroll: moves the content against `delta` and clamps
    /// immediately. A settle in flight keeps animating, toward the scrolled
    /// target.
    pub fn on_scroll(&mut self, delta: Vector) {
        if !self.is_ready() || self.phase.is_live() {
            return;
        }
        let goal = self.goal();
        let pan = self.constrain_pan(goal.pan - delta, goal.zoom);
        match self.animation.as_mut() {
            Some(animation) => animation.retarget(Transform::new(pan, goal.zoom)),
            None => self.pan = pan,
        }
    }

    /// Zoom requested by the controls. Clamped into the zoom bounds and
    /// animated; a live gesture keeps control of the transform instead.
    pub fn set_zoom(&mut self, zoom: f32) {
        if !self.is_ready() || !zoom.is_finite() {
            return;
        }
        if self.phase.is_live() {
            debug!(zoom, phase = ?self.phase, "zoom request ignored during gesture");
            return;
        }
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        let pan = self.constrain_pan(self.goal().pan, zoom);
        debug!(zoom, "zoom requested");
        self.animate_to(Transform::new(pan, zoom));
    }

    /// Advance the settle animation. Returns whether it is still running.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if self.phase.is_live() {
            return false;
        }
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let current = animation.step(elapsed);
        self.pan = current.pan;
        self.zoom = current.zoom;

        if animation.is_finished() {
            self.animation = None;
            if matches!(self.phase, GesturePhase::DragSettling | GesturePhase::PinchSettling) {
                debug!(phase = ?self.phase, zoom = self.zoom, "settled");
                self.phase = GesturePhase::Idle;
            }
            return false;
        }
        true
    }

    fn settle(&mut self, zoom: f32, phase: GesturePhase) {
        let target = Transform::new(self.constrain_pan(self.pan, zoom), zoom);
        self.phase = phase;
        debug!(?phase, zoom, x = target.pan.x, y = target.pan.y, "settling");
        self.animate_to(target);
        if self.animation.is_none() {
            self.phase = GesturePhase::Idle;
        }
    }

    fn animate_to(&mut self, target: Transform) {
        if self.animation.is_none() && self.transform() == target {
            return;
        }
        match self.animation.as_mut() {
            Some(animation) => animation.retarget(target),
            None => {
                self.animation = Some(TransformAnimation::new(self.transform(), target, self.spring));
            }
        }
    }
}

/// Scale at which `content` plus `spacing` fits inside `container` on the
/// binding axis.
pub fn fit_scale(container: Size, content: Size, spacing: f32) -> f32 {
    let by_width = container.width / (content.width + spacing);
    let by_height = container.height / (content.height + spacing);
    let scale = by_width.min(by_height);
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
