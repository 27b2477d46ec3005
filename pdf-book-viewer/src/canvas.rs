use iced::mouse;
use iced::touch;
use iced::widget::canvas::{self, event, Frame, Geometry};
use iced::widget::image::Handle;
use iced::{Rectangle, Renderer, Theme};
use pdf_book_core::viewport::fit_scale;
use pdf_book_core::{PointerEvent, PointerId, PointerPhase, Rect, Size, Vector};

use crate::Message;

/// Mouse pointer id; touch fingers are offset past it.
const MOUSE_POINTER: PointerId = PointerId(0);

/// Pixels scrolled per wheel line.
const SCROLL_LINE: f32 = 48.0;

/// Draws the current render unit at its transformed rectangle and reports
/// pointer input in container coordinates.
pub struct PageCanvas {
    pub image: Option<Handle>,
    /// Content rectangle computed by the viewport for `container`.
    pub target: Option<Rect>,
    pub container: Option<Size>,
    pub content: Option<Size>,
    pub page_spacing: f32,
}

impl PageCanvas {
    /// Where to draw the page inside `bounds`. Until the viewport has seen
    /// these bounds, draw where it will put the page after the resize: fitted
    /// and centered at identity.
    fn placement(&self, bounds: Size) -> Option<Rect> {
        if self.container == Some(bounds) {
            return self.target;
        }
        let content = self.content?;
        let scale = fit_scale(bounds, content, self.page_spacing);
        Some(Rect::centered(bounds.center(), content.scale(scale)))
    }
}

impl canvas::Program<Message> for PageCanvas {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        let size = Size::new(bounds.width, bounds.height);
        if self.container != Some(size) {
            return (event::Status::Ignored, Some(Message::ContainerResized(size)));
        }

        let local = |position: iced::Point| Vector::new(position.x - bounds.x, position.y - bounds.y);
        let pointer = |id, phase, position| {
            (
                event::Status::Captured,
                Some(Message::Pointer(PointerEvent::new(id, phase, position))),
            )
        };

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                match cursor.position_in(bounds) {
                    Some(position) => pointer(
                        MOUSE_POINTER,
                        PointerPhase::Down,
                        Vector::new(position.x, position.y),
                    ),
                    None => (event::Status::Ignored, None),
                }
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
                pointer(MOUSE_POINTER, PointerPhase::Move, local(position))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                pointer(MOUSE_POINTER, PointerPhase::Up, Vector::ZERO)
            }
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.position_in(bounds).is_none() {
                    return (event::Status::Ignored, None);
                }
                let delta = match delta {
                    mouse::ScrollDelta::Lines { x, y } => Vector::new(-x, -y) * SCROLL_LINE,
                    mouse::ScrollDelta::Pixels { x, y } => Vector::new(-x, -y),
                };
                (event::Status::Captured, Some(Message::Scrolled(delta)))
            }
            canvas::Event::Touch(finger_event) => {
                let (finger, phase, position) = match finger_event {
                    touch::Event::FingerPressed { id, position } => (id, PointerPhase::Down, position),
                    touch::Event::FingerMoved { id, position } => (id, PointerPhase::Move, position),
                    touch::Event::FingerLifted { id, position } => (id, PointerPhase::Up, position),
                    touch::Event::FingerLost { id, position } => (id, PointerPhase::Cancel, position),
                };
                pointer(PointerId(finger.0 + 1), phase, local(position))
            }
            _ => (event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let placement = self.placement(Size::new(bounds.width, bounds.height));
        if let (Some(handle), Some(target)) = (&self.image, placement) {
            let rectangle = Rectangle {
                x: target.x,
                y: target.y,
                width: target.width,
                height: target.height,
            };
            frame.draw_image(rectangle, canvas::Image::new(handle.clone()));
        }
        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.image.is_some() && cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
