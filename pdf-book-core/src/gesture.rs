//! Pointer events to drag/pinch gestures.
//!
//! Mouse buttons and touch fingers both arrive as [`PointerEvent`]s keyed by a
//! [`PointerId`]. One pointer drags; a second pointer turns the sequence into a
//! pinch for as long as both stay down. Once a pinch ends, the remaining
//! pointers are ignored until every pointer has been released.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::Vector;

/// Finger distances below this are treated as this, so a pinch that starts
/// with both fingers on the same spot cannot divide by zero.
const MIN_PINCH_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub id: PointerId,
    pub phase: PointerPhase,
    /// Container-local position in screen pixels.
    pub position: Vector,
}

impl PointerEvent {
    pub fn new(id: PointerId, phase: PointerPhase, position: Vector) -> Self {
        Self {
            id,
            phase,
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    /// Cumulative movement since the drag pointer went down.
    Drag { movement: Vector },
    DragEnd,
    /// `origin` is the midpoint of both pointers, `ratio` their current
    /// distance over the distance when the pinch began.
    Pinch {
        origin: Vector,
        ratio: f32,
        first: bool,
    },
    PinchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    Drag { id: PointerId, start: Vector },
    Pinch {
        ids: [PointerId; 2],
        start_distance: f32,
    },
    /// A pinch ended with pointers still down.
    Draining,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    pointers: Vec<(PointerId, Vector)>,
    mode: Mode,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            pointers: Vec::with_capacity(2),
            mode: Mode::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.mode, Mode::Idle)
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.mode, Mode::Pinch { .. })
    }

    /// Forget every pointer, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.pointers.clear();
        self.mode = Mode::Idle;
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<Gesture> {
        let gesture = match event.phase {
            PointerPhase::Down => self.pointer_down(event.id, event.position),
            PointerPhase::Move => self.pointer_move(event.id, event.position),
            PointerPhase::Up | PointerPhase::Cancel => self.pointer_up(event.id),
        };
        if let Some(gesture) = &gesture {
            trace!(?gesture, "recognized gesture");
        }
        gesture
    }

    fn position(&self, id: PointerId) -> Option<Vector> {
        self.pointers
            .iter()
            .find(|(pointer, _)| *pointer == id)
            .map(|(_, position)| *position)
    }

    fn pointer_down(&mut self, id: PointerId, position: Vector) -> Option<Gesture> {
        if self.position(id).is_some() {
            return None;
        }
        self.pointers.push((id, position));

        match self.mode {
            Mode::Idle => {
                self.mode = Mode::Drag {
                    id,
                    start: position,
                };
                Some(Gesture::Drag {
                    movement: Vector::ZERO,
                })
            }
            Mode::Drag { id: first, .. } => {
                let first_position = self.position(first)?;
                self.mode = Mode::Pinch {
                    ids: [first, id],
                    start_distance: first_position.distance(position).max(MIN_PINCH_DISTANCE),
                };
                Some(Gesture::Pinch {
                    origin: first_position.midpoint(position),
                    ratio: 1.0,
                    first: true,
                })
            }
            Mode::Pinch { .. } | Mode::Draining => None,
        }
    }

    fn pointer_move(&mut self, id: PointerId, position: Vector) -> Option<Gesture> {
        let slot = self.pointers.iter_mut().find(|(pointer, _)| *pointer == id)?;
        slot.1 = position;

        match self.mode {
            Mode::Drag { id: dragging, start } if dragging == id => Some(Gesture::Drag {
                movement: position - start,
            }),
            Mode::Pinch {
                ids: [a, b],
                start_distance,
            } if id == a || id == b => {
                let (a, b) = (self.position(a)?, self.position(b)?);
                let distance = a.distance(b).max(MIN_PINCH_DISTANCE);
                Some(Gesture::Pinch {
                    origin: a.midpoint(b),
                    ratio: distance / start_distance,
                    first: false,
                })
            }
            _ => None,
        }
    }

    fn pointer_up(&mut self, id: PointerId) -> Option<Gesture> {
        let before = self.pointers.len();
        self.pointers.retain(|(pointer, _)| *pointer != id);
        if self.pointers.len() == before {
            return None;
        }

        let (next, gesture) = match self.mode {
            Mode::Drag { id: dragging, .. } if dragging == id => (Mode::Idle, Some(Gesture::DragEnd)),
            Mode::Pinch { ids: [a, b], .. } if id == a || id == b => {
                (Mode::Draining, Some(Gesture::PinchEnd))
            }
            mode => (mode, None),
        };
        self.mode = if self.pointers.is_empty() {
            Mode::Idle
        } else {
            next
        };
        gesture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MOUSE: PointerId = PointerId(0);
    const FINGER_A: PointerId = PointerId(1);
    const FINGER_B: PointerId = PointerId(2);

    fn down(id: PointerId, x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Down, Vector::new(x, y))
    }

    fn moved(id: PointerId, x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Move, Vector::new(x, y))
    }

    fn up(id: PointerId) -> PointerEvent {
        PointerEvent::new(id, PointerPhase::Up, Vector::ZERO)
    }

    #[test]
    fn single_pointer_drags() {
        let mut recognizer = GestureRecognizer::new();
        assert_eq!(
            recognizer.handle(down(MOUSE, 10.0, 10.0)),
            Some(Gesture::Drag {
                movement: Vector::ZERO
            })
        );
        assert_eq!(
            recognizer.handle(moved(MOUSE, 25.0, 5.0)),
            Some(Gesture::Drag {
                movement: Vector::new(15.0, -5.0)
            })
        );
        assert_eq!(recognizer.handle(up(MOUSE)), Some(Gesture::DragEnd));
        assert!(!recognizer.is_active());
    }

    #[test]
    fn hover_without_press_is_ignored() {
        let mut recognizer = GestureRecognizer::new();
        assert_eq!(recognizer.handle(moved(MOUSE, 1.0, 1.0)), None);
        assert_eq!(recognizer.handle(up(MOUSE)), None);
    }

    #[test]
    fn second_pointer_starts_pinch() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.handle(down(FINGER_A, 0.0, 0.0));
        assert_eq!(
            recognizer.handle(down(FINGER_B, 100.0, 0.0)),
            Some(Gesture::Pinch {
                origin: Vector::new(50.0, 0.0),
                ratio: 1.0,
                first: true
            })
        );
        assert!(recognizer.is_pinching());

        assert_eq!(
            recognizer.handle(moved(FINGER_B, 200.0, 0.0)),
            Some(Gesture::Pinch {
                origin: Vector::new(100.0, 0.0),
                ratio: 2.0,
                first: false
            })
        );
    }

    #[test]
    fn pinch_end_drains_remaining_pointer() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.handle(down(FINGER_A, 0.0, 0.0));
        recognizer.handle(down(FINGER_B, 100.0, 0.0));
        assert_eq!(recognizer.handle(up(FINGER_A)), Some(Gesture::PinchEnd));

        // The finger left behind does not resume dragging.
        assert_eq!(recognizer.handle(moved(FINGER_B, 150.0, 0.0)), None);
        assert!(recognizer.is_active());
        assert_eq!(recognizer.handle(up(FINGER_B)), None);
        assert!(!recognizer.is_active());

        assert_eq!(
            recognizer.handle(down(FINGER_A, 5.0, 5.0)),
            Some(Gesture::Drag {
                movement: Vector::ZERO
            })
        );
    }

    #[test]
    fn third_pointer_is_ignored() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.handle(down(FINGER_A, 0.0, 0.0));
        recognizer.handle(down(FINGER_B, 10.0, 0.0));
        assert_eq!(recognizer.handle(down(PointerId(3), 50.0, 50.0)), None);
        assert_eq!(recognizer.handle(moved(PointerId(3), 60.0, 50.0)), None);
        assert_eq!(recognizer.handle(up(PointerId(3))), None);
        assert!(recognizer.is_pinching());
    }

    #[test]
    fn coincident_fingers_do_not_divide_by_zero() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.handle(down(FINGER_A, 10.0, 10.0));
        recognizer.handle(down(FINGER_B, 10.0, 10.0));
        let Some(Gesture::Pinch { ratio, .. }) = recognizer.handle(moved(FINGER_B, 14.0, 10.0))
        else {
            panic!("expected a pinch update");
        };
        assert_eq!(ratio, 4.0);
    }
}
