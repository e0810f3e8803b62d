//! Edit session: whole-shape move and control-point resize of one existing
//! annotation.
//!
//! The session holds a deep snapshot taken when editing started, so cancel
//! can restore the exact original parameters. Gestures mutate the live
//! annotation in place; nothing is reported outward until the editor saves.

use crate::handles::{HandleRole, ResizeDrag, apply_resize, control_point_at};
use crate::input::ImageEvent;
use kurbo::Point;
use sm_core::{Annotation, AnnotationId, CoordinateMapper, EditorConfig, Shape, geometry};

/// Pointer gesture inside an edit session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    /// Body drag; `last` is the previous image point.
    Moving { last: Point },
    Resizing(ResizeDrag),
}

/// What lies under the pointer while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Handle(HandleRole),
    Body,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Ignored,
    /// A move or resize gesture began.
    Started,
    Changed,
    /// A resize step was refused (below minimum size); shape untouched.
    Rejected,
    /// The gesture ended; the session stays open.
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    snapshot: Annotation,
    gesture: Gesture,
}

impl EditSession {
    pub fn begin(annotation: &Annotation) -> Self {
        Self {
            snapshot: annotation.clone(),
            gesture: Gesture::Idle,
        }
    }

    pub fn target(&self) -> AnnotationId {
        self.snapshot.id
    }

    /// The annotation as it was when editing started.
    pub fn snapshot(&self) -> &Annotation {
        &self.snapshot
    }

    /// Adopt an externally updated version of the target as the new
    /// restore point, abandoning any gesture in flight.
    pub fn refresh_snapshot(&mut self, annotation: &Annotation) {
        self.snapshot = annotation.clone();
        self.gesture = Gesture::Idle;
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Feed one pointer event. `screen` is the same position in screen
    /// space, used for handle and body hit tests.
    pub fn handle(
        &mut self,
        event: ImageEvent,
        screen: Point,
        shape: &mut Shape,
        mapper: &impl CoordinateMapper,
        config: &EditorConfig,
    ) -> EditOutcome {
        match (event, self.gesture) {
            (ImageEvent::Press(p), _) => match self.hover(shape, mapper, screen, config) {
                HoverTarget::Handle(role) => {
                    log::debug!("resize {} via {role:?}", self.target());
                    self.gesture = Gesture::Resizing(ResizeDrag::begin(shape, role));
                    EditOutcome::Started
                }
                HoverTarget::Body => {
                    log::debug!("move {}", self.target());
                    self.gesture = Gesture::Moving { last: p };
                    EditOutcome::Started
                }
                HoverTarget::Outside => EditOutcome::Ignored,
            },

            (ImageEvent::Move(p), Gesture::Moving { last }) => {
                geometry::translate(shape, p - last);
                self.gesture = Gesture::Moving { last: p };
                EditOutcome::Changed
            }

            (ImageEvent::Move(p), Gesture::Resizing(drag)) => {
                if apply_resize(shape, &drag, p, config) {
                    EditOutcome::Changed
                } else {
                    log::trace!("resize of {} rejected at {p:?}", self.target());
                    EditOutcome::Rejected
                }
            }

            (ImageEvent::Release(_), Gesture::Moving { .. } | Gesture::Resizing(_)) => {
                self.gesture = Gesture::Idle;
                EditOutcome::Ended
            }

            _ => EditOutcome::Ignored,
        }
    }

    /// Handles take priority over the body.
    pub fn hover(&self, shape: &Shape, mapper: &impl CoordinateMapper, screen: Point, config: &EditorConfig) -> HoverTarget {
        if let Some(role) = control_point_at(shape, mapper, screen, config) {
            HoverTarget::Handle(role)
        } else if geometry::hit_test(shape, mapper, screen, config) {
            HoverTarget::Body
        } else {
            HoverTarget::Outside
        }
    }
}
