//! The annotation editor: owns the annotation list, routes input to the one
//! active session, and queues notifications for the host.
//!
//! At most one session is active at a time, held in a single
//! [`Session`] value: nothing, a drawing session, or an edit session.
//! Switching mode always drops back to idle first, so buffers are dropped
//! and the viewer's pan lock is restored.

use crate::edit::{EditOutcome, EditSession, HoverTarget};
use crate::handles::{Cardinal, Corner, HandleRole, control_points};
use crate::input::{ImageEvent, InputEvent};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{DrawOptions, DrawOutcome, DrawingSession};
use crate::viewer::ImageViewer;
use kurbo::Point;
use serde::Serialize;
use sm_core::{
    Annotation, AnnotationId, CoordinateMapper, EditorConfig, Error, ShapeKind, ShapeMetrics, geometry,
};
use sm_render::{Frame, RenderStyle, Surface, render_frame};

/// Pointer travel (screen px) below which a press/release pair is a click.
const CLICK_SLOP: f64 = 4.0;

// ─── Public types ────────────────────────────────────────────────────────

/// Observable editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Idle,
    Drawing(ShapeKind),
    Editing(AnnotationId),
}

/// Cursor the host should show over the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Pointer,
    Move,
    NsResize,
    EwResize,
    NwseResize,
    NeswResize,
}

impl Cursor {
    /// CSS `cursor` value.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Crosshair => "crosshair",
            Cursor::Pointer => "pointer",
            Cursor::Move => "move",
            Cursor::NsResize => "ns-resize",
            Cursor::EwResize => "ew-resize",
            Cursor::NwseResize => "nwse-resize",
            Cursor::NeswResize => "nesw-resize",
        }
    }

    fn for_handle(role: HandleRole) -> Self {
        match role {
            HandleRole::CircleEdge(Cardinal::Top | Cardinal::Bottom) => Cursor::NsResize,
            HandleRole::CircleEdge(Cardinal::Left | Cardinal::Right) => Cursor::EwResize,
            HandleRole::EllipseCorner | HandleRole::Corner(Corner::TopLeft | Corner::BottomRight) => Cursor::NwseResize,
            HandleRole::Corner(Corner::TopRight | Corner::BottomLeft) => Cursor::NeswResize,
            HandleRole::LineStart | HandleRole::LineEnd | HandleRole::Vertex(_) => Cursor::Crosshair,
        }
    }
}

/// Payload for the inspection popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupInfo {
    pub id: AnnotationId,
    pub kind: ShapeKind,
    pub metrics: ShapeMetrics,
    /// Screen space.
    pub anchor: Point,
}

/// Notifications for the host, drained with [`AnnotationEditor::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A mutation succeeded; carries the full list for the external store.
    Edited(Vec<Annotation>),
    Selected(Option<Annotation>),
    ShowPopup(PopupInfo),
}

/// How the host should treat an input event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResponse {
    /// Something visible changed.
    pub redraw: bool,
    /// The editor consumed the event; the viewer must not also act on it.
    pub captured: bool,
}

impl InputResponse {
    const IGNORED: Self = Self {
        redraw: false,
        captured: false,
    };

    fn captured(redraw: bool) -> Self {
        Self { redraw, captured: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Session {
    None,
    Drawing(DrawingSession),
    Editing(EditSession),
}

// ─── Editor ──────────────────────────────────────────────────────────────

pub struct AnnotationEditor<V: ImageViewer> {
    viewer: V,
    config: EditorConfig,
    style: RenderStyle,
    annotations: Vec<Annotation>,
    session: Session,
    selected: Option<AnnotationId>,
    color: String,
    allow_multiple: bool,
    cursor: Cursor,
    /// Screen position of an idle-mode press, for click detection.
    press: Option<Point>,
    /// Primary button is down on the surface.
    button_held: bool,
    events: Vec<EditorEvent>,
    dirty: bool,
}

impl<V: ImageViewer> AnnotationEditor<V> {
    pub fn new(viewer: V, config: EditorConfig) -> Self {
        Self {
            viewer,
            style: RenderStyle::from_config(&config),
            color: config.default_color.clone(),
            allow_multiple: config.allow_multiple,
            config,
            annotations: Vec::new(),
            session: Session::None,
            selected: None,
            cursor: Cursor::Default,
            press: None,
            button_held: false,
            events: Vec::new(),
            dirty: true,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// Mutable viewer access. Viewport changes made through it should be
    /// followed by [`on_viewport_changed`](Self::on_viewport_changed).
    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.annotation(id))
    }

    pub fn mode(&self) -> EditorMode {
        match &self.session {
            Session::None => EditorMode::Idle,
            Session::Drawing(s) => EditorMode::Drawing(s.kind()),
            Session::Editing(s) => EditorMode::Editing(s.target()),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn allow_multiple(&self) -> bool {
        self.allow_multiple
    }

    /// Image-space handles of the annotation being edited.
    pub fn control_points(&self) -> Vec<Point> {
        self.editing_target()
            .and_then(|id| self.annotation(id))
            .map(|a| control_points(&a.shape).iter().map(|cp| cp.position).collect())
            .unwrap_or_default()
    }

    fn editing_target(&self) -> Option<AnnotationId> {
        match &self.session {
            Session::Editing(s) => Some(s.target()),
            _ => None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drain queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Collection ──────────────────────────────────────────────────────

    /// Replace the whole list with a snapshot from the external store.
    /// Invalid entries are dropped with a warning. Does not raise `Edited`.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        let before = annotations.len();
        let mut seen = std::collections::HashSet::new();
        self.annotations = annotations
            .into_iter()
            .filter(|a| match a.validate() {
                Ok(()) if seen.insert(a.id) => true,
                Ok(()) => {
                    log::warn!("dropping duplicate annotation id {}", a.id);
                    false
                }
                Err(e) => {
                    log::warn!("dropping annotation {}: {e}", a.id);
                    false
                }
            })
            .collect();
        log::debug!("set {} annotation(s) ({} dropped)", self.annotations.len(), before - self.annotations.len());

        if let Some(target) = self.editing_target() {
            match self.annotation(target).cloned() {
                Some(current) => {
                    if let Session::Editing(s) = &mut self.session {
                        s.refresh_snapshot(&current);
                    }
                }
                None => self.enter_idle(),
            }
        }
        if self.selected.is_some_and(|id| self.annotation(id).is_none()) {
            self.set_selected(None);
        }
        self.dirty = true;
    }

    /// Decode and apply a JSON snapshot.
    pub fn set_annotations_json(&mut self, json: &str) -> Result<(), Error> {
        self.set_annotations(sm_core::annotations_from_json(json)?);
        Ok(())
    }

    pub fn annotations_json(&self) -> Result<String, Error> {
        sm_core::annotations_to_json(&self.annotations)
    }

    /// Append an externally created annotation on top of the z-order.
    pub fn add_annotation(&mut self, annotation: Annotation) -> Result<(), Error> {
        annotation.validate()?;
        if self.annotation(annotation.id).is_some() {
            return Err(Error::DuplicateId(annotation.id));
        }
        self.annotations.push(annotation);
        self.emit_edited();
        Ok(())
    }

    /// Replace the annotation with the same id. Unknown ids are a no-op.
    pub fn update_annotation(&mut self, annotation: Annotation) -> bool {
        if let Err(e) = annotation.validate() {
            log::warn!("ignoring update of {}: {e}", annotation.id);
            return false;
        }
        let Some(slot) = self.annotations.iter_mut().find(|a| a.id == annotation.id) else {
            return false;
        };
        *slot = annotation.clone();
        if let Session::Editing(s) = &mut self.session
            && s.target() == annotation.id
        {
            s.refresh_snapshot(&annotation);
        }
        self.emit_edited();
        true
    }

    /// Remove by id. Unknown ids are a no-op.
    pub fn delete_annotation(&mut self, id: AnnotationId) -> bool {
        let Some(index) = self.annotations.iter().position(|a| a.id == id) else {
            return false;
        };
        self.annotations.remove(index);
        if matches!(&self.session, Session::Editing(s) if s.target() == id) {
            self.enter_idle();
        }
        if self.selected == Some(id) {
            self.set_selected(None);
        }
        self.emit_edited();
        true
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Start drawing `kind`. Any other session is abandoned.
    pub fn set_draw_type(&mut self, kind: ShapeKind, options: DrawOptions) {
        self.enter_idle();
        if let Some(color) = options.color.clone() {
            self.color = color;
        }
        log::debug!("draw {kind}");
        self.set_selected(None);
        self.session = Session::Drawing(DrawingSession::new(kind, &options, &self.config));
        self.viewer.set_pan_enabled(false);
        self.cursor = Cursor::Crosshair;
        self.dirty = true;
    }

    /// Leave drawing mode, discarding in-flight geometry.
    pub fn cancel_draw(&mut self) -> bool {
        if !matches!(self.session, Session::Drawing(_)) {
            return false;
        }
        log::debug!("cancel draw");
        self.enter_idle();
        true
    }

    pub fn set_allow_multiple(&mut self, allow: bool) {
        self.allow_multiple = allow;
    }

    /// Color for shapes drawn from now on.
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        self.dirty = true;
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id` and ask the host to show its detail popup.
    pub fn select_and_show_details(&mut self, id: AnnotationId) -> bool {
        let Some(ann) = self.annotation(id).cloned() else {
            return false;
        };
        self.selected = Some(id);
        let popup = self.popup_for(&ann);
        self.events.push(EditorEvent::Selected(Some(ann)));
        self.events.push(EditorEvent::ShowPopup(popup));
        self.dirty = true;
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        self.set_selected(None);
        true
    }

    /// Change the selection, raising `Selected` only when it actually changes.
    fn set_selected(&mut self, ann: Option<&Annotation>) {
        let id = ann.map(|a| a.id);
        if self.selected == id {
            return;
        }
        self.selected = id;
        self.events.push(EditorEvent::Selected(ann.cloned()));
        self.dirty = true;
    }

    fn popup_for(&self, ann: &Annotation) -> PopupInfo {
        PopupInfo {
            id: ann.id,
            kind: ann.kind(),
            metrics: geometry::metrics(&ann.shape),
            anchor: geometry::popup_anchor(&ann.shape, &self.viewer, self.config.marker_radius),
        }
    }

    // ─── Move / resize ───────────────────────────────────────────────────

    /// Open an edit session on `id`. Read-only and unknown ids are refused.
    pub fn start_move(&mut self, id: AnnotationId) -> bool {
        let Some(ann) = self.annotation(id).cloned() else {
            return false;
        };
        if ann.read_only {
            log::warn!("refusing to edit read-only annotation {id}");
            return false;
        }
        self.enter_idle();
        log::debug!("edit {id}");
        self.set_selected(Some(&ann));
        self.session = Session::Editing(EditSession::begin(&ann));
        self.viewer.set_pan_enabled(false);
        self.cursor = Cursor::Default;
        self.dirty = true;
        true
    }

    /// Commit the edit session and notify the store.
    pub fn save_move(&mut self) -> bool {
        if !matches!(self.session, Session::Editing(_)) {
            return false;
        }
        log::debug!("save edit");
        self.enter_idle();
        self.emit_edited();
        true
    }

    /// Abandon the edit session, restoring the snapshot taken at start.
    pub fn cancel_move(&mut self) -> bool {
        let Session::Editing(session) = &self.session else {
            return false;
        };
        let snapshot = session.snapshot().clone();
        if let Some(slot) = self.annotations.iter_mut().find(|a| a.id == snapshot.id) {
            *slot = snapshot;
        }
        log::debug!("cancel edit");
        self.enter_idle();
        true
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch one input event to the active session.
    pub fn handle_input(&mut self, event: &InputEvent) -> InputResponse {
        match event {
            InputEvent::Wheel { x, y, delta_y } => self.handle_wheel(Point::new(*x, *y), *delta_y),
            InputEvent::Key { key, modifiers } => match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => self.handle_shortcut(action),
                None => InputResponse::IGNORED,
            },
            InputEvent::PointerDown { x, y, .. }
            | InputEvent::PointerMove { x, y, .. }
            | InputEvent::PointerUp { x, y, .. }
            | InputEvent::DoubleClick { x, y } => {
                let screen = Point::new(*x, *y);
                let image = self.viewer.screen_to_image(screen);
                match event {
                    InputEvent::PointerDown { .. } => self.button_held = true,
                    InputEvent::PointerUp { .. } => self.button_held = false,
                    _ => {}
                }
                let image_event = match event {
                    InputEvent::PointerDown { .. } => ImageEvent::Press(image),
                    InputEvent::PointerMove { .. } => ImageEvent::Move(image),
                    InputEvent::PointerUp { .. } => ImageEvent::Release(image),
                    _ => ImageEvent::DoubleClick(image),
                };
                match self.session {
                    Session::None => self.handle_idle(image_event, screen),
                    Session::Drawing(_) => self.handle_drawing(image_event),
                    Session::Editing(_) => self.handle_editing(image_event, screen),
                }
            }
        }
    }

    fn handle_wheel(&mut self, anchor: Point, delta_y: f64) -> InputResponse {
        if delta_y == 0.0 {
            return InputResponse::IGNORED;
        }
        if self.gesture_holds_button() {
            log::trace!("wheel swallowed during a held gesture");
            return InputResponse::captured(false);
        }
        let step = self.config.wheel_zoom_step;
        // Symmetric step: 1.1 in, 0.9 out.
        let factor = if delta_y > 0.0 { 2.0 - step } else { step };
        self.viewer.zoom_by(factor, anchor);
        self.dirty = true;
        InputResponse::captured(true)
    }

    /// A drawing press or an edit drag is in flight; the viewer must not
    /// pan or zoom under it.
    fn gesture_holds_button(&self) -> bool {
        match &self.session {
            Session::Drawing(_) => self.button_held,
            Session::Editing(s) => s.is_dragging(),
            Session::None => false,
        }
    }

    fn handle_shortcut(&mut self, action: ShortcutAction) -> InputResponse {
        let handled = match action {
            ShortcutAction::Cancel => match self.session {
                Session::Drawing(_) => self.cancel_draw(),
                Session::Editing(_) => self.cancel_move(),
                Session::None => false,
            },
            ShortcutAction::Confirm => match &mut self.session {
                Session::Drawing(session) => {
                    let outcome = session.finish();
                    self.apply_draw_outcome(outcome)
                }
                Session::Editing(_) => self.save_move(),
                Session::None => false,
            },
        };
        if handled {
            InputResponse::captured(true)
        } else {
            InputResponse::IGNORED
        }
    }

    fn handle_idle(&mut self, event: ImageEvent, screen: Point) -> InputResponse {
        match event {
            ImageEvent::Press(_) => {
                self.press = Some(screen);
                InputResponse::IGNORED
            }
            ImageEvent::Move(_) => {
                let hit = sm_render::hit_test(&self.annotations, &self.viewer, screen, &self.config);
                self.cursor = if hit.is_some() { Cursor::Pointer } else { Cursor::Default };
                InputResponse::IGNORED
            }
            ImageEvent::Release(_) => {
                let Some(pressed) = self.press.take() else {
                    return InputResponse::IGNORED;
                };
                if pressed.distance(screen) > CLICK_SLOP {
                    // A drag: the viewer panned.
                    return InputResponse::IGNORED;
                }
                match sm_render::hit_test(&self.annotations, &self.viewer, screen, &self.config) {
                    Some(id) => {
                        self.select_and_show_details(id);
                        InputResponse::captured(true)
                    }
                    None => InputResponse {
                        redraw: self.clear_selection(),
                        captured: false,
                    },
                }
            }
            ImageEvent::DoubleClick(_) => InputResponse::IGNORED,
        }
    }

    fn handle_drawing(&mut self, event: ImageEvent) -> InputResponse {
        let Session::Drawing(session) = &mut self.session else {
            return InputResponse::IGNORED;
        };
        let outcome = session.handle(event, &self.viewer, &self.config);
        let redraw = self.apply_draw_outcome(outcome);
        InputResponse::captured(redraw)
    }

    /// Returns whether anything visible changed.
    fn apply_draw_outcome(&mut self, outcome: DrawOutcome) -> bool {
        match outcome {
            DrawOutcome::Pending => false,
            DrawOutcome::Updated | DrawOutcome::Discard => {
                self.dirty = true;
                true
            }
            DrawOutcome::Commit(shape) => {
                let id = self.fresh_id();
                log::debug!("commit {} {id}", shape.kind());
                self.annotations.push(Annotation::new(id, self.color.clone(), shape));
                self.emit_edited();
                if !self.allow_multiple {
                    self.enter_idle();
                }
                true
            }
        }
    }

    fn handle_editing(&mut self, event: ImageEvent, screen: Point) -> InputResponse {
        let Session::Editing(session) = &mut self.session else {
            return InputResponse::IGNORED;
        };
        let target = session.target();
        let Some(ann) = self.annotations.iter_mut().find(|a| a.id == target) else {
            return InputResponse::IGNORED;
        };

        if let ImageEvent::Move(_) = event
            && !session.is_dragging()
        {
            self.cursor = match session.hover(&ann.shape, &self.viewer, screen, &self.config) {
                HoverTarget::Handle(role) => Cursor::for_handle(role),
                HoverTarget::Body => Cursor::Move,
                HoverTarget::Outside => Cursor::Default,
            };
            return InputResponse::captured(false);
        }

        let outcome = session.handle(event, screen, &mut ann.shape, &self.viewer, &self.config);
        let redraw = matches!(outcome, EditOutcome::Changed | EditOutcome::Started);
        if redraw {
            self.dirty = true;
        }
        InputResponse::captured(redraw)
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Mark the frame stale after the viewer panned, zoomed or resized.
    pub fn on_viewport_changed(&mut self) {
        self.dirty = true;
    }

    /// Draw a full frame unconditionally.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        let control_points = self.control_points();
        let preview = match &self.session {
            Session::Drawing(s) => s.preview(),
            _ => None,
        };
        let frame = Frame {
            annotations: &self.annotations,
            selected: self.selected,
            editing: self.editing_target(),
            control_points: &control_points,
            preview: preview.as_ref(),
            preview_color: self.style.color_of(&self.color),
        };
        render_frame(surface, &frame, &self.viewer, &self.style);
        self.dirty = false;
    }

    /// Draw only if something changed since the last frame. Call once per
    /// animation frame.
    pub fn render_if_needed<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if !self.dirty {
            return false;
        }
        self.render(surface);
        true
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Drop whatever session is active and restore idle state.
    fn enter_idle(&mut self) {
        self.session = Session::None;
        self.press = None;
        self.cursor = Cursor::Default;
        self.viewer.set_pan_enabled(true);
        self.dirty = true;
    }

    fn fresh_id(&self) -> AnnotationId {
        AnnotationId::next_local(|id| self.annotation(id).is_some())
    }

    fn emit_edited(&mut self) {
        self.events.push(EditorEvent::Edited(self.annotations.clone()));
        self.dirty = true;
    }
}
