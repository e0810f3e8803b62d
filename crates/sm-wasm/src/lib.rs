//! WASM bridge for Slidemark. Exposes the annotation editor to a browser
//! page hosting a deep-zoom viewer.
//!
//! Compiled via `wasm-pack build --target web`. The page stacks a `<canvas>`
//! over the viewer, forwards its pointer, wheel and key events here, and
//! calls `render_if_needed` once per animation frame.

mod render2d;
mod viewer;

use serde::Deserialize;
use sm_core::{Annotation, AnnotationId, EditorConfig, Error, ShapeKind};
use sm_editor::{AnnotationEditor, DrawOptions, EditorEvent, EditorMode, InputEvent, InputResponse, Modifiers};
use viewer::JsViewer;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// The main WASM-facing annotation controller.
///
/// Holds the editor and the host callbacks. All interaction from the page
/// goes through this struct.
#[wasm_bindgen]
pub struct MarkCanvas {
    editor: AnnotationEditor<JsViewer>,
    /// Overlay element, for client-to-local translation and the cursor.
    surface: Option<HtmlCanvasElement>,
    width: f64,
    height: f64,
    on_edit: Option<js_sys::Function>,
    on_selected: Option<js_sys::Function>,
    on_show_popup: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl MarkCanvas {
    /// Create a controller over a viewer adapter object (see `viewer.rs`).
    /// `config_json` may be empty or a partial `EditorConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(viewer: JsValue, width: f64, height: f64, config_json: &str) -> Result<MarkCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        Ok(Self {
            editor: AnnotationEditor::new(JsViewer::new(viewer), config),
            surface: None,
            width,
            height,
            on_edit: None,
            on_selected: None,
            on_show_popup: None,
        })
    }

    /// Attach the overlay canvas. Pointer handlers then take client
    /// coordinates and the editor drives the element's CSS cursor.
    pub fn set_surface(&mut self, canvas: HtmlCanvasElement) {
        self.width = f64::from(canvas.width());
        self.height = f64::from(canvas.height());
        self.surface = Some(canvas);
        self.editor.on_viewport_changed();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.editor.on_viewport_changed();
    }

    // ─── Callbacks ───────────────────────────────────────────────────────

    /// `f(annotationsJson)` after every successful mutation.
    pub fn set_on_edit(&mut self, f: js_sys::Function) {
        self.on_edit = Some(f);
    }

    /// `f(annotationJson | "null")` when the selection changes.
    pub fn set_on_selected(&mut self, f: js_sys::Function) {
        self.on_selected = Some(f);
    }

    /// `f(popupJson)` when a selected annotation needs its detail popup.
    pub fn set_on_show_popup(&mut self, f: js_sys::Function) {
        self.on_show_popup = Some(f);
    }

    // ─── Collection ──────────────────────────────────────────────────────

    /// Replace all annotations. Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn set_annotations(&mut self, json: &str) -> String {
        let result = self.editor.set_annotations_json(json);
        self.flush_events();
        status_json(result)
    }

    pub fn get_annotations(&self) -> String {
        self.editor.annotations_json().unwrap_or_else(|e| {
            log::error!("annotation export failed: {e}");
            "[]".to_string()
        })
    }

    /// Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn add_annotation(&mut self, json: &str) -> String {
        let result = parse_annotation(json).and_then(|a| self.editor.add_annotation(a));
        self.flush_events();
        status_json(result)
    }

    /// Returns `false` for malformed JSON or an unknown id.
    pub fn update_annotation(&mut self, json: &str) -> bool {
        let updated = match parse_annotation(json) {
            Ok(a) => self.editor.update_annotation(a),
            Err(e) => {
                log::warn!("update_annotation: {e}");
                false
            }
        };
        self.flush_events();
        updated
    }

    pub fn delete_annotation(&mut self, id: &str) -> bool {
        let deleted = self.editor.delete_annotation(AnnotationId::intern(id));
        self.flush_events();
        deleted
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Enter drawing mode. `kind` is a shape type name (`"rect"`, ...);
    /// `options_json` may be empty or `{"squareSize":..,"color":..}`.
    /// Returns `false` for an unknown kind or malformed options.
    pub fn set_draw_type(&mut self, kind: &str, options_json: &str) -> bool {
        let Some(kind) = ShapeKind::from_name(kind) else {
            log::warn!("unknown draw type {kind:?}");
            return false;
        };
        match parse_draw_options(options_json) {
            Ok(options) => {
                self.editor.set_draw_type(kind, options);
                self.flush_events();
                self.sync_cursor();
                true
            }
            Err(e) => {
                log::warn!("set_draw_type options: {e}");
                false
            }
        }
    }

    pub fn cancel_draw(&mut self) -> bool {
        let cancelled = self.editor.cancel_draw();
        self.sync_cursor();
        cancelled
    }

    pub fn set_allow_multiple(&mut self, allow: bool) {
        self.editor.set_allow_multiple(allow);
    }

    pub fn set_color(&mut self, color: &str) {
        self.editor.set_color(color);
    }

    // ─── Selection & editing ─────────────────────────────────────────────

    pub fn select_and_show_details(&mut self, id: &str) -> bool {
        let found = self.editor.select_and_show_details(AnnotationId::intern(id));
        self.flush_events();
        found
    }

    pub fn clear_selection(&mut self) -> bool {
        let cleared = self.editor.clear_selection();
        self.flush_events();
        cleared
    }

    pub fn start_move(&mut self, id: &str) -> bool {
        let started = self.editor.start_move(AnnotationId::intern(id));
        self.flush_events();
        self.sync_cursor();
        started
    }

    pub fn save_move(&mut self) -> bool {
        let saved = self.editor.save_move();
        self.flush_events();
        self.sync_cursor();
        saved
    }

    pub fn cancel_move(&mut self) -> bool {
        let cancelled = self.editor.cancel_move();
        self.sync_cursor();
        cancelled
    }

    // ─── Input ───────────────────────────────────────────────────────────
    //
    // Each handler returns `{"redraw":bool,"captured":bool}`. When
    // `captured` is true the page must stop the event from reaching the
    // viewer.

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let (x, y) = self.to_local(x, y);
        let modifiers = Modifiers { shift, ctrl, alt, meta };
        self.dispatch(InputEvent::PointerDown { x, y, modifiers })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let (x, y) = self.to_local(x, y);
        let modifiers = Modifiers { shift, ctrl, alt, meta };
        self.dispatch(InputEvent::PointerMove { x, y, modifiers })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let (x, y) = self.to_local(x, y);
        let modifiers = Modifiers { shift, ctrl, alt, meta };
        self.dispatch(InputEvent::PointerUp { x, y, modifiers })
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> String {
        let (x, y) = self.to_local(x, y);
        self.dispatch(InputEvent::DoubleClick { x, y })
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> String {
        let (x, y) = self.to_local(x, y);
        self.dispatch(InputEvent::Wheel { x, y, delta_y })
    }

    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let modifiers = Modifiers { shift, ctrl, alt, meta };
        self.dispatch(InputEvent::Key {
            key: key.to_string(),
            modifiers,
        })
    }

    // ─── State queries ───────────────────────────────────────────────────

    /// CSS cursor value for the overlay.
    pub fn get_cursor(&self) -> String {
        self.editor.cursor().as_css().to_string()
    }

    /// `{"mode":"idle"}`, `{"mode":"drawing","kind":..}` or `{"mode":"editing","id":..}`.
    pub fn get_mode(&self) -> String {
        mode_json(self.editor.mode())
    }

    pub fn get_selected_id(&self) -> Option<String> {
        self.editor.selected().map(|a| a.id.as_str().to_string())
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Call from the viewer's pan/zoom/resize notifications.
    pub fn on_viewport_changed(&mut self) {
        self.editor.on_viewport_changed();
    }

    /// Render a full frame to a Canvas2D context.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d) {
        let mut surface = render2d::CanvasSurface::new(ctx, self.width, self.height);
        self.editor.render(&mut surface);
    }

    /// Render only if something changed. Returns whether a frame was drawn.
    pub fn render_if_needed(&mut self, ctx: &CanvasRenderingContext2d) -> bool {
        let mut surface = render2d::CanvasSurface::new(ctx, self.width, self.height);
        self.editor.render_if_needed(&mut surface)
    }
}

// ─── Internals ───────────────────────────────────────────────────────────

impl MarkCanvas {
    fn dispatch(&mut self, event: InputEvent) -> String {
        let response = self.editor.handle_input(&event);
        self.flush_events();
        self.sync_cursor();
        response_json(response)
    }

    /// Client coordinates to overlay-local pixels. Without an attached
    /// surface the input is assumed to be local already.
    fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        match &self.surface {
            Some(canvas) => {
                let rect = canvas.get_bounding_client_rect();
                (x - rect.left(), y - rect.top())
            }
            None => (x, y),
        }
    }

    fn sync_cursor(&self) {
        if let Some(canvas) = &self.surface
            && let Err(e) = canvas.style().set_property("cursor", self.editor.cursor().as_css())
        {
            log::warn!("could not set cursor: {e:?}");
        }
    }

    /// Deliver queued editor events to the registered callbacks.
    fn flush_events(&mut self) {
        for event in self.editor.take_events() {
            let callback = match event {
                EditorEvent::Edited(_) => &self.on_edit,
                EditorEvent::Selected(_) => &self.on_selected,
                EditorEvent::ShowPopup(_) => &self.on_show_popup,
            };
            let Some(callback) = callback else { continue };
            let payload = match event_payload(&event) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("could not encode editor event: {e}");
                    continue;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
                log::warn!("editor callback threw: {e:?}");
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DrawOptionsWire {
    square_size: Option<f64>,
    color: Option<String>,
}

fn parse_draw_options(json: &str) -> Result<DrawOptions, Error> {
    if json.trim().is_empty() {
        return Ok(DrawOptions::default());
    }
    let wire: DrawOptionsWire = serde_json::from_str(json)?;
    Ok(DrawOptions {
        square_size: wire.square_size,
        color: wire.color,
    })
}

fn parse_annotation(json: &str) -> Result<Annotation, Error> {
    Ok(serde_json::from_str(json)?)
}

fn event_payload(event: &EditorEvent) -> Result<String, Error> {
    Ok(match event {
        EditorEvent::Edited(list) => sm_core::annotations_to_json(list)?,
        EditorEvent::Selected(ann) => serde_json::to_string(ann)?,
        EditorEvent::ShowPopup(popup) => serde_json::to_string(popup)?,
    })
}

fn status_json(result: Result<(), Error>) -> String {
    match result {
        Ok(()) => r#"{"ok":true}"#.to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

fn response_json(response: InputResponse) -> String {
    format!(r#"{{"redraw":{},"captured":{}}}"#, response.redraw, response.captured)
}

fn mode_json(mode: EditorMode) -> String {
    match mode {
        EditorMode::Idle => serde_json::json!({ "mode": "idle" }),
        EditorMode::Drawing(kind) => serde_json::json!({ "mode": "drawing", "kind": kind.as_str() }),
        EditorMode::Editing(id) => serde_json::json!({ "mode": "editing", "id": id.as_str() }),
    }
    .to_string()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Slidemark WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Validate an annotation snapshot. Returns `{"count":n,"ok":true}` or
/// `{"ok":false,"error":"..."}`. Reports the first invalid entry.
#[wasm_bindgen]
pub fn validate_annotations(json: &str) -> String {
    let checked = sm_core::annotations_from_json(json)
        .and_then(|list| list.iter().try_for_each(Annotation::validate).map(|()| list.len()));
    match checked {
        Ok(count) => serde_json::json!({ "ok": true, "count": count }).to_string(),
        Err(e) => status_json(Err(e)),
    }
}

/// Measurements for one annotation, as shown in the detail popup.
/// Returns the metrics JSON or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn annotation_metrics(json: &str) -> String {
    let measured = parse_annotation(json).and_then(|a| {
        a.validate()?;
        Ok(serde_json::to_string(&sm_core::metrics(&a.shape))?)
    });
    measured.unwrap_or_else(|e| status_json(Err(e)))
}
