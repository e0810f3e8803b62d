//! Adapter over a JavaScript deep-zoom viewer.
//!
//! The host passes an object with these methods (any may be missing):
//!
//! ```js
//! {
//!   imageToScreen(x, y) { return [sx, sy]; },   // or {x, y}
//!   screenToImage(x, y) { return [ix, iy]; },
//!   setPanEnabled(enabled) {},
//!   zoomBy(factor, x, y) {},                     // anchor in screen px
//! }
//! ```
//!
//! A missing method or a throwing call degrades to the identity mapping (or
//! a no-op) and is logged.

use js_sys::{Function, Reflect};
use kurbo::Point;
use sm_core::CoordinateMapper;
use sm_editor::ImageViewer;
use wasm_bindgen::{JsCast, JsValue};

pub struct JsViewer {
    this: JsValue,
    image_to_screen: Option<Function>,
    screen_to_image: Option<Function>,
    set_pan_enabled: Option<Function>,
    zoom_by: Option<Function>,
}

impl JsViewer {
    pub fn new(adapter: JsValue) -> Self {
        let method = |name: &str| {
            let f = Reflect::get(&adapter, &JsValue::from_str(name))
                .ok()
                .and_then(|v| v.dyn_into::<Function>().ok());
            if f.is_none() {
                log::warn!("viewer adapter has no {name}()");
            }
            f
        };
        Self {
            image_to_screen: method("imageToScreen"),
            screen_to_image: method("screenToImage"),
            set_pan_enabled: method("setPanEnabled"),
            zoom_by: method("zoomBy"),
            this: adapter,
        }
    }

    fn map(&self, f: Option<&Function>, p: Point) -> Point {
        let Some(f) = f else { return p };
        match f.call2(&self.this, &p.x.into(), &p.y.into()) {
            Ok(v) => point_from_js(&v).unwrap_or(p),
            Err(e) => {
                log::warn!("viewer mapping threw: {e:?}");
                p
            }
        }
    }
}

/// Accepts `[x, y]` or `{x, y}`.
fn point_from_js(v: &JsValue) -> Option<Point> {
    let get = |key: JsValue| Reflect::get(v, &key).ok()?.as_f64();
    if js_sys::Array::is_array(v) {
        Some(Point::new(get(0u32.into())?, get(1u32.into())?))
    } else {
        Some(Point::new(get("x".into())?, get("y".into())?))
    }
}

impl CoordinateMapper for JsViewer {
    fn image_to_screen(&self, p: Point) -> Point {
        self.map(self.image_to_screen.as_ref(), p)
    }

    fn screen_to_image(&self, p: Point) -> Point {
        self.map(self.screen_to_image.as_ref(), p)
    }
}

impl ImageViewer for JsViewer {
    fn set_pan_enabled(&mut self, enabled: bool) {
        if let Some(f) = &self.set_pan_enabled
            && let Err(e) = f.call1(&self.this, &enabled.into())
        {
            log::warn!("setPanEnabled threw: {e:?}");
        }
    }

    fn zoom_by(&mut self, factor: f64, anchor: Point) {
        if let Some(f) = &self.zoom_by
            && let Err(e) = f.call3(&self.this, &factor.into(), &anchor.x.into(), &anchor.y.into())
        {
            log::warn!("zoomBy threw: {e:?}");
        }
    }
}
