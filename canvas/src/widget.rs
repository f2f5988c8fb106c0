//! Browser entry point.
//!
//! The host page creates one [`DiagramWidget`] per diagram, forwards DOM
//! events to it, feeds it server frames with `receive`, and hands it a `send`
//! callback that takes encoded intent frames as a `Uint8Array`.

use diagram_frames::{Command, Intent, decode_frame, encode_frame};
use log::{debug, warn};
use uuid::Uuid;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::camera::Point;
use crate::config::DiagramConfig;
use crate::engine::{Action, Engine};
use crate::input::{Button, Key, WheelDelta};

#[wasm_bindgen]
pub struct DiagramWidget {
    engine: Engine,
    send: js_sys::Function,
    diagram_id: Option<String>,
}

#[wasm_bindgen]
impl DiagramWidget {
    /// # Errors
    ///
    /// Returns `Err` for an invalid config document or a canvas without a 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        send: js_sys::Function,
        config: Option<String>,
        diagram_id: Option<String>,
    ) -> Result<DiagramWidget, JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Debug).is_err() {
            debug!("console logger already installed");
        }
        let config = match config {
            Some(raw) => DiagramConfig::from_json(&raw).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => DiagramConfig::default(),
        };
        let engine = Engine::new(canvas, config)?;
        engine.render()?;
        Ok(Self { engine, send, diagram_id })
    }

    /// Apply one encoded server frame. Undecodable frames are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    pub fn receive(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let frame = match decode_frame(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("dropping undecodable frame: {e}");
                return Ok(());
            }
        };
        match Command::from_frame(&frame) {
            Ok(command) => {
                let actions = self.engine.apply(command);
                self.dispatch(actions)
            }
            Err(e) => {
                warn!("dropping frame {}: {e}", frame.id);
                Ok(())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `Err` if the image element cannot be created.
    #[wasm_bindgen(js_name = registerIcon)]
    pub fn register_icon(&mut self, reference: &str, url: &str) -> Result<(), JsValue> {
        self.engine.register_icon(reference, url)
    }

    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> Result<(), JsValue> {
        let Some(button) = Button::from_dom(button) else {
            return Ok(());
        };
        let actions = self.engine.on_pointer_down(Point::new(x, y), button);
        self.dispatch(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        let actions = self.engine.on_pointer_move(Point::new(x, y));
        self.dispatch(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64, button: i16) -> Result<(), JsValue> {
        let Some(button) = Button::from_dom(button) else {
            return Ok(());
        };
        let actions = self.engine.on_pointer_up(Point::new(x, y), button);
        self.dispatch(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    pub fn click(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        let actions = self.engine.on_click(Point::new(x, y));
        self.dispatch(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, key: String) -> Result<(), JsValue> {
        let actions = self.engine.on_key_up(&Key(key));
        self.dispatch(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    pub fn wheel(&mut self, dy: f64) -> Result<(), JsValue> {
        let actions = self.engine.on_wheel(WheelDelta { dy });
        self.dispatch(actions)
    }

    /// # Errors
    ///
    /// Returns `Err` if redrawing fails.
    pub fn resize(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Result<(), JsValue> {
        self.engine.set_viewport(width_css, height_css, dpr);
        self.engine.render()
    }
}

impl DiagramWidget {
    /// Send intents, update the cursor, and redraw at most once.
    fn dispatch(&mut self, actions: Vec<Action>) -> Result<(), JsValue> {
        let mut render = false;
        for action in actions {
            match action {
                Action::Intent(intent) => self.send_intent(&intent),
                Action::SetCursor(cursor) => self.engine.set_cursor(cursor)?,
                Action::RenderNeeded => render = true,
            }
        }
        if render {
            self.engine.render()?;
        }
        Ok(())
    }

    fn send_intent(&self, intent: &Intent) {
        // Millisecond timestamps fit comfortably in i64.
        #[allow(clippy::cast_possible_truncation)]
        let ts = js_sys::Date::now() as i64;
        let frame = intent.to_frame(Uuid::new_v4().to_string(), ts, self.diagram_id.as_deref());
        let bytes = encode_frame(&frame);
        let array = js_sys::Uint8Array::from(bytes.as_slice());
        if let Err(e) = self.send.call1(&JsValue::NULL, &array) {
            warn!("{} not delivered: {e:?}", intent.syscall());
        }
    }
}
