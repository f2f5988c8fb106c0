use std::collections::HashMap;

use diagram_frames::{Command, Intent};
use diagram_frames::protocol::{CompartmentArgs, ConnectorArgs, DropArgs, EntityArgs, PortArgs};
use log::{debug, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::{PanDirection, Point, ViewStep};
use crate::config::DiagramConfig;
use crate::connector::Connector;
use crate::entity::{Compartment, Entity, EntityMetrics, Port};
use crate::input::{Button, Cursor, Key, WheelDelta};
use crate::node::{NodeRef, PortKind};
use crate::render;
use crate::scene::SceneGraph;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from command and input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Fire-and-forget message for the server.
    Intent(Intent),
    SetCursor(Cursor),
    RenderNeeded,
}

/// Engine state that does not depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub scene: SceneGraph,
    /// Icon reference to resource URL, registered by the host.
    pub icons: HashMap<String, String>,
    /// Entities created so far; drives the cascade placement.
    pub created: u32,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(DiagramConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            scene: SceneGraph::new(config),
            icons: HashMap::new(),
            created: 0,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DiagramConfig {
        &self.scene.config
    }

    pub fn register_icon(&mut self, reference: impl Into<String>, url: impl Into<String>) {
        self.icons.insert(reference.into(), url.into());
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    // --- Push commands ---

    /// Apply a server push. Stale or duplicate references are no-ops; every
    /// command ends with a redraw.
    pub fn apply(&mut self, command: Command) -> Vec<Action> {
        let mut actions = Vec::new();
        match command {
            Command::Init => debug!("diagram init"),
            Command::CreateEntity(args) => self.create_entity(args),
            Command::UpdateEntity(EntityArgs { id, name }) => match self.scene.entity_mut(&id) {
                Some(entity) => entity.name = name,
                None => trace!("update for unknown entity {id}"),
            },
            Command::DeleteEntity(r) => {
                if !self.scene.remove_entity(&r.id) {
                    trace!("delete for unknown entity {}", r.id);
                }
            }
            Command::CreateCompartment(args) => {
                if let Some(intent) = self.create_compartment(args) {
                    actions.push(Action::Intent(intent));
                }
            }
            Command::DeleteCompartment(r) => {
                if !self.scene.remove_compartment(&r.id) {
                    trace!("delete for unknown compartment {}", r.id);
                }
            }
            Command::CreateRequire(args) => self.create_port(args, PortKind::Require),
            Command::CreateProvide(args) => self.create_port(args, PortKind::Provide),
            Command::DeleteRequire(r) => self.delete_port(&r.id, PortKind::Require),
            Command::DeleteProvide(r) => self.delete_port(&r.id, PortKind::Provide),
            Command::CreateConnector(args) => self.create_connector(args),
            Command::DeleteConnector(r) => {
                if !self.scene.remove_connector(&r.id) {
                    trace!("delete for unknown connector {}", r.id);
                }
            }
            Command::Reset => {
                debug!("diagram reset");
                self.scene.reset();
            }
            Command::ZoomIn => self.view(ViewStep::ZoomIn),
            Command::ZoomOut => self.view(ViewStep::ZoomOut),
            Command::Left => self.view(ViewStep::Pan(PanDirection::Left)),
            Command::Right => self.view(ViewStep::Pan(PanDirection::Right)),
            Command::Up => self.view(ViewStep::Pan(PanDirection::Up)),
            Command::Down => self.view(ViewStep::Pan(PanDirection::Down)),
            Command::HandleDrop(args) => actions.push(Action::Intent(self.handle_drop(args))),
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn create_entity(&mut self, EntityArgs { id, name }: EntityArgs) {
        if self.scene.contains_id(&id) {
            trace!("entity {id} already present");
            return;
        }
        self.created += 1;
        let (x, y) = self.scene.config.cascade_position(self.created);
        debug!("create entity {id} at ({x}, {y})");
        let metrics = EntityMetrics::from(&self.scene.config);
        self.scene.add_entity(Entity::new(id, name, Point::new(x, y), metrics));
    }

    /// Returns the icon resolution log line, if the compartment names an icon.
    fn create_compartment(&mut self, args: CompartmentArgs) -> Option<Intent> {
        let CompartmentArgs { entity_id, id, name, icon } = args;
        if self.scene.contains_id(&id) {
            trace!("compartment {id} already present");
            return None;
        }
        let resolved = icon.as_ref().and_then(|r| self.icons.get(r)).cloned();
        let Some(entity) = self.scene.entity_mut(&entity_id) else {
            trace!("compartment {id} for unknown entity {entity_id}");
            return None;
        };
        debug!("create compartment {id} in {entity_id}");
        let log_line = icon
            .as_ref()
            .map(|r| Intent::log(format!("{r} -> {}", resolved.as_deref().unwrap_or("none"))));
        let mut compartment = Compartment::new(id, entity_id, name);
        compartment.icon = icon;
        compartment.icon_url = resolved;
        entity.add_compartment(compartment);
        log_line
    }

    fn create_port(&mut self, PortArgs { compartment_id, id, name }: PortArgs, kind: PortKind) {
        if self.scene.contains_id(&id) {
            trace!("port {id} already present");
            return;
        }
        match self.scene.compartment_mut(&compartment_id) {
            Some(compartment) => {
                debug!("create {kind:?} port {id} in {compartment_id}");
                compartment.add_port(Port::new(id, compartment_id, name, kind));
            }
            None => trace!("port {id} for unknown compartment {compartment_id}"),
        }
    }

    fn delete_port(&mut self, id: &str, kind: PortKind) {
        if !self.scene.remove_port(id, kind) {
            trace!("delete for unknown {kind:?} port {id}");
        }
    }

    fn create_connector(&mut self, ConnectorArgs { id, source_id, target_id }: ConnectorArgs) {
        if self.scene.contains_id(&id) {
            trace!("connector {id} already present");
            return;
        }
        if self.scene.port(&source_id).is_none() || self.scene.port(&target_id).is_none() {
            trace!("connector {id} references unknown port");
            return;
        }
        debug!("create connector {id}: {source_id} -> {target_id}");
        if !self.scene.add_connector(Connector::new(id, source_id, target_id)) {
            trace!("connector duplicates an existing port pair");
        }
    }

    fn view(&mut self, step: ViewStep) {
        debug!("view {step:?}");
        let pan_step = self.scene.config.pan_step;
        self.scene.camera.apply(step, pan_step);
    }

    fn handle_drop(&self, DropArgs { x, y, payload }: DropArgs) -> Intent {
        let point = self.scene.camera.scale_point(x, y);
        let target = self.scene.hit_test_all(&point);
        Intent::drop_target(target.as_ref().map(NodeRef::id), payload)
    }

    // --- Input events ---

    /// Hit root nodes; start a connector drag or a move.
    pub fn on_pointer_down(&mut self, screen: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let scene = &mut self.scene;
        scene.ui.gesture += 1;
        let point = scene.camera.scale_point(screen.x, screen.y);
        scene.ui.mouse = Some(point.point());
        let Some(node) = scene.hit_test_roots(&point) else {
            return vec![Action::RenderNeeded];
        };
        scene.press(&node);
        let started = match scene.movable_mut(&node) {
            Some(movable) => {
                movable.begin_move(point.point());
                true
            }
            None => false,
        };
        if started {
            scene.ui.dragging = Some(node);
        }
        vec![Action::RenderNeeded]
    }

    /// Move the dragged node, or refresh the hovered node.
    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        let scene = &mut self.scene;
        let point = scene.camera.scale_point(screen.x, screen.y);
        scene.ui.mouse = Some(point.point());
        if let Some(node) = scene.ui.dragging.clone() {
            if let Some(movable) = scene.movable_mut(&node) {
                movable.move_to(point.point());
                return vec![Action::SetCursor(Cursor::Move), Action::RenderNeeded];
            }
        }
        scene.ui.hovered = scene.hit_test_all(&point);
        let cursor = if scene.ui.hovered.is_some() { Cursor::Pointer } else { Cursor::Default };
        vec![Action::SetCursor(cursor), Action::RenderNeeded]
    }

    /// Finish the gesture: complete a connector drag, drop any move, notify
    /// global pointer-up listeners.
    pub fn on_pointer_up(&mut self, screen: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let scene = &mut self.scene;
        let point = scene.camera.scale_point(screen.x, screen.y);
        let mut actions = Vec::new();
        if let Some(intent) = scene.hit_test_roots(&point).and_then(|node| scene.release(&node)) {
            actions.push(Action::Intent(intent));
        }
        scene.ui.dragging = None;
        scene.notify_global_mouse_up();
        actions.push(Action::SetCursor(Cursor::Pointer));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Replace the selection and report it; clicks on a control change the view.
    pub fn on_click(&mut self, screen: Point) -> Vec<Action> {
        let point = self.scene.camera.scale_point(screen.x, screen.y);
        let hit = self.scene.hit_test_all(&point);
        let mut actions = vec![Action::Intent(Intent::selected(hit.as_ref().map(NodeRef::id)))];
        let step = hit.as_ref().and_then(|node| self.scene.clickable(node)).and_then(|c| c.click(&point));
        self.scene.ui.selected = hit;
        if let Some(step) = step {
            self.view(step);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Forward a delete key to the selected node.
    #[must_use]
    pub fn on_key_up(&self, key: &Key) -> Vec<Action> {
        let intent = self
            .scene
            .ui
            .selected
            .as_ref()
            .and_then(|node| self.scene.key_reactive(node))
            .and_then(|node| node.key_up(key));
        intent.map(Action::Intent).into_iter().collect()
    }

    /// One zoom step per wheel tick: away from the user zooms out.
    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if delta.dy < 0.0 {
            self.view(ViewStep::ZoomOut);
        } else if delta.dy > 0.0 {
            self.view(ViewStep::ZoomIn);
        } else {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Loaded icon images keyed by resource URL.
    images: HashMap<String, HtmlImageElement>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, config: DiagramConfig) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx, images: HashMap::new(), core: EngineCore::new(config) })
    }

    /// Register an icon resource and start loading its image.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the image element cannot be created.
    pub fn register_icon(&mut self, reference: &str, url: &str) -> Result<(), JsValue> {
        if !self.images.contains_key(url) {
            let image = HtmlImageElement::new()?;
            image.set_src(url);
            self.images.insert(url.to_owned(), image);
        }
        self.core.register_icon(reference, url);
        Ok(())
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        // Canvas sizes are small positive pixel counts.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (width, height) = ((width_css * dpr).round().max(0.0) as u32, (height_css * dpr).round().max(0.0) as u32);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    /// # Errors
    ///
    /// Returns `Err` if the style property cannot be set.
    pub fn set_cursor(&self, cursor: Cursor) -> Result<(), JsValue> {
        self.canvas.style().set_property("cursor", cursor.as_css())
    }

    // --- Delegated input ---

    pub fn apply(&mut self, command: Command) -> Vec<Action> {
        self.core.apply(command)
    }

    pub fn on_pointer_down(&mut self, screen: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_down(screen, button)
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen)
    }

    pub fn on_pointer_up(&mut self, screen: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_up(screen, button)
    }

    pub fn on_click(&mut self, screen: Point) -> Vec<Action> {
        self.core.on_click(screen)
    }

    #[must_use]
    pub fn on_key_up(&self, key: &Key) -> Vec<Action> {
        self.core.on_key_up(key)
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        self.core.on_wheel(delta)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        render::draw(&self.ctx, &self.core.scene, &self.images, self.core.dpr)
    }
}
