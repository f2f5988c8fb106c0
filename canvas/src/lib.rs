//! Canvas scene graph, input dispatcher and renderer for the diagram editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It keeps the
//! client-side copy of a diagram (entities, compartments, ports and
//! connectors), applies server push commands to it, turns raw DOM input into
//! local gestures and server intents, and redraws the scene after every
//! event. The server stays the only writer of structural state: the client
//! requests changes and renders what the server confirms.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Sync handler and input dispatcher ([`engine::EngineCore`]), browser [`engine::Engine`] |
//! | [`scene`] | Scene graph: root nodes, connectors, camera, interaction slots |
//! | [`node`] | Node handles and capability traits |
//! | [`entity`] | Entities, compartments, ports and their layout |
//! | [`connector`] | Connectors and the drag overlay |
//! | [`controls`] | Fixed pan and zoom overlay controls |
//! | [`camera`] | Pan/scale state and coordinate conversions |
//! | [`input`] | Input event types and interaction state |
//! | [`hit`] | Geometric hit-test primitives |
//! | [`render`] | Frame plan and `Canvas2D` drawing |
//! | [`config`] | Layout configuration |
//! | [`consts`] | Fixed glyph constants |

pub mod camera;
pub mod config;
pub mod connector;
pub mod consts;
pub mod controls;
pub mod engine;
pub mod entity;
pub mod hit;
pub mod input;
pub mod node;
pub mod render;
pub mod scene;
#[cfg(target_arch = "wasm32")]
pub mod widget;
