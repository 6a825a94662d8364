//! Scripting module - Rhai runtime driving the editor panes
//!
//! Scripts reach the host through:
//! - `scite::*` - message dispatch by id, constants
//! - `editor` / `output` - pane objects with catalog methods and properties
//! - `props` - host properties
//! - `on_style(styler)` and other handler functions called back by the host

mod api;
mod engine;

pub use api::SharedSession;
pub use api::styler::SharedSink;
pub use engine::ScriptEngine;
