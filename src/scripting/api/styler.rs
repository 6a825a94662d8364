//! The styler object passed to a script's `on_style`
//!
//! Usage in Rhai:
//! ```rhai
//! fn on_style(styler) {
//!     styler.start_styling(styler.start_pos(), styler.length_doc(), styler.init_style());
//!     while styler.more() {
//!         if styler.state() == 0 && styler.matches("//") { styler.set_state(1); }
//!         if styler.at_line_end() { styler.forward_set_state(0); } else { styler.forward(); }
//!     }
//!     styler.end_styling();
//! }
//! ```

use std::sync::{Arc, RwLock};

use rhai::{Engine, EvalAltResult, INT};

use super::to_pos;
use crate::styling::{StyleSink, StylingCursor};

type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

const UNAVAILABLE: &str = "Styling context is unavailable";

/// Sink shared between the caller and a running script
pub type SharedSink = Arc<RwLock<dyn StyleSink>>;

pub type SharedCursor = StylingCursor<SharedSink>;

#[derive(Clone)]
pub struct StylerHandle {
    cursor: Arc<RwLock<SharedCursor>>,
}

impl StylerHandle {
    pub fn new(cursor: SharedCursor) -> Self {
        Self {
            cursor: Arc::new(RwLock::new(cursor)),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&SharedCursor) -> R) -> ScriptResult<R> {
        let Ok(cursor) = self.cursor.read() else {
            return Err(UNAVAILABLE.into());
        };
        Ok(f(&cursor))
    }

    fn write(&self, f: impl FnOnce(&mut SharedCursor)) -> ScriptResult<()> {
        let Ok(mut cursor) = self.cursor.write() else {
            return Err(UNAVAILABLE.into());
        };
        f(&mut cursor);
        Ok(())
    }
}

pub fn register(engine: &mut Engine) {
    engine.register_type_with_name::<StylerHandle>("StylingContext");

    engine.register_fn("start_styling", |h: &mut StylerHandle, pos: INT, length: INT, state: INT| {
        h.write(|c| c.start_styling(to_pos(pos), to_pos(length), state))
    });
    engine.register_fn("end_styling", |h: &mut StylerHandle| h.write(|c| c.end_styling()));
    engine.register_fn("more", |h: &mut StylerHandle| h.read(|c| c.more()));
    engine.register_fn("forward", |h: &mut StylerHandle| h.write(|c| c.forward()));
    engine.register_fn("position", |h: &mut StylerHandle| h.read(|c| c.position() as INT));
    engine.register_fn("at_line_start", |h: &mut StylerHandle| h.read(|c| c.at_line_start()));
    engine.register_fn("at_line_end", |h: &mut StylerHandle| h.read(|c| c.at_line_end()));

    engine.register_fn("state", |h: &mut StylerHandle| h.read(|c| c.state()));
    engine.register_fn("set_state", |h: &mut StylerHandle, state: INT| h.write(|c| c.set_state(state)));
    engine.register_fn("forward_set_state", |h: &mut StylerHandle, state: INT| {
        h.write(|c| c.forward_set_state(state))
    });
    engine.register_fn("change_state", |h: &mut StylerHandle, state: INT| h.write(|c| c.change_state(state)));

    engine.register_fn("current", |h: &mut StylerHandle| h.read(|c| c.current()));
    engine.register_fn("next", |h: &mut StylerHandle| h.read(|c| c.next()));
    engine.register_fn("previous", |h: &mut StylerHandle| h.read(|c| c.previous()));
    engine.register_fn("token", |h: &mut StylerHandle| h.read(|c| c.token()));
    engine.register_fn("matches", |h: &mut StylerHandle, pattern: &str| h.read(|c| c.matches(pattern)));

    engine.register_fn("line", |h: &mut StylerHandle, pos: INT| h.read(|c| c.line(to_pos(pos)) as INT));
    engine.register_fn("char_at", |h: &mut StylerHandle, pos: INT| h.read(|c| c.char_at(to_pos(pos)) as INT));
    engine.register_fn("style_at", |h: &mut StylerHandle, pos: INT| h.read(|c| c.style_at(to_pos(pos)) as INT));
    engine.register_fn("level_at", |h: &mut StylerHandle, line: INT| h.read(|c| c.level_at(to_pos(line))));
    engine.register_fn("set_level_at", |h: &mut StylerHandle, line: INT, level: INT| {
        h.write(|c| c.set_level_at(to_pos(line), level))
    });
    engine.register_fn("line_state", |h: &mut StylerHandle, line: INT| h.read(|c| c.line_state(to_pos(line))));
    engine.register_fn("set_line_state", |h: &mut StylerHandle, line: INT, state: INT| {
        h.write(|c| c.set_line_state(to_pos(line), state))
    });

    engine.register_fn("start_pos", |h: &mut StylerHandle| h.read(|c| c.start_pos() as INT));
    engine.register_fn("length_doc", |h: &mut StylerHandle| h.read(|c| c.length_doc() as INT));
    engine.register_fn("init_style", |h: &mut StylerHandle| h.read(|c| c.init_style()));
}
