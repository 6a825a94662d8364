//! Script-facing types and the `scite` namespace
//!
//! - `scite::*` - message dispatch by id, constants
//! - `editor` / `output` - pane objects
//! - `props` - host properties
//! - match and styler objects handed out by panes and `on_style`

pub mod matches;
pub mod pane;
pub mod props;
pub mod scite;
pub mod styler;

use std::sync::{Arc, RwLock};

use rhai::EvalAltResult;

use crate::bridge::Session;
use crate::error::{BridgeError, BridgeResult};

/// The session every script object shares
pub type SharedSession = Arc<RwLock<Session>>;

/// Run `f` against the locked session, converting bridge errors into
/// script errors
pub fn with_session<T>(
    session: &SharedSession,
    f: impl FnOnce(&mut Session) -> BridgeResult<T>,
) -> Result<T, Box<EvalAltResult>> {
    let Ok(mut session) = session.write() else {
        return Err("Scripting session is unavailable".into());
    };
    f(&mut session).map_err(BridgeError::into_script_error)
}

/// Script integers to positions; negatives clamp to 0
pub fn to_pos(n: rhai::INT) -> usize {
    n.max(0) as usize
}
