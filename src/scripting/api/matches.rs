//! Match objects returned by `pane.search(...)`
//!
//! Usage in Rhai:
//! ```rhai
//! let m = editor.search("ab");
//! while m.next() != () {
//!     print(`${m.pos} ${m.len} ${m.text}`);
//! }
//! for m in editor.search("x") { m.replace("y"); }
//! ```

use std::sync::{Arc, RwLock};

use rhai::{Dynamic, Engine, EvalAltResult, INT};

use super::{SharedSession, with_session};
use crate::bridge::MatchIterator;
use crate::error::BridgeError;

type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// Script handle over one match iterator; clones share the iterator
#[derive(Clone)]
pub struct MatchHandle {
    inner: Arc<RwLock<MatchIterator>>,
    session: SharedSession,
}

impl MatchHandle {
    pub fn new(iterator: MatchIterator, session: SharedSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(iterator)),
            session,
        }
    }

    fn with_iterator<T>(
        &self,
        f: impl FnOnce(&mut MatchIterator, &mut crate::bridge::Session) -> Result<T, BridgeError>,
    ) -> ScriptResult<T> {
        let Ok(mut iterator) = self.inner.write() else {
            return Err(BridgeError::InvalidatedObject.into_script_error());
        };
        with_session(&self.session, |s| f(&mut iterator, s))
    }

    /// Text of the following match, `()` once exhausted
    fn next(&self) -> ScriptResult<Dynamic> {
        let found = self.with_iterator(|it, s| it.next(s))?;
        Ok(found.map(|m| Dynamic::from(m.text)).unwrap_or(Dynamic::UNIT))
    }

    fn text(&self) -> ScriptResult<String> {
        self.with_iterator(|it, s| it.text(s))
    }

    fn pos(&self) -> ScriptResult<INT> {
        self.with_iterator(|it, _| it.pos()).map(|p| p as INT)
    }

    fn len(&self) -> ScriptResult<INT> {
        self.with_iterator(|it, _| it.len()).map(|l| l as INT)
    }

    fn replace(&self, text: &str) -> ScriptResult<()> {
        self.with_iterator(|it, s| it.replace(s, text))
    }

    fn describe(&self) -> String {
        self.inner
            .read()
            .map(|it| it.to_string())
            .unwrap_or_else(|_| "match(invalidated)".to_string())
    }
}

/// Drives the iterator for `for m in ...`, yielding the handle itself once
/// per match. Using an exhausted iterator raises like `next()` does.
pub struct MatchIter {
    handle: MatchHandle,
}

impl Iterator for MatchIter {
    type Item = ScriptResult<MatchHandle>;

    fn next(&mut self) -> Option<ScriptResult<MatchHandle>> {
        match self.handle.with_iterator(|it, s| it.next(s)) {
            Ok(Some(_)) => Some(Ok(self.handle.clone())),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl IntoIterator for MatchHandle {
    type Item = ScriptResult<MatchHandle>;
    type IntoIter = MatchIter;

    fn into_iter(self) -> MatchIter {
        MatchIter { handle: self }
    }
}

pub fn register(engine: &mut Engine) {
    engine.register_type_with_name::<MatchHandle>("PaneMatch");
    engine.register_iterator_result::<MatchHandle, MatchHandle>();

    engine.register_fn("next", |m: &mut MatchHandle| m.next());
    engine.register_fn("replace", |m: &mut MatchHandle, text: &str| m.replace(text));
    engine.register_get("text", |m: &mut MatchHandle| m.text());
    engine.register_get("pos", |m: &mut MatchHandle| m.pos());
    engine.register_get("len", |m: &mut MatchHandle| m.len());
    engine.register_fn("to_string", |m: &mut MatchHandle| m.describe());
    engine.register_fn("to_debug", |m: &mut MatchHandle| m.describe());
}
