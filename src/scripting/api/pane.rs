//! `editor` / `output` pane objects and indexed-property proxies
//!
//! Usage in Rhai:
//! ```rhai
//! let n = editor.line_count;          // property read
//! editor.current_pos = 10;            // property write
//! editor.goto_pos(0);                 // catalog function
//! let fore = editor.style_fore;       // indexed property proxy
//! fore[5] = 0xff0000;
//! for m in editor.search("TODO") { m.replace("DONE"); }
//! ```

use std::sync::Arc;

use rhai::{Array, Dynamic, Engine, EvalAltResult, INT, ImmutableString};

use super::matches::MatchHandle;
use super::{SharedSession, with_session};
use crate::bridge::{PropertyProxy, Resolved, SurfaceBinding, script_name};
use crate::host::Pane;
use crate::iface::Catalog;

type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// A pane as seen by scripts
#[derive(Clone)]
pub struct PaneHandle {
    binding: SurfaceBinding,
    session: SharedSession,
}

impl PaneHandle {
    pub fn new(pane: Pane, session: SharedSession) -> Self {
        Self {
            binding: SurfaceBinding::new(pane),
            session,
        }
    }

    fn resolve(&self, member: &str, args: &[Dynamic]) -> ScriptResult<Dynamic> {
        let resolved = with_session(&self.session, |s| self.binding.resolve(s, member, args))?;
        Ok(match resolved {
            Resolved::Value(value) => value,
            Resolved::Proxy(proxy) => Dynamic::from(ProxyHandle {
                proxy,
                session: Arc::clone(&self.session),
            }),
        })
    }

    fn assign(&self, member: &str, value: Dynamic) -> ScriptResult<()> {
        // `pane.prop[k] = v` writes the proxy back through the pane; the
        // proxy already did the work
        if value.is::<ProxyHandle>() {
            return Ok(());
        }
        self.resolve(&format!("{}=", member), &[value]).map(|_| ())
    }

    fn find_text(&self, text: &str, flags: INT, start: INT, end: Option<INT>) -> ScriptResult<Dynamic> {
        let found = with_session(&self.session, |s| {
            self.binding
                .find_text(s, text, flags, start as isize, end.map(|e| e as isize))
        })?;
        Ok(match found {
            Some((start, end)) => {
                let bounds: Array = vec![Dynamic::from(start as INT), Dynamic::from(end as INT)];
                Dynamic::from_array(bounds)
            }
            None => Dynamic::UNIT,
        })
    }

    fn search(&self, text: &str, flags: INT, start: INT) -> ScriptResult<MatchHandle> {
        let iterator = with_session(&self.session, |s| {
            self.binding.match_text(s, text, flags, start as isize)
        })?;
        Ok(MatchHandle::new(iterator, Arc::clone(&self.session)))
    }
}

/// An indexed property bound to a pane
#[derive(Clone)]
pub struct ProxyHandle {
    proxy: PropertyProxy,
    session: SharedSession,
}

impl ProxyHandle {
    fn get(&self, key: Dynamic) -> ScriptResult<Dynamic> {
        with_session(&self.session, |s| self.proxy.get(s, &[key]))
    }

    fn set(&self, key: Dynamic, value: Dynamic) -> ScriptResult<()> {
        with_session(&self.session, |s| self.proxy.set(s, key, value)).map(|_| ())
    }
}

/// Register pane and proxy types. Every scriptable catalog function becomes
/// a pane method under its snake_case name.
pub fn register(engine: &mut Engine, catalog: &Catalog) {
    engine.register_type_with_name::<PaneHandle>("Pane");
    engine.register_type_with_name::<ProxyHandle>("PropertyProxy");

    // Member reads and writes; `pane.name` falls back to these
    engine.register_indexer_get(|pane: &mut PaneHandle, name: ImmutableString| pane.resolve(&name, &[]));
    engine.register_indexer_set(|pane: &mut PaneHandle, name: ImmutableString, value: Dynamic| {
        pane.assign(&name, value)
    });

    for func in catalog.functions().iter().filter(|f| f.is_scriptable()) {
        let name = script_name(&func.name);
        {
            let member = name.clone();
            engine.register_fn(name.as_str(), move |pane: PaneHandle| pane.resolve(&member, &[]));
        }
        {
            let member = name.clone();
            engine.register_fn(name.as_str(), move |pane: PaneHandle, a: Dynamic| pane.resolve(&member, &[a]));
        }
        {
            let member = name.clone();
            engine.register_fn(name.as_str(), move |pane: PaneHandle, a: Dynamic, b: Dynamic| {
                pane.resolve(&member, &[a, b])
            });
        }
        {
            let member = name.clone();
            engine.register_fn(name.as_str(), move |pane: PaneHandle, a: Dynamic, b: Dynamic, c: Dynamic| {
                pane.resolve(&member, &[a, b, c])
            });
        }
    }

    // Generic dispatch: pane.invoke("get_line", [0])
    engine.register_fn("invoke", |pane: PaneHandle, name: &str, args: Array| pane.resolve(name, &args));

    // Direct helpers
    engine.register_fn("text_range", |pane: PaneHandle, from: INT, to: INT| -> ScriptResult<String> {
        with_session(&pane.session, |s| pane.binding.text_range(s, from as isize, to as isize))
    });
    engine.register_fn("insert", |pane: PaneHandle, pos: INT, text: &str| -> ScriptResult<()> {
        with_session(&pane.session, |s| pane.binding.insert(s, pos as isize, text))
    });
    engine.register_fn("remove", |pane: PaneHandle, from: INT, to: INT| -> ScriptResult<()> {
        with_session(&pane.session, |s| pane.binding.remove(s, from as isize, to as isize))
    });
    engine.register_fn("append", |pane: PaneHandle, text: &str| -> ScriptResult<()> {
        with_session(&pane.session, |s| pane.binding.append(s, text))
    });

    engine.register_fn("find_text", |pane: PaneHandle, text: &str| pane.find_text(text, 0, 0, None));
    engine.register_fn("find_text", |pane: PaneHandle, text: &str, flags: INT| {
        pane.find_text(text, flags, 0, None)
    });
    engine.register_fn("find_text", |pane: PaneHandle, text: &str, flags: INT, start: INT| {
        pane.find_text(text, flags, start, None)
    });
    engine.register_fn(
        "find_text",
        |pane: PaneHandle, text: &str, flags: INT, start: INT, end: INT| pane.find_text(text, flags, start, Some(end)),
    );

    engine.register_fn("search", |pane: PaneHandle, text: &str| pane.search(text, 0, 0));
    engine.register_fn("search", |pane: PaneHandle, text: &str, flags: INT| pane.search(text, flags, 0));
    engine.register_fn("search", |pane: PaneHandle, text: &str, flags: INT, start: INT| {
        pane.search(text, flags, start)
    });

    engine.register_fn("to_string", |pane: &mut PaneHandle| pane.binding.pane().name().to_string());

    // Proxies
    engine.register_indexer_get(|proxy: &mut ProxyHandle, key: Dynamic| proxy.get(key));
    engine.register_indexer_set(|proxy: &mut ProxyHandle, key: Dynamic, value: Dynamic| proxy.set(key, value));
    engine.register_fn("get", |proxy: &mut ProxyHandle, key: Dynamic| proxy.get(key));
    engine.register_fn("to_string", |proxy: &mut ProxyHandle| {
        format!("{}.{}", proxy.proxy.pane().name(), script_name(&proxy.proxy.property().name))
    });
}
