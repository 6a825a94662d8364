//! The Rhai scripting engine behind the bridge
//!
//! Scripts see:
//! - `scite::*` - message dispatch by id and constants
//! - `editor`, `output` - pane objects
//! - `props` - host properties
//! - `print(x)` / `trace(x)` - text to the host trace sink
//!
//! Event handlers are plain script functions (`on_style(styler)`, ...)
//! invoked through [`ScriptEngine::call_handler`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rhai::{AST, CallFnOptions, Dynamic, Engine, Scope};
use tracing::{debug, warn};

use super::api::matches;
use super::api::pane::{self, PaneHandle};
use super::api::props::{self, PropsHandle};
use super::api::scite;
use super::api::styler::{self, SharedSink, StylerHandle};
use super::api::SharedSession;
use crate::bridge::{Session, marshal};
use crate::config::Settings;
use crate::host::{Host, MemoryHost, Pane, Param};
use crate::iface::{Catalog, SCI_GETCODEPAGE};
use crate::styling::{StyleBuffer, StylingCursor};

const GLOBALS: [&str; 3] = ["editor", "output", "props"];

/// The scripting engine: a Rhai engine, the loaded script and the session
/// its objects talk to
pub struct ScriptEngine {
    engine: Engine,
    session: SharedSession,
    settings: Settings,
    scope: Scope<'static>,
    ast: Option<AST>,
}

impl ScriptEngine {
    /// An engine over an empty in-memory host with default settings
    pub fn new() -> Self {
        Self::build(Box::new(MemoryHost::new()), Arc::new(Catalog::builtin()), Settings::default())
    }

    /// An engine over `host`, loading the catalog named in `settings` if any
    pub fn with_host(host: Box<dyn Host>, settings: Settings) -> Result<Self, String> {
        let catalog = match &settings.catalog {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };
        Ok(Self::build(host, Arc::new(catalog), settings))
    }

    fn build(host: Box<dyn Host>, catalog: Arc<Catalog>, settings: Settings) -> Self {
        let session = Arc::new(RwLock::new(Session::new(host, Arc::clone(&catalog))));
        let engine = Self::create_engine(Arc::clone(&session), catalog, &settings);

        let mut scope = Scope::new();
        for (name, value) in Self::globals(&session) {
            scope.push_dynamic(name, value);
        }

        Self {
            engine,
            session,
            settings,
            scope,
            ast: None,
        }
    }

    fn globals(session: &SharedSession) -> [(&'static str, Dynamic); 3] {
        [
            ("editor", Dynamic::from(PaneHandle::new(Pane::Editor, Arc::clone(session)))),
            ("output", Dynamic::from(PaneHandle::new(Pane::Output, Arc::clone(session)))),
            ("props", Dynamic::from(PropsHandle::new(Arc::clone(session)))),
        ]
    }

    /// Create the Rhai engine with the `scite` namespace and the script types
    fn create_engine(session: SharedSession, catalog: Arc<Catalog>, settings: &Settings) -> Engine {
        let mut engine = Engine::new();

        // Safety limits
        engine.set_max_expr_depths(settings.max_expr_depth, settings.max_expr_depth);
        engine.set_max_operations(settings.max_operations);

        pane::register(&mut engine, &catalog);
        matches::register(&mut engine);
        styler::register(&mut engine);
        props::register(&mut engine);

        let scite_module = scite::create_module(Arc::clone(&session), catalog);
        engine.register_static_module("scite", scite_module.into());

        // Top-level code finds the globals in the scope; handler functions
        // have no access to it and get them from here
        {
            let s = Arc::clone(&session);
            engine.on_var(move |name, _index, context| {
                if !GLOBALS.contains(&name) || context.scope().contains(name) {
                    return Ok(None);
                }
                Ok(Self::globals(&s)
                    .into_iter()
                    .find(|(global, _)| *global == name)
                    .map(|(_, value)| value))
            });
        }

        {
            let s = Arc::clone(&session);
            engine.on_print(move |text| {
                if let Ok(mut session) = s.write() {
                    session.host_mut().trace(&format!("{}\n", text));
                }
            });
        }

        {
            let s = Arc::clone(&session);
            engine.register_fn("trace", move |value: Dynamic| {
                if let Ok(mut session) = s.write() {
                    session.host_mut().trace(&marshal::to_text(&value));
                }
            });
        }

        engine
    }

    /// Load and execute a script file
    pub fn load_file(&mut self, path: &Path) -> Result<(), String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read script file: {}", e))?;

        self.eval(&content)
    }

    /// Evaluate a Rhai script string. Functions it defines join those of
    /// earlier scripts and become available as handlers.
    pub fn eval(&mut self, script: &str) -> Result<(), String> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| format!("Script parse error: {}", e))?;

        // Earlier scripts' functions stay callable from the new statements
        let run = match &self.ast {
            Some(loaded) => loaded.clone_functions_only().merge(&ast),
            None => ast.clone(),
        };
        self.engine
            .run_ast_with_scope(&mut self.scope, &run)
            .map_err(|e| format!("Script error: {}", e))?;

        self.ast = Some(match self.ast.take() {
            Some(loaded) => loaded.merge(&ast),
            None => ast,
        });
        Ok(())
    }

    /// Whether the loaded scripts define `name` taking `arity` arguments
    pub fn has_handler(&self, name: &str, arity: usize) -> bool {
        self.ast
            .as_ref()
            .is_some_and(|ast| ast.iter_functions().any(|f| f.name == name && f.params.len() == arity))
    }

    /// Call a script-defined handler. Returns whether it reported the event
    /// as handled (a truthy result). Errors are traced, not propagated.
    pub fn call_handler(&mut self, name: &str, args: Vec<Dynamic>) -> bool {
        if !self.has_handler(name, args.len()) {
            return false;
        }
        let Some(ast) = &self.ast else {
            return false;
        };

        debug!(handler = name, "calling script handler");
        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
        match self
            .engine
            .call_fn_with_options::<Dynamic>(options, &mut self.scope, ast, name, args)
        {
            Ok(result) => marshal::truthy(&result),
            Err(e) => {
                warn!(handler = name, error = %e, "script handler failed");
                if self.settings.trace_errors {
                    if let Ok(mut session) = self.session.write() {
                        session.host_mut().trace(&format!("{}: {}\n", name, e));
                    }
                }
                false
            }
        }
    }

    /// Run `on_style(styler)` over `[start_pos, start_pos + length)` of
    /// `sink`, decoding with the editor pane's code page
    pub fn on_style(&mut self, sink: SharedSink, start_pos: usize, length: usize, init_style: i64) -> bool {
        if !self.has_handler("on_style", 1) {
            return false;
        }
        let cursor = StylingCursor::new(sink, start_pos, length, init_style, self.editor_code_page());
        self.call_handler("on_style", vec![Dynamic::from(StylerHandle::new(cursor))])
    }

    /// Style the whole editor document with the script lexer. `None` when
    /// no `on_style` handler is loaded.
    pub fn style_document(&mut self) -> Result<Option<StyleBuffer>, String> {
        if !self.has_handler("on_style", 1) {
            return Ok(None);
        }
        let text = {
            let mut session = self
                .session
                .write()
                .map_err(|_| "Scripting session is unavailable".to_string())?;
            session.pane_text(Pane::Editor).map_err(|e| e.to_string())?
        };
        let length = text.len();
        let buffer = Arc::new(RwLock::new(StyleBuffer::new(text, self.editor_code_page())));

        self.on_style(buffer.clone(), 0, length, 0);

        let styled = buffer
            .read()
            .map(|b| b.clone())
            .map_err(|_| "Style buffer is unavailable".to_string())?;
        Ok(Some(styled))
    }

    fn editor_code_page(&self) -> i64 {
        self.session
            .write()
            .ok()
            .and_then(|mut s| {
                s.host_mut()
                    .send(Pane::Editor, SCI_GETCODEPAGE, Param::Int(0), Param::Int(0))
                    .ok()
            })
            .unwrap_or(0) as i64
    }

    /// Mark a document as active; the editor pane is unusable until then
    pub fn activate_buffer(&mut self, index: usize) {
        if let Ok(mut session) = self.session.write() {
            session.activate_buffer(index);
        }
    }

    pub fn deactivate_buffer(&mut self) {
        if let Ok(mut session) = self.session.write() {
            session.deactivate_buffer();
        }
    }

    /// Get a reference to the session for sharing
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load the startup script named by the settings if it exists
    pub fn load_default(&mut self) -> Result<(), String> {
        if let Some(script) = self.settings.startup_script_path() {
            if script.exists() {
                return self.load_file(&script);
            }
        }
        Ok(()) // No startup script is fine
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        Settings::config_dir()
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Pane;
    use crate::styling::StyleSink;

    fn engine_with(text: &str) -> ScriptEngine {
        let mut engine =
            ScriptEngine::with_host(Box::new(MemoryHost::with_text(text)), Settings::default()).unwrap();
        engine.activate_buffer(0);
        engine
    }

    fn editor_text(engine: &ScriptEngine) -> String {
        engine.session().write().unwrap().pane_text(Pane::Editor).unwrap()
    }

    fn output_text(engine: &ScriptEngine) -> String {
        engine.session().write().unwrap().pane_text(Pane::Output).unwrap()
    }

    #[test]
    fn test_property_read_and_write() {
        let mut engine = engine_with("hello\nworld");
        engine
            .eval(
                r#"
                if editor["line_count"] != 2 { throw "bad line count"; }
                editor["current_pos"] = 3;
                if editor["current_pos"] != 3 { throw "assignment lost"; }
            "#,
            )
            .unwrap();
    }

    #[test]
    fn test_catalog_functions_as_methods() {
        let mut engine = engine_with("one\ntwo");
        engine
            .eval(
                r#"
                if editor.get_line(1) != "two" { throw "get_line"; }
                if editor.line_from_position(5) != 1 { throw "line_from_position"; }
                editor.set_text("replaced");
                if editor.get_text() != "replaced" { throw "get_text"; }
                editor.append_text("!");
            "#,
            )
            .unwrap();
        assert_eq!(editor_text(&engine), "replaced!");
    }

    #[test]
    fn test_key_assignment_packs_modifiers() {
        let mut engine = engine_with("");
        engine
            .eval("editor.assign_cmd_key(65, scite::SCMOD_SHIFT | scite::SCMOD_CTRL, 2013);")
            .unwrap();
    }

    #[test]
    fn test_unknown_member_is_a_script_error() {
        let mut engine = engine_with("");
        let err = engine.eval(r#"editor["frobnicate"]"#).unwrap_err();
        assert!(err.contains("frobnicate"), "{}", err);
    }

    #[test]
    fn test_editor_unavailable_without_document() {
        let mut engine = engine_with("abc");
        engine.deactivate_buffer();
        let err = engine.eval(r#"editor["length"]"#).unwrap_err();
        assert!(err.contains("not accessible"), "{}", err);
        engine.eval(r#"output.append("still fine")"#).unwrap();
    }

    #[test]
    fn test_indexed_property_proxy() {
        let mut engine = engine_with("abc");
        engine
            .eval(
                r#"
                let fore = editor["style_fore"];
                fore[3] = 255;
                if fore[3] != 255 { throw "proxy set/get"; }
                if fore.get(3) != 255 { throw "proxy get"; }
                let chars = editor["char_at"];
                if chars[1] != 98 { throw "char_at"; }
            "#,
            )
            .unwrap();
    }

    #[test]
    fn test_direct_assignment_to_indexed_property_fails() {
        let mut engine = engine_with("abc");
        let err = engine.eval(r#"editor["style_fore"] = 1;"#).unwrap_err();
        assert!(err.contains("indexed property"), "{}", err);
    }

    #[test]
    fn test_send_by_message_id() {
        let mut engine = engine_with("abcdef");
        engine
            .eval(
                r#"
                if scite::send_editor(scite::SCI_GETLENGTH) != 6 { throw "length"; }
                scite::send_output(scite::SCI_APPENDTEXT, "log");
                if scite::constant_name(scite::SCFIND_MATCHCASE) != "SCFIND_MATCHCASE" { throw "name"; }
            "#,
            )
            .unwrap();
        assert_eq!(output_text(&engine), "log");

        let err = engine.eval("scite::send_editor(42)").unwrap_err();
        assert!(err.contains("42"), "{}", err);
    }

    #[test]
    fn test_search_and_replace_loop() {
        let mut engine = engine_with("a-b-a");
        engine
            .eval(
                r#"
                let count = 0;
                for m in editor.search("a") {
                    m.replace("A");
                    count += 1;
                }
                if count != 2 { throw "count"; }
            "#,
            )
            .unwrap();
        assert_eq!(editor_text(&engine), "A-b-A");
    }

    #[test]
    fn test_match_object_pull_api() {
        let mut engine = engine_with("xababx");
        engine
            .eval(
                r#"
                let m = editor.search("ab");
                if m.next() != "ab" { throw "first"; }
                if m.pos != 1 || m.len != 2 { throw "bounds"; }
                if m.to_string() != "match{pos=1,len=2}" { throw m.to_string(); }
                m.next();
                if m.pos != 3 { throw "second"; }
                if m.next() != () { throw "exhausted"; }
            "#,
            )
            .unwrap();

        let err = engine
            .eval(r#"let m = editor.search("zz"); m.next(); m.next();"#)
            .unwrap_err();
        assert!(err.contains("invalidated"), "{}", err);
    }

    #[test]
    fn test_for_loop_over_exhausted_match_raises() {
        let mut engine = engine_with("xababx");
        let err = engine
            .eval(r#"let m = editor.search("zz"); m.next(); let n = 0; for x in m { n += 1; }"#)
            .unwrap_err();
        assert!(err.contains("invalidated"), "{}", err);
    }

    #[test]
    fn test_functions_survive_across_evals() {
        let mut engine = engine_with("abc");
        engine.eval("fn helper() { 41 }").unwrap();
        engine
            .eval("let x = helper(); if x != 41 { throw x; }")
            .unwrap();
        engine.eval("fn other() { helper() + 1 }").unwrap();
        engine
            .eval("if other() != 42 { throw other(); }")
            .unwrap();
    }

    #[test]
    fn test_constant_value_by_name() {
        let mut engine = engine_with("abc");
        engine
            .eval(
                r#"
                if scite::constant_value("SCFIND_MATCHCASE") != 4 { throw "declared"; }
                if scite::constant_value("SCI_GETLENGTH") != scite::SCI_GETLENGTH { throw "message"; }
                if scite::send_editor(scite::constant_value("SCI_GETLENGTH")) != 3 { throw "send"; }
            "#,
            )
            .unwrap();

        let err = engine.eval(r#"scite::constant_value("SCI_NOPE")"#).unwrap_err();
        assert!(err.contains("SCI_NOPE"), "{}", err);
    }

    #[test]
    fn test_find_text_and_text_range() {
        let mut engine = engine_with("Hello World");
        engine
            .eval(
                r#"
                let r = editor.find_text("world");
                if r[0] != 6 || r[1] != 11 { throw "bounds"; }
                if editor.find_text("world", scite::SCFIND_MATCHCASE) != () { throw "case"; }
                if editor.text_range(0, 5) != "Hello" { throw "range"; }
                editor.remove(5, 11);
                editor.insert(0, ">");
            "#,
            )
            .unwrap();
        assert_eq!(editor_text(&engine), ">Hello");
    }

    #[test]
    fn test_props() {
        let mut engine = engine_with("");
        engine
            .eval(
                r#"
                props["lexer"] = "rhai";
                if props["lexer"] != "rhai" { throw "set"; }
                props["lexer"] = ();
                if props["lexer"] != "" { throw "unset"; }
            "#,
            )
            .unwrap();
    }

    #[test]
    fn test_print_goes_to_trace_sink() {
        let mut engine = engine_with("");
        engine.eval(r#"print("hi"); trace("there");"#).unwrap();
        assert_eq!(output_text(&engine), "hi\nthere");
    }

    #[test]
    fn test_call_handler() {
        let mut engine = engine_with("abc");
        engine
            .eval(
                r#"
                fn on_key(key, mods) { key == 65 }
                fn on_save() { throw "disk full"; }
            "#,
            )
            .unwrap();
        assert!(engine.call_handler("on_key", vec![Dynamic::from(65 as rhai::INT), Dynamic::from(0 as rhai::INT)]));
        assert!(!engine.call_handler("on_key", vec![Dynamic::from(66 as rhai::INT), Dynamic::from(0 as rhai::INT)]));
        assert!(!engine.call_handler("on_missing", vec![]));
        assert!(!engine.call_handler("on_save", vec![]));
        assert!(output_text(&engine).contains("disk full"));
    }

    #[test]
    fn test_handlers_see_panes() {
        let mut engine = engine_with("abc");
        engine
            .eval(r#"fn on_open() { output.append(editor.text_range(0, 3)); true }"#)
            .unwrap();
        assert!(engine.call_handler("on_open", vec![]));
        assert_eq!(output_text(&engine), "abc");
    }

    #[test]
    fn test_on_style_lexer() {
        let mut engine = engine_with("// c\nx = 1\n");
        engine
            .eval(
                r#"
                fn on_style(styler) {
                    styler.start_styling(styler.start_pos(), styler.length_doc(), styler.init_style());
                    while styler.more() {
                        if styler.state() == 0 && styler.matches("//") {
                            styler.set_state(1);
                        } else if styler.state() == 1 && styler.at_line_end() {
                            styler.forward_set_state(0);
                            continue;
                        }
                        styler.forward();
                    }
                    styler.end_styling();
                    true
                }
            "#,
            )
            .unwrap();

        let styled = engine.style_document().unwrap().unwrap();
        assert_eq!(&styled.styles()[..5], &[1, 1, 1, 1, 1]);
        assert_eq!(&styled.styles()[5..], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(styled.style_at(0), 1);
    }

    #[test]
    fn test_style_document_without_handler() {
        let mut engine = engine_with("abc");
        assert!(engine.style_document().unwrap().is_none());
    }

    #[test]
    fn test_operation_limit_applies() {
        let settings = Settings {
            max_operations: 50,
            ..Settings::default()
        };
        let mut engine = ScriptEngine::with_host(Box::new(MemoryHost::new()), settings).unwrap();
        let err = engine.eval("let x = 0; loop { x += 1; }").unwrap_err();
        assert!(err.starts_with("Script error"), "{}", err);
    }

    #[test]
    fn test_parse_error() {
        let mut engine = ScriptEngine::new();
        let err = engine.eval("let = ;").unwrap_err();
        assert!(err.starts_with("Script parse error"), "{}", err);
    }
}
