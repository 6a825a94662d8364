//! scite - message dispatch by id and the published constants
//!
//! Usage in Rhai:
//! ```rhai
//! let len = scite::send_editor(scite::SCI_GETLENGTH);
//! scite::send_output(scite::SCI_APPENDTEXT, "done\n");
//! let name = scite::constant_name(4);   // "SCFIND_MATCHCASE"
//! let id = scite::constant_value("SCI_GETTEXT");
//! ```

use std::sync::Arc;

use rhai::{Dynamic, EvalAltResult, INT, ImmutableString};

use super::{SharedSession, with_session};
use crate::bridge::SurfaceBinding;
use crate::error::BridgeError;
use crate::host::Pane;
use crate::iface::Catalog;

fn register_send(module: &mut rhai::Module, name: &str, pane: Pane, session: &SharedSession) {
    let binding = SurfaceBinding::new(pane);

    {
        let s = Arc::clone(session);
        module.set_native_fn(name, move |msg: INT| with_session(&s, |session| binding.send(session, msg, &[])));
    }
    {
        let s = Arc::clone(session);
        module.set_native_fn(name, move |msg: INT, a: Dynamic| {
            with_session(&s, |session| binding.send(session, msg, &[a]))
        });
    }
    {
        let s = Arc::clone(session);
        module.set_native_fn(name, move |msg: INT, a: Dynamic, b: Dynamic| {
            with_session(&s, |session| binding.send(session, msg, &[a, b]))
        });
    }
}

/// Create the scite module with access to the session and its catalog
pub fn create_module(session: SharedSession, catalog: Arc<Catalog>) -> rhai::Module {
    let mut module = rhai::Module::new();

    // send_editor(msg, ...) / send_output(msg, ...)
    register_send(&mut module, "send_editor", Pane::Editor, &session);
    register_send(&mut module, "send_output", Pane::Output, &session);

    // constant_name(value) -> String
    {
        let c = Arc::clone(&catalog);
        module.set_native_fn(
            "constant_name",
            move |value: INT| -> Result<String, Box<EvalAltResult>> {
                c.constant_name(value)
                    .ok_or_else(|| BridgeError::UnknownConstant(value).into_script_error())
            },
        );
    }

    // constant_value(name) -> Int, for names built at run time
    {
        let c = Arc::clone(&catalog);
        module.set_native_fn(
            "constant_value",
            move |name: ImmutableString| -> Result<INT, Box<EvalAltResult>> {
                c.constant(&name)
                    .or_else(|| c.message_by_constant_name(&name))
                    .map(|value| value as INT)
                    .ok_or_else(|| {
                        BridgeError::InvalidArgument(format!("'{}' does not name a constant", name))
                            .into_script_error()
                    })
            },
        );
    }

    // Message ids first so declared constants win on a name clash
    for (name, id) in catalog.message_constants() {
        module.set_var(name, id as INT);
    }
    for constant in catalog.constants() {
        module.set_var(constant.name.clone(), constant.value as INT);
    }

    module
}
