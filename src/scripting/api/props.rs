//! `props` - host configuration properties
//!
//! ```rhai
//! props["lexer.name"] = "rhai";
//! let name = props["lexer.name"];
//! props["lexer.name"] = ();   // unset
//! ```

use rhai::{Dynamic, Engine, ImmutableString};

use super::SharedSession;
use crate::bridge::marshal;

#[derive(Clone)]
pub struct PropsHandle {
    session: SharedSession,
}

impl PropsHandle {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

pub fn register(engine: &mut Engine) {
    engine.register_type_with_name::<PropsHandle>("Props");

    engine.register_indexer_get(|props: &mut PropsHandle, key: ImmutableString| -> String {
        props
            .session
            .read()
            .map(|s| s.host().property(&key))
            .unwrap_or_default()
    });

    engine.register_indexer_set(|props: &mut PropsHandle, key: ImmutableString, value: Dynamic| {
        if let Ok(mut session) = props.session.write() {
            if value.is_unit() {
                session.host_mut().unset_property(&key);
            } else {
                session.host_mut().set_property(&key, &marshal::to_text(&value));
            }
        }
    });
}
