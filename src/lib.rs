//! scribe - a Rhai scripting bridge for message-driven editor panes
//!
//! The host exposes its panes as a [`host::Host`] that answers numbered
//! messages. [`iface`] describes those messages, [`bridge`] turns script
//! calls into them, [`styling`] gives lexers a cursor over a document and
//! [`scripting`] wires it all into a Rhai engine.

pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod iface;
pub mod scripting;
pub mod styling;
