//! Script-to-host dispatch: marshalling, member resolution, search

pub mod marshal;
mod matcher;
mod session;
mod surface;

pub use matcher::{Match, MatchIterator, MatchState};
pub use session::Session;
pub use surface::{PropertyProxy, Resolved, SurfaceBinding, normalize_name, script_name};
