//! Incremental styling for script-defined lexers

mod buffer;
mod cursor;
mod sink;

pub use buffer::{StyleBuffer, StyleRun};
pub use cursor::StylingCursor;
pub use sink::{Encoding, StyleSink, is_dbcs_lead_byte};
