//! Operation catalog: function, property and constant descriptors
//!
//! The tables are read-only after construction. Names follow the host's
//! CamelCase convention (`GetText`, `CurrentPos`); the bridge normalizes
//! script-side snake_case names before lookup.

mod builtin;
mod catalog;
mod types;

pub use builtin::*;
pub use catalog::Catalog;
pub use types::{ConstantDescriptor, FunctionDescriptor, PropertyDescriptor, TypeTag};
