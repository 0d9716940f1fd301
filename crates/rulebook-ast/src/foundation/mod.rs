//! Foundation types shared by every compiler stage.

mod name;
mod source_map;

pub use name::{DottedName, SEPARATOR};
pub use source_map::SourceMap;
