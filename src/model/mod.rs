pub mod common;
pub mod document;
pub mod path;
pub mod reference;
pub mod result;

pub use common::*;
pub use document::*;
pub use path::*;
pub use reference::*;
pub use result::*;
