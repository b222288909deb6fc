pub mod conversion;
pub mod converter;
pub mod format;
pub mod observer;
pub mod query;
pub mod reference_finder;
pub mod scan;

pub use conversion::*;
pub use converter::*;
pub use format::*;
pub use observer::*;
pub use query::*;
pub use reference_finder::*;
pub use scan::*;
