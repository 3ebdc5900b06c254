//! Data models

pub mod category;
pub mod report;
pub mod issue;
pub mod stats;

pub use category::*;
pub use report::*;
pub use issue::*;
pub use stats::*;
