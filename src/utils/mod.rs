pub mod assertions;
pub mod logger;
pub mod report;

pub use assertions::*;
pub use report::*;
