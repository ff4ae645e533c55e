pub mod list;
pub mod run;

pub use list::*;
pub use run::*;
