pub mod auth;
pub mod error;
pub mod list;
pub mod stats;
pub mod test_case;
pub mod test_status;

pub use auth::*;
pub use error::*;
pub use list::*;
pub use stats::*;
pub use test_case::*;
pub use test_status::*;

/// Restricciones de campo que serde no comprueba por sí solo
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
