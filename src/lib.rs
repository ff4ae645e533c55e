//! Suite de pruebas de la API de gestión de casos de prueba.
//!
//! Cliente HTTP con sesión explícita (cookies y token CSRF), modelos
//! validados, generador de datos y un runner de escenarios con informes
//! CSV y Markdown.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod runner;
pub mod suites;
pub mod utils;

pub use api::{ApiClients, Session, SessionState};
pub use config::Settings;
pub use error::{ApiError, ApiResult, FailureKind};
pub use runner::{OutcomeStatus, RunSummary, ScenarioOutcome};
pub use suites::{Marker, Scenario, ScenarioContext};
