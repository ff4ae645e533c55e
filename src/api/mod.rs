pub mod auth;
pub mod base;
pub mod session;
pub mod stats;
pub mod test_cases;

pub use auth::AuthClient;
pub use base::{ApiResponse, BaseClient};
pub use session::{Session, SessionState};
pub use stats::StatsClient;
pub use test_cases::{PageWalk, TestCasesClient};

use crate::config::Settings;
use crate::error::ApiResult;

/// Los tres clientes compartiendo el mismo cliente HTTP
#[derive(Debug, Clone)]
pub struct ApiClients {
    pub auth: AuthClient,
    pub tests: TestCasesClient,
    pub stats: StatsClient,
}

impl ApiClients {
    pub fn new(settings: Settings) -> ApiResult<Self> {
        let base = BaseClient::new(settings)?;
        Ok(ApiClients {
            auth: AuthClient::new(base.clone()),
            tests: TestCasesClient::new(base.clone()),
            stats: StatsClient::new(base),
        })
    }

    pub fn settings(&self) -> &Settings {
        self.auth.base().settings()
    }

    /// Sesión nueva ya autenticada con las credenciales de la configuración
    pub fn logged_in_session(&self) -> ApiResult<Session> {
        let mut session = Session::new();
        self.auth.login_with_settings(&mut session)?;
        Ok(session)
    }
}
