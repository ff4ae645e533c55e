//! Cliente de los endpoints de autenticación

use tracing::{debug, warn};

use crate::api::base::{ApiResponse, BaseClient};
use crate::api::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::models::LoginRequest;

#[derive(Debug, Clone)]
pub struct AuthClient {
    base: BaseClient,
}

impl AuthClient {
    pub fn new(base: BaseClient) -> Self {
        AuthClient { base }
    }

    pub fn base(&self) -> &BaseClient {
        &self.base
    }

    /// `GET /api/auth/token` devuelve el token como texto plano
    pub fn get_csrf_token(&self, session: &mut Session) -> ApiResult<String> {
        let url = self.base.settings().auth_token_url();
        let response = self.base.get(session, &url, &[])?.error_for_status()?;
        let token = response.text().trim().to_string();
        if token.is_empty() {
            return Err(ApiError::Schema {
                context: "csrf token",
                reason: "el cuerpo está vacío".to_string(),
            });
        }
        session.set_csrf_token(token.clone());
        Ok(token)
    }

    /// Inicia sesión.
    ///
    /// Pide antes un token CSRF si la sesión no tiene ninguno y, si el login
    /// es correcto, adopta el `csrftoken` rotado que llega en las cookies.
    /// Si falla, la sesión queda en `LoggedOut`.
    pub fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ApiResult<ApiResponse> {
        if session.csrf_token().is_none() {
            if let Err(e) = self.get_csrf_token(session) {
                warn!("No se pudo obtener el token CSRF antes del login: {}", e);
            }
        }

        let url = self.base.settings().auth_login_url();
        let body = LoginRequest::new(username, password);
        let response = self.base.post(session, &url, &body)?;
        debug!("Login, estado: {}", response.status);

        match response.error_for_status() {
            Ok(response) => {
                session.mark_logged_in();
                Ok(response)
            }
            Err(e) => {
                session.end();
                Err(e)
            }
        }
    }

    /// Login con las credenciales de la configuración
    pub fn login_with_settings(&self, session: &mut Session) -> ApiResult<ApiResponse> {
        let settings = self.base.settings();
        let (username, password) = (settings.test_username.clone(), settings.test_password.clone());
        self.login(session, &username, &password)
    }

    /// Cierra la sesión. Localmente se pasa a `LoggedOut` aunque el servidor falle.
    pub fn logout(&self, session: &mut Session) -> ApiResult<ApiResponse> {
        let url = self.base.settings().auth_logout_url();
        let result = self.base.get(session, &url, &[]);
        session.end();
        let response = result?;
        debug!("Logout, estado: {}", response.status);
        response.error_for_status()
    }
}
