//! Cliente HTTP base compartido por todos los clientes de recursos

use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::session::Session;
use crate::config::Settings;
use crate::error::{ApiError, ApiResult, FailureKind};
use crate::models::{ErrorResponse, Validate};
use crate::utils::logger::{log_request, log_response, truncate};

/// `X-CSRFToken`; los nombres de cabecera viajan en minúsculas
pub const CSRF_HEADER: &str = "x-csrftoken";

/// Respuesta ya leída por completo: estado, cabeceras y cuerpo como texto
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Cuerpo `{"error": ...}`, si lo hay
    pub fn error_body(&self) -> Option<ErrorResponse> {
        serde_json::from_str(&self.body).ok()
    }

    /// Deserializa el cuerpo y comprueba las restricciones del modelo
    pub fn parse<T>(&self, context: &'static str) -> ApiResult<T>
    where
        T: DeserializeOwned + Validate,
    {
        let parsed: T = serde_json::from_str(&self.body).map_err(|e| ApiError::Schema {
            context,
            reason: format!("{} (cuerpo: {})", e, truncate(&self.body, 200)),
        })?;
        parsed
            .validate()
            .map_err(|reason| ApiError::Schema { context, reason })?;
        debug!("Respuesta de {} parseada correctamente", context);
        Ok(parsed)
    }

    /// Para respuestas sin modelo propio (p. ej. el borrado)
    pub fn json_value(&self, context: &'static str) -> ApiResult<Value> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Schema {
            context,
            reason: e.to_string(),
        })
    }

    /// Convierte un estado que no es de éxito en un fallo clasificado
    pub fn into_error(self) -> ApiError {
        let message = self.error_body().map(|e| e.error);
        ApiError::Http {
            kind: FailureKind::from_status(self.status),
            status: self.status,
            message,
            body: self.body,
        }
    }

    /// Devuelve la respuesta si es 2xx y el error clasificado si no
    pub fn error_for_status(self) -> ApiResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }
}

#[derive(Debug, Clone)]
pub struct BaseClient {
    http: Client,
    settings: Arc<Settings>,
}

impl BaseClient {
    pub fn new(settings: Settings) -> ApiResult<Self> {
        let http = Client::builder().timeout(settings.timeout()).build()?;
        Ok(BaseClient {
            http,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn headers_for(&self, session: &Session) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = session.csrf_token() {
            if let Ok(value) = HeaderValue::from_str(token) {
                headers.insert(HeaderName::from_static(CSRF_HEADER), value);
            }
        }
        if let Some(cookies) = session.cookie_header() {
            if let Ok(value) = HeaderValue::from_str(&cookies) {
                headers.insert(COOKIE, value);
            }
        }
        headers
    }

    /// Envía una petición sin validar el cuerpo. Los `Set-Cookie` de la
    /// respuesta se incorporan a la sesión.
    pub fn send<B: Serialize + ?Sized>(
        &self,
        session: &mut Session,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<ApiResponse> {
        let headers = self.headers_for(session);
        let body_value = match body {
            Some(b) => Some(serde_json::to_value(b).map_err(|e| {
                ApiError::InvalidRequest(format!("no se pudo serializar el cuerpo: {}", e))
            })?),
            None => None,
        };
        log_request(&method, url, &headers, query, body_value.as_ref());

        let mut builder = self.http.request(method.clone(), url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(value) = &body_value {
            builder = builder.json(value);
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text()?;

        let response = ApiResponse {
            method,
            url: url.to_string(),
            status,
            headers,
            body,
        };
        log_response(&response);

        session.absorb_set_cookies(&response.headers);
        if session.is_logged_in()
            && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        {
            debug!("Sesión rechazada por el servidor ({}), se marca como cerrada", status);
            session.end();
        }
        Ok(response)
    }

    pub fn get(
        &self,
        session: &mut Session,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<ApiResponse> {
        self.send::<Value>(session, Method::GET, url, query, None)
    }

    pub fn post<B: Serialize + ?Sized>(
        &self,
        session: &mut Session,
        url: &str,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.send(session, Method::POST, url, &[], Some(body))
    }

    pub fn put<B: Serialize + ?Sized>(
        &self,
        session: &mut Session,
        url: &str,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.send(session, Method::PUT, url, &[], Some(body))
    }

    pub fn patch<B: Serialize + ?Sized>(
        &self,
        session: &mut Session,
        url: &str,
        body: &B,
    ) -> ApiResult<ApiResponse> {
        self.send(session, Method::PATCH, url, &[], Some(body))
    }

    pub fn delete(&self, session: &mut Session, url: &str) -> ApiResult<ApiResponse> {
        self.send::<Value>(session, Method::DELETE, url, &[], None)
    }
}
