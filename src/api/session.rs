//! Sesión explícita: cookies, token CSRF y estado de autenticación.
//!
//! Cada worker crea sus propias sesiones y las pasa a los clientes en cada
//! llamada, así que no hay estado global compartido entre pruebas.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const SESSION_COOKIE: &str = "sessionid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    cookies: BTreeMap<String, String>,
    csrf_token: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::LoggedOut,
            cookies: BTreeMap::new(),
            csrf_token: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == SessionState::LoggedIn
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn set_csrf_token(&mut self, token: impl Into<String>) {
        self.csrf_token = Some(token.into());
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Valor de la cabecera `Cookie`, o `None` si no hay cookies
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(pairs.join("; "))
    }

    /// Incorpora las cabeceras `Set-Cookie` de una respuesta
    pub fn absorb_set_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            if let Some(token) = extract_csrf_token(raw) {
                self.csrf_token = Some(token);
            }
            self.apply_set_cookie(raw);
        }
    }

    fn apply_set_cookie(&mut self, raw: &str) {
        let mut parts = raw.split(';');
        let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
            return;
        };
        let name = name.trim().to_string();
        let value = value.trim().trim_matches('"').to_string();

        let now = Utc::now();
        let expired = parts.any(|attr| attribute_expired(attr, now));

        if expired || value.is_empty() {
            debug!("Cookie '{}' eliminada por el servidor", name);
            self.cookies.remove(&name);
        } else {
            self.cookies.insert(name, value);
        }
    }

    /// Login correcto: se pasa a `LoggedIn`
    pub fn mark_logged_in(&mut self) {
        self.state = SessionState::LoggedIn;
    }

    /// Logout o expiración: se vuelve a `LoggedOut` y se descartan las
    /// cookies y el token. El siguiente login pide un token nuevo.
    pub fn end(&mut self) {
        self.state = SessionState::LoggedOut;
        self.cookies.clear();
        self.csrf_token = None;
    }

    /// Las operaciones que modifican datos solo se intentan con sesión iniciada
    pub fn require_login(&self, operation: &'static str) -> ApiResult<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated { operation })
        }
    }
}

/// `Max-Age` no positivo o `Expires` ya pasado
fn attribute_expired(attr: &str, now: DateTime<Utc>) -> bool {
    let Some((key, value)) = attr.split_once('=') else {
        return false;
    };
    let value = value.trim();
    match key.trim().to_ascii_lowercase().as_str() {
        "max-age" => value.parse::<i64>().map_or(false, |seconds| seconds <= 0),
        // Django y otros servidores usan también la forma `01-Jan-1970`
        "expires" => DateTime::parse_from_rfc2822(&value.replace('-', " "))
            .map_or(false, |at| at.with_timezone(&Utc) <= now),
        _ => false,
    }
}

/// Busca `csrftoken=<valor>` en una cabecera `Set-Cookie`
pub fn extract_csrf_token(set_cookie: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"csrftoken=([a-zA-Z0-9]+)").expect("patrón de csrftoken válido")
    });
    pattern
        .captures(set_cookie)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
