//! Tipos de error del cliente de la API

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Categoría de un fallo, tal como aparece en los informes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// 401/403 o sesión sin iniciar
    Authorization,
    /// Resto de errores 4xx y payloads rechazados localmente
    Validation,
    NotFound,
    Server,
    /// Códigos que no encajan en ninguna otra categoría (1xx/3xx)
    Unexpected,
    Transport,
    /// Respuesta que no cumple el esquema esperado
    Schema,
}

impl FailureKind {
    /// Clasifica un código HTTP que no es de éxito
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => FailureKind::Authorization,
            404 => FailureKind::NotFound,
            400..=499 => FailureKind::Validation,
            500..=599 => FailureKind::Server,
            _ => FailureKind::Unexpected,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Authorization => "authorization",
            FailureKind::Validation => "validation",
            FailureKind::NotFound => "not-found",
            FailureKind::Server => "server",
            FailureKind::Unexpected => "unexpected",
            FailureKind::Transport => "transport",
            FailureKind::Schema => "schema",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP {status} ({kind}): {}", .message.as_deref().unwrap_or("sin mensaje"))]
    Http {
        kind: FailureKind,
        status: StatusCode,
        /// Valor del campo `error` cuando el cuerpo lo trae
        message: Option<String>,
        body: String,
    },

    #[error("Operación '{operation}' requiere una sesión iniciada")]
    NotAuthenticated { operation: &'static str },

    #[error("Datos de petición inválidos: {0}")]
    InvalidRequest(String),

    #[error("Respuesta inválida en {context}: {reason}")]
    Schema { context: &'static str, reason: String },

    #[error("Error de transporte: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Configuración inválida: {0}")]
    Config(String),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Http { kind, .. } => *kind,
            ApiError::NotAuthenticated { .. } => FailureKind::Authorization,
            ApiError::InvalidRequest(_) => FailureKind::Validation,
            ApiError::Schema { .. } => FailureKind::Schema,
            ApiError::Transport(_) | ApiError::Io(_) => FailureKind::Transport,
            ApiError::Config(_) => FailureKind::Unexpected,
        }
    }

    /// Código HTTP devuelto por el servidor, si hubo respuesta
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Mensaje `error` del cuerpo JSON, si el servidor lo envió
    pub fn api_message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
