//! Configuración leída de variables de entorno (o de la línea de comandos)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};

use crate::error::{ApiError, ApiResult};

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// URL base del servicio, sin barra final
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: String,

    /// Timeout de cada petición en milisegundos
    #[arg(long, env = "API_TIMEOUT", default_value_t = 30_000)]
    pub api_timeout: u64,

    /// Usuario de pruebas
    #[arg(long, env = "TEST_USERNAME", default_value = "")]
    pub test_username: String,

    /// Contraseña del usuario de pruebas
    #[arg(long, env = "TEST_PASSWORD", default_value = "", hide_env_values = true)]
    pub test_password: String,

    /// Número de workers paralelos
    #[arg(long = "workers", env = "PARALLEL_WORKERS", default_value_t = 1)]
    pub parallel_workers: usize,

    /// Nivel de log (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Directorio de los ficheros de log
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}

/// Envoltorio para leer solo `Settings` desde el entorno
#[derive(Parser, Debug)]
struct EnvOnly {
    #[command(flatten)]
    settings: Settings,
}

impl Settings {
    /// Carga la configuración desde el entorno, sin argumentos de línea de comandos
    pub fn from_env() -> ApiResult<Self> {
        let parsed = EnvOnly::try_parse_from(["test_case_api"])
            .map_err(|e| ApiError::Config(e.to_string()))?;
        parsed.settings.normalized()
    }

    /// Configuración apuntando a `base_url`, útil para servidores locales
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Settings {
            api_base_url: base_url.into(),
            api_timeout: 30_000,
            test_username: String::new(),
            test_password: String::new(),
            parallel_workers: 1,
            log_level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.test_username = username.into();
        self.test_password = password.into();
        self
    }

    /// Valida los campos y quita la barra final de la URL base
    pub fn normalized(mut self) -> ApiResult<Self> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "API_BASE_URL debe empezar por http:// o https:// (valor: '{}')",
                self.api_base_url
            )));
        }
        if self.parallel_workers == 0 {
            return Err(ApiError::Config("PARALLEL_WORKERS debe ser al menos 1".to_string()));
        }
        self.api_base_url = trimmed;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout)
    }

    pub fn has_credentials(&self) -> bool {
        !self.test_username.is_empty()
    }

    pub fn auth_token_url(&self) -> String {
        format!("{}/api/auth/token", self.api_base_url)
    }

    pub fn auth_login_url(&self) -> String {
        format!("{}/api/auth/login", self.api_base_url)
    }

    pub fn auth_logout_url(&self) -> String {
        format!("{}/api/auth/logout", self.api_base_url)
    }

    pub fn tests_url(&self) -> String {
        format!("{}/api/tests", self.api_base_url)
    }

    pub fn tests_new_url(&self) -> String {
        format!("{}/api/tests/new", self.api_base_url)
    }

    pub fn stats_url(&self) -> String {
        format!("{}/api/getstat", self.api_base_url)
    }

    /// Acepta ids no numéricos para poder probar el 404 por formato inválido
    pub fn test_url(&self, test_id: &str) -> String {
        format!("{}/api/tests/{}", self.api_base_url, test_id)
    }

    pub fn test_status_url(&self, test_id: &str) -> String {
        format!("{}/api/tests/{}/status", self.api_base_url, test_id)
    }
}
