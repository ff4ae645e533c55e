//! Logging: consola más un fichero `log_<fecha>.log` por ejecución, con
//! cada intercambio HTTP completo.

use std::fs::{create_dir_all, File};
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::api::ApiResponse;
use crate::config::Settings;
use crate::error::{ApiError, ApiResult};

/// Target de los intercambios HTTP; el fichero siempre los recoge
pub const HTTP_TARGET: &str = "http";

const BODY_LIMIT: usize = 1000;
const REQUEST_HEADERS: &[&str] = &["content-type", "x-csrftoken", "authorization"];
const RESPONSE_HEADERS: &[&str] = &["content-type", "content-length", "location", "set-cookie"];

/// Inicializa el subscriber global y devuelve la ruta del fichero de log
pub fn init(settings: &Settings) -> ApiResult<PathBuf> {
    create_dir_all(&settings.log_dir)?;
    let file_name = format!("log_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let file_path = settings.log_dir.join(file_name);
    let file = File::create(&file_path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .map_err(|e| ApiError::Config(format!("LOG_LEVEL inválido: {}", e)))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(file_filter(&settings.log_level)),
        )
        .try_init()
        .map_err(|e| ApiError::Config(format!("no se pudo inicializar el logging: {}", e)))?;

    Ok(file_path)
}

/// Filtro del fichero: nivel configurado y los intercambios HTTP en debug.
/// Si `LOG_LEVEL` es una directiva compuesta se usa `info` como base.
fn file_filter(log_level: &str) -> Targets {
    let level = log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    Targets::new()
        .with_target(HTTP_TARGET, LevelFilter::DEBUG.max(level))
        .with_default(level)
}

pub fn log_request(
    method: &Method,
    url: &str,
    headers: &HeaderMap,
    query: &[(&str, String)],
    body: Option<&Value>,
) {
    let mut message = String::from("━━━ REQUEST ━━━\n");
    message.push_str(&format!("Method: {}\nURL: {}\n", method, url));
    if !query.is_empty() {
        message.push_str(&format!("Query: {:?}\n", query));
    }
    let selected = select_headers(headers, REQUEST_HEADERS);
    if !selected.is_empty() {
        message.push_str(&format!("Headers: {}\n", selected));
    }
    if let Some(body) = body {
        let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        message.push_str(&format!("Body:\n{}", truncate(&pretty, BODY_LIMIT)));
    }
    debug!(target: HTTP_TARGET, "{}", message);
}

pub fn log_response(response: &ApiResponse) {
    let mut message = String::from("━━━ RESPONSE ━━━\n");
    message.push_str(&format!("Status: {}\n", response.status));
    let selected = select_headers(&response.headers, RESPONSE_HEADERS);
    if !selected.is_empty() {
        message.push_str(&format!("Headers: {}\n", selected));
    }
    let body = match serde_json::from_str::<Value>(&response.body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| response.body.clone()),
        // Login/logout devuelven cuerpo vacío y el token llega como texto plano
        Err(_) if response.is_empty() => "<empty response>".to_string(),
        Err(_) => response.body.clone(),
    };
    message.push_str(&format!("Body:\n{}", truncate(&body, BODY_LIMIT)));
    debug!(target: HTTP_TARGET, "{} {} -> {}", response.method, response.url, message);
}

fn select_headers(headers: &HeaderMap, names: &[&str]) -> String {
    let pairs: Vec<String> = headers
        .iter()
        .filter(|(name, _)| names.contains(&name.as_str()))
        .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("<binario>")))
        .collect();
    pairs.join(", ")
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}\n... (truncado)", head)
}
