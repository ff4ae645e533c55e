//! Comprobaciones para los escenarios.
//!
//! Un escenario devuelve `CheckResult`; las macros `check!` y `check_eq!`
//! cortan el escenario con un fallo de aserción en lugar de hacer panic,
//! para que el runner siga con el resto.

use std::fmt::Debug;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiResponse;
use crate::error::{ApiError, FailureKind};
use crate::models::ErrorMessage;

#[derive(Error, Debug)]
pub enum CheckFailure {
    #[error("{0}")]
    Assertion(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckFailure {
    /// Categoría para el informe: `assertion` o la del error de la API
    pub fn category(&self) -> &'static str {
        match self {
            CheckFailure::Assertion(_) => "assertion",
            CheckFailure::Api(e) => e.kind().label(),
        }
    }
}

pub type CheckResult<T = ()> = Result<T, CheckFailure>;

#[macro_export]
macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::utils::assertions::CheckFailure::Assertion(format!($($arg)+)));
        }
    };
}

#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left, right) => {
                if left != right {
                    return Err($crate::utils::assertions::CheckFailure::Assertion(format!(
                        "{}: esperado {:?}, obtenido {:?}",
                        format!($($arg)+),
                        right,
                        left
                    )));
                }
            }
        }
    };
}

pub fn fail<T>(message: impl Into<String>) -> CheckResult<T> {
    Err(CheckFailure::Assertion(message.into()))
}

/// Comprueba solo el código de estado de una respuesta cruda
pub fn assert_status_code(response: &ApiResponse, expected: u16) -> CheckResult {
    if response.status.as_u16() != expected {
        return fail(format!(
            "Se esperaba el estado {}, llegó {}. Respuesta: {}",
            expected,
            response.status.as_u16(),
            response.text()
        ));
    }
    Ok(())
}

/// Comprueba estado y claves del JSON. Un cuerpo vacío solo vale con 200 o 404.
pub fn assert_response(response: &ApiResponse, expected: u16, expected_keys: &[&str]) -> CheckResult<Value> {
    assert_status_code(response, expected)?;
    if response.is_empty() {
        if expected == 200 || expected == 404 {
            return Ok(Value::Object(Default::default()));
        }
        return fail(format!("Cuerpo vacío con estado {}", expected));
    }
    let json: Value = serde_json::from_str(response.text().trim()).map_err(|e| {
        CheckFailure::Assertion(format!(
            "No se pudo parsear la respuesta como JSON: {}. Respuesta: {}",
            e,
            crate::utils::logger::truncate(response.text(), 200)
        ))
    })?;
    for key in expected_keys {
        if json.get(key).is_none() {
            return fail(format!("Falta la clave '{}' en la respuesta: {}", key, json));
        }
    }
    Ok(json)
}

/// Exige que la llamada haya fallado con la categoría indicada
pub fn expect_failure<T: Debug>(result: Result<T, ApiError>, kind: FailureKind) -> CheckResult<ApiError> {
    match result {
        Ok(value) => fail(format!("Se esperaba un fallo '{}', la llamada tuvo éxito: {:?}", kind, value)),
        Err(err) if err.kind() == kind => Ok(err),
        Err(err) => fail(format!("Se esperaba un fallo '{}', llegó '{}': {}", kind, err.kind(), err)),
    }
}

/// Exige que el servidor haya respondido con un código concreto
pub fn expect_status<T: Debug>(result: Result<T, ApiError>, expected: u16) -> CheckResult<ApiError> {
    let expected_status = StatusCode::from_u16(expected)
        .map_err(|e| CheckFailure::Assertion(format!("código no válido {}: {}", expected, e)))?;
    match result {
        Ok(value) => fail(format!("Se esperaba el estado {}, la llamada tuvo éxito: {:?}", expected, value)),
        Err(err) if err.status() == Some(expected_status) => Ok(err),
        Err(err) => fail(format!("Se esperaba el estado {}, llegó: {}", expected, err)),
    }
}

pub fn assert_error_message(err: &ApiError, expected: ErrorMessage) -> CheckResult {
    match err.api_message() {
        Some(message) if message == expected.as_str() => Ok(()),
        Some(message) => fail(format!("Mensaje de error '{}', se esperaba '{}'", message, expected.as_str())),
        None => fail(format!("La respuesta no trae mensaje de error; se esperaba '{}'", expected.as_str())),
    }
}
