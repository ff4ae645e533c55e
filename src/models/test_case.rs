use serde::{Deserialize, Serialize};

use crate::models::{TestStatus, Validate};

/// Límites del modelo Django del servicio
pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Caso de prueba completo.
///
/// `GET` devuelve todos los campos; `PUT`/`PATCH` omiten `status` y `executor`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestCase {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub author: String,
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub status: Option<TestStatus>,
}

impl Validate for TestCase {
    fn validate(&self) -> Result<(), String> {
        check_length("name", &self.name, 0, NAME_MAX_LEN)?;
        check_length("description", &self.description, 0, DESCRIPTION_MAX_LEN)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateTestRequest {
    pub name: String,
    pub description: String,
}

impl CreateTestRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

impl Validate for CreateTestRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("name", &self.name, 1, NAME_MAX_LEN)?;
        check_length("description", &self.description, 1, DESCRIPTION_MAX_LEN)
    }
}

/// Respuesta de `POST /api/tests/new`: solo el id, `{"test_id": 537}`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CreateTestResponse {
    pub test_id: i64,
}

/// Cuerpo de `PUT` y `PATCH`. En `PATCH` solo viajan los campos presentes.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct UpdateTestRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateTestRequest {
    /// Actualización completa: ambos campos son obligatorios
    pub fn full(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
        }
    }

    pub fn partial(name: Option<String>, description: Option<String>) -> Self {
        Self { name, description }
    }

    pub fn is_full(&self) -> bool {
        self.name.is_some() && self.description.is_some()
    }
}

impl Validate for UpdateTestRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_none() && self.description.is_none() {
            return Err("se requiere al menos name o description".to_string());
        }
        if let Some(name) = &self.name {
            check_length("name", name, 1, NAME_MAX_LEN)?;
        }
        if let Some(description) = &self.description {
            check_length("description", description, 1, DESCRIPTION_MAX_LEN)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestStatusRequest {
    pub status: TestStatus,
}

/// Respuesta de `POST /api/tests/<id>/status`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SetTestStatusResponse {
    #[serde(rename = "runId")]
    pub run_id: i64,
}

/// Respuesta de `DELETE /api/tests/<id>`: `{"status": "deleted"}`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DeleteTestResponse {
    pub status: String,
}

impl DeleteTestResponse {
    pub fn is_deleted(&self) -> bool {
        self.status == "deleted"
    }
}

impl Validate for CreateTestResponse {
    fn validate(&self) -> Result<(), String> {
        if self.test_id <= 0 {
            return Err(format!("test_id no válido: {}", self.test_id));
        }
        Ok(())
    }
}

impl Validate for SetTestStatusResponse {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Validate for DeleteTestResponse {
    fn validate(&self) -> Result<(), String> {
        if !self.is_deleted() {
            return Err(format!("se esperaba status 'deleted', llegó '{}'", self.status));
        }
        Ok(())
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        return Err(format!("{} no puede estar vacío", field));
    }
    if len > max {
        return Err(format!("{} excede {} caracteres ({})", field, max, len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_enforces_limits() {
        assert!(CreateTestRequest::new("A".repeat(100), "D".repeat(1000)).validate().is_ok());
        assert!(CreateTestRequest::new("A".repeat(101), "ok").validate().is_err());
        assert!(CreateTestRequest::new("ok", "D".repeat(1001)).validate().is_err());
        assert!(CreateTestRequest::new("", "ok").validate().is_err());
        assert!(CreateTestRequest::new("ok", "").validate().is_err());
    }

    #[test]
    fn partial_update_skips_missing_fields() {
        let patch = UpdateTestRequest::partial(None, Some("nueva".to_string()));
        assert!(patch.validate().is_ok());
        assert!(!patch.is_full());
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"description": "nueva"}));

        assert!(UpdateTestRequest::partial(None, None).validate().is_err());
    }

    #[test]
    fn parses_get_and_update_shapes() {
        let get: TestCase = serde_json::from_value(serde_json::json!({
            "id": 7, "name": "n", "description": "d", "author": "qa",
            "status": "Norun", "executor": null
        }))
        .unwrap();
        assert_eq!(get.status, Some(TestStatus::Norun));
        assert!(get.executor.is_none());

        let put: TestCase = serde_json::from_value(serde_json::json!({
            "id": 7, "name": "n", "description": "d", "author": "qa"
        }))
        .unwrap();
        assert!(put.status.is_none());
    }

    #[test]
    fn run_id_uses_camel_case() {
        let parsed: SetTestStatusResponse = serde_json::from_str(r#"{"runId": 12}"#).unwrap();
        assert_eq!(parsed.run_id, 12);
    }
}
