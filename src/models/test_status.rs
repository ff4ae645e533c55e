use serde::{Deserialize, Serialize};
use std::fmt;

/// Estado de ejecución de un caso de prueba, con la grafía exacta de la API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum TestStatus {
    Pass,
    Fail,
    Norun,
    /// Valor que el servidor aceptó pero que no es ninguno de los conocidos
    Other(String),
}

impl TestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            // La API usa "Norun", no "NORUN"
            TestStatus::Norun => "Norun",
            TestStatus::Other(value) => value,
        }
    }

    /// Estados que se pueden fijar con `POST /api/tests/<id>/status`
    pub fn settable() -> [TestStatus; 2] {
        [TestStatus::Pass, TestStatus::Fail]
    }
}

impl From<String> for TestStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PASS" => TestStatus::Pass,
            "FAIL" => TestStatus::Fail,
            "Norun" => TestStatus::Norun,
            _ => TestStatus::Other(value),
        }
    }
}

impl From<TestStatus> for String {
    fn from(status: TestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "✅ PASS"),
            TestStatus::Fail => write!(f, "❌ FAIL"),
            TestStatus::Norun => write!(f, "⏳ Norun"),
            TestStatus::Other(value) => write!(f, "❔ {}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_api_spelling_on_the_wire() {
        assert_eq!(serde_json::to_string(&TestStatus::Norun).unwrap(), "\"Norun\"");
        assert_eq!(serde_json::to_string(&TestStatus::Pass).unwrap(), "\"PASS\"");
        let parsed: TestStatus = serde_json::from_str("\"FAIL\"").unwrap();
        assert_eq!(parsed, TestStatus::Fail);
    }

    #[test]
    fn keeps_unknown_values() {
        let parsed: TestStatus = serde_json::from_str("\"INVALID_STATUS\"").unwrap();
        assert_eq!(parsed, TestStatus::Other("INVALID_STATUS".to_string()));
        assert_eq!(parsed.as_str(), "INVALID_STATUS");
    }
}
