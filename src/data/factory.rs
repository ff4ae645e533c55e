//! Generador de datos de prueba

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::models::{TestStatus, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};

const WORDS: &[&str] = &[
    "login", "checkout", "payment", "profile", "search", "report", "session", "token",
    "upload", "export", "filter", "dashboard", "invoice", "password", "email", "settings",
    "validates", "renders", "rejects", "accepts", "stores", "returns", "updates", "deletes",
    "quickly", "correctly", "again", "safely", "after", "before", "with", "without",
];

/// Nombre y descripción listos para crear un caso
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseData {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TestDataFactory;

impl TestDataFactory {
    /// Nombre único: prefijo, milisegundos y un fragmento de UUID.
    ///
    /// El fragmento de UUID distingue nombres generados en el mismo
    /// milisegundo; el servicio rechaza nombres repetidos.
    pub fn generate_test_name(prefix: &str) -> String {
        let timestamp = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4()
            .to_string()
            .split('-')
            .next()
            .unwrap_or("tc")
            .to_string();
        let tail = format!(" {}-{}", timestamp, suffix);
        let budget = NAME_MAX_LEN.saturating_sub(tail.chars().count());
        let prefix: String = prefix.chars().take(budget).collect();
        format!("{}{}", prefix, tail)
    }

    /// Descripción `"<acción> - <frase aleatoria>"`
    pub fn generate_test_description(action: &str) -> String {
        let description = format!("{} - {}", action, Self::sentence());
        description.chars().take(DESCRIPTION_MAX_LEN).collect()
    }

    pub fn generate_random_test_data() -> TestCaseData {
        TestCaseData {
            name: Self::generate_test_name("API Test"),
            description: Self::generate_test_description("Testing API"),
        }
    }

    /// PASS o FAIL al azar
    pub fn random_status() -> TestStatus {
        let statuses = TestStatus::settable();
        let mut rng = rand::thread_rng();
        statuses
            .choose(&mut rng)
            .cloned()
            .unwrap_or(TestStatus::Pass)
    }

    fn sentence() -> String {
        let mut rng = rand::thread_rng();
        let count = rng.gen_range(4..=9);
        let words: Vec<&str> = (0..count)
            .filter_map(|_| WORDS.choose(&mut rng).copied())
            .collect();
        let mut sentence = words.join(" ");
        if let Some(first) = sentence.get(0..1) {
            sentence = format!("{}{}.", first.to_uppercase(), &sentence[1..]);
        }
        sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTestRequest, Validate};

    #[test]
    fn generated_data_satisfies_request_constraints() {
        for _ in 0..50 {
            let data = TestDataFactory::generate_random_test_data();
            let request = CreateTestRequest::new(data.name, data.description);
            assert!(request.validate().is_ok(), "{:?}", request);
        }
    }

    #[test]
    fn names_are_unique_and_prefixed() {
        let a = TestDataFactory::generate_test_name("Updated Test");
        let b = TestDataFactory::generate_test_name("Updated Test");
        assert!(a.starts_with("Updated Test "));
        assert_ne!(a, b);
    }

    #[test]
    fn long_prefix_is_cut_to_fit() {
        let name = TestDataFactory::generate_test_name(&"P".repeat(300));
        assert_eq!(name.chars().count(), NAME_MAX_LEN);
    }

    #[test]
    fn description_keeps_action() {
        let description = TestDataFactory::generate_test_description("Checking login");
        assert!(description.starts_with("Checking login - "));
        assert!(description.ends_with('.'));
    }

    #[test]
    fn random_status_is_settable() {
        for _ in 0..20 {
            assert!(TestStatus::settable().contains(&TestDataFactory::random_status()));
        }
    }
}
