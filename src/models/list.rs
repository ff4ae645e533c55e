use serde::{Deserialize, Serialize};

use crate::models::{TestCase, Validate};

pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Página de `GET /api/tests`. Las páginas empiezan en 0.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestListPage {
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub tests: Vec<TestCase>,
}

impl TestListPage {
    /// Número de páginas necesarias para cubrir `total` con páginas de `size`
    pub fn page_count(total: u64, size: u32) -> u64 {
        if size == 0 {
            return 0;
        }
        total.div_ceil(size as u64)
    }
}

impl Validate for TestListPage {
    fn validate(&self) -> Result<(), String> {
        if self.tests.len() > self.size as usize {
            return Err(format!(
                "la página trae {} casos y el tamaño es {}",
                self.tests.len(),
                self.size
            ));
        }
        for test in &self.tests {
            test.validate().map_err(|e| format!("caso {}: {}", test.id, e))?;
        }
        Ok(())
    }
}
