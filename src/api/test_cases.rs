//! Cliente de gestión de casos de prueba

use std::collections::BTreeMap;
use std::fmt::Display;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::api::base::BaseClient;
use crate::api::session::Session;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateTestRequest, CreateTestResponse, DeleteTestResponse, SetTestStatusResponse, TestCase,
    TestListPage, TestStatus, TestStatusRequest, UpdateTestRequest, Validate,
};

#[derive(Debug, Clone)]
pub struct TestCasesClient {
    base: BaseClient,
}

/// Resultado de recorrer todas las páginas del listado
#[derive(Debug, Clone)]
pub struct PageWalk {
    pub size: u32,
    /// `total` informado por la primera página
    pub total: u64,
    pub pages: Vec<TestListPage>,
}

impl PageWalk {
    /// Unión de todas las páginas, sin duplicados por id
    pub fn unique_cases(&self) -> BTreeMap<i64, TestCase> {
        self.pages
            .iter()
            .flat_map(|p| p.tests.iter())
            .map(|t| (t.id, t.clone()))
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|p| p.tests.len()).sum()
    }
}

impl TestCasesClient {
    pub fn new(base: BaseClient) -> Self {
        TestCasesClient { base }
    }

    pub fn base(&self) -> &BaseClient {
        &self.base
    }

    /// `GET /api/tests?page=<int>&size=<int>` (por defecto page 0, size 20)
    pub fn get_test_list(
        &self,
        session: &mut Session,
        page: Option<u32>,
        size: Option<u32>,
    ) -> ApiResult<TestListPage> {
        let mut query = Vec::new();
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = size {
            query.push(("size", size.to_string()));
        }
        let url = self.base.settings().tests_url();
        let response = self.base.get(session, &url, &query)?.error_for_status()?;
        debug!("Listado de casos, estado: {}", response.status);
        response.parse("test list")
    }

    /// Recorre las `ceil(total / size)` páginas a partir de la 0. Sin casos no hay páginas.
    pub fn collect_all_pages(&self, session: &mut Session, size: u32) -> ApiResult<PageWalk> {
        if size == 0 {
            return Err(ApiError::InvalidRequest("size debe ser mayor que 0".to_string()));
        }
        let first = self.get_test_list(session, Some(0), Some(size))?;
        let total = first.total;
        let page_count = TestListPage::page_count(total, size);
        if page_count == 0 {
            return Ok(PageWalk {
                size,
                total,
                pages: Vec::new(),
            });
        }

        let mut pages = vec![first];
        for page in 1..page_count {
            let page = u32::try_from(page)
                .map_err(|_| ApiError::InvalidRequest(format!("página fuera de rango: {}", page)))?;
            let current = self.get_test_list(session, Some(page), Some(size))?;
            if current.total != total {
                warn!(
                    "El total cambió durante el recorrido: {} -> {}",
                    total, current.total
                );
            }
            pages.push(current);
        }
        Ok(PageWalk { size, total, pages })
    }

    /// `POST /api/tests/new`, responde 201 con `{"test_id": int}`
    pub fn create_test(
        &self,
        session: &mut Session,
        name: &str,
        description: &str,
    ) -> ApiResult<CreateTestResponse> {
        session.require_login("create_test")?;
        let request = CreateTestRequest::new(name, description);
        request.validate().map_err(ApiError::InvalidRequest)?;

        let url = self.base.settings().tests_new_url();
        let response = self.base.post(session, &url, &request)?.error_for_status()?;
        debug!("Creación de caso, estado: {}", response.status);
        if response.status != StatusCode::CREATED {
            warn!("Se esperaba 201 al crear, llegó {}", response.status);
        }
        response.parse("create test")
    }

    /// `GET /api/tests/<id>`
    pub fn get_test_by_id(&self, session: &mut Session, test_id: impl Display) -> ApiResult<TestCase> {
        let url = self.base.settings().test_url(&test_id.to_string());
        let response = self.base.get(session, &url, &[])?.error_for_status()?;
        debug!("Lectura del caso {}, estado: {}", test_id, response.status);
        response.parse("test case")
    }

    /// Actualización completa (`PUT`): nombre y descripción obligatorios
    pub fn update_test(
        &self,
        session: &mut Session,
        test_id: impl Display,
        name: &str,
        description: &str,
    ) -> ApiResult<TestCase> {
        session.require_login("update_test")?;
        let request = UpdateTestRequest::full(name, description);
        request.validate().map_err(ApiError::InvalidRequest)?;

        let url = self.base.settings().test_url(&test_id.to_string());
        let response = self.base.put(session, &url, &request)?.error_for_status()?;
        debug!("Actualización completa del caso {}, estado: {}", test_id, response.status);
        response.parse("update test")
    }

    /// Actualización parcial (`PATCH`): solo se envían los campos presentes
    pub fn partial_update_test(
        &self,
        session: &mut Session,
        test_id: impl Display,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ApiResult<TestCase> {
        session.require_login("partial_update_test")?;
        let request = UpdateTestRequest::partial(
            name.map(str::to_string),
            description.map(str::to_string),
        );
        request.validate().map_err(ApiError::InvalidRequest)?;

        let url = self.base.settings().test_url(&test_id.to_string());
        let response = self.base.patch(session, &url, &request)?.error_for_status()?;
        debug!("Actualización parcial del caso {}, estado: {}", test_id, response.status);
        response.parse("partial update test")
    }

    /// `POST /api/tests/<id>/status`, responde `{"runId": int}`
    pub fn set_test_status(
        &self,
        session: &mut Session,
        test_id: impl Display,
        status: &TestStatus,
    ) -> ApiResult<SetTestStatusResponse> {
        session.require_login("set_test_status")?;
        let request = TestStatusRequest { status: status.clone() };

        let url = self.base.settings().test_status_url(&test_id.to_string());
        let response = self.base.post(session, &url, &request)?.error_for_status()?;
        debug!("Estado del caso {} -> {}: {}", test_id, status.as_str(), response.status);
        response.parse("set test status")
    }

    /// `DELETE /api/tests/<id>`, responde `{"status": "deleted"}`
    pub fn delete_test(&self, session: &mut Session, test_id: impl Display) -> ApiResult<DeleteTestResponse> {
        session.require_login("delete_test")?;
        let url = self.base.settings().test_url(&test_id.to_string());
        let response = self.base.delete(session, &url)?.error_for_status()?;
        debug!("Borrado del caso {}, estado: {}", test_id, response.status);
        response.parse("delete test")
    }
}
