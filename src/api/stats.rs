use tracing::debug;

use crate::api::base::BaseClient;
use crate::api::session::Session;
use crate::error::ApiResult;
use crate::models::Statistics;

/// Cliente del endpoint de estadísticas
#[derive(Debug, Clone)]
pub struct StatsClient {
    base: BaseClient,
}

impl StatsClient {
    pub fn new(base: BaseClient) -> Self {
        StatsClient { base }
    }

    pub fn base(&self) -> &BaseClient {
        &self.base
    }

    pub fn get_statistics(&self, session: &mut Session) -> ApiResult<Statistics> {
        let url = self.base.settings().stats_url();
        let response = self.base.get(session, &url, &[])?.error_for_status()?;
        debug!("Estadísticas, estado: {}", response.status);
        response.parse("statistics")
    }
}
