//! Typed operation methods.

use crate::client::core::TopvisorClient;
use crate::client::decode::{DecodedResponse, StructuredResponse};
use crate::params::{
    CheckerPriceParams, CompetitorsParams, HistoryParams, OperationParams, ProjectsParams,
    SearchersRegionsParams, SummaryChartParams, SummaryParams,
};
use crate::Result;

impl TopvisorClient {
    async fn call<P: OperationParams>(&self, params: &P) -> Result<DecodedResponse> {
        let args = params.to_arguments()?;
        self.execute_operation(P::OPERATION, &args).await
    }

    /// `get/projects_2/projects`
    pub async fn get_projects(&self, params: &ProjectsParams) -> Result<StructuredResponse> {
        self.call(params).await?.into_structured()
    }

    /// `get/projects_2/competitors`
    pub async fn get_competitors(&self, params: &CompetitorsParams) -> Result<StructuredResponse> {
        self.call(params).await?.into_structured()
    }

    /// `get/positions_2/history`
    pub async fn get_history(&self, params: &HistoryParams) -> Result<StructuredResponse> {
        self.call(params).await?.into_structured()
    }

    /// `get/positions_2/summary`
    pub async fn get_summary(&self, params: &SummaryParams) -> Result<StructuredResponse> {
        self.call(params).await?.into_structured()
    }

    /// `get/positions_2/summary/chart`
    pub async fn get_summary_chart(
        &self,
        params: &SummaryChartParams,
    ) -> Result<StructuredResponse> {
        self.call(params).await?.into_structured()
    }

    /// `get/positions_2/searchers/regions/export`, returned as rows of cells.
    pub async fn get_searchers_regions(
        &self,
        params: &SearchersRegionsParams,
    ) -> Result<Vec<Vec<String>>> {
        self.call(params).await?.into_rows()
    }

    /// `get/positions_2/checker/price`
    pub async fn get_checker_price(
        &self,
        params: &CheckerPriceParams,
    ) -> Result<StructuredResponse> {
        self.call(params).await?.into_structured()
    }
}
