//! Typed call parameters.
//!
//! Each struct serializes into the raw [`Arguments`] map consumed by
//! [`TopvisorClient::execute`](crate::TopvisorClient::execute), so typed and
//! dynamic calls share one validation path.

use crate::operation::Operation;
use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Raw call arguments: argument name to JSON value.
pub type Arguments = Map<String, Value>;

/// Parameters that know which operation they belong to.
pub trait OperationParams: Serialize {
    const OPERATION: Operation;

    fn to_arguments(&self) -> Result<Arguments> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::invalid_request_with_context(
                format!("{} parameters must serialize to an object", Self::OPERATION),
                ErrorContext::new()
                    .with_details(other.to_string())
                    .with_source("params"),
            )),
            Err(e) => Err(Error::invalid_request_with_context(
                format!("{} parameters could not be serialized", Self::OPERATION),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("params"),
            )),
        }
    }
}

/// Cross-cutting pagination, selection, filtering and ordering fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UniversalParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Value>>,
}

/// Date selection for date-bearing operations. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DateSpec {
    /// Arbitrary check dates
    List { dates: Vec<String> },
    /// Inclusive period
    Range { date1: String, date2: String },
}

impl DateSpec {
    pub fn list<I, S>(dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DateSpec::List {
            dates: dates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(date1: impl Into<String>, date2: impl Into<String>) -> Self {
        DateSpec::Range {
            date1: date1.into(),
            date2: date2.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_site_stat: Option<bool>,
    /// 0, 1 or 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_searchers_and_regions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_positions_summary: Option<bool>,
    #[serde(flatten)]
    pub universal: UniversalParams,
}

impl OperationParams for ProjectsParams {
    const OPERATION: Operation = Operation::GetProjects;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorsParams {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_project: Option<bool>,
    #[serde(flatten)]
    pub universal: UniversalParams,
}

impl CompetitorsParams {
    pub fn new(project_id: i64) -> Self {
        Self {
            project_id,
            only_enabled: None,
            include_project: None,
            universal: UniversalParams::default(),
        }
    }
}

impl OperationParams for CompetitorsParams {
    const OPERATION: Operation = Operation::GetCompetitors;
}

/// Position check history.
///
/// Returned keyword fields are selected through `universal.fields`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryParams {
    pub project_id: i64,
    pub regions_indexes: Vec<i64>,
    #[serde(flatten)]
    pub dates: DateSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitors_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_range: Option<i64>,
    /// At most 31
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_dates: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_exists_first_date: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_headers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_exists_dates: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_visitors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_top_by_depth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_dynamic: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_positions: Option<Vec<[i64; 2]>>,
    #[serde(flatten)]
    pub universal: UniversalParams,
}

impl HistoryParams {
    pub fn new(project_id: i64, regions_indexes: Vec<i64>, dates: DateSpec) -> Self {
        Self {
            project_id,
            regions_indexes,
            dates,
            competitors_ids: None,
            type_range: None,
            count_dates: None,
            only_exists_first_date: None,
            show_headers: None,
            show_exists_dates: None,
            show_visitors: None,
            show_top_by_depth: None,
            positions_fields: None,
            filter_by_dynamic: None,
            filter_by_positions: None,
            universal: UniversalParams::default(),
        }
    }
}

impl OperationParams for HistoryParams {
    const OPERATION: Operation = Operation::GetHistory;
}

/// Summary between two check dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryParams {
    pub project_id: i64,
    pub region_index: i64,
    pub dates: [String; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_dynamics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_tops: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_avg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_visibility: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_median: Option<bool>,
    #[serde(flatten)]
    pub universal: UniversalParams,
}

impl SummaryParams {
    pub fn new(
        project_id: i64,
        region_index: i64,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self {
            project_id,
            region_index,
            dates: [first.into(), second.into()],
            competitor_id: None,
            show_dynamics: None,
            show_tops: None,
            show_avg: None,
            show_visibility: None,
            show_median: None,
            universal: UniversalParams::default(),
        }
    }
}

impl OperationParams for SummaryParams {
    const OPERATION: Operation = Operation::GetSummary;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryChartParams {
    pub project_id: i64,
    pub region_index: i64,
    #[serde(flatten)]
    pub dates: DateSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitors_ids: Option<Vec<i64>>,
    /// Defaults to 2 on the wire when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_range: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_tops: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_avg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_visibility: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_median: Option<bool>,
    #[serde(flatten)]
    pub universal: UniversalParams,
}

impl SummaryChartParams {
    pub fn new(project_id: i64, region_index: i64, dates: DateSpec) -> Self {
        Self {
            project_id,
            region_index,
            dates,
            competitors_ids: None,
            type_range: None,
            show_tops: None,
            show_avg: None,
            show_visibility: None,
            show_median: None,
            universal: UniversalParams::default(),
        }
    }
}

impl OperationParams for SummaryChartParams {
    const OPERATION: Operation = Operation::GetSummaryChart;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchersRegionsParams {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searcher_key: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_key: Option<i64>,
    /// 0 desktop, 1 tablet, 2 mobile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(flatten)]
    pub universal: UniversalParams,
}

impl SearchersRegionsParams {
    pub fn new(project_id: i64) -> Self {
        Self {
            project_id,
            searcher_key: None,
            region_key: None,
            device: None,
            region_name: None,
            universal: UniversalParams::default(),
        }
    }
}

impl OperationParams for SearchersRegionsParams {
    const OPERATION: Operation = Operation::GetSearchersRegions;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckerPriceParams {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions_indexes: Option<Vec<i64>>,
    #[serde(flatten)]
    pub universal: UniversalParams,
}

impl CheckerPriceParams {
    pub fn new(project_id: i64) -> Self {
        Self {
            project_id,
            regions_indexes: None,
            universal: UniversalParams::default(),
        }
    }
}

impl OperationParams for CheckerPriceParams {
    const OPERATION: Operation = Operation::GetCheckerPrice;
}
