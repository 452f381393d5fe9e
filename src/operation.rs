//! Operation descriptors: the static table describing every callable operation.
//!
//! Each [`Operation`] maps to exactly one service endpoint, one set of required and
//! optional parameters, one date rule and one response encoding. The table is
//! immutable and shared by every client.

use crate::{Error, ErrorContext, Result};
use std::fmt;
use std::str::FromStr;

/// Allowed `type_range` codes (date-range type).
pub const TYPE_RANGES: &[i64] = &[0, 1, 2, 3, 4, 5, 6, 7, 100];
/// Allowed `device` codes: desktop, tablet, mobile.
pub const DEVICES: &[i64] = &[0, 1, 2];
/// Allowed `show_searchers_and_regions` levels.
pub const SEARCHERS_AND_REGIONS_LEVELS: &[i64] = &[0, 1, 2];
/// Allowed `positions_fields` columns.
pub const POSITIONS_FIELDS: &[&str] = &["position", "snippet", "relevant_url", "visitors"];
/// Allowed `filter_by_dynamic` markers.
pub const DYNAMIC_MARKERS: &[&str] = &[">", "<", "="];

/// Remote service an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Projects,
    Positions,
}

impl Service {
    pub const ALL: [Service; 2] = [Service::Projects, Service::Positions];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Projects => "projects",
            Service::Positions => "positions",
        }
    }

    /// Path prefix shared by every endpoint of the service.
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Service::Projects => "/v2/json/get/projects_2",
            Service::Positions => "/v2/json/get/positions_2",
        }
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Service::ALL
            .into_iter()
            .find(|service| service.name() == s)
            .ok_or_else(|| {
                Error::invalid_request_with_context(
                    format!("Unknown service: {}", s),
                    ErrorContext::new()
                        .with_field_path("service")
                        .with_details(s)
                        .with_source("dispatcher"),
                )
            })
    }
}

/// How a response body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseEncoding {
    /// JSON document with `result` and optional `errors`
    Structured,
    /// Semicolon-separated Windows-1251 text export
    DelimitedText,
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    /// Integer within an inclusive range
    BoundedInteger { min: i64, max: i64 },
    /// Boolean on the caller side, 0/1 on the wire
    Boolean,
    Text,
    IntegerList,
    TextList,
    /// Integer drawn from a fixed set of codes
    IntegerEnum(&'static [i64]),
    /// List of strings drawn from a fixed set
    TextEnumList(&'static [&'static str]),
    /// List of `[from, to]` integer pairs
    IntegerPairList,
}

impl ParamKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Integer | ParamKind::BoundedInteger { .. } | ParamKind::IntegerEnum(_) => {
                "integer"
            }
            ParamKind::Boolean => "boolean",
            ParamKind::Text => "string",
            ParamKind::IntegerList => "list of integers",
            ParamKind::TextList | ParamKind::TextEnumList(_) => "list of strings",
            ParamKind::IntegerPairList => "list of integer pairs",
        }
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Caller-facing argument name
    pub name: &'static str,
    /// Key used in the request body
    pub wire: &'static str,
    pub kind: ParamKind,
    /// Value inserted when an optional parameter is absent
    pub default: Option<i64>,
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            wire: name,
            kind,
            default: None,
        }
    }

    const fn renamed(mut self, wire: &'static str) -> Self {
        self.wire = wire;
        self
    }

    const fn with_default(mut self, default: i64) -> Self {
        self.default = Some(default);
        self
    }
}

/// Which date representation an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// Operation takes no dates
    None,
    /// Exactly one of `dates` or the pair `date1`/`date2`
    ListOrRange,
    /// `dates` with exactly two entries; the pair form is rejected
    ExactPair,
}

/// Immutable description of one operation.
#[derive(Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub operation: Operation,
    pub service: Service,
    /// Endpoint path relative to the service prefix
    pub endpoint: &'static str,
    pub required: &'static [ParamSpec],
    pub optional: &'static [ParamSpec],
    pub dates: DateRule,
    pub encoding: ResponseEncoding,
}

impl OperationDescriptor {
    /// Full endpoint path (service prefix + endpoint).
    pub fn endpoint_path(&self) -> String {
        format!("{}{}", self.service.path_prefix(), self.endpoint)
    }

    /// Looks up a declared parameter, required or optional.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|spec| spec.name == name)
    }
}

/// Every operation the client can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetProjects,
    GetCompetitors,
    GetHistory,
    GetSummary,
    GetSummaryChart,
    GetSearchersRegions,
    GetCheckerPrice,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::GetProjects,
        Operation::GetCompetitors,
        Operation::GetHistory,
        Operation::GetSummary,
        Operation::GetSummaryChart,
        Operation::GetSearchersRegions,
        Operation::GetCheckerPrice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::GetProjects => "get_projects",
            Operation::GetCompetitors => "get_competitors",
            Operation::GetHistory => "get_history",
            Operation::GetSummary => "get_summary",
            Operation::GetSummaryChart => "get_summary_chart",
            Operation::GetSearchersRegions => "get_searchers_regions",
            Operation::GetCheckerPrice => "get_checker_price",
        }
    }

    pub fn descriptor(&self) -> &'static OperationDescriptor {
        match self {
            Operation::GetProjects => &GET_PROJECTS,
            Operation::GetCompetitors => &GET_COMPETITORS,
            Operation::GetHistory => &GET_HISTORY,
            Operation::GetSummary => &GET_SUMMARY,
            Operation::GetSummaryChart => &GET_SUMMARY_CHART,
            Operation::GetSearchersRegions => &GET_SEARCHERS_REGIONS,
            Operation::GetCheckerPrice => &GET_CHECKER_PRICE,
        }
    }

    pub fn service(&self) -> Service {
        self.descriptor().service
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| {
                Error::invalid_request_with_context(
                    format!("Unknown operation: {}", s),
                    ErrorContext::new()
                        .with_field_path("operation")
                        .with_details(s)
                        .with_source("dispatcher"),
                )
            })
    }
}

const PROJECT_ID: ParamSpec = ParamSpec::new("project_id", ParamKind::Integer);
const REGION_INDEX: ParamSpec = ParamSpec::new("region_index", ParamKind::Integer);
const REGIONS_INDEXES: ParamSpec = ParamSpec::new("regions_indexes", ParamKind::IntegerList);
const COMPETITORS_IDS: ParamSpec = ParamSpec::new("competitors_ids", ParamKind::IntegerList);
const SHOW_TOPS: ParamSpec = ParamSpec::new("show_tops", ParamKind::Boolean);
const SHOW_AVG: ParamSpec = ParamSpec::new("show_avg", ParamKind::Boolean);
const SHOW_VISIBILITY: ParamSpec = ParamSpec::new("show_visibility", ParamKind::Boolean);
const SHOW_MEDIAN: ParamSpec = ParamSpec::new("show_median", ParamKind::Boolean);

static GET_PROJECTS: OperationDescriptor = OperationDescriptor {
    operation: Operation::GetProjects,
    service: Service::Projects,
    endpoint: "/projects",
    required: &[],
    optional: &[
        ParamSpec::new("show_site_stat", ParamKind::Boolean),
        ParamSpec::new(
            "show_searchers_and_regions",
            ParamKind::IntegerEnum(SEARCHERS_AND_REGIONS_LEVELS),
        ),
        ParamSpec::new("include_positions_summary", ParamKind::Boolean),
    ],
    dates: DateRule::None,
    encoding: ResponseEncoding::Structured,
};

static GET_COMPETITORS: OperationDescriptor = OperationDescriptor {
    operation: Operation::GetCompetitors,
    service: Service::Projects,
    endpoint: "/competitors",
    required: &[PROJECT_ID],
    optional: &[
        ParamSpec::new("only_enabled", ParamKind::Boolean),
        ParamSpec::new("include_project", ParamKind::Boolean),
    ],
    dates: DateRule::None,
    encoding: ResponseEncoding::Structured,
};

static GET_HISTORY: OperationDescriptor = OperationDescriptor {
    operation: Operation::GetHistory,
    service: Service::Positions,
    endpoint: "/history",
    required: &[PROJECT_ID, REGIONS_INDEXES],
    optional: &[
        ParamSpec::new("fields", ParamKind::TextList),
        COMPETITORS_IDS,
        ParamSpec::new("type_range", ParamKind::IntegerEnum(TYPE_RANGES)),
        ParamSpec::new("count_dates", ParamKind::BoundedInteger { min: 1, max: 31 }),
        ParamSpec::new("only_exists_first_date", ParamKind::Boolean),
        ParamSpec::new("show_headers", ParamKind::Boolean),
        ParamSpec::new("show_exists_dates", ParamKind::Boolean),
        ParamSpec::new("show_visitors", ParamKind::Boolean),
        ParamSpec::new("show_top_by_depth", ParamKind::Integer),
        ParamSpec::new("positions_fields", ParamKind::TextEnumList(POSITIONS_FIELDS)),
        ParamSpec::new("filter_by_dynamic", ParamKind::TextEnumList(DYNAMIC_MARKERS)),
        ParamSpec::new("filter_by_positions", ParamKind::IntegerPairList),
    ],
    dates: DateRule::ListOrRange,
    encoding: ResponseEncoding::Structured,
};

static GET_SUMMARY: OperationDescriptor = OperationDescriptor {
    operation: Operation::GetSummary,
    service: Service::Positions,
    endpoint: "/summary",
    required: &[PROJECT_ID, REGION_INDEX],
    optional: &[
        ParamSpec::new("competitor_id", ParamKind::Integer),
        ParamSpec::new("show_dynamics", ParamKind::Boolean),
        SHOW_TOPS,
        SHOW_AVG,
        SHOW_VISIBILITY,
        SHOW_MEDIAN,
    ],
    dates: DateRule::ExactPair,
    encoding: ResponseEncoding::Structured,
};

static GET_SUMMARY_CHART: OperationDescriptor = OperationDescriptor {
    operation: Operation::GetSummaryChart,
    service: Service::Positions,
    endpoint: "/summary/chart",
    required: &[PROJECT_ID, REGION_INDEX],
    optional: &[
        COMPETITORS_IDS,
        ParamSpec::new("type_range", ParamKind::IntegerEnum(TYPE_RANGES)).with_default(2),
        SHOW_TOPS,
        SHOW_AVG,
        SHOW_VISIBILITY,
        SHOW_MEDIAN,
    ],
    dates: DateRule::ListOrRange,
    encoding: ResponseEncoding::Structured,
};

static GET_SEARCHERS_REGIONS: OperationDescriptor = OperationDescriptor {
    operation: Operation::GetSearchersRegions,
    service: Service::Positions,
    endpoint: "/searchers/regions/export",
    required: &[PROJECT_ID],
    optional: &[
        ParamSpec::new("searcher_key", ParamKind::Integer),
        ParamSpec::new("region_key", ParamKind::Integer),
        ParamSpec::new("device", ParamKind::IntegerEnum(DEVICES)),
        ParamSpec::new("region_name", ParamKind::Text).renamed("region.name"),
    ],
    dates: DateRule::None,
    encoding: ResponseEncoding::DelimitedText,
};

static GET_CHECKER_PRICE: OperationDescriptor = OperationDescriptor {
    operation: Operation::GetCheckerPrice,
    service: Service::Positions,
    endpoint: "/checker/price",
    required: &[PROJECT_ID],
    optional: &[REGIONS_INDEXES],
    dates: DateRule::None,
    encoding: ResponseEncoding::Structured,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_round_trips_through_its_name() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
            assert_eq!(op.descriptor().operation, op);
        }
    }

    #[test]
    fn unknown_operation_names_the_operation() {
        let err = "get_everything".parse::<Operation>().unwrap_err();
        assert!(err.to_string().contains("get_everything"));
        let ctx = err.context().unwrap();
        assert_eq!(ctx.field_path.as_deref(), Some("operation"));
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(
            Operation::GetProjects.descriptor().endpoint_path(),
            "/v2/json/get/projects_2/projects"
        );
        assert_eq!(
            Operation::GetSummaryChart.descriptor().endpoint_path(),
            "/v2/json/get/positions_2/summary/chart"
        );
        assert_eq!(
            Operation::GetSearchersRegions.descriptor().endpoint_path(),
            "/v2/json/get/positions_2/searchers/regions/export"
        );
    }

    #[test]
    fn only_the_regions_export_is_delimited_text() {
        for op in Operation::ALL {
            let expected = if op == Operation::GetSearchersRegions {
                ResponseEncoding::DelimitedText
            } else {
                ResponseEncoding::Structured
            };
            assert_eq!(op.descriptor().encoding, expected, "{op}");
        }
    }

    #[test]
    fn region_name_is_renamed_on_the_wire() {
        let spec = Operation::GetSearchersRegions
            .descriptor()
            .param("region_name")
            .unwrap();
        assert_eq!(spec.wire, "region.name");
    }

    #[test]
    fn services_parse_by_name() {
        assert_eq!("positions".parse::<Service>().unwrap(), Service::Positions);
        assert!("keywords".parse::<Service>().is_err());
    }
}
