//! Request payload construction.
//!
//! One builder function per operation turns [`ValidatedArgs`] into an ordered
//! [`Payload`]; [`apply_universal_params`] then merges the cross-cutting fields.
//! Builders are pure: no I/O, no logging.

use crate::client::validation::{DateSelection, ValidatedArgs};
use crate::operation::Operation;
use crate::params::Arguments;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

const SOURCE: &str = "payload_builder";

/// Container type a universal parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniversalKind {
    Integer,
    List,
    Mapping,
}

impl UniversalKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            UniversalKind::Integer => value.as_i64().is_some(),
            UniversalKind::List => value.is_array(),
            UniversalKind::Mapping => value.is_object(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            UniversalKind::Integer => "integer",
            UniversalKind::List => "list",
            UniversalKind::Mapping => "mapping",
        }
    }
}

/// Recognized universal parameters, in merge order.
pub const UNIVERSAL_PARAMS: [(&str, UniversalKind); 6] = [
    ("limit", UniversalKind::Integer),
    ("offset", UniversalKind::Integer),
    ("fields", UniversalKind::List),
    ("filters", UniversalKind::Mapping),
    ("id", UniversalKind::Integer),
    ("orders", UniversalKind::List),
];

/// Canonical request body: wire field name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Inserts only when `key` is not set yet. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, key: &str, value: Value) -> bool {
        if self.0.contains_key(key) {
            return false;
        }
        self.0.insert(key.to_string(), value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload as a JSON object, keys in insertion order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// Accumulates one operation's payload from validated arguments.
struct PayloadWriter<'a> {
    args: &'a ValidatedArgs,
    payload: Payload,
}

impl<'a> PayloadWriter<'a> {
    fn new(args: &'a ValidatedArgs) -> Self {
        Self {
            args,
            payload: Payload::new(),
        }
    }

    fn wire_name(&self, name: &'static str) -> &'static str {
        self.args
            .descriptor()
            .param(name)
            .map(|spec| spec.wire)
            .unwrap_or(name)
    }

    /// Required field, inserted verbatim.
    fn required(&mut self, name: &'static str) -> Result<&mut Self> {
        let value = self.args.get(name).cloned().ok_or_else(|| {
            Error::invalid_parameter(
                name,
                format!("Required parameter '{}' is missing", name),
                SOURCE,
            )
        })?;
        let wire = self.wire_name(name);
        self.payload.insert(wire, value);
        Ok(self)
    }

    /// Optional field, inserted under its wire name when supplied.
    fn optional(&mut self, name: &'static str) -> &mut Self {
        if let Some(value) = self.args.get(name).cloned() {
            let wire = self.wire_name(name);
            self.payload.insert(wire, value);
        }
        self
    }

    /// Optional field falling back to the descriptor default.
    fn optional_or_default(&mut self, name: &'static str) -> &mut Self {
        let value = self.args.get(name).cloned().or_else(|| {
            self.args
                .descriptor()
                .param(name)
                .and_then(|spec| spec.default)
                .map(Value::from)
        });
        if let Some(value) = value {
            let wire = self.wire_name(name);
            self.payload.insert(wire, value);
        }
        self
    }

    /// Optional boolean, written as 0/1.
    fn flag(&mut self, name: &'static str) -> &mut Self {
        if let Some(flag) = self.args.get(name).map(coerce_flag) {
            let wire = self.wire_name(name);
            self.payload.insert(wire, Value::from(flag));
        }
        self
    }

    fn flags(&mut self, names: &[&'static str]) -> &mut Self {
        for &name in names {
            self.flag(name);
        }
        self
    }

    /// The date representation chosen during validation.
    fn dates(&mut self) -> Result<&mut Self> {
        match self.args.dates() {
            Some(DateSelection::List(dates)) => {
                self.payload.insert("dates", Value::from(dates.clone()));
            }
            Some(DateSelection::Range { date1, date2 }) => {
                self.payload.insert("date1", Value::from(date1.as_str()));
                self.payload.insert("date2", Value::from(date2.as_str()));
            }
            None => {
                return Err(Error::invalid_parameter(
                    "dates",
                    "Either 'dates' or both 'date1' and 'date2' must be supplied",
                    SOURCE,
                ))
            }
        }
        Ok(self)
    }

    fn finish(self) -> Payload {
        self.payload
    }
}

/// Wire format has no boolean type.
pub fn coerce_flag(value: &Value) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        other => i64::from(other.as_i64().unwrap_or_default() != 0),
    }
}

const SHOW_FLAGS: [&str; 4] = ["show_tops", "show_avg", "show_visibility", "show_median"];

fn projects_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut w = PayloadWriter::new(args);
    w.flag("show_site_stat")
        .optional("show_searchers_and_regions")
        .flag("include_positions_summary");
    Ok(w.finish())
}

fn competitors_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut w = PayloadWriter::new(args);
    w.required("project_id")?
        .flag("only_enabled")
        .flag("include_project");
    Ok(w.finish())
}

fn history_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut w = PayloadWriter::new(args);
    w.required("project_id")?.required("regions_indexes")?;
    w.dates()?;
    w.optional("fields")
        .optional("competitors_ids")
        .optional("type_range")
        .optional("count_dates")
        .flags(&[
            "only_exists_first_date",
            "show_headers",
            "show_exists_dates",
            "show_visitors",
        ])
        .optional("show_top_by_depth")
        .optional("positions_fields")
        .optional("filter_by_dynamic")
        .optional("filter_by_positions");
    Ok(w.finish())
}

fn summary_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut w = PayloadWriter::new(args);
    w.required("project_id")?.required("region_index")?;
    w.dates()?;
    w.optional("competitor_id")
        .flag("show_dynamics")
        .flags(&SHOW_FLAGS);
    Ok(w.finish())
}

fn summary_chart_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut w = PayloadWriter::new(args);
    w.required("project_id")?.required("region_index")?;
    w.dates()?;
    w.optional("competitors_ids")
        .optional_or_default("type_range")
        .flags(&SHOW_FLAGS);
    Ok(w.finish())
}

fn searchers_regions_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut w = PayloadWriter::new(args);
    w.required("project_id")?
        .optional("searcher_key")
        .optional("region_key")
        .optional("device")
        .optional("region_name");
    Ok(w.finish())
}

fn checker_price_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut w = PayloadWriter::new(args);
    w.required("project_id")?.optional("regions_indexes");
    Ok(w.finish())
}

/// Build the complete payload for validated arguments.
pub fn build_payload(args: &ValidatedArgs) -> Result<Payload> {
    let mut payload = match args.descriptor().operation {
        Operation::GetProjects => projects_payload(args)?,
        Operation::GetCompetitors => competitors_payload(args)?,
        Operation::GetHistory => history_payload(args)?,
        Operation::GetSummary => summary_payload(args)?,
        Operation::GetSummaryChart => summary_chart_payload(args)?,
        Operation::GetSearchersRegions => searchers_regions_payload(args)?,
        Operation::GetCheckerPrice => checker_price_payload(args)?,
    };
    apply_universal_params(&mut payload, args.universal())?;
    Ok(payload)
}

/// Merge universal parameters into a built payload.
///
/// Each supplied parameter must have its container type; fields already set by the
/// operation builder are kept.
pub fn apply_universal_params(payload: &mut Payload, supplied: &Arguments) -> Result<()> {
    for (name, kind) in UNIVERSAL_PARAMS {
        let Some(value) = supplied.get(name).filter(|v| !v.is_null()) else {
            continue;
        };
        if !kind.matches(value) {
            return Err(Error::invalid_parameter(
                name,
                format!(
                    "Parameter '{}' must be of type {}, got {}",
                    name,
                    kind.type_name(),
                    value
                ),
                SOURCE,
            ));
        }
        payload.insert_if_absent(name, value.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::validation::validate;
    use serde_json::json;

    fn build(op: Operation, args: Value) -> Result<Payload> {
        let args = args.as_object().cloned().unwrap();
        let validated = validate(op.descriptor(), &args)?;
        build_payload(&validated)
    }

    #[test]
    fn history_payload_orders_required_then_dates_then_optional() {
        let payload = build(
            Operation::GetHistory,
            json!({
                "show_headers": true,
                "type_range": 100,
                "date2": "2024-01-31",
                "date1": "2024-01-01",
                "regions_indexes": [1, 2],
                "project_id": 42,
                "limit": 5
            }),
        )
        .unwrap();
        let keys: Vec<_> = payload.keys().collect();
        assert_eq!(
            keys,
            ["project_id", "regions_indexes", "date1", "date2", "type_range", "show_headers", "limit"]
        );
        assert_eq!(payload.get("show_headers"), Some(&json!(1)));
    }

    #[test]
    fn to_json_keeps_insertion_order() {
        let mut payload = Payload::new();
        payload.insert("project_id", json!(1));
        payload.insert("date1", json!("2024-01-01"));
        payload.insert("limit", json!(5));

        let json = payload.to_json();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["project_id", "date1", "limit"]);
        assert_eq!(
            serde_json::to_string(&json).unwrap(),
            serde_json::to_string(&payload).unwrap()
        );
    }

    #[test]
    fn unset_optionals_are_absent() {
        let payload = build(Operation::GetCompetitors, json!({"project_id": 1})).unwrap();
        assert_eq!(payload.to_json(), json!({"project_id": 1}));
    }

    #[test]
    fn booleans_become_integers() {
        let payload = build(
            Operation::GetProjects,
            json!({"show_site_stat": true, "include_positions_summary": false}),
        )
        .unwrap();
        assert_eq!(payload.get("show_site_stat"), Some(&json!(1)));
        assert_eq!(payload.get("include_positions_summary"), Some(&json!(0)));
    }

    #[test]
    fn summary_chart_defaults_type_range() {
        let payload = build(
            Operation::GetSummaryChart,
            json!({"project_id": 1, "region_index": 2, "dates": ["2024-01-01"]}),
        )
        .unwrap();
        assert_eq!(payload.get("type_range"), Some(&json!(2)));

        let payload = build(
            Operation::GetSummaryChart,
            json!({"project_id": 1, "region_index": 2, "dates": ["2024-01-01"], "type_range": 7}),
        )
        .unwrap();
        assert_eq!(payload.get("type_range"), Some(&json!(7)));
    }

    #[test]
    fn region_name_uses_its_wire_key() {
        let payload = build(
            Operation::GetSearchersRegions,
            json!({"project_id": 1, "region_name": "Москва", "device": 2}),
        )
        .unwrap();
        assert_eq!(payload.get("region.name"), Some(&json!("Москва")));
        assert!(!payload.contains_key("region_name"));
    }

    #[test]
    fn universal_param_of_wrong_type_names_the_parameter() {
        let err = build(Operation::GetProjects, json!({"filters": [1, 2]})).unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("filters")
        );
        assert_eq!(
            err.context().and_then(|c| c.source.as_deref()),
            Some("payload_builder")
        );
    }

    #[test]
    fn every_universal_param_of_wrong_type_is_named() {
        let cases = [
            ("limit", json!("10")),
            ("offset", json!([1])),
            ("fields", json!("name")),
            ("filters", json!([1, 2])),
            ("id", json!({"id": 1})),
            ("orders", json!({"name": "id"})),
        ];
        for (name, value) in cases {
            let mut args = serde_json::Map::new();
            args.insert(name.to_string(), value);
            let err = build(Operation::GetProjects, Value::Object(args)).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest { .. }), "{name}");
            assert_eq!(
                err.context().and_then(|c| c.field_path.as_deref()),
                Some(name)
            );
        }
    }

    #[test]
    fn universal_params_never_overwrite_operation_fields() {
        let payload = build(
            Operation::GetHistory,
            json!({
                "project_id": 1, "regions_indexes": [1], "dates": ["2024-01-01"],
                "fields": ["name"]
            }),
        )
        .unwrap();
        assert_eq!(payload.get("fields"), Some(&json!(["name"])));

        let mut payload = Payload::new();
        payload.insert("id", json!(1));
        let supplied = json!({"id": 2, "offset": 10}).as_object().cloned().unwrap();
        apply_universal_params(&mut payload, &supplied).unwrap();
        assert_eq!(payload.get("id"), Some(&json!(1)));
        assert_eq!(payload.get("offset"), Some(&json!(10)));
    }

    #[test]
    fn universal_params_pass_through_unmodified() {
        let payload = build(
            Operation::GetProjects,
            json!({
                "limit": 10, "offset": 20, "fields": ["id", "name"],
                "filters": {"name": "site"}, "id": 3, "orders": [{"name": "id", "direction": "DESC"}]
            }),
        )
        .unwrap();
        assert_eq!(
            payload.to_json(),
            json!({
                "limit": 10, "offset": 20, "fields": ["id", "name"],
                "filters": {"name": "site"}, "id": 3, "orders": [{"name": "id", "direction": "DESC"}]
            })
        );
    }
}
