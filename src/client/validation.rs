//! Parameter validation.
//!
//! Checks raw call arguments against an [`OperationDescriptor`] before any payload is
//! built. Rules run in a fixed order and the first violation is reported:
//!
//! 1. required parameters present, every declared parameter of its declared type
//! 2. date strings are `YYYY-MM-DD`
//! 3. date groups: `dates` xor the `date1`/`date2` pair, the pair complete
//! 4. enumerated and bounded values inside their allowed set
//!
//! Calendar validity of dates is not checked.

use crate::client::payload::UNIVERSAL_PARAMS;
use crate::operation::{DateRule, OperationDescriptor, ParamKind, ParamSpec};
use crate::params::Arguments;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

const SOURCE: &str = "validator";

static DATE_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Date representation chosen for a date-bearing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSelection {
    List(Vec<String>),
    Range { date1: String, date2: String },
}

/// Arguments that passed every validation rule.
#[derive(Debug, Clone)]
pub struct ValidatedArgs {
    descriptor: &'static OperationDescriptor,
    values: HashMap<&'static str, Value>,
    dates: Option<DateSelection>,
    universal: Arguments,
}

impl ValidatedArgs {
    pub fn descriptor(&self) -> &'static OperationDescriptor {
        self.descriptor
    }

    /// Value of a declared parameter, if the caller supplied it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn dates(&self) -> Option<&DateSelection> {
        self.dates.as_ref()
    }

    /// Universal parameters as supplied; their types are checked when merged.
    pub fn universal(&self) -> &Arguments {
        &self.universal
    }
}

/// Validate raw arguments for one operation.
pub fn validate(descriptor: &'static OperationDescriptor, args: &Arguments) -> Result<ValidatedArgs> {
    let values = check_declared(descriptor, args)?;
    let dates = check_dates(descriptor.dates, args)?;
    check_allowed_values(descriptor, &values)?;

    let universal = UNIVERSAL_PARAMS
        .iter()
        .filter_map(|(name, _)| present(args, name).map(|v| (name.to_string(), v.clone())))
        .collect();

    Ok(ValidatedArgs {
        descriptor,
        values,
        dates,
        universal,
    })
}

/// `null` is treated as "not supplied".
fn present<'a>(args: &'a Arguments, name: &str) -> Option<&'a Value> {
    args.get(name).filter(|v| !v.is_null())
}

// Rule 1
fn check_declared(
    descriptor: &OperationDescriptor,
    args: &Arguments,
) -> Result<HashMap<&'static str, Value>> {
    let mut values = HashMap::new();

    for spec in descriptor.required {
        let value = present(args, spec.name).ok_or_else(|| {
            Error::invalid_parameter(
                spec.name,
                format!(
                    "{} requires parameter '{}'",
                    descriptor.operation, spec.name
                ),
                SOURCE,
            )
        })?;
        check_shape(spec, value)?;
        values.insert(spec.name, value.clone());
    }

    for spec in descriptor.optional {
        if let Some(value) = present(args, spec.name) {
            check_shape(spec, value)?;
            values.insert(spec.name, value.clone());
        }
    }

    Ok(values)
}

fn is_integer(value: &Value) -> bool {
    value.as_i64().is_some()
}

fn is_integer_list(value: &Value) -> bool {
    value
        .as_array()
        .map(|items| items.iter().all(is_integer))
        .unwrap_or(false)
}

fn is_text_list(value: &Value) -> bool {
    value
        .as_array()
        .map(|items| items.iter().all(Value::is_string))
        .unwrap_or(false)
}

fn conforms(kind: ParamKind, value: &Value) -> bool {
    match kind {
        ParamKind::Integer | ParamKind::BoundedInteger { .. } | ParamKind::IntegerEnum(_) => {
            is_integer(value)
        }
        ParamKind::Boolean => value.is_boolean() || matches!(value.as_i64(), Some(0 | 1)),
        ParamKind::Text => value.is_string(),
        ParamKind::IntegerList => is_integer_list(value),
        ParamKind::TextList | ParamKind::TextEnumList(_) => is_text_list(value),
        ParamKind::IntegerPairList => value
            .as_array()
            .map(|pairs| {
                pairs.iter().all(|pair| {
                    pair.as_array()
                        .map(|bounds| bounds.len() == 2 && bounds.iter().all(is_integer))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false),
    }
}

fn check_shape(spec: &ParamSpec, value: &Value) -> Result<()> {
    if conforms(spec.kind, value) {
        Ok(())
    } else {
        Err(Error::invalid_parameter(
            spec.name,
            format!(
                "Parameter '{}' must be of type {}, got {}",
                spec.name,
                spec.kind.type_name(),
                value
            ),
            SOURCE,
        ))
    }
}

// Rule 2
fn check_date(name: &str, value: &Value) -> Result<String> {
    let text = value.as_str().ok_or_else(|| {
        Error::invalid_parameter(
            name,
            format!("Date parameter '{}' must be a string, got {}", name, value),
            SOURCE,
        )
    })?;
    if text.len() != 10 || !DATE_FORMAT.is_match(text) {
        return Err(Error::invalid_parameter(
            name,
            format!("Date parameter '{}' must be YYYY-MM-DD, got '{}'", name, text),
            SOURCE,
        ));
    }
    Ok(text.to_string())
}

fn check_date_list(value: &Value) -> Result<Vec<String>> {
    let items = value.as_array().ok_or_else(|| {
        Error::invalid_parameter(
            "dates",
            format!("Parameter 'dates' must be a list of dates, got {}", value),
            SOURCE,
        )
    })?;
    items.iter().map(|item| check_date("dates", item)).collect()
}

// Rules 2 and 3
fn check_dates(rule: DateRule, args: &Arguments) -> Result<Option<DateSelection>> {
    if rule == DateRule::None {
        return Ok(None);
    }

    let dates = present(args, "dates").map(check_date_list).transpose()?;
    let date1 = present(args, "date1")
        .map(|v| check_date("date1", v))
        .transpose()?;
    let date2 = present(args, "date2")
        .map(|v| check_date("date2", v))
        .transpose()?;

    // An empty list is the same as no list.
    let dates = dates.filter(|list| !list.is_empty());

    if rule == DateRule::ExactPair {
        let stray = if date1.is_some() {
            Some("date1")
        } else if date2.is_some() {
            Some("date2")
        } else {
            None
        };
        if let Some(name) = stray {
            return Err(Error::invalid_parameter(
                name,
                "Only 'dates' with exactly two dates is accepted; 'date1'/'date2' are not",
                SOURCE,
            ));
        }
        return match dates {
            Some(list) if list.len() == 2 => Ok(Some(DateSelection::List(list))),
            Some(list) => Err(Error::invalid_parameter(
                "dates",
                format!("'dates' must contain exactly 2 dates, got {}", list.len()),
                SOURCE,
            )),
            None => Err(Error::invalid_parameter(
                "dates",
                "'dates' with exactly 2 dates is required",
                SOURCE,
            )),
        };
    }

    match (dates, date1, date2) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(Error::invalid_parameter(
            "dates",
            "'dates' and 'date1'/'date2' are mutually exclusive",
            SOURCE,
        )),
        (Some(list), None, None) => Ok(Some(DateSelection::List(list))),
        (None, Some(date1), Some(date2)) => Ok(Some(DateSelection::Range { date1, date2 })),
        (None, Some(_), None) => Err(Error::invalid_parameter(
            "date2",
            "'date1' and 'date2' must be supplied together",
            SOURCE,
        )),
        (None, None, Some(_)) => Err(Error::invalid_parameter(
            "date1",
            "'date1' and 'date2' must be supplied together",
            SOURCE,
        )),
        (None, None, None) => Err(Error::invalid_parameter(
            "dates",
            "Either 'dates' or both 'date1' and 'date2' must be supplied",
            SOURCE,
        )),
    }
}

// Rule 4
fn check_allowed_values(
    descriptor: &OperationDescriptor,
    values: &HashMap<&'static str, Value>,
) -> Result<()> {
    for spec in descriptor.required.iter().chain(descriptor.optional.iter()) {
        let Some(value) = values.get(spec.name) else {
            continue;
        };
        match spec.kind {
            ParamKind::IntegerEnum(allowed) => {
                let code = value.as_i64().unwrap_or_default();
                if !allowed.contains(&code) {
                    return Err(Error::invalid_parameter(
                        spec.name,
                        format!(
                            "Parameter '{}' must be one of {:?}, got {}",
                            spec.name, allowed, code
                        ),
                        SOURCE,
                    ));
                }
            }
            ParamKind::BoundedInteger { min, max } => {
                let n = value.as_i64().unwrap_or_default();
                if n < min || n > max {
                    return Err(Error::invalid_parameter(
                        spec.name,
                        format!(
                            "Parameter '{}' must be between {} and {}, got {}",
                            spec.name, min, max, n
                        ),
                        SOURCE,
                    ));
                }
            }
            ParamKind::TextEnumList(allowed) => {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                if let Some(bad) = items
                    .iter()
                    .filter_map(Value::as_str)
                    .find(|item| !allowed.contains(item))
                {
                    return Err(Error::invalid_parameter(
                        spec.name,
                        format!(
                            "Parameter '{}' accepts only {:?}, got '{}'",
                            spec.name, allowed, bad
                        ),
                        SOURCE,
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(())
}
