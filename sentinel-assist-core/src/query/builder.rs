use super::resolver::{
    BIN_SIZES, Severity, TimeWindow, default_bin_size, resolve_severity, resolve_window,
    severity_filter,
};
use super::template::{ParamDefault, ParamKind, ParamSpec, QueryTemplate, TemplateRegistry};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Window used as the time-span hint for templates without a window parameter.
const DETAIL_TIMESPAN: &str = "last_30d";
const MAX_CONTAINS_CHARS: usize = 256;

/// A fully substituted query, ready for the execution client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub template: &'static str,
    pub text: String,
    pub timeout: Duration,
    /// Effective row cap after clamping, when the template has one.
    pub limit: Option<u32>,
    /// Lookback hint for the backend.
    pub timespan: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryBuildError {
    #[error("unknown query template '{0}'")]
    UnknownTemplate(String),

    #[error("missing required parameter '{0}'")]
    MissingParam(&'static str),

    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidParam { name: &'static str, reason: String },
}

impl QueryBuildError {
    pub fn code(&self) -> String {
        match self {
            QueryBuildError::UnknownTemplate(_) => "unknown_template".to_string(),
            QueryBuildError::MissingParam(name) => format!("missing_param:{name}"),
            QueryBuildError::InvalidParam { name, .. } => format!("invalid_param:{name}"),
        }
    }

    fn invalid(spec: &ParamSpec, reason: impl Into<String>) -> Self {
        QueryBuildError::InvalidParam {
            name: spec.name,
            reason: reason.into(),
        }
    }
}

/// A parameter after type/enum conformance checks.
#[derive(Debug, Clone)]
enum Checked {
    Window(&'static TimeWindow),
    Severity(Vec<Severity>),
    Limit(i64),
    Number(u64),
    Contains(String),
    BinSize(&'static str),
}

impl TemplateRegistry {
    /// Validate `params` against the named template and substitute them.
    ///
    /// Parameters the template does not declare are ignored. A JSON `null`
    /// counts as omitted.
    pub fn build(
        &self,
        template_name: &str,
        params: &Map<String, Value>,
    ) -> Result<BuiltQuery, QueryBuildError> {
        let template = self
            .get(template_name)
            .ok_or_else(|| QueryBuildError::UnknownTemplate(template_name.to_string()))?;

        for spec in template.params.iter().filter(|spec| spec.required) {
            if supplied(params, spec.name).is_none() {
                return Err(QueryBuildError::MissingParam(spec.name));
            }
        }

        let mut checked: Vec<(&ParamSpec, Option<Checked>)> = Vec::with_capacity(template.params.len());
        for spec in template.params {
            let value = match supplied(params, spec.name) {
                Some(value) => Some(check(spec, value)?),
                None => None,
            };
            checked.push((spec, value));
        }

        let window = checked.iter().find_map(|(_, value)| match value {
            Some(Checked::Window(window)) => Some(*window),
            _ => None,
        });
        let window = match window {
            Some(window) => Some(window),
            None => default_window(template)?,
        };

        let mut rendered_values: Vec<(&'static str, String)> = Vec::with_capacity(checked.len());
        let mut limit = None;
        for (spec, value) in checked {
            let value = match value {
                Some(value) => value,
                None => match apply_default(template, spec, window)? {
                    Some(value) => value,
                    None => continue,
                },
            };
            let rendered = match value {
                Checked::Window(window) => window.kql_ago.to_string(),
                Checked::Severity(levels) => severity_filter(&levels),
                Checked::Limit(requested) => {
                    let Some(policy) = template.limit else {
                        return Err(QueryBuildError::invalid(spec, "template has no row limit"));
                    };
                    let effective = policy.clamp(requested);
                    if i64::from(effective) != requested {
                        debug!(
                            template = template.name,
                            requested, effective, "Clamped query limit"
                        );
                    }
                    limit = Some(effective);
                    effective.to_string()
                }
                Checked::Number(number) => number.to_string(),
                Checked::Contains(term) => escape_contains(&term),
                Checked::BinSize(bin) => bin.to_string(),
            };
            rendered_values.push((spec.placeholder, rendered));
        }
        let text = substitute(template.text, &rendered_values);

        // Templates that cap rows without a caller-facing limit still get the
        // default cap for client-side truncation.
        if limit.is_none() {
            limit = template.limit.map(|policy| policy.default.min(policy.hard_cap.max(1)));
        }

        let timespan = match window {
            Some(window) => window.duration,
            None => resolve_window(DETAIL_TIMESPAN)
                .map(|window| window.duration)
                .unwrap_or(Duration::from_secs(30 * 86_400)),
        };

        Ok(BuiltQuery {
            template: template.name,
            text,
            timeout: self.timeout_for(template),
            limit,
            timespan,
        })
    }
}

fn supplied<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|value| !value.is_null())
}

fn default_window(template: &QueryTemplate) -> Result<Option<&'static TimeWindow>, QueryBuildError> {
    let Some(spec) = template
        .params
        .iter()
        .find(|spec| spec.kind == ParamKind::TimeWindow)
    else {
        return Ok(None);
    };
    match spec.default {
        ParamDefault::Literal(name) => resolve_window(name)
            .map(Some)
            .map_err(|err| QueryBuildError::invalid(spec, err.to_string())),
        _ => Ok(None),
    }
}

fn apply_default(
    template: &QueryTemplate,
    spec: &ParamSpec,
    window: Option<&'static TimeWindow>,
) -> Result<Option<Checked>, QueryBuildError> {
    match spec.default {
        ParamDefault::None => Ok(None),
        ParamDefault::Literal(literal) => check(spec, &Value::String(literal.to_string())).map(Some),
        ParamDefault::WindowBinSize => Ok(window.map(|window| Checked::BinSize(default_bin_size(window)))),
        ParamDefault::PolicyLimit => Ok(template
            .limit
            .map(|policy| Checked::Limit(i64::from(policy.default)))),
    }
}

fn check(spec: &ParamSpec, value: &Value) -> Result<Checked, QueryBuildError> {
    match spec.kind {
        ParamKind::TimeWindow => {
            let name = as_str(spec, value)?;
            resolve_window(name)
                .map(Checked::Window)
                .map_err(|err| QueryBuildError::invalid(spec, err.to_string()))
        }
        ParamKind::Severity => {
            let level = as_str(spec, value)?;
            Ok(Checked::Severity(resolve_severity(level)))
        }
        ParamKind::Limit => as_integer(spec, value).map(Checked::Limit),
        ParamKind::IncidentNumber => {
            let number = as_integer(spec, value)?;
            u64::try_from(number)
                .map(Checked::Number)
                .map_err(|_| QueryBuildError::invalid(spec, "must not be negative"))
        }
        ParamKind::Contains => {
            let term = as_str(spec, value)?.trim();
            if term.is_empty() {
                return Err(QueryBuildError::invalid(spec, "must not be empty"));
            }
            if term.chars().count() > MAX_CONTAINS_CHARS {
                return Err(QueryBuildError::invalid(
                    spec,
                    format!("must be at most {MAX_CONTAINS_CHARS} characters"),
                ));
            }
            if term.chars().any(char::is_control) {
                return Err(QueryBuildError::invalid(spec, "must not contain control characters"));
            }
            Ok(Checked::Contains(term.to_string()))
        }
        ParamKind::BinSize => {
            let bin = as_str(spec, value)?;
            BIN_SIZES
                .into_iter()
                .find(|candidate| *candidate == bin)
                .map(Checked::BinSize)
                .ok_or_else(|| {
                    QueryBuildError::invalid(
                        spec,
                        format!("expected one of: {}", BIN_SIZES.join(", ")),
                    )
                })
        }
    }
}

fn as_str<'a>(spec: &ParamSpec, value: &'a Value) -> Result<&'a str, QueryBuildError> {
    value
        .as_str()
        .ok_or_else(|| QueryBuildError::invalid(spec, "expected a string"))
}

/// Integers, whole floats and digit strings are accepted.
fn as_integer(spec: &ParamSpec, value: &Value) -> Result<i64, QueryBuildError> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| QueryBuildError::invalid(spec, "expected an integer")),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| QueryBuildError::invalid(spec, "expected an integer")),
        _ => Err(QueryBuildError::invalid(spec, "expected an integer")),
    }
}

/// Replace `{placeholder}` tokens in one left-to-right pass.
///
/// Substituted values are never scanned again, so caller text that looks
/// like a placeholder stays literal. Unknown tokens are kept as written.
fn substitute(text: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(placeholder, _)| *placeholder == name)
                .map(|(_, value)| (close, value))
        });
        match value {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape a term for a double-quoted string literal.
fn escape_contains(term: &str) -> String {
    term.replace('\\', "\\\\").replace('"', "\\\"")
}
