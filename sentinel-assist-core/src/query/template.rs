use crate::constants::{AGGREGATION_TIMEOUT_FACTOR, DEFAULT_SIMPLE_TIMEOUT_SECS};
use std::collections::HashMap;
use std::time::Duration;

/// Registered template names.
pub mod templates {
    pub const LIST_INCIDENTS: &str = "list_incidents";
    pub const GET_INCIDENT_BY_NUMBER: &str = "get_incident_by_number";
    pub const GET_INCIDENT_BY_NAME: &str = "get_incident_by_name";
    pub const GET_INCIDENT_ALERTS: &str = "get_incident_alerts";
    pub const GET_INCIDENT_ENTITIES: &str = "get_incident_entities";
    pub const LIST_ALERTS: &str = "list_alerts";
    pub const ALERT_TREND: &str = "alert_trend";
    pub const ALERT_TREND_TOTAL: &str = "alert_trend_total";
    pub const TOP_ENTITIES: &str = "top_entities";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    /// Point lookups and short lists.
    Simple,
    /// Grouping, expansion and ranking.
    Aggregation,
}

impl TimeoutClass {
    pub fn timeout(self, simple: Duration) -> Duration {
        match self {
            TimeoutClass::Simple => simple,
            TimeoutClass::Aggregation => simple * AGGREGATION_TIMEOUT_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: u32,
    pub hard_cap: u32,
}

impl LimitPolicy {
    pub const fn new(default: u32, hard_cap: u32) -> Self {
        Self { default, hard_cap }
    }

    /// Clamp into `[1, hard_cap]`. Out-of-range values never error.
    pub fn clamp(&self, requested: i64) -> u32 {
        let cap = self.hard_cap.max(1);
        requested.clamp(1, i64::from(cap)) as u32
    }
}

/// What a parameter accepts and where its value may be substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A registered window name; substitutes the `ago()` argument.
    TimeWindow,
    /// A minimum severity; substitutes the quoted severity list.
    Severity,
    /// A row limit clamped by the template's [`LimitPolicy`].
    Limit,
    /// A non-negative incident number.
    IncidentNumber,
    /// Free text, only ever substituted inside the template's quoted
    /// `contains` clause.
    Contains,
    /// One of [`super::BIN_SIZES`].
    BinSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    None,
    Literal(&'static str),
    /// Derived from the template's time window.
    WindowBinSize,
    /// The template's default limit.
    PolicyLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub placeholder: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: ParamDefault,
}

impl ParamSpec {
    const fn required(name: &'static str, placeholder: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            placeholder,
            kind,
            required: true,
            default: ParamDefault::None,
        }
    }

    const fn optional(
        name: &'static str,
        placeholder: &'static str,
        kind: ParamKind,
        default: ParamDefault,
    ) -> Self {
        Self {
            name,
            placeholder,
            kind,
            required: false,
            default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    pub name: &'static str,
    pub text: &'static str,
    pub params: &'static [ParamSpec],
    pub timeout_class: TimeoutClass,
    pub limit: Option<LimitPolicy>,
}

impl QueryTemplate {
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|spec| spec.name == name)
    }
}

const WINDOW_24H: ParamSpec = ParamSpec::optional(
    "time_window",
    "time_range",
    ParamKind::TimeWindow,
    ParamDefault::Literal("last_24h"),
);
const WINDOW_7D: ParamSpec = ParamSpec::optional(
    "time_window",
    "time_range",
    ParamKind::TimeWindow,
    ParamDefault::Literal("last_7d"),
);
const MIN_SEVERITY: ParamSpec = ParamSpec::optional(
    "min_severity",
    "severity_filter",
    ParamKind::Severity,
    ParamDefault::Literal("Informational"),
);
const LIMIT: ParamSpec =
    ParamSpec::optional("limit", "limit", ParamKind::Limit, ParamDefault::PolicyLimit);
const INCIDENT_NUMBER: ParamSpec =
    ParamSpec::required("incident_number", "incident_number", ParamKind::IncidentNumber);
const INCIDENT_NAME: ParamSpec =
    ParamSpec::required("incident_name", "incident_name", ParamKind::Contains);
const BIN_SIZE: ParamSpec = ParamSpec::optional(
    "bin_size",
    "bin_size",
    ParamKind::BinSize,
    ParamDefault::WindowBinSize,
);

// SecurityIncident writes a row per modification, so incident templates
// deduplicate with arg_max(LastModifiedTime, *) by IncidentNumber.
const LIST_INCIDENTS_KQL: &str = r#"
SecurityIncident
| where TimeGenerated > ago({time_range})
| summarize arg_max(LastModifiedTime, *) by IncidentNumber
| where Severity in ({severity_filter})
| project IncidentNumber, Title, Severity, Status, CreatedTime,
          LastModifiedTime, Owner, AlertIds, Description,
          FirstActivityTime, LastActivityTime
| order by CreatedTime desc
| take {limit}
"#;

const INCIDENT_BY_NUMBER_KQL: &str = r#"
SecurityIncident
| where IncidentNumber == {incident_number}
| summarize arg_max(LastModifiedTime, *) by IncidentNumber
| project IncidentNumber, Title, Severity, Status, Description,
          CreatedTime, LastModifiedTime, ClosedTime, Owner,
          AlertIds, Labels, Classification, ClassificationReason,
          FirstActivityTime, LastActivityTime, IncidentUrl
"#;

const INCIDENT_BY_NAME_KQL: &str = r#"
SecurityIncident
| summarize arg_max(LastModifiedTime, *) by IncidentNumber
| where Title contains "{incident_name}"
| project IncidentNumber, Title, Severity, Status, Description,
          CreatedTime, LastModifiedTime, ClosedTime, Owner,
          AlertIds, Labels, Classification, ClassificationReason,
          FirstActivityTime, LastActivityTime, IncidentUrl
| take {limit}
"#;

const INCIDENT_ALERTS_KQL: &str = r#"
let incident_alerts = SecurityIncident
    | where IncidentNumber == {incident_number}
    | summarize arg_max(LastModifiedTime, *) by IncidentNumber
    | mv-expand AlertId = AlertIds
    | project tostring(AlertId);
SecurityAlert
| where SystemAlertId in (incident_alerts)
| project AlertName, DisplayName, AlertSeverity, Status,
          TimeGenerated, Description, Tactics, Techniques,
          ProviderName, CompromisedEntity, SystemAlertId
"#;

const INCIDENT_ENTITIES_KQL: &str = r#"
let incident_alerts = SecurityIncident
    | where IncidentNumber == {incident_number}
    | summarize arg_max(LastModifiedTime, *) by IncidentNumber
    | mv-expand AlertId = AlertIds
    | project tostring(AlertId);
SecurityAlert
| where SystemAlertId in (incident_alerts)
| extend EntitiesParsed = parse_json(Entities)
| mv-expand Entity = EntitiesParsed
| extend EntityType = tostring(Entity.Type),
         EntityName = case(
             Entity.Type == "account", tostring(Entity.Name),
             Entity.Type == "ip", tostring(Entity.Address),
             Entity.Type == "host", tostring(Entity.HostName),
             Entity.Type == "url", tostring(Entity.Url),
             Entity.Type == "file", tostring(Entity.Name),
             tostring(Entity.Name)
         )
| where isnotempty(EntityName)
| distinct EntityType, EntityName
"#;

// SecurityAlert uses AlertSeverity, not Severity.
const LIST_ALERTS_KQL: &str = r#"
SecurityAlert
| where TimeGenerated > ago({time_range})
| where AlertSeverity in ({severity_filter})
| project AlertName, DisplayName, AlertSeverity, Status,
          TimeGenerated, Description, Tactics, Techniques,
          ProviderName, CompromisedEntity, SystemAlertId
| order by TimeGenerated desc
| take {limit}
"#;

const ALERT_TREND_KQL: &str = r#"
SecurityAlert
| where TimeGenerated > ago({time_range})
| where AlertSeverity in ({severity_filter})
| summarize Count=count() by bin(TimeGenerated, {bin_size}), AlertSeverity
| order by TimeGenerated asc
"#;

const ALERT_TREND_TOTAL_KQL: &str = r#"
SecurityAlert
| where TimeGenerated > ago({time_range})
| where AlertSeverity in ({severity_filter})
| summarize Count=count() by bin(TimeGenerated, {bin_size})
| order by TimeGenerated asc
"#;

const TOP_ENTITIES_KQL: &str = r#"
SecurityAlert
| where TimeGenerated > ago({time_range})
| where AlertSeverity in ({severity_filter})
| extend EntitiesParsed = parse_json(Entities)
| mv-expand Entity = EntitiesParsed
| extend EntityType = tostring(Entity.Type),
         EntityName = case(
             Entity.Type == "account", tostring(Entity.Name),
             Entity.Type == "ip", tostring(Entity.Address),
             Entity.Type == "host", tostring(Entity.HostName),
             tostring(Entity.Name)
         )
| where isnotempty(EntityName)
| where EntityType in ("account", "ip", "host")
| summarize AlertCount=count(), Severities=make_set(AlertSeverity)
    by EntityType, EntityName
| order by AlertCount desc
| take {limit}
"#;

fn standard_templates() -> Vec<QueryTemplate> {
    vec![
        QueryTemplate {
            name: templates::LIST_INCIDENTS,
            text: LIST_INCIDENTS_KQL,
            params: &[WINDOW_24H, MIN_SEVERITY, LIMIT],
            timeout_class: TimeoutClass::Simple,
            limit: Some(LimitPolicy::new(20, 100)),
        },
        QueryTemplate {
            name: templates::GET_INCIDENT_BY_NUMBER,
            text: INCIDENT_BY_NUMBER_KQL,
            params: &[INCIDENT_NUMBER],
            timeout_class: TimeoutClass::Simple,
            limit: None,
        },
        QueryTemplate {
            name: templates::GET_INCIDENT_BY_NAME,
            text: INCIDENT_BY_NAME_KQL,
            params: &[INCIDENT_NAME, LIMIT],
            timeout_class: TimeoutClass::Simple,
            limit: Some(LimitPolicy::new(10, 10)),
        },
        QueryTemplate {
            name: templates::GET_INCIDENT_ALERTS,
            text: INCIDENT_ALERTS_KQL,
            params: &[INCIDENT_NUMBER],
            timeout_class: TimeoutClass::Simple,
            limit: Some(LimitPolicy::new(50, 200)),
        },
        QueryTemplate {
            name: templates::GET_INCIDENT_ENTITIES,
            text: INCIDENT_ENTITIES_KQL,
            params: &[INCIDENT_NUMBER],
            timeout_class: TimeoutClass::Simple,
            limit: None,
        },
        QueryTemplate {
            name: templates::LIST_ALERTS,
            text: LIST_ALERTS_KQL,
            params: &[WINDOW_24H, MIN_SEVERITY, LIMIT],
            timeout_class: TimeoutClass::Simple,
            limit: Some(LimitPolicy::new(20, 100)),
        },
        QueryTemplate {
            name: templates::ALERT_TREND,
            text: ALERT_TREND_KQL,
            params: &[WINDOW_7D, MIN_SEVERITY, BIN_SIZE],
            timeout_class: TimeoutClass::Aggregation,
            limit: Some(LimitPolicy::new(365, 365)),
        },
        QueryTemplate {
            name: templates::ALERT_TREND_TOTAL,
            text: ALERT_TREND_TOTAL_KQL,
            params: &[WINDOW_7D, MIN_SEVERITY, BIN_SIZE],
            timeout_class: TimeoutClass::Aggregation,
            limit: Some(LimitPolicy::new(365, 365)),
        },
        QueryTemplate {
            name: templates::TOP_ENTITIES,
            text: TOP_ENTITIES_KQL,
            params: &[WINDOW_7D, MIN_SEVERITY, LIMIT],
            timeout_class: TimeoutClass::Aggregation,
            limit: Some(LimitPolicy::new(10, 50)),
        },
    ]
}

/// Named templates, registered once at startup and read-only afterwards.
///
/// The registry is shared behind an `Arc` by every concurrent tool execution;
/// nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<&'static str, QueryTemplate>,
    simple_timeout: Duration,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::standard(Duration::from_secs(DEFAULT_SIMPLE_TIMEOUT_SECS))
    }
}

impl TemplateRegistry {
    pub fn standard(simple_timeout: Duration) -> Self {
        Self::with_limits(simple_timeout, &HashMap::new())
    }

    /// Build the standard set, replacing limit policies named in `overrides`.
    ///
    /// Overrides for templates without a limit policy, or for unknown
    /// template names, are ignored.
    pub fn with_limits(simple_timeout: Duration, overrides: &HashMap<String, LimitPolicy>) -> Self {
        let templates = standard_templates()
            .into_iter()
            .map(|mut template| {
                if template.limit.is_some() {
                    if let Some(policy) = overrides.get(template.name) {
                        template.limit = Some(*policy);
                    }
                }
                (template.name, template)
            })
            .collect();
        Self {
            templates,
            simple_timeout,
        }
    }

    pub fn get(&self, name: &str) -> Option<&QueryTemplate> {
        self.templates.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.templates.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn simple_timeout(&self) -> Duration {
        self.simple_timeout
    }

    pub fn timeout_for(&self, template: &QueryTemplate) -> Duration {
        template.timeout_class.timeout(self.simple_timeout)
    }
}
