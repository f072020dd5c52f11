//! Typed views over workspace rows.
//!
//! Rows arrive as column-name → value maps. Parsing is lenient: a missing or
//! malformed column becomes an empty/zero value instead of dropping the row.

use super::time::format_relative_time;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// One backend row keyed by column name.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Incident {
    pub number: u64,
    pub title: String,
    /// "High", "Medium", "Low" or "Informational".
    pub severity: String,
    pub status: String,
    pub created_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
    pub description: String,
    pub owner: String,
    pub alert_count: usize,
    /// Zero in list views; filled from the entity sub-query in detail views.
    pub entity_count: usize,
    pub closed_time: Option<DateTime<Utc>>,
    pub first_activity_time: Option<DateTime<Utc>>,
    pub last_activity_time: Option<DateTime<Utc>>,
    pub incident_url: String,
    pub classification: String,
    pub classification_reason: String,
    pub labels: Option<Vec<String>>,
    pub created_time_ago: String,
    pub last_modified_time_ago: String,
}

impl Incident {
    pub fn from_row(row: &Record, detail: bool) -> Self {
        let created_time = datetime_or_epoch(row.get("CreatedTime"));
        let last_modified_time = datetime_or_epoch(row.get("LastModifiedTime"));
        let mut incident = Self {
            number: number(row.get("IncidentNumber")),
            title: text(row.get("Title")),
            severity: text(row.get("Severity")),
            status: text(row.get("Status")),
            created_time,
            last_modified_time,
            description: text(row.get("Description")),
            owner: owner(row.get("Owner")),
            alert_count: json_array(row.get("AlertIds")).map_or(0, |ids| ids.len()),
            entity_count: 0,
            closed_time: None,
            first_activity_time: None,
            last_activity_time: None,
            incident_url: String::new(),
            classification: String::new(),
            classification_reason: String::new(),
            labels: None,
            created_time_ago: format_relative_time(created_time),
            last_modified_time_ago: format_relative_time(last_modified_time),
        };

        if detail {
            incident.closed_time = datetime(row.get("ClosedTime"));
            incident.first_activity_time = datetime(row.get("FirstActivityTime"));
            incident.last_activity_time = datetime(row.get("LastActivityTime"));
            incident.incident_url = text(row.get("IncidentUrl"));
            incident.classification = text(row.get("Classification"));
            incident.classification_reason = text(row.get("ClassificationReason"));
            incident.labels = json_array(row.get("Labels")).map(|labels| {
                labels
                    .iter()
                    .map(|label| match label.get("labelName") {
                        Some(name) => text(Some(name)),
                        None => text(Some(label)),
                    })
                    .collect()
            });
        }
        incident
    }
}

/// Alerts use `AlertSeverity`, not `Severity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub name: String,
    pub display_name: String,
    pub severity: String,
    pub status: String,
    pub time_generated: DateTime<Utc>,
    pub description: String,
    pub tactics: String,
    pub techniques: String,
    pub provider_name: String,
    pub compromised_entity: String,
    pub system_alert_id: String,
    pub time_generated_ago: String,
}

impl Alert {
    pub fn from_row(row: &Record) -> Self {
        let time_generated = datetime_or_epoch(row.get("TimeGenerated"));
        Self {
            name: text(row.get("AlertName")),
            display_name: text(row.get("DisplayName")),
            severity: text(row.get("AlertSeverity")),
            status: text(row.get("Status")),
            time_generated,
            description: text(row.get("Description")),
            tactics: text(row.get("Tactics")),
            techniques: text(row.get("Techniques")),
            provider_name: text(row.get("ProviderName")),
            compromised_entity: text(row.get("CompromisedEntity")),
            system_alert_id: text(row.get("SystemAlertId")),
            time_generated_ago: format_relative_time(time_generated),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub count: u64,
    pub severity: String,
}

impl TrendPoint {
    pub fn from_row(row: &Record) -> Self {
        Self {
            timestamp: datetime_or_epoch(row.get("TimeGenerated")),
            count: number(row.get("Count")),
            severity: text(row.get("AlertSeverity")),
        }
    }
}

/// An entity ranked by the number of alerts that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityCount {
    /// "account", "ip" or "host".
    pub entity_type: String,
    pub entity_name: String,
    pub count: u64,
}

impl EntityCount {
    pub fn from_row(row: &Record) -> Self {
        Self {
            entity_type: text(row.get("EntityType")),
            entity_name: text(row.get("EntityName")),
            count: number(row.get("AlertCount")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentEntity {
    pub entity_type: String,
    pub entity_name: String,
}

impl IncidentEntity {
    pub fn from_row(row: &Record) -> Self {
        Self {
            entity_type: text(row.get("EntityType")),
            entity_name: text(row.get("EntityName")),
        }
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn number(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Dynamic columns come back either as JSON or as JSON-encoded strings.
fn dynamic(value: Option<&Value>) -> Option<Value> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => serde_json::from_str(s).ok(),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.clone()),
    }
}

fn json_array(value: Option<&Value>) -> Option<Vec<Value>> {
    match dynamic(value)? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

fn owner(value: Option<&Value>) -> String {
    dynamic(value)
        .and_then(|owner| owner.get("assignedTo").map(|v| text(Some(v))))
        .unwrap_or_default()
}

fn datetime(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = value?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
        })
        .ok()
}

fn datetime_or_epoch(value: Option<&Value>) -> DateTime<Utc> {
    datetime(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    #[test]
    fn incident_list_row_parses_owner_and_alert_count() {
        let incident = Incident::from_row(
            &row(json!({
                "IncidentNumber": 42,
                "Title": "Suspicious sign-in",
                "Severity": "High",
                "Status": "New",
                "CreatedTime": "2026-02-18T10:00:00Z",
                "LastModifiedTime": "2026-02-18T11:00:00.1234567Z",
                "Owner": "{\"assignedTo\":\"alice@contoso.com\"}",
                "AlertIds": "[\"a1\",\"a2\",\"a3\"]",
                "ClosedTime": "2026-02-19T10:00:00Z"
            })),
            false,
        );
        assert_eq!(incident.number, 42);
        assert_eq!(incident.owner, "alice@contoso.com");
        assert_eq!(incident.alert_count, 3);
        assert_eq!(incident.entity_count, 0);
        assert!(incident.closed_time.is_none(), "detail fields stay empty in list view");
    }

    #[test]
    fn incident_detail_row_parses_labels() {
        let incident = Incident::from_row(
            &row(json!({
                "IncidentNumber": "7",
                "Labels": [{"labelName": "phishing"}, "vip"],
                "Classification": "TruePositive",
                "ClosedTime": "2026-02-19T10:00:00Z"
            })),
            true,
        );
        assert_eq!(incident.number, 7);
        assert_eq!(
            incident.labels,
            Some(vec!["phishing".to_string(), "vip".to_string()])
        );
        assert_eq!(incident.classification, "TruePositive");
        assert!(incident.closed_time.is_some());
    }

    #[test]
    fn malformed_timestamps_fall_back_to_epoch() {
        let alert = Alert::from_row(&row(json!({"TimeGenerated": "yesterday"})));
        assert_eq!(alert.time_generated.timestamp(), 0);
    }

    #[test]
    fn entity_counts_read_alert_count_column() {
        let entity = EntityCount::from_row(&row(json!({
            "EntityType": "ip",
            "EntityName": "10.0.0.5",
            "AlertCount": 12
        })));
        assert_eq!(entity.count, 12);
        assert_eq!(entity.entity_type, "ip");
    }
}
