//! Per-view field projection.
//!
//! Records are parsed with every column the template returns; a view keeps
//! only the fields the model needs for that kind of answer.

use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    IncidentList,
    IncidentDetail,
    AlertList,
}

impl View {
    pub const ALL: [View; 3] = [View::IncidentList, View::IncidentDetail, View::AlertList];

    pub fn name(self) -> &'static str {
        match self {
            View::IncidentList => "incident_list",
            View::IncidentDetail => "incident_detail",
            View::AlertList => "alert_list",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.name() == name)
    }

    pub fn fields(self) -> &'static [&'static str] {
        match self {
            View::IncidentList => &[
                "number",
                "title",
                "severity",
                "status",
                "created_time",
                "alert_count",
                "entity_count",
                "last_modified_time",
                "created_time_ago",
                "last_modified_time_ago",
            ],
            View::IncidentDetail => &[
                "number",
                "title",
                "severity",
                "status",
                "description",
                "created_time",
                "last_modified_time",
                "closed_time",
                "owner",
                "alert_count",
                "entity_count",
                "labels",
                "classification",
                "classification_reason",
                "first_activity_time",
                "last_activity_time",
                "incident_url",
                "created_time_ago",
                "last_modified_time_ago",
            ],
            View::AlertList => &[
                "name",
                "display_name",
                "severity",
                "status",
                "time_generated",
                "tactics",
                "provider_name",
                "compromised_entity",
                "time_generated_ago",
            ],
        }
    }

    /// Keep only this view's fields. Non-object values pass through.
    pub fn apply(self, record: Value) -> Value {
        match record {
            Value::Object(map) => {
                let fields = self.fields();
                Value::Object(
                    map.into_iter()
                        .filter(|(key, _)| fields.contains(&key.as_str()))
                        .collect::<Map<String, Value>>(),
                )
            }
            other => other,
        }
    }
}

/// Project every record through the named view.
///
/// An unknown view name is a programming error: debug builds panic, release
/// builds log it and return the records unprojected.
pub fn project(view_name: &str, records: Vec<Value>) -> Vec<Value> {
    match View::from_name(view_name) {
        Some(view) => records.into_iter().map(|record| view.apply(record)).collect(),
        None => {
            if cfg!(debug_assertions) {
                panic!("unknown projection view '{view_name}'");
            }
            warn!(view = view_name, "Unknown projection view, returning records unprojected");
            records
        }
    }
}
