use super::operation::Operation;
use crate::query::{BIN_SIZES, LimitPolicy, Severity, TIME_WINDOWS, TemplateRegistry, templates};
use serde_json::{Value, json};

/// Chat-completions tool definitions for every operation in the table.
///
/// Windows, severities and bin sizes are enums so the model cannot request
/// a value the builder would reject. Limit descriptions follow the
/// registry's policies.
pub fn tool_definitions(registry: &TemplateRegistry, include_knowledge: bool) -> Vec<Value> {
    let mut tools: Vec<Value> = Operation::WORKSPACE
        .into_iter()
        .map(|operation| definition(operation, registry))
        .collect();
    if include_knowledge {
        tools.extend(
            Operation::KNOWLEDGE
                .into_iter()
                .map(|operation| definition(operation, registry)),
        );
    }
    tools
}

fn function(name: &str, description: &str, properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        }
    })
}

fn time_window(description: &str) -> Value {
    let names: Vec<&str> = TIME_WINDOWS.iter().map(|window| window.name).collect();
    json!({"type": "string", "enum": names, "description": description})
}

fn min_severity() -> Value {
    let levels: Vec<&str> = Severity::ALL.iter().rev().map(|level| level.as_str()).collect();
    json!({
        "type": "string",
        "enum": levels,
        "description": "Minimum severity threshold. 'High' returns only high severity, 'Informational' returns all."
    })
}

fn limit(noun: &str, policy: Option<LimitPolicy>) -> Value {
    let description = match policy {
        Some(policy) => format!(
            "Maximum number of {noun} to return. Default {}, max {}.",
            policy.default, policy.hard_cap
        ),
        None => format!("Maximum number of {noun} to return."),
    };
    json!({"type": "integer", "minimum": 1, "description": description})
}

fn knowledge_query(description: &str) -> Value {
    json!({"query": {"type": "string", "description": description}})
}

fn definition(operation: Operation, registry: &TemplateRegistry) -> Value {
    let policy = |name: &str| registry.get(name).and_then(|template| template.limit);
    match operation {
        Operation::QueryIncidents => function(
            operation.name(),
            "Query Microsoft Sentinel security incidents filtered by time range and severity. \
             Use this for recent incidents, incident lists, 'what's happening' or general \
             security status overviews. Returns incident number, title, severity, status and timestamps.",
            json!({
                "time_window": time_window("Time range to query. Use 'last_24h' for recent activity, wider ranges for historical views."),
                "min_severity": min_severity(),
                "limit": limit("incidents", policy(templates::LIST_INCIDENTS)),
            }),
            &["time_window"],
        ),
        Operation::GetIncidentDetail => function(
            operation.name(),
            "Get detailed information about a specific incident including description, alerts, \
             entities, timeline and classification. Use this for 'tell me about incident X', \
             drill-downs, or when the user references a previous result by number.",
            json!({
                "incident_ref": {
                    "type": "string",
                    "description": "An incident number (e.g. '42') for exact lookup, or text (e.g. 'phishing') for a case-insensitive title search."
                }
            }),
            &["incident_ref"],
        ),
        Operation::QueryAlerts => function(
            operation.name(),
            "Query Microsoft Sentinel security alerts filtered by time range and severity. \
             Alerts are individual detection signals, distinct from incidents which group \
             related alerts. For grouped security events use query_incidents instead.",
            json!({
                "time_window": time_window("Time range to query."),
                "min_severity": min_severity(),
                "limit": limit("alerts", policy(templates::LIST_ALERTS)),
            }),
            &["time_window"],
        ),
        Operation::GetAlertTrend => function(
            operation.name(),
            "Get alert volume bucketed by time interval over a period. Use this for trend \
             analysis, 'how have alerts changed' or 'is there an increase in alerts'.",
            json!({
                "time_window": time_window("Time range to analyze trends over."),
                "min_severity": min_severity(),
                "bin_size": {
                    "type": "string",
                    "enum": BIN_SIZES,
                    "description": "Bucket size. Auto-selected from the time window if omitted: hourly up to 24 hours, daily beyond."
                },
                "by_severity": {
                    "type": "boolean",
                    "description": "Split each bucket by severity (default true). Set false for a single total series."
                }
            }),
            &["time_window"],
        ),
        Operation::GetTopEntities => function(
            operation.name(),
            "Get the most frequently targeted entities (accounts, IP addresses, hosts) ranked by \
             alert count. Use this for 'who is being targeted', 'most attacked' or 'top entities'.",
            json!({
                "time_window": time_window("Time range to query."),
                "min_severity": min_severity(),
                "limit": limit("entities", policy(templates::TOP_ENTITIES)),
            }),
            &["time_window"],
        ),
        Operation::SearchSimilarIncidents => function(
            operation.name(),
            "Search the knowledge base for similar historical incidents. Use this for \
             'have we seen this before?', 'similar attacks' or recurring patterns.",
            knowledge_query("Natural language description of the incident or attack pattern."),
            &["query"],
        ),
        Operation::SearchPlaybooks => function(
            operation.name(),
            "Search the knowledge base for investigation and response playbooks. Use this for \
             'how to investigate X' or 'response procedure for Y'.",
            knowledge_query("Natural language description of the investigation topic or incident type."),
            &["query"],
        ),
        Operation::GetInvestigationGuidance => function(
            operation.name(),
            "Get MITRE ATT&CK-mapped investigation guidance combining playbooks and historical \
             context. Use this for technique-based recommendations.",
            knowledge_query("Natural language description of the attack or technique."),
            &["query"],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tools: &[Value]) -> Vec<String> {
        tools
            .iter()
            .filter_map(|tool| tool["function"]["name"].as_str().map(String::from))
            .collect()
    }

    #[test]
    fn knowledge_tools_are_optional() {
        let registry = TemplateRegistry::default();
        assert_eq!(tool_definitions(&registry, false).len(), 5);
        let all = names(&tool_definitions(&registry, true));
        assert_eq!(all.len(), 8);
        assert!(all.contains(&"get_investigation_guidance".to_string()));
    }

    #[test]
    fn window_enum_matches_the_resolver() {
        let registry = TemplateRegistry::default();
        let tools = tool_definitions(&registry, false);
        let windows = &tools[0]["function"]["parameters"]["properties"]["time_window"]["enum"];
        assert_eq!(windows.as_array().map(Vec::len), Some(TIME_WINDOWS.len()));
        let severities = &tools[0]["function"]["parameters"]["properties"]["min_severity"]["enum"];
        assert_eq!(severities[0], "High");
    }

    #[test]
    fn limit_description_follows_policy() {
        let registry = TemplateRegistry::default();
        let tools = tool_definitions(&registry, false);
        let description = tools[4]["function"]["parameters"]["properties"]["limit"]["description"]
            .as_str()
            .unwrap_or_default();
        assert!(description.contains("Default 10, max 50"));
    }
}
