use super::models::ToolInvocation;
use serde_json::Value;

/// Transparency footer built from the turn's own tool log.
///
/// Empty when no tools ran and the round limit was not hit.
pub fn build_footer(tool_log: &[ToolInvocation], round_limit_hit: bool, rounds: usize) -> String {
    if tool_log.is_empty() && !round_limit_hit {
        return String::new();
    }

    let mut lines = vec!["---".to_string(), "Data sources:".to_string()];
    if tool_log.is_empty() {
        lines.push("- none".to_string());
    }
    for invocation in tool_log {
        lines.push(format!(
            "- {}({}): {}",
            invocation.tool,
            render_arguments(&invocation.arguments),
            invocation.preview
        ));
    }
    if tool_log.iter().any(|invocation| invocation.partial) {
        lines.push("Some results are partial; data may be incomplete.".to_string());
    }
    if round_limit_hit {
        lines.push(format!(
            "Search was cut short after {rounds} rounds of tool calls."
        ));
    }
    lines.join("\n")
}

fn render_arguments(arguments: &Value) -> String {
    match arguments {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(text) => format!("{key}={text}"),
                other => format!("{key}={other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invocation(tool: &str, preview: &str, partial: bool) -> ToolInvocation {
        ToolInvocation {
            round: 1,
            call_id: "call_1".into(),
            tool: tool.into(),
            arguments: json!({"time_window": "last_24h", "limit": 5}),
            preview: preview.into(),
            partial,
            failed: false,
        }
    }

    #[test]
    fn no_tools_no_footer() {
        assert!(build_footer(&[], false, 0).is_empty());
    }

    #[test]
    fn lists_every_call_with_its_preview() {
        let footer = build_footer(
            &[
                invocation("query_incidents", "12 results, 340ms", false),
                invocation("query_alerts", "3 results, 90ms (partial)", true),
            ],
            false,
            2,
        );
        assert!(footer.contains("- query_incidents("));
        assert!(footer.contains("time_window=last_24h"));
        assert!(footer.contains("): 12 results, 340ms"));
        assert!(footer.contains("data may be incomplete"));
        assert!(!footer.contains("cut short"));
    }

    #[test]
    fn round_limit_is_stated() {
        let footer = build_footer(&[invocation("query_incidents", "OK", false)], true, 5);
        assert!(footer.ends_with("Search was cut short after 5 rounds of tool calls."));
    }
}
