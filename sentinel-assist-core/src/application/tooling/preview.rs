use serde_json::Value;

/// One-line summary of a tool result.
///
/// `"{total} results, {ms}ms"` for query envelopes (with `(partial)` when the
/// backend reported incomplete data), `"Error: {message}"` for failures,
/// `"{total} results"` for knowledge base searches and `"OK"` otherwise.
pub fn preview(result: &Value) -> String {
    if let Some(metadata) = result.get("metadata") {
        let total = metadata.get("total").and_then(Value::as_u64).unwrap_or(0);
        let ms = metadata.get("query_ms").and_then(Value::as_f64).unwrap_or(0.0);
        let partial = metadata
            .get("partial_error")
            .is_some_and(|detail| !detail.is_null());
        let mut line = format!("{total} results, {ms:.0}ms");
        if partial {
            line.push_str(" (partial)");
        }
        return line;
    }
    if let Some(message) = error_message(result) {
        return format!("Error: {message}");
    }
    if let Some(total) = result.get("total").and_then(Value::as_u64) {
        return format!("{total} results");
    }
    "OK".to_string()
}

fn error_message(result: &Value) -> Option<&str> {
    if let Some(message) = result.get("error").and_then(Value::as_str) {
        return Some(message);
    }
    if result.get("code").is_some() {
        return result.get("message").and_then(Value::as_str);
    }
    None
}
