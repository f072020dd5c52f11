// Query builder tests - every valid parameter combination must produce
// fully substituted query text.

#[path = "../support/mod.rs"]
mod support;

use sentinel_assist_core::query::{
    BIN_SIZES, ParamKind, QueryBuildError, Severity, TIME_WINDOWS, TemplateRegistry, templates,
};
use serde_json::{Map, Value, json};
use std::time::Duration;
use support::args;

const SEVERITIES: [&str; 5] = ["Informational", "Low", "Medium", "High", "high"];

fn values_for(kind: ParamKind) -> Vec<Value> {
    match kind {
        ParamKind::TimeWindow => TIME_WINDOWS.iter().map(|w| json!(w.name)).collect(),
        ParamKind::Severity => SEVERITIES.iter().map(|s| json!(s)).collect(),
        ParamKind::Limit => vec![json!(1), json!(5), json!(10_000), json!(-3)],
        ParamKind::IncidentNumber => vec![json!(1), json!("42")],
        ParamKind::Contains => vec![json!("phish"), json!("say \"hi\"")],
        ParamKind::BinSize => BIN_SIZES.iter().map(|b| json!(b)).collect(),
    }
}

#[test]
fn every_valid_combination_substitutes_all_placeholders() {
    let registry = TemplateRegistry::default();
    for name in registry.names() {
        let template = registry.get(name).expect("registered");
        let mut combos: Vec<Map<String, Value>> = vec![Map::new()];
        for spec in template.params {
            let mut next = Vec::new();
            for combo in &combos {
                if !spec.required {
                    next.push(combo.clone());
                }
                for value in values_for(spec.kind) {
                    let mut extended = combo.clone();
                    extended.insert(spec.name.to_string(), value);
                    next.push(extended);
                }
            }
            combos = next;
        }

        for params in combos {
            let built = registry
                .build(name, &params)
                .unwrap_or_else(|err| panic!("{name} with {params:?}: {err}"));
            for spec in template.params {
                assert!(
                    !built.text.contains(&format!("{{{}}}", spec.placeholder)),
                    "{name} left {{{}}} in {}",
                    spec.placeholder,
                    built.text
                );
            }
            if let (Some(limit), Some(policy)) = (built.limit, template.limit) {
                assert!((1..=policy.hard_cap).contains(&limit));
            }
        }
    }
}

#[test]
fn minimum_severity_expands_upward() {
    let registry = TemplateRegistry::default();
    let built = registry
        .build(
            templates::LIST_INCIDENTS,
            &args(json!({"min_severity": "Medium", "time_window": "last_7d"})),
        )
        .expect("builds");
    assert!(built.text.contains("'Medium','High'"));
    assert!(!built.text.contains("'Low'"));
    assert!(built.text.contains("ago(7d)"));
    assert_eq!(built.timespan, Duration::from_secs(7 * 86_400));
    assert_eq!(Severity::parse("medium"), Some(Severity::Medium));
}

#[test]
fn aggregation_templates_get_the_longer_timeout() {
    let registry = TemplateRegistry::standard(Duration::from_secs(20));
    let simple = registry
        .build(templates::LIST_ALERTS, &Map::new())
        .expect("builds");
    let trend = registry
        .build(templates::ALERT_TREND, &Map::new())
        .expect("builds");
    assert_eq!(simple.timeout, Duration::from_secs(20));
    assert_eq!(trend.timeout, Duration::from_secs(60));
}

#[test]
fn rejections_carry_stable_codes() {
    let registry = TemplateRegistry::default();

    let err = registry.build("drop_table", &Map::new()).unwrap_err();
    assert!(matches!(err, QueryBuildError::UnknownTemplate(_)));
    assert_eq!(err.code(), "unknown_template");

    let err = registry
        .build(templates::GET_INCIDENT_BY_NUMBER, &args(json!({"incident_number": null})))
        .unwrap_err();
    assert_eq!(err.code(), "missing_param:incident_number");

    let err = registry
        .build(templates::LIST_ALERTS, &args(json!({"time_window": "last_year"})))
        .unwrap_err();
    assert_eq!(err.code(), "invalid_param:time_window");

    let err = registry
        .build(templates::ALERT_TREND, &args(json!({"bin_size": "5m"})))
        .unwrap_err();
    assert_eq!(err.code(), "invalid_param:bin_size");
}
