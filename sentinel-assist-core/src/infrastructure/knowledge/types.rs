use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored document with its distance from the query.
#[derive(Debug, Clone, PartialEq)]
pub struct KbMatch {
    pub document: String,
    pub metadata: Map<String, Value>,
    pub distance: f32,
}

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn search_similar_incidents(&self, query: &str, limit: usize) -> Vec<KbMatch>;

    async fn search_playbooks(&self, query: &str, limit: usize) -> Vec<KbMatch>;

    /// Document counts for the incident and playbook collections.
    fn counts(&self) -> (usize, usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Normal,
    Low,
}

/// One match as shown to the model. Distances are not exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KbItem {
    pub document: String,
    pub metadata: Map<String, Value>,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KbSearchResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub results: Vec<KbItem>,
    /// Set only when there is at least one match and every match is low confidence.
    pub low_confidence_warning: bool,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidanceResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub playbook_results: Vec<KbItem>,
    pub incident_results: Vec<KbItem>,
    pub low_confidence_warning: bool,
}

impl GuidanceResult {
    pub fn combine(playbooks: KbSearchResult, incidents: KbSearchResult) -> Self {
        Self {
            kind: "investigation_guidance",
            low_confidence_warning: playbooks.low_confidence_warning
                && incidents.low_confidence_warning,
            playbook_results: playbooks.results,
            incident_results: incidents.results,
        }
    }
}

pub fn format_matches(kind: &'static str, matches: Vec<KbMatch>, threshold: f32) -> KbSearchResult {
    let results: Vec<KbItem> = matches
        .into_iter()
        .map(|found| KbItem {
            confidence: if found.distance > threshold {
                Confidence::Low
            } else {
                Confidence::Normal
            },
            document: found.document,
            metadata: found.metadata,
        })
        .collect();
    let all_low = results.iter().all(|item| item.confidence == Confidence::Low);
    KbSearchResult {
        kind,
        low_confidence_warning: all_low && !results.is_empty(),
        total: results.len(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(distance: f32) -> KbMatch {
        KbMatch {
            document: format!("doc at {distance}"),
            metadata: Map::new(),
            distance,
        }
    }

    #[test]
    fn warning_needs_every_match_to_be_low() {
        let mixed = format_matches("playbooks", vec![found(0.1), found(0.9)], 0.35);
        assert!(!mixed.low_confidence_warning);
        assert_eq!(mixed.results[1].confidence, Confidence::Low);

        let low = format_matches("playbooks", vec![found(0.5), found(0.9)], 0.35);
        assert!(low.low_confidence_warning);
    }

    #[test]
    fn empty_results_never_warn() {
        let empty = format_matches("similar_incidents", Vec::new(), 0.35);
        assert!(!empty.low_confidence_warning);
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn threshold_is_exclusive() {
        let edge = format_matches("playbooks", vec![found(0.35)], 0.35);
        assert_eq!(edge.results[0].confidence, Confidence::Normal);
    }

    #[test]
    fn guidance_warns_only_when_both_sides_are_low() {
        let low = format_matches("playbooks", vec![found(0.9)], 0.35);
        let normal = format_matches("similar_incidents", vec![found(0.1)], 0.35);
        assert!(!GuidanceResult::combine(low.clone(), normal).low_confidence_warning);
        assert!(GuidanceResult::combine(low.clone(), low).low_confidence_warning);
    }
}
