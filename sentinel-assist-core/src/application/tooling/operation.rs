/// Status line for names outside the table.
pub const DEFAULT_STATUS: &str = "Processing query...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    QueryIncidents,
    GetIncidentDetail,
    QueryAlerts,
    GetAlertTrend,
    GetTopEntities,
    SearchSimilarIncidents,
    SearchPlaybooks,
    GetInvestigationGuidance,
}

impl Operation {
    pub const WORKSPACE: [Operation; 5] = [
        Operation::QueryIncidents,
        Operation::GetIncidentDetail,
        Operation::QueryAlerts,
        Operation::GetAlertTrend,
        Operation::GetTopEntities,
    ];

    pub const KNOWLEDGE: [Operation; 3] = [
        Operation::SearchSimilarIncidents,
        Operation::SearchPlaybooks,
        Operation::GetInvestigationGuidance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::QueryIncidents => "query_incidents",
            Operation::GetIncidentDetail => "get_incident_detail",
            Operation::QueryAlerts => "query_alerts",
            Operation::GetAlertTrend => "get_alert_trend",
            Operation::GetTopEntities => "get_top_entities",
            Operation::SearchSimilarIncidents => "search_similar_incidents",
            Operation::SearchPlaybooks => "search_playbooks",
            Operation::GetInvestigationGuidance => "get_investigation_guidance",
        }
    }

    pub fn status_message(self) -> &'static str {
        match self {
            Operation::QueryIncidents => "Querying incidents...",
            Operation::GetIncidentDetail => "Looking up incident details...",
            Operation::QueryAlerts => "Querying alerts...",
            Operation::GetAlertTrend => "Analyzing alert trends...",
            Operation::GetTopEntities => "Finding top targeted entities...",
            Operation::SearchSimilarIncidents => "Searching historical incidents...",
            Operation::SearchPlaybooks => "Searching playbooks...",
            Operation::GetInvestigationGuidance => "Looking up investigation guidance...",
        }
    }

    pub fn is_knowledge(self) -> bool {
        Self::KNOWLEDGE.contains(&self)
    }
}
