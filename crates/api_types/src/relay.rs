//! Messages exchanged with dashboards over the `/relay` WebSocket.
//!
//! Every frame is a JSON object tagged by `type`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayRequest {
    FinancialQuery {
        query: String,
        #[serde(default)]
        context: Option<serde_json::Value>,
        #[serde(default)]
        session_id: Option<String>,
    },
    DashboardUpdate {
        #[serde(default)]
        metrics: serde_json::Value,
        #[serde(default)]
        update_type: Option<String>,
    },
    HealthCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayResponse {
    QueryProcessing {
        session_id: Option<String>,
        timestamp: DateTime<Utc>,
    },
    FinancialResponse {
        session_id: Option<String>,
        response: String,
        source: String,
        timestamp: DateTime<Utc>,
    },
    MetricsAnalysis {
        update_type: Option<String>,
        analysis: String,
        source: String,
        timestamp: DateTime<Utc>,
    },
    HealthResponse {
        status: String,
        connections: usize,
        timestamp: DateTime<Utc>,
    },
    DailyBriefing {
        date: NaiveDate,
        briefing: String,
        source: String,
    },
    Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_needs_no_payload() {
        let msg: RelayRequest = serde_json::from_str(r#"{"type":"health_check"}"#).unwrap();
        assert_eq!(msg, RelayRequest::HealthCheck);
    }

    #[test]
    fn query_defaults_optional_fields() {
        let msg: RelayRequest =
            serde_json::from_str(r#"{"type":"financial_query","query":"how am I doing?"}"#)
                .unwrap();
        assert_eq!(
            msg,
            RelayRequest::FinancialQuery {
                query: "how am I doing?".to_string(),
                context: None,
                session_id: None,
            }
        );
    }

    #[test]
    fn error_frames_are_tagged() {
        let json = serde_json::to_value(RelayResponse::Error {
            message: "bad".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "bad");
    }
}
