use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Server-side lifecycle state of a customization model.
///
/// The authoritative copy lives on the service; every check re-fetches it,
/// nothing is cached across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Pending,
    Ready,
    Training,
    Available,
    Failed,
    /// Carrier for values this client does not know about.
    Unknown(String),
}

impl ModelStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "ready" => Self::Ready,
            "training" => Self::Training,
            "available" => Self::Available,
            "failed" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Ready => f.write_str("ready"),
            Self::Training => f.write_str("training"),
            Self::Available => f.write_str("available"),
            Self::Failed => f.write_str("failed"),
            Self::Unknown(s) => f.write_str(s),
        }
    }
}

/// One account model as returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRecord {
    pub customization_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub base_model_name: String,
}

/// Wire shape of the account inventory.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModelInventory {
    #[serde(default)]
    pub customizations: Vec<ModelRecord>,
}

/// Result of [`crate::ModelHandle::train`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    /// The model has no corpus yet; the train request was never issued.
    /// A user-correctable precondition, not an error.
    CorpusRequired,
    /// Training ran to completion; carries the train acknowledgement payload.
    Completed(Value),
}

/// Decoded transcription response: hypotheses plus confidence metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub results: Vec<TranscriptionResult>,
    #[serde(default)]
    pub result_index: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResult {
    #[serde(default)]
    pub alternatives: Vec<TranscriptionAlternative>,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_round_trip() {
        for raw in ["pending", "ready", "training", "available", "failed"] {
            assert_eq!(ModelStatus::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status = ModelStatus::parse("upgrading");
        assert_eq!(status, ModelStatus::Unknown("upgrading".to_string()));
        assert_eq!(status.to_string(), "upgrading");
    }

    #[test]
    fn transcription_decodes_hypotheses_and_confidence() {
        let raw = r#"{
            "results": [
                {"alternatives": [{"transcript": "hello world ", "confidence": 0.91}], "final": true}
            ],
            "result_index": 0
        }"#;
        let t: Transcription = serde_json::from_str(raw).unwrap();
        assert_eq!(t.results.len(), 1);
        assert!(t.results[0].is_final);
        let alt = &t.results[0].alternatives[0];
        assert_eq!(alt.transcript, "hello world ");
        assert_eq!(alt.confidence, Some(0.91));
    }

    #[test]
    fn inventory_tolerates_missing_fields() {
        let raw = r#"{"customizations": [{"customization_id": "abc"}]}"#;
        let inv: ModelInventory = serde_json::from_str(raw).unwrap();
        assert_eq!(inv.customizations[0].customization_id, "abc");
        assert!(inv.customizations[0].name.is_empty());
    }
}
