//! Model-scoped operations: create, corpus upload, status, training,
//! transcription. Everything here is bound to (at most) one
//! `customization_id`; account-wide operations live in [`crate::account`].

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{classify_status, ClientError, ClientResult};
use crate::poll::{wait_until, PollConfig, TRAIN_POLL_INTERVAL};
use crate::transport::{ApiRequest, Credentials, HttpTransport, Transport};
use crate::types::{ModelStatus, Transcription, TrainingOutcome};

/// Base model a customization extends when the caller does not pick one.
pub const DEFAULT_BASE_MODEL: &str = "en-US_BroadbandModel";

/// Handle on one customization model.
///
/// The service owns all model state; the handle keeps only a transient
/// best-effort mirror (`name`, `description`, `base_model`, the id) for its
/// own lifetime. Operations are strictly sequential and blocking.
pub struct ModelHandle {
    base_url: String,
    transport: Arc<dyn Transport>,
    poll: PollConfig,
    customization_id: Option<String>,
    name: String,
    description: String,
    base_model: String,
    last_status: Option<ModelStatus>,
}

impl ModelHandle {
    /// Unbound handle over the real HTTP transport.
    pub fn new(creds: &Credentials) -> ClientResult<Self> {
        Ok(Self::with_transport(
            creds.url.clone(),
            Arc::new(HttpTransport::new(&creds.api_key)?),
        ))
    }

    /// Handle bound to an existing model.
    pub fn bound(creds: &Credentials, customization_id: impl Into<String>) -> ClientResult<Self> {
        let mut handle = Self::new(creds)?;
        handle.customization_id = Some(customization_id.into());
        Ok(handle)
    }

    /// Handle over an arbitrary transport (tests script one).
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            poll: PollConfig::every(TRAIN_POLL_INTERVAL),
            customization_id: None,
            name: String::new(),
            description: String::new(),
            base_model: String::new(),
            last_status: None,
        }
    }

    /// Replace the polling strategy used by [`Self::train`].
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Bind the handle to an existing model id.
    pub fn bind(&mut self, customization_id: impl Into<String>) {
        self.customization_id = Some(customization_id.into());
    }

    pub fn customization_id(&self) -> Option<&str> {
        self.customization_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn base_model(&self) -> &str {
        &self.base_model
    }

    /// Status mirror from the last lifecycle transition this handle drove.
    /// Purely informational; [`Self::status`] is the live value.
    pub fn last_status(&self) -> Option<&ModelStatus> {
        self.last_status.as_ref()
    }

    /// Create a new customization model and bind this handle to it.
    ///
    /// Returns the `customization_id` assigned by the service.
    pub fn create(
        &mut self,
        name: &str,
        description: &str,
        base_model: Option<&str>,
    ) -> ClientResult<String> {
        if name.trim().is_empty() {
            return Err(ClientError::Validation(
                "the model name must be non-empty text".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(ClientError::Validation(
                "the model description must be non-empty text".to_string(),
            ));
        }
        let base_model = base_model.unwrap_or(DEFAULT_BASE_MODEL);

        let payload = serde_json::json!({
            "name": name,
            "base_model_name": base_model,
            "description": description,
        });
        let req = ApiRequest::json(
            Method::POST,
            format!("{}/v1/customizations", self.base_url),
            &payload,
        )?;
        let resp = self.transport.send(&req)?;

        if resp.status != 201 {
            return Err(classify_status(resp.status, &resp.text()));
        }

        let body: Value = resp.json()?;
        let id = body
            .get("customization_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClientError::Protocol("creation response is missing 'customization_id'".to_string())
            })?
            .to_string();

        info!(customization_id = %id, name, "Model created");
        self.customization_id = Some(id.clone());
        self.name = name.to_string();
        self.description = description.to_string();
        self.base_model = base_model.to_string();
        self.last_status = Some(ModelStatus::Pending);
        Ok(id)
    }

    /// Upload a corpus file. The corpus name is the file's base name
    /// without its extension.
    pub fn add_corpus(&self, corpus_path: &Path) -> ClientResult<String> {
        let id = self.require_id()?;

        if !corpus_path.is_file() {
            return Err(ClientError::NotFound(format!(
                "no such corpus file: {}",
                corpus_path.display()
            )));
        }
        let corpus_name = corpus_path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| {
                ClientError::Validation(format!(
                    "cannot derive a corpus name from '{}'",
                    corpus_path.display()
                ))
            })?
            .to_string();

        let data = std::fs::read(corpus_path)?;
        let url = format!(
            "{}/v1/customizations/{}/corpora/{}",
            self.base_url, id, corpus_name
        );
        let resp = self
            .transport
            .send(&ApiRequest::bytes(Method::POST, url, None, data))?;

        if resp.status != 201 {
            return Err(ClientError::Protocol(format!(
                "corpus upload failed with HTTP {}: {}",
                resp.status,
                resp.text()
            )));
        }
        info!(corpus = %corpus_name, customization_id = %id, "Corpus accepted");
        Ok(corpus_name)
    }

    /// Fetch the model's current status from the service.
    pub fn status(&self) -> ClientResult<ModelStatus> {
        let id = self.require_id()?;
        let url = format!("{}/v1/customizations/{}", self.base_url, id);
        let resp = self.transport.send(&ApiRequest::new(Method::GET, url))?;

        if resp.status != 200 {
            return Err(ClientError::Protocol(format!(
                "status check failed with HTTP {}: {}",
                resp.status,
                resp.text()
            )));
        }
        let body: Value = resp.json()?;
        let raw = body
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Protocol("status response is missing 'status'".to_string()))?;
        let status = ModelStatus::parse(raw);
        debug!(customization_id = %id, %status, "Fetched model status");
        Ok(status)
    }

    /// Drive the model through training.
    ///
    /// Waits for the corpus to finish indexing (`ready`), issues the train
    /// request, then waits for `available`. Both waits follow this handle's
    /// [`PollConfig`]. If the model is still `pending` (no corpus), nothing
    /// is started and [`TrainingOutcome::CorpusRequired`] is returned.
    pub fn train(&mut self) -> ClientResult<TrainingOutcome> {
        let id = self.require_id()?;

        if self.status()? == ModelStatus::Pending {
            info!(
                customization_id = %id,
                "Model has no corpus yet; add one with add_corpus before training"
            );
            return Ok(TrainingOutcome::CorpusRequired);
        }

        wait_until(&self.poll, || Ok(self.status()? == ModelStatus::Ready))?;

        info!(customization_id = %id, "Training beginning");
        let url = format!("{}/v1/customizations/{}/train", self.base_url, id);
        let resp = self.transport.send(&ApiRequest::new(Method::POST, url))?;
        if resp.status != 200 {
            return Err(ClientError::Protocol(format!(
                "train request rejected with HTTP {}: {}",
                resp.status,
                resp.text()
            )));
        }
        let ack: Value = if resp.body.is_empty() {
            Value::Null
        } else {
            resp.json()?
        };

        info!(customization_id = %id, "Training in progress");
        wait_until(&self.poll, || Ok(self.status()? == ModelStatus::Available))?;

        info!(customization_id = %id, "Training has finished");
        self.last_status = Some(ModelStatus::Available);
        Ok(TrainingOutcome::Completed(ack))
    }

    /// Transcribe an audio file against this model.
    ///
    /// The content type is derived from the file extension (`clip.wav` →
    /// `audio/wav`). This is a heuristic, not a MIME sniff; an unsupported
    /// suffix is forwarded as-is and rejected by the service.
    pub fn transcribe(&self, audio_path: &Path) -> ClientResult<Transcription> {
        let id = self.require_id()?;

        if !audio_path.is_file() {
            return Err(ClientError::NotFound(format!(
                "no such audio file: {}",
                audio_path.display()
            )));
        }
        let extension = audio_path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_default();
        let content_type = format!("audio/{extension}");

        let data = std::fs::read(audio_path)?;
        let url = format!(
            "{}/v1/recognize?language_customization_id={}",
            self.base_url, id
        );
        info!(audio = %audio_path.display(), customization_id = %id, "Transcribing");
        let resp = self
            .transport
            .send(&ApiRequest::bytes(Method::POST, url, Some(content_type), data))?;

        if resp.status != 200 {
            return Err(ClientError::Protocol(format!(
                "transcription failed with HTTP {}: {}",
                resp.status,
                resp.text()
            )));
        }
        resp.json()
    }

    fn require_id(&self) -> ClientResult<String> {
        self.customization_id.clone().ok_or_else(|| {
            ClientError::InvalidState(
                "no customization id is bound; create a model first".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::transport::scripted::ScriptedTransport;
    use crate::transport::ApiResponse;

    const BASE: &str = "https://api.example.com";

    fn handle(responses: Vec<ApiResponse>) -> (ModelHandle, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        let handle = ModelHandle::with_transport(BASE, transport.clone())
            .with_poll_config(PollConfig::every(Duration::ZERO));
        (handle, transport)
    }

    fn reply(status: u16, body: &str) -> ApiResponse {
        ScriptedTransport::reply(status, body)
    }

    // ── create ────────────────────────────────────────────────────────────────

    #[test]
    fn create_returns_id_from_body_and_binds_handle() {
        let (mut h, t) = handle(vec![reply(201, r#"{"customization_id": "id-1"}"#)]);
        let id = h.create("news model", "broadcast vocabulary", None).unwrap();

        assert_eq!(id, "id-1");
        assert_eq!(h.customization_id(), Some("id-1"));
        assert_eq!(h.name(), "news model");
        assert_eq!(h.description(), "broadcast vocabulary");
        assert_eq!(h.base_model(), DEFAULT_BASE_MODEL);
        assert_eq!(h.last_status(), Some(&ModelStatus::Pending));
        assert_eq!(t.calls(), 1);

        let req = t.request(0);
        assert_eq!(req.url, format!("{BASE}/v1/customizations"));
        assert_eq!(req.content_type.as_deref(), Some("application/json"));
        let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["base_model_name"], DEFAULT_BASE_MODEL);
    }

    #[test]
    fn create_rejects_blank_inputs_before_any_network_call() {
        let (mut h, t) = handle(vec![]);
        assert!(matches!(
            h.create("  ", "descr", None),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            h.create("name", "", None),
            Err(ClientError::Validation(_))
        ));
        assert_eq!(t.calls(), 0);
    }

    #[test]
    fn create_without_id_in_body_is_a_protocol_error() {
        let (mut h, t) = handle(vec![reply(201, r#"{"blah": "blah"}"#)]);
        assert!(matches!(
            h.create("name", "descr", None),
            Err(ClientError::Protocol(_))
        ));
        assert_eq!(t.calls(), 1);
        assert!(h.customization_id().is_none());
    }

    #[test]
    fn create_maps_service_failures() {
        let cases = [
            (400, "InvalidRequest"),
            (401, "Authentication"),
            (500, "Service"),
        ];
        for (status, _) in cases {
            let (mut h, _) = handle(vec![reply(status, "nope")]);
            let err = h.create("name", "descr", None).unwrap_err();
            match status {
                400 => assert!(matches!(err, ClientError::InvalidRequest(_))),
                401 => assert!(matches!(err, ClientError::Authentication(_))),
                500 => assert!(matches!(err, ClientError::Service(_))),
                _ => unreachable!(),
            }
        }
    }

    // ── add_corpus ────────────────────────────────────────────────────────────

    #[test]
    fn add_corpus_derives_name_from_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "one two three").unwrap();

        let (mut h, t) = handle(vec![reply(201, "")]);
        h.bind("id-1");
        let name = h.add_corpus(&path).unwrap();

        assert_eq!(name, "vocab");
        let req = t.request(0);
        assert_eq!(req.url, format!("{BASE}/v1/customizations/id-1/corpora/vocab"));
        assert_eq!(req.content_type, None);
        assert!(req.body.is_some());
    }

    #[test]
    fn add_corpus_with_missing_file_fails_before_any_network_call() {
        let (mut h, t) = handle(vec![]);
        h.bind("id-1");
        let err = h.add_corpus(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(t.calls(), 0);
    }

    #[test]
    fn add_corpus_non_201_is_a_protocol_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "words").unwrap();

        let (mut h, _) = handle(vec![reply(409, "already processing")]);
        h.bind("id-1");
        assert!(matches!(
            h.add_corpus(&path),
            Err(ClientError::Protocol(_))
        ));
    }

    // ── status ────────────────────────────────────────────────────────────────

    #[test]
    fn status_requires_a_bound_id() {
        let (h, t) = handle(vec![]);
        assert!(matches!(h.status(), Err(ClientError::InvalidState(_))));
        assert_eq!(t.calls(), 0);
    }

    #[test]
    fn status_parses_the_live_value() {
        let (mut h, _) = handle(vec![reply(200, r#"{"status": "training"}"#)]);
        h.bind("id-1");
        assert_eq!(h.status().unwrap(), ModelStatus::Training);
    }

    #[test]
    fn status_without_field_is_a_protocol_error() {
        let (mut h, _) = handle(vec![reply(200, r#"{"name": "m"}"#)]);
        h.bind("id-1");
        assert!(matches!(h.status(), Err(ClientError::Protocol(_))));
    }

    // ── train ─────────────────────────────────────────────────────────────────

    #[test]
    fn train_without_bound_id_makes_zero_network_calls() {
        let (mut h, t) = handle(vec![]);
        assert!(matches!(h.train(), Err(ClientError::InvalidState(_))));
        assert_eq!(t.calls(), 0);
    }

    #[test]
    fn train_on_pending_model_is_a_soft_no_op() {
        let (mut h, t) = handle(vec![reply(200, r#"{"status": "pending"}"#)]);
        h.bind("id-1");
        assert_eq!(h.train().unwrap(), TrainingOutcome::CorpusRequired);
        // Only the status probe ran; the train endpoint was never called.
        assert_eq!(t.calls(), 1);
        assert!(t.requests().iter().all(|r| !r.url.ends_with("/train")));
    }

    #[test]
    fn train_polls_ready_starts_training_and_polls_available() {
        let (mut h, t) = handle(vec![
            reply(200, r#"{"status": "ready"}"#), // pending check
            reply(200, r#"{"status": "ready"}"#), // ready wait
            reply(200, r#"{"status": "training"}"#), // train ack
            reply(200, r#"{"status": "training"}"#), // available wait
            reply(200, r#"{"status": "available"}"#),
        ]);
        h.bind("id-1");

        let outcome = h.train().unwrap();
        match outcome {
            TrainingOutcome::Completed(ack) => assert_eq!(ack["status"], "training"),
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(h.last_status(), Some(&ModelStatus::Available));

        assert_eq!(t.calls(), 5);
        let train_req = t.request(2);
        assert_eq!(train_req.method, Method::POST);
        assert_eq!(train_req.url, format!("{BASE}/v1/customizations/id-1/train"));
    }

    #[test]
    fn train_start_rejection_is_a_protocol_error() {
        let (mut h, _) = handle(vec![
            reply(200, r#"{"status": "ready"}"#),
            reply(200, r#"{"status": "ready"}"#),
            reply(409, "training already queued"),
        ]);
        h.bind("id-1");
        assert!(matches!(h.train(), Err(ClientError::Protocol(_))));
    }

    #[test]
    fn train_accepts_an_empty_acknowledgement_body() {
        let (mut h, _) = handle(vec![
            reply(200, r#"{"status": "ready"}"#),
            reply(200, r#"{"status": "ready"}"#),
            reply(200, ""),
            reply(200, r#"{"status": "available"}"#),
        ]);
        h.bind("id-1");
        assert_eq!(h.train().unwrap(), TrainingOutcome::Completed(Value::Null));
    }

    #[test]
    fn train_rejects_a_malformed_acknowledgement_body() {
        let (mut h, _) = handle(vec![
            reply(200, r#"{"status": "ready"}"#),
            reply(200, r#"{"status": "ready"}"#),
            reply(200, "<html>gateway burp</html>"),
        ]);
        h.bind("id-1");
        assert!(matches!(h.train(), Err(ClientError::Json(_))));
    }

    // ── transcribe ────────────────────────────────────────────────────────────

    #[test]
    fn transcribe_derives_audio_content_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let (mut h, t) = handle(vec![reply(
            200,
            r#"{"results": [{"alternatives": [{"transcript": "hi", "confidence": 0.8}], "final": true}], "result_index": 0}"#,
        )]);
        h.bind("id-1");

        let transcription = h.transcribe(&path).unwrap();
        assert_eq!(transcription.results[0].alternatives[0].transcript, "hi");

        let req = t.request(0);
        assert_eq!(req.content_type.as_deref(), Some("audio/wav"));
        assert_eq!(
            req.url,
            format!("{BASE}/v1/recognize?language_customization_id=id-1")
        );
    }

    #[test]
    fn transcribe_with_missing_file_fails_before_any_network_call() {
        let (mut h, t) = handle(vec![]);
        h.bind("id-1");
        assert!(matches!(
            h.transcribe(Path::new("/no/clip.wav")),
            Err(ClientError::NotFound(_))
        ));
        assert_eq!(t.calls(), 0);
    }

    #[test]
    fn transcribe_non_200_is_a_protocol_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.flac");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let (mut h, _) = handle(vec![reply(415, "unsupported media type")]);
        h.bind("id-1");
        assert!(matches!(
            h.transcribe(&path),
            Err(ClientError::Protocol(_))
        ));
    }
}
