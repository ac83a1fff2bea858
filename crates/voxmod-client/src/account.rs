//! Account-scoped operations: inventory listing and model deletion.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::error::{classify_status, ClientError, ClientResult};
use crate::poll::{wait_until, PollConfig, DELETE_PROBE_INTERVAL};
use crate::transport::{ApiRequest, Credentials, HttpTransport, Transport};
use crate::types::{ModelInventory, ModelRecord};

/// Client for operations that span the whole account rather than one model.
pub struct AccountClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    probe: PollConfig,
}

impl AccountClient {
    pub fn new(creds: &Credentials) -> ClientResult<Self> {
        Ok(Self::with_transport(
            creds.url.clone(),
            Arc::new(HttpTransport::new(&creds.api_key)?),
        ))
    }

    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            probe: PollConfig::every(DELETE_PROBE_INTERVAL),
        }
    }

    /// Replace the polling strategy used for deletion confirmation.
    pub fn with_poll_config(mut self, probe: PollConfig) -> Self {
        self.probe = probe;
        self
    }

    /// The full account model inventory, unfiltered.
    pub fn list_models(&self) -> ClientResult<Vec<ModelRecord>> {
        let url = format!("{}/v1/customizations", self.base_url);
        let resp = self.transport.send(&ApiRequest::new(Method::GET, url))?;
        if resp.status != 200 {
            return Err(classify_status(resp.status, &resp.text()));
        }
        let inventory: ModelInventory = resp.json()?;
        debug!(count = inventory.customizations.len(), "Fetched account inventory");
        Ok(inventory.customizations)
    }

    /// Inventory sorted newest first. Backs the `latest` sentinel and the
    /// interactive model pickers.
    pub fn list_models_newest_first(&self) -> ClientResult<Vec<ModelRecord>> {
        let mut models = self.list_models()?;
        models.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(models)
    }

    /// The most recently created model on the account, if any.
    pub fn latest_model(&self) -> ClientResult<Option<ModelRecord>> {
        Ok(self.list_models_newest_first()?.into_iter().next())
    }

    /// Delete one model and wait until the service confirms it is gone.
    ///
    /// A rejected delete request is reported as `Ok(false)` with a logged
    /// diagnostic so bulk callers can decide how to continue; only failures
    /// during the confirmation wait are raised as errors.
    pub fn delete_model(&self, customization_id: &str) -> ClientResult<bool> {
        let url = format!("{}/v1/customizations/{}", self.base_url, customization_id);
        let resp = self.transport.send(&ApiRequest::new(Method::DELETE, url))?;

        match resp.status {
            200 => {
                info!(customization_id, "Deletion accepted; waiting for the model to disappear");
                wait_until(&self.probe, || self.probe_deleted(customization_id))?;
                info!(customization_id, "Model deleted");
                Ok(true)
            }
            400 => {
                warn!(customization_id, detail = %resp.text(), "Delete rejected: bad customization id");
                Ok(false)
            }
            401 => {
                warn!(customization_id, detail = %resp.text(), "Delete rejected: unauthorized");
                Ok(false)
            }
            409 => {
                warn!(customization_id, detail = %resp.text(), "Delete rejected: the model is in use");
                Ok(false)
            }
            500 => {
                warn!(customization_id, "Delete rejected: service error");
                Ok(false)
            }
            other => {
                warn!(customization_id, status = other, "Delete rejected: unexpected status");
                Ok(false)
            }
        }
    }

    /// One existence probe during deletion confirmation.
    ///
    /// 200 means the model is still there, keep waiting; 404 confirms it is
    /// gone. 401 is an authentication fault and never counts as
    /// confirmation; 400 and 5xx abort the wait. Anything else is treated
    /// as non-terminal.
    fn probe_deleted(&self, customization_id: &str) -> ClientResult<bool> {
        let url = format!("{}/v1/customizations/{}", self.base_url, customization_id);
        let resp = self.transport.send(&ApiRequest::new(Method::GET, url))?;
        match resp.status {
            200 => Ok(false),
            404 => Ok(true),
            401 => Err(ClientError::Authentication(
                "the service rejected the credentials during deletion confirmation".to_string(),
            )),
            400 | 500..=599 => Err(ClientError::Protocol(format!(
                "deletion confirmation failed with HTTP {}: {}",
                resp.status,
                resp.text()
            ))),
            _ => Ok(false),
        }
    }
}
