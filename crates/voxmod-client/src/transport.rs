use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Service endpoint credentials.
///
/// Always constructed explicitly by the caller; the library never reads
/// configuration or environment state on its own.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub url: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut url: String = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self {
            url,
            api_key: api_key.into(),
        }
    }
}

/// A single request against the service API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            content_type: None,
            body: None,
        }
    }

    /// Request carrying a JSON body.
    pub fn json(method: Method, url: impl Into<String>, value: &impl Serialize) -> ClientResult<Self> {
        Ok(Self {
            method,
            url: url.into(),
            content_type: Some("application/json".to_string()),
            body: Some(serde_json::to_vec(value)?),
        })
    }

    /// Request carrying raw bytes (corpus uploads, audio submissions).
    pub fn bytes(
        method: Method,
        url: impl Into<String>,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method,
            url: url.into(),
            content_type,
            body: Some(body),
        }
    }
}

/// Status plus raw body; decoding is left to the caller.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Seam between the clients and the wire.
///
/// Production uses [`HttpTransport`]; tests script a fake so call counts and
/// request shapes can be asserted without a network.
pub trait Transport: Send + Sync {
    fn send(&self, req: &ApiRequest) -> ClientResult<ApiResponse>;
}

/// Blocking reqwest transport.
///
/// Every request is authenticated with basic auth: literal username
/// `apikey`, the configured API key as password.
pub struct HttpTransport {
    http: Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: &str) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("voxmod/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, req: &ApiRequest) -> ClientResult<ApiResponse> {
        debug!(method = %req.method, url = %req.url, "Sending request");

        let mut builder = self
            .http
            .request(req.method.clone(), &req.url)
            .basic_auth("apikey", Some(&self.api_key));
        if let Some(ct) = &req.content_type {
            builder = builder.header(reqwest::header::CONTENT_TYPE, ct);
        }
        if let Some(body) = &req.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        debug!(status, bytes = body.len(), "Received response");

        Ok(ApiResponse { status, body })
    }
}

/// Convenience for sharing a transport across clients.
pub type SharedTransport = Arc<dyn Transport>;

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Transport fed a fixed queue of responses.
    ///
    /// Records every request so tests can assert on call counts and on the
    /// shape of individual requests.
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<ApiResponse>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(responses: Vec<ApiResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn reply(status: u16, body: &str) -> ApiResponse {
            ApiResponse {
                status,
                body: body.as_bytes().to_vec(),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub(crate) fn request(&self, index: usize) -> ApiRequest {
            self.requests.lock().unwrap()[index].clone()
        }

        pub(crate) fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, req: &ApiRequest) -> ClientResult<ApiResponse> {
            self.requests.lock().unwrap().push(req.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ClientError::Protocol("scripted transport ran out of responses".into()))
        }
    }
}
