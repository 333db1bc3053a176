//! Port for HTTP exchanges with the form portal.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::domain::errors::PortalError;

/// HTTP method used against the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalMethod {
    /// GET request.
    Get,
    /// POST request with a JSON body.
    Post,
}

/// A single request against the portal, fully described.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalRequest {
    /// HTTP method.
    pub method: PortalMethod,
    /// Absolute URL.
    pub url: String,
    /// Extra headers, in insertion order.
    pub headers: Vec<(String, String)>,
    /// JSON body for POST requests.
    pub json_body: Option<serde_json::Value>,
}

impl PortalRequest {
    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: PortalMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            json_body: None,
        }
    }

    /// Creates a POST request carrying a JSON body.
    #[must_use]
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: PortalMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            json_body: Some(body),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a header when a value is present.
    #[must_use]
    pub fn header_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.header(name, value),
            None => self,
        }
    }

    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response returned by the portal.
#[derive(Debug, Clone, Default)]
pub struct PortalResponse {
    /// HTTP status code.
    pub status: u16,
    /// Final URL after redirects.
    pub url: String,
    /// Response headers with lowercase names.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: Bytes,
}

impl PortalResponse {
    /// Returns true for 2xx responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// First value of a header, by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Every value of a header, by case-insensitive name.
    pub fn headers_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        let name = name.to_owned();
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(&name))
            .map(|(_, value)| value.as_str())
    }

    /// Body decoded as lossy UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    ///
    /// # Errors
    /// Returns error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Port for executing requests against the portal.
/// Implementations apply a per-request timeout and hold no session state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalPort: Send + Sync {
    /// Executes a request. Non-2xx statuses are returned as responses, not errors.
    async fn send(&self, request: &PortalRequest) -> Result<PortalResponse, PortalError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Handler = dyn Fn(&PortalRequest) -> Result<PortalResponse, PortalError> + Send + Sync;

    /// Portal double answering through a closure and recording every request.
    pub struct RecordingPortal {
        handler: Box<Handler>,
        calls: Arc<AtomicUsize>,
        requests: parking_lot::Mutex<Vec<PortalRequest>>,
    }

    impl RecordingPortal {
        /// Creates a portal answering with `handler`.
        pub fn new(
            handler: impl Fn(&PortalRequest) -> Result<PortalResponse, PortalError>
            + Send
            + Sync
            + 'static,
        ) -> Self {
            Self {
                handler: Box::new(handler),
                calls: Arc::new(AtomicUsize::new(0)),
                requests: parking_lot::Mutex::new(Vec::new()),
            }
        }

        /// Number of requests received.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Copy of every request received, in order.
        pub fn requests(&self) -> Vec<PortalRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl PortalPort for RecordingPortal {
        async fn send(&self, request: &PortalRequest) -> Result<PortalResponse, PortalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(request.clone());
            (self.handler)(request)
        }
    }

    /// Builds a response with the given status and body.
    pub fn response(status: u16, url: &str, body: impl Into<Bytes>) -> PortalResponse {
        PortalResponse {
            status,
            url: url.to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Builds a 200 response with a JSON body.
    pub fn json_response(url: &str, body: &serde_json::Value) -> PortalResponse {
        response(200, url, body.to_string())
    }
}
