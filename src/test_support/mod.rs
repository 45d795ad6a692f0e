//! Test utilities and mocks for Confmeta unit tests.
//!
//! This module provides Java fixture trees and a mock implementation of the
//! publish transport, which is otherwise hard to test in isolation.
//!
//! # Example
//!
//! ```rust,ignore
//! use confmeta::test_support::{MockTransport, MockResponse};
//!
//! #[test]
//! fn test_example() {
//!     let transport = MockTransport::new();
//!     transport.push(MockResponse::status(404));
//!     transport.push(MockResponse::status(201));
//!
//!     // Publish through the transport, then inspect `transport.requests()`...
//! }
//! ```

pub mod fixtures;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use crate::publish::transport::{Method, Request, Response, Transport, TransportError};

// Re-export fixtures for convenience
pub use fixtures::*;

/// A canned transport outcome.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Reply(Response),
    Fail(TransportError),
}

impl MockResponse {
    /// A response with `status` and no headers.
    pub fn status(status: u16) -> Self {
        MockResponse::Reply(Response {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        })
    }

    /// A `200` response to a `GET` carrying a stored fingerprint.
    pub fn stored(fingerprint: &str) -> Self {
        MockResponse::Reply(Response {
            status: 200,
            headers: vec![(
                crate::publish::FINGERPRINT_HEADER.to_string(),
                fingerprint.to_string(),
            )],
            body: Vec::new(),
        })
    }

    /// A response with a body.
    pub fn with_body(status: u16, body: &str) -> Self {
        MockResponse::Reply(Response {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        })
    }

    pub fn timeout() -> Self {
        MockResponse::Fail(TransportError::Timeout)
    }

    pub fn connection_reset() -> Self {
        MockResponse::Fail(TransportError::Connection("connection reset by peer".to_string()))
    }
}

/// A request as seen by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Transport replaying queued responses and recording every request.
///
/// When the queue is empty every request fails with a connection error.
/// Clones share state, so a test can keep one handle and give the other
/// to the client.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next request.
    pub fn push(&self, response: MockResponse) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// All requests seen so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests with the given method.
    pub fn count(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &Request<'_>) -> Result<Response, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.map(<[u8]>::to_vec).unwrap_or_default(),
            timeout: request.timeout,
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(MockResponse::Reply(response)) => Ok(response),
            Some(MockResponse::Fail(err)) => Err(err),
            None => Err(TransportError::Connection("no response queued".to_string())),
        }
    }
}
