//! Publishing artifacts to a metadata repository.
//!
//! An artifact lives at `{endpoint}/artifacts/{namespace}/{name}/{version}`.
//! The client first asks the repository for the stored fingerprint; when it
//! equals the artifact's, nothing is uploaded. Otherwise the document is
//! `PUT` with its fingerprint in the [`FINGERPRINT_HEADER`] header.
//!
//! Timeouts, dropped connections and `408`/`429`/`5xx` answers are retried
//! with exponential backoff. Credential and validation failures are not.
//! A [`CancellationToken`] is checked before every attempt and interrupts
//! backoff sleeps.

pub mod errors;
pub mod transport;

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use url::Url;

use crate::core::artifact::{Coordinates, PublishArtifact, PublishReceipt, ReceiptStatus};

pub use errors::PublishError;
pub use transport::{Method, Request, ReqwestTransport, Response, Transport, TransportError};

/// Header carrying `sha256:<hex>` of the document.
pub const FINGERPRINT_HEADER: &str = "X-Content-Fingerprint";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Attempts per request, the first one included. Never zero.
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        RetryPolicy {
            base_delay,
            max_delay: max_delay.max(base_delay),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Fail on the first error.
    pub fn none() -> Self {
        RetryPolicy::new(Duration::ZERO, Duration::ZERO, 1)
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let delay = self.base_delay.saturating_mul(1u32 << exp);
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(Duration::from_millis(500), Duration::from_secs(5), 5)
    }
}

/// Cooperative cancellation shared between a caller and a running publish.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake any sleeping retry loop.
    pub fn cancel(&self) {
        let (flag, wakeup) = &*self.state;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `duration` unless cancelled first. Returns whether cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (flag, wakeup) = &*self.state;
        let deadline = Instant::now() + duration;
        let mut cancelled = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = wakeup
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *cancelled
    }
}

/// Repository location and credentials.
#[derive(Debug, Clone)]
pub struct PublishTarget {
    endpoint: Url,
    token: Option<String>,
}

impl PublishTarget {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, PublishError> {
        let mut endpoint = Url::parse(endpoint).map_err(|e| PublishError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(PublishError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                message: "expected an http or https URL".to_string(),
            });
        }
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Ok(PublishTarget { endpoint, token })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full URL of the artifact at `coordinates`.
    pub fn artifact_url(&self, coordinates: &Coordinates) -> Result<Url, PublishError> {
        self.endpoint
            .join(&coordinates.path())
            .map_err(|e| PublishError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
                message: e.to_string(),
            })
    }
}

/// Uploads artifacts over a [`Transport`].
#[derive(Debug)]
pub struct PublishClient<T: Transport = ReqwestTransport> {
    transport: T,
    retry: RetryPolicy,
    timeout: Duration,
    cancel: CancellationToken,
}

impl PublishClient<ReqwestTransport> {
    /// A client using `reqwest` with default retry and timeout settings.
    pub fn new() -> Result<Self, PublishError> {
        let transport = ReqwestTransport::new(&user_agent())
            .map_err(|e| PublishError::Client(e.to_string()))?;
        Ok(PublishClient::with_transport(transport))
    }
}

impl<T: Transport> PublishClient<T> {
    pub fn with_transport(transport: T) -> Self {
        PublishClient {
            transport,
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Publish `artifact` to `target`.
    ///
    /// Republishing an identical artifact succeeds with
    /// [`ReceiptStatus::Unchanged`] and uploads nothing.
    pub fn publish(
        &self,
        artifact: &PublishArtifact,
        target: &PublishTarget,
    ) -> Result<PublishReceipt, PublishError> {
        let url = target.artifact_url(artifact.coordinates())?;
        let fingerprint = artifact.fingerprint();
        let mut attempts = 0;
        info!("publishing {} to {}", artifact.coordinates(), url);

        let current = self.send(Method::Get, &url, target, None, &mut attempts)?;
        match current.status {
            404 => debug!("no artifact stored at {}", url),
            _ if current.is_success() => {
                if current.header(FINGERPRINT_HEADER) == Some(fingerprint) {
                    info!("{} is up to date ({})", artifact.coordinates(), fingerprint);
                    return Ok(receipt(artifact, url, ReceiptStatus::Unchanged, attempts));
                }
                debug!(
                    "stored fingerprint {:?} differs from {}",
                    current.header(FINGERPRINT_HEADER),
                    fingerprint
                );
            }
            _ => return Err(fatal(&url, &current)),
        }

        let uploaded = self.send(
            Method::Put,
            &url,
            target,
            Some(artifact.document()),
            &mut attempts,
        )?;
        if uploaded.is_success() {
            info!("published {} ({})", artifact.coordinates(), fingerprint);
            return Ok(receipt(artifact, url, ReceiptStatus::Created, attempts));
        }
        // An earlier attempt may have landed before its response was lost
        if uploaded.status == 409 && uploaded.header(FINGERPRINT_HEADER) == Some(fingerprint) {
            return Ok(receipt(artifact, url, ReceiptStatus::Unchanged, attempts));
        }
        Err(fatal(&url, &uploaded))
    }

    /// Send one request, retrying transient failures.
    ///
    /// Returns the first non-transient response, whatever its status.
    fn send(
        &self,
        method: Method,
        url: &Url,
        target: &PublishTarget,
        body: Option<&[u8]>,
        attempts: &mut u32,
    ) -> Result<Response, PublishError> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = &target.token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        if let Some(document) = body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
            headers.push((
                FINGERPRINT_HEADER.to_string(),
                crate::core::artifact::fingerprint_of(document),
            ));
        }
        let request = Request {
            method,
            url: url.clone(),
            headers,
            body,
            timeout: self.timeout,
        };

        let mut attempt = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(PublishError::Cancelled { attempts: *attempts });
            }
            attempt += 1;
            *attempts += 1;
            debug!(
                "{} {} (attempt {}/{})",
                method.as_str(),
                url,
                attempt,
                self.retry.max_attempts
            );

            let cause = match self.transport.send(&request) {
                Ok(response) if !is_transient(response.status) => return Ok(response),
                Ok(response) => format!("HTTP {}", response.status),
                Err(err) => err.to_string(),
            };

            if attempt >= self.retry.max_attempts {
                return Err(PublishError::Transient {
                    url: url.clone(),
                    attempts: *attempts,
                    cause,
                });
            }
            let delay = self.retry.delay_for_attempt(attempt);
            warn!(
                "{} {} failed ({}), retrying in {:?}",
                method.as_str(),
                url,
                cause,
                delay
            );
            if self.cancel.sleep(delay) {
                return Err(PublishError::Cancelled { attempts: *attempts });
            }
        }
    }
}

fn is_transient(status: u16) -> bool {
    matches!(status, 408 | 429) || (500..600).contains(&status)
}

/// Error for a non-transient failure status.
fn fatal(url: &Url, response: &Response) -> PublishError {
    match response.status {
        401 | 403 => PublishError::Auth {
            url: url.clone(),
            status: response.status,
        },
        status => PublishError::Rejected {
            url: url.clone(),
            status,
            message: response.body_excerpt(),
        },
    }
}

fn receipt(
    artifact: &PublishArtifact,
    location: Url,
    status: ReceiptStatus,
    attempts: u32,
) -> PublishReceipt {
    PublishReceipt {
        coordinates: artifact.coordinates().clone(),
        fingerprint: artifact.fingerprint().to_string(),
        location,
        status,
        attempts,
    }
}

/// `User-Agent` sent with every request.
pub fn user_agent() -> String {
    format!("confmeta/{}", env!("CARGO_PKG_VERSION"))
}
