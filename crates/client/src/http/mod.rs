//! Authenticated HTTP client for the shop API.
//!
//! Wraps `reqwest` with the behavior every surface of the SDK relies on:
//!
//! - the access credential is an HTTP-only cookie held in the client's
//!   cookie store and attached to every outbound call;
//! - a 401 on a first attempt triggers a single coordinated credential
//!   renewal (see [`refresh`]); requests that 401 while the renewal is in
//!   flight queue up behind it and replay once it resolves;
//! - a failed renewal tears the batch down with
//!   [`ApiError::SessionExpired`] and broadcasts one process-wide
//!   [`Unauthorized`] signal for the session owner to consume.
//!
//! # Example
//!
//! ```rust,ignore
//! use jacaranda_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(&ClientConfig::from_env()?)?;
//! let products: Vec<Product> = client.get("/products").await?;
//! ```

mod payload;
mod refresh;

pub use payload::{FormPart, Payload};

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use refresh::{RefreshGate, RefreshOutcome, RefreshTicket};

/// Path of the backend's credential renewal endpoint.
const REFRESH_PATH: &str = "/auth/refresh";

const USER_AGENT: &str = concat!("jacaranda-client/", env!("CARGO_PKG_VERSION"));

/// Broadcast notice that the session is no longer valid.
///
/// Emitted exactly once per failed renewal, regardless of how many requests
/// were queued behind it. The identity-owning component (the session) is
/// the intended consumer; the transport layer only detects the condition.
#[derive(Debug, Clone, Copy)]
pub struct Unauthorized;

/// Whether a call is a first attempt or a post-refresh replay.
///
/// A replay can never trigger another renewal; a 401 on a replay surfaces
/// as an ordinary HTTP error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Replay,
}

/// What a single send produced, before refresh handling.
enum Reply {
    Ok(serde_json::Value),
    Unauthorized,
}

/// Client for the shop's REST API.
///
/// Cheap to clone; all clones share one cookie store, one refresh gate, and
/// one unauthorized broadcast.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    gate: RefreshGate,
    unauthorized: broadcast::Sender<Unauthorized>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;
        let (unauthorized, _) = broadcast::channel(8);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api_base().to_owned(),
                gate: RefreshGate::new(),
                unauthorized,
            }),
        })
    }

    /// Subscribe to the global unauthorized signal.
    #[must_use]
    pub fn subscribe_unauthorized(&self) -> broadcast::Receiver<Unauthorized> {
        self.inner.unauthorized.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Convenience wrappers
    // ─────────────────────────────────────────────────────────────────────

    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, Payload::Empty).await
    }

    /// Issue a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Payload::json(body)?).await
    }

    /// Issue a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PATCH, path, Payload::json(body)?)
            .await
    }

    /// Issue a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, Payload::Empty).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Core request path
    // ─────────────────────────────────────────────────────────────────────

    /// Issue a request and deserialize the JSON response.
    ///
    /// An empty response body deserializes as `()`. A 401 is handled
    /// transparently via the refresh gate and never reaches the caller
    /// unless the renewal itself fails.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] - transport failure, never retried
    /// - [`ApiError::Http`] - non-success status with its parsed payload
    /// - [`ApiError::SessionExpired`] - 401 followed by a failed renewal
    /// - [`ApiError::Serde`] - response did not match `T`
    #[instrument(skip(self, payload), fields(method = %method, path))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<T> {
        let value = match self.send(method.clone(), path, &payload, Attempt::Initial).await? {
            Reply::Ok(value) => value,
            Reply::Unauthorized => self.renew_and_replay(method, path, &payload).await?,
        };
        Ok(serde_json::from_value(value)?)
    }

    /// Perform one HTTP round trip.
    ///
    /// On a first attempt a 401 is reported as [`Reply::Unauthorized`] for
    /// the refresh machinery; on a replay it falls through to an ordinary
    /// [`ApiError::Http`].
    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: &Payload,
        attempt: Attempt,
    ) -> Result<Reply> {
        let url = format!("{}{path}", self.inner.base_url);
        let request = payload.apply(self.inner.http.request(method, url));
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED && attempt == Attempt::Initial {
            return Ok(Reply::Unauthorized);
        }

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::http(status, &body));
        }

        if body.is_empty() {
            return Ok(Reply::Ok(serde_json::Value::Null));
        }
        Ok(Reply::Ok(serde_json::from_slice(&body)?))
    }

    /// Replay a call once after a successful renewal.
    async fn replay(&self, method: Method, path: &str, payload: &Payload) -> Result<serde_json::Value> {
        match self.send(method, path, payload, Attempt::Replay).await? {
            Reply::Ok(value) => Ok(value),
            // Unreachable on replays; send() surfaces the 401 as Http.
            Reply::Unauthorized => Err(ApiError::SessionExpired),
        }
    }

    /// Handle a 401 on a first attempt: coordinate the renewal and replay.
    async fn renew_and_replay(
        &self,
        method: Method,
        path: &str,
        payload: &Payload,
    ) -> Result<serde_json::Value> {
        match self.inner.gate.join() {
            RefreshTicket::Follower(outcome) => {
                debug!(path, "renewal in flight, queueing request");
                match outcome.await {
                    Ok(RefreshOutcome::Refreshed) => self.replay(method, path, payload).await,
                    Ok(RefreshOutcome::Expired) | Err(_) => Err(ApiError::SessionExpired),
                }
            }
            RefreshTicket::Leader => match self.renew_credential().await {
                Ok(()) => {
                    // The leader replays before releasing the queue, so the
                    // drain strictly follows the renewal's completion.
                    let result = self.replay(method, path, payload).await;
                    self.inner.gate.finish(RefreshOutcome::Refreshed);
                    result
                }
                Err(error) => {
                    warn!(%error, "credential renewal failed, tearing down session");
                    let _ = self.inner.unauthorized.send(Unauthorized);
                    self.inner.gate.finish(RefreshOutcome::Expired);
                    Err(ApiError::SessionExpired)
                }
            },
        }
    }

    /// Issue exactly one renewal call against the backend.
    ///
    /// The refreshed credential cookie is captured by the shared cookie
    /// store, so replays pick it up without further bookkeeping.
    async fn renew_credential(&self) -> Result<()> {
        info!("renewing access credential");
        let url = format!("{}{REFRESH_PATH}", self.inner.base_url);
        let response = self.inner.http.post(url).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.bytes().await.unwrap_or_default();
            Err(ApiError::http(status, &body))
        }
    }
}
