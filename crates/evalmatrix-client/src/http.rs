//! HTTP client for the training REST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::instrument;

use evalmatrix_core::attendance::{PresenceEntry, PresenceRecord, SessionDate};
use evalmatrix_core::error::{BackendError, MSG_SERVER_ERROR};
use evalmatrix_core::model::{MatrixSnapshot, SaveRecord};
use evalmatrix_core::traits::{AttendanceBackend, EvaluationBackend};

use crate::wire::{
    Envelope, ErrorBody, RecordPresencesBody, SaveEvaluationsBody, WireDates, WireMatrix,
    WirePresence,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the evaluation and attendance endpoints.
pub struct ApiClient {
    base_url: String,
    base: reqwest::Url,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://10.0.2.2:3000/api`).
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, BackendError> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let base = reqwest::Url::parse(&base_url)
            .map_err(|e| BackendError::Network(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            base_url,
            base,
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append path segments to the base URL. Each segment is
    /// percent-encoded, so ids cannot change the route.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::Network(format!("base URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            BackendError::Network(format!("API not reachable at {}", self.base_url))
        } else {
            BackendError::Network(e.to_string())
        }
    }

    /// Turn a non-2xx response into `BackendError::Server`, using the
    /// server's `message` when it sends one.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| MSG_SERVER_ERROR.to_string());
        tracing::error!(status, body = %body, "API error response");
        Err(BackendError::Server { status, message })
    }

    async fn get_data<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, BackendError> {
        let path = url.path().to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.check(response).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("{path}: {e}")))?;
        Ok(envelope.data)
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        url: reqwest::Url,
        body: &B,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl EvaluationBackend for ApiClient {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch_matrix(&self, session_id: &str) -> Result<MatrixSnapshot, BackendError> {
        let wire: WireMatrix = self
            .get_data(self.endpoint(&["evaluations", "session", session_id, "matrix"])?)
            .await?;
        Ok(wire.into_snapshot(session_id))
    }

    #[instrument(skip(self, batch), fields(records = batch.len()))]
    async fn save_evaluations(&self, batch: &[SaveRecord]) -> Result<(), BackendError> {
        self.post_json(
            self.endpoint(&["evaluations"])?,
            &SaveEvaluationsBody::new(batch),
        )
        .await
    }
}

#[async_trait]
impl AttendanceBackend for ApiClient {
    #[instrument(skip(self))]
    async fn session_dates(&self, session_id: &str) -> Result<Vec<SessionDate>, BackendError> {
        let wire: WireDates = self
            .get_data(self.endpoint(&["presences", "session", session_id, "dates"])?)
            .await?;
        Ok(wire.dates.into_iter().map(SessionDate::from).collect())
    }

    #[instrument(skip(self))]
    async fn presences_for(
        &self,
        session_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<PresenceEntry>, BackendError> {
        let mut url = self.endpoint(&["presences", "session", session_id, "date"])?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());
        let wire: Vec<WirePresence> = self.get_data(url).await?;
        Ok(wire.into_iter().map(PresenceEntry::from).collect())
    }

    #[instrument(skip(self, batch), fields(records = batch.len()))]
    async fn record_presences(&self, batch: &[PresenceRecord]) -> Result<(), BackendError> {
        self.post_json(
            self.endpoint(&["presences"])?,
            &RecordPresencesBody::new(batch),
        )
        .await
    }
}
