//! Attester HTTP surface (spec §4.10, ambient): wire types and a thin
//! `reqwest` client for the pool of TEE attester endpoints the dispatcher
//! (C9) balances load across.
//!
//! Grounded in `example/common/attester/models/app.go`'s `RelyingPartyQuery`
//! request shape and `{result, report}` response shape, and in
//! `example/common/attester/main.go`'s `HEAD /health_check` /
//! `POST /` routes (the health-check route is what
//! [`crate::dispatcher::pool::AttesterEndpoint`] polls every 60s).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claim::Computation;

#[derive(Debug, Error)]
pub enum AttesterClientError {
    #[error("attester request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("attester returned an error body: {0}")]
    AttesterError(String),
}

/// The request body `POST /` expects, matching `app.go`'s
/// `RelyingPartyQuery{ClaimType, Computation, Input, Nonce}` field for
/// field (this crate only ever asks for the TEE-computation claim type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelyingPartyQuery {
    pub claim_type: String,
    pub computation: Computation,
    pub input: Vec<String>,
    pub nonce: String,
}

impl RelyingPartyQuery {
    pub fn for_computation(computation: Computation, input: Vec<String>, nonce: String) -> Self {
        Self { claim_type: "TEEComputation".to_string(), computation, input, nonce }
    }
}

/// `{result, report}` — the attester's response body. `report` is the raw
/// attestation blob handed to [`crate::tpm`] for PCR-replay verification,
/// base64-encoded on the wire like every other opaque byte field in this
/// protocol (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelyingPartyResponse {
    pub result: String,
    #[serde(with = "crate::helpers::base64_bytes")]
    pub report: Vec<u8>,
}

/// A single attester endpoint's HTTP surface. `base_url` carries no
/// trailing slash; callers of [`crate::dispatcher::pool`] hold one of
/// these per pool entry.
pub struct AttesterClient {
    http: reqwest::Client,
    base_url: String,
}

impl AttesterClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(480))
                .build()
                .expect("reqwest client construction is infallible with only a timeout set"),
            base_url: base_url.into(),
        }
    }

    /// `HEAD /health_check`: used by the load balancer's 60s health-check
    /// ticker. Any non-2xx status, or a transport error, counts as down.
    pub async fn health_check(&self) -> bool {
        self.http
            .head(format!("{}/health_check", self.base_url))
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    /// `POST /`: submit a computation for attestation and await its
    /// signed result.
    pub async fn attest(
        &self,
        query: &RelyingPartyQuery,
    ) -> Result<RelyingPartyResponse, AttesterClientError> {
        let resp = self
            .http
            .post(&self.base_url)
            .json(query)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AttesterClientError::AttesterError(e.to_string()))?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relying_party_query_always_tags_tee_computation() {
        let q = RelyingPartyQuery::for_computation(
            Computation::ImgClass,
            vec!["in".to_string()],
            "1".to_string(),
        );
        assert_eq!(q.claim_type, "TEEComputation");
    }
}
