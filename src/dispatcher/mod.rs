//! Attester dispatcher (C9, spec §4.9): load-balances compute requests
//! across a pool of TEE attester endpoints, retries against a different
//! endpoint on failure, gates each request on a verified payment claim,
//! and hands the resulting claim to the VSL client for submission.
//!
//! Grounded in `example/vsl-rpc-demo/cmd/backend-server/models/app.go`'s
//! `SendToAttester`/`SendToVSL` pair. Go's bounded `ants` worker pools
//! (`WorkerPool1` capacity 100, `WorkerPool2` capacity 500) are modeled as
//! `tokio::sync::Semaphore`s sized from [`crate::config::Config`], since
//! `tokio` is already the teacher's async runtime and no bounded-pool crate
//! appears elsewhere in the retrieval pack.

pub mod payment;
pub mod pool;

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonrpsee::core::client::ClientT;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::attester_client::{AttesterClientError, RelyingPartyQuery};
use crate::claim::Computation;
use crate::claim::tee::{TeeComputationClaim, TeeComputationClaimVerificationContext};
use crate::generation::tee_gen::generate_tee_computation_claim;
use crate::metrics::DispatcherMetrics;
use crate::vsl_client::VslClient;
use crate::{Address, B256};

use payment::{PaymentError, SignedComputeRequest, SpentPaymentClaims, verify_user_payment};
use pool::AttesterPool;

#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("our servers are at capacity, please try again later")]
    AtCapacity,
    #[error("no attester servers available")]
    NoAttesterAvailable,
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Attester(#[from] AttesterClientError),
    #[error("attestation could not be generated after {retries} retries: {source}")]
    GenerationFailed {
        retries: u32,
        #[source]
        source: AttesterClientError,
    },
}

/// One incoming compute request, carrying everything [`Dispatcher::dispatch`]
/// needs: the payment-gate material plus the computation itself.
pub struct DispatchRequest {
    pub computation: Computation,
    pub input: Vec<String>,
    pub nonce: Vec<u8>,
    pub payment: SignedComputeRequest,
}

/// A dispatched claim, ready for a caller to submit to the ledger via
/// [`crate::vsl_client::VslClient`].
pub struct DispatchedClaim {
    pub claim: TeeComputationClaim,
    pub context: TeeComputationClaimVerificationContext,
}

/// Bounds how many requests may be in flight against attesters and against
/// the ledger concurrently, per spec §5's capacities (100 / 500 by
/// default, see [`crate::config::Config`]).
pub struct Dispatcher<T> {
    pool: AttesterPool,
    metrics: Arc<DispatcherMetrics>,
    spent_payments: SpentPaymentClaims,
    vsl: VslClient<T>,
    backend_address: Address,
    attester_semaphore: Arc<Semaphore>,
    ledger_semaphore: Arc<Semaphore>,
    max_retries: u32,
}

impl<T> Dispatcher<T>
where
    T: ClientT + Clone,
{
    pub fn new(
        pool: AttesterPool,
        vsl: VslClient<T>,
        backend_address: Address,
        attester_pool_capacity: usize,
        ledger_pool_capacity: usize,
        max_retries: u32,
    ) -> Self {
        Self {
            pool,
            metrics: Arc::new(DispatcherMetrics::new()),
            spent_payments: SpentPaymentClaims::new(),
            vsl,
            backend_address,
            attester_semaphore: Arc::new(Semaphore::new(attester_pool_capacity)),
            ledger_semaphore: Arc::new(Semaphore::new(ledger_pool_capacity)),
            max_retries,
        }
    }

    /// spec §4.9 step 4: a request that finds the attester pool at
    /// capacity is re-queued with backoff rather than queued indefinitely
    /// — up to 30 attempts, 10s apart, each bounded by a 10s acquire
    /// timeout, after which the caller gets [`DispatcherError::AtCapacity`]
    /// instead of waiting forever behind an unbounded queue.
    async fn acquire_attester_slot(
        &self,
    ) -> Result<tokio::sync::SemaphorePermit<'_>, DispatcherError> {
        const MAX_ATTEMPTS: u32 = 30;
        const RETRY_INTERVAL: Duration = Duration::from_secs(10);

        for attempt in 1..=MAX_ATTEMPTS {
            match tokio::time::timeout(RETRY_INTERVAL, self.attester_semaphore.acquire()).await {
                Ok(permit) => return Ok(permit.expect("semaphore is never closed")),
                Err(_elapsed) => {
                    tracing::warn!(attempt, "attester pool at capacity, re-queuing");
                }
            }
        }
        Err(DispatcherError::AtCapacity)
    }

    /// spec §4.9: verify payment once, then attest-and-generate-claim with
    /// up to `max_retries` retries against a freshly selected attester on
    /// each failure. Per the Open Question this crate preserves literally:
    /// only a failed attest-and-generate-claim round consumes a retry — an
    /// error from [`pool::Lease::finish`]'s cleanup step is logged but does
    /// not count against `max_retries`, matching `app.go`'s `SendToAttester`
    /// (which logs `FinishTask`'s error and continues, without touching
    /// `payload.Retried`).
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchedClaim, DispatcherError> {
        let _permit = self.acquire_attester_slot().await?;

        verify_user_payment(&self.spent_payments, &self.vsl, &request.payment, &self.backend_address).await?;

        let computation_label = request.computation.wire_str();
        let mut retried = 0u32;
        let mut last_error = None;

        loop {
            let lease = self.pool.next_attester().await?;
            self.metrics.observe_start(computation_label);
            let started = Instant::now();

            let nonce_str = {
                use base64::Engine;
                base64::engine::general_purpose::STANDARD.encode(&request.nonce)
            };
            let query = RelyingPartyQuery::for_computation(
                request.computation,
                request.input.clone(),
                nonce_str,
            );
            let outcome = lease.client().attest(&query).await;
            lease.finish().await;

            self.metrics.observe_finish(computation_label, started.elapsed().as_secs_f64());

            match outcome {
                Ok(response) => {
                    let (claim, context) = generate_tee_computation_claim(
                        request.computation,
                        request.input,
                        response.result,
                        response.report,
                        request.nonce,
                    )
                    .map_err(|e| DispatcherError::GenerationFailed {
                        retries: retried,
                        source: AttesterClientError::AttesterError(e.to_string()),
                    })?;
                    return Ok(DispatchedClaim { claim, context });
                }
                Err(err) => {
                    last_error = Some(err);
                    if retried >= self.max_retries {
                        return Err(DispatcherError::GenerationFailed {
                            retries: retried,
                            source: last_error.unwrap(),
                        });
                    }
                    retried += 1;
                    tracing::warn!(retried, "retrying request with a different attester");
                }
            }
        }
    }

    /// spec §4.9: submit a dispatched claim to the ledger, bounded by the
    /// ledger-side semaphore (the `WorkerPool2` capacity in the original).
    pub async fn submit(
        &self,
        claim: &DispatchedClaim,
        proof_json: &str,
        to: Vec<&Address>,
        quorum: u16,
        expires: crate::Timestamp,
        fee: crate::Amount,
    ) -> Result<B256, crate::rpc_wrapper::RpcWrapperError> {
        let _permit = self.ledger_semaphore.acquire().await.expect("semaphore is never closed");
        let claim_json = serde_json::to_string(&claim.claim).expect("TeeComputationClaim always serializes");
        let mut wrapper = self.vsl.lock().await;
        wrapper
            .submit_claim(claim_json, "TEEComputation".to_string(), proof_json.to_string(), to, quorum, expires, fee)
            .await
    }
}
