//! A nonce-mutex-serialized wrapper around [`crate::rpc_wrapper::RpcWrapper`]
//! (spec §4.3) plus the settlement-polling helper the payment gate (C9)
//! needs.
//!
//! `RpcWrapper::inc_nonce` takes `&mut self` and every message that
//! consumes a nonce (`submit_claim`, `settle_claim`, `pay`, ...) borrows
//! the wrapper mutably for the lifetime of the RPC round trip; two
//! concurrent callers sharing one signer would otherwise race to read the
//! same nonce before either submission lands, producing two claims with
//! the same nonce where the ledger only accepts the first. This module
//! does not change `RpcWrapper`'s call sites — it wraps the whole struct
//! in a `tokio::sync::Mutex` so the wrapping discipline lives in one
//! place rather than at every caller.

use std::sync::Arc;
use std::time::Duration;

use jsonrpsee::core::client::ClientT;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::sleep;

use crate::error::LedgerError;
use crate::rpc_messages::{PayMessage, SettledVerifiedClaim, Timestamped};
use crate::rpc_wrapper::RpcWrapper;
use crate::{B256, Timestamp};

/// Serializes all nonce-consuming calls against one signer through a
/// single [`tokio::sync::Mutex`]. Cloned cheaply (an `Arc` around the
/// mutex); every clone serializes against the same underlying wrapper.
#[derive(Clone)]
pub struct VslClient<T> {
    inner: Arc<Mutex<RpcWrapper<T>>>,
}

impl<T> VslClient<T>
where
    T: ClientT + Clone,
{
    pub fn new(wrapper: RpcWrapper<T>) -> Self {
        Self { inner: Arc::new(Mutex::new(wrapper)) }
    }

    /// Exclusive access to the wrapped signer for the duration of the
    /// guard. Every nonce-consuming `RpcWrapper` call must happen while
    /// holding this guard, so no two callers ever read the same nonce.
    pub async fn lock(&self) -> MutexGuard<'_, RpcWrapper<T>> {
        self.inner.lock().await
    }

    /// spec §4.3: poll `get_settled_claim_by_id` until it resolves or
    /// `expiry_seconds` elapses since `submitted_at`, sleeping
    /// `loop_interval` between attempts. Mirrors `vsl-wrapper/vsl.go`'s
    /// `PollSettledByID(id, now, maxWait, freq)`. Read-only: does not take
    /// the nonce lock, since settlement lookups consume no nonce.
    pub async fn poll_settled_by_id(
        &self,
        claim_id: &B256,
        submitted_at: Timestamp,
        expiry_seconds: u64,
        loop_interval: Duration,
    ) -> Result<Timestamped<SettledVerifiedClaim>, LedgerError> {
        let deadline_seconds = submitted_at.seconds().saturating_add(expiry_seconds);
        loop {
            let result = {
                let guard = self.inner.lock().await;
                guard.get_settled_claim_by_id(claim_id).await
            };
            match result {
                Ok(settled) => {
                    return Ok(Timestamped {
                        id: settled.id,
                        data: settled.data.tx().clone(),
                        timestamp: settled.timestamp,
                    });
                }
                Err(_) if Timestamp::now().seconds() >= deadline_seconds => {
                    return Err(LedgerError::ExpiredBeforeSettled);
                }
                Err(_) => sleep(loop_interval).await,
            }
        }
    }
}

/// Decodes a settled claim's `verified_claim.claim` JSON body as a
/// [`PayMessage`] — the shape a settled payment claim's `claim` field
/// carries, used by the payment gate to check the `from`/`to`/`amount`
/// triple of a claimed payment.
pub fn decode_settled_payment(settled: &SettledVerifiedClaim) -> Result<PayMessage, LedgerError> {
    serde_json::from_str(&settled.verified_claim.claim)
        .map_err(|e| LedgerError::LedgerRpcError(format!("claim is not a payment: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_settled_payment_rejects_non_payment_json() {
        let settled = SettledVerifiedClaim {
            verified_claim: crate::rpc_messages::VerifiedClaim {
                claim: "\"not a payment object\"".to_string(),
                claim_id: "0x00".to_string(),
                claim_type: "Payment".to_string(),
                claim_owner: crate::rpc_messages::VslAddress::from(crate::Address::ZERO),
            },
            verifiers: vec![],
        };
        assert!(decode_settled_payment(&settled).is_err());
    }
}
