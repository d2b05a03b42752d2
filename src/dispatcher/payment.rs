//! Payment gate (spec §4.9 step 0): before a compute request is sent to an
//! attester, check that its accompanying payment claim is valid, signed by
//! the claimed sender, for the right amount, to the right recipient, and
//! has not already been spent.
//!
//! Grounded in `app.go`'s `verifyUserPayment`: a single-use check against a
//! local record of already-consumed payment-claim IDs, an RLP-encoded
//! detached-signature check over
//! `[computation, sender_address, payment_claim_id, input_sha256]`, and a
//! ledger poll for the payment claim's settlement, checked against a fixed
//! required amount.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use jsonrpsee::core::client::ClientT;
use thiserror::Error;

use crate::signing::{self, DetachedSignature, SignatureError};
use crate::vsl_client::{self, VslClient};
use crate::{Address, Amount, B256, Timestamp};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment claim id has already been used")]
    AlreadyUsed,
    #[error(transparent)]
    BadSignature(#[from] SignatureError),
    #[error("payment claim did not settle before its poll deadline")]
    NotSettled,
    #[error("ledger error while polling for payment: {0}")]
    Ledger(#[from] crate::error::LedgerError),
    #[error("settled claim is not a payment")]
    NotAPayment,
    #[error("payment was not made from the claimed sender address")]
    WrongSender,
    #[error("payment was not made to the expected recipient address")]
    WrongRecipient,
    #[error("payment amount does not match the required amount")]
    WrongAmount,
}

/// spec §4.9: `20 * 10^18` — the fixed VSL-token amount a compute request's
/// payment claim must carry, matching `app.go`'s `VALID_PAYMENT_AMOUNT`.
pub fn required_payment_amount() -> Amount {
    Amount::from_hex_str("0x1158e460913d00000").expect("fixed literal always parses")
}

/// A request for a TEE-computation claim, signed by the requester over
/// `[computation, sender_address, payment_claim_id, input_sha256]` — the
/// same tuple `verifyUserPayment` RLP-encodes before checking the
/// signature.
pub struct SignedComputeRequest {
    pub computation: String,
    pub sender_address: Address,
    pub payment_claim_id: String,
    pub input_sha256: String,
    pub signature: DetachedSignature,
}

/// Tracks payment-claim IDs already consumed by a prior request, standing
/// in for the Go original's `UserPaymentRecord` SQLite table. A dispatcher
/// holds one of these for its whole process lifetime.
#[derive(Default)]
pub struct SpentPaymentClaims {
    seen: Mutex<HashSet<String>>,
}

impl SpentPaymentClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically checks-and-marks a payment-claim ID as spent; returns
    /// `false` if it was already recorded.
    fn try_reserve(&self, payment_claim_id: &str) -> bool {
        self.seen.lock().unwrap().insert(payment_claim_id.to_string())
    }
}

/// spec §4.9 step 0: verify `request`'s payment claim against the ledger.
/// `backend_address` is the address payments must be made to (the
/// dispatcher's own receiving account).
pub async fn verify_user_payment<T>(
    spent: &SpentPaymentClaims,
    vsl: &VslClient<T>,
    request: &SignedComputeRequest,
    backend_address: &Address,
) -> Result<(), PaymentError>
where
    T: ClientT + Clone,
{
    if !spent.try_reserve(&request.payment_claim_id) {
        return Err(PaymentError::AlreadyUsed);
    }

    let rlp_body = alloy_rlp::encode(&(
        request.computation.as_str(),
        request.sender_address.to_string().as_str(),
        request.payment_claim_id.as_str(),
        request.input_sha256.as_str(),
    ));
    signing::verify(&rlp_body, &request.sender_address, &request.signature)?;

    let claim_id = B256::from_str_or_err(&request.payment_claim_id)?;
    let settled = vsl
        .poll_settled_by_id(&claim_id, Timestamp::now(), 30, Duration::from_secs(5))
        .await
        .map_err(|_| PaymentError::NotSettled)?;

    let payment = vsl_client::decode_settled_payment(&settled.data).map_err(|_| PaymentError::NotAPayment)?;
    if payment.from.address != request.sender_address {
        return Err(PaymentError::WrongSender);
    }
    if payment.to.address != *backend_address {
        return Err(PaymentError::WrongRecipient);
    }
    let amount = Amount::from_hex_str(&payment.amount).map_err(|_| PaymentError::WrongAmount)?;
    if amount != required_payment_amount() {
        return Err(PaymentError::WrongAmount);
    }

    Ok(())
}

trait FromStrOrErr: Sized {
    fn from_str_or_err(s: &str) -> Result<Self, PaymentError>;
}

impl FromStrOrErr for B256 {
    fn from_str_or_err(s: &str) -> Result<Self, PaymentError> {
        use std::str::FromStr;
        B256::from_str(s).map_err(|_| PaymentError::NotAPayment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spent_claims_are_single_use() {
        let spent = SpentPaymentClaims::new();
        assert!(spent.try_reserve("0xabc"));
        assert!(!spent.try_reserve("0xabc"));
    }

    #[test]
    fn required_amount_matches_spec() {
        assert_eq!(
            required_payment_amount(),
            Amount::from_hex_str("0x1158e460913d00000").unwrap()
        );
    }
}
