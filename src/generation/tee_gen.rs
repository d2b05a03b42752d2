//! TEE-computation claim generation — a near-literal port of
//! `GenerateTEEComputationClaim`/`computeHistory` in
//! `claim_generation.go`. Reuses [`crate::tpm::compute_history`] so
//! generation and PCR-replay verification can never disagree about the
//! digest table.

use crate::claim::Computation;
use crate::claim::tee::{TeeComputationClaim, TeeComputationClaimVerificationContext};
use crate::error::ClaimError;
use crate::tpm::compute_history;

/// spec §4.8: build a TEE-computation claim and its verification context
/// from the raw attestation bytes produced by the enclave.
///
/// `computation = BlockProcessingKreth` expects exactly 3 events
/// (`input[0]`, the context event, `result`); the other two kinds expect
/// exactly 2 (`input[0]`, `result`) — matching the Go original's
/// `len(events) != 2` / `!= 3` guards.
pub fn generate_tee_computation_claim(
    computation: Computation,
    input: Vec<String>,
    result: String,
    attestation: Vec<u8>,
    nonce: Vec<u8>,
) -> Result<(TeeComputationClaim, TeeComputationClaimVerificationContext), ClaimError> {
    let mut events = input.clone();
    events.push(result.clone());

    let expected_len = match computation {
        Computation::BlockProcessingKreth => 3,
        Computation::ImgClass | Computation::TextGen => 2,
    };
    if events.len() != expected_len {
        return Err(ClaimError::MalformedClaim(format!(
            "unexpected event history for {computation}: got {} events, want {expected_len}",
            events.len()
        )));
    }

    let digest_history = compute_history(computation, events);

    let claim = TeeComputationClaim::new(computation, input, result, digest_history, nonce);
    let context = TeeComputationClaimVerificationContext { attestation };
    Ok((claim, context))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_classification_claim_generates_matching_history() {
        let (claim, _ctx) = generate_tee_computation_claim(
            Computation::ImgClass,
            vec!["base64(img)".to_string()],
            "goldfish".to_string(),
            vec![0xde, 0xad],
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        )
        .unwrap();
        assert_eq!(claim.digest_history["sha256"].len(), 3); // identity + 2 events
    }

    #[test]
    fn wrong_event_count_is_rejected() {
        let err = generate_tee_computation_claim(
            Computation::ImgClass,
            vec!["a".to_string(), "b".to_string()],
            "c".to_string(),
            vec![],
            vec![0u8; 8],
        )
        .unwrap_err();
        assert!(matches!(err, ClaimError::MalformedClaim(_)));
    }

    #[test]
    fn block_processing_kreth_drops_context_event() {
        let (claim, _ctx) = generate_tee_computation_claim(
            Computation::BlockProcessingKreth,
            vec!["input0".to_string(), "context".to_string()],
            "result".to_string(),
            vec![],
            vec![9u8; 8],
        )
        .unwrap();
        // identity digest + input0 + result == 3 entries, "context" dropped.
        assert_eq!(claim.digest_history["sha1"].len(), 3);
    }
}
