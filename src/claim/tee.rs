//! TEE-computation claim and its verification context (spec §3).
//!
//! Field-for-field mirror of `base-tee/pkg/abstract_types/types.go`'s
//! `TEEComputationClaim` / `TEEComputationClaimVerificationContext`, in the
//! teacher's `rpc_messages.rs` derive style (`Debug, Clone, Serialize,
//! Deserialize`). Field declaration order is preserved by `serde_json` for
//! struct types, which is what makes this the canonical JSON encoding
//! required by spec §4.1 rather than an incidental one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Computation;

/// `claim_type = "TEEComputation"` is a constant discriminator, not a
/// field a caller chooses — callers build the enclosing `SubmittedClaim`
/// with `claim_type: ClaimType::TEEComputation.to_string()` instead.
pub const TEE_COMPUTATION_CLAIM_TYPE: &str = "TEEComputation";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeeComputationClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub computation: Computation,
    /// Ordered opaque strings: base64 for binary input, UTF-8 otherwise.
    pub input: Vec<String>,
    pub result: String,
    /// hash-algorithm tag (`sha1`|`sha256`|`sha384`) -> ordered hex digests.
    pub digest_history: HashMap<String, Vec<String>>,
    /// 8 random bytes supplied by the relying party; must echo into the
    /// attestation report's quoted nonce.
    #[serde(with = "crate::helpers::base64_bytes")]
    pub nonce: Vec<u8>,
}

impl TeeComputationClaim {
    pub fn new(
        computation: Computation,
        input: Vec<String>,
        result: String,
        digest_history: HashMap<String, Vec<String>>,
        nonce: Vec<u8>,
    ) -> Self {
        Self {
            claim_type: TEE_COMPUTATION_CLAIM_TYPE.to_string(),
            computation,
            input,
            result,
            digest_history,
            nonce,
        }
    }
}

/// Opaque byte blob containing a serialized attestation report (TPM quote
/// + SEV-SNP evidence + event log). Transported as a JSON object with a
/// single base64 `report` field (matching the Go struct tag
/// `json:"report"`), since the claim envelope carries `proof` as a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeeComputationClaimVerificationContext {
    #[serde(with = "crate::helpers::base64_bytes", rename = "report")]
    pub attestation: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_claim_json_round_trips() {
        let mut digest_history = HashMap::new();
        digest_history.insert("sha256".to_string(), vec!["aa".to_string(), "bb".to_string()]);
        let claim = TeeComputationClaim::new(
            Computation::ImgClass,
            vec!["aW1n".to_string()],
            "goldfish".to_string(),
            digest_history,
            vec![0u8; 8],
        );
        let encoded = serde_json::to_string(&claim).unwrap();
        let decoded: TeeComputationClaim = serde_json::from_str(&encoded).unwrap();
        assert_eq!(claim, decoded);
        assert!(encoded.contains("\"type\":\"TEEComputation\""));
    }

    #[test]
    fn verification_context_round_trips() {
        let ctx = TeeComputationClaimVerificationContext {
            attestation: vec![1, 2, 3, 4],
        };
        let encoded = serde_json::to_string(&ctx).unwrap();
        let decoded: TeeComputationClaimVerificationContext = serde_json::from_str(&encoded).unwrap();
        assert_eq!(ctx, decoded);
    }
}
