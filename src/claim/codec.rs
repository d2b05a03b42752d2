//! `encode(claim) -> bytes` / `decode(bytes) -> claim` for each claim
//! family (spec §4.1). Each is a bijection on well-formed values; this is
//! exercised directly by the round-trip tests below and by property 3 in
//! spec §8.

use alloy::sol_types::SolValue;

use super::evm::{EVMMetadata, EVMViewFnClaim, EvmBlockProcessingClaim, Header};
use super::tee::TeeComputationClaim;
use crate::error::ClaimError;

/// TEE family: canonical bytes are the UTF-8 JSON wire form itself —
/// hashing/signing uses the exact bytes sent on the wire, so `encode` is
/// just `serde_json::to_vec`.
pub fn encode_tee(claim: &TeeComputationClaim) -> Result<Vec<u8>, ClaimError> {
    serde_json::to_vec(claim).map_err(|e| ClaimError::MalformedClaim(e.to_string()))
}

pub fn decode_tee(bytes: &[u8]) -> Result<TeeComputationClaim, ClaimError> {
    serde_json::from_slice(bytes).map_err(|e| ClaimError::MalformedClaim(e.to_string()))
}

/// EVM view-fn family: canonical bytes are the Solidity ABI tuple
/// encoding of [`EVMViewFnClaim`]; embedding into a ledger message
/// `0x`-hex-encodes these bytes (done by the caller, at the
/// `SubmittedClaim.claim` boundary — this function returns raw bytes).
pub fn encode_evm_view_fn(claim: &EVMViewFnClaim) -> Vec<u8> {
    claim.abi_encode()
}

pub fn decode_evm_view_fn(bytes: &[u8]) -> Result<EVMViewFnClaim, ClaimError> {
    EVMViewFnClaim::abi_decode(bytes).map_err(|e| ClaimError::MalformedClaim(e.to_string()))
}

/// `MirroringGeth` family: `EvmBlockProcessingClaim` has no dedicated
/// `sol!` tuple of its own (see `claim/evm.rs`), so its canonical bytes
/// are the ABI tuple encoding of its four fields in declaration order —
/// `claim_type`/`result` ABI-encode as `string`/`bytes` directly, and
/// `assumptions`/`metadata` reuse `Header`'s and `EVMMetadata`'s own tuple
/// encodings unchanged.
pub fn encode_evm_block_processing(claim: &EvmBlockProcessingClaim) -> Vec<u8> {
    (
        claim.claim_type.clone(),
        claim.assumptions.clone(),
        claim.result.clone(),
        claim.metadata.clone(),
    )
        .abi_encode()
}

pub fn decode_evm_block_processing(bytes: &[u8]) -> Result<EvmBlockProcessingClaim, ClaimError> {
    let (claim_type, assumptions, result, metadata) =
        <(String, Header, Vec<u8>, EVMMetadata)>::abi_decode(bytes)
            .map_err(|e| ClaimError::MalformedClaim(e.to_string()))?;
    Ok(EvmBlockProcessingClaim {
        claim_type,
        assumptions,
        result,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::Computation;
    use crate::claim::evm::{EVMCall, EVMMetadata, Header};
    use alloy::primitives::{Address, U256};
    use std::collections::HashMap;

    #[test]
    fn tee_codec_round_trips() {
        let claim = TeeComputationClaim::new(
            Computation::TextGen,
            vec!["prompt".to_string()],
            "completion".to_string(),
            HashMap::new(),
            vec![0u8; 8],
        );
        let bytes = encode_tee(&claim).unwrap();
        assert_eq!(decode_tee(&bytes).unwrap(), claim);
    }

    #[test]
    fn tee_decode_rejects_garbage() {
        assert!(decode_tee(b"not json").is_err());
    }

    #[test]
    fn evm_view_fn_codec_round_trips() {
        let claim = EVMViewFnClaim {
            claimType: "EVMViewFn".to_string(),
            trustBaseSpec: "v1".to_string(),
            assumptions: Header {
                parentHash: Default::default(),
                uncleHash: Default::default(),
                coinbase: Address::ZERO,
                root: Default::default(),
                txHash: Default::default(),
                receiptHash: Default::default(),
                bloom: vec![].into(),
                difficulty: U256::ZERO,
                number: U256::from(1u64),
                gasLimit: U256::from(1u64),
                gasUsed: U256::from(1u64),
                time: U256::from(1u64),
                extra: vec![].into(),
                mixDigest: Default::default(),
                nonce: Default::default(),
            },
            action: EVMCall {
                from: Address::ZERO,
                to: Address::ZERO,
                input: vec![].into(),
            },
            result: vec![42].into(),
            metadata: EVMMetadata { chainId: U256::from(1u64) },
        };
        let bytes = encode_evm_view_fn(&claim);
        assert_eq!(decode_evm_view_fn(&bytes).unwrap(), claim);
    }

    #[test]
    fn evm_view_fn_decode_rejects_truncated_bytes() {
        let bytes = vec![0u8; 3];
        assert!(decode_evm_view_fn(&bytes).is_err());
    }

    fn empty_header() -> Header {
        Header {
            parentHash: Default::default(),
            uncleHash: Default::default(),
            coinbase: Address::ZERO,
            root: Default::default(),
            txHash: Default::default(),
            receiptHash: Default::default(),
            bloom: vec![].into(),
            difficulty: U256::ZERO,
            number: U256::from(1u64),
            gasLimit: U256::from(30_000_000u64),
            gasUsed: U256::from(1u64),
            time: U256::from(1u64),
            extra: vec![].into(),
            mixDigest: Default::default(),
            nonce: Default::default(),
        }
    }

    #[test]
    fn evm_block_processing_codec_round_trips() {
        use crate::claim::evm::EvmBlockProcessingClaim;

        let claim = EvmBlockProcessingClaim::new(
            empty_header(),
            vec![0xf8, 0x44, 0x80, 0x80],
            EVMMetadata { chainId: U256::from(1u64) },
        );
        let bytes = encode_evm_block_processing(&claim);
        assert_eq!(decode_evm_block_processing(&bytes).unwrap(), claim);
    }

    #[test]
    fn evm_block_processing_decode_rejects_truncated_bytes() {
        let bytes = vec![0u8; 3];
        assert!(decode_evm_block_processing(&bytes).is_err());
    }
}
