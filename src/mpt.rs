//! Merkle-Patricia trie account/storage proof verification (C5, spec §4.5).
//!
//! Grounded in `base/go/pkg/evm/proof.go` (`DecodeProofs` / `VerifyProof` /
//! `VerifyCode`) for the verification algorithm, and in `alloy_trie`'s
//! `proof::verify_proof` — the same EIP-1186 proof-walk primitive used by
//! `sp1-guests/src/state_inclusion.rs` — in place of re-deriving the
//! branch/extension/leaf node walk by hand. The account RLP shape
//! (`[nonce, balance, storage_root, code_hash]`) mirrors
//! `joey0612-rust-eth-triedb`'s `StateAccount`.

use alloy::primitives::{Address, B256, Bytes, U256, keccak256};
use alloy_rlp::{Decodable, RlpDecodable, RlpEncodable};
use alloy_trie::Nibbles;
use alloy_trie::proof::verify_proof;
use thiserror::Error;

use crate::claim::evm::AccountProof;

#[derive(Debug, Error)]
pub enum MptError {
    #[error("account proof does not verify against the state root")]
    AccountProofInvalid,
    #[error("account code does not hash to the proven code hash")]
    CodeHashMismatch,
    #[error("storage proof does not verify against the account's storage root")]
    StorageProofInvalid,
    #[error("malformed account RLP: {0}")]
    MalformedAccountRlp(String),
}

/// `[nonce, balance, storage_root, code_hash]`, the canonical Ethereum
/// account leaf value — identical shape to `joey0612-rust-eth-triedb`'s
/// `StateAccount`, reused here rather than re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, RlpDecodable, RlpEncodable)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
    pub storage_root: B256,
    pub code_hash: B256,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::ZERO,
            storage_root: alloy_trie::EMPTY_ROOT_HASH,
            code_hash: alloy_trie::KECCAK_EMPTY,
        }
    }
}

/// spec §4.5 step 1-2: verify `proof.account_proof` against `state_root` at
/// `secure_key = keccak256(address)`, returning the decoded account
/// (`Account::default()` for a verified non-existence proof — matches the
/// Go original's `balance == 0 && nonce == 0` empty-account shortcut).
pub fn verify_account_proof(
    state_root: B256,
    address: Address,
    proof: &AccountProof,
) -> Result<Account, MptError> {
    let secure_key = Nibbles::unpack(keccak256(address));
    let nodes: Vec<Bytes> = proof
        .accountProof
        .iter()
        .map(|node| Bytes::from(node.to_vec()))
        .collect();

    let claimed_balance = U256::from_be_bytes(proof.balance.to_be_bytes());
    let claimed_nonce: u64 = proof
        .nonce
        .try_into()
        .map_err(|_| MptError::MalformedAccountRlp("nonce overflows u64".to_string()))?;
    let is_empty = claimed_balance.is_zero() && claimed_nonce == 0;

    let expected_value = if is_empty {
        None
    } else {
        Some(
            Account {
                nonce: claimed_nonce,
                balance: claimed_balance,
                storage_root: proof.storageHash,
                code_hash: proof.codeHash,
            }
            .to_rlp(),
        )
    };

    verify_proof(state_root, secure_key, expected_value.clone(), &nodes)
        .map_err(|_| MptError::AccountProofInvalid)?;

    Ok(expected_value
        .map(|rlp| Account::from_rlp(&rlp))
        .transpose()
        .map_err(|e| MptError::MalformedAccountRlp(e.to_string()))?
        .unwrap_or_default())
}

/// spec §4.5 step 3: verify `code` hashes to `account.code_hash`.
pub fn verify_code(code: &[u8], code_hash: B256) -> Result<(), MptError> {
    if keccak256(code) == code_hash {
        Ok(())
    } else {
        Err(MptError::CodeHashMismatch)
    }
}

/// spec §4.5 step 4: verify a single storage slot proof against the
/// account's `storage_root`.
pub fn verify_storage_proof(
    storage_root: B256,
    key: B256,
    value: B256,
    proof_nodes: &[Vec<u8>],
) -> Result<(), MptError> {
    let secure_key = Nibbles::unpack(keccak256(key));
    let nodes: Vec<Bytes> = proof_nodes.iter().map(|n| Bytes::from(n.clone())).collect();
    let expected_value = if value.is_zero() {
        None
    } else {
        Some(alloy_rlp::encode(U256::from_be_bytes(value.0)))
    };
    verify_proof(storage_root, secure_key, expected_value, &nodes)
        .map_err(|_| MptError::StorageProofInvalid)
}

impl Account {
    pub fn to_rlp(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    pub fn from_rlp(data: &[u8]) -> Result<Self, alloy_rlp::Error> {
        Account::decode(&mut &*data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::evm::StorageProof;
    use alloy::primitives::{U256, address};
    use alloy_trie::{HashBuilder, proof::ProofRetainer};

    /// Build a one-account trie and retain the proof for its own key,
    /// mirroring the generation side this module's verification half
    /// must agree with.
    fn build_single_account_trie(addr: Address, account: &Account) -> (B256, Vec<Bytes>) {
        let key = Nibbles::unpack(keccak256(addr));
        let retainer = ProofRetainer::new(vec![key.clone()]);
        let mut builder = HashBuilder::default().with_proof_retainer(retainer);
        builder.add_leaf(key, &account.to_rlp());
        let root = builder.root();
        let proofs = builder.take_proof_nodes();
        let nodes = proofs.into_inner().into_values().collect();
        (root, nodes)
    }

    #[test]
    fn verified_account_round_trips() {
        let addr = address!("0000000000000000000000000000000000000001");
        let account = Account {
            nonce: 7,
            balance: U256::from(1_000u64),
            storage_root: alloy_trie::EMPTY_ROOT_HASH,
            code_hash: alloy_trie::KECCAK_EMPTY,
        };
        let (root, nodes) = build_single_account_trie(addr, &account);

        let proof = AccountProof {
            addr,
            accountProof: nodes.into_iter().map(|n| n.to_vec().into()).collect(),
            balance: account.balance,
            codeHash: account.code_hash,
            nonce: U256::from(account.nonce),
            storageHash: account.storage_root,
            storageProof: vec![],
        };

        let verified = verify_account_proof(root, addr, &proof).unwrap();
        assert_eq!(verified, account);
    }

    #[test]
    fn non_existent_account_has_zero_balance_and_nonce() {
        let addr = address!("0000000000000000000000000000000000000002");
        let other_addr = address!("0000000000000000000000000000000000000003");
        let present = Account {
            nonce: 1,
            balance: U256::from(1u64),
            storage_root: alloy_trie::EMPTY_ROOT_HASH,
            code_hash: alloy_trie::KECCAK_EMPTY,
        };
        let (root, nodes) = build_single_account_trie(other_addr, &present);

        let proof = AccountProof {
            addr,
            accountProof: nodes.into_iter().map(|n| n.to_vec().into()).collect(),
            balance: U256::ZERO,
            codeHash: alloy_trie::KECCAK_EMPTY,
            nonce: U256::ZERO,
            storageHash: alloy_trie::EMPTY_ROOT_HASH,
            storageProof: vec![],
        };
        let verified = verify_account_proof(root, addr, &proof).unwrap();
        assert_eq!(verified, Account::default());
    }

    #[test]
    fn tampered_balance_is_rejected() {
        let addr = address!("0000000000000000000000000000000000000004");
        let account = Account {
            nonce: 0,
            balance: U256::from(5u64),
            storage_root: alloy_trie::EMPTY_ROOT_HASH,
            code_hash: alloy_trie::KECCAK_EMPTY,
        };
        let (root, nodes) = build_single_account_trie(addr, &account);

        let proof = AccountProof {
            addr,
            accountProof: nodes.into_iter().map(|n| n.to_vec().into()).collect(),
            balance: U256::from(6u64), // tampered
            codeHash: account.code_hash,
            nonce: U256::ZERO,
            storageHash: account.storage_root,
            storageProof: vec![],
        };
        assert!(verify_account_proof(root, addr, &proof).is_err());
    }

    #[test]
    fn code_hash_mismatch_is_rejected() {
        let code = b"contract bytecode";
        let wrong_hash = keccak256(b"not the code");
        assert!(matches!(
            verify_code(code, wrong_hash),
            Err(MptError::CodeHashMismatch)
        ));
        assert!(verify_code(code, keccak256(code)).is_ok());
    }

    #[test]
    fn storage_proof_round_trips() {
        let slot_key = keccak256(b"slot");
        let value = B256::from(U256::from(42u64).to_be_bytes());
        let nibbles = Nibbles::unpack(keccak256(slot_key));
        let retainer = ProofRetainer::new(vec![nibbles.clone()]);
        let mut builder = HashBuilder::default().with_proof_retainer(retainer);
        builder.add_leaf(nibbles, &alloy_rlp::encode(U256::from(42u64)));
        let root = builder.root();
        let nodes: Vec<Vec<u8>> = builder
            .take_proof_nodes()
            .into_inner()
            .into_values()
            .map(|b| b.to_vec())
            .collect();

        verify_storage_proof(root, slot_key, value, &nodes).unwrap();
    }

    #[test]
    fn empty_storage_proof_placeholder_has_no_slots() {
        let proof = StorageProof {
            key: B256::ZERO,
            value: B256::ZERO,
            proof: vec![],
        };
        assert_eq!(proof.proof.len(), 0);
    }
}
