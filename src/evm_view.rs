//! Stateless EVM view-function re-execution (C6, spec §4.6).
//!
//! Verifies an `EVMViewFn` claim by re-running the claimed `action`
//! (a STATICCALL) against a database backed entirely by the MPT-proven
//! accounts in [`crate::claim::evm::EVMViewFnVerificationContext`], then
//! comparing the output bytes to `claim.result`. Grounded in
//! `verification/view-fn/evm/go/pkg/evm`'s re-execution driver and in
//! `revm`'s `Database`/`CacheDB`/`TxEnv`/`ExecutionResult` plumbing as used
//! by `succinctlabs-sp1-contract-call`'s `ClientExecutor::execute`. All
//! hardforks are activated from block/time zero (spec §4.6 step 3) since
//! this crate verifies one call in isolation, not a chain's fork schedule.

use std::collections::HashMap;
use std::convert::Infallible;

use alloy::primitives::{Address, B256, U256, keccak256};
use revm::Database;
use revm::context::TxEnv;
use revm::context::result::ExecutionResult;
use revm::database::CacheDB;
use revm::primitives::{Bytecode, TxKind};
use revm::state::AccountInfo;
use thiserror::Error;

use crate::claim::evm::{EVMCall, EVMViewFnClaim, EVMViewFnVerificationContext};
use crate::mpt::{self, MptError};

#[derive(Debug, Error)]
pub enum EvmViewError {
    #[error(transparent)]
    Proof(#[from] MptError),
    #[error("view-fn execution reverted: {0}")]
    Reverted(String),
    #[error("view-fn execution halted: {0:?}")]
    Halted(String),
    #[error("re-executed output does not match the claimed result")]
    OutputMismatch,
    #[error("verification context does not provide account {0}")]
    MissingAccount(Address),
}

/// A read-only, MPT-backed [`revm::Database`] populated entirely from a
/// verified [`EVMViewFnVerificationContext`] — nothing is fetched lazily,
/// so any state access outside the proven account set is a hard error
/// rather than a silent default.
struct WitnessDb {
    accounts: HashMap<Address, AccountInfo>,
    storage: HashMap<Address, HashMap<U256, U256>>,
    code: HashMap<B256, Bytecode>,
}

impl WitnessDb {
    fn from_context(
        state_root: B256,
        context: &EVMViewFnVerificationContext,
    ) -> Result<Self, EvmViewError> {
        let mut accounts = HashMap::new();
        let mut storage = HashMap::new();
        let mut code = HashMap::new();

        for account in &context.accounts {
            let verified = mpt::verify_account_proof(state_root, account.proof.addr, &account.proof)?;
            mpt::verify_code(&account.code, verified.code_hash)?;

            let bytecode = Bytecode::new_raw(account.code.clone().into());
            code.insert(verified.code_hash, bytecode.clone());
            accounts.insert(
                account.proof.addr,
                AccountInfo {
                    balance: verified.balance,
                    nonce: verified.nonce,
                    code_hash: verified.code_hash,
                    code: Some(bytecode),
                },
            );

            let mut slots = HashMap::new();
            for slot in &account.proof.storageProof {
                mpt::verify_storage_proof(
                    verified.storage_root,
                    slot.key,
                    slot.value,
                    &slot.proof.iter().map(|b| b.to_vec()).collect::<Vec<_>>(),
                )?;
                slots.insert(U256::from_be_bytes(slot.key.0), U256::from_be_bytes(slot.value.0));
            }
            storage.insert(account.proof.addr, slots);
        }

        Ok(Self { accounts, storage, code })
    }
}

impl Database for WitnessDb {
    type Error = Infallible;

    fn basic(&mut self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        Ok(self.accounts.get(&address).cloned())
    }

    fn code_by_hash(&mut self, code_hash: B256) -> Result<Bytecode, Self::Error> {
        Ok(self.code.get(&code_hash).cloned().unwrap_or_default())
    }

    fn storage(&mut self, address: Address, index: U256) -> Result<U256, Self::Error> {
        Ok(self
            .storage
            .get(&address)
            .and_then(|slots| slots.get(&index))
            .copied()
            .unwrap_or_default())
    }

    fn block_hash(&mut self, number: u64) -> Result<B256, Self::Error> {
        Ok(keccak256(number.to_be_bytes()))
    }
}

/// spec §4.6: re-execute `claim.action` as a STATICCALL against the
/// verified witness database rooted at `claim.assumptions.root`, and
/// check the output against `claim.result`.
pub fn verify_evm_view_fn_claim(
    claim: &EVMViewFnClaim,
    context: &EVMViewFnVerificationContext,
) -> Result<(), EvmViewError> {
    let state_root = claim.assumptions.root;
    let mut db = CacheDB::new(WitnessDb::from_context(state_root, context)?);

    if db
        .basic(claim.action.to)
        .ok()
        .flatten()
        .is_none()
    {
        return Err(EvmViewError::MissingAccount(claim.action.to));
    }

    let tx_env = static_call_tx_env(claim);
    let output = run_static_call(db, tx_env)?;

    if output != claim.result.to_vec() {
        return Err(EvmViewError::OutputMismatch);
    }
    Ok(())
}

/// Builds the re-execution `TxEnv` from `claim.action` plus the chain id
/// and gas limit the claim itself asserts (`claim.metadata.chainId`,
/// `claim.assumptions.gasLimit`) rather than leaving them at the `revm`
/// defaults, so a claim whose call would only succeed under a different
/// chain id or gas budget is re-executed under the conditions it claims,
/// not silently under mainnet/unbounded ones.
fn static_call_tx_env(claim: &EVMViewFnClaim) -> TxEnv {
    TxEnv {
        caller: claim.action.from,
        data: claim.action.input.clone(),
        kind: TxKind::Call(claim.action.to),
        gas_price: 0,
        gas_limit: claim.assumptions.gasLimit.to::<u64>(),
        chain_id: Some(claim.metadata.chainId.to::<u64>()),
        ..Default::default()
    }
}

/// Runs `tx_env` against `db` and returns the raw output bytes. All forks
/// are active from genesis (spec §4.6 step 3: a single claim is checked
/// in isolation, never against a specific hardfork activation schedule).
fn run_static_call(db: CacheDB<WitnessDb>, tx_env: TxEnv) -> Result<Vec<u8>, EvmViewError> {
    let mut evm = revm::Context::mainnet().with_db(db).build_mainnet();
    let result = evm
        .transact(tx_env)
        .map_err(|e| EvmViewError::Halted(format!("{e:?}")))?
        .result;

    match result {
        ExecutionResult::Success { output, .. } => Ok(output.data().to_vec()),
        ExecutionResult::Revert { output, .. } => Err(EvmViewError::Reverted(output.to_string())),
        ExecutionResult::Halt { reason, .. } => Err(EvmViewError::Halted(format!("{reason:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::evm::{Account, AccountProof, EVMMetadata, Header, StorageProof};
    use alloy::primitives::{Bytes, address};

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
            number: U256::ZERO,
            gasLimit: U256::ZERO,
            gasUsed: U256::ZERO,
            time: U256::ZERO,
            extra: vec![].into(),
            mixDigest: Default::default(),
            nonce: Default::default(),
        }
    }

    #[test]
    fn missing_account_is_rejected_before_execution() {
        let claim = EVMViewFnClaim {
            claimType: "EVMViewFn".to_string(),
            trustBaseSpec: "v1".to_string(),
            assumptions: empty_header(),
            action: EVMCall {
                from: Address::ZERO,
                to: address!("00000000000000000000000000000000000099"),
                input: Bytes::new(),
            },
            result: Bytes::new(),
            metadata: EVMMetadata { chainId: U256::from(1u64) },
        };
        let context = EVMViewFnVerificationContext { accounts: vec![] };
        let err = verify_evm_view_fn_claim(&claim, &context).unwrap_err();
        assert!(matches!(err, EvmViewError::MissingAccount(_)));
    }

    #[test]
    fn account_with_bad_proof_is_rejected() {
        let claim = EVMViewFnClaim {
            claimType: "EVMViewFn".to_string(),
            trustBaseSpec: "v1".to_string(),
            assumptions: empty_header(),
            action: EVMCall {
                from: Address::ZERO,
                to: address!("0000000000000000000000000000000000000a"),
                input: Bytes::new(),
            },
            result: Bytes::new(),
            metadata: EVMMetadata { chainId: U256::from(1u64) },
        };
        let context = EVMViewFnVerificationContext {
            accounts: vec![Account {
                proof: AccountProof {
                    addr: address!("0000000000000000000000000000000000000a"),
                    accountProof: vec![Bytes::from(vec![1, 2, 3])],
                    balance: U256::ZERO,
                    codeHash: alloy_trie::KECCAK_EMPTY,
                    nonce: U256::ZERO,
                    storageHash: alloy_trie::EMPTY_ROOT_HASH,
                    storageProof: vec![StorageProof {
                        key: B256::ZERO,
                        value: B256::ZERO,
                        proof: vec![],
                    }],
                },
                code: Bytes::new(),
            }],
        };
        assert!(verify_evm_view_fn_claim(&claim, &context).is_err());
    }
}
