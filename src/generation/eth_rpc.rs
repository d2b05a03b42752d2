//! The EVM node JSON-RPC calls claim generation drives to acquire account
//! proofs and execution witnesses (spec §4.8 step 2).
//!
//! Grounded in `base/go/pkg/ethrpc/eth.go` (`CreateAccessList`, `GetProof`,
//! `GetCode`, `GetProofsByAccessList`) and
//! `generation/block-processing/evm/go/pkg/generation/block_processing.go`'s
//! `debug_executionWitness` call. Uses the same `jsonrpsee::core::client::
//! ClientT` + `rpc_params!` pattern `rpc_wrapper.rs` uses against the VSL
//! ledger, pointed at an Ethereum node's RPC endpoint instead.

use std::collections::HashMap;
use std::time::Duration;

use alloy::primitives::{Address, B256, Bytes, U256};
use jsonrpsee::core::client::{ClientT, Error as RpcError};
use jsonrpsee::rpc_params;
use serde::Deserialize;
use thiserror::Error;

use crate::claim::evm::{Account, AccountProof, StorageProof, Witness};

#[derive(Debug, Error)]
pub enum EthRpcError {
    #[error("eth node RPC error: {0}")]
    Rpc(#[from] RpcError),
    #[error("eth_getProof/eth_getCode failed after {attempts} attempts: {source}")]
    ProofRetriesExhausted {
        attempts: u32,
        #[source]
        source: RpcError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessListResponse {
    access_list: Vec<AccessListEntryResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessListEntryResponse {
    address: Address,
    #[serde(default)]
    storage_keys: Vec<B256>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProofResponse {
    address: Address,
    balance: U256,
    code_hash: B256,
    nonce: U256,
    storage_hash: B256,
    account_proof: Vec<Bytes>,
    storage_proof: Vec<StorageProofResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageProofResponse {
    key: B256,
    value: B256,
    proof: Vec<Bytes>,
}

#[derive(Debug, Deserialize)]
struct GethExecutionWitness {
    #[serde(default)]
    headers: Vec<Bytes>,
    #[serde(default)]
    codes: HashMap<String, Bytes>,
    #[serde(default)]
    state: HashMap<String, Bytes>,
}

fn block_number_hex(block_number: U256) -> String {
    format!("0x{block_number:x}")
}

/// spec §4.8 step 2: `eth_createAccessList` against `to`/`input`, called
/// with `from = 0x0` (the zero address) the way `view_fn.go` does to avoid
/// an insufficient-funds error on a testnet account, then the requester's
/// own address appended with no storage keys — matching `view_fn.go`'s
/// `accessList = append(accessList, EVMAccessList{Address: eventTxFrom})`.
pub async fn create_access_list<T: ClientT>(
    rpc: &T,
    to: Address,
    input: &Bytes,
    requester: Address,
    block_number: U256,
) -> Result<Vec<(Address, Vec<B256>)>, EthRpcError> {
    let tx = serde_json::json!({
        "from": Address::ZERO,
        "to": to,
        "input": input,
    });
    let response: AccessListResponse = rpc
        .request(
            "eth_createAccessList",
            rpc_params![tx, block_number_hex(block_number)],
        )
        .await?;
    let mut entries: Vec<(Address, Vec<B256>)> = response
        .access_list
        .into_iter()
        .map(|entry| (entry.address, entry.storage_keys))
        .collect();
    entries.push((requester, Vec::new()));
    Ok(entries)
}

async fn get_proof<T: ClientT>(
    rpc: &T,
    address: Address,
    storage_keys: &[B256],
    block_number: U256,
) -> Result<AccountProof, EthRpcError> {
    let response: ProofResponse = rpc
        .request(
            "eth_getProof",
            rpc_params![address, storage_keys, block_number_hex(block_number)],
        )
        .await?;
    Ok(AccountProof {
        addr: response.address,
        accountProof: response.account_proof,
        balance: response.balance,
        codeHash: response.code_hash,
        nonce: response.nonce,
        storageHash: response.storage_hash,
        storageProof: response
            .storage_proof
            .into_iter()
            .map(|p| StorageProof {
                key: p.key,
                value: p.value,
                proof: p.proof,
            })
            .collect(),
    })
}

async fn get_code<T: ClientT>(rpc: &T, address: Address, block_number: U256) -> Result<Bytes, EthRpcError> {
    let code: Bytes = rpc
        .request("eth_getCode", rpc_params![address, block_number_hex(block_number)])
        .await?;
    Ok(code)
}

/// spec §4.8 step 2: fetch proofs and code for every entry in `access_list`
/// at `block_number`, retrying the whole batch up to 10 times with a 1s
/// backoff on failure — matching `view_fn.go`'s retry loop around
/// `GetProofsByAccessList` (the Go original retries the batch, not each
/// entry individually).
pub async fn get_proofs_by_access_list<T: ClientT>(
    rpc: &T,
    access_list: &[(Address, Vec<B256>)],
    block_number: U256,
) -> Result<Vec<Account>, EthRpcError> {
    const MAX_RETRIES: u32 = 10;
    const BACKOFF: Duration = Duration::from_secs(1);

    let mut attempt = 0;
    loop {
        match fetch_all_proofs(rpc, access_list, block_number).await {
            Ok(accounts) => return Ok(accounts),
            Err(err) => {
                attempt += 1;
                if attempt >= MAX_RETRIES {
                    return Err(EthRpcError::ProofRetriesExhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
                tracing::warn!(attempt, "GetProofsByAccessList failed, retrying");
                tokio::time::sleep(BACKOFF).await;
            }
        }
    }
}

async fn fetch_all_proofs<T: ClientT>(
    rpc: &T,
    access_list: &[(Address, Vec<B256>)],
    block_number: U256,
) -> Result<Vec<Account>, RpcError> {
    let mut accounts = Vec::with_capacity(access_list.len());
    for (address, storage_keys) in access_list {
        let proof = get_proof(rpc, *address, storage_keys, block_number)
            .await
            .map_err(unwrap_rpc_error)?;
        let code = get_code(rpc, *address, block_number).await.map_err(unwrap_rpc_error)?;
        accounts.push(Account {
            proof,
            code: code.to_vec().into(),
        });
    }
    Ok(accounts)
}

fn unwrap_rpc_error(err: EthRpcError) -> RpcError {
    match err {
        EthRpcError::Rpc(inner) => inner,
        EthRpcError::ProofRetriesExhausted { source, .. } => source,
    }
}

/// spec §4.8 step 2: `debug_executionWitness(block_hash)`, converted into
/// this crate's client-agnostic [`Witness`] shape. `headers`/`codes`/
/// `state` are each already RLP-encoded byte blobs on the wire (hex
/// strings); this module carries them through unconverted rather than
/// decoding full go-ethereum header objects, since nothing downstream of
/// [`crate::block_verify`] needs more than the raw bytes.
pub async fn execution_witness<T: ClientT>(rpc: &T, block_hash: B256) -> Result<Witness, EthRpcError> {
    let witness: GethExecutionWitness = rpc
        .request("debug_executionWitness", rpc_params![block_hash])
        .await?;
    Ok(Witness {
        headers: witness.headers.into_iter().map(|b| b.to_vec()).collect(),
        code_blobs: witness.codes.into_values().map(|b| b.to_vec()).collect(),
        state_nodes: witness.state.into_values().map(|b| b.to_vec()).collect(),
    })
}
