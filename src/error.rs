//! Crate-wide error taxonomy.
//!
//! Every named error kind in the attestation pipeline's error handling
//! design is an explicit variant here (or in a component-local enum
//! composed into [`Error`] via `#[from]`) — never a bare string. Component
//! modules return their own narrower error type where useful
//! (`tpm::TpmError`, `mpt::MptError`, ...) and convert into this one at the
//! crate boundary.

use thiserror::Error as ThisError;

use crate::dispatcher::DispatcherError;
use crate::dispatcher::payment::PaymentError;
use crate::evm_view::EvmViewError;
use crate::mpt::MptError;
use crate::signing::SignatureError;
use crate::tpm::TpmError;

pub type Result<T> = std::result::Result<T, Error>;

/// Input / claim-shape errors (C1).
#[derive(Debug, ThisError)]
pub enum ClaimError {
    #[error("malformed claim: {0}")]
    MalformedClaim(String),
    #[error("unknown claim type: {0}")]
    UnknownClaimType(String),
    #[error("unsupported computation: {0}")]
    UnsupportedComputation(String),
    #[error("bad argument count: expected {expected}, got {got}")]
    BadArgCount { expected: usize, got: usize },
}

/// Ledger/transport errors (C3).
#[derive(Debug, ThisError)]
pub enum LedgerError {
    #[error("ledger RPC error: {0}")]
    LedgerRpcError(String),
    #[error("expired before settled")]
    ExpiredBeforeSettled,
    #[error("nonce stale")]
    NonceStale,
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Tpm(#[from] TpmError),

    #[error(transparent)]
    EvmProof(#[from] MptError),

    #[error(transparent)]
    EvmView(#[from] EvmViewError),

    #[error(transparent)]
    BlockVerify(#[from] crate::block_verify::BlockVerifyError),

    #[error(transparent)]
    Dispatcher(#[from] DispatcherError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}
