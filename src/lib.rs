pub mod rpc_messages;
pub mod rpc_wrapper;
pub mod vsl_client;

mod helpers;
mod timestamp;

pub use crate::helpers::{HasSender, IntoSigned};
pub use alloy::primitives::{Address, B256};
pub use linera_base::data_types::{Amount, ParseAmountError};
pub use linera_base::identifiers::ApplicationId as AssetId;
pub use timestamp::Timestamp;

pub mod rpc_service;

pub mod config;
pub mod error;
pub mod signing;

pub mod claim;
pub mod tpm;

pub mod mpt;
pub mod evm_view;
pub mod block_verify;

pub mod generation;
pub mod dispatcher;

pub mod attester_client;
pub mod metrics;

pub use error::{Error, Result};
