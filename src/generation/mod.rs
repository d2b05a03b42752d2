//! Claim generation (C8, spec §4.8): the attester side that produces a
//! `(claim, verification_context)` pair for each claim family. Mirrors
//! `generation/pkg/generation/claim_generation.go` (TEE) and
//! `generation/view-fn/evm/go/pkg/generation/view_fn.go` (EVM view-fn),
//! with the bridge/USL-contract event-unpacking specific to that demo
//! left out — spec.md's view-fn generation is narrower than the original
//! reference implementation's.

pub mod eth_rpc;
pub mod evm_gen;
pub mod tee_gen;
