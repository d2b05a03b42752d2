//! Process configuration, assembled once at startup and threaded to
//! components by constructor injection.
//!
//! Mirrors the Go original's `get_env()` helpers scattered across
//! `cmd/verifier/verifier.go`, `cmd/backend-server`, and the attester's
//! `main.go` — all of which read the same environment-variable surface
//! ad hoc and panic on a missing required key. Per the "Global singletons"
//! design note, this crate collects that surface into one `Config`
//! constructed once, instead of reading `std::env` from inside component
//! logic.

use std::time::Duration;

use serde::Deserialize;

use crate::Address;

fn default_expiry_seconds() -> u64 {
    600
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_queued_tasks() -> usize {
    10
}

fn default_attester_pool_capacity() -> usize {
    100
}

fn default_ledger_pool_capacity() -> usize {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub vsl_host: String,
    pub vsl_port: u16,

    /// Comma-separated in the environment; split at load time.
    #[serde(default)]
    pub attester_endpoints: Vec<String>,

    pub verifier_addr: Address,
    pub verifier_priv: String,

    pub bank_addr: Option<Address>,
    pub bank_priv: Option<String>,

    #[serde(default = "default_expiry_seconds")]
    pub expiry_seconds: u64,

    #[serde(default)]
    pub client_loop_interval: Option<u64>,
    #[serde(default)]
    pub verifier_loop_interval: Option<u64>,

    /// Comma-separated base64 DER-encoded trusted attestation keys.
    #[serde(default)]
    pub gcp_ak_b64_list: Vec<String>,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_max_queued_tasks")]
    pub max_queued_tasks: usize,
    #[serde(default = "default_attester_pool_capacity")]
    pub attester_pool_capacity: usize,
    #[serde(default = "default_ledger_pool_capacity")]
    pub ledger_pool_capacity: usize,
}

impl Config {
    /// Loads configuration from the process environment using the `config`
    /// crate's environment source, with `,`-separated list fields split
    /// out after deserialization (the crate's env source treats every
    /// value as a scalar string).
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let raw: RawConfig = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;
        Ok(raw.into())
    }

    pub fn vsl_addr(&self) -> String {
        format!("{}:{}", self.vsl_host, self.vsl_port)
    }

    pub fn verifier_loop_interval(&self) -> Duration {
        Duration::from_secs(self.verifier_loop_interval.unwrap_or(5))
    }

    pub fn client_loop_interval(&self) -> Duration {
        Duration::from_secs(self.client_loop_interval.unwrap_or(5))
    }
}

/// Intermediate shape matching raw environment-variable names
/// (`VSL_HOST`, `ATTESTER_ENDPOINTS`, ...) before list-splitting.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    vsl_host: String,
    vsl_port: u16,
    #[serde(default)]
    attester_endpoints: String,
    verifier_addr: Address,
    verifier_priv: String,
    #[serde(default)]
    bank_addr: Option<Address>,
    #[serde(default)]
    bank_priv: Option<String>,
    #[serde(default = "default_expiry_seconds")]
    expiry_seconds: u64,
    #[serde(default)]
    client_loop_interval: Option<u64>,
    #[serde(default)]
    verifier_loop_interval: Option<u64>,
    #[serde(default)]
    gcp_ak_b64_list: String,
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    #[serde(default = "default_max_queued_tasks")]
    max_queued_tasks: usize,
    #[serde(default = "default_attester_pool_capacity")]
    attester_pool_capacity: usize,
    #[serde(default = "default_ledger_pool_capacity")]
    ledger_pool_capacity: usize,
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Config {
            vsl_host: raw.vsl_host,
            vsl_port: raw.vsl_port,
            attester_endpoints: split_csv(&raw.attester_endpoints),
            verifier_addr: raw.verifier_addr,
            verifier_priv: raw.verifier_priv,
            bank_addr: raw.bank_addr,
            bank_priv: raw.bank_priv,
            expiry_seconds: raw.expiry_seconds,
            client_loop_interval: raw.client_loop_interval,
            verifier_loop_interval: raw.verifier_loop_interval,
            gcp_ak_b64_list: split_csv(&raw.gcp_ak_b64_list),
            max_retries: raw.max_retries,
            max_queued_tasks: raw.max_queued_tasks,
            attester_pool_capacity: raw.attester_pool_capacity,
            ledger_pool_capacity: raw.ledger_pool_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_csv_fields() {
        assert_eq!(split_csv("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv(""), Vec::<String>::new());
    }

    #[test]
    fn defaults_match_spec() {
        assert_eq!(default_expiry_seconds(), 600);
        assert_eq!(default_max_retries(), 3);
        assert_eq!(default_max_queued_tasks(), 10);
        assert_eq!(default_attester_pool_capacity(), 100);
        assert_eq!(default_ledger_pool_capacity(), 500);
    }
}
