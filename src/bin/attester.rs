//! `attester` CLI (spec §6, demo composition, non-core): a thin wrapper
//! exposing the three subcommands the original `example/common/attester`
//! binary supports — run the HTTP surface, print the machine's attestation
//! key, or hash a file the way PCR-23 extension would. The HTTP server
//! loop itself (accepting `POST /`, invoking the TEE subprocess) is an
//! external collaborator per spec.md §1; this binary only demonstrates
//! the surface this crate models in [`attestation_pipeline::attester_client`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sha2::{Digest, Sha256};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the attester's HTTP surface (`POST /`, `HEAD /health_check`,
    /// `GET /metrics`).
    Start,
    /// Print this machine's attestation-key identity.
    MachineAk,
    /// Hash a file the way PCR-23 extension would (sha256 of its bytes).
    FileHashes {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match args.command {
        Command::Start => {
            tracing::info!("attester HTTP surface is an external collaborator; nothing to serve here");
        }
        Command::MachineAk => {
            tracing::info!("machine attestation-key lookup requires platform TPM access, not available in-process");
        }
        Command::FileHashes { file } => match std::fs::read(&file) {
            Ok(bytes) => {
                let digest = Sha256::digest(&bytes);
                println!("{}", alloy::hex::encode(digest));
            }
            Err(err) => {
                tracing::error!(?file, %err, "could not read file");
                std::process::exit(1);
            }
        },
    }
}
