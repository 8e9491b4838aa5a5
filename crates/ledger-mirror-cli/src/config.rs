//! Configuration for the ledger-mirror binary

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use ledger_mirror::gateway::GatewayConfig;
use ledger_mirror::CoordinatorConfig;

/// ledger-mirror - read, write and mirror a ledger contract value
#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-mirror", version)]
#[command(about = "Read, write and mirror a single value stored in a ledger contract")]
pub struct Config {
    /// JSON-RPC endpoint of the ledger node
    #[arg(long, env = "BESU_NODE_URL")]
    pub node_url: String,

    /// Address of the storage contract
    #[arg(long, env = "CONTRACT_ADDRESS")]
    pub contract_address: String,

    /// Hex private key used to sign `set` transactions
    #[arg(long, env = "SIGNER_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Path to the contract ABI JSON (bare array or build artifact)
    #[arg(long, env = "CONTRACT_ABI_PATH")]
    pub abi_path: PathBuf,

    /// SQLite file holding the mirrored value
    #[arg(long, env = "MIRROR_DB_PATH", default_value = "./ledger-mirror.db")]
    pub db_path: PathBuf,

    /// Fixed gas limit for `set` transactions (estimated by the node if unset)
    #[arg(long, env = "LEDGER_GAS_LIMIT")]
    pub gas_limit: Option<u64>,

    /// Deadline for each operation in milliseconds (0 disables it)
    #[arg(long, env = "LEDGER_CALL_TIMEOUT_MS", default_value = "15000")]
    pub timeout_ms: u64,

    /// Log format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the authoritative value from the ledger
    Get,
    /// Submit a transaction setting the value
    Set {
        /// Base-10 integer, optionally negative
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Copy the ledger value into the local mirror
    Sync,
    /// Compare the local mirror with the ledger
    Check,
    /// Create the mirror row if missing
    Init,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.node_url.trim().is_empty() {
            anyhow::bail!("node URL cannot be empty");
        }
        if self.contract_address.trim().is_empty() {
            anyhow::bail!("contract address cannot be empty");
        }
        if self.private_key.trim().is_empty() {
            anyhow::bail!("signer private key cannot be empty");
        }
        if self.gas_limit == Some(0) {
            anyhow::bail!("gas limit must be positive");
        }
        Ok(())
    }

    /// Load the ABI file and assemble the gateway parameters.
    pub fn gateway_config(&self) -> anyhow::Result<GatewayConfig> {
        let abi_json = std::fs::read_to_string(&self.abi_path)
            .with_context(|| format!("reading contract ABI from {}", self.abi_path.display()))?;

        let mut config = GatewayConfig::new(
            self.node_url.clone(),
            self.contract_address.clone(),
            self.private_key.clone(),
            abi_json,
        );
        if let Some(gas_limit) = self.gas_limit {
            config = config.with_gas_limit(gas_limit);
        }
        Ok(config)
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            call_timeout: match self.timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}
