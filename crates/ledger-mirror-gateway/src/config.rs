//! Construction parameters for [`NodeGateway`](crate::NodeGateway).

use std::fmt;

/// Everything needed to reach the node and drive the contract.
///
/// Validation happens in `NodeGateway::connect`, not here.
#[derive(Clone)]
pub struct GatewayConfig {
    /// JSON-RPC endpoint, `http://` or `https://`.
    pub node_url: String,
    /// Contract address as 40 hex digits, `0x` optional.
    pub contract_address: String,
    /// secp256k1 signing key as 64 hex digits, `0x` optional.
    pub private_key: String,
    /// Contract ABI: a bare JSON array or a build artifact with an `abi` field.
    pub abi_json: String,
    /// Fixed gas limit for `set` transactions. `None` asks the node to estimate.
    pub gas_limit: Option<u64>,
}

impl GatewayConfig {
    pub fn new(
        node_url: impl Into<String>,
        contract_address: impl Into<String>,
        private_key: impl Into<String>,
        abi_json: impl Into<String>,
    ) -> Self {
        Self {
            node_url: node_url.into(),
            contract_address: contract_address.into(),
            private_key: private_key.into(),
            abi_json: abi_json.into(),
            gas_limit: None,
        }
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("node_url", &self.node_url)
            .field("contract_address", &self.contract_address)
            .field("private_key", &"<redacted>")
            .field("abi_json", &format_args!("<{} bytes>", self.abi_json.len()))
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_key() {
        let config = GatewayConfig::new(
            "http://localhost:8545",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "[]",
        );
        let shown = format!("{:?}", config);
        assert!(!shown.contains("ac0974"));
        assert!(shown.contains("redacted"));
    }
}
