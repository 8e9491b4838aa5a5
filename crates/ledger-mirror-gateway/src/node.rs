//! Gateway backed by an Ethereum-compatible JSON-RPC node.

use async_trait::async_trait;
use bytes::Bytes;
use ledger_mirror_core::{
    decode_hex, encode_hex, Address, AuthoritativeValue, CallContext, LegacyTransaction, Signer,
    TxHash,
};
use serde_json::json;

use crate::abi::ContractInterface;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::rpc::{parse_quantity, parse_quantity_u64, RpcClient};
use crate::traits::Gateway;

/// Gateway that reads through `eth_call` and writes through signed legacy
/// transactions.
///
/// One instance is shared for the life of the process. The HTTP client pools
/// connections, so concurrent calls are fine.
pub struct NodeGateway {
    rpc: RpcClient,
    contract: Address,
    signer: Signer,
    interface: ContractInterface,
    gas_limit: Option<u64>,
}

impl NodeGateway {
    /// Validate the configuration and build the gateway.
    ///
    /// Fails fast on a bad URL, address, key or ABI. Nothing is sent to the
    /// node; the first network traffic happens on the first call.
    pub fn connect(config: GatewayConfig) -> Result<Self> {
        let rpc = RpcClient::new(&config.node_url)?;
        let contract = Address::from_hex(config.contract_address.trim())
            .map_err(|e| GatewayError::Config(format!("contract address: {}", e)))?;
        let signer = Signer::from_hex(config.private_key.trim())
            .map_err(|e| GatewayError::Config(format!("signing key: {}", e)))?;
        let interface = ContractInterface::from_json(&config.abi_json)?;

        tracing::info!(
            node = %rpc.url(),
            contract = %contract,
            sender = %signer.address(),
            "ledger gateway configured"
        );

        Ok(Self {
            rpc,
            contract,
            signer,
            interface,
            gas_limit: config.gas_limit,
        })
    }

    /// Address transactions are sent from.
    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    async fn fetch_chain_id(&self) -> Result<u64> {
        let raw: String = self.rpc.request("eth_chainId", json!([])).await?;
        parse_quantity_u64("eth_chainId", &raw)
    }

    async fn call_getter(&self) -> Result<AuthoritativeValue> {
        let call = json!({
            "to": self.contract.to_hex(),
            "data": encode_hex(&self.interface.encode_get()),
        });
        let raw: String = self.rpc.request("eth_call", json!([call, "latest"])).await?;
        let data = decode_hex(&raw)
            .map_err(|e| GatewayError::Malformed(format!("eth_call: {}", e)))?;
        self.interface.decode_get(&data)
    }

    async fn broadcast(&self, data: Bytes) -> Result<TxHash> {
        let from = self.signer.address();

        let chain_id = self.fetch_chain_id().await?;

        let nonce: String = self
            .rpc
            .request("eth_getTransactionCount", json!([from.to_hex(), "pending"]))
            .await?;
        let nonce = parse_quantity_u64("eth_getTransactionCount", &nonce)?;

        let gas_price: String = self.rpc.request("eth_gasPrice", json!([])).await?;
        let gas_price = parse_quantity("eth_gasPrice", &gas_price)?;

        let gas_limit = match self.gas_limit {
            Some(limit) => limit,
            None => {
                let call = json!({
                    "from": from.to_hex(),
                    "to": self.contract.to_hex(),
                    "data": encode_hex(&data),
                });
                let estimate: String = self.rpc.request("eth_estimateGas", json!([call])).await?;
                parse_quantity_u64("eth_estimateGas", &estimate)?
            }
        };

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: self.contract,
            value: 0,
            data,
            chain_id,
        };
        let signed = tx
            .sign(&self.signer)
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        let reported: String = self
            .rpc
            .request(
                "eth_sendRawTransaction",
                json!([encode_hex(&signed.raw)]),
            )
            .await?;

        let hash = match TxHash::from_hex(&reported) {
            Ok(hash) => {
                if hash != signed.hash {
                    tracing::warn!(
                        reported = %hash,
                        computed = %signed.hash,
                        "node reported a different transaction hash"
                    );
                }
                hash
            }
            Err(e) => {
                tracing::warn!(
                    reported = %reported,
                    error = %e,
                    "node returned an unreadable transaction hash, using the computed one"
                );
                signed.hash
            }
        };

        tracing::info!(tx = %hash, nonce, chain_id, gas_limit, "transaction submitted");
        Ok(hash)
    }
}

#[async_trait]
impl Gateway for NodeGateway {
    async fn read_authoritative(&self, ctx: &CallContext) -> Result<AuthoritativeValue> {
        ctx.check()?;
        let value = ctx.run(self.call_getter()).await??;
        tracing::debug!(value = %value, "read authoritative value");
        Ok(value)
    }

    async fn submit_change(
        &self,
        ctx: &CallContext,
        value: &AuthoritativeValue,
    ) -> Result<TxHash> {
        // Out-of-range values never reach the node.
        let data = self.interface.encode_set(value)?;
        ctx.check()?;

        match ctx.run(self.broadcast(data)).await {
            Ok(result) => result.map_err(GatewayError::into_submission),
            Err(interrupted) => {
                tracing::warn!(
                    value = %value,
                    reason = %interrupted,
                    "submission interrupted, transaction outcome unknown"
                );
                Err(interrupted.into())
            }
        }
    }
}
