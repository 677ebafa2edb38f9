// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! JSON-RPC implementations of the ledger boundary traits.
//!
//! Reads go to the public node (`network.rpc_url`); signing and broadcast go to the
//! external wallet (`network.wallet_url`), which never hands out key material.

pub mod abi;
pub mod confirm;
pub mod contract;
pub mod reader;
pub mod signer;
pub mod transport;
pub mod writer;

pub use confirm::RpcReceiptTracker;
pub use contract::ContractBinding;
pub use reader::RpcLedgerReader;
pub use signer::WalletSigner;
pub use transport::{JsonRpcTransport, TransportError};
pub use writer::RpcLedgerWriter;

use core_types::types::HexParseError;
use core_types::AppConfig;
use ledger_client::{ConfirmationTracker, LedgerReader, LedgerWriter, Signer};
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcSetupError {
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid contract address: {0}")]
    Contract(#[from] HexParseError),
    #[error("node at {url} reports chain {actual}, expected {expected}")]
    ChainMismatch {
        url: String,
        expected: u64,
        actual: u64,
    },
}

/// The four ledger adapters wired against one node and one wallet.
#[derive(Clone)]
pub struct RpcStack {
    pub reader: Arc<dyn LedgerReader>,
    pub writer: Arc<dyn LedgerWriter>,
    pub tracker: Arc<dyn ConfirmationTracker>,
    pub signer: Arc<dyn Signer>,
}

impl RpcStack {
    pub fn from_config(config: &AppConfig) -> Result<Self, RpcSetupError> {
        let timeout = config.network.request_timeout();
        let node = Arc::new(JsonRpcTransport::new(&config.network.rpc_url, timeout)?);
        let wallet = Arc::new(JsonRpcTransport::new(&config.network.wallet_url, timeout)?);
        let contract = ContractBinding::from_config(&config.contract)?;
        let signer: Arc<dyn Signer> = Arc::new(WalletSigner::new(wallet));
        info!(
            "[rpc] node={} wallet={} contract={} chain={}",
            config.network.rpc_url, config.network.wallet_url, contract.address, config.network.chain_id
        );
        Ok(Self {
            reader: Arc::new(RpcLedgerReader::new(Arc::clone(&node), contract)),
            writer: Arc::new(RpcLedgerWriter::new(
                Arc::clone(&node),
                contract,
                Arc::clone(&signer),
                config.network.chain_id,
            )),
            tracker: Arc::new(RpcReceiptTracker::new(node, &config.confirmation)),
            signer,
        })
    }
}

/// Fails when the node serves a different chain than the one configured.
pub async fn verify_chain(config: &AppConfig) -> Result<(), RpcSetupError> {
    let node = JsonRpcTransport::new(&config.network.rpc_url, config.network.request_timeout())?;
    let actual = node.chain_id().await?;
    if actual != config.network.chain_id {
        warn!(
            "[rpc] chain mismatch: expected {} got {actual}",
            config.network.chain_id
        );
        return Err(RpcSetupError::ChainMismatch {
            url: config.network.rpc_url.clone(),
            expected: config.network.chain_id,
            actual,
        });
    }
    Ok(())
}
