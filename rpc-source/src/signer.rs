// Copyright (c) James Kassemi, SC, US. All rights reserved.
use async_trait::async_trait;
use core_types::{Address, TxHash};
use ledger_client::{ExecutableRequest, Signer, SignerError};
use log::{info, warn};
use std::sync::Arc;

use crate::contract::CallObject;
use crate::transport::{encode_data, quantity, JsonRpcTransport, TransportError, NO_PARAMS};

/// External wallet reached over its own JSON-RPC endpoint; it holds the keys and signs.
pub struct WalletSigner {
    transport: Arc<JsonRpcTransport>,
}

impl WalletSigner {
    pub fn new(transport: Arc<JsonRpcTransport>) -> Self {
        Self { transport }
    }
}

fn signer_error(err: TransportError) -> SignerError {
    match err {
        TransportError::Rpc(rpc) if rpc.is_user_rejection() => SignerError::Rejected(rpc.message),
        TransportError::Request(req) if req.is_connect() => {
            SignerError::Unavailable(req.to_string())
        }
        other => SignerError::Transport(other.to_string()),
    }
}

#[async_trait]
impl Signer for WalletSigner {
    async fn accounts(&self) -> Result<Vec<Address>, SignerError> {
        self.transport
            .request("eth_accounts", NO_PARAMS)
            .await
            .map_err(signer_error)
    }

    async fn request_addresses(&self) -> Result<Vec<Address>, SignerError> {
        let accounts: Vec<Address> = self
            .transport
            .request("eth_requestAccounts", NO_PARAMS)
            .await
            .map_err(signer_error)?;
        if accounts.is_empty() {
            warn!("[wallet] eth_requestAccounts returned no accounts");
            return Err(SignerError::NoAccounts);
        }
        Ok(accounts)
    }

    async fn send_transaction(&self, request: &ExecutableRequest) -> Result<TxHash, SignerError> {
        let object = CallObject {
            from: Some(request.from),
            to: request.to,
            data: encode_data(&request.data),
            chain_id: Some(quantity(request.chain_id)),
        };
        let tx_hash: TxHash = self
            .transport
            .request("eth_sendTransaction", [object])
            .await
            .map_err(signer_error)?;
        info!(
            "[wallet] {} signed by {} as {}",
            request.call.kind(),
            request.from.short(),
            tx_hash
        );
        Ok(tx_hash)
    }
}
