// Copyright (c) James Kassemi, SC, US. All rights reserved.
use async_trait::async_trait;
use core_types::{Address, TxHash};
use ledger_client::{
    ContractCall, ExecutableRequest, LedgerWriter, Signer, SimulationError, SubmissionError,
};
use log::{debug, info};
use std::sync::Arc;

use crate::contract::{CallObject, ContractBinding};
use crate::transport::{JsonRpcTransport, TransportError};

/// Dry-runs calls with `eth_call` from the sender, then hands the request to the wallet.
pub struct RpcLedgerWriter {
    transport: Arc<JsonRpcTransport>,
    contract: ContractBinding,
    signer: Arc<dyn Signer>,
    chain_id: u64,
}

impl RpcLedgerWriter {
    pub fn new(
        transport: Arc<JsonRpcTransport>,
        contract: ContractBinding,
        signer: Arc<dyn Signer>,
        chain_id: u64,
    ) -> Self {
        Self {
            transport,
            contract,
            signer,
            chain_id,
        }
    }
}

#[async_trait]
impl LedgerWriter for RpcLedgerWriter {
    async fn simulate(
        &self,
        call: &ContractCall,
        from: Address,
    ) -> Result<ExecutableRequest, SimulationError> {
        let data = self.contract.call_data(call);
        let object = CallObject::read(self.contract.address, &data).from_account(from);
        let result: Result<String, TransportError> = self
            .transport
            .request("eth_call", (object, "latest"))
            .await;
        match result {
            Ok(_) => {
                debug!("[writer] simulated {} from {}", call.kind(), from.short());
                Ok(ExecutableRequest {
                    call: call.clone(),
                    from,
                    to: self.contract.address,
                    data,
                    chain_id: self.chain_id,
                })
            }
            Err(TransportError::Rpc(err)) if err.is_revert() => Err(SimulationError::Reverted {
                reason: err.revert_reason(),
            }),
            Err(err) => Err(SimulationError::Network(err.to_string())),
        }
    }

    async fn submit(&self, request: ExecutableRequest) -> Result<TxHash, SubmissionError> {
        let kind = request.call.kind();
        let tx_hash = self.signer.send_transaction(&request).await?;
        info!("[writer] broadcast {kind} as {tx_hash}");
        Ok(tx_hash)
    }
}
