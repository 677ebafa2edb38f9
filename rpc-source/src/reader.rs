// Copyright (c) James Kassemi, SC, US. All rights reserved.
use async_trait::async_trait;
use core_types::PollIndex;
use ledger_client::{LedgerReader, PollRecord, ReadError};
use log::debug;
use std::sync::Arc;

use crate::abi;
use crate::contract::{CallObject, ContractBinding};
use crate::transport::{decode_data, JsonRpcTransport, TransportError};

/// `getPollCount` / `getPoll` over `eth_call` against the latest block.
pub struct RpcLedgerReader {
    transport: Arc<JsonRpcTransport>,
    contract: ContractBinding,
}

impl RpcLedgerReader {
    pub fn new(transport: Arc<JsonRpcTransport>, contract: ContractBinding) -> Self {
        Self {
            transport,
            contract,
        }
    }

    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let object = CallObject::read(self.contract.address, &data);
        let raw: String = self
            .transport
            .request("eth_call", (object, "latest"))
            .await?;
        decode_data(&raw).map_err(|err| TransportError::Decode {
            method: "eth_call".to_string(),
            reason: err.to_string(),
        })
    }
}

fn read_error(err: TransportError) -> ReadError {
    match err {
        TransportError::Decode { reason, .. } => ReadError::Malformed(reason),
        other => ReadError::Network(other.to_string()),
    }
}

#[async_trait]
impl LedgerReader for RpcLedgerReader {
    async fn poll_count(&self) -> Result<u64, ReadError> {
        let data = self
            .call(self.contract.poll_count_data())
            .await
            .map_err(read_error)?;
        abi::read_uint(&data, 0).map_err(|err| ReadError::Malformed(err.to_string()))
    }

    async fn poll(&self, index: PollIndex) -> Result<PollRecord, ReadError> {
        let data = match self.call(self.contract.poll_data(index)).await {
            Ok(data) => data,
            Err(TransportError::Rpc(err)) if err.is_revert() => {
                debug!("[reader] getPoll({index}) reverted: {}", err.revert_reason());
                return Err(ReadError::OutOfRange { index });
            }
            Err(err) => return Err(read_error(err)),
        };
        abi::decode_poll_record(&data).map_err(|err| ReadError::Malformed(err.to_string()))
    }
}
