// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::config::{CallSignatures, ContractConfig};
use core_types::types::HexParseError;
use core_types::{Address, PollIndex};
use ledger_client::ContractCall;
use serde::Serialize;

use crate::abi::{self, Token};
use crate::transport::encode_data;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selectors {
    pub get_poll_count: [u8; 4],
    pub get_poll: [u8; 4],
    pub create_poll: [u8; 4],
    pub vote: [u8; 4],
    pub end_poll: [u8; 4],
}

impl Selectors {
    pub fn from_signatures(signatures: &CallSignatures) -> Self {
        Self {
            get_poll_count: abi::selector(&signatures.get_poll_count),
            get_poll: abi::selector(&signatures.get_poll),
            create_poll: abi::selector(&signatures.create_poll),
            vote: abi::selector(&signatures.vote),
            end_poll: abi::selector(&signatures.end_poll),
        }
    }
}

/// Deployed poll contract: address plus resolved function selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractBinding {
    pub address: Address,
    pub selectors: Selectors,
}

impl ContractBinding {
    pub fn new(address: Address, signatures: &CallSignatures) -> Self {
        Self {
            address,
            selectors: Selectors::from_signatures(signatures),
        }
    }

    pub fn from_config(config: &ContractConfig) -> Result<Self, HexParseError> {
        let address: Address = config.address.parse()?;
        Ok(Self::new(address, &config.signatures))
    }

    pub fn poll_count_data(&self) -> Vec<u8> {
        abi::encode_call(self.selectors.get_poll_count, &[])
    }

    pub fn poll_data(&self, index: PollIndex) -> Vec<u8> {
        abi::encode_call(self.selectors.get_poll, &[Token::Uint(index)])
    }

    pub fn call_data(&self, call: &ContractCall) -> Vec<u8> {
        match call {
            ContractCall::CreatePoll { title, candidates } => abi::encode_call(
                self.selectors.create_poll,
                &[Token::Str(title), Token::StrArray(candidates)],
            ),
            ContractCall::Vote { poll, candidate } => abi::encode_call(
                self.selectors.vote,
                &[Token::Uint(*poll), Token::Uint(u64::from(*candidate))],
            ),
            ContractCall::EndPoll { poll } => {
                abi::encode_call(self.selectors.end_poll, &[Token::Uint(*poll)])
            }
        }
    }
}

/// `eth_call` / `eth_sendTransaction` transaction object.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

impl CallObject {
    pub fn read(to: Address, data: &[u8]) -> Self {
        Self {
            from: None,
            to,
            data: encode_data(data),
            chain_id: None,
        }
    }

    pub fn from_account(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}
