// Copyright (c) James Kassemi, SC, US. All rights reserved.
use async_trait::async_trait;
use core_types::config::ConfirmationConfig;
use core_types::retry::RetryPolicy;
use core_types::TxHash;
use ledger_client::{Confirmation, ConfirmationError, ConfirmationTracker};
use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::transport::{parse_quantity, JsonRpcTransport, TransportError};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub block_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
}

/// Outcome of one receipt check that did not produce a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReceiptCheck {
    NotFinal,
    Transient(String),
    Failed(ConfirmationError),
}

impl ReceiptCheck {
    fn keep_polling(&self) -> bool {
        matches!(self, ReceiptCheck::NotFinal | ReceiptCheck::Transient(_))
    }
}

/// Polls `eth_getTransactionReceipt` until the transaction is buried under
/// `confirmations` blocks, it reverts, or the overall timeout fires.
pub struct RpcReceiptTracker {
    transport: Arc<JsonRpcTransport>,
    policy: RetryPolicy,
    timeout: Duration,
    confirmations: u64,
}

impl RpcReceiptTracker {
    pub fn new(transport: Arc<JsonRpcTransport>, config: &ConfirmationConfig) -> Self {
        Self {
            transport,
            policy: RetryPolicy::receipt_polling(
                config.poll_interval_ms,
                config.max_poll_interval_ms,
            ),
            timeout: config.timeout(),
            confirmations: config.confirmations.max(1),
        }
    }

    async fn check_once(&self, tx_hash: TxHash) -> Result<Confirmation, ReceiptCheck> {
        let receipt: Option<TxReceipt> = self
            .transport
            .request("eth_getTransactionReceipt", [tx_hash])
            .await
            .map_err(|err| transport_check(tx_hash, err))?;
        let Some(receipt) = receipt else {
            return Err(ReceiptCheck::NotFinal);
        };
        let head = if self.confirmations > 1 {
            Some(
                self.transport
                    .block_number()
                    .await
                    .map_err(|err| transport_check(tx_hash, err))?,
            )
        } else {
            None
        };
        interpret_receipt(tx_hash, &receipt, head, self.confirmations)
    }
}

fn transport_check(tx_hash: TxHash, err: TransportError) -> ReceiptCheck {
    if err.is_transient() {
        ReceiptCheck::Transient(err.to_string())
    } else {
        ReceiptCheck::Failed(ConfirmationError::Channel {
            tx_hash,
            reason: err.to_string(),
        })
    }
}

fn malformed(tx_hash: TxHash, reason: String) -> ReceiptCheck {
    ReceiptCheck::Failed(ConfirmationError::Channel { tx_hash, reason })
}

fn interpret_receipt(
    tx_hash: TxHash,
    receipt: &TxReceipt,
    head: Option<u64>,
    confirmations: u64,
) -> Result<Confirmation, ReceiptCheck> {
    // Pending-block receipts carry no block number yet.
    let Some(raw_block) = receipt.block_number.as_deref() else {
        return Err(ReceiptCheck::NotFinal);
    };
    let block_number = parse_quantity(raw_block).map_err(|reason| malformed(tx_hash, reason))?;
    if let Some(head) = head {
        let depth = head.saturating_sub(block_number).saturating_add(1);
        if head < block_number || depth < confirmations {
            return Err(ReceiptCheck::NotFinal);
        }
    }
    let succeeded = match receipt.status.as_deref() {
        Some(raw) => parse_quantity(raw).map_err(|reason| malformed(tx_hash, reason))? == 1,
        None => true,
    };
    if !succeeded {
        return Err(ReceiptCheck::Failed(ConfirmationError::Reverted {
            tx_hash,
            block_number,
        }));
    }
    let gas_used = receipt
        .gas_used
        .as_deref()
        .and_then(|raw| parse_quantity(raw).ok());
    Ok(Confirmation {
        tx_hash,
        block_number,
        gas_used,
    })
}

#[async_trait]
impl ConfirmationTracker for RpcReceiptTracker {
    async fn await_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ConfirmationError> {
        let waited_secs = self.timeout.as_secs();
        let polling = self
            .policy
            .retry_async_while(
                |attempt| {
                    if attempt > 0 {
                        debug!("[confirm] {tx_hash} not final, check #{}", attempt + 1);
                    }
                    self.check_once(tx_hash)
                },
                ReceiptCheck::keep_polling,
            );
        let outcome = match tokio::time::timeout(self.timeout, polling).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("[confirm] {tx_hash} not final after {waited_secs}s");
                return Err(ConfirmationError::Timeout {
                    tx_hash,
                    waited_secs,
                });
            }
        };
        match outcome {
            Ok(confirmation) => {
                info!(
                    "[confirm] {tx_hash} final in block {}",
                    confirmation.block_number
                );
                Ok(confirmation)
            }
            Err(ReceiptCheck::Failed(err)) => {
                warn!("[confirm] {err}");
                Err(err)
            }
            Err(ReceiptCheck::NotFinal) => Err(ConfirmationError::Timeout {
                tx_hash,
                waited_secs,
            }),
            Err(ReceiptCheck::Transient(reason)) => {
                Err(ConfirmationError::Channel { tx_hash, reason })
            }
        }
    }
}
