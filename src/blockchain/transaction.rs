//! Transaction confirmation monitoring.
//!
//! # Responsibilities
//! - Poll for the receipt of a submitted transaction
//! - Detect reverts
//! - Count block confirmations
//!
//! The loop itself has no deadline; callers wrap it in
//! [`crate::resilience::timeouts`].

use alloy::primitives::TxHash;
use alloy::providers::Provider;
use std::time::Duration;
use tokio::time::interval;

use crate::blockchain::types::{Confirmation, ContractError, ContractResult};

/// Wait for a transaction to be mined and confirmed.
///
/// # Arguments
/// * `provider` - Provider used to query receipts and the chain head
/// * `tx_hash` - Transaction hash to monitor
/// * `required_confirmations` - Blocks on top of the inclusion block (0 = included)
/// * `poll_interval` - Delay between receipt queries
pub async fn wait_for_receipt<P: Provider + ?Sized>(
    provider: &P,
    tx_hash: TxHash,
    required_confirmations: u32,
    poll_interval: Duration,
) -> ContractResult<Confirmation> {
    let mut ticker = interval(poll_interval);

    loop {
        ticker.tick().await;

        let receipt = match provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ContractError::Rpc(e.to_string()))?
        {
            Some(r) => r,
            None => {
                tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                continue;
            }
        };

        if !receipt.status() {
            return Err(ContractError::Reverted(tx_hash));
        }

        let current_block = provider
            .get_block_number()
            .await
            .map_err(|e| ContractError::Rpc(e.to_string()))?;
        let tx_block = receipt.block_number.unwrap_or(current_block);

        if confirmations(current_block, tx_block) >= required_confirmations {
            return Ok(Confirmation {
                tx_hash,
                block_number: tx_block,
            });
        }

        tracing::debug!(
            tx_hash = %tx_hash,
            confirmations = confirmations(current_block, tx_block),
            required = required_confirmations,
            "Waiting for confirmations"
        );
    }
}

fn confirmations(current_block: u64, tx_block: u64) -> u32 {
    u32::try_from(current_block.saturating_sub(tx_block)).unwrap_or(u32::MAX)
}
