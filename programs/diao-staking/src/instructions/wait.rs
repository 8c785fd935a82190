use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::config::ReceiptPolicy;
use crate::error::{Result, SessionError};
use crate::gateway::{Receipt, TxHash, WalletGateway};

/// Block until `hash` is included in a block.
///
/// Polls the receipt, sleeping `policy.initial_interval()` after the first
/// empty poll and backing off up to `policy.max_interval()`. Gives up with
/// `TransactionTimeout` after `policy.timeout()`, or with `Cancelled` as soon
/// as `cancel` changes. A reverted receipt is an error.
pub async fn wait_for_inclusion<G: WalletGateway>(
    gateway: &G,
    hash: &TxHash,
    policy: &ReceiptPolicy,
    mut cancel: watch::Receiver<u64>,
) -> Result<Receipt> {
    let deadline = Instant::now() + policy.timeout();
    let mut delay = policy.initial_interval();
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        let receipt = gateway
            .transaction_receipt(hash)
            .await
            .map_err(|e| SessionError::TransactionFailure(e.message))?;

        if let Some(receipt) = receipt {
            if receipt.is_reverted() {
                return Err(SessionError::TransactionReverted(hash.clone()));
            }
            info!(%hash, block = receipt.block_number, polls, "Transaction included");
            return Ok(receipt);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(SessionError::TransactionTimeout(hash.clone()));
        }
        let sleep_for: Duration = delay.min(deadline - now);
        debug!(%hash, polls, ?sleep_for, "Receipt not available yet");

        tokio::select! {
            _ = time::sleep(sleep_for) => {}
            _ = cancel.changed() => return Err(SessionError::Cancelled),
        }

        delay = policy.next_interval(delay);
    }
}
