use tracing::{info, warn};

use crate::abi::{self, Token};
use crate::constants::APPROVE_SELECTOR;
use crate::error::{Result, SessionError};
use crate::gateway::{Address, Receipt, TransactionRequest, WalletGateway};
use crate::instructions::wait_for_inclusion;
use crate::session::StakingSession;

/// Submit `data` to `to` from `account` and wait for inclusion.
///
/// Nothing is retried: a rejected or failed submission ends the action.
pub async fn submit_and_wait<G: WalletGateway>(
    session: &StakingSession<G>,
    account: Address,
    to: Address,
    data: Vec<u8>,
) -> Result<Receipt> {
    // Subscribe before submitting so a cancel during submission is not missed
    let cancel = session.cancel_signal();

    let request = TransactionRequest {
        from: account,
        to,
        data,
    };
    let hash = session
        .gateway
        .send_transaction(&request)
        .await
        .map_err(SessionError::from_submit)?;
    info!(%hash, %to, "Transaction submitted");

    wait_for_inclusion(&*session.gateway, &hash, &session.config.receipt, cancel).await
}

/// Approve the staking contract to pull `amount` tokens from `account`
pub async fn approve_staking<G: WalletGateway>(
    session: &StakingSession<G>,
    account: Address,
    amount: u128,
) -> Result<Receipt> {
    let data = abi::encode_call(
        APPROVE_SELECTOR,
        &[
            Token::Address(session.config.staking_address),
            Token::Uint(amount),
        ],
    );
    submit_and_wait(session, account, session.config.token_address, data).await
}

/// Refresh after a confirmed transaction. The transaction already landed, so
/// a failed read is logged and left to the next periodic refresh.
pub async fn refresh_after_confirmation<G: WalletGateway>(
    session: &StakingSession<G>,
    account: Address,
) {
    if let Err(err) = session.refresh_after_confirmation(account).await {
        warn!(error = %err, "Post-transaction refresh failed");
    }
}
