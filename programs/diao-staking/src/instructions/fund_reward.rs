use tracing::info;

use crate::abi::{self, Token};
use crate::amount::parse_units;
use crate::constants::ADD_TO_REWARD_POOL_SELECTOR;
use crate::error::{Result, SessionError};
use crate::gateway::WalletGateway;
use crate::instructions::{approve_staking, ensure_network, refresh_after_confirmation, submit_and_wait};
use crate::session::StakingSession;
use crate::state::{ActionPhase, ActionSlot, SlotGuard};

/// Top up the staking contract's reward pool (owner only)
///
/// The owner check only gates the UI; the contract rejects anyone else.
///
/// # Arguments
/// * `session` - The staking session
/// * `input` - Amount in whole tokens
///
/// # Flow
/// 1. Require the owner role and validate the amount (no network call)
/// 2. Approve the staking contract for `amount` and wait for inclusion
/// 3. Call `addToRewardPool(amount)` and wait for inclusion
/// 4. Refresh balances and clear the reward input
///
pub async fn handler_fund_reward<G: WalletGateway>(
    session: &StakingSession<G>,
    input: &str,
) -> Result<()> {
    let guard = SlotGuard::begin(
        session.view.clone(),
        ActionSlot::FundReward,
        ActionPhase::Validating,
    )?;

    let outcome = fund_reward(session, &guard, input).await;
    if outcome.is_ok() {
        session.view.write().reward_input.clear();
    }
    guard.finish(&outcome, "보상 풀 충전이 완료되었습니다!");
    outcome
}

async fn fund_reward<G: WalletGateway>(
    session: &StakingSession<G>,
    guard: &SlotGuard,
    input: &str,
) -> Result<()> {
    let account = session.connected_account()?;
    if !session.view.read().session.is_owner {
        return Err(SessionError::NotOwner);
    }

    let amount = parse_units(input, session.config.token_decimals)?;
    let available = session.view.read().balances.token_balance;
    if amount > available {
        return Err(SessionError::InsufficientBalance {
            requested: amount,
            available,
        });
    }

    ensure_network(&*session.gateway, &session.config.chain).await?;

    guard.advance(ActionPhase::Approving, "토큰 승인을 진행합니다...");
    approve_staking(session, account, amount).await?;

    guard.advance(ActionPhase::Funding, "보상 풀에 토큰을 추가합니다...");
    let data = abi::encode_call(ADD_TO_REWARD_POOL_SELECTOR, &[Token::Uint(amount)]);
    submit_and_wait(session, account, session.config.staking_address, data).await?;

    guard.advance(ActionPhase::Refreshing, "잔액을 갱신하고 있습니다...");
    refresh_after_confirmation(session, account).await;

    info!(%account, amount, "Reward pool funded");
    Ok(())
}
