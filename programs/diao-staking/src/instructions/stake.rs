use tracing::info;

use crate::abi::{self, Token};
use crate::amount::parse_units;
use crate::constants::STAKE_SELECTOR;
use crate::error::{Result, SessionError};
use crate::gateway::WalletGateway;
use crate::instructions::{approve_staking, ensure_network, refresh_after_confirmation, submit_and_wait};
use crate::session::StakingSession;
use crate::state::{ActionPhase, ActionSlot, SlotGuard};

/// Stake DIAO tokens
///
/// # Arguments
/// * `session` - The staking session
/// * `input` - Amount as entered by the user, in whole tokens ("1.5")
///
/// # Flow
/// 1. Validate amount against the last read token balance (no network call)
/// 2. Approve the staking contract for `amount` and wait for inclusion
/// 3. Call `stake(amount)` and wait for inclusion
/// 4. Refresh balances and clear the stake input
///
pub async fn handler_stake<G: WalletGateway>(session: &StakingSession<G>, input: &str) -> Result<()> {
    let guard = SlotGuard::begin(session.view.clone(), ActionSlot::Stake, ActionPhase::Validating)?;

    let outcome = stake(session, &guard, input).await;
    if outcome.is_ok() {
        session.view.write().stake_input.clear();
    }
    guard.finish(&outcome, "스테이킹이 완료되었습니다!");
    outcome
}

async fn stake<G: WalletGateway>(
    session: &StakingSession<G>,
    guard: &SlotGuard,
    input: &str,
) -> Result<()> {
    let account = session.connected_account()?;
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

    guard.advance(ActionPhase::Staking, "스테이킹을 진행합니다...");
    let data = abi::encode_call(STAKE_SELECTOR, &[Token::Uint(amount)]);
    submit_and_wait(session, account, session.config.staking_address, data).await?;

    guard.advance(ActionPhase::Refreshing, "잔액을 갱신하고 있습니다...");
    refresh_after_confirmation(session, account).await;

    info!(%account, amount, "Staked");
    Ok(())
}
