use tracing::info;

use crate::abi;
use crate::constants::WITHDRAW_SELECTOR;
use crate::countdown::remaining_lock;
use crate::error::{Result, SessionError};
use crate::gateway::WalletGateway;
use crate::instructions::{ensure_network, refresh_after_confirmation, submit_and_wait};
use crate::session::StakingSession;
use crate::state::{ActionPhase, ActionSlot, SlotGuard};

/// Withdraw the whole stake
///
/// # Flow
/// 1. Require a connected account, a nonzero stake and an elapsed lock window
/// 2. Call `withdraw()` and wait for inclusion
/// 3. Refresh balances
///
/// The lock check is a client-side precondition; the contract enforces its
/// own lock independently.
pub async fn handler_unstake<G: WalletGateway>(session: &StakingSession<G>) -> Result<()> {
    let guard = SlotGuard::begin(session.view.clone(), ActionSlot::Unstake, ActionPhase::Validating)?;

    let outcome = unstake(session, &guard).await;
    guard.finish(&outcome, "언스테이킹이 완료되었습니다!");
    outcome
}

async fn unstake<G: WalletGateway>(session: &StakingSession<G>, guard: &SlotGuard) -> Result<()> {
    let account = session.connected_account()?;

    let balances = session.view.read().balances;
    if !balances.has_stake() {
        return Err(SessionError::NothingStaked);
    }
    let remaining = remaining_lock(
        &balances,
        session.clock.now(),
        session.config.lock_duration_secs,
    )
    .unwrap_or(0);
    if remaining > 0 {
        return Err(SessionError::StakeLocked { remaining });
    }

    ensure_network(&*session.gateway, &session.config.chain).await?;

    guard.advance(ActionPhase::Withdrawing, "언스테이킹 진행 중...");
    let data = abi::encode_call(WITHDRAW_SELECTOR, &[]);
    submit_and_wait(session, account, session.config.staking_address, data).await?;

    guard.advance(ActionPhase::Refreshing, "잔액을 갱신하고 있습니다...");
    refresh_after_confirmation(session, account).await;

    info!(%account, withdrawn = balances.staked_amount, "Unstaked");
    Ok(())
}
