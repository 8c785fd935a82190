use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::gateway::{Address, WalletGateway};
use crate::instructions::ensure_network;
use crate::session::StakingSession;
use crate::state::{ActionPhase, ActionSlot, SlotGuard};

/// Connect the injected wallet
///
/// # Flow
/// 1. Fail with `ProviderMissing` when no provider is injected
/// 2. Request account access and take the first account
/// 3. Switch the wallet to the target chain (adding it if unknown)
/// 4. Adopt the account: owner check, first balance read, refresh loop
///
pub async fn handler_connect<G: WalletGateway>(session: &StakingSession<G>) -> Result<Address> {
    let guard = SlotGuard::begin(session.view.clone(), ActionSlot::Connect, ActionPhase::Connecting)?;

    let outcome = connect(session).await;
    guard.finish(&outcome, "지갑이 연결되었습니다!");
    outcome
}

async fn connect<G: WalletGateway>(session: &StakingSession<G>) -> Result<Address> {
    if !session.gateway.is_available() {
        return Err(SessionError::ProviderMissing);
    }

    let accounts = session
        .gateway
        .request_accounts()
        .await
        .map_err(|e| SessionError::ConnectionFailed(e.message))?;
    let account = accounts
        .first()
        .copied()
        .ok_or_else(|| SessionError::ConnectionFailed("no accounts returned".to_string()))?;

    ensure_network(&*session.gateway, &session.config.chain).await?;

    activate_account(session, account).await;
    info!(%account, "Wallet connected");
    Ok(account)
}

/// Make `account` the session account and start tracking it.
///
/// Previous account values are dropped before the first read, so nothing of
/// the old account is ever shown for the new one.
pub(crate) async fn activate_account<G: WalletGateway>(session: &StakingSession<G>, account: Address) {
    session.view.write().adopt_account(account);
    session.sync_countdown();

    session.refresh_owner(account).await;
    if let Err(err) = session.refresh_balances().await {
        warn!(%account, error = %err, "Initial balance read failed");
    }
    session.start_refresh_loop();
}
