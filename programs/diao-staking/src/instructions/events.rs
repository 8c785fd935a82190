use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::gateway::{ProviderEvent, WalletGateway};
use crate::instructions::connect::activate_account;
use crate::instructions::ensure_network;
use crate::session::StakingSession;
use crate::state::Severity;

/// React to a provider notification
///
/// * `AccountsChanged([])` - clear the session and report the disconnect
/// * `AccountsChanged([a, ..])` - unless `a` is already the session account,
///   abandon the previous account's receipt waits, put the wallet back on the
///   target chain and adopt `a` with a fresh refresh. A failed switch leaves
///   the session disconnected.
/// * `ChainChanged(id)` - tear the session down and re-initialise it. Receipt
///   waits survive only if the wallet is back on the target chain.
///
pub async fn handler_provider_event<G: WalletGateway>(
    session: &StakingSession<G>,
    event: ProviderEvent,
) -> Result<()> {
    match event {
        ProviderEvent::AccountsChanged(accounts) => match accounts.first().copied() {
            None => {
                info!("Wallet reported no accounts, disconnecting");
                session.teardown(true);
                session
                    .view
                    .write()
                    .set_status(Severity::Info, "지갑 연결이 해제되었습니다.");
                Ok(())
            }
            Some(account) => {
                if session.view.read().session.account == Some(account) {
                    return Ok(());
                }
                info!(%account, "Wallet account changed");
                // Waits belong to transactions of the previous account
                session.cancel_pending();
                if let Err(err) = ensure_network(&*session.gateway, &session.config.chain).await {
                    session.teardown(false);
                    return Err(err);
                }
                activate_account(session, account).await;
                session
                    .view
                    .write()
                    .set_status(Severity::Info, format!("계정이 변경되었습니다: {}", account.short()));
                Ok(())
            }
        },
        ProviderEvent::ChainChanged(chain_id) => {
            let on_target = chain_id == session.config.chain.chain_id;
            info!(chain_id, on_target, "Wallet chain changed");
            session.teardown(!on_target);
            session.view.write().set_status(
                Severity::Info,
                "네트워크가 변경되었습니다. 세션을 다시 초기화합니다.",
            );
            reinitialize(session).await
        }
    }
}

/// Rebuild the session from the wallet's already-authorised accounts without
/// prompting. Does nothing when the wallet exposes no account.
pub async fn reinitialize<G: WalletGateway>(session: &StakingSession<G>) -> Result<()> {
    let accounts = session
        .gateway
        .accounts()
        .await
        .map_err(SessionError::from_read)?;
    let Some(account) = accounts.first().copied() else {
        return Ok(());
    };

    ensure_network(&*session.gateway, &session.config.chain).await?;
    activate_account(session, account).await;
    Ok(())
}

/// Feed provider notifications into the session until the provider closes
/// its event stream.
pub fn spawn_event_listener<G: WalletGateway>(session: &StakingSession<G>) -> JoinHandle<()> {
    let mut events = session.gateway.subscribe();
    let session = session.clone();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(err) = handler_provider_event(&session, event).await {
                        warn!(error = %err, "Provider event handling failed");
                        session
                            .view
                            .write()
                            .set_status(Severity::Error, format!("세션 초기화 실패: {err}"));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Provider events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
