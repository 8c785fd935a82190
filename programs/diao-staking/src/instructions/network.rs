use tracing::info;

use crate::error::{Result, SessionError};
use crate::gateway::{ChainDescriptor, WalletGateway};

/// Make sure the wallet is on the target chain before any read or write.
///
/// # Flow
/// 1. Nothing to do if the wallet already reports the target chain
/// 2. Ask the wallet to switch
/// 3. If the wallet does not know the chain (4902), add it and switch again
/// 4. Confirm the wallet now reports the target chain
///
pub async fn ensure_network<G: WalletGateway>(gateway: &G, chain: &ChainDescriptor) -> Result<()> {
    let current = gateway.chain_id().await.map_err(SessionError::from_read)?;
    if current == chain.chain_id {
        return Ok(());
    }

    info!(
        current,
        target = chain.chain_id,
        "Switching wallet to {}",
        chain.chain_name
    );

    match gateway.switch_chain(chain.chain_id).await {
        Ok(()) => {}
        Err(err) if err.is_unrecognized_chain() => {
            info!(target = chain.chain_id, "Chain unknown to wallet, adding it");
            gateway
                .add_chain(chain)
                .await
                .map_err(SessionError::from_switch)?;
            gateway
                .switch_chain(chain.chain_id)
                .await
                .map_err(SessionError::from_switch)?;
        }
        Err(err) => return Err(SessionError::from_switch(err)),
    }

    let actual = gateway.chain_id().await.map_err(SessionError::from_read)?;
    if actual != chain.chain_id {
        return Err(SessionError::NetworkMismatch {
            expected: chain.chain_id,
            actual,
        });
    }
    Ok(())
}
