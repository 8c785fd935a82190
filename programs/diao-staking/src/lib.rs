//! DIAO staking session.
//!
//! Connects an injected wallet, keeps token and staking balances fresh, and
//! sequences the approve → stake, withdraw and approve → addToRewardPool
//! transactions against the DIAO token and staking contracts. Rendering is
//! left to the caller, which reads [`ViewState`] snapshots.

pub mod abi;
pub mod amount;
pub mod config;
pub mod constants;
pub mod countdown;
pub mod error;
pub mod gateway;
pub mod instructions;
pub mod reader;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_helpers;



#[cfg(test)]
mod test_countdown;



#[cfg(test)]
mod test_refresh;




use tokio::task::JoinHandle;

pub use config::{ReceiptPolicy, SessionConfig};
pub use countdown::{Clock, SystemClock};
pub use error::{Result, SessionError};
pub use gateway::*;
pub use session::StakingSession;
pub use state::*;

impl<G: WalletGateway> StakingSession<G> {
    /// Connect the wallet and start tracking its first account
    ///
    /// Switches the wallet to the target chain (adding it if unknown), reads
    /// the owner and balances, and starts the 10-second refresh loop.
    ///
    pub async fn connect(&self) -> Result<Address> {
        instructions::connect::handler_connect(self).await
    }

    /// Stake tokens
    ///
    /// # Arguments
    /// * `amount` - Amount in whole tokens, as typed ("1.5")
    ///
    pub async fn stake(&self, amount: &str) -> Result<()> {
        instructions::stake::handler_stake(self, amount).await
    }

    /// Stake the amount currently held in `ViewState::stake_input`
    pub async fn stake_from_input(&self) -> Result<()> {
        let input = self.view.read().stake_input.clone();
        self.stake(&input).await
    }

    /// Withdraw the full stake once the lock window has elapsed
    pub async fn unstake(&self) -> Result<()> {
        instructions::unstake::handler_unstake(self).await
    }

    /// Add tokens to the reward pool (owner only)
    ///
    /// # Arguments
    /// * `amount` - Amount in whole tokens
    ///
    pub async fn fund_reward_pool(&self, amount: &str) -> Result<()> {
        instructions::fund_reward::handler_fund_reward(self, amount).await
    }

    /// Re-read balances now. Returns whether the result was applied.
    pub async fn refresh(&self) -> Result<bool> {
        self.refresh_balances().await
    }

    /// Apply one provider notification
    pub async fn handle_provider_event(&self, event: ProviderEvent) -> Result<()> {
        instructions::events::handler_provider_event(self, event).await
    }

    /// Spawn a task feeding provider notifications into this session
    pub fn listen_provider_events(&self) -> JoinHandle<()> {
        instructions::events::spawn_event_listener(self)
    }
}
