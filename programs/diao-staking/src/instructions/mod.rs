// =============================================================================
// Instructions Module - DIAO Staking
// =============================================================================
// One file per user action. Every handler claims its action slot, runs its
// flow, and records the outcome as a status line before returning it.
// =============================================================================

pub mod connect;
pub mod events;
pub mod fund_reward;
pub mod network;
pub mod stake;
pub mod transaction;
pub mod unstake;
pub mod wait;

pub use connect::*;
pub use events::*;
pub use fund_reward::*;
pub use network::*;
pub use stake::*;
pub use transaction::*;
pub use unstake::*;
pub use wait::*;
