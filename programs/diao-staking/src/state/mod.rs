// =============================================================================
// State Module - DIAO Staking
// =============================================================================

pub mod balances;
pub mod session;
pub mod view;

pub use balances::*;
pub use session::*;
pub use view::*;
