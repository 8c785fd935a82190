use serde::Serialize;

/// On-chain position of the connected account, in raw base units.
///
/// Recomputed from chain reads on every refresh; the last successful read
/// wins and a failed read leaves the previous value in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    /// Token balance held in the wallet
    pub token_balance: u128,

    /// Amount deposited in the staking contract
    pub staked_amount: u128,

    /// Unix seconds of the last stake. `None` when nothing is staked or the
    /// contract reports zero.
    pub stake_timestamp: Option<u64>,
}

impl Balances {
    pub fn has_stake(&self) -> bool {
        self.staked_amount > 0
    }
}
