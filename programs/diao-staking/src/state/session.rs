use serde::Serialize;

use crate::gateway::Address;

/// Wallet session.
///
/// Created on connection, cleared when the wallet reports an empty account
/// list, and torn down before re-initialisation when the chain changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Account currently connected, if any
    pub account: Option<Address>,

    /// Whether `account` is the staking contract owner. Only gates UI; the
    /// contract enforces authorization.
    pub is_owner: bool,
}

impl Session {
    pub fn connected(account: Address) -> Self {
        Self {
            account: Some(account),
            is_owner: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}
