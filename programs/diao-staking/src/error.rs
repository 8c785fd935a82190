use thiserror::Error;

use crate::amount::AmountError;
use crate::gateway::{ProviderError, TxHash};
use crate::state::ActionSlot;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    // Provider / Network Errors
    #[error("wallet provider not found")]
    ProviderMissing,

    #[error("wallet is on chain {actual}, expected chain {expected}")]
    NetworkMismatch { expected: u64, actual: u64 },

    #[error("network switch rejected: {0}")]
    SwitchRejected(String),

    #[error("wallet connection failed: {0}")]
    ConnectionFailed(String),

    // Session Errors
    #[error("wallet not connected")]
    NotConnected,

    #[error("action already in progress: {0:?}")]
    ActionInProgress(ActionSlot),

    // Amount Errors
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    // Staking Errors
    #[error("nothing staked")]
    NothingStaked,

    #[error("stake is locked for another {remaining} seconds")]
    StakeLocked { remaining: u64 },

    // Authorization Errors
    #[error("unauthorized: owner only")]
    NotOwner,

    // Read Errors
    #[error("contract read failed: {0}")]
    ReadFailure(String),

    #[error("malformed response: {0}")]
    Decode(String),

    // Transaction Errors
    #[error("transaction rejected by user")]
    UserRejectedTransaction,

    #[error("transaction failed: {0}")]
    TransactionFailure(String),

    #[error("transaction {0} reverted")]
    TransactionReverted(TxHash),

    #[error("transaction {0} not included before timeout")]
    TransactionTimeout(TxHash),

    #[error("wait cancelled")]
    Cancelled,

    // Configuration Errors
    #[error("invalid config: {0}")]
    Config(String),
}

impl SessionError {
    /// Map a provider error raised while submitting a transaction
    pub fn from_submit(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            SessionError::UserRejectedTransaction
        } else {
            SessionError::TransactionFailure(err.message)
        }
    }

    /// Map a provider error raised by a read (`eth_call`, `eth_chainId`, ...)
    pub fn from_read(err: ProviderError) -> Self {
        SessionError::ReadFailure(err.message)
    }

    /// Map a provider error raised by a chain switch or add
    pub fn from_switch(err: ProviderError) -> Self {
        SessionError::SwitchRejected(err.message)
    }

    /// Status line shown when an action fails
    pub fn status_message(&self, slot: ActionSlot) -> String {
        match self {
            SessionError::ProviderMissing => "MetaMask를 설치해주세요!".to_string(),
            SessionError::NotConnected => "먼저 지갑을 연결해주세요!".to_string(),
            other => format!("{} 실패: {}", slot.label(), other),
        }
    }
}
