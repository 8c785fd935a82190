use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SessionError};
use crate::gateway::{Address, ChainDescriptor, NativeCurrency};

/// Bounds for the wait-for-inclusion loop
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptPolicy {
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub backoff_factor: u32,
    pub timeout_ms: u64,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            initial_interval_ms: RECEIPT_INITIAL_INTERVAL_MS,
            max_interval_ms: RECEIPT_MAX_INTERVAL_MS,
            backoff_factor: RECEIPT_BACKOFF_FACTOR,
            timeout_ms: RECEIPT_TIMEOUT_MS,
        }
    }
}

impl ReceiptPolicy {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay to use after an empty poll that waited `current`
    pub fn next_interval(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.backoff_factor.max(1))
            .min(self.max_interval())
    }
}

/// Session configuration.
///
/// `Default` reproduces the deployed DIAO setup from `constants.rs`; a JSON
/// document may override any subset of fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub token_address: Address,
    pub staking_address: Address,
    pub chain: ChainDescriptor,
    pub token_symbol: String,
    pub token_decimals: u32,
    pub display_precision: usize,
    pub lock_duration_secs: u64,
    pub refresh_interval_ms: u64,
    pub countdown_interval_ms: u64,
    pub receipt: ReceiptPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_address: TOKEN_ADDRESS,
            staking_address: STAKING_ADDRESS,
            chain: ChainDescriptor {
                chain_id: TARGET_CHAIN_ID,
                chain_name: TARGET_CHAIN_NAME.to_string(),
                native_currency: NativeCurrency {
                    name: NATIVE_CURRENCY_NAME.to_string(),
                    symbol: NATIVE_CURRENCY_SYMBOL.to_string(),
                    decimals: NATIVE_CURRENCY_DECIMALS,
                },
                rpc_urls: vec![TARGET_RPC_URL.to_string()],
                block_explorer_urls: vec![TARGET_EXPLORER_URL.to_string()],
            },
            token_symbol: TOKEN_SYMBOL.to_string(),
            token_decimals: TOKEN_DECIMALS,
            display_precision: DISPLAY_PRECISION,
            lock_duration_secs: LOCK_DURATION_SECS,
            refresh_interval_ms: REFRESH_INTERVAL_MS,
            countdown_interval_ms: COUNTDOWN_INTERVAL_MS,
            receipt: ReceiptPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SessionConfig =
            serde_json::from_str(json).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token_address == Address::ZERO || self.staking_address == Address::ZERO {
            return Err(SessionError::Config("contract address is zero".to_string()));
        }
        // 10^38 is the largest power of ten below u128::MAX
        if self.token_decimals > 38 {
            return Err(SessionError::Config(format!(
                "token_decimals {} exceeds 38",
                self.token_decimals
            )));
        }
        if self.lock_duration_secs == 0 {
            return Err(SessionError::Config("lock_duration_secs is zero".to_string()));
        }
        if self.refresh_interval_ms == 0
            || self.countdown_interval_ms == 0
            || self.receipt.initial_interval_ms == 0
        {
            return Err(SessionError::Config("timer interval is zero".to_string()));
        }
        if self.receipt.max_interval_ms < self.receipt.initial_interval_ms {
            return Err(SessionError::Config(
                "receipt.max_interval_ms below initial_interval_ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }
}
