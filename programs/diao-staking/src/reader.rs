// =============================================================================
// Contract Reader
// =============================================================================
// Read-only calls against the token and staking contracts. The three balance
// reads for an account are issued together and succeed or fail as one.
// =============================================================================

use tracing::debug;

use crate::abi::{self, Token};
use crate::config::SessionConfig;
use crate::constants::{
    BALANCE_OF_SELECTOR, GET_STAKED_AMOUNT_SELECTOR, GET_STAKE_TIMESTAMP_SELECTOR,
    OWNER_SELECTOR,
};
use crate::error::{Result, SessionError};
use crate::gateway::{Address, CallRequest, WalletGateway};
use crate::state::Balances;

/// Fetch token balance, staked amount and stake timestamp for `account`.
///
/// # Flow
/// 1. Issue `balanceOf`, `getStakedAmount` and `getStakeTimestamp` concurrently
/// 2. Fail as a whole if any of them fails
/// 3. Drop the timestamp when nothing is staked or it is zero
///
pub async fn fetch_balances<G: WalletGateway>(
    gateway: &G,
    config: &SessionConfig,
    account: Address,
) -> Result<Balances> {
    let balance_call = CallRequest {
        to: config.token_address,
        data: abi::encode_call(BALANCE_OF_SELECTOR, &[Token::Address(account)]),
    };
    let staked_call = CallRequest {
        to: config.staking_address,
        data: abi::encode_call(GET_STAKED_AMOUNT_SELECTOR, &[Token::Address(account)]),
    };
    let timestamp_call = CallRequest {
        to: config.staking_address,
        data: abi::encode_call(GET_STAKE_TIMESTAMP_SELECTOR, &[Token::Address(account)]),
    };

    let (token_balance, staked_amount, raw_timestamp) = tokio::try_join!(
        read_uint(gateway, &balance_call),
        read_uint(gateway, &staked_call),
        read_uint(gateway, &timestamp_call),
    )?;

    let stake_timestamp = u64::try_from(raw_timestamp)
        .map_err(|_| SessionError::Decode(format!("stake timestamp {raw_timestamp} out of range")))?;

    debug!(
        %account,
        token_balance,
        staked_amount,
        stake_timestamp,
        "Balances read"
    );

    Ok(Balances {
        token_balance,
        staked_amount,
        stake_timestamp: (staked_amount > 0 && stake_timestamp > 0).then_some(stake_timestamp),
    })
}

/// Read the staking contract owner
pub async fn fetch_owner<G: WalletGateway>(gateway: &G, config: &SessionConfig) -> Result<Address> {
    let request = CallRequest {
        to: config.staking_address,
        data: abi::encode_call(OWNER_SELECTOR, &[]),
    };
    let data = gateway.call(&request).await.map_err(SessionError::from_read)?;
    abi::decode_address(&data)
}

async fn read_uint<G: WalletGateway>(gateway: &G, request: &CallRequest) -> Result<u128> {
    let data = gateway.call(request).await.map_err(SessionError::from_read)?;
    abi::decode_uint(&data)
}
