// =============================================================================
// DIAO Staking Constants
// =============================================================================
// Default contract addresses, function selectors and timing values. Every
// value here is also a field of `SessionConfig`, which is built from these
// defaults unless a JSON config overrides it.
// =============================================================================

use crate::gateway::Address;

// =============================================================================
// CONTRACT ADDRESSES
// =============================================================================

/// DIAO token (ERC-20) - 0xd2358dAf3b0b0208F4eAdAd6f8d9Dc554cc8d776
pub const TOKEN_ADDRESS: Address = Address([
    0xd2, 0x35, 0x8d, 0xaf, 0x3b, 0x0b, 0x02, 0x08, 0xf4, 0xea, 0xda, 0xd6, 0xf8, 0xd9, 0xdc, 0x55,
    0x4c, 0xc8, 0xd7, 0x76,
]);

/// Staking contract - 0xE24067Fe11168FA6b960250C09D493D3CCE44501
pub const STAKING_ADDRESS: Address = Address([
    0xe2, 0x40, 0x67, 0xfe, 0x11, 0x16, 0x8f, 0xa6, 0xb9, 0x60, 0x25, 0x0c, 0x09, 0xd4, 0x93, 0xd3,
    0xcc, 0xe4, 0x45, 0x01,
]);

// =============================================================================
// FUNCTION SELECTORS
// =============================================================================
// First four bytes of keccak256 over the canonical signature.
// =============================================================================

/// balanceOf(address)
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// approve(address,uint256)
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// stake(uint256)
pub const STAKE_SELECTOR: [u8; 4] = [0xa6, 0x94, 0xfc, 0x3a];

/// withdraw()
pub const WITHDRAW_SELECTOR: [u8; 4] = [0x3c, 0xcf, 0xd6, 0x0b];

/// getStakedAmount(address)
pub const GET_STAKED_AMOUNT_SELECTOR: [u8; 4] = [0x4d, 0xa6, 0xa5, 0x56];

/// getStakeTimestamp(address)
pub const GET_STAKE_TIMESTAMP_SELECTOR: [u8; 4] = [0x83, 0x51, 0xac, 0x03];

/// owner()
pub const OWNER_SELECTOR: [u8; 4] = [0x8d, 0xa5, 0xcb, 0x5b];

/// addToRewardPool(uint256)
pub const ADD_TO_REWARD_POOL_SELECTOR: [u8; 4] = [0xb9, 0x5f, 0xfb, 0xce];

// =============================================================================
// TOKEN
// =============================================================================

/// DIAO uses 18 decimals: 1 DIAO = 10^18 base units
pub const TOKEN_DECIMALS: u32 = 18;

/// Fractional digits shown for balances ("보유량: 1.000000 DIAO")
pub const DISPLAY_PRECISION: usize = 6;

pub const TOKEN_SYMBOL: &str = "DIAO";

// =============================================================================
// LOCK WINDOW
// =============================================================================

/// 30 days. Must match the staking contract's lock period; the contract is
/// the authority and this value only drives the countdown and unstake gating.
pub const LOCK_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

// =============================================================================
// TIMERS
// =============================================================================

/// Balance refresh tick while a wallet is connected
pub const REFRESH_INTERVAL_MS: u64 = 10_000;

/// Countdown tick while a lock window is active
pub const COUNTDOWN_INTERVAL_MS: u64 = 1_000;

// =============================================================================
// RECEIPT POLLING
// =============================================================================

/// First delay between receipt polls
pub const RECEIPT_INITIAL_INTERVAL_MS: u64 = 1_000;

/// Upper bound for the backed-off poll delay
pub const RECEIPT_MAX_INTERVAL_MS: u64 = 8_000;

/// Multiplier applied to the delay after every empty poll
pub const RECEIPT_BACKOFF_FACTOR: u32 = 2;

/// Give up waiting for inclusion after 10 minutes
pub const RECEIPT_TIMEOUT_MS: u64 = 10 * 60 * 1_000;

// =============================================================================
// TARGET NETWORK
// =============================================================================

/// Base mainnet
pub const TARGET_CHAIN_ID: u64 = 8453;
pub const TARGET_CHAIN_NAME: &str = "Base";
pub const TARGET_RPC_URL: &str = "https://mainnet.base.org";
pub const TARGET_EXPLORER_URL: &str = "https://basescan.org";
pub const NATIVE_CURRENCY_NAME: &str = "Ether";
pub const NATIVE_CURRENCY_SYMBOL: &str = "ETH";
pub const NATIVE_CURRENCY_DECIMALS: u8 = 18;

// =============================================================================
// PROVIDER ERROR CODES (EIP-1193 / wallet_addEthereumChain)
// =============================================================================

/// The user rejected the request
pub const USER_REJECTED_CODE: i64 = 4001;

/// The requested chain has not been added to the wallet
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
