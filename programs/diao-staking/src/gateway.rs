// =============================================================================
// Wallet Gateway
// =============================================================================
// The injected wallet provider is an external collaborator. The session only
// talks to it through `WalletGateway`, so a browser binding, a desktop wallet
// bridge or a scripted test double can all drive the same flows.
// =============================================================================

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::constants::{UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE};
use crate::error::SessionError;

/// 20-byte account or contract address.
///
/// Equality is byte-wise, so two hex spellings that differ only in case
/// (checksummed vs lowercase) compare equal.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// "0x1234...abcd" form used in the connected-wallet line
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| SessionError::Decode(format!("invalid address {s}: {e}")))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| SessionError::Decode(format!("address must be 20 bytes: {s}")))?;
        Ok(Address(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Transaction hash as returned by the provider
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only `eth_call` against the latest block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Vec<u8>,
}

/// `eth_sendTransaction` payload; gas and nonce are left to the wallet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
}

/// Subset of a transaction receipt the session cares about
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// 1 = success, 0 = reverted. Pre-Byzantium receipts carry no status.
    pub status: Option<u64>,
}

impl Receipt {
    pub fn is_reverted(&self) -> bool {
        self.status == Some(0)
    }
}

/// Native currency entry of a `wallet_addEthereumChain` request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Everything a wallet needs to add the target chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl ChainDescriptor {
    /// Chain id in the `0x`-prefixed form providers expect
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

/// Change notifications pushed by the provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

/// Error object returned by a provider request
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_CODE
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN_CODE
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Requests consumed from the injected wallet provider.
///
/// Methods mirror the provider RPC surface: `eth_requestAccounts`,
/// `eth_accounts`, `eth_chainId`, `wallet_switchEthereumChain`,
/// `wallet_addEthereumChain`, `eth_call`, `eth_sendTransaction` and
/// `eth_getTransactionReceipt`.
pub trait WalletGateway: Send + Sync + 'static {
    /// False when no provider is injected into the page
    fn is_available(&self) -> bool {
        true
    }

    /// Prompt the user for account access
    fn request_accounts(&self) -> impl Future<Output = ProviderResult<Vec<Address>>> + Send;

    /// Accounts already authorised, without prompting
    fn accounts(&self) -> impl Future<Output = ProviderResult<Vec<Address>>> + Send;

    fn chain_id(&self) -> impl Future<Output = ProviderResult<u64>> + Send;

    /// Fails with code 4902 when the wallet does not know `chain_id`
    fn switch_chain(&self, chain_id: u64) -> impl Future<Output = ProviderResult<()>> + Send;

    fn add_chain(&self, chain: &ChainDescriptor) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Returns the raw return data of the call
    fn call(&self, request: &CallRequest) -> impl Future<Output = ProviderResult<Vec<u8>>> + Send;

    fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> impl Future<Output = ProviderResult<TxHash>> + Send;

    /// `None` until the transaction is included in a block
    fn transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> impl Future<Output = ProviderResult<Option<Receipt>>> + Send;

    /// Account and chain change notifications
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}
