//! Minimal calldata codec for the handful of fixed-signature calls the
//! session makes: a 4-byte selector followed by 32-byte words.

use crate::error::{Result, SessionError};
use crate::gateway::Address;

pub const WORD_LEN: usize = 32;

/// Static ABI argument
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(u128),
}

impl Token {
    /// Left-pad to a full 32-byte word
    fn to_word(self) -> [u8; WORD_LEN] {
        let mut word = [0u8; WORD_LEN];
        match self {
            Token::Address(address) => word[12..].copy_from_slice(&address.0),
            Token::Uint(value) => word[16..].copy_from_slice(&value.to_be_bytes()),
        }
        word
    }
}

pub fn encode_call(selector: [u8; 4], args: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD_LEN);
    data.extend_from_slice(&selector);
    for arg in args {
        data.extend_from_slice(&arg.to_word());
    }
    data
}

/// Decode the first return word as an unsigned integer.
///
/// Values that do not fit in 128 bits are rejected rather than truncated.
pub fn decode_uint(data: &[u8]) -> Result<u128> {
    let word = first_word(data)?;
    if word[..16].iter().any(|b| *b != 0) {
        return Err(SessionError::Decode("uint256 exceeds 128 bits".to_string()));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

/// Decode the first return word as an address
pub fn decode_address(data: &[u8]) -> Result<Address> {
    let word = first_word(data)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(SessionError::Decode("dirty address padding".to_string()));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address(bytes))
}

fn first_word(data: &[u8]) -> Result<&[u8]> {
    data.get(..WORD_LEN).ok_or_else(|| {
        SessionError::Decode(format!(
            "expected at least {WORD_LEN} bytes, got {}",
            data.len()
        ))
    })
}

/// Split calldata into its selector and argument words
pub(crate) fn split_call(data: &[u8]) -> Result<([u8; 4], Vec<&[u8]>)> {
    if data.len() < 4 || (data.len() - 4) % WORD_LEN != 0 {
        return Err(SessionError::Decode(format!(
            "calldata length {} is not selector + words",
            data.len()
        )));
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&data[..4]);
    Ok((selector, data[4..].chunks(WORD_LEN).collect()))
}
