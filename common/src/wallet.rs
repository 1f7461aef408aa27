use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a SUI address in hex digits, excluding the `0x` prefix.
const ADDRESS_HEX_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address must have 64 hex digits, got {0}")]
    BadLength(usize),
    #[error("address contains a non-hex character")]
    NotHex,
}

/// A validated SUI account address (`0x` followed by 64 hex digits).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SuiAddress(String);

impl SuiAddress {
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let hex = s.strip_prefix("0x").ok_or(AddressError::MissingPrefix)?;
        if hex.len() != ADDRESS_HEX_LEN {
            return Err(AddressError::BadLength(hex.len()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::NotHex);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, e.g. `0x1234...cdef`.
    pub fn short(&self) -> String {
        shorten(&self.0)
    }
}

/// Abbreviate any address-like string to its first 6 and last 4 characters.
/// Strings too short to abbreviate are returned unchanged.
pub fn shorten(addr: &str) -> String {
    if addr.len() <= 10 || !addr.is_ascii() {
        return addr.to_string();
    }
    format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
}

impl FromStr for SuiAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SuiAddress {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<SuiAddress> for String {
    fn from(addr: SuiAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> String {
        format!("0x{}", "ab".repeat(32))
    }

    #[test]
    fn accepts_full_length_hex() {
        let a = SuiAddress::parse(&addr()).unwrap();
        assert_eq!(a.as_str(), addr());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!(SuiAddress::parse("abcd"), Err(AddressError::MissingPrefix));
        assert_eq!(SuiAddress::parse("0xabc"), Err(AddressError::BadLength(3)));
        let bad = format!("0x{}", "zz".repeat(32));
        assert_eq!(SuiAddress::parse(&bad), Err(AddressError::NotHex));
    }

    #[test]
    fn short_form() {
        let a = SuiAddress::parse(&addr()).unwrap();
        assert_eq!(a.short(), "0xabab...abab");
        assert_eq!(shorten("0xabc"), "0xabc");
    }
}
