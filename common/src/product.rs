use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::currency::Currency;

/// Dispenser package sizes that can be bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Package {
    #[serde(rename = "100ml")]
    Ml100,
    #[serde(rename = "200ml")]
    Ml200,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported package: {0}")]
pub struct UnknownPackage(pub String);

impl FromStr for Package {
    type Err = UnknownPackage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "100ml" => Ok(Package::Ml100),
            "200ml" => Ok(Package::Ml200),
            _ => Err(UnknownPackage(s.to_string())),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Package {
    pub fn all() -> &'static [Package] {
        &[Package::Ml100, Package::Ml200]
    }

    pub fn code(&self) -> &'static str {
        match self {
            Package::Ml100 => "100ml",
            Package::Ml200 => "200ml",
        }
    }

    /// Price of the package in whole units of `currency`.
    ///
    /// NGN prices are denominated in the on-chain NAIRA token, not in fiat.
    pub fn price(&self, currency: Currency) -> f64 {
        match (self, currency) {
            (Package::Ml100, Currency::Sui) => 0.1,
            (Package::Ml200, Currency::Sui) => 0.2,
            (Package::Ml100, Currency::Ngn) => 0.00053823,
            (Package::Ml200, Currency::Ngn) => 0.107646,
        }
    }

    /// Ledger description for a completed purchase.
    pub fn purchase_description(&self) -> String {
        format!("Bought {}", self.code())
    }
}
