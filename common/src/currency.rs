use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of MIST in one SUI.
pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Currencies a deeplink may name. Parsed case-insensitively, displayed uppercase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Sui,
    Ngn,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a currency code is neither SUI nor NGN.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUI" => Ok(Currency::Sui),
            "NGN" => Ok(Currency::Ngn),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

impl Currency {
    pub fn all() -> &'static [Currency] {
        &[Currency::Sui, Currency::Ngn]
    }

    /// Canonical uppercase code, as written into navigation queries and ledger rows.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Sui => "SUI",
            Currency::Ngn => "NGN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Currency::Sui => "Sui",
            Currency::Ngn => "Naira",
        }
    }
}

/// Convert a SUI amount to MIST, truncating any sub-MIST remainder.
/// Negative and non-finite inputs map to zero.
pub fn to_mist(sui: f64) -> u64 {
    if !sui.is_finite() || sui <= 0.0 {
        return 0;
    }
    (sui * MIST_PER_SUI as f64).floor() as u64
}

/// Convert MIST back to SUI for display.
pub fn from_mist(mist: u64) -> f64 {
    mist as f64 / MIST_PER_SUI as f64
}

/// Format a SUI amount as Naira at `rate` NGN per SUI, rounded to the nearest ₦10.
pub fn format_naira(sui: f64, rate: f64) -> String {
    let naira = ((sui * rate) / 10.0).round() * 10.0;
    let whole = naira.max(0.0) as u64;
    format!("₦{}", group_thousands(whole))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("sui".parse::<Currency>(), Ok(Currency::Sui));
        assert_eq!("Ngn".parse::<Currency>(), Ok(Currency::Ngn));
        assert_eq!(" SUI ".parse::<Currency>(), Ok(Currency::Sui));
        assert!("usd".parse::<Currency>().is_err());
    }

    #[test]
    fn displays_uppercase_code() {
        assert_eq!(Currency::Sui.to_string(), "SUI");
        assert_eq!(Currency::Ngn.to_string(), "NGN");
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Ngn).unwrap(), "\"NGN\"");
        let c: Currency = serde_json::from_str("\"SUI\"").unwrap();
        assert_eq!(c, Currency::Sui);
    }

    #[test]
    fn mist_conversion() {
        assert_eq!(to_mist(0.1), 100_000_000);
        assert_eq!(to_mist(1.0), MIST_PER_SUI);
        assert_eq!(to_mist(-1.0), 0);
        assert_eq!(to_mist(f64::NAN), 0);
        assert_eq!(from_mist(500_000_000), 0.5);
    }

    #[test]
    fn naira_rounds_to_nearest_ten() {
        assert_eq!(format_naira(0.1, 1234.0), "₦120");
        assert_eq!(format_naira(2.0, 1_500_000.0), "₦3,000,000");
        assert_eq!(format_naira(0.0, 1500.0), "₦0");
    }
}
