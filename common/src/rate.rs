use serde::Deserialize;

/// CoinGecko simple-price endpoint for SUI quoted in NGN.
pub const DEFAULT_RATE_API_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=sui&vs_currencies=ngn";

#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("malformed rate response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("rate response has no sui.ngn quote")]
    Missing,
    #[error("rate must be positive, got {0}")]
    Invalid(f64),
}

#[derive(Deserialize)]
struct SimplePrice {
    sui: Option<Quote>,
}

#[derive(Deserialize)]
struct Quote {
    ngn: Option<f64>,
}

/// Extract the NGN-per-SUI rate from a simple-price response body.
pub fn parse_rate_response(body: &str) -> Result<f64, RateError> {
    let price: SimplePrice = serde_json::from_str(body)?;
    let rate = price.sui.and_then(|q| q.ngn).ok_or(RateError::Missing)?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(RateError::Invalid(rate));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quote() {
        assert_eq!(parse_rate_response(r#"{"sui":{"ngn":5123.4}}"#).unwrap(), 5123.4);
    }

    #[test]
    fn missing_quote() {
        assert!(matches!(parse_rate_response(r#"{}"#), Err(RateError::Missing)));
        assert!(matches!(
            parse_rate_response(r#"{"sui":{"usd":3.1}}"#),
            Err(RateError::Missing)
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_rate_response("nope"), Err(RateError::Malformed(_))));
        assert!(matches!(
            parse_rate_response(r#"{"sui":{"ngn":0}}"#),
            Err(RateError::Invalid(_))
        ));
    }
}
