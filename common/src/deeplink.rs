//! Deeplink extraction and validation.
//!
//! A deeplink can arrive in three shapes, tried in this order:
//!
//! 1. the URL fragment, read as its own query string (`#action=send&amount=1`),
//! 2. the regular query string (`?action=send&amount=1`),
//! 3. structured path segments (`/send/<amount>/<currency>/<recipient>` or
//!    `/buy/<package>/<currency>`, optionally under a `/deeplink` prefix).
//!
//! The first source that carries a non-empty `action` wins. Fields are never
//! merged across sources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

use crate::currency::Currency;
use crate::product::Package;

/// Base used to resolve relative hrefs like `/send?amount=1`.
const RELATIVE_BASE: &str = "http://localhost/";

/// Legacy path prefix for structured deeplinks.
const LEGACY_PREFIX: &str = "deeplink";

/// Why a deeplink was refused. Every variant is shown to the user as a notice.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeeplinkError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("missing {field} for {action} action")]
    MissingField { action: Action, field: &'static str },
    #[error("unsupported package: {0}")]
    InvalidPackage(String),
    #[error("unsupported currency: {0}")]
    InvalidCurrency(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("malformed url: {0}")]
    InvalidUrl(String),
}

/// The three screens a deeplink can open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Send,
    Receive,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Send => "send",
            Action::Receive => "receive",
        }
    }

    /// Route path of the destination screen.
    pub fn path(&self) -> &'static str {
        match self {
            Action::Buy => "/buy",
            Action::Send => "/send",
            Action::Receive => "/receive",
        }
    }

    /// The destination screen the given path points at, if any.
    ///
    /// Only the bare screen path matches; `/send/1/SUI/0x..` is a structured
    /// deeplink, not the send screen.
    pub fn from_destination_path(path: &str) -> Option<Action> {
        let trimmed = path.trim_end_matches('/');
        [Action::Buy, Action::Send, Action::Receive]
            .into_iter()
            .find(|a| a.path() == trimmed)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DeeplinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "send" => Ok(Action::Send),
            "receive" => Ok(Action::Receive),
            _ => Err(DeeplinkError::UnknownAction(s.to_string())),
        }
    }
}

/// Snapshot of the parts of a URL the router looks at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlState {
    pub path: String,
    /// Query string without the leading `?`.
    pub query: String,
    /// Fragment without the leading `#`.
    pub hash: String,
}

impl UrlState {
    pub fn new(path: impl Into<String>, query: &str, hash: &str) -> Self {
        Self {
            path: path.into(),
            query: query.trim_start_matches('?').to_string(),
            hash: hash.trim_start_matches('#').to_string(),
        }
    }

    /// Parse an absolute (`https://host/p?q#h`) or root-relative (`/p?q#h`) href.
    pub fn parse(href: &str) -> Result<Self, DeeplinkError> {
        let url = match Url::parse(href) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
                .and_then(|base| base.join(href))
                .map_err(|e| DeeplinkError::InvalidUrl(e.to_string()))?,
            Err(e) => return Err(DeeplinkError::InvalidUrl(e.to_string())),
        };
        Ok(Self {
            path: url.path().to_string(),
            query: url.query().unwrap_or_default().to_string(),
            hash: url.fragment().unwrap_or_default().to_string(),
        })
    }
}

/// Where a set of raw parameters was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamSource {
    Hash,
    Query,
    Path,
}

/// Unvalidated deeplink parameters, exactly as they appeared in the URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawParams {
    pub source: ParamSource,
    pub action: String,
    pub package: Option<String>,
    pub currency: Option<String>,
    pub amount: Option<String>,
    pub recipient: Option<String>,
}

impl RawParams {
    /// Parameters for `action` with no fields set.
    pub fn new(source: ParamSource, action: impl Into<String>) -> Self {
        Self {
            source,
            action: action.into(),
            package: None,
            currency: None,
            amount: None,
            recipient: None,
        }
    }

    /// Read parameters from a query string. Returns `None` when there is no action.
    pub fn from_query(source: ParamSource, query: &str) -> Option<Self> {
        let (action, mut params) = Self::parse_pairs(source, query);
        params.action = action?;
        Some(params)
    }

    /// Parameters a destination screen was opened with: the action comes from
    /// the screen path, the fields from its query string.
    pub fn from_screen(url: &UrlState) -> Option<Self> {
        let screen = Action::from_destination_path(&url.path)?;
        let (_, mut params) = Self::parse_pairs(ParamSource::Query, &url.query);
        params.action = screen.as_str().to_string();
        Some(params)
    }

    fn parse_pairs(source: ParamSource, query: &str) -> (Option<String>, Self) {
        let mut action = None;
        let mut params = Self::new(source, String::new());
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            // First occurrence of a key wins.
            let slot = match &*key {
                "action" => &mut action,
                "package" => &mut params.package,
                "currency" => &mut params.currency,
                "amount" => &mut params.amount,
                "recipient" => &mut params.recipient,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
        (action, params)
    }

    /// Read a fragment as a query string. Accepts `action=..`, `?action=..` and `/?action=..`.
    pub fn from_hash(hash: &str) -> Option<Self> {
        let query = hash
            .trim_start_matches('#')
            .trim_start_matches('/')
            .trim_start_matches('?');
        Self::from_query(ParamSource::Hash, query)
    }

    /// Read structured path segments.
    pub fn from_path(path: &str) -> Option<Self> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first() == Some(&LEGACY_PREFIX) {
            segments.remove(0);
        }
        let (&head, rest) = segments.split_first()?;
        if rest.is_empty() {
            return None;
        }
        let arg = |i: usize| rest.get(i).map(|s| s.to_string());
        let head = head.to_ascii_lowercase();
        let mut params = Self::new(ParamSource::Path, head.as_str());
        match head.as_str() {
            "send" if rest.len() <= 3 => {
                params.amount = arg(0);
                params.currency = arg(1);
                params.recipient = arg(2);
            }
            "buy" if rest.len() <= 2 => {
                params.package = arg(0);
                params.currency = arg(1);
            }
            _ => return None,
        }
        Some(params)
    }

    /// Extract parameters from a URL, honouring hash > query > path precedence.
    pub fn extract(url: &UrlState) -> Option<Self> {
        Self::from_hash(&url.hash)
            .or_else(|| Self::from_query(ParamSource::Query, &url.query))
            .or_else(|| Self::from_path(&url.path))
    }

    /// Check the parameters against the rules of their action.
    pub fn validate(&self) -> Result<DeeplinkRequest, DeeplinkError> {
        let action: Action = self.action.parse()?;
        match action {
            Action::Buy => {
                let package = require(action, "package", &self.package)?;
                let currency = require(action, "currency", &self.currency)?;
                Ok(DeeplinkRequest::Buy {
                    package: package
                        .parse()
                        .map_err(|_| DeeplinkError::InvalidPackage(package.to_string()))?,
                    currency: parse_currency(currency)?,
                })
            }
            Action::Send => {
                let amount = require(action, "amount", &self.amount)?;
                let currency = require(action, "currency", &self.currency)?;
                let recipient = require(action, "recipient", &self.recipient)?;
                Ok(DeeplinkRequest::Send {
                    amount: amount.parse()?,
                    currency: parse_currency(currency)?,
                    recipient: recipient.to_string(),
                })
            }
            // Always valid; fields that do not parse are dropped.
            Action::Receive => Ok(DeeplinkRequest::Receive {
                amount: self.amount.as_deref().and_then(|a| {
                    a.parse::<Amount>()
                        .map_err(|e| tracing::debug!("receive link: dropping {e}"))
                        .ok()
                }),
                currency: self.currency.as_deref().and_then(|c| {
                    parse_currency(c)
                        .map_err(|e| tracing::debug!("receive link: dropping {e}"))
                        .ok()
                }),
            }),
        }
    }
}

fn require<'a>(
    action: Action,
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, DeeplinkError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(DeeplinkError::MissingField { action, field })
}

fn parse_currency(s: &str) -> Result<Currency, DeeplinkError> {
    s.parse()
        .map_err(|_| DeeplinkError::InvalidCurrency(s.to_string()))
}

/// A positive decimal amount, keeping the caller's spelling for round-tripping.
#[derive(Clone, Debug, PartialEq)]
pub struct Amount {
    text: String,
    value: f64,
}

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl FromStr for Amount {
    type Err = DeeplinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(Self {
                text: text.to_string(),
                value,
            }),
            _ => Err(DeeplinkError::InvalidAmount(s.to_string())),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A complete, validated deeplink request.
#[derive(Clone, Debug, PartialEq)]
pub enum DeeplinkRequest {
    Buy {
        package: Package,
        currency: Currency,
    },
    Send {
        amount: Amount,
        currency: Currency,
        recipient: String,
    },
    Receive {
        amount: Option<Amount>,
        currency: Option<Currency>,
    },
}

impl DeeplinkRequest {
    pub fn action(&self) -> Action {
        match self {
            DeeplinkRequest::Buy { .. } => Action::Buy,
            DeeplinkRequest::Send { .. } => Action::Send,
            DeeplinkRequest::Receive { .. } => Action::Receive,
        }
    }

    /// Dedup key over (action, amount, currency, recipient, package).
    pub fn fingerprint(&self) -> Fingerprint {
        let (amount, currency, recipient, package) = match self {
            DeeplinkRequest::Buy { package, currency } => {
                ("", Some(*currency), "", package.code())
            }
            DeeplinkRequest::Send {
                amount,
                currency,
                recipient,
            } => (amount.as_str(), Some(*currency), recipient.as_str(), ""),
            DeeplinkRequest::Receive { amount, currency } => (
                amount.as_ref().map(Amount::as_str).unwrap_or_default(),
                *currency,
                "",
                "",
            ),
        };
        let currency = currency.map(|c| c.code()).unwrap_or_default();
        Fingerprint(format!(
            "{}|{amount}|{currency}|{recipient}|{package}",
            self.action()
        ))
    }

    /// Navigation to the destination screen, carrying only the fields it uses.
    pub fn navigation(&self) -> Navigation {
        let mut params = Vec::new();
        match self {
            DeeplinkRequest::Buy { package, currency } => {
                params.push(("package", package.code().to_string()));
                params.push(("currency", currency.code().to_string()));
            }
            DeeplinkRequest::Send {
                amount,
                currency,
                recipient,
            } => {
                params.push(("amount", amount.as_str().to_string()));
                params.push(("currency", currency.code().to_string()));
                params.push(("recipient", recipient.clone()));
            }
            DeeplinkRequest::Receive { amount, currency } => {
                if let Some(amount) = amount {
                    params.push(("amount", amount.as_str().to_string()));
                }
                if let Some(currency) = currency {
                    params.push(("currency", currency.code().to_string()));
                }
            }
        }
        Navigation {
            destination: self.action(),
            params,
        }
    }
}

/// Identity of a logical request for deduplication.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A navigation command emitted by the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub destination: Action,
    /// Ordered query parameters.
    pub params: Vec<(&'static str, String)>,
}

impl Navigation {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }

    /// Destination path plus canonical query, e.g. `/buy?package=100ml&currency=SUI`.
    pub fn to_url(&self) -> String {
        if self.params.is_empty() {
            return self.destination.path().to_string();
        }
        format!("{}?{}", self.destination.path(), self.query_string())
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}
