use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::deeplink::DeeplinkRequest;
use crate::ledger::{Direction, Ledger, LedgerStore};
use crate::wallet::{shorten, AddressError, SuiAddress};

/// Receipt returned after the SDK executed a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Transaction digest reported by the chain.
    pub digest: String,
}

impl TransferReceipt {
    /// First eight characters of the digest, for notices.
    pub fn short_digest(&self) -> &str {
        self.digest.get(..8).unwrap_or(&self.digest)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("no wallet connected")]
    NotConnected,
    #[error("invalid recipient: {0}")]
    InvalidRecipient(#[from] AddressError),
    #[error("{0} transfers are not supported")]
    UnsupportedCurrency(Currency),
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// The wallet-connection provider and transaction submitter the screens talk to.
///
/// Building, signing and executing the transaction is entirely the
/// implementation's business; callers only learn success or failure.
#[allow(async_fn_in_trait)]
pub trait WalletBackend {
    /// Address of the connected account, if any.
    fn current_account(&self) -> Option<String>;

    /// Build, sign and execute the transaction for a buy or send request.
    async fn execute(&mut self, request: &DeeplinkRequest) -> Result<TransferReceipt, WalletError>;

    /// Human-readable backend name (e.g. "dapp-kit", "mock").
    fn backend_name(&self) -> &str;
}

/// Run a validated request through `wallet`.
///
/// Receive requests execute nothing and return `Ok(None)`. Send requests are
/// limited to SUI and a well-formed recipient address.
pub async fn execute_request<W: WalletBackend>(
    wallet: &mut W,
    request: &DeeplinkRequest,
) -> Result<Option<TransferReceipt>, WalletError> {
    if wallet.current_account().is_none() {
        return Err(WalletError::NotConnected);
    }
    match request {
        DeeplinkRequest::Receive { .. } => return Ok(None),
        DeeplinkRequest::Send {
            currency,
            recipient,
            ..
        } => {
            if *currency != Currency::Sui {
                return Err(WalletError::UnsupportedCurrency(*currency));
            }
            SuiAddress::parse(recipient)?;
        }
        DeeplinkRequest::Buy { .. } => {}
    }

    let receipt = wallet.execute(request).await.map_err(|e| {
        tracing::warn!("{} rejected {}: {e}", wallet.backend_name(), request.action());
        e
    })?;
    tracing::info!(
        "{} executed {} ({}...)",
        wallet.backend_name(),
        request.action(),
        receipt.short_digest()
    );
    Ok(Some(receipt))
}

/// Append the ledger entry for a request that executed successfully.
pub fn record_success<S: LedgerStore>(ledger: &mut Ledger<S>, request: &DeeplinkRequest) {
    let (magnitude, description, currency) = match request {
        DeeplinkRequest::Receive { .. } => return,
        DeeplinkRequest::Send {
            amount,
            currency,
            recipient,
        } => (
            amount.value(),
            format!("Sent to {}", shorten(recipient)),
            *currency,
        ),
        DeeplinkRequest::Buy { package, currency } => (
            package.price(*currency),
            package.purchase_description(),
            *currency,
        ),
    };
    if let Err(e) = ledger.append(Direction::Sent, magnitude, description, Some(currency.code())) {
        tracing::error!("failed to record {}: {e}", request.action());
    }
}

/// Execute `request` and, strictly on success, record it in `ledger`.
pub async fn complete_action<W, S>(
    wallet: &mut W,
    ledger: &mut Ledger<S>,
    request: &DeeplinkRequest,
) -> Result<Option<TransferReceipt>, WalletError>
where
    W: WalletBackend,
    S: LedgerStore,
{
    let receipt = execute_request(wallet, request).await?;
    if receipt.is_some() {
        record_success(ledger, request);
    }
    Ok(receipt)
}

/// Wallet backend for development and tests.
///
/// Every transaction succeeds instantly unless a failure was armed with
/// [`MockWallet::fail_next`]. No chain is involved.
#[derive(Clone, Debug, Default)]
pub struct MockWallet {
    account: Option<String>,
    fail_next: Option<String>,
    executed: Vec<DeeplinkRequest>,
    counter: u64,
}

impl MockWallet {
    pub fn connected(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            ..Self::default()
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, account: impl Into<String>) {
        self.account = Some(account.into());
    }

    pub fn disconnect(&mut self) {
        self.account = None;
    }

    /// Make the next `execute` fail with `reason`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    pub fn executed(&self) -> &[DeeplinkRequest] {
        &self.executed
    }

    /// Take the transaction history of `other`, a copy that executed while
    /// this one stayed live. The connected account is left untouched.
    pub fn absorb_activity(&mut self, other: MockWallet) {
        self.executed = other.executed;
        self.counter = other.counter;
        self.fail_next = other.fail_next;
    }
}

impl WalletBackend for MockWallet {
    fn current_account(&self) -> Option<String> {
        self.account.clone()
    }

    async fn execute(&mut self, request: &DeeplinkRequest) -> Result<TransferReceipt, WalletError> {
        if self.account.is_none() {
            return Err(WalletError::NotConnected);
        }
        if let Some(reason) = self.fail_next.take() {
            return Err(WalletError::TransactionFailed(reason));
        }
        self.counter += 1;
        self.executed.push(request.clone());
        Ok(TransferReceipt {
            digest: format!("mockdigest{:016x}", self.counter),
        })
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
