pub mod completion;
pub mod config;
pub mod currency;
pub mod deeplink;
pub mod ledger;
pub mod product;
pub mod rate;
pub mod router;
pub mod wallet;
pub mod wallet_backend;
