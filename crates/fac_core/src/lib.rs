pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod session;
