pub mod catalog;
pub mod entitlement;
pub mod error;
pub mod ledger;
pub mod store;
pub mod subscription;
pub mod types;

pub use error::{Error, Result};
