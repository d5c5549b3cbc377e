//! Usage API provider for oaistat
//!
//! This crate implements the usage source for the vendor usage endpoint,
//! fetching one calendar day per request.

pub mod data_loader;

pub use data_loader::{ApiCredentials, DataLoader};
