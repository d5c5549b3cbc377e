//! CSV export provider for oaistat
//!
//! This crate implements the usage source for delimited usage exports,
//! one row per usage observation.

pub mod data_loader;

pub use data_loader::DataLoader;
