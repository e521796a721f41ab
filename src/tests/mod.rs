//! In-crate test suites.
//!
//! - `common` - JSON fixtures and a fully scripted in-memory backend
//! - `mocks` - mockall helpers over the gateway trait
//! - `unit` - cross-module flows
//! - `property` - proptest invariants

mod common;
mod mocks;
mod property;
mod unit;
