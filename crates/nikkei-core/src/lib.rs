//! Core types and trait definitions for the Nikkei membership registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The relationship classifier in [`kinship`] is pure; persistence is
//! reached only through the [`store::RegistryStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod company;
pub mod error;
pub mod event;
pub mod family;
pub mod genealogy;
pub mod kinship;
pub mod participation;
pub mod person;
pub mod store;

pub use error::{Error, Result};
