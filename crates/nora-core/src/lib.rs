//! Core types and trait definitions for nora, a local-first grade tracker.
//!
//! This crate is deliberately free of database and terminal dependencies.
//! Storage backends implement the collaborator traits in [`store`]; the
//! stateful application layer (`nora-app`) is generic over them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod grade;
pub mod memory;
pub mod notify;
pub mod pin;
pub mod store;
pub mod subject;
pub mod summary;

pub use error::{Error, Result};
