//! Core types and reconciliation logic for the dissertation-defense monitor.
//!
//! This crate is deliberately free of HTTP, markup and database
//! dependencies. The markup extractor, the SQLite store and the CLI all depend
//! on it; it depends on none of them.

// Store and source traits spell out `impl Future + Send`; implementors use
// plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod case;
pub mod changelog;
pub mod config;
pub mod date;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod reconcile;
pub mod source;
pub mod status;
pub mod store;

pub use error::{Error, Result};
