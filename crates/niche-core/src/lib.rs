//! Core types and the recalculation engine for niche market analysis.
//!
//! Three exports (keyword rankings, seller metrics, catalog) are joined into
//! keywords, competitors and products; every soft-delete or restore re-runs
//! the full metrics pass. Storage is reached only through
//! [`store::SessionStore`].

// `SessionStore` implementors write `async fn`; the trait spells out `Send`.
#![allow(async_fn_in_trait)]

pub mod amount;
pub mod deletion;
pub mod engine;
pub mod entity;
pub mod error;
pub mod join;
pub mod roots;
pub mod row;
pub mod session;
pub mod store;
pub mod view;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
