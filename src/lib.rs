//! Farm weather library
//!
//! Dual-source weather aggregation with per-provider source caches on the
//! server side and a persisted single-slot result cache on the client side.

pub mod advice;
pub mod aggregator;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod proxy;
pub mod routes;
pub mod server;
pub mod state;
pub mod sweep;
