//! Client intelligence hub core: record loading, filtering, aggregation
//! and rule-based insights for a bank-client dashboard.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod generator;
pub mod insight;
pub mod metrics;
pub mod record;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
