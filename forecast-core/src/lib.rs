//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - An HTTP client for the upstream forecast provider
//! - The per-day summarization and alerting transform
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod model;
pub mod summary;

pub use client::{FetchError, ForecastClient, ForecastTransport, HttpTransport, TransportResponse};
pub use config::Config;
pub use model::{DayEntry, DaySummary, RawPayload, RawSample};
pub use summary::{AlertThresholds, summarize, summarize_with};
