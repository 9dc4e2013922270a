//! Core domain types and logic: retrieval, scoring and ranking.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod lookback;
pub mod price;
pub mod ranking;
pub mod retry;
pub mod universe;
