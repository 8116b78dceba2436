//! Configuration loading and tracing setup for the `feeplus` operator binary.

pub mod config;
pub mod observability;
