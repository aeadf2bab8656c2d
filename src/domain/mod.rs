//! Core domain types and logic.

pub mod candle;
pub mod trade;
pub mod indicator;
pub mod position;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod sweep;
pub mod monte_carlo;
pub mod walk_forward;
pub mod config_validation;
pub mod error;
