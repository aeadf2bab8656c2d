//! tradelab: indicator, strategy and backtest engine for rule-based trading.
//!
//! Hexagonal layout: computation in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`bridge`] and [`ffi`] expose
//! strategy handles to a host process.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod bridge;
pub mod ffi;
pub mod cli;
