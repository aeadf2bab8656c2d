//! Backtest engine.
//!
//! Runs the attached strategy once over the whole candle sequence, then folds
//! the trades into balance, drawdown, win counter and Sharpe ratio.
//!
//! - Buy: balance -= price × amount × (1 + commission)
//! - Sell: balance += price × amount × (1 − commission); the peak balance only
//!   moves on Sell steps
//! - A step counts as a win when the balance afterwards exceeds the initial
//!   balance.

use tracing::info;

use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;
use crate::domain::metrics::{drawdown, sharpe_ratio, win_rate};
use crate::domain::strategy::Strategy;
use crate::domain::trade::{Side, Trade};

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_COMMISSION: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    /// Fraction of notional charged per trade.
    pub commission: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            commission: DEFAULT_COMMISSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub final_balance: f64,
    pub trades: Vec<Trade>,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub win_rate: f64,
    pub wins: usize,
}

pub struct Backtester {
    config: BacktestConfig,
    strategy: Option<Box<dyn Strategy>>,
}

impl Backtester {
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            strategy: None,
        }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategy = Some(strategy);
    }

    pub fn strategy(&self) -> Option<&dyn Strategy> {
        self.strategy.as_deref()
    }

    pub fn run(&mut self, candles: &[Candle]) -> Result<BacktestResult, TradelabError> {
        let strategy = self.strategy.as_mut().ok_or(TradelabError::NoStrategy)?;
        let trades = strategy.analyze(candles);
        let result = evaluate_trades(trades, &self.config);

        info!(
            strategy = strategy.name(),
            candles = candles.len(),
            trades = result.trades.len(),
            final_balance = result.final_balance,
            max_drawdown = result.max_drawdown,
            sharpe = result.sharpe_ratio,
            "backtest complete"
        );

        Ok(result)
    }
}

impl Default for Backtester {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}

/// Fold an ordered trade sequence into a [`BacktestResult`].
pub fn evaluate_trades(trades: Vec<Trade>, config: &BacktestConfig) -> BacktestResult {
    let initial = config.initial_balance;
    let commission = config.commission;

    let mut balance = initial;
    let mut peak = initial;
    let mut max_drawdown = 0.0_f64;
    let mut wins = 0usize;

    for trade in &trades {
        let notional = trade.notional();
        match trade.side {
            Side::Buy => balance -= notional * (1.0 + commission),
            Side::Sell => {
                balance += notional * (1.0 - commission);
                if balance > peak {
                    peak = balance;
                }
            }
        }

        max_drawdown = max_drawdown.max(drawdown(peak, balance));

        if balance > initial {
            wins += 1;
        }
    }

    BacktestResult {
        final_balance: balance,
        max_drawdown,
        sharpe_ratio: sharpe_ratio(&trades, commission),
        win_rate: win_rate(wins, trades.len()),
        wins,
        trades,
    }
}
