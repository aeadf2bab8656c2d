//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::bridge::{SignalSide, StrategyHandle};
use crate::domain::backtest::{
    BacktestConfig, BacktestResult, Backtester, DEFAULT_COMMISSION, DEFAULT_INITIAL_BALANCE,
};
use crate::domain::candle::Candle;
use crate::domain::config_validation::{
    check_param_count, parse_params, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::TradelabError;
use crate::domain::monte_carlo::{
    simulate, validate_monte_carlo_config, Distribution, MonteCarloConfig, MonteCarloReport,
    DEFAULT_CONFIDENCE, DEFAULT_SIMULATIONS,
};
use crate::domain::strategy::{create_strategy, Strategy, StrategyKind};
use crate::domain::sweep::{parameter_grid, run_sweep, ParameterRange, SweepOutcome};
use crate::domain::walk_forward::{
    walk_forward, WalkForwardConfig, WalkForwardReport, DEFAULT_TRAIN_RATIO, DEFAULT_WINDOW,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "tradelab", about = "Indicator strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a CSV candle file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Candle file, overrides [data] path
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Strategy kind, overrides [strategy] kind
        #[arg(short, long)]
        strategy: Option<String>,
        /// Comma separated parameters, overrides [strategy] params
        #[arg(short, long)]
        params: Option<String>,
    },
    /// Print the latest signal for a price list
    Signal {
        #[arg(short, long)]
        strategy: String,
        #[arg(short, long)]
        params: Option<String>,
        /// Comma separated closing prices, oldest first
        #[arg(long, allow_hyphen_values = true)]
        prices: String,
    },
    /// Backtest every point of a parameter grid
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// One per parameter, in order: `min:max:step` or a fixed value
        #[arg(short, long = "range", required = true)]
        ranges: Vec<String>,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Backtest once, then resample the trade order for confidence intervals
    MonteCarlo {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long)]
        params: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
        simulations: usize,
        /// Interval width, between 0 and 1
        #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
        confidence: f64,
        /// Fixed seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Sweep in-sample windows and score the winners out of sample
    WalkForward {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// One per parameter, in order: `min:max:step` or a fixed value
        #[arg(short, long = "range", required = true)]
        ranges: Vec<String>,
        /// Candles per window
        #[arg(long, default_value_t = DEFAULT_WINDOW)]
        window: usize,
        /// In-sample share of each window
        #[arg(long, default_value_t = DEFAULT_TRAIN_RATIO)]
        train_ratio: f64,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            params,
        } => run_backtest(
            &config,
            data.as_deref(),
            strategy.as_deref(),
            params.as_deref(),
        ),
        Command::Signal {
            strategy,
            params,
            prices,
        } => run_signal(&strategy, params.as_deref(), &prices),
        Command::Sweep {
            config,
            data,
            ranges,
            top,
        } => run_sweep_command(&config, data.as_deref(), &ranges, top),
        Command::MonteCarlo {
            config,
            data,
            strategy,
            params,
            simulations,
            confidence,
            seed,
        } => run_monte_carlo(
            &config,
            data.as_deref(),
            strategy.as_deref(),
            params.as_deref(),
            &MonteCarloConfig {
                simulations,
                confidence_level: confidence,
                seed,
            },
        ),
        Command::WalkForward {
            config,
            data,
            ranges,
            window,
            train_ratio,
        } => run_walk_forward(
            &config,
            data.as_deref(),
            &ranges,
            &WalkForwardConfig {
                window,
                train_ratio,
            },
        ),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradelabError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// `[backtest]` values, falling back to the engine defaults.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_balance: adapter.get_double(
            "backtest",
            "initial_balance",
            DEFAULT_INITIAL_BALANCE,
        ),
        commission: adapter.get_double("backtest", "commission", DEFAULT_COMMISSION),
    }
}

/// Strategy kind and parameters: command line first, then `[strategy]`.
/// No parameters at all means the strategy defaults.
pub fn resolve_strategy(
    adapter: Option<&dyn ConfigPort>,
    kind_override: Option<&str>,
    params_override: Option<&str>,
) -> Result<(StrategyKind, Vec<f64>), TradelabError> {
    let kind: StrategyKind = match kind_override {
        Some(tag) => tag.parse()?,
        None => adapter
            .and_then(|a| a.get_string("strategy", "kind"))
            .ok_or_else(|| TradelabError::ConfigMissing {
                section: "strategy".into(),
                key: "kind".into(),
            })?
            .parse()?,
    };

    let raw = params_override
        .map(str::to_string)
        .or_else(|| adapter.and_then(|a| a.get_string("strategy", "params")));
    let params = match raw {
        Some(raw) => parse_params(&raw)?,
        None => Vec::new(),
    };
    if !params.is_empty() {
        check_param_count(kind, &params)?;
    }

    Ok((kind, params))
}

pub fn resolve_data_path(
    data_override: Option<&Path>,
    adapter: &dyn ConfigPort,
) -> Result<PathBuf, TradelabError> {
    match data_override {
        Some(path) => Ok(path.to_path_buf()),
        None => adapter
            .get_string("data", "path")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| TradelabError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            }),
    }
}

/// Fetch candles and require at least `minimum` of them.
pub fn load_candles(
    data_port: &dyn DataPort,
    path: &Path,
    minimum: usize,
) -> Result<Vec<Candle>, TradelabError> {
    eprintln!("Loading candles from {}", path.display());
    let candles = data_port.fetch_candles(path)?;
    if candles.len() < minimum {
        return Err(TradelabError::InsufficientData {
            candles: candles.len(),
            minimum,
        });
    }
    Ok(candles)
}

/// Backtest settings, strategy and candles for a single-strategy run.
fn prepare_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    kind_override: Option<&str>,
    params_override: Option<&str>,
) -> Result<(BacktestConfig, Box<dyn Strategy>, Vec<Candle>), TradelabError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    if kind_override.is_none() {
        validate_strategy_config(&adapter)?;
    }

    let (kind, params) = resolve_strategy(
        Some(&adapter as &dyn ConfigPort),
        kind_override,
        params_override,
    )?;
    let strategy = create_strategy(kind, &params);
    eprintln!("Strategy: {} {:?}", strategy.name(), strategy.parameters());

    let data_path = resolve_data_path(data_override, &adapter)?;
    let candles = load_candles(&CsvAdapter::new(), &data_path, strategy.min_candles())?;

    Ok((build_backtest_config(&adapter), strategy, candles))
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    kind_override: Option<&str>,
    params_override: Option<&str>,
) -> Result<(), TradelabError> {
    let (config, strategy, candles) =
        prepare_backtest(config_path, data_override, kind_override, params_override)?;

    let mut backtester = Backtester::new(config);
    backtester.set_strategy(strategy);
    let result = backtester.run(&candles)?;

    print_backtest_result(backtester.config(), &result);
    Ok(())
}

pub fn print_backtest_result(config: &BacktestConfig, result: &BacktestResult) {
    let total_return = (result.final_balance - config.initial_balance) / config.initial_balance;

    println!("=== Backtest Results ===");
    println!("Initial Balance:  {:.2}", config.initial_balance);
    println!("Final Balance:    {:.2}", result.final_balance);
    println!("Total Return:     {:.2}%", total_return * 100.0);
    println!("Max Drawdown:     {:.2}%", result.max_drawdown * 100.0);
    println!("Sharpe Ratio:     {:.4}", result.sharpe_ratio);
    println!("Win Rate:         {:.1}%", result.win_rate * 100.0);
    println!("Total Trades:     {}", result.trades.len());

    if !result.trades.is_empty() {
        println!("\n=== Trades ===");
        for trade in &result.trades {
            println!(
                "  {}  {:<4} {:>12.4} x {}  ({})",
                trade.timestamp.to_rfc3339(),
                trade.side,
                trade.price,
                trade.amount,
                trade.reason
            );
        }
    }
}

fn run_signal(kind: &str, params: Option<&str>, prices: &str) -> Result<(), TradelabError> {
    let (kind, params) = resolve_strategy(None, Some(kind), params)?;
    let prices = parse_prices(prices)?;

    let mut handle = StrategyHandle::new(kind, &params);
    match handle.analyze_prices(&prices, Utc::now()) {
        Some(signal) => {
            let side = match signal.side {
                SignalSide::Buy => "BUY",
                SignalSide::Sell => "SELL",
            };
            println!(
                "{} {} @ {} (t={})",
                side, signal.amount, signal.price, signal.timestamp
            );
        }
        None => println!("no signal"),
    }
    Ok(())
}

pub fn parse_prices(raw: &str) -> Result<Vec<f64>, TradelabError> {
    parse_params(raw).map_err(|e| match e {
        TradelabError::ConfigInvalid { reason, .. } => TradelabError::Data { reason },
        other => other,
    })
}

/// Strategy kind from `[strategy]` and the grid spanned by `ranges`, one
/// range per strategy parameter.
fn prepare_grid(
    adapter: &FileConfigAdapter,
    ranges: &[String],
) -> Result<(StrategyKind, Vec<Vec<f64>>), TradelabError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)?;

    let (kind, _) = resolve_strategy(Some(adapter as &dyn ConfigPort), None, None)?;
    let ranges = ranges
        .iter()
        .map(|r| r.parse::<ParameterRange>())
        .collect::<Result<Vec<_>, _>>()?;
    if ranges.len() < kind.required_params() {
        return Err(TradelabError::ConfigInvalid {
            section: "sweep".into(),
            key: "range".into(),
            reason: format!(
                "{} needs {} ranges, got {}",
                kind,
                kind.required_params(),
                ranges.len()
            ),
        });
    }

    Ok((kind, parameter_grid(&ranges)?))
}

fn run_sweep_command(
    config_path: &Path,
    data_override: Option<&Path>,
    ranges: &[String],
    top: usize,
) -> Result<(), TradelabError> {
    let adapter = load_config(config_path)?;
    let (kind, grid) = prepare_grid(&adapter, ranges)?;
    // the shortest warm-up in the grid decides whether any point can trade
    let minimum = grid
        .iter()
        .map(|params| create_strategy(kind, params).min_candles())
        .min()
        .unwrap_or(0);

    let data_path = resolve_data_path(data_override, &adapter)?;
    let candles = load_candles(&CsvAdapter::new(), &data_path, minimum)?;

    eprintln!("Sweeping {} over {} parameter sets", kind, grid.len());
    let config = build_backtest_config(&adapter);
    let outcomes = run_sweep(kind, &grid, &candles, &config)?;
    print_sweep_outcomes(&outcomes, top);
    Ok(())
}

pub fn print_sweep_outcomes(outcomes: &[SweepOutcome], top: usize) {
    println!("=== Sweep Results (top {} of {}) ===", top.min(outcomes.len()), outcomes.len());
    for (rank, outcome) in outcomes.iter().take(top).enumerate() {
        let params: Vec<String> = outcome.params.iter().map(|p| p.to_string()).collect();
        println!(
            "{:>3}. [{}]  balance {:.2}  sharpe {:.4}  drawdown {:.2}%  trades {}",
            rank + 1,
            params.join(", "),
            outcome.result.final_balance,
            outcome.result.sharpe_ratio,
            outcome.result.max_drawdown * 100.0,
            outcome.result.trades.len()
        );
    }
}

fn run_monte_carlo(
    config_path: &Path,
    data_override: Option<&Path>,
    kind_override: Option<&str>,
    params_override: Option<&str>,
    monte_carlo: &MonteCarloConfig,
) -> Result<(), TradelabError> {
    validate_monte_carlo_config(monte_carlo)?;
    let (config, strategy, candles) =
        prepare_backtest(config_path, data_override, kind_override, params_override)?;

    let mut backtester = Backtester::new(config);
    backtester.set_strategy(strategy);
    let result = backtester.run(&candles)?;
    print_backtest_result(backtester.config(), &result);

    eprintln!(
        "Resampling {} trades {} times",
        result.trades.len(),
        monte_carlo.simulations
    );
    let report = simulate(&result.trades, backtester.config(), monte_carlo)?;
    print_monte_carlo_report(&report, monte_carlo);
    Ok(())
}

pub fn print_monte_carlo_report(report: &MonteCarloReport, config: &MonteCarloConfig) {
    let row = |label: &str, dist: &Distribution, scale: f64, unit: &str| {
        println!(
            "{:<17}{:.4}{unit} .. {:.4}{unit}",
            label,
            dist.interval.lower * scale,
            dist.interval.upper * scale
        );
    };

    println!(
        "\n=== Monte Carlo ({} orderings, {}% interval, seed {}) ===",
        config.simulations,
        config.confidence_level * 100.0,
        report.seed
    );
    row("Final Balance:", &report.final_balance, 1.0, "");
    row("Max Drawdown:", &report.max_drawdown, 100.0, "%");
    row("Sharpe Ratio:", &report.sharpe_ratio, 1.0, "");
    row("Win Rate:", &report.win_rate, 100.0, "%");
}

fn run_walk_forward(
    config_path: &Path,
    data_override: Option<&Path>,
    ranges: &[String],
    walk: &WalkForwardConfig,
) -> Result<(), TradelabError> {
    walk.split()?;
    let adapter = load_config(config_path)?;
    let (kind, grid) = prepare_grid(&adapter, ranges)?;

    let data_path = resolve_data_path(data_override, &adapter)?;
    let candles = load_candles(&CsvAdapter::new(), &data_path, walk.window)?;

    eprintln!(
        "Walking {} forward over {} candles, {} parameter sets per window",
        kind,
        candles.len(),
        grid.len()
    );
    let config = build_backtest_config(&adapter);
    let report = walk_forward(kind, &grid, &candles, &config, walk)?;
    print_walk_forward_report(&config, &report);
    Ok(())
}

pub fn print_walk_forward_report(config: &BacktestConfig, report: &WalkForwardReport) {
    println!("=== Walk-Forward ({} windows) ===", report.windows.len());
    for (n, window) in report.windows.iter().enumerate() {
        let params: Vec<String> = window.params.iter().map(|p| p.to_string()).collect();
        println!(
            "{:>3}. in {:?}  out {:?}  [{}]  in-sample {:.2}  out-of-sample {:.2}  trades {}",
            n + 1,
            window.in_sample,
            window.out_of_sample,
            params.join(", "),
            window.in_sample_result.final_balance,
            window.out_of_sample_result.final_balance,
            window.out_of_sample_result.trades.len()
        );
    }

    println!();
    print_backtest_result(config, &report.aggregate);
}

fn run_validate(config_path: &Path) -> Result<(), TradelabError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    validate_strategy_config(&adapter)?;

    let config = build_backtest_config(&adapter);
    let (kind, params) = resolve_strategy(Some(&adapter as &dyn ConfigPort), None, None)?;
    let strategy = create_strategy(kind, &params);

    eprintln!("\nBacktest:");
    eprintln!("  initial_balance: {}", config.initial_balance);
    eprintln!("  commission:      {}", config.commission);
    eprintln!("\nStrategy:");
    eprintln!("  kind:        {}", kind);
    eprintln!("  parameters:  {:?}", strategy.parameters());
    eprintln!("  min candles: {}", strategy.min_candles());
    if let Some(path) = adapter.get_string("data", "path") {
        eprintln!("\nData:\n  path: {}", path);
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}
