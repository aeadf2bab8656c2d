//! Configuration validation.
//!
//! Checks the `[backtest]` and `[strategy]` sections before anything runs.

use crate::domain::error::TradelabError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    validate_initial_balance(config)?;
    validate_commission(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    let kind = validate_kind(config)?;
    validate_params(config, kind)?;
    Ok(())
}

/// Parse a comma separated parameter list such as `14, 30, 70`. Blank input
/// is an empty list.
pub fn parse_params(raw: &str) -> Result<Vec<f64>, TradelabError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|_| TradelabError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "params".to_string(),
                reason: format!("'{}' is not a number", s),
            })
        })
        .collect()
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    let value = config.get_double("backtest", "initial_balance", 0.0);
    if value <= 0.0 {
        return Err(TradelabError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_balance".to_string(),
            reason: "initial_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    let value = config.get_double("backtest", "commission", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(TradelabError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission".to_string(),
            reason: "commission must be in [0, 1)".to_string(),
        });
    }
    Ok(())
}

fn validate_kind(config: &dyn ConfigPort) -> Result<StrategyKind, TradelabError> {
    match config.get_string("strategy", "kind") {
        Some(s) if !s.trim().is_empty() => s.parse(),
        _ => Err(TradelabError::ConfigMissing {
            section: "strategy".to_string(),
            key: "kind".to_string(),
        }),
    }
}

fn validate_params(config: &dyn ConfigPort, kind: StrategyKind) -> Result<(), TradelabError> {
    let Some(raw) = config.get_string("strategy", "params") else {
        return Ok(());
    };
    check_param_count(kind, &parse_params(&raw)?)
}

/// `params` must supply at least [`StrategyKind::required_params`] values.
pub fn check_param_count(kind: StrategyKind, params: &[f64]) -> Result<(), TradelabError> {
    if params.len() < kind.required_params() {
        return Err(TradelabError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "params".to_string(),
            reason: format!(
                "{} needs {} parameters, got {}",
                kind,
                kind.required_params(),
                params.len()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[backtest]
initial_balance = 10000
commission = 0.001

[strategy]
kind = rsi
params = 14, 30, 70
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn initial_balance_must_be_positive() {
        let config = make_config("[backtest]\ninitial_balance = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, TradelabError::ConfigInvalid { key, .. } if key == "initial_balance")
        );
    }

    #[test]
    fn missing_initial_balance_fails() {
        let config = make_config("[backtest]\ncommission = 0.001\n");
        assert!(validate_backtest_config(&config).is_err());
    }

    #[test]
    fn commission_bounds() {
        for bad in ["-0.01", "1", "1.5"] {
            let config = make_config(&format!(
                "[backtest]\ninitial_balance = 100\ncommission = {}\n",
                bad
            ));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, TradelabError::ConfigInvalid { ref key, .. } if key == "commission"),
                "commission {} should fail",
                bad
            );
        }
        let config = make_config("[backtest]\ninitial_balance = 100\ncommission = 0\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn missing_kind_fails() {
        let config = make_config("[strategy]\nparams = 14, 30, 70\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, TradelabError::ConfigMissing { key, .. } if key == "kind"));
    }

    #[test]
    fn unknown_kind_fails() {
        let config = make_config("[strategy]\nkind = ichimoku\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, TradelabError::UnknownStrategy { tag } if tag == "ichimoku"));
    }

    #[test]
    fn params_are_optional() {
        let config = make_config("[strategy]\nkind = macd\n");
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn too_few_params_fails() {
        let config = make_config("[strategy]\nkind = enhanced_rsi\nparams = 14, 20, 30\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, TradelabError::ConfigInvalid { key, .. } if key == "params"));
    }

    #[test]
    fn non_numeric_params_fail() {
        let config = make_config("[strategy]\nkind = rsi\nparams = 14, thirty, 70\n");
        assert!(validate_strategy_config(&config).is_err());
    }

    #[test]
    fn parse_params_trims_and_skips_blanks() {
        assert_eq!(parse_params(" 14 ,30,, 70 ").unwrap(), vec![14.0, 30.0, 70.0]);
        assert!(parse_params("").unwrap().is_empty());
    }
}
