//! String-keyed strategy parameters as stored in `crypto_strategy_parameters`

use crate::error::BacktestError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(BTreeMap<String, String>);

impl StrategyParams {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Entries from `overrides` replace ours.
    pub fn merged(&self, overrides: &StrategyParams) -> StrategyParams {
        let mut values = self.0.clone();
        values.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        StrategyParams(values)
    }

    pub fn get<T: FromStr>(&self, name: &str, default: T) -> Result<T> {
        match self.0.get(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| BacktestError::invalid(name, format!("cannot parse {:?}", raw))),
            None => Ok(default),
        }
    }

    pub fn positive_usize(&self, name: &str, default: usize) -> Result<usize> {
        let value = self.get(name, default)?;
        if value == 0 {
            return Err(BacktestError::invalid(name, "must be greater than zero"));
        }
        Ok(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, String>> for StrategyParams {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters() {
        let mut params = StrategyParams::default();
        params.set("fast", "10");
        params.set("oversold", " 25.5 ");
        assert_eq!(params.get("fast", 5usize).unwrap(), 10);
        assert_eq!(params.get("oversold", 30.0f64).unwrap(), 25.5);
        assert_eq!(params.get("slow", 30usize).unwrap(), 30);
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut params = StrategyParams::default();
        params.set("fast", "ten");
        params.set("slow", "0");
        assert!(matches!(params.get("fast", 5usize), Err(BacktestError::InvalidParameter { .. })));
        assert!(params.positive_usize("slow", 30).is_err());
    }

    #[test]
    fn overrides_win() {
        let mut stored = StrategyParams::default();
        stored.set("fast", "10");
        stored.set("slow", "30");
        let mut request = StrategyParams::default();
        request.set("fast", "5");
        let merged = stored.merged(&request);
        assert_eq!(merged.get("fast", 0usize).unwrap(), 5);
        assert_eq!(merged.get("slow", 0usize).unwrap(), 30);
    }
}
