//! Regime-conditioned routing of bars to rules.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::rules::{MeanReversion, TrendFollowing};
use crate::components::rule::{RegimeRule, RuleInput};
use crate::domain::Signal;

/// What bars without a matching rule receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnroutedPolicy {
    /// No tradable signal.
    #[default]
    Flat,
    /// Carry the spread band signal through.
    SpreadFallback,
}

pub struct StrategyRouter {
    rules: BTreeMap<usize, Box<dyn RegimeRule>>,
    policy: UnroutedPolicy,
}

impl fmt::Debug for StrategyRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: BTreeMap<usize, &str> = self.rules.iter().map(|(k, r)| (*k, r.name())).collect();
        f.debug_struct("StrategyRouter")
            .field("rules", &rules)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for StrategyRouter {
    fn default() -> Self {
        Self::new(UnroutedPolicy::default())
    }
}

impl StrategyRouter {
    /// Regime 0 mean-reverts, regime 1 follows the trend.
    pub fn new(policy: UnroutedPolicy) -> Self {
        Self::empty(policy)
            .with_rule(0, Box::new(MeanReversion))
            .with_rule(1, Box::new(TrendFollowing))
    }

    pub fn empty(policy: UnroutedPolicy) -> Self {
        Self {
            rules: BTreeMap::new(),
            policy,
        }
    }

    pub fn with_rule(mut self, regime: usize, rule: Box<dyn RegimeRule>) -> Self {
        self.rules.insert(regime, rule);
        self
    }

    pub fn policy(&self) -> UnroutedPolicy {
        self.policy
    }

    /// Bar indices per regime, ascending within each regime.
    pub fn partition(regimes: &[Option<usize>]) -> BTreeMap<usize, Vec<usize>> {
        let mut parts: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, regime) in regimes.iter().enumerate() {
            if let Some(r) = regime {
                parts.entry(*r).or_default().push(i);
            }
        }
        parts
    }

    /// One entry per bar. `None` means the bar has no tradable signal.
    pub fn route(
        &self,
        inputs: &[RuleInput],
        regimes: &[Option<usize>],
        spread_signals: &[Signal],
    ) -> Vec<Option<Signal>> {
        let fallback = |i: usize| match self.policy {
            UnroutedPolicy::Flat => None,
            UnroutedPolicy::SpreadFallback => spread_signals.get(i).copied(),
        };

        let mut routed: Vec<Option<Signal>> = (0..inputs.len()).map(fallback).collect();
        for (regime, indices) in Self::partition(regimes) {
            let Some(rule) = self.rules.get(&regime) else {
                continue;
            };
            for i in indices {
                if let Some(input) = inputs.get(i) {
                    routed[i] = Some(rule.evaluate(input));
                }
            }
            tracing::trace!(regime, rule = rule.name(), "routed partition");
        }
        routed
    }
}
