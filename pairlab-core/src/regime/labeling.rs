//! State labeling policy and per-state diagnostics.
//!
//! HMM state indices are arbitrary: a refit on shifted data can swap them.
//! `ByVolatility` pins label 0 to the calmest state of the traded leg.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeLabeling {
    /// Keep the indices the model converged to.
    #[default]
    AsFitted,
    /// Relabel by ascending volatility of leg-A returns.
    ByVolatility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDiagnostics {
    pub state: usize,
    pub count: usize,
    pub mean_return: f64,
    /// Sample standard deviation of returns; NaN with fewer than two returns.
    pub return_volatility: f64,
}

/// Summarize returns per decoded state. `states[r]` is the state of the bar
/// at `index[r]`.
pub fn state_diagnostics(
    states: &[usize],
    index: &[usize],
    returns: &[f64],
    n_states: usize,
) -> Vec<StateDiagnostics> {
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); n_states];
    let mut counts = vec![0usize; n_states];
    for (&state, &i) in states.iter().zip(index) {
        counts[state] += 1;
        if let Some(r) = returns.get(i).copied().filter(|r| r.is_finite()) {
            buckets[state].push(r);
        }
    }

    buckets
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(state, (rets, count))| {
            let n = rets.len() as f64;
            let mean_return = if rets.is_empty() {
                f64::NAN
            } else {
                rets.iter().sum::<f64>() / n
            };
            let return_volatility = if rets.len() < 2 {
                f64::NAN
            } else {
                (rets.iter().map(|r| (r - mean_return).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
            };
            StateDiagnostics {
                state,
                count,
                mean_return,
                return_volatility,
            }
        })
        .collect()
}

/// Old state indices sorted by ascending volatility. Undefined volatility
/// sorts last; ties keep the fitted order.
pub fn volatility_order(diagnostics: &[StateDiagnostics]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..diagnostics.len()).collect();
    order.sort_by(|&a, &b| {
        let va = diagnostics[a].return_volatility;
        let vb = diagnostics[b].return_volatility;
        match (va.is_nan(), vb.is_nan()) {
            (true, true) => a.cmp(&b),
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => va.total_cmp(&vb).then(a.cmp(&b)),
        }
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_bucket_by_state() {
        let returns = [f64::NAN, 0.01, -0.01, 0.2, -0.2, 0.0];
        let states = [0, 0, 1, 1, 0];
        let index = [1, 2, 3, 4, 5];
        let diag = state_diagnostics(&states, &index, &returns, 2);
        assert_eq!(diag[0].count, 3);
        assert_eq!(diag[1].count, 2);
        assert!((diag[1].mean_return).abs() < 1e-12);
        assert!(diag[1].return_volatility > diag[0].return_volatility);
    }

    #[test]
    fn order_puts_calm_first_and_nan_last() {
        let mk = |state, vol| StateDiagnostics {
            state,
            count: 1,
            mean_return: 0.0,
            return_volatility: vol,
        };
        let diag = vec![mk(0, 0.3), mk(1, f64::NAN), mk(2, 0.1)];
        assert_eq!(volatility_order(&diag), vec![2, 0, 1]);
    }
}
