//! Gaussian hidden Markov model with diagonal covariances.
//!
//! The model is a plain value: `fit` returns a new one, `decode` and `score`
//! only read it. Observations are an `n x d` matrix, one row per bar. All
//! recursions run in log space.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::kmeans::kmeans;
use super::RegimeError;

const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// States with less posterior mass than this keep their previous parameters.
const MIN_STATE_WEIGHT: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmConfig {
    pub n_states: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub min_covar: f64,
}

impl Default for HmmConfig {
    fn default() -> Self {
        Self {
            n_states: 3,
            max_iter: 1000,
            tol: 1e-2,
            min_covar: 1e-3,
        }
    }
}

/// Start probabilities, a row-stochastic `k x k` transition matrix, and
/// per-state means and variances stored as `k x d` matrices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianHmm {
    pub n_states: usize,
    pub start_probs: Array1<f64>,
    pub transitions: Array2<f64>,
    pub means: Array2<f64>,
    pub variances: Array2<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HmmFit {
    pub model: GaussianHmm,
    pub converged: bool,
    pub iterations: usize,
    pub log_likelihood: f64,
}

fn log_sum_exp(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + values.map(|v| (v - max).exp()).sum::<f64>().ln()
}

struct Posteriors {
    gamma: Array2<f64>,
    xi_sum: Array2<f64>,
    log_likelihood: f64,
}

impl GaussianHmm {
    pub fn n_features(&self) -> usize {
        self.means.ncols()
    }

    fn log_emission(&self, state: usize, x: ArrayView1<'_, f64>) -> f64 {
        let mut acc = 0.0;
        for ((v, m), s2) in x
            .iter()
            .zip(self.means.row(state))
            .zip(self.variances.row(state))
        {
            acc += LN_2PI + s2.ln() + (v - m).powi(2) / s2;
        }
        -0.5 * acc
    }

    fn log_emissions(&self, obs: &Array2<f64>) -> Array2<f64> {
        Array2::from_shape_fn((obs.nrows(), self.n_states), |(t, k)| {
            self.log_emission(k, obs.row(t))
        })
    }

    fn log_transitions(&self) -> Array2<f64> {
        self.transitions.mapv(f64::ln)
    }

    fn forward(&self, log_b: &Array2<f64>, log_a: &Array2<f64>) -> Array2<f64> {
        let (n, k) = log_b.dim();
        let mut alpha = Array2::from_elem((n, k), f64::NEG_INFINITY);
        if n == 0 {
            return alpha;
        }
        for j in 0..k {
            alpha[[0, j]] = self.start_probs[j].ln() + log_b[[0, j]];
        }
        for t in 1..n {
            for j in 0..k {
                let value = log_sum_exp((0..k).map(|i| alpha[[t - 1, i]] + log_a[[i, j]]));
                alpha[[t, j]] = value + log_b[[t, j]];
            }
        }
        alpha
    }

    fn backward(&self, log_b: &Array2<f64>, log_a: &Array2<f64>) -> Array2<f64> {
        let (n, k) = log_b.dim();
        let mut beta = Array2::zeros((n, k));
        for t in (0..n.saturating_sub(1)).rev() {
            for i in 0..k {
                let value = log_sum_exp(
                    (0..k).map(|j| log_a[[i, j]] + log_b[[t + 1, j]] + beta[[t + 1, j]]),
                );
                beta[[t, i]] = value;
            }
        }
        beta
    }

    /// Log-likelihood of `obs` under the model.
    pub fn score(&self, obs: &Array2<f64>) -> f64 {
        let n = obs.nrows();
        if n == 0 {
            return 0.0;
        }
        let alpha = self.forward(&self.log_emissions(obs), &self.log_transitions());
        log_sum_exp(alpha.row(n - 1).iter().copied())
    }

    /// Most likely state path (Viterbi). Ties go to the lower state index.
    pub fn decode(&self, obs: &Array2<f64>) -> Vec<usize> {
        let n = obs.nrows();
        let k = self.n_states;
        if n == 0 {
            return Vec::new();
        }
        let log_b = self.log_emissions(obs);
        let log_a = self.log_transitions();

        let mut delta: Array1<f64> = (0..k)
            .map(|j| self.start_probs[j].ln() + log_b[[0, j]])
            .collect();
        let mut psi = Array2::<usize>::zeros((n, k));

        for t in 1..n {
            let mut next = Array1::from_elem(k, f64::NEG_INFINITY);
            for j in 0..k {
                let mut best = 0;
                let mut best_val = f64::NEG_INFINITY;
                for i in 0..k {
                    let val = delta[i] + log_a[[i, j]];
                    if val > best_val {
                        best_val = val;
                        best = i;
                    }
                }
                next[j] = best_val + log_b[[t, j]];
                psi[[t, j]] = best;
            }
            delta = next;
        }

        let mut last = 0;
        for j in 1..k {
            if delta[j] > delta[last] {
                last = j;
            }
        }

        let mut path = vec![0; n];
        path[n - 1] = last;
        for t in (0..n - 1).rev() {
            path[t] = psi[[t + 1, path[t + 1]]];
        }
        path
    }

    /// Relabel states so that new state `i` is old state `order[i]`.
    pub fn permuted(&self, order: &[usize]) -> Self {
        let k = order.len();
        Self {
            n_states: self.n_states,
            start_probs: order.iter().map(|&o| self.start_probs[o]).collect(),
            transitions: Array2::from_shape_fn((k, k), |(i, j)| {
                self.transitions[[order[i], order[j]]]
            }),
            means: self.means.select(Axis(0), order),
            variances: self.variances.select(Axis(0), order),
        }
    }

    fn posteriors(&self, obs: &Array2<f64>) -> Posteriors {
        let (n, k) = (obs.nrows(), self.n_states);
        let log_b = self.log_emissions(obs);
        let log_a = self.log_transitions();
        let alpha = self.forward(&log_b, &log_a);
        let beta = self.backward(&log_b, &log_a);
        let ll = log_sum_exp(alpha.row(n - 1).iter().copied());

        let gamma = (&alpha + &beta).mapv(|v| (v - ll).exp());

        let mut xi_sum = Array2::zeros((k, k));
        for t in 0..n - 1 {
            for i in 0..k {
                for j in 0..k {
                    xi_sum[[i, j]] += (alpha[[t, i]] + log_a[[i, j]] + log_b[[t + 1, j]]
                        + beta[[t + 1, j]]
                        - ll)
                        .exp();
                }
            }
        }

        Posteriors {
            gamma,
            xi_sum,
            log_likelihood: ll,
        }
    }

    fn m_step(&mut self, obs: &Array2<f64>, post: &Posteriors, min_covar: f64) {
        let first = post.gamma.row(0);
        let start_total = first.sum();
        if start_total > 0.0 {
            self.start_probs = &first / start_total;
        }

        for (i, row) in post.xi_sum.outer_iter().enumerate() {
            let row_total = row.sum();
            if row_total > MIN_STATE_WEIGHT {
                self.transitions.row_mut(i).assign(&(&row / row_total));
            }
        }

        let weights = post.gamma.sum_axis(Axis(0));
        for (s, &weight) in weights.iter().enumerate() {
            if weight <= MIN_STATE_WEIGHT {
                continue;
            }
            let g = post.gamma.column(s);
            let mean = g.dot(obs) / weight;
            let sq_dev = (obs - &mean).mapv(|v| v * v);
            let var = (g.dot(&sq_dev) / weight).mapv(|v| v.max(min_covar));
            self.means.row_mut(s).assign(&mean);
            self.variances.row_mut(s).assign(&var);
        }
    }

    fn initial(obs: &Array2<f64>, config: &HmmConfig, rng: &mut StdRng) -> Self {
        let k = config.n_states;
        let floor = obs.var_axis(Axis(0), 0.0).mapv(|v| v + config.min_covar);
        let mut variances = Array2::zeros((k, obs.ncols()));
        for mut row in variances.outer_iter_mut() {
            row.assign(&floor);
        }

        Self {
            n_states: k,
            start_probs: Array1::from_elem(k, 1.0 / k as f64),
            transitions: Array2::from_elem((k, k), 1.0 / k as f64),
            means: kmeans(obs.view(), k, 300, rng),
            variances,
        }
    }

    /// Baum-Welch EM starting from k-means means and uniform probabilities.
    ///
    /// A non-finite log-likelihood ends EM early with the last finite model
    /// and `converged = false`. It is an error only for the initial model,
    /// which has no finite predecessor to fall back to.
    pub fn fit(
        obs: &Array2<f64>,
        config: &HmmConfig,
        rng: &mut StdRng,
    ) -> Result<HmmFit, RegimeError> {
        if obs.ncols() == 0 {
            return Err(RegimeError::NoFeatures);
        }
        if obs.nrows() < config.n_states || config.n_states == 0 {
            return Err(RegimeError::InsufficientData {
                rows: obs.nrows(),
                states: config.n_states,
            });
        }

        let mut model = Self::initial(obs, config, rng);
        let mut last_finite: Option<(Self, f64)> = None;
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..config.max_iter {
            let post = model.posteriors(obs);
            let ll = post.log_likelihood;
            if !ll.is_finite() {
                let (previous, _) = last_finite
                    .take()
                    .ok_or(RegimeError::NonFiniteLikelihood { iteration: iter })?;
                tracing::warn!(
                    iteration = iter,
                    "log-likelihood became non-finite, keeping previous model"
                );
                model = previous;
                break;
            }
            iterations = iter + 1;
            if let Some((_, prev_ll)) = &last_finite {
                if ll - prev_ll < config.tol {
                    converged = true;
                    break;
                }
            }
            last_finite = Some((model.clone(), ll));
            model.m_step(obs, &post, config.min_covar);
        }

        let log_likelihood = model.score(obs);
        if converged {
            tracing::info!(iterations, log_likelihood, "hmm converged");
        } else {
            tracing::warn!(
                iterations,
                log_likelihood,
                tol = config.tol,
                "hmm did not converge within max_iter"
            );
        }

        Ok(HmmFit {
            model,
            converged,
            iterations,
            log_likelihood,
        })
    }
}
