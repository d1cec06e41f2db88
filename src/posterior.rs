//! State and transition posteriors for a single sequence.

use crate::error::*;
use crate::model::Model;
use crate::symbol::Symbol;

/// Posterior quantities of one observation sequence under a model.
#[derive(Debug, Clone)]
pub struct Posterior {
    /// `gamma[t][k]`: probability of being in state `k` at step `t`, given the whole sequence.
    pub gamma: Vec<Vec<f64>>,
    /// `epsilon[t][k * N + l]`: probability of moving from `k` at step `t` to `l` at step `t + 1`.
    /// Has `T - 1` rows.
    pub epsilon: Vec<Vec<f64>>,
    /// `sum(ln(scaling[t]))`.
    pub log_likelihood: f64,
}

impl Posterior {
    /// Per-step most probable state (posterior decoding). Ties go to the lowest index.
    pub fn most_likely_states(&self) -> Vec<usize> {
        self.gamma
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (k, &g)| if g > best.1 { (k, g) } else { best })
                    .0
            })
            .collect()
    }
}

impl Model {
    pub fn posterior(&self, sequence: &[Symbol]) -> Result<Posterior> {
        self.check_sequence(sequence)?;
        Ok(self.posterior_unchecked(sequence))
    }

    pub(crate) fn posterior_unchecked(&self, sequence: &[Symbol]) -> Posterior {
        let n = self.n_states();
        let mut scaling = vec![0.0; sequence.len()];
        let fwd = self.forward_unchecked(sequence, &mut scaling);
        let bwd = self.backward_unchecked(sequence, &scaling);

        let gamma = fwd
            .iter()
            .zip(&bwd)
            .map(|(f, b)| {
                let mut row: Vec<f64> = f.iter().zip(b).map(|(f, b)| f * b).collect();
                normalize(&mut row);
                row
            })
            .collect();

        let epsilon = sequence
            .windows(2)
            .enumerate()
            .map(|(t, pair)| {
                let next = pair[1];
                let mut step = vec![0.0; n * n];
                for k in 0..n {
                    for l in 0..n {
                        step[k * n + l] = fwd[t][k]
                            * self.transition(k, l)
                            * self.emission_factor(l, next)
                            * bwd[t + 1][l];
                    }
                }
                normalize(&mut step);
                step
            })
            .collect();

        Posterior {
            gamma,
            epsilon,
            log_likelihood: scaling.iter().map(|c| c.ln()).sum(),
        }
    }
}

/// Divide by the sum unless the sum is exactly zero.
fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum != 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    }
}
