//! Backward recurrence, scaled with the forward coefficients.

use crate::error::*;
use crate::forward::check_scaling;
use crate::model::Model;
use crate::symbol::Symbol;

impl Model {
    /// Run the backward algorithm over `sequence`.
    ///
    /// `scaling` must be the coefficients [`Model::forward`] produced for this same sequence;
    /// the backward values are divided by them so that `forward[t][i] * backward[t][i]` stays
    /// comparable across time steps. A zero coefficient is skipped rather than divided by.
    pub fn backward(&self, sequence: &[Symbol], scaling: &[f64]) -> Result<Vec<Vec<f64>>> {
        self.check_sequence(sequence)?;
        check_scaling(sequence, scaling)?;
        Ok(self.backward_unchecked(sequence, scaling))
    }

    pub(crate) fn backward_unchecked(&self, sequence: &[Symbol], scaling: &[f64]) -> Vec<Vec<f64>> {
        let n = self.n_states();
        let last = sequence.len() - 1;
        let mut bwd = vec![vec![0.0; n]; sequence.len()];

        bwd[last].fill(unscale(1.0, scaling[last]));

        for t in (0..last).rev() {
            let next_symbol = sequence[t + 1];
            let (head, tail) = bwd.split_at_mut(t + 1);
            let next = &tail[0];
            for (i, value) in head[t].iter_mut().enumerate() {
                let sum: f64 = (0..n)
                    .map(|j| self.transition(i, j) * self.emission_factor(j, next_symbol) * next[j])
                    .sum();
                *value = unscale(sum, scaling[t]);
            }
        }
        bwd
    }
}

#[inline]
fn unscale(value: f64, coefficient: f64) -> f64 {
    if coefficient != 0.0 {
        value / coefficient
    } else {
        value
    }
}
