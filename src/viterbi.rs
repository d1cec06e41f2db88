//! Viterbi decoding in negative-log-probability space.

use crate::error::*;
use crate::model::Model;
use crate::symbol::Symbol;

/// One cell of the Viterbi lattice: the cheapest cost of reaching a state at a time step, and the
/// state it was reached from (`None` at the first step).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct VIteration {
    pub(crate) cost: f64,
    pub(crate) prev: Option<usize>,
}

/// The most probable hidden-state path of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiPath {
    /// Decoded state per time step.
    pub states: Vec<usize>,
    /// Negative log-probability of the path; `+inf` if the path is impossible.
    pub cost: f64,
    /// `exp(-cost)`.
    pub probability: f64,
}

impl Model {
    /// Decode the single most probable state path for `sequence`.
    ///
    /// Costs are sums of `-ln` probabilities taken straight from the model, so a zero
    /// probability on every candidate path shows up as an infinite cost (and a path probability
    /// of zero) rather than an error. Ties pick the lowest state index. Silent steps add no
    /// emission cost.
    pub fn viterbi(&self, sequence: &[Symbol]) -> Result<ViterbiPath> {
        self.check_sequence(sequence)?;
        let n = self.n_states();

        let mut iterations: Vec<Vec<VIteration>> = Vec::with_capacity(sequence.len());
        iterations.push(
            (0..n)
                .map(|i| VIteration {
                    cost: -self.initial()[i].ln() + self.emission_cost(i, sequence[0]),
                    prev: None,
                })
                .collect(),
        );

        for &symbol in &sequence[1..] {
            let prev = &iterations[iterations.len() - 1];
            let next = (0..n)
                .map(|j| {
                    let (best_prev, best_cost) = (1..n).fold(
                        (0, prev[0].cost - self.transition(0, j).ln()),
                        |best, i| {
                            let cost = prev[i].cost - self.transition(i, j).ln();
                            if cost < best.1 { (i, cost) } else { best }
                        },
                    );
                    VIteration {
                        cost: best_cost + self.emission_cost(j, symbol),
                        prev: Some(best_prev),
                    }
                })
                .collect();
            iterations.push(next);
        }

        let last = &iterations[iterations.len() - 1];
        let (final_state, cost) = (1..n).fold((0, last[0].cost), |best, i| {
            if last[i].cost < best.1 { (i, last[i].cost) } else { best }
        });

        let mut states = vec![final_state; sequence.len()];
        for t in (0..sequence.len() - 1).rev() {
            // every step after the first records a predecessor
            states[t] = iterations[t + 1][states[t + 1]].prev.unwrap_or(0);
        }

        Ok(ViterbiPath { states, cost, probability: (-cost).exp() })
    }

    #[inline]
    fn emission_cost(&self, state: usize, symbol: Symbol) -> f64 {
        if symbol.is_silent() {
            0.0
        } else {
            -self.emission(state, symbol.p, symbol.q).ln()
        }
    }
}
