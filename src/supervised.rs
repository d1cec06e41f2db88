//! Supervised learning by frequency counting.
//!
//! Here the hidden state is known: the time index of a step *is* its state, and the step's symbol
//! reads as a `(position, length)` label. No EM is needed, only counting and normalization.

use tracing::trace;

use crate::error::*;
use crate::model::Model;
use crate::symbol::Symbol;

impl Model {
    /// Re-estimate the model in place from sequences with known states.
    ///
    /// For every step `t` of every sequence: state `t` is counted as visited; a non-silent
    /// `(position, length)` label counts towards `Pi[t]`, `B[t][position][k]` for `k < length`
    /// and `B[t][k][length]` for `k < position - 1`; and `A[t][j]` is counted for the first
    /// later step `j` that is not silent. Each visited state then gets its counts divided by its
    /// visit count. States that were never visited keep their current parameters.
    pub fn learn(&mut self, corpus: &[Vec<Symbol>]) -> Result<()> {
        let n = self.n_states();
        let (m0, m1) = self.symbols();
        for (idx, sequence) in corpus.iter().enumerate() {
            self.check_sequence(sequence)?;
            if sequence.len() > n {
                return Err(HmmError::InvalidObservation(format!(
                    "sequence {} has {} steps but the model has only {} states",
                    idx,
                    sequence.len(),
                    n
                )));
            }
        }

        let mut visits = vec![0usize; n];
        let mut initial = vec![0.0; n];
        let mut transitions = vec![0.0; n * n];
        let mut emissions = vec![0.0; n * m0 * m1];
        for sequence in corpus {
            for (t, &symbol) in sequence.iter().enumerate() {
                visits[t] += 1;

                if !symbol.is_silent() {
                    let (position, length) = (symbol.p, symbol.q);
                    initial[t] += 1.0;
                    for k in 0..length {
                        emissions[self.emission_index(t, position, k)] += 1.0;
                    }
                    for k in 0..position.saturating_sub(1) {
                        emissions[self.emission_index(t, k, length)] += 1.0;
                    }
                }

                if let Some(j) = (t + 1..sequence.len()).find(|&j| !sequence[j].is_silent()) {
                    transitions[t * n + j] += 1.0;
                }
            }
        }

        let block = m0 * m1;
        for (i, &count) in visits.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let count = count as f64;
            self.initial_mut()[i] = initial[i] / count;
            for (dst, &c) in self.transitions_mut()[i * n..(i + 1) * n]
                .iter_mut()
                .zip(&transitions[i * n..(i + 1) * n])
            {
                *dst = c / count;
            }
            for (dst, &c) in self.emissions_mut()[i * block..(i + 1) * block]
                .iter_mut()
                .zip(&emissions[i * block..(i + 1) * block])
            {
                *dst = c / count;
            }
        }
        trace!(sequences = corpus.len(), ?visits, "supervised counting finished");
        Ok(())
    }
}
