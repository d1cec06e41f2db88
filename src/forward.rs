//! Scaled forward recurrence.

use crate::error::*;
use crate::model::Model;
use crate::symbol::Symbol;

impl Model {
    /// Run the forward algorithm over `sequence`.
    ///
    /// Returns the `T x N` matrix of scaled forward values and writes one scaling coefficient per
    /// time step into `scaling`, which must have the same length as the sequence. Each
    /// coefficient is the un-normalized forward mass at that step; a row whose mass is exactly
    /// zero is left unscaled.
    pub fn forward(&self, sequence: &[Symbol], scaling: &mut [f64]) -> Result<Vec<Vec<f64>>> {
        self.check_sequence(sequence)?;
        check_scaling(sequence, scaling)?;
        Ok(self.forward_unchecked(sequence, scaling))
    }

    pub(crate) fn forward_unchecked(&self, sequence: &[Symbol], scaling: &mut [f64]) -> Vec<Vec<f64>> {
        let n = self.n_states();
        let mut fwd = vec![vec![0.0; n]; sequence.len()];

        // init
        let first = sequence[0];
        for (i, value) in fwd[0].iter_mut().enumerate() {
            *value = self.initial()[i] * self.emission_factor(i, first);
        }
        scaling[0] = scale_row(&mut fwd[0]);

        // induction
        for t in 1..sequence.len() {
            let symbol = sequence[t];
            let (done, rest) = fwd.split_at_mut(t);
            let prev = &done[t - 1];
            for (i, value) in rest[0].iter_mut().enumerate() {
                let mass: f64 = (0..n).map(|j| prev[j] * self.transition(j, i)).sum();
                *value = mass * self.emission_factor(i, symbol);
            }
            scaling[t] = scale_row(&mut rest[0]);
        }
        fwd
    }
}

/// Normalize `row` by its sum, returning the sum. A zero sum leaves the row untouched.
fn scale_row(row: &mut [f64]) -> f64 {
    let sum: f64 = row.iter().sum();
    if sum != 0.0 {
        row.iter_mut().for_each(|v| *v /= sum);
    }
    sum
}

pub(crate) fn check_scaling(sequence: &[Symbol], scaling: &[f64]) -> Result<()> {
    if scaling.len() != sequence.len() {
        return Err(HmmError::InvalidDimensions(format!(
            "scaling has length {}, sequence has length {}", scaling.len(), sequence.len())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mass_row_is_left_alone() {
        let mut row = [0.0, 0.0];
        assert_eq!(scale_row(&mut row), 0.0);
        assert_eq!(row, [0.0, 0.0]);

        let mut row = [1.0, 3.0];
        assert_eq!(scale_row(&mut row), 4.0);
        assert_eq!(row, [0.25, 0.75]);
    }
}
