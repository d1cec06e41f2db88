use crate::error::*;
use crate::model::Model;
use crate::symbol::Symbol;

/// Scale on which [`Model::evaluate`] reports a sequence probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    /// Natural log of the probability.
    #[default]
    Log,
    /// The probability itself (underflows to zero on long sequences).
    Linear,
}

impl Model {
    /// Probability of `sequence` under the model, computed from the forward scaling coefficients.
    pub fn evaluate(&self, sequence: &[Symbol], scale: Scale) -> Result<f64> {
        let mut scaling = vec![0.0; sequence.len()];
        self.forward(sequence, &mut scaling)?;
        let log_likelihood: f64 = scaling.iter().map(|c| c.ln()).sum();
        Ok(match scale {
            Scale::Log => log_likelihood,
            Scale::Linear => log_likelihood.exp(),
        })
    }
}
