//! The HMM parameter container.
//!
//! Parameters are stored flat and row-major: `A[i][j]` lives at `i * N + j` and `B[i][p][q]` at
//! `(i * M0 + p) * M1 + q`. The model is mutated only through `&mut self` (the trainers); the
//! engines and the decoder borrow it immutably.

use std::fmt;
use std::io::Write;

use tabwriter::TabWriter;

use crate::error::*;
use crate::symbol::Symbol;

const CHECKPOINT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    n_states: usize,
    m0: usize,
    m1: usize,
    /// Initial-state distribution (length N).
    initial: Vec<f64>,
    /// Transition matrix, N x N.
    transitions: Vec<f64>,
    /// Emission tensor, N x M0 x M1.
    emissions: Vec<f64>,
}

impl Model {
    /// Create a model with uniform transitions (`1/N` per row), uniform emissions
    /// (`1/(M0*M1)`) and an all-zero initial distribution.
    ///
    /// States that [`Model::learn`] never visits keep these values; use
    /// [`Model::uniform`] for a model that is valid straight away.
    pub fn new(n_states: usize, m0: usize, m1: usize) -> Result<Model> {
        check_dimensions(n_states, m0, m1)?;
        Ok(Model {
            n_states,
            m0,
            m1,
            initial: vec![0.0; n_states],
            transitions: vec![1.0 / n_states as f64; n_states * n_states],
            emissions: vec![1.0 / (m0 * m1) as f64; n_states * m0 * m1],
        })
    }

    /// Same as [`Model::new`], but with a uniform initial distribution.
    pub fn uniform(n_states: usize, m0: usize, m1: usize) -> Result<Model> {
        let mut model = Model::new(n_states, m0, m1)?;
        model.initial.fill(1.0 / n_states as f64);
        Ok(model)
    }

    /// Build a model from flat, row-major parameter vectors.
    ///
    /// Lengths must match the dimensions and every value must be a probability. Row sums are not
    /// checked here; see [`Model::validate`].
    pub fn from_parts(
        n_states: usize,
        m0: usize,
        m1: usize,
        initial: Vec<f64>,
        transitions: Vec<f64>,
        emissions: Vec<f64>,
    ) -> Result<Model> {
        check_dimensions(n_states, m0, m1)?;
        check_len("initial", initial.len(), n_states)?;
        check_len("transitions", transitions.len(), n_states * n_states)?;
        check_len("emissions", emissions.len(), n_states * m0 * m1)?;
        check_probabilities("initial", &initial)?;
        check_probabilities("transitions", &transitions)?;
        check_probabilities("emissions", &emissions)?;
        Ok(Model { n_states, m0, m1, initial, transitions, emissions })
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Cardinalities `(M0, M1)` of the two emission dimensions.
    pub fn symbols(&self) -> (usize, usize) {
        (self.m0, self.m1)
    }

    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transitions[from * self.n_states + to]
    }

    pub fn transition_row(&self, from: usize) -> &[f64] {
        &self.transitions[from * self.n_states..(from + 1) * self.n_states]
    }

    pub fn emission(&self, state: usize, p: usize, q: usize) -> f64 {
        self.emissions[self.emission_index(state, p, q)]
    }

    /// The `M1` emission probabilities `B[state][p][..]`.
    pub fn emission_slice(&self, state: usize, p: usize) -> &[f64] {
        let start = self.emission_index(state, p, 0);
        &self.emissions[start..start + self.m1]
    }

    pub fn set_initial(&mut self, initial: &[f64]) -> Result<()> {
        check_len("initial", initial.len(), self.n_states)?;
        check_probabilities("initial", initial)?;
        self.initial.copy_from_slice(initial);
        Ok(())
    }

    pub fn set_transition_row(&mut self, from: usize, row: &[f64]) -> Result<()> {
        self.check_state(from)?;
        check_len("transition row", row.len(), self.n_states)?;
        check_probabilities("transition row", row)?;
        let n = self.n_states;
        self.transitions[from * n..(from + 1) * n].copy_from_slice(row);
        Ok(())
    }

    pub fn set_emission_slice(&mut self, state: usize, p: usize, slice: &[f64]) -> Result<()> {
        self.check_state(state)?;
        if p >= self.m0 {
            return Err(HmmError::InvalidDimensions(format!(
                "emission index {} out of range (M0 = {})", p, self.m0)));
        }
        check_len("emission slice", slice.len(), self.m1)?;
        check_probabilities("emission slice", slice)?;
        let start = self.emission_index(state, p, 0);
        self.emissions[start..start + self.m1].copy_from_slice(slice);
        Ok(())
    }

    /// Model-validity checkpoint.
    ///
    /// Every value must lie in `[0, 1]`, the initial distribution must sum to 1, and each
    /// transition row must sum to 1 unless it is entirely zero (a state that never received any
    /// occupancy during training).
    pub fn validate(&self) -> Result<()> {
        check_probabilities("initial", &self.initial)?;
        check_probabilities("transitions", &self.transitions)?;
        check_probabilities("emissions", &self.emissions)?;

        let pi_sum: f64 = self.initial.iter().sum();
        if (pi_sum - 1.0).abs() > CHECKPOINT_TOLERANCE {
            return Err(HmmError::InvalidModel(format!(
                "initial probabilities sum to {}, expected 1", pi_sum)));
        }
        for i in 0..self.n_states {
            let row_sum: f64 = self.transition_row(i).iter().sum();
            if row_sum != 0.0 && (row_sum - 1.0).abs() > CHECKPOINT_TOLERANCE {
                return Err(HmmError::InvalidModel(format!(
                    "transition row {} sums to {}, expected 1", i, row_sum)));
            }
        }
        Ok(())
    }

    /// Check that a sequence is non-empty and every symbol indexes into the emission tensor.
    pub fn check_sequence(&self, sequence: &[Symbol]) -> Result<()> {
        if sequence.is_empty() {
            return Err(HmmError::InvalidObservation("observation sequence is empty".into()));
        }
        for (t, symbol) in sequence.iter().enumerate() {
            if symbol.p >= self.m0 || symbol.q >= self.m1 {
                return Err(HmmError::InvalidObservation(format!(
                    "symbol {} at t={} out of range (M0 = {}, M1 = {})",
                    symbol, t, self.m0, self.m1
                )));
            }
        }
        Ok(())
    }

    /// `B[state][p][q]`, or 1 when the step is silent.
    #[inline]
    pub(crate) fn emission_factor(&self, state: usize, symbol: Symbol) -> f64 {
        if symbol.is_silent() {
            1.0
        } else {
            self.emissions[self.emission_index(state, symbol.p, symbol.q)]
        }
    }

    #[inline]
    pub(crate) fn emission_index(&self, state: usize, p: usize, q: usize) -> usize {
        (state * self.m0 + p) * self.m1 + q
    }

    pub(crate) fn initial_mut(&mut self) -> &mut [f64] {
        &mut self.initial
    }

    pub(crate) fn transitions_mut(&mut self) -> &mut [f64] {
        &mut self.transitions
    }

    pub(crate) fn emissions_mut(&mut self) -> &mut [f64] {
        &mut self.emissions
    }

    fn check_state(&self, state: usize) -> Result<()> {
        if state >= self.n_states {
            return Err(HmmError::InvalidDimensions(format!(
                "state {} out of range (N = {})", state, self.n_states)));
        }
        Ok(())
    }

    fn write_tables<W: Write>(&self, wtr: &mut W) -> ::std::io::Result<()> {
        writeln!(wtr, "Initial:")?;
        writeln!(wtr, "{}", join_row(&self.initial))?;
        writeln!(wtr, "Transitions:")?;
        for i in 0..self.n_states {
            writeln!(wtr, "{}\t{}", i, join_row(self.transition_row(i)))?;
        }
        writeln!(wtr, "Emissions:")?;
        for i in 0..self.n_states {
            for p in 0..self.m0 {
                let slice = self.emission_slice(i, p);
                if slice.iter().any(|&v| v != 0.0) {
                    writeln!(wtr, "{}\t{}\t{}", i, p, join_row(slice))?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Model")?;
        writeln!(f, "=====")?;
        writeln!(f, "States: {}, symbols: {} x {}", self.n_states, self.m0, self.m1)?;
        let mut tw = TabWriter::new(vec![]).padding(2);
        self.write_tables(&mut tw).map_err(|_| fmt::Error)?;
        let table = tw.into_inner().map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&table))
    }
}

fn join_row(row: &[f64]) -> String {
    row.iter().map(|v| format!("{:.6}", v)).collect::<Vec<_>>().join("\t")
}

fn check_dimensions(n_states: usize, m0: usize, m1: usize) -> Result<()> {
    if n_states == 0 || m0 == 0 || m1 == 0 {
        return Err(HmmError::InvalidDimensions(format!(
            "N, M0 and M1 must be positive (got {}, {}, {})", n_states, m0, m1)));
    }
    Ok(())
}

fn check_len(what: &str, found: usize, expected: usize) -> Result<()> {
    if found != expected {
        return Err(HmmError::InvalidDimensions(format!(
            "{} has length {}, expected {}", what, found, expected)));
    }
    Ok(())
}

fn check_probabilities(what: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !(0.0..=1.0).contains(v)) {
        Some(idx) => Err(HmmError::InvalidModel(format!(
            "{}[{}] = {} is not a probability", what, idx, values[idx]))),
        None => Ok(()),
    }
}
