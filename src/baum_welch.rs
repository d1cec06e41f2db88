//! Unsupervised re-estimation with the Baum-Welch (forward-backward EM) algorithm.

use tracing::{debug, info, warn};

use crate::convergence::check_convergence;
use crate::error::*;
use crate::model::Model;
use crate::symbol::Symbol;

/// Default floor for emission probabilities that receive no expected counts.
pub const EMISSION_FLOOR: f64 = 1e-10;

bitflags! {
    /// Parameters re-estimated by the M-step. Parameters not selected keep their values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Params: u32 {
        const INITIAL     = 0b001;
        const TRANSITIONS = 0b010;
        const EMISSIONS   = 0b100;
    }
}

impl Default for Params {
    fn default() -> Params {
        Params::all()
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Average log-likelihood of the last E-step.
    pub log_likelihood: f64,
    /// Number of E-steps performed.
    pub iterations: usize,
    /// Average log-likelihood of every E-step, in order.
    pub history: Vec<f64>,
}

/// Baum-Welch trainer configuration.
///
/// ```
/// use hmm_learn::{sequence, BaumWelch, Model, Params};
///
/// let corpus = vec![sequence(&[(1, 1), (1, 2), (2, 1)]), sequence(&[(2, 2), (1, 1)])];
/// let mut model = Model::uniform(2, 3, 3).unwrap();
/// let report = BaumWelch::new()
///     .max_iterations(20)
///     .tolerance(1e-6)
///     .params(Params::TRANSITIONS | Params::EMISSIONS)
///     .train(&mut model, &corpus)
///     .unwrap();
/// assert!(report.iterations <= 20);
/// ```
#[derive(Debug, Clone)]
pub struct BaumWelch {
    max_iterations: usize,
    tolerance: f64,
    params: Params,
    emission_floor: f64,
}

impl Default for BaumWelch {
    fn default() -> BaumWelch {
        BaumWelch {
            max_iterations: 100,
            tolerance: 1e-4,
            params: Params::all(),
            emission_floor: EMISSION_FLOOR,
        }
    }
}

impl BaumWelch {
    pub fn new() -> BaumWelch {
        BaumWelch::default()
    }
    /// Iteration cap. Zero means no cap when a positive tolerance is set.
    pub fn max_iterations(&mut self, max_iterations: usize) -> &mut BaumWelch {
        self.max_iterations = max_iterations;
        self
    }
    /// Stop once two successive average log-likelihoods differ by at most this much. With a
    /// tolerance `<= 0` the trainer runs exactly `max_iterations` E-steps.
    pub fn tolerance(&mut self, tolerance: f64) -> &mut BaumWelch {
        self.tolerance = tolerance;
        self
    }
    pub fn params(&mut self, params: Params) -> &mut BaumWelch {
        self.params = params;
        self
    }
    /// Value used for an emission probability whose expected count is zero. Must lie in
    /// `[0, 1]`; [`BaumWelch::train`] rejects anything else.
    pub fn emission_floor(&mut self, floor: f64) -> &mut BaumWelch {
        self.emission_floor = floor;
        self
    }

    /// Train `model` on `corpus` until the convergence check fires.
    ///
    /// Each iteration runs forward and backward on every sequence, accumulates the expected
    /// counts, and averages `sum(ln(scaling))` over the sequences. If that average converged
    /// (or broke down to NaN/Inf) the loop stops without touching the parameters; otherwise the
    /// selected parameters are re-estimated and the loop repeats.
    pub fn train(&self, model: &mut Model, corpus: &[Vec<Symbol>]) -> Result<TrainingReport> {
        if corpus.is_empty() {
            return Err(HmmError::EmptyCorpus);
        }
        for sequence in corpus {
            model.check_sequence(sequence)?;
        }
        if !(0.0..=1.0).contains(&self.emission_floor) {
            return Err(HmmError::InvalidModel(format!(
                "emission floor {} is not a probability", self.emission_floor)));
        }
        if self.max_iterations == 0 && self.tolerance <= 0.0 {
            // nothing would ever stop the loop
            return Ok(TrainingReport { log_likelihood: 0.0, iterations: 0, history: vec![] });
        }

        let mut history = Vec::new();
        let mut old_likelihood = f64::MIN_POSITIVE;
        let mut iteration = 1;
        loop {
            let stats = expectation(model, corpus);
            let new_likelihood = stats.log_likelihood / corpus.len() as f64;
            history.push(new_likelihood);
            debug!(iteration, log_likelihood = new_likelihood, "E-step");

            if check_convergence(
                old_likelihood,
                new_likelihood,
                iteration,
                self.max_iterations,
                self.tolerance,
            ) {
                if new_likelihood.is_finite() {
                    info!(iterations = iteration, log_likelihood = new_likelihood, "Baum-Welch converged");
                } else {
                    warn!(iterations = iteration, log_likelihood = new_likelihood,
                        "likelihood broke down, keeping last parameters");
                }
                return Ok(TrainingReport {
                    log_likelihood: new_likelihood,
                    iterations: iteration,
                    history,
                });
            }

            self.maximization(model, &stats, corpus.len());
            old_likelihood = new_likelihood;
            iteration += 1;
        }
    }

    fn maximization(&self, model: &mut Model, stats: &Statistics, n_sequences: usize) {
        let n = model.n_states();
        let (m0, m1) = model.symbols();

        if self.params.contains(Params::INITIAL) {
            for (pi, &sum) in model.initial_mut().iter_mut().zip(&stats.initial) {
                *pi = sum / n_sequences as f64;
            }
        }

        if self.params.contains(Params::TRANSITIONS) {
            let transitions = model.transitions_mut();
            for i in 0..n {
                let den = stats.occupancy[i];
                for j in 0..n {
                    transitions[i * n + j] =
                        if den == 0.0 { 0.0 } else { stats.transitions[i * n + j] / den };
                }
            }
        }

        if self.params.contains(Params::EMISSIONS) {
            let emissions = model.emissions_mut();
            for i in 0..n {
                let den = stats.emitting[i];
                // (0, 0) is never emitted
                emissions[i * m0 * m1] = 0.0;
                for idx in i * m0 * m1 + 1..(i + 1) * m0 * m1 {
                    let num = stats.emissions[idx];
                    // a state with no emitting occupancy has num == 0 in every cell
                    emissions[idx] = if num == 0.0 { self.emission_floor } else { num / den };
                }
            }
        }
    }
}

impl Model {
    /// Baum-Welch with an iteration cap and tolerance, returning the final average
    /// log-likelihood.
    pub fn update(&mut self, corpus: &[Vec<Symbol>], iterations: usize, tolerance: f64) -> Result<f64> {
        let report = BaumWelch::new()
            .max_iterations(iterations)
            .tolerance(tolerance)
            .train(self, corpus)?;
        Ok(report.log_likelihood)
    }
}

/// Expected sufficient statistics summed over a set of sequences.
#[derive(Debug, Clone)]
struct Statistics {
    /// `sum gamma[0][k]`
    initial: Vec<f64>,
    /// `sum_t epsilon[t][i][j]`, t in `[0, T-2]`
    transitions: Vec<f64>,
    /// `sum_t gamma[t][i]`, t in `[0, T-2]`
    occupancy: Vec<f64>,
    /// `sum gamma[t][i]` over steps emitting `(p, q)`
    emissions: Vec<f64>,
    /// `sum gamma[t][i]` over all emitting steps
    emitting: Vec<f64>,
    log_likelihood: f64,
}

impl Statistics {
    fn zeros(model: &Model) -> Statistics {
        let n = model.n_states();
        let (m0, m1) = model.symbols();
        Statistics {
            initial: vec![0.0; n],
            transitions: vec![0.0; n * n],
            occupancy: vec![0.0; n],
            emissions: vec![0.0; n * m0 * m1],
            emitting: vec![0.0; n],
            log_likelihood: 0.0,
        }
    }

    fn accumulate(&mut self, model: &Model, sequence: &[Symbol]) {
        let posterior = model.posterior_unchecked(sequence);
        let last = sequence.len() - 1;

        add_into(&mut self.initial, &posterior.gamma[0]);
        for (t, (gamma, &symbol)) in posterior.gamma.iter().zip(sequence).enumerate() {
            if t < last {
                add_into(&mut self.occupancy, gamma);
            }
            if !symbol.is_silent() {
                add_into(&mut self.emitting, gamma);
                for (k, &g) in gamma.iter().enumerate() {
                    self.emissions[model.emission_index(k, symbol.p, symbol.q)] += g;
                }
            }
        }
        for step in &posterior.epsilon {
            add_into(&mut self.transitions, step);
        }
        self.log_likelihood += posterior.log_likelihood;
    }

    fn merge(mut self, other: Statistics) -> Statistics {
        add_into(&mut self.initial, &other.initial);
        add_into(&mut self.transitions, &other.transitions);
        add_into(&mut self.occupancy, &other.occupancy);
        add_into(&mut self.emissions, &other.emissions);
        add_into(&mut self.emitting, &other.emitting);
        self.log_likelihood += other.log_likelihood;
        self
    }
}

fn add_into(acc: &mut [f64], values: &[f64]) {
    acc.iter_mut().zip(values).for_each(|(a, v)| *a += v);
}

/// E-step over the whole corpus. Sequences are independent, so with the `parallel` feature each
/// one is processed on the rayon pool and the partial sums are merged afterwards.
fn expectation(model: &Model, corpus: &[Vec<Symbol>]) -> Statistics {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        corpus
            .par_iter()
            .map(|sequence| {
                let mut stats = Statistics::zeros(model);
                stats.accumulate(model, sequence);
                stats
            })
            .reduce(|| Statistics::zeros(model), Statistics::merge)
    }
    #[cfg(not(feature = "parallel"))]
    {
        corpus.iter().fold(Statistics::zeros(model), |mut stats, sequence| {
            stats.accumulate(model, sequence);
            stats
        })
    }
}
