//! Hidden Markov Model inference and training over joint `(p, q)` emission symbols.
//!
//! A [`Model`] holds the transition matrix, the `N x M0 x M1` emission tensor and the initial
//! distribution. Read-only operations borrow it: [`Model::forward`], [`Model::backward`],
//! [`Model::posterior`], [`Model::evaluate`] and [`Model::viterbi`]. Trainers take it by
//! exclusive reference: [`Model::learn`] counts labelled sequences, and [`BaumWelch`] runs EM on
//! unlabelled ones. Forward and backward values are scaled per time step and Viterbi works on
//! negative log-probabilities, so long sequences do not underflow.
//!
//! ```
//! use hmm_learn::{sequence, Model, Scale};
//!
//! let mut model = Model::uniform(2, 3, 3).unwrap();
//! let corpus = vec![sequence(&[(1, 2), (0, 0), (2, 1)])];
//! let likelihood = model.update(&corpus, 10, 1e-6).unwrap();
//! assert!(likelihood.is_finite());
//!
//! let path = model.viterbi(&corpus[0]).unwrap();
//! assert_eq!(path.states.len(), 3);
//! assert!(model.evaluate(&corpus[0], Scale::Log).unwrap() <= 0.0);
//! ```

#[macro_use] extern crate bitflags;

pub mod error;
pub use error::{HmmError, Result};

pub mod symbol;
pub use symbol::{sequence, Symbol};

pub mod corpus;
pub use corpus::{read_corpus, read_corpus_path, Corpus};

mod model;
pub use model::Model;

pub mod convergence;
pub use convergence::check_convergence;

mod forward;
mod backward;

pub mod posterior;
pub use posterior::Posterior;

mod supervised;

pub mod baum_welch;
pub use baum_welch::{BaumWelch, Params, TrainingReport};

pub mod viterbi;
pub use viterbi::ViterbiPath;

mod likelihood;
pub use likelihood::Scale;

pub mod store;
pub use store::{KeyValueStore, MemoryStore};

mod csv_store;
pub use csv_store::CsvStore;
