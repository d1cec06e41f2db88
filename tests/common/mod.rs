#![allow(dead_code)]

use hmm_learn::{Model, Symbol};

/// Two states over a 3 x 2 symbol space. `B[i][0][0]` is zero since `(0, 0)` is never emitted.
pub fn two_state() -> Model {
    Model::from_parts(
        2,
        3,
        2,
        vec![0.6, 0.4],
        vec![
            0.7, 0.3, //
            0.4, 0.6,
        ],
        vec![
            0.0, 0.1, 0.3, 0.1, 0.4, 0.1, // state 0
            0.0, 0.3, 0.1, 0.3, 0.1, 0.2, // state 1
        ],
    )
    .unwrap()
}

/// Probability of `sequence` summed over every state path, straight from the definition.
pub fn brute_force_probability(model: &Model, sequence: &[Symbol]) -> f64 {
    all_paths(model.n_states(), sequence.len())
        .iter()
        .map(|path| path_probability(model, sequence, path))
        .sum()
}

/// Probability of the single best path, straight from the definition.
pub fn brute_force_best(model: &Model, sequence: &[Symbol]) -> f64 {
    all_paths(model.n_states(), sequence.len())
        .iter()
        .map(|path| path_probability(model, sequence, path))
        .fold(0.0, f64::max)
}

pub fn path_probability(model: &Model, sequence: &[Symbol], path: &[usize]) -> f64 {
    let emit = |state: usize, symbol: Symbol| {
        if symbol.is_silent() { 1.0 } else { model.emission(state, symbol.p, symbol.q) }
    };
    let mut prob = model.initial()[path[0]] * emit(path[0], sequence[0]);
    for t in 1..sequence.len() {
        prob *= model.transition(path[t - 1], path[t]) * emit(path[t], sequence[t]);
    }
    prob
}

fn all_paths(n_states: usize, len: usize) -> Vec<Vec<usize>> {
    let mut paths = vec![vec![]];
    for _ in 0..len {
        paths = paths
            .into_iter()
            .flat_map(|path| {
                (0..n_states).map(move |s| {
                    let mut next = path.clone();
                    next.push(s);
                    next
                })
            })
            .collect();
    }
    paths
}
