mod common;

use approx::assert_relative_eq;
use hmm_learn::{sequence, HmmError, Model, Symbol};

use common::{brute_force_best, path_probability, two_state};

fn ring() -> Model {
    Model::from_parts(
        3,
        2,
        3,
        vec![0.5, 0.25, 0.25],
        vec![
            0.5, 0.5, 0.0, //
            0.0, 0.5, 0.5, //
            0.5, 0.0, 0.5,
        ],
        vec![
            0.0, 0.2, 0.1, 0.3, 0.2, 0.2, //
            0.0, 0.1, 0.1, 0.1, 0.2, 0.5, //
            0.0, 0.5, 0.1, 0.1, 0.2, 0.1,
        ],
    )
    .unwrap()
}

#[test]
fn decodes_best_path_by_enumeration() {
    let model = ring();
    let obs = sequence(&[(0, 1), (1, 2), (1, 0), (0, 0), (1, 2), (0, 2)]);
    let path = model.viterbi(&obs).unwrap();

    assert_eq!(path.states.len(), obs.len());
    assert_relative_eq!(path.probability, brute_force_best(&model, &obs), epsilon = 1e-14);
    assert_relative_eq!(
        path.probability,
        path_probability(&model, &obs, &path.states),
        epsilon = 1e-14
    );
    assert_relative_eq!(path.probability, (-path.cost).exp());
}

#[test]
fn path_only_uses_allowed_transitions() {
    let model = ring();
    let obs: Vec<Symbol> = (0..40).map(|t| Symbol::new(t % 2, (t * 7) % 3)).collect();
    let path = model.viterbi(&obs).unwrap();

    assert_eq!(path.states.len(), obs.len());
    assert!(path.probability > 0.0);
    for pair in path.states.windows(2) {
        assert!(model.transition(pair[0], pair[1]) > 0.0, "illegal step {:?}", pair);
    }
}

#[test]
fn ties_go_to_the_lowest_state() {
    let model = Model::uniform(3, 2, 2).unwrap();
    let path = model.viterbi(&sequence(&[(1, 1), (0, 1), (1, 0)])).unwrap();
    assert_eq!(path.states, vec![0, 0, 0]);
}

#[test]
fn silent_sequence_is_decoded_from_transitions_alone() {
    let mut model = Model::uniform(2, 1, 1).unwrap();
    model.set_transition_row(0, &[0.1, 0.9]).unwrap();
    model.set_transition_row(1, &[0.2, 0.8]).unwrap();

    let path = model.viterbi(&[Symbol::SILENT; 3]).unwrap();
    assert_eq!(path.states, vec![0, 1, 1]);
    assert_relative_eq!(path.probability, 0.5 * 0.9 * 0.8, epsilon = 1e-12);
}

#[test]
fn follows_emission_evidence() {
    let model = two_state();
    // (2, 0) favours state 0, (0, 1) favours state 1
    let obs = sequence(&[(2, 0), (2, 0), (2, 0), (0, 1), (0, 1), (0, 1), (0, 1)]);
    let path = model.viterbi(&obs).unwrap();
    assert_eq!(&path.states[..3], &[0, 0, 0]);
    assert_eq!(path.states[6], 1);
}

#[test]
fn long_sequence_has_finite_cost() {
    let model = two_state();
    let obs: Vec<Symbol> = (0..10_000).map(|t| Symbol::new(1 + t % 2, 1)).collect();
    let path = model.viterbi(&obs).unwrap();
    assert_eq!(path.states.len(), 10_000);
    assert!(path.cost.is_finite());
    assert_eq!(path.probability, 0.0);
}

#[test]
fn rejects_empty_sequence() {
    assert!(matches!(two_state().viterbi(&[]), Err(HmmError::InvalidObservation(_))));
}
