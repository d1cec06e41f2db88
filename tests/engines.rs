mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use hmm_learn::{sequence, HmmError, Model, Scale, Symbol};

use common::{brute_force_probability, two_state};

#[test]
fn forward_matches_hand_computation() {
    let model = Model::from_parts(
        2,
        1,
        2,
        vec![0.6, 0.4],
        vec![0.7, 0.3, 0.4, 0.6],
        vec![0.0, 0.9, 0.0, 0.2],
    )
    .unwrap();
    let obs = sequence(&[(0, 1), (0, 1)]);
    let mut scaling = vec![0.0; 2];
    let fwd = model.forward(&obs, &mut scaling).unwrap();

    assert_relative_eq!(scaling[0], 0.62, epsilon = 1e-12);
    assert_relative_eq!(fwd[0][0], 0.54 / 0.62, epsilon = 1e-12);
    assert_relative_eq!(fwd[0][1], 0.08 / 0.62, epsilon = 1e-12);
    // unscaled alpha[1] = [0.369, 0.042]
    assert_relative_eq!(scaling[0] * scaling[1], 0.411, epsilon = 1e-12);
    assert_relative_eq!(fwd[1][0], 0.369 / 0.411, epsilon = 1e-12);
    assert_relative_eq!(model.evaluate(&obs, Scale::Linear).unwrap(), 0.411, epsilon = 1e-12);
    assert_relative_eq!(model.evaluate(&obs, Scale::Log).unwrap(), 0.411f64.ln(), epsilon = 1e-12);
}

#[test]
fn forward_overwrites_scaling() {
    let model = two_state();
    let obs = sequence(&[(1, 0), (2, 1)]);
    let mut fresh = vec![0.0; 2];
    let mut dirty = vec![7.0, -3.0];
    assert_eq!(
        model.forward(&obs, &mut fresh).unwrap(),
        model.forward(&obs, &mut dirty).unwrap()
    );
    assert_eq!(fresh, dirty);
}

#[test]
fn forward_backward_product_is_constant() {
    let model = two_state();
    let obs = sequence(&[(1, 0), (2, 1), (0, 0), (1, 1), (0, 1), (2, 0), (2, 0)]);
    let mut scaling = vec![0.0; obs.len()];
    let fwd = model.forward(&obs, &mut scaling).unwrap();
    let bwd = model.backward(&obs, &scaling).unwrap();

    // scaled forward * scaled backward recovers P(O) / P(O), up to the step's own coefficient
    for t in 0..obs.len() {
        let mass: f64 = (0..2).map(|i| fwd[t][i] * bwd[t][i]).sum();
        assert_relative_eq!(mass * scaling[t], 1.0, epsilon = 1e-10);
    }
}

#[test]
fn likelihood_matches_enumeration() {
    let model = two_state();
    let obs = sequence(&[(2, 0), (0, 0), (1, 1), (0, 1), (2, 1)]);
    let expected = brute_force_probability(&model, &obs);
    assert_relative_eq!(model.evaluate(&obs, Scale::Linear).unwrap(), expected, epsilon = 1e-14);
    assert_relative_eq!(
        model.evaluate(&obs, Scale::Log).unwrap(),
        expected.ln(),
        epsilon = 1e-10
    );
}

#[test]
fn long_sequences_do_not_underflow() {
    let model = two_state();
    let obs: Vec<Symbol> = (0..5000).map(|t| Symbol::new(1 + t % 2, t % 2)).collect();
    let log_likelihood = model.evaluate(&obs, Scale::Log).unwrap();
    assert!(log_likelihood.is_finite());
    assert!(log_likelihood < -1000.0);
    assert_eq!(model.evaluate(&obs, Scale::Linear).unwrap(), 0.0);

    let posterior = model.posterior(&obs).unwrap();
    for row in &posterior.gamma {
        assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn silent_steps_never_read_the_zero_zero_cell() {
    let obs = sequence(&[(0, 0), (1, 1), (0, 0), (0, 0), (2, 1)]);
    let model = two_state();
    let mut other = two_state();
    other.set_emission_slice(0, 0, &[1.0, 0.1]).unwrap();
    other.set_emission_slice(1, 0, &[0.37, 0.3]).unwrap();

    let (mut c1, mut c2) = (vec![0.0; obs.len()], vec![0.0; obs.len()]);
    assert_eq!(model.forward(&obs, &mut c1).unwrap(), other.forward(&obs, &mut c2).unwrap());
    assert_eq!(c1, c2);
    assert_eq!(model.backward(&obs, &c1).unwrap(), other.backward(&obs, &c2).unwrap());
    assert_eq!(model.viterbi(&obs).unwrap(), other.viterbi(&obs).unwrap());
}

#[test]
fn fully_silent_sequence_keeps_initial_distribution() {
    let model = Model::uniform(2, 1, 1).unwrap();
    let obs = vec![Symbol::SILENT; 3];
    let mut scaling = vec![0.0; 3];
    let fwd = model.forward(&obs, &mut scaling).unwrap();

    assert_eq!(fwd[0], model.initial().to_vec());
    assert_eq!(scaling, vec![1.0, 1.0, 1.0]);
    assert_eq!(model.evaluate(&obs, Scale::Log).unwrap(), 0.0);
}

#[test]
fn zero_mass_step_is_not_divided() {
    // no state can emit (1, 1)
    let mut model = Model::uniform(2, 2, 2).unwrap();
    model.set_emission_slice(0, 1, &[0.5, 0.0]).unwrap();
    model.set_emission_slice(1, 1, &[0.5, 0.0]).unwrap();
    let obs = sequence(&[(1, 0), (1, 1), (1, 0)]);

    let mut scaling = vec![0.0; 3];
    let fwd = model.forward(&obs, &mut scaling).unwrap();
    assert_eq!(scaling[1], 0.0);
    assert!(fwd.iter().flatten().all(|v| v.is_finite()));
    let bwd = model.backward(&obs, &scaling).unwrap();
    assert!(bwd.iter().flatten().all(|v| v.is_finite()));

    assert_eq!(model.evaluate(&obs, Scale::Log).unwrap(), f64::NEG_INFINITY);
    assert_eq!(model.evaluate(&obs, Scale::Linear).unwrap(), 0.0);
}

#[test]
fn posterior_marginals_agree() {
    let model = two_state();
    let obs = sequence(&[(1, 0), (0, 0), (2, 1), (0, 1)]);
    let posterior = model.posterior(&obs).unwrap();

    assert_eq!(posterior.gamma.len(), 4);
    assert_eq!(posterior.epsilon.len(), 3);
    for (t, step) in posterior.epsilon.iter().enumerate() {
        assert_abs_diff_eq!(step.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for k in 0..2 {
            assert_abs_diff_eq!(step[k * 2] + step[k * 2 + 1], posterior.gamma[t][k], epsilon = 1e-12);
        }
    }
    assert_relative_eq!(
        posterior.log_likelihood,
        model.evaluate(&obs, Scale::Log).unwrap(),
        epsilon = 1e-12
    );
    assert_eq!(posterior.most_likely_states().len(), 4);
}

#[test]
fn posterior_decoding_follows_emissions() {
    // state 0 emits (1, 0), state 1 emits (2, 1)
    let model = Model::from_parts(
        2,
        3,
        2,
        vec![0.5, 0.5],
        vec![0.9, 0.1, 0.1, 0.9],
        vec![
            0.0, 0.0, 0.95, 0.0, 0.0, 0.05, //
            0.0, 0.0, 0.05, 0.0, 0.0, 0.95,
        ],
    )
    .unwrap();
    let obs = sequence(&[(1, 0), (1, 0), (2, 1), (2, 1)]);
    assert_eq!(model.posterior(&obs).unwrap().most_likely_states(), vec![0, 0, 1, 1]);
}

#[test]
fn rejects_bad_input() {
    let model = two_state();
    let mut scaling = vec![0.0; 2];
    assert!(matches!(model.forward(&[], &mut []), Err(HmmError::InvalidObservation(_))));
    assert!(matches!(
        model.forward(&sequence(&[(3, 0), (1, 1)]), &mut scaling),
        Err(HmmError::InvalidObservation(_))
    ));
    assert!(matches!(
        model.forward(&sequence(&[(1, 1)]), &mut scaling),
        Err(HmmError::InvalidDimensions(_))
    ));
    assert!(matches!(
        model.backward(&sequence(&[(1, 1), (1, 2)]), &scaling),
        Err(HmmError::InvalidObservation(_))
    ));
    assert!(model.evaluate(&[], Scale::Log).is_err());
    assert!(model.posterior(&[]).is_err());
}
