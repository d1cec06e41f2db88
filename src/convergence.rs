/// Decide whether an iterative estimation loop should stop.
///
/// With a positive `tolerance` the loop stops once two successive likelihoods are within
/// `tolerance` of each other, or once `current_iteration` reaches a positive `max_iterations`.
/// Without a tolerance it stops exactly at `max_iterations`. A NaN or infinite `new_likelihood`
/// always stops the loop, so the caller keeps the last parameters it computed.
pub fn check_convergence(
    old_likelihood: f64,
    new_likelihood: f64,
    current_iteration: usize,
    max_iterations: usize,
    tolerance: f64,
) -> bool {
    if !new_likelihood.is_finite() {
        return true;
    }
    if tolerance > 0.0 {
        (old_likelihood - new_likelihood).abs() <= tolerance
            || (max_iterations > 0 && current_iteration >= max_iterations)
    } else {
        current_iteration == max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_met() {
        assert!(check_convergence(0.5, 0.5, 1, 10, 0.01));
    }

    #[test]
    fn budget_remaining() {
        assert!(!check_convergence(1.0, 0.8, 1, 10, 0.01));
    }

    #[test]
    fn iteration_cap() {
        assert!(check_convergence(1.0, 0.8, 10, 10, 0.01));
        // no cap when max_iterations is zero
        assert!(!check_convergence(1.0, 0.8, 500, 0, 0.01));
    }

    #[test]
    fn breakdown() {
        assert!(check_convergence(1.0, f64::NAN, 1, 10, 0.0));
        assert!(check_convergence(1.0, f64::NEG_INFINITY, 1, 10, 0.01));
    }

    #[test]
    fn zero_tolerance_runs_exactly_to_cap() {
        assert!(!check_convergence(1.0, 1.0, 9, 10, 0.0));
        assert!(check_convergence(1.0, 1.0, 10, 10, 0.0));
        assert!(!check_convergence(1.0, 1.0, 11, 10, 0.0));
    }
}
