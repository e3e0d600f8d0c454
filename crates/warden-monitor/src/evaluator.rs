use warden_core::{normalize_threshold, ListenerState};

/// Decision produced by one probe evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeEvaluation {
    pub successes: u32,
    pub failures: u32,
    pub should_transition: bool,
    /// Meaningful only when `should_transition` is set; otherwise echoes
    /// the current state
    pub target_state: ListenerState,
}

/// Turn counters and a probe outcome into an evaluation
///
/// This is the whole hysteresis policy: a success resets the failure
/// counter and counts toward Ready, a failure resets the success counter
/// and counts toward Listening. Thresholds at or below zero are treated
/// as 1. The function has no side effects and no clock; evaluating the
/// same input twice yields the same result.
pub fn evaluate(
    prev_successes: u32,
    prev_failures: u32,
    state: ListenerState,
    succeeded: bool,
    success_threshold: u32,
    failure_threshold: u32,
) -> ProbeEvaluation {
    let success_threshold = normalize_threshold(success_threshold);
    let failure_threshold = normalize_threshold(failure_threshold);

    if succeeded {
        let successes = prev_successes + 1;
        let transition = successes >= success_threshold && state != ListenerState::Ready;
        ProbeEvaluation {
            successes,
            failures: 0,
            should_transition: transition,
            target_state: if transition {
                ListenerState::Ready
            } else {
                state
            },
        }
    } else {
        let failures = prev_failures + 1;
        let transition = failures >= failure_threshold && state != ListenerState::Listening;
        ProbeEvaluation {
            successes: 0,
            failures,
            should_transition: transition,
            target_state: if transition {
                ListenerState::Listening
            } else {
                state
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_resets_failures_and_counts_up() {
        let eval = evaluate(0, 2, ListenerState::Listening, true, 3, 3);
        assert_eq!(eval.successes, 1);
        assert_eq!(eval.failures, 0);
        assert!(!eval.should_transition);
    }

    #[test]
    fn test_failure_resets_successes_and_counts_up() {
        let eval = evaluate(2, 0, ListenerState::Ready, false, 3, 3);
        assert_eq!(eval.successes, 0);
        assert_eq!(eval.failures, 1);
        assert!(!eval.should_transition);
    }

    #[test]
    fn test_success_threshold_reached_proposes_ready() {
        let eval = evaluate(1, 0, ListenerState::Listening, true, 2, 3);
        assert_eq!(eval.successes, 2);
        assert!(eval.should_transition);
        assert_eq!(eval.target_state, ListenerState::Ready);
    }

    #[test]
    fn test_already_ready_does_not_retransition() {
        let eval = evaluate(5, 0, ListenerState::Ready, true, 1, 3);
        assert_eq!(eval.successes, 6);
        assert!(!eval.should_transition);
        assert_eq!(eval.target_state, ListenerState::Ready);
    }

    #[test]
    fn test_failure_threshold_reached_proposes_listening() {
        let eval = evaluate(0, 2, ListenerState::Ready, false, 1, 3);
        assert_eq!(eval.failures, 3);
        assert!(eval.should_transition);
        assert_eq!(eval.target_state, ListenerState::Listening);
    }

    #[test]
    fn test_already_listening_does_not_retransition() {
        let eval = evaluate(0, 7, ListenerState::Listening, false, 1, 3);
        assert_eq!(eval.failures, 8);
        assert!(!eval.should_transition);
    }

    #[test]
    fn test_closed_listener_can_be_proposed_listening() {
        // Probes against a closed subject accumulate failures as intended;
        // reaching the budget proposes Listening (which the owner may refuse)
        let eval = evaluate(0, 0, ListenerState::Closed, false, 1, 1);
        assert!(eval.should_transition);
        assert_eq!(eval.target_state, ListenerState::Listening);
    }

    #[test]
    fn test_zero_and_negative_like_thresholds_act_as_one() {
        let eval = evaluate(0, 0, ListenerState::Listening, true, 0, 0);
        assert!(eval.should_transition);
        assert_eq!(eval.target_state, ListenerState::Ready);

        let eval = evaluate(0, 0, ListenerState::Ready, false, 0, 0);
        assert!(eval.should_transition);
        assert_eq!(eval.target_state, ListenerState::Listening);
    }

    #[test]
    fn test_idempotent_for_same_input() {
        let first = evaluate(1, 0, ListenerState::Listening, true, 2, 3);
        let second = evaluate(1, 0, ListenerState::Listening, true, 2, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_counter_mutual_exclusion_holds() {
        // Whatever the input counters claim, the output never has both
        // counters above zero
        for (prev_s, prev_f) in [(0, 0), (3, 0), (0, 3), (2, 2)] {
            for succeeded in [true, false] {
                let eval = evaluate(prev_s, prev_f, ListenerState::Listening, succeeded, 5, 5);
                assert_eq!(eval.successes.min(eval.failures), 0);
            }
        }
    }
}
