//! Pure transition-permission table for the form lifecycle.
//!
//! The machine consults this table before every state change; an event
//! whose target is not permitted from the current state is a bug signal,
//! reported through the machine's error type rather than silently applied.

use super::state::FormState;

/// Check whether the lifecycle permits moving from `from` to `to` (pure).
///
/// Same-state moves are always permitted (and treated as no-ops by the
/// machine). Any state may return to `Idle`: that covers cancellation of
/// an in-flight operation and a full reset.
///
/// # Example
///
/// ```rust
/// use formwork::core::transition::is_permitted;
/// use formwork::FormState;
///
/// assert!(is_permitted(FormState::Idle, FormState::Validating));
/// assert!(is_permitted(FormState::Submitting, FormState::Idle));
/// assert!(!is_permitted(FormState::Idle, FormState::Submitting));
/// ```
pub fn is_permitted(from: FormState, to: FormState) -> bool {
    use FormState::*;

    if from == to {
        return true;
    }

    matches!(
        (from, to),
        (_, Idle)
            | (Idle | Submitted | Error, Validating)
            | (Validating, Submitting)
            | (Submitting, Submitted | Error)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use FormState::*;

    const ALL: [FormState; 6] = [WaitingInit, Idle, Validating, Submitting, Submitted, Error];

    #[test]
    fn same_state_is_always_permitted() {
        for state in ALL {
            assert!(is_permitted(state, state));
        }
    }

    #[test]
    fn every_state_may_return_to_idle() {
        for state in ALL {
            assert!(is_permitted(state, Idle));
        }
    }

    #[test]
    fn submitting_is_only_reachable_from_validating() {
        for from in ALL {
            assert_eq!(is_permitted(from, Submitting), from == Validating || from == Submitting);
        }
    }

    #[test]
    fn terminal_outcomes_only_follow_submitting() {
        for from in ALL {
            if from == Submitting {
                assert!(is_permitted(from, Submitted));
                assert!(is_permitted(from, Error));
            } else {
                assert_eq!(is_permitted(from, Submitted), from == Submitted);
                assert_eq!(is_permitted(from, Error), from == Error);
            }
        }
    }

    #[test]
    fn resumable_states_may_start_validating() {
        assert!(is_permitted(Idle, Validating));
        assert!(is_permitted(Submitted, Validating));
        assert!(is_permitted(Error, Validating));
        assert!(!is_permitted(WaitingInit, Validating));
        assert!(!is_permitted(Submitting, Validating));
    }

    #[test]
    fn nothing_returns_to_waiting_init() {
        for from in ALL {
            assert_eq!(is_permitted(from, WaitingInit), from == WaitingInit);
        }
    }
}
