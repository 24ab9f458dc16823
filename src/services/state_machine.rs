use crate::models::AppointmentStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
}

/// Validates a status transition.
///
/// Transitions are monotonic: Pending -> {Confirmed, Cancelled},
/// Confirmed -> {Completed, Cancelled}; Completed and Cancelled are terminal.
/// Re-applying the current status is rejected too, so cancelling an already
/// cancelled appointment fails rather than silently no-oping.
pub fn validate_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), TransitionError> {
    use AppointmentStatus::*;

    if from.is_terminal() {
        return Err(TransitionError::InvalidTransition { from, to });
    }
    match (from, to) {
        (Pending, Confirmed) => Ok(()),
        (Pending, Cancelled) => Ok(()),
        (Confirmed, Completed) => Ok(()),
        (Confirmed, Cancelled) => Ok(()),
        _ => Err(TransitionError::InvalidTransition { from, to }),
    }
}
