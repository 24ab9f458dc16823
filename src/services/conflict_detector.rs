use crate::api::middleware::error::ApiResult;
use crate::models::TimeRange;
use crate::repository::AppointmentRepository;
use std::sync::Arc;

/// Staff-level overlap check over active appointments.
#[derive(Clone)]
pub struct ConflictDetector {
    appointments: Arc<dyn AppointmentRepository>,
}

impl ConflictDetector {
    pub fn new(appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { appointments }
    }

    /// True when any active appointment for `staff_id` overlaps `range`.
    /// Half-open semantics: back-to-back appointments are not a conflict.
    pub async fn has_conflict(
        &self,
        staff_id: &str,
        range: &TimeRange,
        exclude_id: Option<&str>,
    ) -> ApiResult<bool> {
        let existing = self
            .appointments
            .active_for_staff(staff_id, exclude_id)
            .await?;
        Ok(existing.iter().any(|a| a.range().overlaps(range)))
    }
}
