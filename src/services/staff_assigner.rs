use crate::api::middleware::error::{ApiError, ApiResult};
use crate::models::{StaffMember, TimeRange};
use crate::repository::StaffRepository;
use crate::services::conflict_detector::ConflictDetector;
use serde_json::json;
use std::sync::Arc;

/// Auto-selects a staff member when the request names none.
///
/// Deliberately non-fair: candidates are walked in ascending-id order and the
/// first conflict-free one wins. A least-loaded policy would change
/// observable behavior.
#[derive(Clone)]
pub struct StaffAssigner {
    staff: Arc<dyn StaffRepository>,
    conflicts: ConflictDetector,
}

impl StaffAssigner {
    pub fn new(staff: Arc<dyn StaffRepository>, conflicts: ConflictDetector) -> Self {
        Self { staff, conflicts }
    }

    pub async fn assign(&self, range: &TimeRange) -> ApiResult<StaffMember> {
        let candidates = self.staff.list_bookable().await?;

        for candidate in candidates {
            if !self
                .conflicts
                .has_conflict(&candidate.id, range, None)
                .await?
            {
                tracing::debug!(
                    "Auto-assigned staff {} for {} - {}",
                    candidate.id,
                    range.start,
                    range.end
                );
                return Ok(candidate);
            }
        }

        Err(ApiError::unprocessable(
            "No staff member is available for the requested time",
            json!({
                "reason": "no_staff_available",
                "start": range.start,
                "end": range.end,
            }),
        ))
    }
}
