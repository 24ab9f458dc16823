use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open time range `[start, end)`.
///
/// Two ranges that only touch at an endpoint do not overlap, so an
/// appointment ending at 10:00 never conflicts with one starting at 10:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range starting at `start` and lasting `minutes`.
    pub fn from_duration(start: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, min, 0).unwrap()
    }

    #[test]
    fn test_overlapping_ranges() {
        let a = TimeRange::new(at(9, 0), at(9, 30));
        let b = TimeRange::new(at(9, 15), at(9, 45));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_contained_range_overlaps() {
        let outer = TimeRange::new(at(9, 0), at(11, 0));
        let inner = TimeRange::new(at(9, 30), at(10, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let a = TimeRange::new(at(9, 0), at(10, 0));
        let b = TimeRange::new(at(10, 0), at(11, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        let a = TimeRange::new(at(9, 0), at(9, 30));
        let b = TimeRange::new(at(14, 0), at(15, 0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_from_duration() {
        let range = TimeRange::from_duration(at(9, 0), 45);
        assert_eq!(range.end, at(9, 45));
        assert_eq!(range.duration_minutes(), 45);
    }
}
