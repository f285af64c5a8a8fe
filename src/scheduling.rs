//! Room availability: a half-open interval test over a room's blocked slots
//! and booked meetings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::models::{BlockedSlot, Meeting};
use crate::error::{AppError, AppResult};

/// A `[start, end)` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::validation("End time must be after start time"));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }
}

/// Touching ranges (one ends exactly when the other starts) do not overlap.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && a.end > b.start
}

/// Anything that occupies a room for a span of time.
pub trait Occupies {
    fn occupied(&self) -> Interval;
}

impl Occupies for BlockedSlot {
    fn occupied(&self) -> Interval {
        Interval {
            start: self.starts_at,
            end: self.ends_at,
        }
    }
}

impl Occupies for Meeting {
    fn occupied(&self) -> Interval {
        Interval {
            start: self.starts_at,
            end: self.ends_at,
        }
    }
}

impl Occupies for Interval {
    fn occupied(&self) -> Interval {
        *self
    }
}

/// True when nothing in `busy` overlaps `requested`.
pub fn is_free<'a, T, I>(requested: &Interval, busy: I) -> bool
where
    T: Occupies + 'a,
    I: IntoIterator<Item = &'a T>,
{
    busy.into_iter().all(|item| !overlaps(&item.occupied(), requested))
}

/// A room is available when neither a blocked slot nor a booked meeting
/// overlaps the requested range.
pub fn is_available(requested: &Interval, blocked: &[BlockedSlot], meetings: &[Meeting]) -> bool {
    is_free(requested, blocked) && is_free(requested, meetings)
}

/// Availability for moving an existing booking: the meeting being moved
/// never conflicts with itself.
pub fn is_available_excluding(
    requested: &Interval,
    blocked: &[BlockedSlot],
    meetings: &[Meeting],
    excluding: Option<Uuid>,
) -> bool {
    is_free(requested, blocked)
        && is_free(
            requested,
            meetings.iter().filter(|m| Some(m.id) != excluding),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn span(from: (u32, u32), to: (u32, u32)) -> Interval {
        Interval::new(at(from.0, from.1), at(to.0, to.1)).unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_ranges() {
        assert!(Interval::new(at(10, 0), at(10, 0)).is_err());
        assert!(Interval::new(at(11, 0), at(10, 0)).is_err());
    }

    #[test]
    fn booked_hour_blocks_overlap_but_not_the_next_hour() {
        let booked = [span((10, 0), (11, 0))];
        assert!(!is_free(&span((10, 30), (11, 30)), &booked));
        assert!(is_free(&span((11, 0), (12, 0)), &booked));
    }

    #[test]
    fn touching_ranges_are_free_in_both_directions() {
        let morning = span((9, 0), (10, 0));
        let late = span((10, 0), (11, 0));
        assert!(!overlaps(&morning, &late));
        assert!(!overlaps(&late, &morning));
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (span((9, 0), (12, 0)), span((10, 0), (11, 0))),
            (span((9, 0), (10, 30)), span((10, 0), (11, 0))),
            (span((8, 0), (9, 0)), span((13, 0), (14, 0))),
            (span((10, 0), (11, 0)), span((10, 0), (11, 0))),
        ];
        for (a, b) in cases {
            assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
            assert_eq!(overlaps(&a, &b), a.start < b.end && a.end > b.start);
        }
    }

    #[test]
    fn containment_counts_as_overlap() {
        assert!(span((9, 0), (12, 0)).overlaps(&span((10, 0), (10, 15))));
    }
}
