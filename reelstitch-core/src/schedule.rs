//! Publish slot computation.
//!
//! Slots come from a repeating list of hours of the day. The hour for an
//! artifact is chosen by its position in the full artifact list, so a given
//! artifact maps to the same hour no matter where a run resumes. Each slot
//! lands on the previous slot's date at that hour, moved one day forward
//! when that would not be strictly later than the previous slot.

use chrono::{DateTime, Days, FixedOffset, NaiveTime, TimeZone};

/// Midnight of `now`'s date, in `offset`.
pub fn start_of_day(now: DateTime<FixedOffset>, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = now.with_timezone(&offset);
    at_hour(local, 0).unwrap_or(local)
}

fn at_hour(day: DateTime<FixedOffset>, hour: u32) -> Option<DateTime<FixedOffset>> {
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    day.timezone()
        .from_local_datetime(&day.date_naive().and_time(time))
        .single()
}

/// Computes the slot following `previous` for the artifact at `position`.
///
/// `hours` must be non-empty with every entry in 0-23; configuration
/// validation guarantees both. Returns `None` otherwise.
pub fn next_slot(
    previous: DateTime<FixedOffset>,
    position: usize,
    hours: &[u32],
    offset: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    if hours.is_empty() {
        return None;
    }
    let previous = previous.with_timezone(&offset);
    let candidate = at_hour(previous, hours[position % hours.len()])?;
    if candidate > previous {
        Some(candidate)
    } else {
        candidate.checked_add_days(Days::new(1))
    }
}

/// The scheduling state carried from one artifact to the next: the last
/// slot handed out and the position of the next artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCursor {
    previous: DateTime<FixedOffset>,
    position: usize,
}

impl ScheduleCursor {
    /// Resumes from a recorded slot, or from midnight of `now` when none was
    /// recorded.
    pub fn resume(
        recorded: Option<DateTime<FixedOffset>>,
        position: usize,
        now: DateTime<FixedOffset>,
        offset: FixedOffset,
    ) -> Self {
        let previous = recorded.unwrap_or_else(|| start_of_day(now, offset));
        Self { previous, position }
    }

    pub fn previous(&self) -> DateTime<FixedOffset> {
        self.previous
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Hands out the slot for the current position and moves past it.
    pub fn advance(&mut self, hours: &[u32], offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        let slot = next_slot(self.previous, self.position, hours, offset)?;
        self.previous = slot;
        self.position += 1;
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOURS: [u32; 3] = [11, 18, 21];

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_first_slots_from_midnight() {
        let mut cursor = ScheduleCursor::resume(None, 0, at("2026-03-10T15:42:00-03:00"), brt());
        assert_eq!(cursor.previous(), at("2026-03-10T00:00:00-03:00"));

        let slots: Vec<_> = (0..4).map(|_| cursor.advance(&HOURS, brt()).unwrap()).collect();
        assert_eq!(
            slots,
            vec![
                at("2026-03-10T11:00:00-03:00"),
                at("2026-03-10T18:00:00-03:00"),
                at("2026-03-10T21:00:00-03:00"),
                at("2026-03-11T11:00:00-03:00"),
            ]
        );
    }

    #[test]
    fn test_equal_candidate_moves_to_next_day() {
        let slot = next_slot(at("2026-03-10T11:00:00-03:00"), 0, &HOURS, brt()).unwrap();
        assert_eq!(slot, at("2026-03-11T11:00:00-03:00"));
    }

    #[test]
    fn test_hour_follows_position_not_run() {
        // Resuming at position 4 uses hours[1] even though it is the run's first slot.
        let mut cursor =
            ScheduleCursor::resume(Some(at("2026-03-11T11:00:00-03:00")), 4, at("2026-01-01T00:00:00Z"), brt());
        assert_eq!(cursor.advance(&HOURS, brt()).unwrap(), at("2026-03-11T18:00:00-03:00"));
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_recorded_slot_in_other_offset_is_converted() {
        let previous = at("2026-03-10T23:30:00Z"); // 20:30 at -03:00
        let slot = next_slot(previous, 2, &HOURS, brt()).unwrap();
        assert_eq!(slot, at("2026-03-10T21:00:00-03:00"));
    }

    #[test]
    fn test_slots_strictly_increase_across_restart() {
        let now = at("2026-03-10T08:00:00-03:00");
        let mut uninterrupted = ScheduleCursor::resume(None, 0, now, brt());
        let expected: Vec<_> = (0..10).map(|_| uninterrupted.advance(&HOURS, brt()).unwrap()).collect();

        let mut first_run = ScheduleCursor::resume(None, 0, now, brt());
        let mut slots: Vec<_> = (0..6).map(|_| first_run.advance(&HOURS, brt()).unwrap()).collect();
        // A later run only knows the recorded slot and where to resume.
        let mut second_run =
            ScheduleCursor::resume(Some(first_run.previous()), 6, at("2026-04-01T12:00:00-03:00"), brt());
        slots.extend((6..10).map(|_| second_run.advance(&HOURS, brt()).unwrap()));

        assert_eq!(slots, expected);
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unordered_hours_never_go_backward() {
        let hours = [21, 9];
        let mut cursor = ScheduleCursor::resume(None, 0, at("2026-03-10T00:00:00-03:00"), brt());
        let slots: Vec<_> = (0..6).map(|_| cursor.advance(&hours, brt()).unwrap()).collect();
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(slots[1], at("2026-03-11T09:00:00-03:00"));
    }

    #[test]
    fn test_empty_hours_yield_none() {
        assert!(next_slot(at("2026-03-10T00:00:00Z"), 0, &[], brt()).is_none());
    }
}
