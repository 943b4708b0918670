//! Moving an event by a whole number of minutes.

use chrono::Duration;

use crate::event::CalendarEvent;
use crate::time::{Moment, TimedSpan};

/// Returns the event's start and end moved by `offset_minutes`.
///
/// Each timezone annotation is copied to the matching shifted boundary
/// as-is. Returns `None` if the event lacks a start or end instant; callers
/// are expected to have run [`classify`](crate::classify::classify) first.
pub fn apply_shift(event: &CalendarEvent, offset_minutes: i64) -> Option<TimedSpan> {
    let start = event.start_moment()?;
    let end = event.end_moment()?;
    let delta = Duration::try_minutes(offset_minutes)?;

    Some(TimedSpan {
        start: shift_moment(start, delta)?,
        end: shift_moment(end, delta)?,
    })
}

fn shift_moment(moment: &Moment, delta: Duration) -> Option<Moment> {
    Some(Moment {
        at: moment.at.checked_add_signed(delta)?,
        zone: moment.zone.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, d, h, m, 0).unwrap()
    }

    #[test]
    fn shifts_both_boundaries() {
        let event = CalendarEvent::timed("e", "Breakfast", utc(5, 7, 15), utc(5, 7, 45));
        let span = apply_shift(&event, 120).unwrap();
        assert_eq!(span.start.at, utc(5, 9, 15));
        assert_eq!(span.end.at, utc(5, 9, 45));
    }

    #[test]
    fn preserves_duration() {
        let event = CalendarEvent::timed("e", "Run", utc(5, 6, 3), utc(5, 7, 41));
        let original = utc(5, 7, 41) - utc(5, 6, 3);
        for offset in [-600, -1, 0, 1, 17, 59, 60, 1439, 100_000] {
            let span = apply_shift(&event, offset).unwrap();
            assert_eq!(span.duration(), original, "offset {offset}");
        }
    }

    #[test]
    fn preserves_zone_annotations() {
        let mut event = CalendarEvent::timed("e", "Gym", utc(5, 18, 0), utc(5, 19, 0));
        event.start = Some(crate::time::EventTime::annotated(utc(5, 18, 0), "Europe/Berlin"));
        event.end = Some(crate::time::EventTime::annotated(utc(5, 19, 0), "Europe/London"));

        let span = apply_shift(&event, 45).unwrap();
        assert_eq!(span.start.zone.as_ref().unwrap().as_str(), "Europe/Berlin");
        assert_eq!(span.end.zone.as_ref().unwrap().as_str(), "Europe/London");
    }

    #[test]
    fn missing_annotation_stays_missing() {
        let event = CalendarEvent::timed("e", "Gym", utc(5, 18, 0), utc(5, 19, 0));
        let span = apply_shift(&event, 45).unwrap();
        assert!(span.start.zone.is_none());
        assert!(span.end.zone.is_none());
    }

    #[test]
    fn crosses_day_boundary() {
        let event = CalendarEvent::timed("e", "Reading", utc(5, 23, 30), utc(5, 23, 50));
        let span = apply_shift(&event, 45).unwrap();
        assert_eq!(span.start.at, utc(6, 0, 15));
        assert_eq!(span.end.at, utc(6, 0, 35));
    }

    #[test]
    fn crosses_month_boundary() {
        let start = Utc.with_ymd_and_hms(2025, 2, 28, 22, 0, 0).unwrap();
        let event = CalendarEvent::timed("e", "Late work", start, start + Duration::hours(1));
        let span = apply_shift(&event, 180).unwrap();
        assert_eq!(span.start.at, Utc.with_ymd_and_hms(2025, 3, 1, 1, 0, 0).unwrap());
    }

    #[test]
    fn all_day_event_has_no_shift() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
        let event = CalendarEvent::all_day("e", "Vacation", d, d.succ_opt().unwrap());
        assert!(apply_shift(&event, 30).is_none());
    }

    #[test]
    fn missing_end_has_no_shift() {
        let mut event = CalendarEvent::timed("e", "Gym", utc(5, 18, 0), utc(5, 19, 0));
        event.end = None;
        assert!(apply_shift(&event, 30).is_none());
    }
}
