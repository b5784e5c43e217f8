use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::database::models::ShiftTemplate;

/// A shift template resolved onto a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Turns a shift template plus a calendar date into absolute start/end
/// instants. When the template's end time is earlier than its start time the
/// shift crosses midnight and the end lands on the next day.
pub fn resolve_shift_window(date: NaiveDate, shift: &ShiftTemplate) -> ShiftWindow {
    let start = date.and_time(shift.start_time);
    let mut end = date.and_time(shift.end_time);
    if shift.is_overnight() {
        end += Duration::days(1);
    }
    ShiftWindow { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn template(start: (u32, u32), end: (u32, u32)) -> ShiftTemplate {
        ShiftTemplate {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "test shift".to_string(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn day_shift_resolves_on_same_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let window = resolve_shift_window(date, &template((8, 0), (17, 0)));

        assert_eq!(window.start, date.and_hms_opt(8, 0, 0).unwrap());
        assert_eq!(window.end, date.and_hms_opt(17, 0, 0).unwrap());
    }

    #[test]
    fn overnight_shift_ends_next_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let window = resolve_shift_window(date, &template((22, 0), (6, 0)));

        assert_eq!(window.start, date.and_hms_opt(22, 0, 0).unwrap());
        assert_eq!(
            window.end,
            NaiveDate::from_ymd_opt(2025, 3, 11)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap()
        );
        assert!(window.end > window.start);
    }
}
