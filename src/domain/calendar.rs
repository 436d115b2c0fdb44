//! Work calendar
//!
//! Business hours for a single working day: open, lunch break, close. Every
//! day of the week follows the same rules. All timestamps are local wall-clock
//! time; there is no timezone handling.
//!
//! # Advancing
//!
//! [`WorkCalendar::advance`] walks forward from a timestamp, consuming working
//! time only:
//!
//! ```text
//!   start ───── lunch_start ░░░░ lunch_end ───── end   (next day) start ──
//!   [ morning window      )      [ afternoon window )
//! ```
//!
//! Results always land inside `[start, lunch_start)` or `[lunch_end, end)`.
//! A result that would fall exactly on `lunch_start` is moved to `lunch_end`,
//! and one that would fall exactly on `end` is moved to the next opening.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Hour boundaries of a working day (0-23)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkCalendarConfig {
    pub start_hour: u32,
    pub end_hour: u32,
    pub lunch_start: u32,
    pub lunch_end: u32,
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 18,
            lunch_start: 13,
            lunch_end: 14,
        }
    }
}

impl WorkCalendarConfig {
    /// Requires `start_hour < lunch_start < lunch_end < end_hour <= 23`
    pub fn validate(&self) -> Result<(), EngineError> {
        let Self {
            start_hour,
            end_hour,
            lunch_start,
            lunch_end,
        } = *self;

        if [start_hour, end_hour, lunch_start, lunch_end]
            .iter()
            .any(|h| *h > 23)
        {
            return Err(EngineError::InvalidCalendarConfig(format!(
                "hours must be between 0 and 23 (got start {}, end {}, lunch {}-{})",
                start_hour, end_hour, lunch_start, lunch_end
            )));
        }

        if !(start_hour < lunch_start && lunch_start < lunch_end && lunch_end < end_hour) {
            return Err(EngineError::InvalidCalendarConfig(format!(
                "expected start < lunch start < lunch end < end, got {} < {} < {} < {}",
                start_hour, lunch_start, lunch_end, end_hour
            )));
        }

        Ok(())
    }

    /// Working minutes in one day, lunch excluded
    pub fn daily_minutes(&self) -> i64 {
        (i64::from(self.end_hour) - i64::from(self.start_hour)) * 60
            - (i64::from(self.lunch_end) - i64::from(self.lunch_start)) * 60
    }
}

/// A validated work calendar
///
/// Construction fails for malformed hours, so [`advance`](Self::advance)
/// never has to deal with an empty working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCalendar {
    config: WorkCalendarConfig,
}

impl WorkCalendar {
    pub fn new(config: WorkCalendarConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorkCalendarConfig {
        &self.config
    }

    fn at(&self, day: NaiveDate, hour: u32) -> NaiveDateTime {
        // Hours are validated to 0-23 at construction
        day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
    }

    fn next_opening(&self, from: NaiveDateTime) -> Result<NaiveDateTime, EngineError> {
        let next = from
            .date()
            .checked_add_days(Days::new(1))
            .ok_or(EngineError::CalendarOverflow(from))?;
        Ok(self.at(next, self.config.start_hour))
    }

    /// Returns true if `ts` is inside a working window
    pub fn is_working_time(&self, ts: NaiveDateTime) -> bool {
        let hour = ts.hour();
        let c = &self.config;
        (c.start_hour <= hour && hour < c.lunch_start) || (c.lunch_end <= hour && hour < c.end_hour)
    }

    /// Moves `ts` forward to the nearest working instant (identity if already working)
    ///
    /// Fails only when the next opening is past the last representable date.
    pub fn clamp(&self, ts: NaiveDateTime) -> Result<NaiveDateTime, EngineError> {
        let day = ts.date();
        let c = &self.config;

        if ts < self.at(day, c.start_hour) {
            Ok(self.at(day, c.start_hour))
        } else if ts >= self.at(day, c.end_hour) {
            self.next_opening(ts)
        } else if ts >= self.at(day, c.lunch_start) && ts < self.at(day, c.lunch_end) {
            Ok(self.at(day, c.lunch_end))
        } else {
            Ok(ts)
        }
    }

    /// Advances `from` by `minutes` of working time
    ///
    /// Every day has the same working length, so whole days are skipped in one
    /// step and the walk below crosses at most one day of windows.
    pub fn advance(&self, from: NaiveDateTime, minutes: f64) -> Result<NaiveDateTime, EngineError> {
        let mut remaining = minutes_to_duration(minutes)?;
        let mut cursor = self.clamp(from)?;
        let c = &self.config;

        let daily_ms = c.daily_minutes() * 60_000;
        let whole_days = remaining.num_milliseconds() / daily_ms;
        if whole_days > 0 {
            let day = cursor
                .date()
                .checked_add_days(Days::new(whole_days.unsigned_abs()))
                .ok_or(EngineError::CalendarOverflow(from))?;
            cursor = day.and_time(cursor.time());
            remaining = Duration::milliseconds(remaining.num_milliseconds() % daily_ms);
        }

        loop {
            let day = cursor.date();
            let lunch_start = self.at(day, c.lunch_start);

            // cursor is never inside lunch after a clamp, so each window is non-empty
            let boundary = if cursor < lunch_start {
                lunch_start
            } else {
                self.at(day, c.end_hour)
            };
            let window = boundary - cursor;

            if remaining <= window {
                let landed = cursor
                    .checked_add_signed(remaining)
                    .ok_or(EngineError::CalendarOverflow(from))?;
                return self
                    .clamp(landed)
                    .map_err(|_| EngineError::CalendarOverflow(from));
            }

            remaining -= window;
            cursor = if boundary == lunch_start {
                self.at(day, c.lunch_end)
            } else {
                self.next_opening(cursor)
                    .map_err(|_| EngineError::CalendarOverflow(from))?
            };
        }
    }
}

fn minutes_to_duration(minutes: f64) -> Result<Duration, EngineError> {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(EngineError::InvalidDuration(minutes));
    }
    // Millisecond precision keeps fractional minutes exact (57.5 -> 57m30s)
    let millis = (minutes * 60_000.0).round();
    if millis > i64::MAX as f64 {
        return Err(EngineError::InvalidDuration(minutes));
    }
    Ok(Duration::milliseconds(millis as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shop() -> WorkCalendar {
        WorkCalendar::new(WorkCalendarConfig::default()).unwrap()
    }

    /// 2026-10-19 is a Monday
    fn monday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn tuesday(h: u32, m: u32, s: u32) -> NaiveDateTime {
        monday(h, m, s) + Duration::days(1)
    }

    #[test]
    fn stays_before_lunch() {
        assert_eq!(shop().advance(monday(9, 0, 0), 57.5).unwrap(), monday(9, 57, 30));
    }

    #[test]
    fn skips_lunch() {
        assert_eq!(shop().advance(monday(12, 50, 0), 20.0).unwrap(), monday(14, 10, 0));
    }

    #[test]
    fn rolls_to_next_morning() {
        assert_eq!(shop().advance(monday(17, 55, 0), 30.0).unwrap(), tuesday(8, 25, 0));
    }

    #[test]
    fn early_start_clamps_to_opening() {
        assert_eq!(shop().advance(monday(6, 30, 0), 15.0).unwrap(), monday(8, 15, 0));
    }

    #[test]
    fn after_hours_start_rolls_to_next_day() {
        assert_eq!(shop().advance(monday(19, 0, 0), 60.0).unwrap(), tuesday(9, 0, 0));
    }

    #[test]
    fn start_at_lunch_jumps_to_lunch_end() {
        assert_eq!(shop().advance(monday(13, 0, 0), 5.0).unwrap(), monday(14, 5, 0));
        assert_eq!(shop().advance(monday(13, 40, 0), 5.0).unwrap(), monday(14, 5, 0));
    }

    #[test]
    fn landing_on_lunch_start_moves_to_lunch_end() {
        assert_eq!(shop().advance(monday(12, 0, 0), 60.0).unwrap(), monday(14, 0, 0));
    }

    #[test]
    fn landing_on_close_moves_to_next_opening() {
        assert_eq!(shop().advance(monday(17, 0, 0), 60.0).unwrap(), tuesday(8, 0, 0));
    }

    #[test]
    fn multi_day_job() {
        // 9h per day; 20h from Monday 08:00 = Mon 9h + Tue 9h + 2h on Wednesday
        let wednesday = monday(10, 0, 0) + Duration::days(2);
        assert_eq!(shop().advance(monday(8, 0, 0), 20.0 * 60.0).unwrap(), wednesday);
    }

    #[test]
    fn long_job_skips_whole_days() {
        // 1000 working days of 9h land on the same wall-clock time
        let from = monday(10, 0, 0);
        assert_eq!(
            shop().advance(from, 540.0 * 1000.0).unwrap(),
            from + Duration::days(1000)
        );
        assert_eq!(
            shop().advance(from, 540.0 * 1000.0 + 200.0).unwrap(),
            monday(14, 20, 0) + Duration::days(1000)
        );
    }

    #[test]
    fn whole_day_skip_matches_walk_from_afternoon() {
        // Tue 16:00 + 2 days + 3h: Thu 16:00 -> close at 18:00, Fri 08:00 + 1h
        let from = tuesday(16, 0, 0);
        let friday = monday(9, 0, 0) + Duration::days(4);
        assert_eq!(shop().advance(from, 540.0 * 2.0 + 180.0).unwrap(), friday);
    }

    #[test]
    fn start_on_last_date_after_close_overflows() {
        let from = NaiveDate::MAX.and_hms_opt(17, 0, 0).unwrap();
        assert_eq!(
            shop().advance(from, 120.0),
            Err(EngineError::CalendarOverflow(from))
        );
        assert_eq!(
            shop().clamp(NaiveDate::MAX.and_hms_opt(19, 0, 0).unwrap()),
            Err(EngineError::CalendarOverflow(
                NaiveDate::MAX.and_hms_opt(19, 0, 0).unwrap()
            ))
        );
    }

    #[test]
    fn huge_duration_overflows_instead_of_saturating() {
        let from = monday(9, 0, 0);
        assert_eq!(
            shop().advance(from, 2e9 * 60.0),
            Err(EngineError::CalendarOverflow(from))
        );
    }

    #[test]
    fn zero_minutes_on_valid_instant_is_identity() {
        let ts = monday(10, 17, 42) + Duration::milliseconds(250);
        assert_eq!(shop().advance(ts, 0.0).unwrap(), ts);
    }

    #[test]
    fn zero_minutes_outside_hours_clamps_forward() {
        assert_eq!(shop().advance(monday(5, 0, 0), 0.0).unwrap(), monday(8, 0, 0));
        assert_eq!(shop().advance(monday(13, 30, 0), 0.0).unwrap(), monday(14, 0, 0));
        assert_eq!(shop().advance(monday(18, 0, 0), 0.0).unwrap(), tuesday(8, 0, 0));
    }

    #[test]
    fn negative_minutes_are_rejected() {
        assert_eq!(
            shop().advance(monday(9, 0, 0), -1.0),
            Err(EngineError::InvalidDuration(-1.0))
        );
    }

    #[test]
    fn invalid_configs_are_rejected_at_construction() {
        let cases = [
            (8, 18, 14, 13),  // lunch reversed
            (8, 18, 13, 13),  // empty lunch
            (8, 12, 13, 14),  // lunch after close
            (10, 18, 9, 11),  // lunch before open
            (18, 8, 13, 14),  // end before start
            (8, 24, 13, 14),  // hour out of range
        ];
        for (start_hour, end_hour, lunch_start, lunch_end) in cases {
            let config = WorkCalendarConfig {
                start_hour,
                end_hour,
                lunch_start,
                lunch_end,
            };
            assert!(
                matches!(
                    WorkCalendar::new(config),
                    Err(EngineError::InvalidCalendarConfig(_))
                ),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn daily_minutes_excludes_lunch() {
        assert_eq!(WorkCalendarConfig::default().daily_minutes(), 540);
    }

    fn arb_config() -> impl Strategy<Value = WorkCalendarConfig> {
        (0u32..20)
            .prop_flat_map(|start| (Just(start), (start + 1)..22))
            .prop_flat_map(|(start, lunch_start)| {
                (Just(start), Just(lunch_start), (lunch_start + 1)..23)
            })
            .prop_flat_map(|(start, lunch_start, lunch_end)| {
                (Just(start), Just(lunch_start), Just(lunch_end), (lunch_end + 1)..24)
            })
            .prop_map(|(start_hour, lunch_start, lunch_end, end_hour)| WorkCalendarConfig {
                start_hour,
                end_hour,
                lunch_start,
                lunch_end,
            })
    }

    proptest! {
        #[test]
        fn result_is_always_working_time(
            config in arb_config(),
            offset_secs in 0i64..(7 * 86_400),
            minutes in 0.0f64..20_000.0,
        ) {
            let calendar = WorkCalendar::new(config).unwrap();
            let from = monday(0, 0, 0) + Duration::seconds(offset_secs);
            let result = calendar.advance(from, minutes).unwrap();

            prop_assert!(calendar.is_working_time(result), "{} -> {}", from, result);
            prop_assert!(result >= from);
        }

        #[test]
        fn zero_advance_keeps_working_instants(
            offset_secs in 0i64..86_400,
        ) {
            let calendar = shop();
            let from = monday(0, 0, 0) + Duration::seconds(offset_secs);
            let result = calendar.advance(from, 0.0).unwrap();

            if calendar.is_working_time(from) {
                prop_assert_eq!(result, from);
            } else {
                prop_assert!(calendar.is_working_time(result));
                prop_assert!(result > from);
            }
        }
    }
}
