//! Delivery projection: estimate minutes + work calendar -> delivery timestamp

use chrono::NaiveDateTime;

use super::calendar::WorkCalendar;
use super::clock::Clock;
use super::error::EngineError;

pub struct DeliveryProjector<'a, C: Clock> {
    calendar: &'a WorkCalendar,
    clock: C,
}

impl<'a, C: Clock> DeliveryProjector<'a, C> {
    pub fn new(calendar: &'a WorkCalendar, clock: C) -> Self {
        Self { calendar, clock }
    }

    /// The instant projections start from (order creation time)
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Delivery time for `total_minutes` of work starting from an explicit instant
    pub fn project_from(
        &self,
        total_minutes: f64,
        from: NaiveDateTime,
    ) -> Result<NaiveDateTime, EngineError> {
        let delivery = self.calendar.advance(from, total_minutes)?;
        tracing::debug!(%from, total_minutes, %delivery, "projected delivery");
        Ok(delivery)
    }

    /// Delivery time for `total_minutes` of work starting now
    pub fn project(&self, total_minutes: f64) -> Result<NaiveDateTime, EngineError> {
        self.project_from(total_minutes, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::WorkCalendarConfig;
    use crate::domain::clock::FixedClock;
    use chrono::NaiveDate;

    fn monday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn project_uses_injected_now() {
        let calendar = WorkCalendar::new(WorkCalendarConfig::default()).unwrap();
        let projector = DeliveryProjector::new(&calendar, FixedClock(monday(12, 50)));

        assert_eq!(projector.now(), monday(12, 50));
        assert_eq!(projector.project(20.0).unwrap(), monday(14, 10));
    }

    #[test]
    fn project_from_ignores_clock() {
        let calendar = WorkCalendar::new(WorkCalendarConfig::default()).unwrap();
        let projector = DeliveryProjector::new(&calendar, FixedClock(monday(17, 0)));

        assert_eq!(projector.project_from(30.0, monday(9, 0)).unwrap(), monday(9, 30));
    }
}
