use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// A calendar window, by day and month, outside of which no heating demand is assumed.
///
/// The window may wrap across the turn of the year (e.g. October to April).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HeatingPeriod {
    #[validate(minimum = 1)]
    #[validate(maximum = 31)]
    pub start_day: u32,
    #[validate(minimum = 1)]
    #[validate(maximum = 12)]
    pub start_month: u32,
    #[validate(minimum = 1)]
    #[validate(maximum = 31)]
    pub end_day: u32,
    #[validate(minimum = 1)]
    #[validate(maximum = 12)]
    pub end_month: u32,
}

impl HeatingPeriod {
    pub fn new(start_day: u32, start_month: u32, end_day: u32, end_month: u32) -> Self {
        Self {
            start_day,
            start_month,
            end_day,
            end_month,
        }
    }

    fn start_code(&self) -> u32 {
        date_code(self.start_month, self.start_day)
    }

    fn end_code(&self) -> u32 {
        date_code(self.end_month, self.end_day)
    }

    pub fn wraps_year_end(&self) -> bool {
        self.start_code() > self.end_code()
    }

    /// Whether the calendar day of the timestamp lies within the period, boundaries included.
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let current = date_code(timestamp.month(), timestamp.day());
        let (start, end) = (self.start_code(), self.end_code());

        if self.wraps_year_end() {
            current >= start || current <= end
        } else {
            (start..=end).contains(&current)
        }
    }
}

/// Encode a calendar day as month * 100 + day, so that Oct 1 is 1001 and Apr 30 is 430.
fn date_code(month: u32, day: u32) -> u32 {
    month * 100 + day
}

/// Every hour is in period when no heating period is configured.
pub fn in_period(timestamp: &NaiveDateTime, heating_period: Option<&HeatingPeriod>) -> bool {
    heating_period.map_or(true, |period| period.contains(timestamp))
}
