//! Source of "today" for date rules.

use chrono::Local;
use chrono::NaiveDate;

/// Supplies the current calendar date.
///
/// Date rules compare at day granularity, so only the date matters.
pub trait Calendar: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The host's local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCalendar;

impl Calendar for LocalCalendar {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A calendar pinned to one date. Useful for tests and replaying forms.
#[derive(Debug, Clone, Copy)]
pub struct FixedCalendar(pub NaiveDate);

impl Calendar for FixedCalendar {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
