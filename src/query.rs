use chrono::{Datelike, NaiveDate, Weekday};
use std::fmt;

/// Days the exchange does not trade; no floorsheet is published.
pub const CLOSED_DAYS: [Weekday; 3] = [Weekday::Fri, Weekday::Sat, Weekday::Sun];

/// The single search parameter: the trading date whose floorsheet we want.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Query {
    date: NaiveDate,
}

impl Query {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// `MM/DD/YYYY`, as typed into the search form.
    pub fn as_form_value(&self) -> String {
        self.date.format("%m/%d/%Y").to_string()
    }

    /// Form value with slashes replaced by hyphens: `MM-DD-YYYY`.
    pub fn file_stem(&self) -> String {
        self.as_form_value().replace('/', "-")
    }

    pub fn market_closed(&self) -> bool {
        is_closed_day(self.date.weekday())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_form_value())
    }
}

pub fn is_closed_day(day: Weekday) -> bool {
    CLOSED_DAYS.contains(&day)
}
