//! Laying out one month as whole Monday-first weeks.

use chrono::{Datelike as _, NaiveDate, Weekday};

use crate::date::{add_days, days_in_month, first_of_month};
use crate::range::DateRange;

/// Column headers, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A grid always has at least this many weeks, so the popover does not change height
/// for the rare February that fits in four.
const MIN_WEEKS: usize = 5;

/// One cell of the calendar grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Day {
    pub date: NaiveDate,

    /// Belongs to the displayed month (as opposed to a leading/trailing day of a neighbor).
    pub in_month: bool,

    pub is_today: bool,

    /// Equal to the committed value.
    pub is_selected: bool,

    /// Outside the selectable range.
    pub is_disabled: bool,

    /// Saturday or Sunday.
    pub is_weekend: bool,
}

/// The days shown for one month: whole Monday-to-Sunday weeks, 5 or 6 of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthGrid {
    view_month: NaiveDate,
    days: Vec<Day>,
}

impl MonthGrid {
    /// Lay out the month containing `view_month`.
    pub fn new(
        view_month: NaiveDate,
        range: &DateRange,
        today: NaiveDate,
        selection: Option<NaiveDate>,
    ) -> Self {
        let first = first_of_month(view_month);
        let leading = first.weekday().num_days_from_monday() as usize;
        let cells = leading + days_in_month(first) as usize;
        let weeks = cells.div_ceil(7).max(MIN_WEEKS);
        let grid_start = add_days(first, -(leading as i64));

        let days = (0..weeks * 7)
            .map(|i| {
                let date = add_days(grid_start, i as i64);
                Day {
                    date,
                    in_month: date.year() == first.year() && date.month() == first.month(),
                    is_today: date == today,
                    is_selected: selection == Some(date),
                    is_disabled: !range.contains(date),
                    is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                }
            })
            .collect();

        Self {
            view_month: first,
            days,
        }
    }

    /// The first of the displayed month.
    #[inline]
    pub fn view_month(&self) -> NaiveDate {
        self.view_month
    }

    /// All cells, row by row.
    #[inline]
    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// Rows of exactly seven days, Monday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[Day]> {
        self.days.chunks(7)
    }

    #[inline]
    pub fn num_weeks(&self) -> usize {
        self.days.len() / 7
    }

    /// The cell showing `date`, if it is on this grid.
    pub fn day(&self, date: NaiveDate) -> Option<&Day> {
        self.days.iter().find(|day| day.date == date)
    }
}
