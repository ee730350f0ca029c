//! The inclusive window of selectable dates, and the month-navigation rules derived from it.

use chrono::{Datelike as _, Months, NaiveDate};

use crate::date::{first_of_month, month_start};

/// Age-eligibility window, in whole years before "today".
///
/// The selectable range is `[today - max_age_years, today - min_age_years]`.
/// Defaults to 4..=15 years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgeWindow {
    /// The youngest allowed age. The most recent selectable date is `today` minus this many years.
    pub min_age_years: u32,

    /// The oldest allowed age. The earliest selectable date is `today` minus this many years.
    pub max_age_years: u32,
}

impl Default for AgeWindow {
    fn default() -> Self {
        Self {
            min_age_years: 4,
            max_age_years: 15,
        }
    }
}

impl AgeWindow {
    #[inline]
    pub fn new(min_age_years: u32, max_age_years: u32) -> Self {
        Self {
            min_age_years,
            max_age_years,
        }
    }
}

/// Inclusive `[min, max]` range of selectable dates.
///
/// A range with `min > max` is empty: nothing is selectable and both month buttons are disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    #[inline]
    pub fn new(min: NaiveDate, max: NaiveDate) -> Self {
        Self { min, max }
    }

    /// The range of birth dates for someone aged within `window` on `today`.
    ///
    /// Shifting Feb 29 into a non-leap year lands on Feb 28.
    pub fn from_age_window(today: NaiveDate, window: AgeWindow) -> Self {
        Self {
            min: years_before(today, window.max_age_years),
            max: years_before(today, window.min_age_years),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Inclusive at both ends. Always `false` for an empty range.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    /// `date` if it is in range, otherwise the nearer bound.
    ///
    /// An empty range has no valid answer; it pins everything to `max`.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        if self.is_empty() || date > self.max {
            self.max
        } else if date < self.min {
            self.min
        } else {
            date
        }
    }

    /// Is there a month before `view_month` that we may show?
    ///
    /// `false` when the first of the previous month is before the first of `min`'s month.
    pub fn can_show_previous_month(&self, view_month: NaiveDate) -> bool {
        if self.is_empty() {
            return false;
        }
        first_of_month(view_month)
            .checked_sub_months(Months::new(1))
            .is_some_and(|previous| previous >= first_of_month(self.min))
    }

    /// Is there a month after `view_month` that we may show?
    ///
    /// `false` when the first of the next month is after `max`.
    pub fn can_show_next_month(&self, view_month: NaiveDate) -> bool {
        if self.is_empty() {
            return false;
        }
        first_of_month(view_month)
            .checked_add_months(Months::new(1))
            .is_some_and(|next| next <= self.max)
    }

    /// The first of the month of `date`, pulled inside `[min's month, max's month]`.
    pub fn clamp_view_month(&self, date: NaiveDate) -> NaiveDate {
        let first = first_of_month(date);
        let lowest = first_of_month(self.min);
        let highest = first_of_month(self.max);
        if self.is_empty() || first > highest {
            highest
        } else if first < lowest {
            lowest
        } else {
            first
        }
    }

    fn view_month_in_bounds(&self, month: NaiveDate) -> bool {
        !self.is_empty() && first_of_month(self.min) <= month && month <= first_of_month(self.max)
    }

    /// The years offered by the year selector, oldest first.
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        let (first, last) = if self.is_empty() {
            (1, 0)
        } else {
            (self.min.year(), self.max.year())
        };
        first..=last
    }

    /// Where the view goes when the month selector picks `month` (`1..=12`).
    ///
    /// The view's year is kept unless that would leave the range, in which case the year of the
    /// bound it crossed is used instead. `None` if even that is out of range.
    pub fn view_for_month_selection(&self, view_month: NaiveDate, month: u32) -> Option<NaiveDate> {
        let mut year = view_month.year();
        let candidate = month_start(year, month)?;
        if candidate < first_of_month(self.min) {
            year = self.min.year();
        }
        if candidate > first_of_month(self.max) {
            year = self.max.year();
        }
        month_start(year, month).filter(|target| self.view_month_in_bounds(*target))
    }

    /// Where the view goes when the year selector picks `year`, or `None` if that month is out of range.
    pub fn view_for_year_selection(&self, view_month: NaiveDate, year: i32) -> Option<NaiveDate> {
        month_start(year, view_month.month()).filter(|target| self.view_month_in_bounds(*target))
    }
}

fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    years
        .checked_mul(12)
        .and_then(|months| today.checked_sub_months(Months::new(months)))
        .unwrap_or(NaiveDate::MIN)
}
