//! The keyboard cursor: which day cell is the tab stop, and which month is on screen.

use chrono::{Datelike as _, NaiveDate};

use crate::date::{add_days, add_months, days_in_month, first_of_month, last_of_month};
use crate::range::DateRange;

/// A keyboard movement of the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Arrow left: one day back.
    PreviousDay,

    /// Arrow right: one day forward.
    NextDay,

    /// Arrow up: one week back.
    PreviousWeek,

    /// Arrow down: one week forward.
    NextWeek,

    /// Page up: same day of the previous month.
    PreviousMonth,

    /// Page down: same day of the next month.
    NextMonth,

    /// Home: first day of the displayed month.
    StartOfMonth,

    /// End: last day of the displayed month.
    EndOfMonth,
}

impl Navigation {
    pub const ALL: [Self; 8] = [
        Self::PreviousDay,
        Self::NextDay,
        Self::PreviousWeek,
        Self::NextWeek,
        Self::PreviousMonth,
        Self::NextMonth,
        Self::StartOfMonth,
        Self::EndOfMonth,
    ];

    /// The key that triggers this movement.
    pub fn from_key(key: egui::Key) -> Option<Self> {
        use egui::Key;

        Some(match key {
            Key::ArrowLeft => Self::PreviousDay,
            Key::ArrowRight => Self::NextDay,
            Key::ArrowUp => Self::PreviousWeek,
            Key::ArrowDown => Self::NextWeek,
            Key::PageUp => Self::PreviousMonth,
            Key::PageDown => Self::NextMonth,
            Key::Home => Self::StartOfMonth,
            Key::End => Self::EndOfMonth,
            _ => return None,
        })
    }
}

/// The focusable day and the month being displayed.
///
/// The cursor is always inside the [`DateRange`] it was last moved with, and always inside the
/// displayed month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    date: NaiveDate,
    view_month: NaiveDate,
}

impl Cursor {
    /// Put the cursor on `date`, pulled into `range`.
    pub fn new(date: NaiveDate, range: &DateRange) -> Self {
        let date = range.clamp(date);
        Self {
            date,
            view_month: first_of_month(date),
        }
    }

    /// The focusable day.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The first of the displayed month.
    #[inline]
    pub fn view_month(&self) -> NaiveDate {
        self.view_month
    }

    /// Move the cursor. Returns `true` if it moved.
    ///
    /// Targets outside `range` are clamped to it, so pressing a key at a boundary does nothing.
    /// If the cursor ends up in another month, the view follows.
    pub fn navigate(&mut self, navigation: Navigation, range: &DateRange) -> bool {
        let target = match navigation {
            Navigation::PreviousDay => add_days(self.date, -1),
            Navigation::NextDay => add_days(self.date, 1),
            Navigation::PreviousWeek => add_days(self.date, -7),
            Navigation::NextWeek => add_days(self.date, 7),
            Navigation::PreviousMonth => add_months(self.date, -1),
            Navigation::NextMonth => add_months(self.date, 1),
            Navigation::StartOfMonth => first_of_month(self.view_month),
            Navigation::EndOfMonth => last_of_month(self.view_month),
        };
        let target = range.clamp(target);

        let moved = target != self.date;
        self.date = target;
        if first_of_month(target) != self.view_month {
            log::trace!("view follows cursor to {}", first_of_month(target));
            self.view_month = first_of_month(target);
        }
        moved
    }

    /// Show another month (header buttons and selectors).
    ///
    /// The cursor keeps its day of month, shortened to the new month's length and pulled into `range`.
    pub fn show_month(&mut self, month: NaiveDate, range: &DateRange) {
        let month = range.clamp_view_month(month);
        let day = self.date.day().min(days_in_month(month));
        let target = month.with_day(day).unwrap_or(month);
        self.date = range.clamp(target);
        self.view_month = first_of_month(self.date);
    }
}
