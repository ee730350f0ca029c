//! A date text field for [`egui`](https://github.com/emilk/egui) with a keyboard-navigable calendar popover.
//!
//! The field holds a `YYYY-MM-DD` string owned by the host. Focusing or clicking it opens a
//! month calendar (Monday first) limited to a [`DateRange`], by default everyone aged 4 to 15
//! years today. Days outside the range are shown but cannot be picked.
//!
//! The calendar logic is plain data and can be used without egui:
//! [`MonthGrid`] lays out a month, [`Cursor`] moves the keyboard tab stop,
//! and [`PickerState`] is the open/close state machine driven by [`PickerEvent`]s.
//!
//! ## Keyboard
//! | Key | In the calendar |
//! | --- | --- |
//! | Arrows | Previous/next day or week |
//! | Page up / Page down | Same day of the previous/next month |
//! | Home / End | First/last day of the month |
//! | Enter / Space | Pick the focused day |
//! | Escape | Close without picking |
//! | Tab / Shift+Tab | Cycle through the calendar's controls |
//!
//! Arrow down in the text field moves focus into the calendar.
//!
//! ## Feature flags
//! * `serde`: `Serialize`/`Deserialize` for [`AgeWindow`] and [`ClosePolicy`].

mod controller;
mod date;
mod focus;
mod grid;
mod navigation;
mod range;
mod widget;

pub use crate::controller::{ClosePolicy, Effect, PickerEvent, PickerState};
pub use crate::date::{ParseDateError, format_date, parse_date, try_parse_date};
pub use crate::grid::{Day, MonthGrid, WEEKDAY_LABELS};
pub use crate::navigation::{Cursor, Navigation};
pub use crate::range::{AgeWindow, DateRange};
pub use crate::widget::{DatePickerField, DatePickerResponse};
