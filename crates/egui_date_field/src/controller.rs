//! The popover's open/close state machine.
//!
//! Everything here is pure: [`PickerState::handle`] takes a [`PickerEvent`] and returns the
//! [`Effect`]s the rendering layer has to carry out (commit a value, move keyboard focus).

use chrono::NaiveDate;

use crate::date::{format_date, parse_date};
use crate::navigation::{Cursor, Navigation};
use crate::range::DateRange;

/// When does the popover close on its own?
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ClosePolicy {
    /// Close on an outside click or focus change, on Escape, on picking a day,
    /// and as soon as the text field holds a complete, in-range date.
    #[default]
    AutoCloseOnValidInput,

    /// Close only on picking a day or on Escape.
    ///
    /// Typing a valid date still moves the calendar to it, so the user can check it against the
    /// highlighted day before committing.
    CloseOnExplicitSelectionOnly,
}

impl ClosePolicy {
    /// `keep_open_until_select == true` means [`Self::CloseOnExplicitSelectionOnly`].
    #[inline]
    pub fn from_keep_open_until_select(keep_open_until_select: bool) -> Self {
        if keep_open_until_select {
            Self::CloseOnExplicitSelectionOnly
        } else {
            Self::AutoCloseOnValidInput
        }
    }

    fn closes_on_valid_input(self) -> bool {
        self == Self::AutoCloseOnValidInput
    }

    fn closes_on_outside_interaction(self) -> bool {
        self == Self::AutoCloseOnValidInput
    }
}

/// Something the user (or the host) did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerEvent {
    /// The text field gained keyboard focus.
    InputFocused,

    /// The text field was clicked.
    InputClicked,

    /// Arrow down in the text field: move keyboard focus into the grid.
    EnterGrid,

    /// The value changed, by typing or by the host. Carries the new text.
    ValueChanged(String),

    /// A click or a focus change somewhere outside the text field and the popover.
    Outside,

    Escape,

    /// A cursor movement key on the focused day cell.
    Navigate(Navigation),

    /// A day cell was clicked, or Enter/Space was pressed on it.
    Activate(NaiveDate),

    /// The "previous month" header button.
    PreviousMonth,

    /// The "next month" header button.
    NextMonth,

    /// The month selector, `1..=12`.
    SelectMonth(u32),

    /// The year selector.
    SelectYear(i32),
}

/// Something the rendering layer must do after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// A date was picked: write this `YYYY-MM-DD` text into the value, and let the host validate it.
    Commit(String),

    /// Give keyboard focus back to the text field.
    FocusInput,

    /// Give keyboard focus to the cell showing this date.
    FocusCursor(NaiveDate),
}

/// The private state of one date field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerState {
    policy: ClosePolicy,
    open: bool,
    cursor: Cursor,

    /// The value as of the last event, so external changes can be detected.
    value: String,

    /// Focus is being handed back to the text field after Escape or a pick; that focus must not reopen.
    refocusing: bool,

    /// A day cell to focus as soon as the grid lays it out.
    pending_focus: Option<NaiveDate>,
}

impl PickerState {
    pub fn new(policy: ClosePolicy, range: &DateRange, value: &str) -> Self {
        Self {
            policy,
            open: false,
            cursor: initial_cursor(value, range),
            value: value.to_owned(),
            refocusing: false,
            pending_focus: None,
        }
    }

    #[inline]
    pub fn policy(&self) -> ClosePolicy {
        self.policy
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    pub fn cursor(&self) -> NaiveDate {
        self.cursor.date()
    }

    /// The first of the displayed month.
    #[inline]
    pub fn view_month(&self) -> NaiveDate {
        self.cursor.view_month()
    }

    /// The value as last seen by [`Self::handle`].
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Make sure the cursor respects `range`, which is re-derived from the clock every frame.
    pub fn sync_range(&mut self, range: &DateRange) {
        if !range.contains(self.cursor.date())
            || range.clamp_view_month(self.view_month()) != self.view_month()
        {
            self.cursor = Cursor::new(self.cursor.date(), range);
        }
    }

    /// Apply one event.
    pub fn handle(&mut self, event: PickerEvent, range: &DateRange) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            PickerEvent::InputFocused => {
                if std::mem::take(&mut self.refocusing) {
                    log::trace!("focus returned to the text field; staying closed");
                } else {
                    self.open(range);
                }
            }

            PickerEvent::InputClicked => {
                self.refocusing = false;
                self.open(range);
            }

            PickerEvent::EnterGrid => {
                if self.open {
                    effects.push(Effect::FocusCursor(self.cursor.date()));
                }
            }

            PickerEvent::ValueChanged(value) => {
                self.value_changed(value, range);
            }

            PickerEvent::Outside => {
                if self.open && self.policy.closes_on_outside_interaction() {
                    self.close("outside interaction");
                }
            }

            PickerEvent::Escape => {
                if self.open {
                    self.close("escape");
                    self.refocusing = true;
                    effects.push(Effect::FocusInput);
                }
            }

            PickerEvent::Navigate(navigation) => {
                if self.open {
                    if !self.cursor.navigate(navigation, range) {
                        log::debug!("{navigation:?} absorbed at the edge of {range:?}");
                    }
                    effects.push(Effect::FocusCursor(self.cursor.date()));
                }
            }

            PickerEvent::Activate(date) => {
                if !self.open {
                    return effects;
                }
                if range.contains(date) {
                    let text = format_date(date);
                    log::debug!("date committed: {text}");
                    self.value.clone_from(&text);
                    self.cursor = Cursor::new(date, range);
                    self.close("date picked");
                    self.refocusing = true;
                    effects.push(Effect::Commit(text));
                    effects.push(Effect::FocusInput);
                } else {
                    log::debug!("ignoring activation of disabled day {date}");
                }
            }

            PickerEvent::PreviousMonth => {
                if range.can_show_previous_month(self.view_month()) {
                    let month = crate::date::add_months(self.view_month(), -1);
                    self.cursor.show_month(month, range);
                } else {
                    log::debug!("no month before {} in range", self.view_month());
                }
            }

            PickerEvent::NextMonth => {
                if range.can_show_next_month(self.view_month()) {
                    let month = crate::date::add_months(self.view_month(), 1);
                    self.cursor.show_month(month, range);
                } else {
                    log::debug!("no month after {} in range", self.view_month());
                }
            }

            PickerEvent::SelectMonth(month) => {
                match range.view_for_month_selection(self.view_month(), month) {
                    Some(view) => self.cursor.show_month(view, range),
                    None => log::debug!("month {month} is out of range"),
                }
            }

            PickerEvent::SelectYear(year) => {
                match range.view_for_year_selection(self.view_month(), year) {
                    Some(view) => self.cursor.show_month(view, range),
                    None => log::debug!("year {year} is out of range for this month"),
                }
            }
        }

        effects
    }

    /// The text field still has focus from the previous frame.
    ///
    /// Any focus hand-back requested by Escape has then already happened without a focus change,
    /// so the next time the field gains focus it is the user's doing again.
    pub fn input_kept_focus(&mut self) {
        self.refocusing = false;
    }

    /// Focus the cell of `date` once the grid lays it out.
    ///
    /// After a [`Effect::FocusCursor`] the cell may belong to a month that has not been drawn yet,
    /// and a widget must exist before it can hold keyboard focus.
    pub fn defer_cursor_focus(&mut self, date: NaiveDate) {
        if self.open {
            self.pending_focus = Some(date);
        }
    }

    /// The day cell that should take keyboard focus as it is laid out, if any.
    pub fn take_pending_focus(&mut self) -> Option<NaiveDate> {
        self.pending_focus.take()
    }

    fn open(&mut self, range: &DateRange) {
        if self.open {
            return;
        }
        self.cursor = initial_cursor(&self.value, range);
        self.pending_focus = None;
        self.open = true;
        log::debug!("date picker opened at {}", self.cursor.date());
    }

    fn close(&mut self, reason: &str) {
        if self.open {
            self.open = false;
            self.pending_focus = None;
            log::debug!("date picker closed: {reason}");
        }
    }

    fn value_changed(&mut self, value: String, range: &DateRange) {
        if value == self.value {
            return;
        }

        let in_range = parse_date(&value).filter(|date| range.contains(*date));
        self.cursor = initial_cursor(&value, range);
        self.value = value;

        if in_range.is_some() && self.open && self.policy.closes_on_valid_input() {
            self.close("valid date typed");
        }
    }
}

/// The selection if it is in range, otherwise the most recent selectable date.
fn initial_cursor(value: &str, range: &DateRange) -> Cursor {
    let date = parse_date(value)
        .filter(|date| range.contains(*date))
        .unwrap_or(range.max);
    Cursor::new(date, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::AgeWindow;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    /// 2009-06-01 ..= 2020-06-01
    fn range() -> DateRange {
        DateRange::from_age_window(ymd(2024, 6, 1), AgeWindow::default())
    }

    fn focused(policy: ClosePolicy, value: &str) -> PickerState {
        let mut state = PickerState::new(policy, &range(), value);
        assert!(state.handle(PickerEvent::InputFocused, &range()).is_empty());
        assert!(state.is_open());
        state
    }

    #[test]
    fn opening_puts_the_cursor_on_the_latest_allowed_date() {
        let state = focused(ClosePolicy::default(), "");
        assert_eq!(state.cursor(), ymd(2020, 6, 1));
        assert_eq!(state.view_month(), ymd(2020, 6, 1));
    }

    #[test]
    fn opening_puts_the_cursor_on_the_selection() {
        let state = focused(ClosePolicy::default(), "2012-02-29");
        assert_eq!(state.cursor(), ymd(2012, 2, 29));
        assert_eq!(state.view_month(), ymd(2012, 2, 1));
    }

    #[test]
    fn out_of_range_selection_is_not_the_cursor() {
        let state = focused(ClosePolicy::default(), "2022-01-01");
        assert_eq!(state.cursor(), ymd(2020, 6, 1));
    }

    #[test]
    fn typing_a_valid_date_auto_closes() {
        let mut state = focused(ClosePolicy::AutoCloseOnValidInput, "");

        state.handle(PickerEvent::ValueChanged("2020-05-1".to_owned()), &range());
        assert!(state.is_open(), "partial input keeps it open");

        let effects = state.handle(PickerEvent::ValueChanged("2020-05-10".to_owned()), &range());
        assert!(effects.is_empty(), "typing never commits");
        assert!(!state.is_open());
        assert_eq!(state.cursor(), ymd(2020, 5, 10));
        assert_eq!(state.view_month(), ymd(2020, 5, 1));
    }

    #[test]
    fn typing_an_out_of_range_date_keeps_it_open() {
        let mut state = focused(ClosePolicy::AutoCloseOnValidInput, "");
        state.handle(PickerEvent::ValueChanged("2021-05-10".to_owned()), &range());
        assert!(state.is_open());
        assert_eq!(state.cursor(), range().max);
    }

    #[test]
    fn keep_open_until_select() {
        let mut state = focused(ClosePolicy::CloseOnExplicitSelectionOnly, "");

        state.handle(PickerEvent::ValueChanged("2020-05-10".to_owned()), &range());
        assert!(state.is_open(), "a typed date is not a commitment");
        assert_eq!(state.view_month(), ymd(2020, 5, 1), "the grid shows the typed date");
        assert_eq!(state.cursor(), ymd(2020, 5, 10));

        state.handle(PickerEvent::Outside, &range());
        assert!(state.is_open(), "outside clicks do not close");

        let effects = state.handle(PickerEvent::Activate(ymd(2020, 5, 10)), &range());
        assert_eq!(
            effects,
            vec![Effect::Commit("2020-05-10".to_owned()), Effect::FocusInput]
        );
        assert!(!state.is_open());
        assert_eq!(state.value(), "2020-05-10");

        state.handle(PickerEvent::InputFocused, &range());
        assert!(!state.is_open(), "focus returning after a pick does not reopen");
    }

    #[test]
    fn outside_interaction_closes_by_default() {
        let mut state = focused(ClosePolicy::AutoCloseOnValidInput, "");
        state.handle(PickerEvent::Outside, &range());
        assert!(!state.is_open());
    }

    #[test]
    fn escape_closes_without_committing_and_refocuses_the_input() {
        for policy in [
            ClosePolicy::AutoCloseOnValidInput,
            ClosePolicy::CloseOnExplicitSelectionOnly,
        ] {
            let mut state = focused(policy, "2015-01-01");
            state.handle(PickerEvent::Navigate(Navigation::NextDay), &range());

            let effects = state.handle(PickerEvent::Escape, &range());
            assert_eq!(effects, vec![Effect::FocusInput]);
            assert!(!state.is_open());
            assert_eq!(state.value(), "2015-01-01");

            state.handle(PickerEvent::InputFocused, &range());
            assert!(!state.is_open(), "the focus we handed back must not reopen");

            state.handle(PickerEvent::InputFocused, &range());
            assert!(state.is_open(), "a later focus does");
        }
    }

    #[test]
    fn escape_while_typing_does_not_swallow_a_later_focus() {
        let mut state = focused(ClosePolicy::default(), "");
        state.handle(PickerEvent::Escape, &range());

        // The field never lost focus, so nothing was handed back:
        state.input_kept_focus();

        state.handle(PickerEvent::InputFocused, &range());
        assert!(state.is_open());
    }

    #[test]
    fn clicking_the_input_after_escape_reopens() {
        let mut state = focused(ClosePolicy::default(), "");
        state.handle(PickerEvent::Escape, &range());
        state.handle(PickerEvent::InputClicked, &range());
        assert!(state.is_open());
        state.handle(PickerEvent::InputFocused, &range());
        assert!(state.is_open());
    }

    #[test]
    fn escape_while_closed_does_nothing() {
        let mut state = PickerState::new(ClosePolicy::default(), &range(), "");
        assert!(state.handle(PickerEvent::Escape, &range()).is_empty());
        state.handle(PickerEvent::InputFocused, &range());
        assert!(state.is_open(), "no stale refocus flag");
    }

    #[test]
    fn navigation_moves_focus_with_the_cursor() {
        let mut state = focused(ClosePolicy::default(), "2015-03-10");
        let effects = state.handle(PickerEvent::Navigate(Navigation::NextWeek), &range());
        assert_eq!(effects, vec![Effect::FocusCursor(ymd(2015, 3, 17))]);

        let effects = state.handle(PickerEvent::Navigate(Navigation::NextMonth), &range());
        assert_eq!(effects, vec![Effect::FocusCursor(ymd(2015, 4, 17))]);
        assert_eq!(state.view_month(), ymd(2015, 4, 1));
    }

    #[test]
    fn navigation_while_closed_is_ignored() {
        let mut state = PickerState::new(ClosePolicy::default(), &range(), "2015-03-10");
        assert!(
            state
                .handle(PickerEvent::Navigate(Navigation::NextDay), &range())
                .is_empty()
        );
        assert_eq!(state.cursor(), ymd(2015, 3, 10));
    }

    #[test]
    fn cursor_focus_waits_for_the_next_grid() {
        let mut state = focused(ClosePolicy::default(), "");

        // From Monday 2020-06-01 a week back leaves the June grid:
        let effects = state.handle(PickerEvent::Navigate(Navigation::PreviousWeek), &range());
        assert_eq!(effects, vec![Effect::FocusCursor(ymd(2020, 5, 25))]);
        state.defer_cursor_focus(ymd(2020, 5, 25));
        assert_eq!(state.view_month(), ymd(2020, 5, 1));
        assert_eq!(state.take_pending_focus(), Some(ymd(2020, 5, 25)));
        assert_eq!(state.take_pending_focus(), None, "focus is requested once");
    }

    #[test]
    fn closing_drops_a_pending_cursor_focus() {
        let mut state = focused(ClosePolicy::default(), "");
        state.defer_cursor_focus(ymd(2020, 6, 1));
        state.handle(PickerEvent::Escape, &range());
        assert_eq!(state.take_pending_focus(), None);

        state.defer_cursor_focus(ymd(2020, 6, 1));
        assert_eq!(state.take_pending_focus(), None, "nothing to focus while closed");
    }

    #[test]
    fn enter_grid_focuses_the_cursor() {
        let mut state = focused(ClosePolicy::default(), "");
        assert_eq!(
            state.handle(PickerEvent::EnterGrid, &range()),
            vec![Effect::FocusCursor(ymd(2020, 6, 1))]
        );
    }

    #[test]
    fn disabled_days_cannot_be_picked() {
        let mut state = focused(ClosePolicy::default(), "");
        assert!(
            state
                .handle(PickerEvent::Activate(ymd(2020, 6, 2)), &range())
                .is_empty()
        );
        assert!(state.is_open());
    }

    #[test]
    fn exactly_one_commit_per_pick() {
        let mut state = focused(ClosePolicy::default(), "");
        let commits = state
            .handle(PickerEvent::Activate(ymd(2010, 1, 5)), &range())
            .into_iter()
            .filter(|e| matches!(e, Effect::Commit(_)))
            .count();
        assert_eq!(commits, 1);

        // Further activations while closed are stray events from the last frame:
        assert!(
            state
                .handle(PickerEvent::Activate(ymd(2010, 1, 6)), &range())
                .is_empty()
        );
    }

    #[test]
    fn month_buttons() {
        let mut state = focused(ClosePolicy::default(), "");
        assert_eq!(state.view_month(), ymd(2020, 6, 1));

        state.handle(PickerEvent::NextMonth, &range());
        assert_eq!(state.view_month(), ymd(2020, 6, 1), "already at the last month");

        state.handle(PickerEvent::PreviousMonth, &range());
        assert_eq!(state.view_month(), ymd(2020, 5, 1));
        assert_eq!(state.cursor(), ymd(2020, 5, 1));

        for _ in 0..500 {
            state.handle(PickerEvent::PreviousMonth, &range());
        }
        assert_eq!(state.view_month(), ymd(2009, 6, 1));
        assert!(range().contains(state.cursor()));
    }

    #[test]
    fn selectors() {
        let mut state = focused(ClosePolicy::default(), "2015-03-10");

        state.handle(PickerEvent::SelectYear(2012), &range());
        assert_eq!(state.view_month(), ymd(2012, 3, 1));
        assert_eq!(state.cursor(), ymd(2012, 3, 10));

        state.handle(PickerEvent::SelectMonth(11), &range());
        assert_eq!(state.view_month(), ymd(2012, 11, 1));

        state.handle(PickerEvent::SelectYear(2020), &range());
        assert_eq!(state.view_month(), ymd(2012, 11, 1), "November 2020 is out of range");
    }

    #[test]
    fn host_clearing_the_value_resets_the_cursor() {
        let mut state = focused(ClosePolicy::CloseOnExplicitSelectionOnly, "2012-07-07");
        assert_eq!(state.cursor(), ymd(2012, 7, 7));
        state.handle(PickerEvent::ValueChanged(String::new()), &range());
        assert_eq!(state.cursor(), range().max);
        assert_eq!(state.view_month(), ymd(2020, 6, 1));
        assert!(state.is_open());
    }

    #[test]
    fn external_change_while_closed_is_tracked() {
        let mut state = PickerState::new(ClosePolicy::default(), &range(), "");
        state.handle(PickerEvent::ValueChanged("2011-11-11".to_owned()), &range());
        assert!(!state.is_open());
        assert_eq!(state.cursor(), ymd(2011, 11, 11));
        assert_eq!(state.value(), "2011-11-11");
    }

    #[test]
    fn inverted_range_selects_nothing() {
        let range = DateRange::from_age_window(ymd(2024, 6, 1), AgeWindow::new(15, 4));
        let mut state = PickerState::new(ClosePolicy::default(), &range, "");
        state.handle(PickerEvent::InputFocused, &range);
        assert!(state.is_open());
        let cursor = state.cursor();
        assert!(state.handle(PickerEvent::Activate(cursor), &range).is_empty());
        state.handle(PickerEvent::PreviousMonth, &range);
        state.handle(PickerEvent::Navigate(Navigation::PreviousWeek), &range);
        assert_eq!(state.cursor(), range.max);
    }

    #[test]
    fn range_moving_under_the_cursor() {
        let mut state = focused(ClosePolicy::default(), "");
        let later = DateRange::from_age_window(ymd(2024, 7, 1), AgeWindow::default());
        state.sync_range(&later);
        assert_eq!(state.cursor(), ymd(2020, 6, 1));

        let earlier = DateRange::from_age_window(ymd(2024, 5, 1), AgeWindow::default());
        state.sync_range(&earlier);
        assert_eq!(state.cursor(), ymd(2020, 5, 1));
        assert_eq!(state.view_month(), ymd(2020, 5, 1));
    }

    #[test]
    fn policy_from_flag() {
        assert_eq!(
            ClosePolicy::from_keep_open_until_select(true),
            ClosePolicy::CloseOnExplicitSelectionOnly
        );
        assert_eq!(
            ClosePolicy::from_keep_open_until_select(false),
            ClosePolicy::default()
        );
    }
}
