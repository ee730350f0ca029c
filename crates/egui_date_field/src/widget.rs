use chrono::{Datelike as _, NaiveDate};
use egui::{
    Align2, Area, Button, Color32, ComboBox, Event, EventFilter, Frame, Id, InnerResponse, Key,
    Modifiers, Order, Popup, Response, Sense, StrokeKind, TextEdit, TextStyle, Ui, Vec2, Widget,
    WidgetInfo, WidgetText, WidgetType, accesskit,
};

use crate::controller::{ClosePolicy, Effect, PickerEvent, PickerState};
use crate::date::{format_date, month_label, month_name, parse_date};
use crate::focus::FocusTarget;
use crate::grid::{Day, MonthGrid, WEEKDAY_LABELS};
use crate::navigation::Navigation;
use crate::range::{AgeWindow, DateRange};

/// A `YYYY-MM-DD` text field with a calendar popover.
///
/// The host owns the value. Typing edits it directly; picking a day in the calendar replaces it
/// with the canonical `YYYY-MM-DD` text and is reported through [`DatePickerResponse::committed`].
///
/// ```
/// # egui::__run_test_ui(|ui| {
/// let mut birthday = String::new();
/// ui.add(egui_date_field::DatePickerField::new(&mut birthday).id_salt("birthday"));
/// # });
/// ```
pub struct DatePickerField<'a> {
    value: &'a mut String,
    id_salt: Option<Id>,
    close_policy: ClosePolicy,
    age_window: AgeWindow,
    today: Option<NaiveDate>,
    hint_text: WidgetText,
    required: bool,
    invalid: bool,
    described_by: Option<Id>,
    desired_width: Option<f32>,
}

impl<'a> DatePickerField<'a> {
    pub fn new(value: &'a mut String) -> Self {
        Self {
            value,
            id_salt: None,
            close_policy: ClosePolicy::default(),
            age_window: AgeWindow::default(),
            today: None,
            hint_text: "YYYY-MM-DD".into(),
            required: false,
            invalid: false,
            described_by: None,
            desired_width: None,
        }
    }

    /// Add id source.
    /// Must be set if multiple date fields are in the same Ui.
    #[inline]
    pub fn id_salt(mut self, id_salt: impl std::hash::Hash) -> Self {
        self.id_salt = Some(Id::new(id_salt));
        self
    }

    /// When the popover closes on its own. (Default: [`ClosePolicy::AutoCloseOnValidInput`])
    #[inline]
    pub fn close_policy(mut self, close_policy: ClosePolicy) -> Self {
        self.close_policy = close_policy;
        self
    }

    /// Keep the popover open after a valid date is typed, until a day is picked or Escape is pressed.
    /// (Default: false)
    #[inline]
    pub fn keep_open_until_select(mut self, keep_open_until_select: bool) -> Self {
        self.close_policy = ClosePolicy::from_keep_open_until_select(keep_open_until_select);
        self
    }

    /// Which ages are selectable. (Default: 4 to 15 years)
    #[inline]
    pub fn age_window(mut self, age_window: AgeWindow) -> Self {
        self.age_window = age_window;
        self
    }

    /// Override the local date the age window is measured from.
    #[inline]
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Shown while the field is empty. (Default: `YYYY-MM-DD`)
    #[inline]
    pub fn hint_text(mut self, hint_text: impl Into<WidgetText>) -> Self {
        self.hint_text = hint_text.into();
        self
    }

    /// Tell assistive technology that a value is required.
    #[inline]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Tell assistive technology that the current value failed validation.
    #[inline]
    pub fn invalid(mut self, invalid: bool) -> Self {
        self.invalid = invalid;
        self
    }

    /// The widget (usually an error or help label) that describes this field.
    #[inline]
    pub fn described_by(mut self, id: Id) -> Self {
        self.described_by = Some(id);
        self
    }

    #[inline]
    pub fn desired_width(mut self, desired_width: f32) -> Self {
        self.desired_width = Some(desired_width);
        self
    }
}

/// What happened to a [`DatePickerField`] this frame.
#[derive(Debug)]
pub struct DatePickerResponse {
    /// The text field. Marked as changed when a day is picked.
    pub response: Response,

    /// The new value, if a day was picked this frame.
    pub committed: Option<String>,

    /// Is the calendar showing?
    pub open: bool,
}

impl DatePickerResponse {
    /// The user finished choosing a date: a good time to validate the field.
    #[inline]
    pub fn should_validate(&self) -> bool {
        self.committed.is_some()
    }
}

impl DatePickerField<'_> {
    pub fn show(self, ui: &mut Ui) -> DatePickerResponse {
        let Self {
            value,
            id_salt,
            close_policy,
            age_window,
            today,
            hint_text,
            required,
            invalid,
            described_by,
            desired_width,
        } = self;

        let id = ui.make_persistent_id(id_salt);
        let text_id = id.with("text");
        let popover_id = id.with("popover");

        let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
        let range = DateRange::from_age_window(today, age_window);

        let mut state = ui
            .data_mut(|data| data.get_temp::<PickerState>(id))
            .filter(|state| state.policy() == close_policy)
            .unwrap_or_else(|| PickerState::new(close_policy, &range, value));
        let previous_state = state.clone();
        state.sync_range(&range);

        // We don't want to react to clicks and Escape meant for the month/year combo boxes.
        let popup_was_open = Popup::is_any_open(ui.ctx());

        let mut text_edit = TextEdit::singleline(value).id(text_id).hint_text(hint_text);
        if let Some(desired_width) = desired_width {
            text_edit = text_edit.desired_width(desired_width);
        }
        let mut response = ui.add(text_edit);

        ui.ctx().accesskit_node_builder(response.id, |node| {
            node.set_expanded(state.is_open());
            if required {
                node.set_required();
            }
            if invalid {
                node.set_invalid(accesskit::Invalid::True);
            }
            if let Some(described_by) = described_by {
                let described_by: accesskit::NodeId = described_by.value().into();
                node.set_described_by(vec![described_by]);
            }
        });

        let mut events = Vec::new();
        if response.has_focus() && !response.gained_focus() {
            state.input_kept_focus();
        }
        if response.clicked() {
            events.push(PickerEvent::InputClicked);
        } else if response.gained_focus() {
            events.push(PickerEvent::InputFocused);
        }
        if value.as_str() != state.value() {
            events.push(PickerEvent::ValueChanged(value.clone()));
        }
        if response.has_focus() && ui.input(|i| i.key_pressed(Key::ArrowDown)) {
            events.push(PickerEvent::EnterGrid);
        }
        let mut effects = handle_all(&mut state, events, &range);

        if state.is_open() {
            let grid = MonthGrid::new(state.view_month(), &range, today, parse_date(value));
            let focus_date = state.take_pending_focus();
            let popover = show_popover(
                ui,
                popover_id,
                &response,
                (&state, &range, &grid),
                focus_date,
            );
            let mut events = popover.keyboard_events(ui);

            let any_popup_open = popup_was_open || Popup::is_any_open(ui.ctx());
            if !any_popup_open {
                if ui.input(|i| i.key_pressed(Key::Escape)) {
                    events.push(PickerEvent::Escape);
                }

                let focus_elsewhere = ui
                    .memory(|mem| mem.focused())
                    .is_some_and(|focused| focused != text_id && !popover.owns(focused));
                if !response.clicked() && (popover.area.clicked_elsewhere() || focus_elsewhere) {
                    events.push(PickerEvent::Outside);
                }
            }

            effects.extend(handle_all(&mut state, popover.events, &range));
            effects.extend(handle_all(&mut state, events, &range));
        }

        let mut committed = None;
        for effect in effects {
            match effect {
                Effect::Commit(text) => {
                    value.clone_from(&text);
                    response.mark_changed();
                    committed = Some(text);
                }
                Effect::FocusInput => {
                    ui.memory_mut(|mem| mem.request_focus(text_id));
                }
                Effect::FocusCursor(date) => {
                    // The cell may not exist until the next frame's grid.
                    state.defer_cursor_focus(date);
                }
            }
        }

        let open = state.is_open();
        if state != previous_state {
            ui.ctx().request_repaint();
        }
        ui.data_mut(|data| data.insert_temp(id, state));

        DatePickerResponse {
            response,
            committed,
            open,
        }
    }
}

impl Widget for DatePickerField<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        self.show(ui).response
    }
}

fn handle_all(
    state: &mut PickerState,
    events: Vec<PickerEvent>,
    range: &DateRange,
) -> Vec<Effect> {
    events
        .into_iter()
        .flat_map(|event| state.handle(event, range))
        .collect()
}

struct Popover {
    area: Response,
    previous_month: Response,
    month_select: Response,
    year_select: Response,
    next_month: Response,
    cursor_cell: Option<Response>,
    can_show_previous_month: bool,
    can_show_next_month: bool,
    events: Vec<PickerEvent>,
}

impl Popover {
    fn target(&self, target: FocusTarget) -> Option<&Response> {
        match target {
            FocusTarget::PreviousMonth => Some(&self.previous_month),
            FocusTarget::MonthSelect => Some(&self.month_select),
            FocusTarget::YearSelect => Some(&self.year_select),
            FocusTarget::NextMonth => Some(&self.next_month),
            FocusTarget::Cursor => self.cursor_cell.as_ref(),
        }
    }

    fn is_enabled(&self, target: FocusTarget) -> bool {
        match target {
            FocusTarget::PreviousMonth => self.can_show_previous_month,
            FocusTarget::NextMonth => self.can_show_next_month,
            FocusTarget::MonthSelect | FocusTarget::YearSelect => true,
            FocusTarget::Cursor => self.cursor_cell.is_some(),
        }
    }

    fn focused_target(&self) -> Option<FocusTarget> {
        FocusTarget::ORDER
            .into_iter()
            .find(|target| self.target(*target).is_some_and(Response::has_focus))
    }

    fn owns(&self, id: Id) -> bool {
        FocusTarget::ORDER
            .into_iter()
            .any(|target| self.target(target).is_some_and(|response| response.id == id))
    }

    /// Cursor keys on the focused day, and Tab cycling among the popover's widgets.
    fn keyboard_events(&self, ui: &Ui) -> Vec<PickerEvent> {
        let mut events = Vec::new();
        let Some(focused) = self.focused_target() else {
            return events;
        };
        let Some(focused_response) = self.target(focused) else {
            return events;
        };
        let on_cursor = focused == FocusTarget::Cursor;

        ui.memory_mut(|mem| {
            mem.set_focus_lock_filter(
                focused_response.id,
                EventFilter {
                    tab: true,
                    horizontal_arrows: on_cursor,
                    vertical_arrows: on_cursor,
                    ..Default::default()
                },
            );
        });

        if on_cursor {
            ui.input(|i| {
                for event in &i.events {
                    if let Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } = event
                        && modifiers.is_none()
                        && let Some(navigation) = Navigation::from_key(*key)
                    {
                        events.push(PickerEvent::Navigate(navigation));
                    }
                }
            });
        }

        let backwards = ui.input_mut(|i| i.consume_key(Modifiers::SHIFT, Key::Tab));
        let forwards = !backwards && ui.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Tab));
        if backwards || forwards {
            let next = focused.cycle(backwards, |target| self.is_enabled(target));
            if let Some(next_response) = self.target(next) {
                log::trace!("focus trap: {focused:?} -> {next:?}");
                ui.memory_mut(|mem| mem.request_focus(next_response.id));
            }
        }

        events
    }
}

fn show_popover(
    ui: &Ui,
    popover_id: Id,
    anchor: &Response,
    (state, range, grid): (&PickerState, &DateRange, &MonthGrid),
    focus_date: Option<NaiveDate>,
) -> Popover {
    let spacing = 2.0;
    let cell_size = Vec2::new(
        1.75 * ui.spacing().interact_size.y,
        1.25 * ui.spacing().interact_size.y,
    );
    let width = 7.0 * cell_size.x + 6.0 * spacing;

    let mut pos = anchor.rect.left_bottom();
    let width_with_padding = width
        + ui.style().spacing.item_spacing.x
        + ui.style().spacing.window_margin.leftf()
        + ui.style().spacing.window_margin.rightf();
    if pos.x + width_with_padding > ui.clip_rect().right() {
        pos.x = anchor.rect.right() - width_with_padding;
    }

    // Never place the calendar out of the window.
    pos.x = pos.x.max(ui.style().spacing.window_margin.leftf());

    let view_month = state.view_month();
    let can_show_previous_month = range.can_show_previous_month(view_month);
    let can_show_next_month = range.can_show_next_month(view_month);
    let mut events = Vec::new();

    let InnerResponse {
        inner: (header, cursor_cell),
        response: area,
    } = Area::new(popover_id)
        .kind(egui::UiKind::Picker)
        .order(Order::Foreground)
        .fixed_pos(pos)
        .show(ui.ctx(), |ui| {
            Frame::popup(ui.style())
                .show(ui, |ui| {
                    ui.set_min_width(width);
                    ui.set_max_width(width);
                    ui.spacing_mut().item_spacing = Vec2::splat(spacing);

                    ui.ctx().accesskit_node_builder(ui.id(), |node| {
                        node.set_role(accesskit::Role::Dialog);
                        node.set_label("Choose date");
                        node.set_modal();
                    });

                    let header = ui
                        .horizontal(|ui| {
                            show_header(
                                ui,
                                popover_id,
                                view_month,
                                range,
                                (can_show_previous_month, can_show_next_month),
                                &mut events,
                            )
                        })
                        .inner;

                    // Visually hidden: only assistive technology hears the month change.
                    ui.ctx()
                        .accesskit_node_builder(popover_id.with("month_label"), |node| {
                            node.set_role(accesskit::Role::Label);
                            node.set_label(month_label(view_month));
                            node.set_live(accesskit::Live::Polite);
                        });

                    ui.add_space(spacing);
                    let cursor_cell = show_grid(
                        ui,
                        popover_id,
                        (grid, state.cursor(), focus_date),
                        cell_size,
                        &mut events,
                    );
                    (header, cursor_cell)
                })
                .inner
        });

    Popover {
        area,
        previous_month: header.previous_month,
        month_select: header.month_select,
        year_select: header.year_select,
        next_month: header.next_month,
        cursor_cell,
        can_show_previous_month,
        can_show_next_month,
        events,
    }
}

struct Header {
    previous_month: Response,
    month_select: Response,
    year_select: Response,
    next_month: Response,
}

fn show_header(
    ui: &mut Ui,
    popover_id: Id,
    view_month: NaiveDate,
    range: &DateRange,
    (can_show_previous_month, can_show_next_month): (bool, bool),
    events: &mut Vec<PickerEvent>,
) -> Header {
    let previous_month = ui
        .add_enabled(can_show_previous_month, Button::new("<"))
        .on_hover_text("Previous month");
    set_accessible_label(ui, &previous_month, "Previous month");
    if previous_month.clicked() {
        events.push(PickerEvent::PreviousMonth);
    }

    let month_select = ComboBox::from_id_salt(popover_id.with("month"))
        .selected_text(month_name(view_month.month()))
        .show_ui(ui, |ui| {
            for month in 1..=12 {
                let enabled = range.view_for_month_selection(view_month, month).is_some();
                let selected = month == view_month.month();
                if ui
                    .add_enabled(enabled, Button::selectable(selected, month_name(month)))
                    .clicked()
                {
                    events.push(PickerEvent::SelectMonth(month));
                }
            }
        })
        .response;
    set_accessible_label(ui, &month_select, "Month");

    let year_select = ComboBox::from_id_salt(popover_id.with("year"))
        .selected_text(view_month.year().to_string())
        .show_ui(ui, |ui| {
            for year in range.years() {
                let enabled = range.view_for_year_selection(view_month, year).is_some();
                let selected = year == view_month.year();
                if ui
                    .add_enabled(enabled, Button::selectable(selected, year.to_string()))
                    .clicked()
                {
                    events.push(PickerEvent::SelectYear(year));
                }
            }
        })
        .response;
    set_accessible_label(ui, &year_select, "Year");

    let next_month = ui
        .add_enabled(can_show_next_month, Button::new(">"))
        .on_hover_text("Next month");
    set_accessible_label(ui, &next_month, "Next month");
    if next_month.clicked() {
        events.push(PickerEvent::NextMonth);
    }

    Header {
        previous_month,
        month_select,
        year_select,
        next_month,
    }
}

fn set_accessible_label(ui: &Ui, response: &Response, label: &str) {
    ui.ctx().accesskit_node_builder(response.id, |node| {
        node.set_label(label);
    });
}

/// Returns the response of the cursor cell, unless the cursor sits on a disabled day.
fn show_grid(
    ui: &mut Ui,
    popover_id: Id,
    (grid, cursor, focus_date): (&MonthGrid, NaiveDate, Option<NaiveDate>),
    cell_size: Vec2,
    events: &mut Vec<PickerEvent>,
) -> Option<Response> {
    let mut cursor_cell = None;

    egui::Grid::new(popover_id.with("grid"))
        .spacing(ui.spacing().item_spacing)
        .min_col_width(cell_size.x)
        .max_col_width(cell_size.x)
        .show(ui, |ui| {
            for label in WEEKDAY_LABELS {
                ui.vertical_centered(|ui| ui.weak(label));
            }
            ui.end_row();

            for week in grid.weeks() {
                for day in week {
                    let is_tab_stop = day.date == cursor && !day.is_disabled;
                    let id = popover_id.with(day.date);
                    if is_tab_stop && focus_date == Some(day.date) {
                        ui.memory_mut(|mem| mem.request_focus(id));
                    }
                    let response = day_cell(ui, id, day, is_tab_stop, cell_size);
                    if response.clicked() {
                        events.push(PickerEvent::Activate(day.date));
                    }
                    if is_tab_stop {
                        cursor_cell = Some(response);
                    }
                }
                ui.end_row();
            }
        });

    cursor_cell
}

/// One day of the grid. Only the tab stop can take keyboard focus.
fn day_cell(ui: &mut Ui, id: Id, day: &Day, is_tab_stop: bool, size: Vec2) -> Response {
    let sense = if day.is_disabled {
        Sense::hover()
    } else if is_tab_stop {
        Sense::click()
    } else {
        Sense::CLICK
    };
    let (_, rect) = ui.allocate_space(size);
    let response = ui.interact(rect, id, sense);

    let label = day.date.day().to_string();
    response.widget_info(|| {
        WidgetInfo::selected(WidgetType::Button, !day.is_disabled, day.is_selected, &label)
    });
    ui.ctx().accesskit_node_builder(response.id, |node| {
        node.set_role(accesskit::Role::GridCell);
        node.set_description(format_date(day.date));
    });

    if ui.is_rect_visible(rect) {
        let visuals = ui.style().interact(&response);

        let fill = if day.is_selected {
            ui.visuals().selection.bg_fill
        } else if day.is_disabled {
            ui.visuals().faint_bg_color
        } else if response.hovered() {
            visuals.weak_bg_fill
        } else if day.is_weekend {
            if ui.visuals().dark_mode {
                Color32::DARK_RED
            } else {
                Color32::LIGHT_RED
            }
        } else {
            ui.visuals().extreme_bg_color
        };

        let mut text_color = if day.is_selected {
            ui.visuals().selection.stroke.color
        } else if day.is_disabled {
            ui.visuals().weak_text_color()
        } else {
            visuals.text_color()
        };
        if !day.in_month {
            text_color = text_color.linear_multiply(0.5);
        }

        let painter = ui.painter();
        painter.rect_filled(rect, visuals.corner_radius, fill);
        if response.has_focus() {
            painter.rect_stroke(
                rect,
                visuals.corner_radius,
                ui.visuals().selection.stroke,
                StrokeKind::Outside,
            );
        }
        if day.is_today {
            // Encircle today's date
            painter.circle_stroke(
                rect.center(),
                0.45 * rect.height(),
                ui.visuals().widgets.inactive.fg_stroke,
            );
        }
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            label,
            TextStyle::Button.resolve(ui.style()),
            text_color,
        );
    }

    response
}
