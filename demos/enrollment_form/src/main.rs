#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release
#![expect(rustdoc::missing_crate_level_docs)] // it's an example

use eframe::egui;
use egui_date_field::{AgeWindow, ClosePolicy, DatePickerField, DateRange, try_parse_date};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Enrollment form",
        options,
        Box::new(|cc| Ok(Box::new(EnrollmentForm::new(cc)))),
    )
}

#[derive(Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct EnrollmentForm {
    student_birth_date: String,
    sibling_birth_date: String,
    age_window: AgeWindow,

    #[serde(skip)]
    student_error: Option<String>,

    #[serde(skip)]
    sibling_error: Option<String>,
}

impl EnrollmentForm {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default()
    }

    fn reset(&mut self) {
        log::info!("resetting the form");
        self.student_birth_date.clear();
        self.sibling_birth_date.clear();
        self.student_error = None;
        self.sibling_error = None;
    }
}

impl eframe::App for EnrollmentForm {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show_inside(ui, |ui| {
            ui.heading("Enrollment");
            ui.label(format!(
                "Children aged {} to {} years can enroll.",
                self.age_window.min_age_years, self.age_window.max_age_years
            ));
            ui.separator();

            egui::Grid::new("enrollment_form_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Student date of birth");
                    birth_date_field(
                        ui,
                        "student",
                        &mut self.student_birth_date,
                        &mut self.student_error,
                        ClosePolicy::AutoCloseOnValidInput,
                        self.age_window,
                    );
                    ui.end_row();

                    ui.label("Sibling date of birth")
                        .on_hover_text("Stays open after typing until a day is picked");
                    birth_date_field(
                        ui,
                        "sibling",
                        &mut self.sibling_birth_date,
                        &mut self.sibling_error,
                        ClosePolicy::CloseOnExplicitSelectionOnly,
                        self.age_window,
                    );
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Minimum age");
                ui.add(egui::DragValue::new(&mut self.age_window.min_age_years).range(0..=30));
                ui.label("Maximum age");
                ui.add(egui::DragValue::new(&mut self.age_window.max_age_years).range(0..=30));
            });

            if ui.button("Reset").clicked() {
                self.reset();
            }
        });
    }
}

fn birth_date_field(
    ui: &mut egui::Ui,
    id_salt: &str,
    value: &mut String,
    error: &mut Option<String>,
    close_policy: ClosePolicy,
    age_window: AgeWindow,
) {
    ui.vertical(|ui| {
        // The error label's id from the previous frame, for `described_by`.
        let error_label_key = ui.make_persistent_id((id_salt, "error_label"));
        let error_label_id = ui.data(|data| data.get_temp::<egui::Id>(error_label_key));

        let mut field = DatePickerField::new(value)
            .id_salt(id_salt)
            .close_policy(close_policy)
            .age_window(age_window)
            .required(true)
            .invalid(error.is_some());
        if let Some(error_label_id) = error_label_id.filter(|_| error.is_some()) {
            field = field.described_by(error_label_id);
        }
        let response = field.show(ui);

        if let Some(committed) = &response.committed {
            log::info!("{id_salt}: picked {committed}");
        }
        if response.should_validate() || response.response.lost_focus() {
            *error = validate(value, age_window);
        }

        if let Some(error) = error {
            let label = ui.colored_label(ui.visuals().error_fg_color, error.as_str());
            ui.data_mut(|data| data.insert_temp(error_label_key, label.id));
        }
    });
}

fn validate(value: &str, age_window: AgeWindow) -> Option<String> {
    let today = chrono::Local::now().date_naive();
    match try_parse_date(value) {
        Ok(date) if DateRange::from_age_window(today, age_window).contains(date) => None,
        Ok(_) => Some(format!(
            "must be {} to {} years old",
            age_window.min_age_years, age_window.max_age_years
        )),
        Err(err) => Some(err.to_string()),
    }
}
