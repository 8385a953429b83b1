//! Filter bar. Field edits stay local until the user presses Apply, so
//! typing does not hit the server on every keystroke.

use eframe::egui;
use shared::domain::{FilterSelection, SortOrder, KNOWN_JOB_TYPES};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPanel {
    job_type: String,
    location: String,
    tag: String,
    sort: SortOrder,
}

impl FilterPanel {
    pub fn set_job_type(&mut self, value: impl Into<String>) {
        self.job_type = value.into();
    }

    pub fn set_location(&mut self, value: impl Into<String>) {
        self.location = value.into();
    }

    pub fn set_tag(&mut self, value: impl Into<String>) {
        self.tag = value.into();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// Snapshot of the current field values.
    pub fn apply(&self) -> FilterSelection {
        FilterSelection {
            job_type: self.job_type.clone(),
            location: self.location.clone(),
            tag: self.tag.clone(),
            sort: self.sort,
        }
    }

    /// Renders the bar; returns a snapshot when Apply is pressed.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<FilterSelection> {
        let mut applied = None;
        ui.horizontal_wrapped(|ui| {
            let type_label = if self.job_type.is_empty() {
                "All Types"
            } else {
                self.job_type.as_str()
            };
            egui::ComboBox::from_id_salt("filter_job_type")
                .selected_text(type_label.to_string())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.job_type, String::new(), "All Types");
                    for job_type in KNOWN_JOB_TYPES {
                        ui.selectable_value(&mut self.job_type, job_type.to_string(), job_type);
                    }
                });

            ui.add(
                egui::TextEdit::singleline(&mut self.location)
                    .hint_text("Location")
                    .desired_width(140.0),
            );
            ui.add(
                egui::TextEdit::singleline(&mut self.tag)
                    .hint_text("Tag")
                    .desired_width(120.0),
            );

            egui::ComboBox::from_id_salt("filter_sort")
                .selected_text(self.sort.label())
                .show_ui(ui, |ui| {
                    for sort in [SortOrder::NewestFirst, SortOrder::OldestFirst] {
                        ui.selectable_value(&mut self.sort, sort, sort.label());
                    }
                });

            if ui.button("Apply Filters").clicked() {
                applied = Some(self.apply());
            }
        });
        applied
    }
}
