//! Draft editor for creating and updating postings.
//!
//! The draft keeps tags as one comma-separated string and only splits it when
//! a payload is built. Submitting does not clear the draft; the controller
//! resets it once the write has succeeded, so a failed write keeps the user's
//! input.

use eframe::egui;
use shared::{
    domain::{JobMutation, JobPayload, JobPosting},
    tags::{join_tags, split_tags},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Company,
    Location,
    JobType,
    Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftForm {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub tags: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
    Submit(JobMutation),
    Cancel,
}

#[derive(Debug, Default)]
pub struct EntryForm {
    draft: DraftForm,
    notice: Option<String>,
}

impl EntryForm {
    pub fn draft(&self) -> &DraftForm {
        &self.draft
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.draft.title,
            FormField::Company => &mut self.draft.company,
            FormField::Location => &mut self.draft.location,
            FormField::JobType => &mut self.draft.job_type,
            FormField::Tags => &mut self.draft.tags,
        }
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    /// Overwrites the draft with `job`'s values, tags joined with `", "`.
    pub fn prefill(&mut self, job: &JobPosting) {
        self.draft = DraftForm {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type.clone(),
            tags: join_tags(&job.tags),
        };
        self.notice = None;
    }

    pub fn reset(&mut self) {
        self.draft = DraftForm::default();
        self.notice = None;
    }

    pub fn payload(&self) -> JobPayload {
        JobPayload {
            title: self.draft.title.clone(),
            company: self.draft.company.clone(),
            location: self.draft.location.clone(),
            job_type: self.draft.job_type.clone(),
            tags: split_tags(&self.draft.tags),
        }
    }

    /// Builds the mutation for the current draft. `editing` decides between
    /// create and update. Blank required fields are returned by name.
    pub fn submit(&self, editing: Option<&JobPosting>) -> Result<JobMutation, Vec<&'static str>> {
        let payload = self.payload();
        let missing = payload.missing_required_fields();
        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(match editing {
            Some(job) => JobMutation::Update(job.id, payload),
            None => JobMutation::Create(payload),
        })
    }

    pub fn show(&mut self, ui: &mut egui::Ui, editing: Option<&JobPosting>) -> Option<FormIntent> {
        let mut intent = None;

        egui::Grid::new("entry_form_grid")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                for (field, label, hint) in [
                    (FormField::Title, "Title *", "Job Title"),
                    (FormField::Company, "Company *", "Company"),
                    (FormField::Location, "Location *", "Location"),
                    (FormField::JobType, "Job Type", "Full-time, Part-time, Internship..."),
                    (FormField::Tags, "Tags", "Tags (comma-separated)"),
                ] {
                    ui.label(label);
                    ui.add(
                        egui::TextEdit::singleline(self.field_mut(field))
                            .hint_text(hint)
                            .desired_width(280.0),
                    );
                    ui.end_row();
                }
            });

        if let Some(notice) = &self.notice {
            ui.colored_label(ui.visuals().warn_fg_color, notice);
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let submit_label = if editing.is_some() { "Update Job" } else { "Add Job" };
            if ui.button(submit_label).clicked() {
                match self.submit(editing) {
                    Ok(mutation) => {
                        self.notice = None;
                        intent = Some(FormIntent::Submit(mutation));
                    }
                    Err(missing) => {
                        self.notice = Some(format!("Required: {}", missing.join(", ")));
                    }
                }
            }
            if editing.is_some() && ui.button("Cancel").clicked() {
                intent = Some(FormIntent::Cancel);
            }
        });

        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::JobId;

    fn filled_form() -> EntryForm {
        let mut form = EntryForm::default();
        form.set_field(FormField::Title, "Engineer");
        form.set_field(FormField::Company, "Acme");
        form.set_field(FormField::Location, "Remote");
        form.set_field(FormField::JobType, "Full-time");
        form.set_field(FormField::Tags, "a, b ,c");
        form
    }

    fn edited_posting() -> JobPosting {
        JobPosting {
            id: JobId(7),
            title: "Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            job_type: "Full-time".into(),
            tags: vec!["x".into(), "y".into()],
            posting_date: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        }
    }

    #[test]
    fn submit_without_designation_creates_with_split_tags() {
        let mutation = filled_form().submit(None).expect("valid draft");
        assert_eq!(
            mutation,
            JobMutation::Create(JobPayload {
                title: "Engineer".into(),
                company: "Acme".into(),
                location: "Remote".into(),
                job_type: "Full-time".into(),
                tags: vec!["a".into(), "b".into(), "c".into()],
            })
        );
    }

    #[test]
    fn prefill_joins_tags_and_unchanged_submit_updates_same_record() {
        let job = edited_posting();
        let mut form = EntryForm::default();
        form.prefill(&job);
        assert_eq!(form.draft().tags, "x, y");

        let mutation = form.submit(Some(&job)).expect("valid draft");
        assert_eq!(mutation, JobMutation::Update(JobId(7), job.payload()));
    }

    #[test]
    fn submit_keeps_draft_until_reset() {
        let form = filled_form();
        form.submit(None).expect("valid draft");
        assert_eq!(form.draft().title, "Engineer");

        let mut form = form;
        form.reset();
        assert_eq!(form.draft(), &DraftForm::default());
    }

    #[test]
    fn blank_required_fields_block_submission() {
        let mut form = filled_form();
        form.set_field(FormField::Company, "  ");
        form.set_field(FormField::Location, "");
        assert_eq!(form.submit(None), Err(vec!["company", "location"]));
    }

    #[test]
    fn empty_tag_pieces_are_dropped() {
        let mut form = filled_form();
        form.set_field(FormField::Tags, "a,,b,");
        assert_eq!(form.payload().tags, vec!["a", "b"]);
    }
}
