//! Rendering of a single posting.

use chrono::Local;
use eframe::egui;
use shared::domain::{JobId, JobPosting};

/// What the user asked for on a card. The card does not act on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardIntent {
    Edit(JobPosting),
    Delete(JobId),
}

pub fn summary_line(job: &JobPosting) -> String {
    format!("{} | {} | {}", job.company, job.location, job.job_type)
}

/// Posting date in the viewer's time zone.
pub fn posted_label(job: &JobPosting) -> String {
    format!(
        "Posted: {}",
        job.posting_date.with_timezone(&Local).format("%x")
    )
}

pub fn show_job_card(ui: &mut egui::Ui, job: &JobPosting, highlighted: bool) -> Option<CardIntent> {
    let mut intent = None;
    let mut frame = egui::Frame::group(ui.style()).inner_margin(egui::Margin::symmetric(12, 10));
    if highlighted {
        frame = frame.stroke(egui::Stroke::new(1.5, ui.visuals().selection.stroke.color));
    }

    frame.show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.heading(&job.title);
        ui.label(egui::RichText::new(summary_line(job)).small());
        ui.label(egui::RichText::new(posted_label(job)).small().weak());

        if !job.tags.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for tag in &job.tags {
                    ui.label(
                        egui::RichText::new(tag)
                            .small()
                            .background_color(ui.visuals().faint_bg_color),
                    );
                }
            });
        }

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Edit").clicked() {
                intent = Some(CardIntent::Edit(job.clone()));
            }
            if ui.button("Delete").clicked() {
                intent = Some(CardIntent::Delete(job.id));
            }
        });
    });
    intent
}
