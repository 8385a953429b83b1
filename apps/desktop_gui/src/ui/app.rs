use std::{collections::VecDeque, time::Duration};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiError, UiErrorContext, UiEvent},
        orchestration::dispatch_backend_command,
        reducer::{Action, Effect, ListingState},
    },
    ui::{
        entry_form::{EntryForm, FormIntent},
        filter_panel::FilterPanel,
        job_card::{show_job_card, CardIntent},
    },
};

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    listing: ListingState,
    filters: FilterPanel,
    form: EntryForm,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: impl Into<String>,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            server_url: server_url.into(),
            listing: ListingState::default(),
            filters: FilterPanel::default(),
            form: EntryForm::default(),
        };
        app.dispatch(Action::Start);
        app
    }

    pub fn listing(&self) -> &ListingState {
        &self.listing
    }

    /// Runs `action` through the reducer and carries out its effects. A
    /// command the queue refuses is fed back as the matching failure.
    pub fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            for effect in self.listing.reduce(action) {
                match effect {
                    Effect::Backend(cmd) => {
                        if let Some(failure) = self.send(cmd) {
                            queue.push_back(failure);
                        }
                    }
                    Effect::PrefillForm(job) => self.form.prefill(&job),
                    Effect::ResetForm => self.form.reset(),
                }
            }
        }
    }

    fn send(&self, cmd: BackendCommand) -> Option<Action> {
        let rejected = match &cmd {
            BackendCommand::Refresh { generation, .. } => {
                Rejected::Refresh(*generation)
            }
            BackendCommand::Mutate { mutation } => Rejected::Mutation(mutation.kind()),
        };

        let mut reason = String::new();
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut reason) {
            return None;
        }
        tracing::warn!("backend command not queued: {reason}");
        Some(match rejected {
            Rejected::Refresh(generation) => Action::RefreshFailed {
                generation,
                error: UiError::from_message(UiErrorContext::Refresh, reason),
            },
            Rejected::Mutation(kind) => Action::MutationFailed {
                kind,
                error: UiError::from_message(UiErrorContext::for_mutation(kind), reason),
            },
        })
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.dispatch(Action::from(event));
        }
    }

    fn show_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.listing.is_refreshing() || self.listing.pending_mutations() > 0 {
                ui.spinner();
            }
            match self.listing.last_error() {
                Some(_) => {
                    ui.colored_label(ui.visuals().error_fg_color, self.listing.status());
                }
                None => {
                    ui.label(self.listing.status());
                }
            }
        });
    }

    fn show_cards(&self, ui: &mut egui::Ui) -> Option<CardIntent> {
        let mut intent = None;
        let editing_id = self.listing.editing().map(|job| job.id);

        if self.listing.jobs().is_empty() && !self.listing.is_refreshing() {
            ui.weak("No postings match the current filters.");
            return None;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for job in self.listing.jobs() {
                    if let Some(card_intent) = show_job_card(ui, job, editing_id == Some(job.id)) {
                        intent = Some(card_intent);
                    }
                    ui.add_space(6.0);
                }
            });
        intent
    }
}

enum Rejected {
    Refresh(u64),
    Mutation(shared::domain::MutationKind),
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("listing_toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Job Listings");
                ui.weak(&self.server_url);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Reload").clicked() {
                        actions.push(Action::Reload);
                    }
                });
            });
            ui.separator();
            if let Some(filter) = self.filters.show(ui) {
                actions.push(Action::ApplyFilters(filter));
            }
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("listing_status").show(ctx, |ui| {
            self.show_status_bar(ui);
        });

        egui::SidePanel::left("entry_form_panel")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                let editing = self.listing.editing();
                ui.heading(if editing.is_some() { "Edit Job" } else { "Add Job" });
                ui.add_space(6.0);
                match self.form.show(ui, editing) {
                    Some(FormIntent::Submit(mutation)) => actions.push(Action::Submit(mutation)),
                    Some(FormIntent::Cancel) => actions.push(Action::CancelEdit),
                    None => {}
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.show_cards(ui) {
            Some(CardIntent::Edit(job)) => actions.push(Action::BeginEdit(job)),
            Some(CardIntent::Delete(job_id)) => actions.push(Action::Delete(job_id)),
            None => {}
        });

        for action in actions {
            self.dispatch(action);
        }

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
