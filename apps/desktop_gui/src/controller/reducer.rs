//! Listing state and its transitions.
//!
//! The UI never touches the network. It feeds [`Action`]s into
//! [`ListingState::reduce`] and carries out the returned [`Effect`]s: backend
//! commands go to the worker queue, form effects go to the entry form. Backend
//! completions come back as actions too, so every transition happens here.
//!
//! Each refresh is stamped with a generation. Only the result of the most
//! recently issued refresh is applied; slower responses to earlier filters are
//! dropped.

use shared::domain::{FilterSelection, JobId, JobMutation, JobPosting, MutationKind};
use tracing::debug;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorCategory, UiEvent},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Initial load when the window opens.
    Start,
    ApplyFilters(FilterSelection),
    Reload,
    BeginEdit(JobPosting),
    CancelEdit,
    Submit(JobMutation),
    Delete(JobId),
    RefreshLoaded {
        generation: u64,
        jobs: Vec<JobPosting>,
    },
    RefreshFailed {
        generation: u64,
        error: UiError,
    },
    MutationSucceeded(MutationKind),
    MutationFailed {
        kind: MutationKind,
        error: UiError,
    },
    Notice(String),
    BackendUnavailable(UiError),
}

impl From<UiEvent> for Action {
    fn from(event: UiEvent) -> Self {
        match event {
            UiEvent::Info(message) => Action::Notice(message),
            UiEvent::Error(error) => Action::BackendUnavailable(error),
            UiEvent::JobsLoaded { generation, jobs } => Action::RefreshLoaded { generation, jobs },
            UiEvent::RefreshFailed { generation, error } => {
                Action::RefreshFailed { generation, error }
            }
            UiEvent::MutationSucceeded(kind) => Action::MutationSucceeded(kind),
            UiEvent::MutationFailed { kind, error } => Action::MutationFailed { kind, error },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Backend(BackendCommand),
    PrefillForm(JobPosting),
    ResetForm,
}

#[derive(Debug, Default)]
pub struct ListingState {
    jobs: Vec<JobPosting>,
    filter: FilterSelection,
    editing: Option<JobPosting>,
    refresh_generation: u64,
    refreshing: bool,
    pending_mutations: usize,
    status: String,
    last_error: Option<UiError>,
}

impl ListingState {
    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn filter(&self) -> &FilterSelection {
        &self.filter
    }

    pub fn editing(&self) -> Option<&JobPosting> {
        self.editing.as_ref()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn pending_mutations(&self) -> usize {
        self.pending_mutations
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_error(&self) -> Option<&UiError> {
        self.last_error.as_ref()
    }

    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Start | Action::Reload => vec![self.refresh()],
            Action::ApplyFilters(filter) => {
                self.filter = filter;
                vec![self.refresh()]
            }
            Action::BeginEdit(job) => {
                self.editing = Some(job.clone());
                self.status = format!("Editing \"{}\"", job.title);
                vec![Effect::PrefillForm(job)]
            }
            Action::CancelEdit => {
                if self.editing.take().is_some() {
                    self.status = "Edit cancelled".to_string();
                }
                vec![Effect::ResetForm]
            }
            Action::Submit(mutation) => self.mutate(mutation),
            Action::Delete(job_id) => self.mutate(JobMutation::Delete(job_id)),
            Action::RefreshLoaded { generation, jobs } => {
                if self.is_stale(generation) {
                    return Vec::new();
                }
                self.refreshing = false;
                self.status = format!("{} posting(s)", jobs.len());
                self.jobs = jobs;
                Vec::new()
            }
            Action::RefreshFailed { generation, error } => {
                if self.is_stale(generation) {
                    return Vec::new();
                }
                self.refreshing = false;
                self.fail(error);
                Vec::new()
            }
            Action::MutationSucceeded(kind) => self.mutation_succeeded(kind),
            Action::MutationFailed { kind, error } => self.mutation_failed(kind, error),
            Action::Notice(message) => {
                self.status = message;
                Vec::new()
            }
            Action::BackendUnavailable(error) => {
                self.refreshing = false;
                self.fail(error);
                Vec::new()
            }
        }
    }

    fn refresh(&mut self) -> Effect {
        self.refresh_generation += 1;
        self.refreshing = true;
        Effect::Backend(BackendCommand::Refresh {
            generation: self.refresh_generation,
            filter: self.filter.clone(),
        })
    }

    fn is_stale(&self, generation: u64) -> bool {
        let stale = generation != self.refresh_generation;
        if stale {
            debug!(
                generation,
                latest = self.refresh_generation,
                "dropping stale refresh result"
            );
        }
        stale
    }

    fn mutate(&mut self, mutation: JobMutation) -> Vec<Effect> {
        self.pending_mutations += 1;
        self.status = match mutation.kind() {
            MutationKind::Create => "Adding posting...".to_string(),
            MutationKind::Update(job_id) => format!("Updating posting {job_id}..."),
            MutationKind::Delete(job_id) => format!("Deleting posting {job_id}..."),
        };
        vec![Effect::Backend(BackendCommand::Mutate { mutation })]
    }

    /// Resets the form only when it still shows what was submitted: a new
    /// draft for creates, the same designation for updates and deletes.
    fn mutation_succeeded(&mut self, kind: MutationKind) -> Vec<Effect> {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
        self.last_error = None;

        let mut effects = Vec::new();
        let editing_id = self.editing.as_ref().map(|job| job.id);
        match kind {
            MutationKind::Create => {
                if editing_id.is_none() {
                    effects.push(Effect::ResetForm);
                }
            }
            MutationKind::Update(job_id) | MutationKind::Delete(job_id) => {
                if editing_id == Some(job_id) {
                    self.editing = None;
                    effects.push(Effect::ResetForm);
                }
            }
        }
        effects.push(self.refresh());
        effects
    }

    /// Failures keep the list, the designation and the draft. A posting the
    /// server no longer has is the exception: its designation is dropped and
    /// the list is reloaded so the card disappears.
    fn mutation_failed(&mut self, kind: MutationKind, error: UiError) -> Vec<Effect> {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
        let gone = error.category() == UiErrorCategory::NotFound;
        self.fail(error);
        if !gone {
            debug!(verb = kind.verb(), "mutation failed; keeping local state");
            return Vec::new();
        }

        if let MutationKind::Update(job_id) | MutationKind::Delete(job_id) = kind {
            if self.editing.as_ref().map(|job| job.id) == Some(job_id) {
                self.editing = None;
            }
        }
        vec![self.refresh()]
    }

    fn fail(&mut self, error: UiError) {
        self.status = error.summary();
        self.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::UiErrorContext;
    use shared::domain::{JobPayload, SortOrder};

    fn posting(id: i64, title: &str) -> JobPosting {
        JobPosting {
            id: JobId(id),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            job_type: "Full-time".to_string(),
            tags: vec!["x".to_string(), "y".to_string()],
            posting_date: "2024-01-01T00:00:00Z".parse().expect("timestamp"),
        }
    }

    fn refresh_command(effects: &[Effect]) -> (u64, FilterSelection) {
        let refreshes: Vec<_> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Backend(BackendCommand::Refresh { generation, filter }) => {
                    Some((*generation, filter.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(refreshes.len(), 1, "expected exactly one refresh: {effects:?}");
        refreshes[0].clone()
    }

    fn loaded(state: &mut ListingState, jobs: Vec<JobPosting>) {
        let (generation, _) = refresh_command(&state.reduce(Action::Reload));
        state.reduce(Action::RefreshLoaded { generation, jobs });
    }

    #[test]
    fn start_issues_refresh_with_default_filter() {
        let mut state = ListingState::default();
        let (generation, filter) = refresh_command(&state.reduce(Action::Start));
        assert_eq!(generation, 1);
        assert_eq!(filter, FilterSelection::default());
        assert!(state.is_refreshing());
    }

    #[test]
    fn applying_filters_issues_exactly_one_refresh_even_when_unchanged() {
        let mut state = ListingState::default();
        let internship = FilterSelection {
            job_type: "Internship".into(),
            ..FilterSelection::default()
        };

        let (first, filter) = refresh_command(&state.reduce(Action::ApplyFilters(internship.clone())));
        assert_eq!(filter, internship);
        assert_eq!(state.filter(), &internship);

        let (second, _) = refresh_command(&state.reduce(Action::ApplyFilters(internship)));
        assert_eq!(second, first + 1);
    }

    #[test]
    fn stale_refresh_results_are_discarded() {
        let mut state = ListingState::default();
        let (old_generation, _) = refresh_command(&state.reduce(Action::Start));
        let (new_generation, _) = refresh_command(&state.reduce(Action::ApplyFilters(
            FilterSelection {
                sort: SortOrder::OldestFirst,
                ..FilterSelection::default()
            },
        )));

        state.reduce(Action::RefreshLoaded {
            generation: new_generation,
            jobs: vec![posting(2, "fresh")],
        });
        state.reduce(Action::RefreshLoaded {
            generation: old_generation,
            jobs: vec![posting(1, "stale")],
        });
        assert_eq!(state.jobs(), &[posting(2, "fresh")]);
        assert!(!state.is_refreshing());

        state.reduce(Action::RefreshFailed {
            generation: old_generation,
            error: UiError::from_message(UiErrorContext::Refresh, "connection reset"),
        });
        assert!(state.last_error().is_none());
    }

    #[test]
    fn refresh_replaces_the_list_wholesale() {
        let mut state = ListingState::default();
        loaded(&mut state, vec![posting(1, "a"), posting(2, "b")]);
        loaded(&mut state, vec![posting(3, "c")]);
        assert_eq!(state.jobs(), &[posting(3, "c")]);
    }

    #[test]
    fn begin_edit_designates_and_prefills_form() {
        let mut state = ListingState::default();
        let job = posting(7, "Engineer");
        let effects = state.reduce(Action::BeginEdit(job.clone()));
        assert_eq!(effects, vec![Effect::PrefillForm(job.clone())]);
        assert_eq!(state.editing(), Some(&job));
    }

    #[test]
    fn submit_queues_mutation_without_touching_list() {
        let mut state = ListingState::default();
        loaded(&mut state, vec![posting(1, "a")]);
        let mutation = JobMutation::Create(JobPayload {
            title: "Engineer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            ..JobPayload::default()
        });

        let effects = state.reduce(Action::Submit(mutation.clone()));
        assert_eq!(effects, vec![Effect::Backend(BackendCommand::Mutate { mutation })]);
        assert_eq!(state.pending_mutations(), 1);
        assert_eq!(state.jobs(), &[posting(1, "a")]);
    }

    #[test]
    fn successful_create_resets_form_and_refreshes_with_active_filter() {
        let mut state = ListingState::default();
        let filter = FilterSelection {
            location: "Remote".into(),
            ..FilterSelection::default()
        };
        state.reduce(Action::ApplyFilters(filter.clone()));
        state.reduce(Action::Submit(JobMutation::Create(JobPayload::default())));

        let effects = state.reduce(Action::MutationSucceeded(MutationKind::Create));
        assert_eq!(effects[0], Effect::ResetForm);
        let (_, refresh_filter) = refresh_command(&effects);
        assert_eq!(refresh_filter, filter);
        assert_eq!(state.pending_mutations(), 0);
    }

    #[test]
    fn create_success_keeps_form_when_an_edit_started_meanwhile() {
        let mut state = ListingState::default();
        state.reduce(Action::Submit(JobMutation::Create(JobPayload::default())));
        state.reduce(Action::BeginEdit(posting(7, "Engineer")));

        let effects = state.reduce(Action::MutationSucceeded(MutationKind::Create));
        assert!(!effects.contains(&Effect::ResetForm));
        assert!(state.editing().is_some());
        refresh_command(&effects);
    }

    #[test]
    fn successful_update_clears_designation() {
        let mut state = ListingState::default();
        let job = posting(7, "Engineer");
        state.reduce(Action::BeginEdit(job.clone()));
        state.reduce(Action::Submit(JobMutation::Update(job.id, job.payload())));

        let effects = state.reduce(Action::MutationSucceeded(MutationKind::Update(job.id)));
        assert!(state.editing().is_none());
        assert_eq!(effects[0], Effect::ResetForm);
        refresh_command(&effects);
    }

    #[test]
    fn failed_update_keeps_designation_and_surfaces_error() {
        let mut state = ListingState::default();
        let job = posting(7, "Engineer");
        state.reduce(Action::BeginEdit(job.clone()));
        state.reduce(Action::Submit(JobMutation::Update(job.id, job.payload())));

        let effects = state.reduce(Action::MutationFailed {
            kind: MutationKind::Update(job.id),
            error: UiError::from_message(UiErrorContext::Update, "connection refused"),
        });
        assert!(effects.is_empty());
        assert_eq!(state.editing(), Some(&job));
        assert_eq!(state.pending_mutations(), 0);
        assert!(state.status().starts_with("Could not update posting"));
        assert!(state.last_error().is_some());
    }

    #[test]
    fn not_found_failure_reloads_and_drops_designation() {
        let mut state = ListingState::default();
        loaded(&mut state, vec![posting(5, "gone")]);
        let edited = posting(5, "gone");
        state.reduce(Action::BeginEdit(edited.clone()));
        state.reduce(Action::Submit(JobMutation::Update(edited.id, edited.payload())));

        let effects = state.reduce(Action::MutationFailed {
            kind: MutationKind::Update(edited.id),
            error: UiError::from_message(UiErrorContext::Update, "server returned 404: "),
        });
        assert!(state.editing().is_none());
        assert!(!effects.contains(&Effect::ResetForm));
        let (generation, _) = refresh_command(&effects);
        assert!(state.last_error().is_some());

        state.reduce(Action::RefreshLoaded {
            generation,
            jobs: Vec::new(),
        });
        assert!(state.jobs().is_empty());
    }

    #[test]
    fn not_found_delete_of_other_posting_keeps_designation() {
        let mut state = ListingState::default();
        let edited = posting(7, "Engineer");
        state.reduce(Action::BeginEdit(edited.clone()));
        state.reduce(Action::Delete(JobId(5)));

        let effects = state.reduce(Action::MutationFailed {
            kind: MutationKind::Delete(JobId(5)),
            error: UiError::from_message(UiErrorContext::Delete, "job 5 not found"),
        });
        assert_eq!(state.editing(), Some(&edited));
        refresh_command(&effects);
    }

    #[test]
    fn deleting_the_edited_posting_drops_the_designation() {
        let mut state = ListingState::default();
        let edited = posting(7, "Engineer");
        state.reduce(Action::BeginEdit(edited.clone()));

        state.reduce(Action::Delete(JobId(8)));
        let effects = state.reduce(Action::MutationSucceeded(MutationKind::Delete(JobId(8))));
        assert_eq!(state.editing(), Some(&edited));
        assert!(!effects.contains(&Effect::ResetForm));

        state.reduce(Action::Delete(edited.id));
        let effects = state.reduce(Action::MutationSucceeded(MutationKind::Delete(edited.id)));
        assert!(state.editing().is_none());
        assert!(effects.contains(&Effect::ResetForm));
        refresh_command(&effects);
    }

    #[test]
    fn success_after_failure_clears_last_error() {
        let mut state = ListingState::default();
        state.reduce(Action::Delete(JobId(1)));
        state.reduce(Action::MutationFailed {
            kind: MutationKind::Delete(JobId(1)),
            error: UiError::from_message(UiErrorContext::Delete, "timed out"),
        });
        assert!(state.last_error().is_some());

        state.reduce(Action::Delete(JobId(1)));
        state.reduce(Action::MutationSucceeded(MutationKind::Delete(JobId(1))));
        assert!(state.last_error().is_none());
    }

    #[test]
    fn cancel_edit_clears_designation_and_resets_form() {
        let mut state = ListingState::default();
        state.reduce(Action::BeginEdit(posting(7, "Engineer")));
        assert_eq!(state.reduce(Action::CancelEdit), vec![Effect::ResetForm]);
        assert!(state.editing().is_none());
    }

    #[test]
    fn backend_events_map_onto_actions() {
        let action = Action::from(UiEvent::JobsLoaded {
            generation: 4,
            jobs: Vec::new(),
        });
        assert_eq!(
            action,
            Action::RefreshLoaded {
                generation: 4,
                jobs: Vec::new()
            }
        );
        assert_eq!(
            Action::from(UiEvent::MutationSucceeded(MutationKind::Create)),
            Action::MutationSucceeded(MutationKind::Create)
        );
    }
}
