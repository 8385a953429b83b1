//! Backend commands queued from UI to backend worker.

use shared::domain::{FilterSelection, JobMutation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// Query the listing. `generation` is echoed back so stale results can be dropped.
    Refresh {
        generation: u64,
        filter: FilterSelection,
    },
    Mutate {
        mutation: JobMutation,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Refresh { .. } => "refresh",
            BackendCommand::Mutate { mutation } => match mutation {
                JobMutation::Create(_) => "create_job",
                JobMutation::Update(..) => "update_job",
                JobMutation::Delete(_) => "delete_job",
            },
        }
    }
}
