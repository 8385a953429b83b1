//! UI/backend events and error modeling for desktop GUI controller.

use client_core::ClientError;
use shared::domain::{JobPosting, MutationKind};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Error(UiError),
    JobsLoaded {
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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    NotFound,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Refresh,
    Create,
    Update,
    Delete,
}

impl UiErrorContext {
    pub fn for_mutation(kind: MutationKind) -> Self {
        match kind {
            MutationKind::Create => UiErrorContext::Create,
            MutationKind::Update(_) => UiErrorContext::Update,
            MutationKind::Delete(_) => UiErrorContext::Delete,
        }
    }

    fn action_label(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "start backend worker",
            UiErrorContext::Refresh => "load postings",
            UiErrorContext::Create => "add posting",
            UiErrorContext::Update => "update posting",
            UiErrorContext::Delete => "delete posting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("not found") || message_lower.contains("404") {
            UiErrorCategory::NotFound
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("required")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Prefers the HTTP status over message sniffing when one is available.
    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport(inner) if inner.is_decode() => UiErrorCategory::Server,
            ClientError::Transport(inner) if inner.status().is_none() => UiErrorCategory::Transport,
            _ => match err.status() {
                Some(404) => UiErrorCategory::NotFound,
                Some(400) | Some(422) => UiErrorCategory::Validation,
                Some(status) if status >= 500 => UiErrorCategory::Server,
                _ => return Self::from_message(context, err.to_string()),
            },
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    /// One-line text for the status banner.
    pub fn summary(&self) -> String {
        let hint = match self.category {
            UiErrorCategory::Transport => " Server unreachable; check the server URL and retry.",
            UiErrorCategory::NotFound => " The posting no longer exists; the list will refresh.",
            UiErrorCategory::Server => " The server failed; retry later.",
            UiErrorCategory::Validation | UiErrorCategory::Unknown => "",
        };
        format!(
            "Could not {}: {}.{hint}",
            self.context.action_label(),
            self.message
        )
    }
}
