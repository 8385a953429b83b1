//! Runtime bridge between the UI command queue and the HTTP client.
//!
//! Every command runs as its own task, so completions can reach the UI in any
//! order. Refresh results carry their generation for the reducer to sort out.

use std::{sync::Arc, thread};

use client_core::{JobsApi, JobsClient};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, error, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(server_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let api: Arc<dyn JobsApi> = match JobsClient::new(&server_url) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                    UiErrorContext::BackendStartup,
                    &err,
                )));
                error!("failed to build jobs client for {server_url}: {err}");
                return;
            }
        };
        info!(%server_url, "backend worker ready");
        let _ = ui_tx.try_send(UiEvent::Info(format!("Connected to {server_url}")));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "backend command received");
                let api = Arc::clone(&api);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = handle_command(api.as_ref(), cmd).await;
                    deliver(&ui_tx, event);
                });
            }
            debug!("command queue closed; backend worker stopping");
        });
    });
}

pub async fn handle_command(api: &dyn JobsApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::Refresh { generation, filter } => match api.list_jobs(&filter).await {
            Ok(jobs) => UiEvent::JobsLoaded { generation, jobs },
            Err(err) => {
                warn!(generation, "refresh failed: {err}");
                UiEvent::RefreshFailed {
                    generation,
                    error: UiError::from_client(UiErrorContext::Refresh, &err),
                }
            }
        },
        BackendCommand::Mutate { mutation } => {
            let kind = mutation.kind();
            match api.apply(&mutation).await {
                Ok(()) => UiEvent::MutationSucceeded(kind),
                Err(err) => {
                    warn!(verb = kind.verb(), "mutation failed: {err}");
                    UiEvent::MutationFailed {
                        kind,
                        error: UiError::from_client(UiErrorContext::for_mutation(kind), &err),
                    }
                }
            }
        }
    }
}

fn deliver(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            warn!("ui event queue full; waiting on the blocking pool for {event:?}");
            let ui_tx = ui_tx.clone();
            tokio::task::spawn_blocking(move || {
                let _ = ui_tx.send(event);
            });
        }
        Err(TrySendError::Disconnected(_)) => debug!("ui closed; dropping backend event"),
    }
}
