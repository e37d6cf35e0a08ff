//! Backend worker: a dedicated thread owning a tokio runtime and the HTTP
//! client. Every command yields exactly one terminal event back to the UI,
//! success or failure, so the loading overlay is always released.

use std::thread;

use client_core::StudioClient;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn start_backend_bridge(
    server_url: String,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
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
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = match StudioClient::new(&server_url) {
                Ok(client) => client,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("invalid studio server url: {err}");
                    return;
                }
            };
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                let event = match cmd {
                    BackendCommand::GenerateScreenplay { story, genre } => {
                        tracing::info!(genre = %genre, "backend: generate_screenplay");
                        match client.generate_screenplay(&story, &genre).await {
                            Ok(content) => UiEvent::ScreenplayGenerated { content, genre },
                            Err(err) => {
                                tracing::error!("backend: generate_screenplay failed: {err}");
                                UiEvent::Error(UiError::from_client(
                                    UiErrorContext::GenerateScreenplay,
                                    &err,
                                ))
                            }
                        }
                    }
                    BackendCommand::GenerateFollowUp { step } => {
                        tracing::info!(step = %step.step(), "backend: generate_follow_up");
                        match client.generate_next(step).await {
                            Ok(content) => UiEvent::FollowUpGenerated { step, content },
                            Err(err) => {
                                tracing::error!(
                                    step = %step.step(),
                                    "backend: generate_follow_up failed: {err}"
                                );
                                UiEvent::Error(UiError::from_client(
                                    UiErrorContext::GenerateFollowUp,
                                    &err,
                                ))
                            }
                        }
                    }
                    BackendCommand::ExportBible {
                        format,
                        destination,
                    } => {
                        tracing::info!(destination = %destination.display(), "backend: export_bible");
                        match client.export_bible(format).await {
                            Ok(bytes) => match tokio::fs::write(&destination, &bytes).await {
                                Ok(()) => UiEvent::BibleExported(destination),
                                Err(err) => {
                                    tracing::error!(
                                        destination = %destination.display(),
                                        "backend: writing export failed: {err}"
                                    );
                                    UiEvent::Error(UiError::from_message(
                                        UiErrorContext::Export,
                                        format!("could not write export file: {err}"),
                                    ))
                                }
                            },
                            Err(err) => {
                                tracing::error!("backend: export_bible failed: {err}");
                                UiEvent::Error(UiError::from_client(UiErrorContext::Export, &err))
                            }
                        }
                    }
                };
                let _ = ui_tx.try_send(event);
            }
        });
    });
}
