//! # Lab Sample
//!
//! Boots the standard lab under the orchestrator and walks through a session:
//!
//! 1. Boot every subsystem in tier order.
//! 2. Exchange a few messages between subsystems.
//! 3. Take the audio subsystem down and watch the health monitor notice.
//! 4. Bring it back, print the JSON status report and shut down.
//!
//! Configuration comes from `ORCHESTRATOR_*` environment variables, e.g.
//! `ORCHESTRATOR_HEALTH_CHECK_INTERVAL_MS=1000 RUST_LOG=info cargo run -p lab-sample`.

use lab_sample::error::LabError;
use lab_sample::lifecycle::LabSystem;
use orchestrator_core::tracing::setup_tracing;
use orchestrator_core::OrchestratorConfig;
use serde_json::json;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), LabError> {
    setup_tracing();

    let config = OrchestratorConfig::from_env()?;
    let sweep_wait = config.health_check_interval() + config.tick_interval() * 2;
    info!(?config, "Starting lab");

    let lab = LabSystem::new(config)?;

    let mut events = lab.client.subscribe_events().await?;
    let watcher = tokio::spawn(
        async move {
            loop {
                match events.recv().await {
                    Ok(event) => info!(kind = ?event.kind(), ?event, "Event"),
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event watcher lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        }
        .instrument(tracing::info_span!("events")),
    );

    let report = lab.boot().await?;
    info!(initialized = report.initialized.len(), "Boot complete");

    let span = tracing::info_span!("session");
    async {
        lab.client
            .send_message("ui", "chemistry", "reaction.start", json!({"reagents": ["HCl", "NaOH"]}))
            .await?;
        lab.client
            .send_message("chemistry", "safety", "hazard.check", json!({"temperature_c": 42.5}))
            .await?;
        lab.client
            .send_message("ui", "audio", "sound.play", json!({"clip": "bubbling"}))
            .await?;

        let tick = lab.client.tick().await?;
        info!(dispatch = ?tick.dispatch, "Messages dispatched");
        for subsystem in lab.subsystems() {
            let inbox = subsystem.inbox();
            if !inbox.is_empty() {
                info!(subsystem = subsystem.id(), received = inbox.len(), "Inbox");
            }
        }
        Ok::<_, LabError>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("audio_outage");
    async {
        lab.subsystem("audio")?.set_alive(false);
        tokio::time::sleep(sweep_wait).await;
        if let Some(status) = lab.client.component_status("audio").await? {
            warn!(
                healthy = status.is_healthy,
                errors = status.error_count,
                message = %status.status_message,
                "Audio status during outage"
            );
        }
        info!(healthy = lab.client.is_system_healthy().await?, "System health");

        lab.subsystem("audio")?.set_alive(true);
        tokio::time::sleep(sweep_wait).await;
        info!(healthy = lab.client.is_system_healthy().await?, "System health after recovery");
        Ok::<_, LabError>(())
    }
    .instrument(span)
    .await?;

    let status = lab.client.status_report().await?;
    match serde_json::to_string_pretty(&status) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "Could not render status report"),
    }

    lab.shutdown().await?;
    if let Err(e) = watcher.await {
        error!(error = %e, "Event watcher failed");
    }

    info!("Lab session completed");
    Ok(())
}
