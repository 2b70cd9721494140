//! Gateway: the main event loop connecting channels, the task store, and the provider.
//!
//! Incoming messages are classified and routed in `pipeline`; the background
//! `scheduler` announces recurring tasks and delivers due reminders.

pub mod intent;
mod pipeline;
mod scheduler;


use pomni_core::{
    config::{Config, RouterConfig, SchedulerConfig},
    context::Context,
    error::PomniError,
    message::{IncomingMessage, OutgoingMessage},
    traits::{Channel, Provider},
};
use pipeline::Outcome;
use pomni_memory::Store;
use scheduler::Scheduler;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// The central gateway that routes messages between channels, storage, and the provider.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) memory: Store,
    pub(super) scheduler_config: SchedulerConfig,
    pub(super) router_config: RouterConfig,
    pub(super) language: String,
    /// Upper bound on a single provider call.
    pub(super) provider_timeout: Duration,
    /// Upper bound on a single outbound send.
    pub(super) send_timeout: Duration,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        provider: Arc<dyn Provider>,
        channels: HashMap<String, Arc<dyn Channel>>,
        memory: Store,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            channels,
            memory,
            scheduler_config: config.scheduler.clone(),
            router_config: config.router.clone(),
            language: config.pomni.language.clone(),
            provider_timeout: Duration::from_secs(config.provider.timeout_secs),
            send_timeout: Duration::from_secs(config.channel.send_timeout_secs),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Pomni gateway running | provider: {} | channels: {} | scheduler: {}",
            self.provider.name(),
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            if self.scheduler_config.enabled {
                "enabled"
            } else {
                "disabled"
            },
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        let sched_handle = if self.scheduler_config.enabled {
            let scheduler = self.scheduler();
            Some(tokio::spawn(async move {
                scheduler.run().await;
            }))
        } else {
            None
        };

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(incoming) = msg else {
                        warn!("all channels closed, stopping gateway");
                        break;
                    };
                    let gw = self.clone();
                    tokio::spawn(async move {
                        match gw.handle_message(incoming).await {
                            Outcome::Stored(task) => {
                                info!("stored task {} for {}", task.id, task.owner_id)
                            }
                            Outcome::Answered(intent) => debug!("answered {intent:?}"),
                            Outcome::Failed(intent) => warn!("message handling failed at {intent:?}"),
                            Outcome::Command => {}
                        }
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(&sched_handle).await;
        Ok(())
    }

    /// Detach the state the background scheduler needs.
    fn scheduler(&self) -> Scheduler {
        Scheduler {
            store: self.memory.clone(),
            channels: self.channels.clone(),
            config: self.scheduler_config.clone(),
            language: self.language.clone(),
            send_timeout: self.send_timeout,
        }
    }

    /// Graceful shutdown: stop the scheduler, then the channels.
    async fn shutdown(&self, sched_handle: &Option<tokio::task::JoinHandle<()>>) {
        info!("Shutting down...");

        if let Some(h) = sched_handle {
            h.abort();
        }

        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        info!("Shutdown complete.");
    }

    /// Send a plain text message back to the sender, logging failures.
    pub(super) async fn send_text(&self, incoming: &IncomingMessage, text: &str) -> bool {
        match deliver_text(
            &self.channels,
            &incoming.channel,
            incoming.target(),
            text,
            self.send_timeout,
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                error!("failed to send message to {}: {e}", incoming.sender_id);
                false
            }
        }
    }
}

/// Ask the provider for an answer, bounded by `limit`.
pub(crate) async fn complete_within(
    provider: &dyn Provider,
    context: &Context,
    limit: Duration,
) -> Result<String, PomniError> {
    match tokio::time::timeout(limit, provider.complete(context)).await {
        Ok(result) => result.map(|response| response.text),
        Err(_) => Err(PomniError::Timeout(limit.as_secs())),
    }
}

fn channel_for<'a>(
    channels: &'a HashMap<String, Arc<dyn Channel>>,
    name: &str,
) -> Result<&'a Arc<dyn Channel>, PomniError> {
    channels
        .get(name)
        .ok_or_else(|| PomniError::Transport(format!("no channel named '{name}'")))
}

/// Send `text` to `target` on the named channel, bounded by `limit`.
pub(super) async fn deliver_text(
    channels: &HashMap<String, Arc<dyn Channel>>,
    channel_name: &str,
    target: &str,
    text: &str,
    limit: Duration,
) -> Result<(), PomniError> {
    let channel = channel_for(channels, channel_name)?;
    tokio::time::timeout(limit, channel.send(OutgoingMessage::text(target, text)))
        .await
        .map_err(|_| PomniError::Timeout(limit.as_secs()))?
}

/// Send `content` as a file attachment, bounded by `limit`.
pub(super) async fn deliver_document(
    channels: &HashMap<String, Arc<dyn Channel>>,
    channel_name: &str,
    target: &str,
    filename: &str,
    content: &[u8],
    limit: Duration,
) -> Result<(), PomniError> {
    let channel = channel_for(channels, channel_name)?;
    tokio::time::timeout(limit, channel.send_document(target, filename, content))
        .await
        .map_err(|_| PomniError::Timeout(limit.as_secs()))?
}
