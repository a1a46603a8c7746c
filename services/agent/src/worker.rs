//! Agent workers: one tokio task per hosted room, running the room's agent
//! kind until the call ends, then closing the room.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use collections_core::{CallIo, CallRoom, Participant, Prompts, run_job};
use openai_realtime::RealtimeClient;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::server::rooms::{PendingRoom, RoomInfo, RoomRegistry};

/// How long a fresh room waits for its caller before the agent gives up.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Opens a realtime connection for one call.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RealtimeClient>>;
}

pub struct OpenAiConnect {
    config: Arc<Config>,
}

impl OpenAiConnect {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connect for OpenAiConnect {
    async fn connect(&self) -> Result<Box<dyn RealtimeClient>> {
        let realtime = self.config.realtime()?;
        tracing::debug!("Connecting to realtime model {}", realtime.model());
        let client = openai_realtime::connect_with_config(
            crate::config::CALL_CHANNEL_CAPACITY * 4,
            realtime,
        )
        .await?;
        Ok(Box::new(client))
    }
}

pub struct HostedRoom {
    info: RoomInfo,
    caller: Option<oneshot::Receiver<(Participant, CallIo)>>,
    join_timeout: Duration,
}

impl HostedRoom {
    pub fn new(pending: PendingRoom, join_timeout: Duration) -> Self {
        Self {
            info: pending.info,
            caller: Some(pending.caller),
            join_timeout,
        }
    }
}

#[async_trait]
impl CallRoom for HostedRoom {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn metadata(&self) -> Option<&str> {
        self.info.metadata.as_deref()
    }

    async fn wait_for_participant(&mut self) -> Result<(Participant, CallIo)> {
        let caller = self.caller.take().context("Participant already joined")?;
        tokio::time::timeout(self.join_timeout, caller)
            .await
            .context("Timed out waiting for a caller")?
            .context("Room closed before a caller joined")
    }
}

/// Runs the room's agent in the background and removes the room afterwards.
pub fn spawn_agent(
    rooms: RoomRegistry,
    prompts: Arc<Prompts>,
    connector: Arc<dyn Connect>,
    pending: PendingRoom,
    join_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = pending.info.name.clone();
        let kind = pending.info.kind;
        let room = HostedRoom::new(pending, join_timeout);
        let today = Local::now().date_naive();

        let result = run_job(room, kind, &prompts, today, || async move {
            connector.connect().await
        })
        .await;
        match result {
            Ok(context) => tracing::info!(
                "Call in room {} finished after {} turns",
                name,
                context.turns()
            ),
            Err(e) => tracing::error!("Agent in room {} stopped: {:#}", name, e),
        }
        rooms.remove(&name);
    })
}
