//! In-process call rooms. Each room has one agent participant and room for
//! a single caller; the websocket handler attaches the caller, the agent
//! worker receives the matching [`CallIo`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use collections_core::{AgentAudio, AgentKind, CallIo, CallerEvent, Participant};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::config::CALL_CHANNEL_CAPACITY;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room '{0}' already exists")]
    AlreadyExists(String),
    #[error("room '{0}' not found")]
    NotFound(String),
    #[error("room '{0}' already has a caller")]
    Occupied(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub identity: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub name: String,
    pub sid: String,
    pub kind: AgentKind,
    /// Raw JSON, as supplied by whoever created the room.
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<ParticipantInfo>,
}

type CallerSlot = oneshot::Sender<(Participant, CallIo)>;

struct RoomEntry {
    info: RoomInfo,
    caller_slot: Option<CallerSlot>,
}

/// The caller's ends of a call.
pub struct CallerLink {
    pub caller_tx: mpsc::Sender<CallerEvent>,
    pub agent_rx: mpsc::Receiver<AgentAudio>,
}

/// The agent's view of a room until a caller arrives.
pub struct PendingRoom {
    pub info: RoomInfo,
    pub caller: oneshot::Receiver<(Participant, CallIo)>,
}

#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<String, RoomEntry>>>,
}

pub fn agent_identity(room: &str) -> String {
    format!("agent-{room}")
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RoomEntry>> {
        // A panic while holding the lock leaves the map itself consistent.
        self.rooms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers the room with its agent already present.
    pub fn create(
        &self,
        name: &str,
        kind: AgentKind,
        metadata: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<PendingRoom, RoomError> {
        let mut rooms = self.lock();
        if rooms.contains_key(name) {
            return Err(RoomError::AlreadyExists(name.to_string()));
        }
        let info = RoomInfo {
            name: name.to_string(),
            sid: format!("RM_{}", now.timestamp_micros()),
            kind,
            metadata,
            created_at: now,
            participants: vec![ParticipantInfo {
                identity: agent_identity(name),
                name: format!("{} agent", kind),
                joined_at: now,
            }],
        };
        let (slot_tx, slot_rx) = oneshot::channel();
        rooms.insert(
            name.to_string(),
            RoomEntry {
                info: info.clone(),
                caller_slot: Some(slot_tx),
            },
        );
        tracing::info!("Room {} created for {} agent", name, kind);
        Ok(PendingRoom {
            info,
            caller: slot_rx,
        })
    }

    pub fn get(&self, name: &str) -> Option<RoomInfo> {
        self.lock().get(name).map(|entry| entry.info.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Attaches the caller and hands the agent its side of the call.
    pub fn join(
        &self,
        name: &str,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Result<CallerLink, RoomError> {
        let mut rooms = self.lock();
        let entry = rooms
            .get_mut(name)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))?;
        let slot = entry
            .caller_slot
            .take()
            .ok_or_else(|| RoomError::Occupied(name.to_string()))?;

        let (caller_tx, caller_rx) = mpsc::channel(CALL_CHANNEL_CAPACITY);
        let (agent_tx, agent_rx) = mpsc::channel(CALL_CHANNEL_CAPACITY);
        let participant = Participant {
            identity: identity.to_string(),
        };
        if slot.send((participant, CallIo { caller_rx, agent_tx })).is_err() {
            // The agent worker is gone; the room is on its way out.
            return Err(RoomError::NotFound(name.to_string()));
        }
        entry.info.participants.push(ParticipantInfo {
            identity: identity.to_string(),
            name: identity.to_string(),
            joined_at: now,
        });
        Ok(CallerLink {
            caller_tx,
            agent_rx,
        })
    }

    pub fn leave(&self, name: &str, identity: &str) {
        if let Some(entry) = self.lock().get_mut(name) {
            entry.info.participants.retain(|p| p.identity != identity);
        }
    }

    pub fn remove(&self, name: &str) -> Option<RoomInfo> {
        let removed = self.lock().remove(name).map(|entry| entry.info);
        if removed.is_some() {
            tracing::info!("Room {} closed", name);
        }
        removed
    }
}
