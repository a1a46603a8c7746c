//! Wiring an agent kind to a room: build its profile, functions and
//! observers, wait for the participant, then run the session.

use std::future::Future;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use openai_realtime::RealtimeClient;

use crate::context::ConversationContext;
use crate::customer::CustomerInfo;
use crate::events::EventBus;
use crate::functions::{
    AssistantFunctions, CollectionsFunctions, FunctionContext, OutboundFunctions,
};
use crate::profile::{AgentKind, AgentProfile};
use crate::prompts::Prompts;
use crate::session::{AgentSession, CallIo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub identity: String,
}

/// A place a call happens: a hosted room, a local sound card, a test harness.
#[async_trait]
pub trait CallRoom: Send {
    fn name(&self) -> &str;

    /// Raw JSON attached by whoever created the room.
    fn metadata(&self) -> Option<&str>;

    /// Resolves once a remote participant has joined.
    async fn wait_for_participant(&mut self) -> Result<(Participant, CallIo)>;
}

/// Everything a session needs except the connection.
pub struct PreparedAgent {
    pub profile: AgentProfile,
    pub functions: Box<dyn FunctionContext>,
    pub events: EventBus,
}

impl PreparedAgent {
    pub fn prepare(
        kind: AgentKind,
        metadata: Option<&str>,
        prompts: &Prompts,
        today: NaiveDate,
    ) -> Result<Self> {
        let (profile, functions): (AgentProfile, Box<dyn FunctionContext>) = match kind {
            AgentKind::Assistant => (
                AgentProfile::build(kind, prompts, None, today)?,
                Box::new(AssistantFunctions::new()),
            ),
            AgentKind::Collections => (
                AgentProfile::build(kind, prompts, None, today)?,
                Box::new(CollectionsFunctions::new()),
            ),
            AgentKind::Outbound => {
                let customer = CustomerInfo::from_metadata(metadata, today).inspect_err(|e| {
                    tracing::error!("Rejecting outbound call, bad room metadata: {}", e);
                })?;
                tracing::info!(
                    "Initiating outbound call to {} for {}",
                    customer.phone_number,
                    customer.customer_name
                );
                (
                    AgentProfile::build(kind, prompts, Some(&customer), today)?,
                    Box::new(OutboundFunctions::new(customer)),
                )
            }
        };
        Ok(Self {
            profile,
            functions,
            events: EventBus::for_kind(kind),
        })
    }
}

/// Runs one agent job to completion. `connect` is only called once the
/// participant is present so no realtime session idles in an empty room.
pub async fn run_job<R, C, F, Fut>(
    mut room: R,
    kind: AgentKind,
    prompts: &Prompts,
    today: NaiveDate,
    connect: F,
) -> Result<ConversationContext>
where
    R: CallRoom,
    C: RealtimeClient,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<C>>,
{
    tracing::info!("Starting {} agent for room {}", kind, room.name());
    let agent = PreparedAgent::prepare(kind, room.metadata(), prompts, today)?;

    let (participant, io) = room
        .wait_for_participant()
        .await
        .context("No participant joined")?;
    tracing::info!("Participant connected: {}", participant.identity);

    let client = connect().await.context("Failed to connect to realtime API")?;
    let session = AgentSession::new(
        client,
        agent.profile,
        agent.functions,
        agent.events,
        io.agent_tx,
    );
    session.run(&participant.identity, io.caller_rx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    struct NeverJoins {
        metadata: Option<String>,
    }

    #[async_trait]
    impl CallRoom for NeverJoins {
        fn name(&self) -> &str {
            "empty-room"
        }

        fn metadata(&self) -> Option<&str> {
            self.metadata.as_deref()
        }

        async fn wait_for_participant(&mut self) -> Result<(Participant, CallIo)> {
            anyhow::bail!("room closed")
        }
    }

    #[test]
    fn prepare_wires_functions_and_observers_per_kind() {
        let prompts = Prompts::builtin();
        let assistant =
            PreparedAgent::prepare(AgentKind::Assistant, None, &prompts, today()).unwrap();
        assert_eq!(assistant.functions.tools().len(), 2);
        assert_eq!(assistant.events.len(), 3);

        let collections =
            PreparedAgent::prepare(AgentKind::Collections, None, &prompts, today()).unwrap();
        assert_eq!(collections.functions.tools().len(), 6);
        assert_eq!(collections.events.len(), 4);

        let outbound = PreparedAgent::prepare(
            AgentKind::Outbound,
            Some(r#"{"phoneNumber":"+15550100","customerName":"Ana Ruiz","amountOwed":"250.00"}"#),
            &prompts,
            today(),
        )
        .unwrap();
        assert_eq!(outbound.functions.tools().len(), 6);
        assert!(outbound.profile.greeting.contains("$250.00"));
    }

    #[test]
    fn outbound_with_bad_metadata_is_rejected() {
        let prompts = Prompts::builtin();
        let bad = Some("{not json");
        let result = PreparedAgent::prepare(AgentKind::Outbound, bad, &prompts, today());
        assert!(result.is_err());
        // Metadata is ignored by the other kinds.
        assert!(PreparedAgent::prepare(AgentKind::Collections, bad, &prompts, today()).is_ok());
    }

    #[tokio::test]
    async fn no_connection_without_participant() {
        let room = NeverJoins { metadata: None };
        let result = run_job(room, AgentKind::Assistant, &Prompts::builtin(), today(), || async {
            Err::<openai_realtime::Client, _>(anyhow::anyhow!("connect must not be called"))
        })
        .await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("No participant joined"), "{message}");
    }
}
