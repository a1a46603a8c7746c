//! Session events and the observers that log them.

use std::time::Duration;

use crate::outcome::{CollectionsOutcome, OutcomeUpdate};
use crate::profile::AgentKind;

#[derive(Debug, Clone, PartialEq)]
pub struct CalledFunction {
    pub name: String,
    pub arguments: String,
    pub result: String,
    /// The result is an error payload rather than the function's own output.
    pub failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub total: u32,
    pub input: u32,
    pub output: u32,
}

/// Timing of one model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMetrics {
    pub response_id: String,
    /// From `response.created` to the first audio delta; `None` for silent responses.
    pub ttf: Option<Duration>,
    /// From `response.created` to `response.done`.
    pub processing_time: Duration,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    UserSpeechCommitted(String),
    AgentSpeechCommitted(String),
    FunctionCallsFinished(Vec<CalledFunction>),
    MetricsCollected(ResponseMetrics),
    ParticipantDisconnected { identity: String, duration: Duration },
}

pub trait EventObserver: Send {
    fn on_event(&mut self, event: &AgentEvent);
}

impl<F> EventObserver for F
where
    F: FnMut(&AgentEvent) + Send,
{
    fn on_event(&mut self, event: &AgentEvent) {
        self(event)
    }
}

/// Observers in subscription order.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn EventObserver>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The logging and tracking observers each agent kind runs with.
    pub fn for_kind(kind: AgentKind) -> Self {
        let mut bus = Self::new();
        bus.subscribe(ConversationLogger::for_kind(kind));
        match kind {
            AgentKind::Assistant => {
                bus.subscribe(FunctionLogger::with_results());
                bus.subscribe(MetricsLogger);
            }
            AgentKind::Collections => {
                bus.subscribe(FunctionLogger::with_results());
                bus.subscribe(MetricsLogger);
                bus.subscribe(CollectionsOutcomeTracker::default());
            }
            AgentKind::Outbound => {
                bus.subscribe(FunctionLogger::names_only());
                bus.subscribe(CallDurationLogger);
            }
        }
        bus
    }

    pub fn subscribe(&mut self, observer: impl EventObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: &AgentEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

pub struct ConversationLogger {
    caller_label: &'static str,
    agent_label: &'static str,
}

impl ConversationLogger {
    pub fn for_kind(kind: AgentKind) -> Self {
        Self {
            caller_label: kind.caller_label(),
            agent_label: kind.agent_label(),
        }
    }
}

impl EventObserver for ConversationLogger {
    fn on_event(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::UserSpeechCommitted(text) => {
                tracing::info!("{}: {}", self.caller_label, text)
            }
            AgentEvent::AgentSpeechCommitted(text) => {
                tracing::info!("{}: {}", self.agent_label, text)
            }
            _ => {}
        }
    }
}

pub struct FunctionLogger {
    include_results: bool,
}

impl FunctionLogger {
    pub fn with_results() -> Self {
        Self {
            include_results: true,
        }
    }

    pub fn names_only() -> Self {
        Self {
            include_results: false,
        }
    }
}

impl EventObserver for FunctionLogger {
    fn on_event(&mut self, event: &AgentEvent) {
        let AgentEvent::FunctionCallsFinished(calls) = event else {
            return;
        };
        for call in calls {
            if call.failed {
                tracing::warn!("Function {} failed: {}", call.name, call.result);
            } else if self.include_results {
                tracing::info!("Function called: {} with result: {}", call.name, call.result);
            } else {
                tracing::info!("Function called: {}", call.name);
            }
        }
    }
}

pub struct MetricsLogger;

impl EventObserver for MetricsLogger {
    fn on_event(&mut self, event: &AgentEvent) {
        let AgentEvent::MetricsCollected(metrics) = event else {
            return;
        };
        let ttf = metrics.ttf.unwrap_or_default().as_secs_f64();
        tracing::info!(
            "Metrics - TTF: {:.2}s, Processing: {:.2}s",
            ttf,
            metrics.processing_time.as_secs_f64()
        );
        if let Some(usage) = metrics.usage {
            tracing::debug!(
                "Tokens - total: {}, input: {}, output: {}",
                usage.total,
                usage.input,
                usage.output
            );
        }
    }
}

/// Tracks payments and arrangements on inbound calls and reports them on hang-up.
#[derive(Debug, Default)]
pub struct CollectionsOutcomeTracker {
    outcome: CollectionsOutcome,
}

impl CollectionsOutcomeTracker {
    pub fn outcome(&self) -> &CollectionsOutcome {
        &self.outcome
    }
}

impl EventObserver for CollectionsOutcomeTracker {
    fn on_event(&mut self, event: &AgentEvent) {
        match event {
            AgentEvent::FunctionCallsFinished(calls) => {
                for call in calls.iter().filter(|c| !c.failed) {
                    match self.outcome.record(&call.name, &call.result) {
                        Some(OutcomeUpdate::PaymentCollected(amount)) => {
                            tracing::info!("Payment collected: ${}", amount)
                        }
                        Some(OutcomeUpdate::ArrangementMade) => {
                            tracing::info!("Payment arrangement established")
                        }
                        None => {}
                    }
                }
            }
            AgentEvent::ParticipantDisconnected { duration, .. } => {
                tracing::info!(
                    "Call ended - Duration: {:.0}s, Payment: {}, Arrangement: {}",
                    duration.as_secs_f64(),
                    self.outcome.payment_collected,
                    self.outcome.arrangement_made
                );
            }
            _ => {}
        }
    }
}

pub struct CallDurationLogger;

impl EventObserver for CallDurationLogger {
    fn on_event(&mut self, event: &AgentEvent) {
        if let AgentEvent::ParticipantDisconnected { duration, .. } = event {
            tracing::info!("Call ended - Duration: {:.0}s", duration.as_secs_f64());
        }
    }
}
