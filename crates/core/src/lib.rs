//! Voice agents for a general assistant and for inbound and outbound debt
//! collection calls, on top of the OpenAI Realtime API.
pub mod context;
pub mod customer;
pub mod error;
pub mod events;
pub mod functions;
pub mod job;
pub mod outcome;
pub mod payments;
pub mod profile;
pub mod prompts;
pub mod session;

pub use context::{ChatMessage, ChatRole, ConversationContext};
pub use customer::CustomerInfo;
pub use error::{FunctionError, MetadataError, PromptError};
pub use events::{AgentEvent, EventBus, EventObserver};
pub use functions::FunctionContext;
pub use job::{CallRoom, Participant, PreparedAgent, run_job};
pub use profile::{AgentKind, AgentProfile, VoiceProfile};
pub use prompts::Prompts;
pub use session::{AgentAudio, AgentSession, CallIo, CallerEvent};
