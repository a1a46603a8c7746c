//! Wire types for the OpenAI Realtime API, limited to what a voice agent
//! with function calling needs.
pub mod session;
pub mod tools;
pub mod audio;
pub mod events;
mod content;

pub use session::{ResponseConfig, Session};
pub use content::items::{FunctionCallItem, FunctionCallOutputItem, Item, ItemStatus};
pub use content::message::*;
pub use events::{ClientEvent, ServerEvent};
