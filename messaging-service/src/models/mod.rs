pub mod conversation;
pub mod message;

pub use conversation::{ConversationSummary, LastMessage, ParticipantProfile};
pub use message::{Message, MessageWithSender};
