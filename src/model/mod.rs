//! Core data model: content tree, parts, structured objects and buttons.

pub mod address;
pub mod attachment;
pub mod button;
pub mod content;
pub mod part;
pub mod structured;

pub use address::Mailbox;
pub use attachment::{ParseableAttachmentRef, ParseableKind};
pub use button::ButtonDescription;
pub use content::{ContentNode, EmbeddedHeaders, FlattenResult, MessageContent, TextFormat};
pub use part::Part;
pub use structured::{Source, StructuredObject};
