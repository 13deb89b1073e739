//! `mailcards`: render email bodies and the structured data they carry.
//!
//! The library flattens a message's viewable parts into parallel text and
//! HTML renditions, extracts JSON-LD, microdata and iCalendar objects, and
//! renders them as interactive cards with action buttons. See
//! [`pipeline::MessageViewExtractor`] for the end-to-end entry point.

pub mod buttons;
pub mod compose;
pub mod config;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod i18n;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod template;
