//! Parsers for the collaborators the pipeline consumes: MIME structure,
//! HTML/text transforms, clear-signed text, iCalendar and structured data.

pub mod clearsign;
pub mod html;
pub mod ics;
pub mod jsonld;
pub mod mime;

pub use ics::{CalendarParser, IcsParser};
pub use jsonld::{ScraperParser, StructuredDataParser};
