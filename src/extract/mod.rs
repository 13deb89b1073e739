//! Structured-data extraction: JSON-LD or microdata from the HTML body,
//! calendar attachments and explicit `application/ld+json` parts, merged in
//! that order, with a heuristic fallback when nothing was found.

pub mod heuristic;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CardsError, Result};
use crate::model::{ParseableAttachmentRef, ParseableKind, Part, Source, StructuredObject};
use crate::parser::{CalendarParser, IcsParser, ScraperParser, StructuredDataParser};

pub use heuristic::{should_try_to_derive, DerivationHint};

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Objects in source order: HTML, then calendar attachments, then ld+json parts.
    pub objects: Vec<StructuredObject>,
    /// Derived object, only computed when `objects` is empty.
    pub heuristic: Option<StructuredObject>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.heuristic.is_none()
    }
}

/// Extracts structured objects from a flattened message.
pub struct StructuredDataExtractor {
    parser: Box<dyn StructuredDataParser + Send + Sync>,
    calendar: Box<dyn CalendarParser + Send + Sync>,
    skip_types: Vec<String>,
}

impl Default for StructuredDataExtractor {
    fn default() -> Self {
        Self::new(Box::new(ScraperParser), Box::new(IcsParser))
    }
}

impl StructuredDataExtractor {
    pub fn new(
        parser: Box<dyn StructuredDataParser + Send + Sync>,
        calendar: Box<dyn CalendarParser + Send + Sync>,
    ) -> Self {
        Self {
            parser,
            calendar,
            skip_types: Vec::new(),
        }
    }

    /// Types dropped when a message carries more than one object.
    pub fn with_skip_types(mut self, skip_types: Vec<String>) -> Self {
        self.skip_types = skip_types;
        self
    }

    /// Extract every structured object. Malformed payloads are logged and skipped.
    ///
    /// With more than one object, skip-listed types are dropped before the
    /// heuristic runs, so a message left empty still gets a derived object.
    /// `text` is the plain rendition, used to cross-check heuristic candidates.
    pub fn extract(
        &self,
        html: &str,
        text: &str,
        attachments: &[ParseableAttachmentRef],
        ld_json_parts: &[Part],
        hint: Option<DerivationHint>,
    ) -> Extraction {
        let mut objects = collect(self.parser.parse_json_ld(html), Source::JsonLd);
        if objects.is_empty() {
            objects = collect(self.parser.parse_microdata(html), Source::Microdata);
        }

        for attachment in attachments {
            match self.from_attachment(attachment) {
                Ok(Some(obj)) => objects.push(obj),
                Ok(None) => {}
                Err(e) => warn!(
                    attachment = attachment.attachment.display_name(),
                    error = %e,
                    "Skipping attachment"
                ),
            }
        }

        for part in ld_json_parts {
            match part.read_text() {
                Ok(body) => objects.extend(collect(
                    self.parser.parse_from_json_text(&body),
                    Source::LdJsonPart,
                )),
                Err(e) => warn!(error = %e, "Skipping unreadable ld+json part"),
            }
        }

        if objects.len() > 1 {
            objects.retain(|obj| {
                let skip = obj
                    .schema_type()
                    .is_some_and(|t| self.skip_types.iter().any(|s| s == t));
                if skip {
                    debug!(schema_type = obj.schema_type(), "Skipping type in multi-object message");
                }
                !skip
            });
        }

        let heuristic = match hint {
            Some(hint) if objects.is_empty() => heuristic::derive(hint, html, text),
            _ => None,
        };

        debug!(
            objects = objects.len(),
            heuristic = heuristic.is_some(),
            "Structured data extracted"
        );
        Extraction { objects, heuristic }
    }

    /// The first event of a calendar attachment, if it has one.
    fn from_attachment(&self, attachment: &ParseableAttachmentRef) -> Result<Option<StructuredObject>> {
        match attachment.kind {
            ParseableKind::Ics => {}
            ParseableKind::Vcard | ParseableKind::Pkpass => {
                debug!(kind = attachment.kind.extension(), "No parser for attachment kind");
                return Ok(None);
            }
        }
        if !attachment.attachment.is_available() {
            debug!(
                attachment = attachment.attachment.display_name(),
                "Calendar attachment not loaded yet"
            );
            return Ok(None);
        }

        let bytes = attachment.attachment.read_body()?;
        let calendar = self
            .calendar
            .parse_calendar(bytes)
            .map_err(|e| CardsError::parse("calendar", e))?;
        Ok(calendar
            .events
            .first()
            .map(|ev| StructuredObject::new(ev.to_structured(calendar.method.as_deref()), Source::Calendar)))
    }
}

/// Turn parser output into objects, logging and dropping failures.
fn collect(results: Vec<Result<Value>>, source: Source) -> Vec<StructuredObject> {
    let mut objects = Vec::new();
    for result in results {
        match result {
            Ok(value) => objects.extend(explode(value, source)),
            Err(e) => warn!(source = source.as_str(), error = %e, "Skipping structured data"),
        }
    }
    objects
}

/// Split one payload into the objects it describes.
///
/// `@graph` containers yield their members; arrays yield their elements,
/// except homogeneous reservation lists which stay together for the
/// tabbed card.
pub fn explode(value: Value, source: Source) -> Vec<StructuredObject> {
    match value {
        Value::Object(mut map) if !map.contains_key("@type") && map.contains_key("@graph") => {
            let context = map.remove("@context");
            let Some(Value::Array(members)) = map.remove("@graph") else {
                return Vec::new();
            };
            members
                .into_iter()
                .filter_map(|member| match member {
                    Value::Object(mut m) => {
                        if let Some(ctx) = &context {
                            if !m.contains_key("@context") {
                                let mut with_ctx = serde_json::Map::new();
                                with_ctx.insert("@context".into(), ctx.clone());
                                with_ctx.append(&mut m);
                                m = with_ctx;
                            }
                        }
                        Some(StructuredObject::new(Value::Object(m), source))
                    }
                    _ => None,
                })
                .collect()
        }
        Value::Object(map) => vec![StructuredObject::new(Value::Object(map), source)],
        Value::Array(items) => {
            let whole = StructuredObject::new(Value::Array(items), source);
            if items_len(&whole) > 1 && whole.is_homogeneous_reservation_array() {
                return vec![whole];
            }
            let Value::Array(items) = whole.value else {
                return Vec::new();
            };
            items
                .into_iter()
                .filter(Value::is_object)
                .map(|item| StructuredObject::new(item, source))
                .collect()
        }
        other => {
            warn!(source = source.as_str(), kind = %value_kind(&other), "Ignoring non-object payload");
            Vec::new()
        }
    }
}

fn items_len(obj: &StructuredObject) -> usize {
    obj.value.as_array().map_or(0, Vec::len)
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
