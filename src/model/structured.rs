//! Structured-data documents (JSON-LD shaped) extracted from a message.

use serde::Serialize;
use serde_json::{Map, Value};

/// Where a structured object came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    JsonLd,
    Microdata,
    Calendar,
    LdJsonPart,
    Heuristic,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JsonLd => "json-ld",
            Self::Microdata => "microdata",
            Self::Calendar => "calendar",
            Self::LdJsonPart => "ld+json part",
            Self::Heuristic => "heuristic",
        }
    }
}

/// An ordered, arbitrarily nested document.
///
/// Usually a JSON object with `@type`; a JSON array when a single JSON-LD
/// block lists several entities (e.g. all legs of a trip).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredObject {
    pub value: Value,
    pub source: Source,
}

impl StructuredObject {
    pub fn new(value: Value, source: Source) -> Self {
        Self { value, source }
    }

    /// The object's `@type`. For arrays, the type of the first element.
    pub fn schema_type(&self) -> Option<&str> {
        match &self.value {
            Value::Object(map) => type_of(map),
            Value::Array(items) => items.first().and_then(Value::as_object).and_then(type_of),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.value.as_object()
    }

    /// `true` when this is an array whose elements all share one
    /// reservation-family `@type` and none carries an `iTIPMethod`.
    pub fn is_homogeneous_reservation_array(&self) -> bool {
        let Value::Array(items) = &self.value else {
            return false;
        };
        let Some(first) = items.first().and_then(Value::as_object).and_then(type_of) else {
            return false;
        };
        first.ends_with("Reservation")
            && items.iter().all(|item| {
                item.as_object().is_some_and(|map| {
                    type_of(map) == Some(first) && !map.contains_key("iTIPMethod")
                })
            })
    }
}

/// `@type` of a JSON object. An array of types yields its first entry.
pub fn type_of(map: &Map<String, Value>) -> Option<&str> {
    match map.get("@type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types.first().and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_type_variants() {
        let obj = StructuredObject::new(json!({"@type": "Event"}), Source::JsonLd);
        assert_eq!(obj.schema_type(), Some("Event"));

        let multi = StructuredObject::new(json!({"@type": ["Recipe", "Thing"]}), Source::JsonLd);
        assert_eq!(multi.schema_type(), Some("Recipe"));

        let arr = StructuredObject::new(json!([{"@type": "FlightReservation"}]), Source::JsonLd);
        assert_eq!(arr.schema_type(), Some("FlightReservation"));

        let untyped = StructuredObject::new(json!({"name": "x"}), Source::JsonLd);
        assert_eq!(untyped.schema_type(), None);
    }

    #[test]
    fn test_homogeneous_reservation_array() {
        let legs = json!([
            {"@type": "FlightReservation", "reservationNumber": "A"},
            {"@type": "FlightReservation", "reservationNumber": "B"},
        ]);
        assert!(StructuredObject::new(legs, Source::JsonLd).is_homogeneous_reservation_array());

        let mixed = json!([
            {"@type": "FlightReservation"},
            {"@type": "TrainReservation"},
        ]);
        assert!(!StructuredObject::new(mixed, Source::JsonLd).is_homogeneous_reservation_array());

        let itip = json!([
            {"@type": "EventReservation", "iTIPMethod": "REQUEST"},
            {"@type": "EventReservation"},
        ]);
        assert!(!StructuredObject::new(itip, Source::JsonLd).is_homogeneous_reservation_array());

        let events = json!([{"@type": "Event"}, {"@type": "Event"}]);
        assert!(!StructuredObject::new(events, Source::JsonLd).is_homogeneous_reservation_array());
    }
}
