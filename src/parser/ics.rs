//! Minimal iCalendar (RFC 5545) reader: enough to turn the first `VEVENT`
//! of an invitation into a schema.org `Event`.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Map, Value};

use crate::error::{CardsError, Result};
use crate::model::Mailbox;

/// Decodes calendar attachments.
pub trait CalendarParser {
    fn parse_calendar(&self, bytes: &[u8]) -> Result<Calendar>;
}

/// Default [`CalendarParser`].
#[derive(Debug, Default, Clone, Copy)]
pub struct IcsParser;

impl CalendarParser for IcsParser {
    fn parse_calendar(&self, bytes: &[u8]) -> Result<Calendar> {
        parse_calendar(&String::from_utf8_lossy(bytes))
    }
}

/// A parsed `VCALENDAR`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    /// iTIP method (`REQUEST`, `CANCEL`, ...).
    pub method: Option<String>,
    pub events: Vec<VEvent>,
}

/// The `VEVENT` properties a card can show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    /// ISO-8601 start (`2024-11-05T09:00:00Z`, `2024-11-05T09:00:00` or `2024-11-05`).
    pub start: Option<String>,
    pub end: Option<String>,
    pub organizer: Option<Mailbox>,
    pub attendees: Vec<Mailbox>,
}

impl VEvent {
    /// Serialize as a schema.org `Event`. Absent properties are omitted.
    pub fn to_structured(&self, method: Option<&str>) -> Value {
        let mut map = Map::new();
        map.insert("@context".into(), json!("https://schema.org"));
        map.insert("@type".into(), json!("Event"));
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                map.insert(key.to_string(), json!(v));
            }
        };
        put("@id", &self.uid);
        put("name", &self.summary);
        put("description", &self.description);
        put("startDate", &self.start);
        put("endDate", &self.end);
        put("url", &self.url);
        if let Some(location) = &self.location {
            map.insert(
                "location".into(),
                json!({"@type": "Place", "name": location}),
            );
        }
        if let Some(organizer) = &self.organizer {
            map.insert("organizer".into(), person(organizer));
        }
        if !self.attendees.is_empty() {
            map.insert(
                "attendee".into(),
                Value::Array(self.attendees.iter().map(person).collect()),
            );
        }
        if let Some(method) = method {
            map.insert("iTIPMethod".into(), json!(method));
        }
        Value::Object(map)
    }
}

fn person(mailbox: &Mailbox) -> Value {
    let mut p = json!({"@type": "Person", "email": mailbox.address});
    if !mailbox.display_name.is_empty() {
        p["name"] = json!(mailbox.display_name);
    }
    p
}

/// One content line: `NAME;PARAM=VALUE:value`.
#[derive(Debug, PartialEq)]
struct Property {
    name: String,
    params: Vec<(String, String)>,
    value: String,
}

impl Property {
    fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse iCalendar text. Fails when there is no `VCALENDAR` at all.
pub fn parse_calendar(text: &str) -> Result<Calendar> {
    let mut calendar = Calendar::default();
    let mut saw_calendar = false;
    // Component nesting, innermost last.
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<VEvent> = None;

    for line in unfold(text) {
        let Some(prop) = parse_line(&line) else {
            continue;
        };
        match prop.name.as_str() {
            "BEGIN" => {
                let component = prop.value.to_ascii_uppercase();
                if component == "VCALENDAR" {
                    saw_calendar = true;
                }
                if component == "VEVENT" && stack.last().is_some_and(|c| c == "VCALENDAR") {
                    current = Some(VEvent::default());
                }
                stack.push(component);
                continue;
            }
            "END" => {
                if let Some(component) = stack.pop() {
                    if component == "VEVENT" && stack.last().is_some_and(|c| c == "VCALENDAR") {
                        if let Some(event) = current.take() {
                            calendar.events.push(event);
                        }
                    }
                }
                continue;
            }
            _ => {}
        }

        match stack.last().map(String::as_str) {
            Some("VCALENDAR") if prop.name == "METHOD" => {
                calendar.method = Some(prop.value.trim().to_string());
            }
            Some("VEVENT") => {
                if let Some(event) = current.as_mut() {
                    apply_event_property(event, &prop);
                }
            }
            _ => {}
        }
    }

    if !saw_calendar {
        return Err(CardsError::Calendar("no VCALENDAR component".into()));
    }
    Ok(calendar)
}

fn apply_event_property(event: &mut VEvent, prop: &Property) {
    match prop.name.as_str() {
        "UID" => event.uid = Some(prop.value.clone()),
        "SUMMARY" => event.summary = Some(unescape(&prop.value)),
        "DESCRIPTION" => event.description = Some(unescape(&prop.value)),
        "LOCATION" => event.location = Some(unescape(&prop.value)),
        "URL" => event.url = Some(prop.value.clone()),
        "DTSTART" => event.start = ics_date_to_iso(&prop.value),
        "DTEND" => event.end = ics_date_to_iso(&prop.value),
        "ORGANIZER" => {
            event.organizer = Some(Mailbox::from_cal_address(&prop.value, prop.param("CN")));
        }
        "ATTENDEE" => event
            .attendees
            .push(Mailbox::from_cal_address(&prop.value, prop.param("CN"))),
        _ => {}
    }
}

/// Join folded lines (continuations start with a space or tab).
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        match line.chars().next() {
            Some(' ' | '\t') if !lines.is_empty() => {
                if let Some(last) = lines.last_mut() {
                    last.push_str(&line[1..]);
                }
            }
            _ if line.is_empty() => {}
            _ => lines.push(line.to_string()),
        }
    }
    lines
}

fn parse_line(line: &str) -> Option<Property> {
    // The name/params section ends at the first colon outside quotes.
    let mut in_quotes = false;
    let mut colon = None;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let colon = colon?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let mut segments = split_unquoted(head, ';').into_iter();
    let name = segments.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }
    let params = segments
        .filter_map(|seg| {
            let (k, v) = seg.split_once('=')?;
            Some((k.trim().to_ascii_uppercase(), v.trim().trim_matches('"').to_string()))
        })
        .collect();

    Some(Property {
        name,
        params,
        value: value.to_string(),
    })
}

fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == sep && !in_quotes {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// `20241105T090000Z` → `2024-11-05T09:00:00Z`; floating and TZID-local
/// times drop the zone; `20241105` → `2024-11-05`.
fn ics_date_to_iso(value: &str) -> Option<String> {
    let value = value.trim();
    let (body, utc) = match value.strip_suffix('Z') {
        Some(b) => (b, true),
        None => (value, false),
    };
    if let Ok(dt) = NaiveDateTime::parse_from_str(body, "%Y%m%dT%H%M%S") {
        let iso = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
        return Some(if utc { format!("{iso}Z") } else { iso });
    }
    if let Ok(d) = NaiveDate::parse_from_str(body, "%Y%m%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    tracing::debug!(value, "Unrecognized iCalendar date");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVITE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
METHOD:REQUEST\r\n\
BEGIN:VTIMEZONE\r\n\
TZID:Europe/Berlin\r\n\
END:VTIMEZONE\r\n\
BEGIN:VEVENT\r\n\
UID:abc-123@example.com\r\n\
SUMMARY:Quarterly review\\, Q3\r\n\
DESCRIPTION:Agenda:\\n1. Numbers\\nJoin: https://meet.google.com/abc-defg-hij\r\n\
LOCATION:Room 4\r\n\
DTSTART;TZID=Europe/Berlin:20241105T090000\r\n\
DTEND:20241105T100000Z\r\n\
ORGANIZER;CN=\"Doe, Jane\":mailto:jane@example.com\r\n\
ATTENDEE;CN=Bob;ROLE=REQ-PARTICIPANT:mailto:bob@exam\r\n ple.com\r\n\
BEGIN:VALARM\r\n\
DESCRIPTION:Reminder\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_parse_invitation() {
        let cal = IcsParser.parse_calendar(INVITE.as_bytes()).unwrap();
        assert_eq!(cal.method.as_deref(), Some("REQUEST"));
        assert_eq!(cal.events.len(), 1);
        let ev = &cal.events[0];
        assert_eq!(ev.summary.as_deref(), Some("Quarterly review, Q3"));
        assert!(ev.description.as_deref().unwrap().starts_with("Agenda:\n1. Numbers"));
        assert_eq!(ev.start.as_deref(), Some("2024-11-05T09:00:00"));
        assert_eq!(ev.end.as_deref(), Some("2024-11-05T10:00:00Z"));
        assert_eq!(ev.organizer.as_ref().unwrap().display_name, "Doe, Jane");
        assert_eq!(ev.attendees[0].address, "bob@example.com");
    }

    #[test]
    fn test_to_structured_shape() {
        let cal = parse_calendar(INVITE).unwrap();
        let value = cal.events[0].to_structured(cal.method.as_deref());
        assert_eq!(value["@type"], "Event");
        assert_eq!(value["@id"], "abc-123@example.com");
        assert_eq!(value["location"]["name"], "Room 4");
        assert_eq!(value["organizer"]["email"], "jane@example.com");
        assert_eq!(value["iTIPMethod"], "REQUEST");
        assert!(value.get("url").is_none());
    }

    #[test]
    fn test_all_day_event() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART;VALUE=DATE:20250101\nEND:VEVENT\nEND:VCALENDAR\n";
        let cal = parse_calendar(text).unwrap();
        assert_eq!(cal.events[0].start.as_deref(), Some("2025-01-01"));
        assert_eq!(cal.method, None);
    }

    #[test]
    fn test_calendar_without_event() {
        let text = "BEGIN:VCALENDAR\nBEGIN:VTODO\nSUMMARY:x\nEND:VTODO\nEND:VCALENDAR\n";
        assert!(parse_calendar(text).unwrap().events.is_empty());
    }

    #[test]
    fn test_not_a_calendar() {
        let err = parse_calendar("hello world").unwrap_err();
        assert!(matches!(err, CardsError::Calendar(_)));
    }
}
