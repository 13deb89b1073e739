//! Action buttons for a structured object.
//!
//! [`ButtonGenerator::build_buttons`] applies its rules in a fixed order, so
//! the resulting button order is stable for identical input:
//! existing actions, media, link, share-as-file, calendar, contacts, geo,
//! share-as-mail and live reload.

pub mod scan;
pub mod uri;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::i18n;
use crate::model::structured::type_of;
use crate::model::ButtonDescription;
use scan::{as_list, find_all, strings};
use uri::{PollAction, RsvpResponse};

static MEET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://meet\.google\.com/[A-Za-z0-9-]+").expect("valid regex")
});

const DATE_FIELDS: &[&str] = &["startDate", "startTime", "endDate", "endTime"];
const CONTACT_EXCLUDED: &[&str] = &["potentialAction"];

/// When to offer "share as mail".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareAsMailPolicy {
    /// Every object.
    #[default]
    Always,
    /// No object.
    Never,
    /// Only objects whose `@type` is listed.
    Types(Vec<String>),
}

impl ShareAsMailPolicy {
    pub fn allows(&self, schema_type: Option<&str>) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Types(types) => schema_type.is_some_and(|t| types.iter().any(|x| x == t)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    fn from_type(schema_type: &str) -> Option<Self> {
        match schema_type {
            "AudioObject" => Some(Self::Audio),
            "VideoObject" => Some(Self::Video),
            _ => None,
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    fn media_type(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Audio => "headphones",
            Self::Video => "smart_display",
        }
    }
}

/// Builds action buttons. Pure: no I/O, no shared state.
#[derive(Debug, Clone, Default)]
pub struct ButtonGenerator {
    share_as_mail: ShareAsMailPolicy,
}

impl ButtonGenerator {
    pub fn new(share_as_mail: ShareAsMailPolicy) -> Self {
        Self { share_as_mail }
    }

    /// Buttons for one structured object. Non-objects yield none.
    ///
    /// A field that cannot be turned into a button is logged and skipped.
    pub fn build_buttons(&self, obj: &Value) -> Vec<ButtonDescription> {
        let Some(map) = obj.as_object() else {
            return Vec::new();
        };
        let schema_type = type_of(map);
        let type_name = schema_type.unwrap_or("");
        let is_poll = type_name == "SimplePoll";
        let mut buttons = Vec::new();

        if let Some(actions) = map.get("potentialAction") {
            for action in as_list(actions) {
                action_buttons(action, is_poll, &mut buttons);
            }
        }

        media_buttons(obj, map, &mut buttons);

        if let Some(url) = map.get("url").and_then(|u| strings(u).first().copied()) {
            buttons.push(ButtonDescription::icon("open_in_browser", url));
        }

        if type_name == "Recipe" || type_name.ends_with("Reservation") {
            let name = map
                .get("name")
                .and_then(Value::as_str)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(if type_name.is_empty() { "data" } else { type_name });
            let file_name = format!("{name}.json");
            push(&mut buttons, "share-as-file", || {
                Ok(ButtonDescription::icon("share", uri::share_as_file(obj, &file_name)?))
            });
        }

        if type_name.ends_with("Event") || has_date_fields(map) {
            calendar_buttons(obj, map, is_poll, &mut buttons);
        }

        if !is_poll {
            for (_, value) in find_all(obj, &["telephone", "phone"], CONTACT_EXCLUDED) {
                for number in strings(value) {
                    buttons.push(ButtonDescription::icon("call", format!("tel:{number}")));
                }
            }
            for (_, value) in find_all(obj, &["email"], CONTACT_EXCLUDED) {
                for address in strings(value) {
                    let address = address.strip_prefix("mailto:").unwrap_or(address);
                    buttons.push(ButtonDescription::icon("mail", format!("mailto:{address}")));
                }
            }
        }

        for (_, geo) in find_all(obj, &["geo"], &[]) {
            for point in as_list(geo) {
                if let Some((lat, lon)) = coordinates(point) {
                    buttons.push(ButtonDescription::icon(
                        "assistant_direction",
                        format!("google.navigation:q={lat},{lon}"),
                    ));
                    buttons.push(ButtonDescription::icon("map", format!("geo:{lat},{lon}")));
                }
            }
        }

        if self.share_as_mail.allows(schema_type) {
            push(&mut buttons, "share-as-mail", || {
                Ok(ButtonDescription::icon("forward_to_inbox", uri::share_as_mail(obj)?))
            });
        }

        if let Some(live) = map.get("liveUri").and_then(Value::as_str) {
            push(&mut buttons, "liveUri", || {
                Ok(ButtonDescription::icon("replay", uri::reload(live)?))
            });
        }

        buttons
    }
}

/// Append the button built by `make`, or log why it could not be built.
fn push<F>(buttons: &mut Vec<ButtonDescription>, field: &str, make: F)
where
    F: FnOnce() -> Result<ButtonDescription>,
{
    match make() {
        Ok(button) => buttons.push(button),
        Err(e) => warn!(field, error = %e, "Skipping button"),
    }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn action_buttons(action: &Value, is_poll: bool, buttons: &mut Vec<ButtonDescription>) {
    let Some(a) = action.as_object() else {
        return;
    };
    let name = non_empty_str(a, "name");
    match type_of(a) {
        Some("CopyToClipboardAction") => {
            if let Some(text) = non_empty_str(a, "description") {
                buttons.push(ButtonDescription::new(
                    Some(name.unwrap_or(i18n::btn_copy_to_clipboard())),
                    Some("content_paste"),
                    uri::clipboard(text),
                ));
            }
        }
        Some(kind @ ("ConfirmAction" | "CancelAction")) => {
            if let Some(target) = a.get("target").and_then(entry_point) {
                let default = if kind == "ConfirmAction" {
                    i18n::btn_confirm()
                } else {
                    i18n::btn_deny()
                };
                buttons.push(ButtonDescription::new(Some(name.unwrap_or(default)), None, target));
            }
        }
        Some("ChooseAction") if is_poll => {
            let options = action_options(a);
            for target in poll_targets(a) {
                for &option in &options {
                    buttons.push(ButtonDescription::new(
                        Some(option),
                        Some("how_to_vote"),
                        uri::submit(target, PollAction::Vote, Some(option)),
                    ));
                }
            }
        }
        Some("UpdateAction") if is_poll => {
            let listed = action_options(a);
            let ops: Vec<PollAction> = [PollAction::Close, PollAction::Retract]
                .into_iter()
                .filter(|op| listed.is_empty() || listed.iter().any(|o| o.eq_ignore_ascii_case(op.as_str())))
                .collect();
            for target in poll_targets(a) {
                for op in &ops {
                    let (label, icon) = match op {
                        PollAction::Close => (i18n::btn_close_poll(), "lock"),
                        _ => (i18n::btn_retract_vote(), "undo"),
                    };
                    buttons.push(ButtonDescription::new(
                        Some(label),
                        Some(icon),
                        uri::submit(target, *op, None),
                    ));
                }
            }
        }
        other => debug!(action_type = ?other, "No button for action"),
    }
}

/// An action target: a URL string or an `EntryPoint` object.
fn entry_point(target: &Value) -> Option<String> {
    match target {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(ep) => non_empty_str(ep, "urlTemplate")
            .or_else(|| non_empty_str(ep, "url"))
            .map(String::from),
        _ => None,
    }
}

/// HTTP(S) targets of a poll action.
fn poll_targets(action: &Map<String, Value>) -> Vec<&str> {
    action
        .get("target")
        .map(strings)
        .unwrap_or_default()
        .into_iter()
        .filter(|t| t.starts_with("http"))
        .collect()
}

/// `actionOption` values: strings or objects with a `name`.
fn action_options(action: &Map<String, Value>) -> Vec<&str> {
    let Some(options) = action.get("actionOption") else {
        return Vec::new();
    };
    as_list(options)
        .into_iter()
        .filter_map(|o| match o {
            Value::String(s) => Some(s.as_str()),
            Value::Object(m) => m.get("name").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn media_buttons(obj: &Value, map: &Map<String, Value>, buttons: &mut Vec<ButtonDescription>) {
    let mut add = |media: &Value, kind: MediaKind| {
        push(buttons, "contentUrl", || {
            Ok(ButtonDescription::icon(
                kind.icon(),
                uri::play_media(media, kind.media_type())?,
            ))
        });
    };

    if map.contains_key("contentUrl") {
        if let Some(kind) = type_of(map).and_then(MediaKind::from_type) {
            add(obj, kind);
        }
    }

    for (key, value) in map {
        for nested in as_list(value) {
            let Some(inner) = nested.as_object() else {
                continue;
            };
            if !inner.contains_key("contentUrl") {
                continue;
            }
            let kind = type_of(inner)
                .and_then(MediaKind::from_type)
                .or_else(|| MediaKind::from_key(key));
            if let Some(kind) = kind {
                add(nested, kind);
            }
        }
    }
}

fn has_date_fields(map: &Map<String, Value>) -> bool {
    DATE_FIELDS.iter().any(|key| match map.get(*key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    })
}

fn calendar_buttons(
    obj: &Value,
    map: &Map<String, Value>,
    is_poll: bool,
    buttons: &mut Vec<ButtonDescription>,
) {
    push(buttons, "calendar", || {
        Ok(ButtonDescription::icon("event", uri::share_as_calendar(obj)?))
    });

    if !is_poll {
        let meet = map
            .get("description")
            .and_then(Value::as_str)
            .and_then(|d| MEET_URL.find(d));
        if let Some(m) = meet {
            buttons.push(ButtonDescription::icon("video_call", m.as_str()));
        }
    }

    let is_request = map
        .get("iTIPMethod")
        .and_then(Value::as_str)
        .is_some_and(|m| m.trim().eq_ignore_ascii_case("request"));
    if is_request {
        for (response, label, icon) in [
            (RsvpResponse::Accept, i18n::btn_accept(), "check_circle"),
            (RsvpResponse::Decline, i18n::btn_decline(), "cancel"),
            (RsvpResponse::Tentative, i18n::btn_tentative(), "help"),
        ] {
            push(buttons, "iTIPMethod", || {
                Ok(ButtonDescription::new(
                    Some(label),
                    Some(icon),
                    uri::imip(obj, response)?,
                ))
            });
        }
    } else {
        push(buttons, "calendar", || {
            Ok(ButtonDescription::new(
                Some(i18n::btn_add_to_calendar()),
                Some("calendar_add_on"),
                uri::add_to_calendar(obj)?,
            ))
        });
    }
}

/// Latitude and longitude of a `GeoCoordinates`-like object.
fn coordinates(point: &Value) -> Option<(String, String)> {
    let map = point.as_object()?;
    let read = |key: &str| match map.get(key)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    };
    Some((read("latitude")?, read("longitude")?))
}
