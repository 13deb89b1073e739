//! Action URIs understood by the host application.
//!
//! JSON payloads travel as URL-safe, unpadded base64 of their UTF-8 text.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;

use crate::error::{CardsError, Result};

/// Poll operations sent through `xsubmit:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    Vote,
    Close,
    Retract,
}

impl PollAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::Close => "close",
            Self::Retract => "retract",
        }
    }
}

/// Invitation replies sent through `ximip://`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpResponse {
    Accept,
    Decline,
    Tentative,
}

impl RsvpResponse {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Tentative => "tentative",
        }
    }
}

/// Base64 of the compact JSON text of `value`.
pub fn encode_json(value: &Value) -> Result<String> {
    let text = serde_json::to_string(value).map_err(|e| CardsError::button("payload", e))?;
    Ok(URL_SAFE_NO_PAD.encode(text.as_bytes()))
}

/// Inverse of [`encode_json`].
pub fn decode_json(payload: &str) -> Result<Value> {
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.as_bytes())
        .map_err(|e| CardsError::parse("action payload", e))?;
    serde_json::from_slice(&bytes).map_err(|e| CardsError::parse("action payload", e))
}

/// The base64 payload of a `scheme://<payload>[?query]` URI.
pub fn payload_of(uri: &str) -> Option<&str> {
    let rest = uri.split_once("://")?.1;
    Some(rest.split('?').next().unwrap_or(rest))
}

pub fn clipboard(text: &str) -> String {
    format!("xclipboard:{text}")
}

pub fn share_as_file(value: &Value, file_name: &str) -> Result<String> {
    Ok(format!(
        "xshareasfile://{}?fileName={}",
        encode_json(value)?,
        urlencoding::encode(file_name)
    ))
}

pub fn share_as_calendar(value: &Value) -> Result<String> {
    Ok(format!("xshareascalendar://{}", encode_json(value)?))
}

pub fn add_to_calendar(value: &Value) -> Result<String> {
    Ok(format!("xshareascalendar://{}?action=add", encode_json(value)?))
}

pub fn share_as_mail(value: &Value) -> Result<String> {
    Ok(format!("xshareasmail://{}", encode_json(value)?))
}

pub fn imip(value: &Value, response: RsvpResponse) -> Result<String> {
    Ok(format!("ximip://{}?{}", encode_json(value)?, response.as_str()))
}

pub fn play_media(value: &Value, media_type: &str) -> Result<String> {
    Ok(format!(
        "xplaymedia://{}?mediaType={media_type}",
        encode_json(value)?
    ))
}

pub fn show_source(value: &Value) -> Result<String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CardsError::button("source", e))?;
    Ok(format!("xshowsource://{}", URL_SAFE_NO_PAD.encode(text.as_bytes())))
}

/// `xsubmit:` URI for a poll endpoint. `vote` is only sent for votes.
pub fn submit(target: &str, action: PollAction, vote: Option<&str>) -> String {
    let mut uri = format!(
        "xsubmit:{}?action={}",
        urlencoding::encode(target),
        action.as_str()
    );
    if let Some(vote) = vote {
        uri.push_str("&vote=");
        uri.push_str(&urlencoding::encode(vote));
    }
    uri
}

/// `liveUri` with its scheme replaced by `xreload`.
pub fn reload(live_uri: &str) -> Result<String> {
    let url = url::Url::parse(live_uri).map_err(|e| CardsError::button("liveUri", e))?;
    let host = url
        .host_str()
        .ok_or_else(|| CardsError::button("liveUri", "URI has no host"))?;
    let mut uri = format!("xreload://{host}");
    if let Some(port) = url.port() {
        uri.push_str(&format!(":{port}"));
    }
    uri.push_str(url.path());
    if let Some(query) = url.query() {
        uri.push('?');
        uri.push_str(query);
    }
    Ok(uri)
}

/// One `xloadcards://` URI fetching every URL in `urls`.
pub fn load_cards<S: AsRef<str>>(urls: &[S]) -> String {
    let encoded: Vec<String> = urls
        .iter()
        .map(|u| URL_SAFE_NO_PAD.encode(u.as_ref().as_bytes()))
        .collect();
    format!("xloadcards://{}", encoded.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoding_is_url_safe_and_unpadded() {
        let value = json!({"k": "??>>~~"});
        let payload = encode_json(&value).unwrap();
        assert!(!payload.contains('='));
        assert!(!payload.contains('+'));
        assert!(!payload.contains('/'));
        assert_eq!(decode_json(&payload).unwrap(), value);
    }

    #[test]
    fn test_payload_of() {
        assert_eq!(payload_of("ximip://abc?accept"), Some("abc"));
        assert_eq!(payload_of("xshareasmail://xyz"), Some("xyz"));
        assert_eq!(payload_of("tel:123"), None);
    }

    #[test]
    fn test_submit_encoding() {
        let uri = submit("https://poll.example/p?id=1", PollAction::Vote, Some("Yes & no"));
        assert_eq!(
            uri,
            "xsubmit:https%3A%2F%2Fpoll.example%2Fp%3Fid%3D1?action=vote&vote=Yes%20%26%20no"
        );
        assert_eq!(
            submit("https://p.example", PollAction::Close, None),
            "xsubmit:https%3A%2F%2Fp.example?action=close"
        );
    }

    #[test]
    fn test_reload_keeps_authority_path_query() {
        assert_eq!(
            reload("https://live.example.com:8443/scores/12?team=a").unwrap(),
            "xreload://live.example.com:8443/scores/12?team=a"
        );
        assert!(matches!(
            reload("not a uri"),
            Err(CardsError::ButtonGeneration { .. })
        ));
    }

    #[test]
    fn test_load_cards_joins_payloads() {
        let uri = load_cards(&["https://a.example/x", "https://b.example/y"]);
        let body = uri.strip_prefix("xloadcards://").unwrap();
        let parts: Vec<_> = body.split(',').collect();
        assert_eq!(parts.len(), 2);
        let first = URL_SAFE_NO_PAD.decode(parts[0]).unwrap();
        assert_eq!(first, b"https://a.example/x");
    }
}
