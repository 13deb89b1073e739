//! Structured objects derived from message text when no markup is present.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::i18n;
use crate::model::{Source, StructuredObject};

static BOLD_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>([0-9]{4,})</b>").expect("valid regex"));

/// What kind of object a message is expected to yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationHint {
    VerificationCode,
}

/// Hint derived from the subject line: mails talking about a "code" often
/// carry a one-time code in bold.
pub fn should_try_to_derive(subject: Option<&str>) -> Option<DerivationHint> {
    subject
        .filter(|s| s.to_lowercase().contains("code"))
        .map(|_| DerivationHint::VerificationCode)
}

/// Run the derivation selected by `hint`.
pub fn derive(hint: DerivationHint, html: &str, text: &str) -> Option<StructuredObject> {
    match hint {
        DerivationHint::VerificationCode => derive_verification_code(html, text),
    }
}

/// Find a bold run of 4+ digits in `html` that also appears in the plain
/// text and wrap it as an `EmailMessage` with a copy-to-clipboard action.
/// The first cross-validated candidate wins.
pub fn derive_verification_code(html: &str, text: &str) -> Option<StructuredObject> {
    let code = BOLD_CODE
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .find(|code| text.contains(code))?;

    tracing::debug!(code, "Derived verification code");
    Some(StructuredObject::new(
        json!({
            "@context": "https://schema.org",
            "@type": "EmailMessage",
            "description": format!("{}{code}", i18n::confirmation_code()),
            "potentialAction": {
                "@type": "CopyToClipboardAction",
                "name": code,
                "description": code,
            },
        }),
        Source::Heuristic,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_hint() {
        assert_eq!(
            should_try_to_derive(Some("Your login CODE")),
            Some(DerivationHint::VerificationCode)
        );
        assert_eq!(should_try_to_derive(Some("Weekly digest")), None);
        assert_eq!(should_try_to_derive(None), None);
    }

    #[test]
    fn test_cross_validated_code() {
        let html = "<p>Your code is <b>482913</b></p>";
        let text = "Use 482913 to sign in.";
        let obj = derive_verification_code(html, text).unwrap();
        assert_eq!(obj.schema_type(), Some("EmailMessage"));
        assert_eq!(obj.source, Source::Heuristic);
        let desc = obj.value["description"].as_str().unwrap();
        assert!(desc.contains("482913"));
        assert_eq!(obj.value["potentialAction"]["description"], "482913");
    }

    #[test]
    fn test_code_missing_from_text_is_rejected() {
        assert!(derive_verification_code("<b>482913</b>", "no digits here").is_none());
    }

    #[test]
    fn test_short_numbers_ignored_and_first_valid_wins() {
        let html = "<b>123</b> <b>2024</b> <b>5555</b> <b>7777</b>";
        let text = "5555 and 7777";
        let obj = derive_verification_code(html, text).unwrap();
        assert_eq!(obj.value["potentialAction"]["name"], "5555");
    }
}
