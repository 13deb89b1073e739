//! Attachments that may carry structured data.

use super::part::Part;

/// Attachment kinds worth inspecting for structured data, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseableKind {
    Ics,
    Vcard,
    Pkpass,
}

impl ParseableKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ics" => Some(Self::Ics),
            "vcard" => Some(Self::Vcard),
            "pkpass" => Some(Self::Pkpass),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Ics => "ics",
            Self::Vcard => "vcard",
            Self::Pkpass => "pkpass",
        }
    }
}

/// An attachment together with the kind its extension marks it as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseableAttachmentRef {
    pub attachment: Part,
    pub kind: ParseableKind,
}

impl ParseableAttachmentRef {
    /// Wrap `part` when its filename (or, for bare `text/calendar`, its type)
    /// marks it as parseable.
    pub fn classify(part: &Part) -> Option<Self> {
        let kind = match part.extension() {
            Some(ext) => ParseableKind::from_extension(&ext)?,
            None if part.mime_type == "text/calendar" => ParseableKind::Ics,
            None => return None,
        };
        Some(Self {
            attachment: part.clone(),
            kind,
        })
    }

    /// Select the parseable attachments of a message, in order.
    pub fn collect(attachments: &[Part]) -> Vec<Self> {
        attachments.iter().filter_map(Self::classify).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        let ics = Part::new("application/octet-stream").with_filename("invite.ICS");
        assert_eq!(
            ParseableAttachmentRef::classify(&ics).map(|r| r.kind),
            Some(ParseableKind::Ics)
        );
        let pdf = Part::new("application/pdf").with_filename("ticket.pdf");
        assert!(ParseableAttachmentRef::classify(&pdf).is_none());
    }

    #[test]
    fn test_bare_calendar_part_counts_as_ics() {
        let cal = Part::new("text/calendar");
        assert_eq!(
            ParseableAttachmentRef::classify(&cal).map(|r| r.kind),
            Some(ParseableKind::Ics)
        );
    }

    #[test]
    fn test_collect_keeps_order() {
        let parts = vec![
            Part::new("text/x-vcard").with_filename("me.vcard"),
            Part::new("image/png").with_filename("logo.png"),
            Part::new("application/vnd.apple.pkpass").with_filename("pass.pkpass"),
        ];
        let kinds: Vec<_> = ParseableAttachmentRef::collect(&parts)
            .into_iter()
            .map(|r| r.kind.extension())
            .collect();
        assert_eq!(kinds, vec!["vcard", "pkpass"]);
    }
}
