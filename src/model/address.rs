//! Mailbox addresses shown in embedded-message header tables.

/// A display name plus bare address.
///
/// # Examples
/// - `Mailbox::new("Juan García", "juan@ejemplo.com")` displays as `Juan García <juan@ejemplo.com>`
/// - `Mailbox::new("", "user@example.com")` displays as `user@example.com`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, Default)]
pub struct Mailbox {
    /// Human-readable display name (may be empty).
    pub display_name: String,
    /// The bare email address (`user@domain`).
    pub address: String,
}

impl Mailbox {
    pub fn new(display_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            address: address.into(),
        }
    }

    /// Build a mailbox from an iCalendar `CAL-ADDRESS` value (`mailto:` URI) and its `CN`.
    pub fn from_cal_address(value: &str, common_name: Option<&str>) -> Self {
        let address = value
            .strip_prefix("mailto:")
            .or_else(|| value.strip_prefix("MAILTO:"))
            .unwrap_or(value)
            .trim();
        Self::new(strip_quotes(common_name.unwrap_or("")), address)
    }

    /// Format for display: `"Display Name <address>"` or just `"address"`.
    pub fn display(&self) -> String {
        if self.display_name.is_empty() {
            self.address.clone()
        } else {
            format!("{} <{}>", self.display_name, self.address)
        }
    }

    /// Join a list of mailboxes the way header lines show them.
    pub fn join(list: &[Mailbox]) -> String {
        list.iter()
            .map(Mailbox::display)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
