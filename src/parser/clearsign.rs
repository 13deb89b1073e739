//! OpenPGP clear-signed message unwrapping.

const BEGIN_SIGNED: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const BEGIN_SIGNATURE: &str = "-----BEGIN PGP SIGNATURE-----";
const END_SIGNATURE: &str = "-----END PGP SIGNATURE-----";

/// Return the signed text of a clear-signed message, or `None` when `text`
/// is not clear-signed.
///
/// Armor headers (`Hash: ...`) are dropped and dash-escaped lines (`- `) are
/// restored.
pub fn extract_clearsigned(text: &str) -> Option<String> {
    let start = text.find(BEGIN_SIGNED)?;
    let sig = text[start..].find(BEGIN_SIGNATURE)? + start;
    text[sig..].find(END_SIGNATURE)?;

    let signed = &text[start + BEGIN_SIGNED.len()..sig];
    let mut lines = signed.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    // Skip the rest of the BEGIN line, then armor headers up to the blank line.
    lines.next();
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
    }

    let body: Vec<&str> = lines
        .map(|l| l.strip_prefix("- ").unwrap_or(l))
        .collect();
    let mut out = body.join("\r\n");
    // The line break before BEGIN SIGNATURE belongs to the armor.
    while out.ends_with("\r\n") {
        out.truncate(out.len() - 2);
    }
    Some(out)
}
