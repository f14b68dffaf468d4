use std::fmt;

use lazy_regex::regex;

/// Masks emails, phone numbers and opaque tokens in `input`.
///
/// - Emails keep the first character of the local part and the full domain.
/// - Phone numbers (7+ digits, optional leading `+`) keep their last two digits.
/// - Base64-like or hex runs of 16+ characters become `[REDACTED_TOKEN]`.
///
/// Emails go first so their domains are not mistaken for tokens.
pub fn redact(input: &str) -> String {
    let emails = regex!(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").replace_all(
        input,
        |caps: &regex::Captures| {
            let full = &caps[0];
            match full.split_once('@') {
                Some((local, domain)) if !local.is_empty() => {
                    format!("{}***@{domain}", &local[..1])
                }
                _ => full.to_string(),
            }
        },
    );

    let tokens = regex!(r"\b[A-Za-z0-9+/]{16,}={0,2}").replace_all(&emails, "[REDACTED_TOKEN]");

    regex!(r"\+?\b\d{5,}(\d{2})\b")
        .replace_all(&tokens, "***$1")
        .into_owned()
}

/// Display wrapper that redacts on format, for use in `tracing` fields.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
