//! Small string helpers shared by repos and services.

use unicode_normalization::UnicodeNormalization;

/// Pick one half of a bilingual `"english~arabic"` value.
///
/// Languages starting with `en` get the part before `~`; anything else gets
/// the part after it. Text without `~` is returned unchanged.
pub fn language_part<'a>(text: &'a str, lang: &str) -> &'a str {
    let Some((english, other)) = text.split_once('~') else {
        return text;
    };
    if lang.to_ascii_lowercase().starts_with("en") {
        english.trim()
    } else {
        other.trim()
    }
}

/// `CreatedDate` / `createdDate` -> `created_date`. Already snake-cased input
/// passes through.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower_or_digit = false;
        } else {
            prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

/// Canonical stored form of an email: trimmed, NFKC-normalized, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}
