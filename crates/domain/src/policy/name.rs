use std::borrow::Cow;

/// Lower-cases a domain name and strips surrounding whitespace and the
/// trailing root dot. Borrows when the input is already normalized.
pub fn normalize_domain(name: &str) -> Cow<'_, str> {
    let trimmed = name.trim().trim_end_matches('.');
    if trimmed.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(trimmed.to_ascii_lowercase())
    } else {
        Cow::Borrowed(trimmed)
    }
}
