//! Input checks shared by the form handlers

/// Loose address check: `local@domain.tld`, no whitespace, exactly one `@`.
pub fn is_valid_email(input: &str) -> bool {
    if input.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // some dot with at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// The value as submitted, or `None` when missing or only whitespace.
///
/// Not trimmed: later checks see exactly what the client sent.
pub fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}
