//! Credential normalization.
//!
//! Hosting dashboards and `.env` loaders occasionally hand back keys wrapped
//! in quotes or padded with whitespace. Everything that reads a provider key
//! passes it through [`normalize`] first.

const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Strip surrounding whitespace and quote characters until nothing changes.
///
/// Interior characters are left alone. The fixed-point loop makes the
/// function idempotent even for nested wrappings such as `" 'key' "`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut current = raw;
    loop {
        let next = current.trim().trim_matches(&QUOTES[..]);
        if next.len() == current.len() {
            return next.to_owned();
        }
        current = next;
    }
}

/// Normalize an optional raw value, treating an empty result as absent.
#[must_use]
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.map(normalize).filter(|key| !key.is_empty())
}

/// Short, non-secret preview of a key for diagnostics output.
#[must_use]
pub fn preview(key: Option<&str>) -> String {
    match key {
        Some(key) => {
            let head: String = key.chars().take(4).collect();
            format!("{head}...")
        }
        None => "not set".to_owned(),
    }
}
