//! Canonical form for owner names used as cache keys.

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Trim surrounding whitespace, lowercase ASCII, and strip a single trailing
/// dot so that `Svc.Example.COM.` and `svc.example.com` are the same key.
pub fn normalize(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed.to_ascii_lowercase()
}

/// Label syntax check for an already normalised name: 1 to 63 characters
/// of letters, digits, `-` or `_` per label, no label starting or ending
/// with `-`, at most 253 characters overall.
pub fn is_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}

/// True if `name` equals `zone` or is a subdomain of it. The root zone
/// (`"."` or empty after normalisation) contains every name.
pub fn is_in_zone(name: &str, zone: &str) -> bool {
    if zone.is_empty() {
        return true;
    }
    if name == zone {
        return true;
    }
    name.len() > zone.len()
        && name.ends_with(zone)
        && name.as_bytes()[name.len() - zone.len() - 1] == b'.'
}
