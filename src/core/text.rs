//! Case-insensitive text comparisons shared by the scoring factors.

/// Treat blank strings the same as missing ones
#[inline]
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Case-insensitive substring test
#[inline]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive equality
#[inline]
pub fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// A skill matches a required skill when either contains the other.
/// Blank entries never match.
pub fn skills_overlap(skill: &str, required: &str) -> bool {
    let skill = skill.trim().to_lowercase();
    let required = required.trim().to_lowercase();
    if skill.is_empty() || required.is_empty() {
        return false;
    }
    skill.contains(&required) || required.contains(&skill)
}

/// Text before the first comma, e.g. "Westlands" for "Westlands, Nairobi"
#[inline]
pub fn location_head(location: &str) -> &str {
    location.split(',').next().unwrap_or(location).trim()
}

/// Bidirectional, comma-truncated containment: either location contains the
/// head of the other. Symmetric in its arguments.
///
/// An empty head (`", Nairobi"`) never matches, rather than matching every
/// location the way an empty substring would.
pub fn locations_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let a_head = location_head(&a);
    let b_head = location_head(&b);

    (!b_head.is_empty() && a.contains(b_head)) || (!a_head.is_empty() && b.contains(a_head))
}
