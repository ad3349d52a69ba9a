//! Slug generation for translation titles.

/// Longest slug produced.
const MAX_SLUG_LEN: usize = 128;

/// Generate a URL-safe slug from a title.
///
/// Lowercases, replaces anything that is not ASCII alphanumeric with a hyphen,
/// collapses hyphen runs, and trims hyphens at both ends. Long titles are cut
/// at the last hyphen before the limit.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() <= MAX_SLUG_LEN {
        return slug;
    }

    // ASCII only, so any byte index is a char boundary.
    let truncated = &slug[..MAX_SLUG_LEN];
    match truncated.rfind('-') {
        Some(idx) => truncated[..idx].to_string(),
        None => truncated.to_string(),
    }
}

/// Build a translation URL from its parent's URL and its own slug.
///
/// A root-level node (or one whose parent is the URL-less root placeholder)
/// gets its slug as URL. An empty slug yields the parent URL.
pub fn child_url(parent_url: Option<&str>, slug: &str) -> Option<String> {
    let parent_url = parent_url.map(|u| u.trim_matches('/')).filter(|u| !u.is_empty());
    match (parent_url, slug.is_empty()) {
        (None, true) => None,
        (None, false) => Some(slug.to_string()),
        (Some(parent), true) => Some(parent.to_string()),
        (Some(parent), false) => Some(format!("{parent}/{slug}")),
    }
}
