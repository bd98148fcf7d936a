//! Page-level metadata values: canonical URL, description, title, robots.

use std::sync::OnceLock;

use regex::Regex;

/// Description used when a page has none.
pub const DEFAULT_DESCRIPTION: &str =
    "Leadership stories, industry news, magazines and press releases.";

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX: usize = 160;

const ELLIPSIS: &str = "...";

const ROBOTS_NOINDEX: &str = "noindex, nofollow";
const ROBOTS_INDEX: &str =
    "index, follow, max-image-preview:large, max-snippet:-1, max-video-preview:-1";

/// Explicit override, else `origin + path`. Absent without either.
pub fn canonical_url(override_url: Option<&str>, origin: Option<&str>, path: &str) -> Option<String> {
    if let Some(url) = override_url.map(str::trim).filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }
    let origin = origin?.trim_end_matches('/');
    if origin.is_empty() {
        return None;
    }
    if path.starts_with('/') {
        Some(format!("{origin}{path}"))
    } else {
        Some(format!("{origin}/{path}"))
    }
}

/// Collapse whitespace, fall back to `DEFAULT_DESCRIPTION`, cap at 160
/// characters (157 + `"..."`).
pub fn normalize_description(description: Option<&str>) -> String {
    normalize_description_or(description, DEFAULT_DESCRIPTION)
}

/// `normalize_description` with a caller-supplied fallback.
pub fn normalize_description_or(description: Option<&str>, fallback: &str) -> String {
    let collapsed = collapse_whitespace(description.unwrap_or_default());
    let text = if collapsed.is_empty() {
        collapse_whitespace(fallback)
    } else {
        collapsed
    };
    truncate(text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: String) -> String {
    if text.chars().count() <= DESCRIPTION_MAX {
        return text;
    }
    let keep = DESCRIPTION_MAX - ELLIPSIS.len();
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// `"{title} | {site}"`, or the site name alone when the title is missing,
/// blank, or already equal to the site name (case-insensitive).
pub fn page_title(title: Option<&str>, site_name: &str) -> String {
    let site_name = site_name.trim();
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return site_name.to_string();
    };

    if title.to_lowercase() == site_name.to_lowercase() {
        return site_name.to_string();
    }
    format!("{title} | {site_name}")
}

/// Robots directive for a page.
pub const fn robots(noindex: bool) -> &'static str {
    if noindex { ROBOTS_NOINDEX } else { ROBOTS_INDEX }
}

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").unwrap())
}

/// Resolve `url` against the site origin.
///
/// - `https://...`, `mailto:...`, `//cdn...` -> unchanged
/// - `/path` -> `{origin}/path`
/// - `path` -> `{origin}/path`
///
/// Without an origin the result stays root-relative.
pub fn absolute_url(url: &str, origin: Option<&str>) -> String {
    if scheme_regex().is_match(url) || url.starts_with("//") {
        return url.to_string();
    }
    let origin = origin.map(|o| o.trim_end_matches('/')).unwrap_or_default();
    if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    }
}
