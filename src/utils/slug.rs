//! Slug derivation for new content rows.

/// Turn a title into a URL slug: Unicode transliterated to ASCII, lowercase,
/// runs of non-alphanumerics collapsed into a single `-`.
///
/// # Examples
///
/// - `slugify("Hello, World!")` -> `"hello-world"`
/// - `slugify("Café Society 2025")` -> `"cafe-society-2025"`
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
