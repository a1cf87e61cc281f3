//! URL slugs for games.

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`.
///
/// Non-ASCII letters are dropped, so a title made only of them yields an
/// empty slug; callers must reject that.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch == '\'' || ch.is_alphabetic() {
            // "Baldur's Gate" -> "baldurs-gate"
        } else {
            pending_dash = true;
        }
    }

    slug
}
