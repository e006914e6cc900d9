pub mod admin;
pub mod auth;
pub mod banners;
pub mod circulars;
pub mod courses;
pub mod departments;
pub mod events;
pub mod exams;
pub mod faculty;
pub mod gallery;
pub mod health;
pub mod homepage;
pub mod news;
pub mod notifications;
pub mod placements;

/// Turn a free-text search term into an `ILIKE` substring pattern.
/// Blank terms mean no search; LIKE wildcards in the term match literally.
pub fn search_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Some(format!("%{escaped}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(search_pattern(""), None);
        assert_eq!(search_pattern("   "), None);
    }

    #[test]
    fn search_wraps_trimmed_term() {
        assert_eq!(search_pattern("  exam ").as_deref(), Some("%exam%"));
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(search_pattern("50%_off").as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(search_pattern("a\\b").as_deref(), Some("%a\\\\b%"));
    }
}
