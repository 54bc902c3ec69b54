/// Case-insensitive substring match used by every list filter.
///
/// A blank query matches everything.
pub fn matches_query(haystack: &[&str], query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystack
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Records that can be filtered with the admin search box.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    fn matches(&self, query: &str) -> bool {
        matches_query(&self.search_fields(), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_matches_all() {
        assert!(matches_query(&["anything"], ""));
        assert!(matches_query(&[], "   "));
    }

    #[test]
    fn substring_is_case_insensitive() {
        assert!(matches_query(&["Sunrise Solar Pvt Ltd"], "solar"));
        assert!(matches_query(&["x", "MH-12"], "mh-1"));
        assert!(!matches_query(&["Sunrise"], "moon"));
    }
}
