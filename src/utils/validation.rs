use anyhow::{anyhow, Result};

/// Longest search text forwarded to the directory.
pub const MAX_QUERY_CHARS: usize = 100;

/// Trims a free-text restaurant search and checks it is usable.
pub fn validate_search_query(query: &str) -> Result<&str> {
    let query = query.trim();

    if query.is_empty() {
        return Err(anyhow!("Search text cannot be empty"));
    }

    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(anyhow!(
            "Search text cannot be longer than {} characters",
            MAX_QUERY_CHARS
        ));
    }

    if query.contains('\n') || query.contains('\r') {
        return Err(anyhow!("Search text cannot contain line breaks"));
    }

    Ok(query)
}

/// Slugs are URL path segments in the directory API and the first field of
/// `_`-delimited button payloads, so only ASCII letters, digits and `-` pass.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(anyhow!("Restaurant identifier cannot be empty"));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(anyhow!("Restaurant identifier contains invalid characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  pizza  ").unwrap(), "pizza");
        assert_eq!(validate_search_query("פיצה").unwrap(), "פיצה");
    }

    #[test]
    fn test_validate_search_query_empty() {
        assert!(validate_search_query("").is_err());
        assert!(validate_search_query("   ").is_err());
    }

    #[test]
    fn test_validate_search_query_too_long() {
        let long = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(validate_search_query(&long).is_err());
        let exact = "א".repeat(MAX_QUERY_CHARS);
        assert!(validate_search_query(&exact).is_ok());
    }

    #[test]
    fn test_validate_search_query_line_breaks() {
        assert!(validate_search_query("pizza\nburger").is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("mcdonalds-dizengoff").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("../admin").is_err());
        assert!(validate_slug("a b").is_err());
        assert!(validate_slug("pizza_place").is_err());
        assert!(validate_slug("..").is_err());
        assert!(validate_slug("cafe.bar").is_err());
        assert!(validate_slug("a%2F..").is_err());
    }
}
