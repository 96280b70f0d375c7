/// URL slug: lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Lawn Mowing"), "lawn-mowing");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Gutter -- cleaning__service "), "gutter-cleaning-service");
    }

    #[test]
    fn test_slugify_drops_punctuation() {
        assert_eq!(slugify("Bond Clean (2 bed)!"), "bond-clean-2-bed");
    }
}
