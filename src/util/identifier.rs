use uuid::Uuid;

/// Number of random hex characters after the prefix.
pub const TOKEN_LEN: usize = 6;

/// Short opaque document number, e.g. `fwz-3fa9c1`.
///
/// Collisions are not checked; the token space is 16^6.
pub fn generate(prefix: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &token[..TOKEN_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_prefix_and_hex_token() {
        let id = generate("fwz-inv-");
        let token = id.strip_prefix("fwz-inv-").unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_is_random() {
        assert_ne!(generate("q-"), generate("q-"));
    }
}
