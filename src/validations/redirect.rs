use url::Url;
use validator::ValidationError;

/// Characters that break redirection when they appear in a key
pub const FORBIDDEN_KEY_CHARS: [char; 8] = ['/', '\\', '"', ':', '*', '?', '<', '>'];

/// Removes every forbidden character from a candidate key
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !FORBIDDEN_KEY_CHARS.contains(c))
        .collect()
}

/// Gives scheme-less targets an `http://` prefix
pub fn with_default_scheme(target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

/// Validates that a target is a well-formed absolute URL. Any scheme is accepted.
pub fn validate_target(target: &str) -> Result<(), ValidationError> {
    match Url::parse(target) {
        Ok(url) if url.cannot_be_a_base() => {
            Err(ValidationError::new("URL must have an authority"))
        }
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("Invalid URL format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("a/b:c"), "abc");
        assert_eq!(sanitize_key(r#"/\":*?<>"#), "");
        assert_eq!(sanitize_key("plain-key_1"), "plain-key_1");
    }

    #[test]
    fn test_with_default_scheme() {
        assert_eq!(with_default_scheme("example.com"), "http://example.com");
        assert_eq!(with_default_scheme("https://example.com"), "https://example.com");
        assert_eq!(with_default_scheme("ftp://files.example.com"), "ftp://files.example.com");
    }

    #[test]
    fn test_validate_target() {
        // Valid URLs
        assert!(validate_target("http://example.com").is_ok());
        assert!(validate_target("https://example.com/path?query=value").is_ok());
        assert!(validate_target("ftp://files.example.com").is_ok());

        // Invalid URLs
        assert!(validate_target("http://not a url").is_err());
        assert!(validate_target("http://").is_err());
        assert!(validate_target("no-scheme").is_err());
        assert!(validate_target("mailto:someone@example.com").is_err());
    }
}
