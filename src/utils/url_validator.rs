//! URL 校验
//!
//! 区分两类失败：无法解析（InvalidUrl）和能解析但缺少 scheme 或 host
//! （IncompleteUrl，例如 `example.org`、`mailto:a@b`）。

use url::{ParseError, Url};

use crate::errors::{Result, ShortenerError};

/// 校验长链接，成功时返回解析后的 URL
pub fn validate_long_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(ShortenerError::incomplete_url("URL cannot be empty"));
    }

    // url crate 会静默剔除制表符和换行，这里直接拒绝
    if raw.chars().any(char::is_control) {
        return Err(ShortenerError::invalid_url(format!(
            "URL contains control characters: {:?}",
            raw
        )));
    }

    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => {
            return Err(ShortenerError::incomplete_url(format!(
                "URL has no scheme: {}",
                raw
            )));
        }
        Err(ParseError::EmptyHost) => {
            return Err(ShortenerError::incomplete_url(format!(
                "URL has no host: {}",
                raw
            )));
        }
        Err(e) => {
            return Err(ShortenerError::invalid_url(format!("{}: {}", e, raw)));
        }
    };

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(ShortenerError::incomplete_url(format!(
            "URL has no host: {}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_invalid(raw: &str) -> bool {
        matches!(validate_long_url(raw), Err(ShortenerError::InvalidUrl(_)))
    }

    fn is_incomplete(raw: &str) -> bool {
        matches!(validate_long_url(raw), Err(ShortenerError::IncompleteUrl(_)))
    }

    #[test]
    fn test_valid_urls() {
        assert!(validate_long_url("http://example.com").is_ok());
        assert!(validate_long_url("https://example.com/path?query=1#frag").is_ok());
        assert!(validate_long_url("http://localhost:8080").is_ok());
        assert!(validate_long_url("ftp://files.example.org/a.txt").is_ok());
    }

    #[test]
    fn test_missing_scheme_or_host_is_incomplete() {
        assert!(is_incomplete("example.org"));
        assert!(is_incomplete("/just/a/path"));
        assert!(is_incomplete("mailto:a@b"));
        assert!(is_incomplete("http://"));
        assert!(is_incomplete(""));
    }

    #[test]
    fn test_unparseable_is_invalid() {
        assert!(is_invalid("http://[::1"));
        assert!(is_invalid("http://exa mple.com"));
        assert!(is_invalid("https://example.com/\npath"));
        assert!(is_invalid("http://example.com:99999"));
    }
}
