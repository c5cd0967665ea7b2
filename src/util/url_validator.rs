use std::net::IpAddr;
use thiserror::Error;
use url::{Host, Url};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(IpAddr),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Accept only public http(s) URLs.
///
/// Applied to article links before they are stored and again before one is
/// handed to the system browser, so a feed cannot point the reader at
/// `file://` paths or services on the local network.
///
/// ```
/// use newsdesk::util::validate_url;
///
/// assert!(validate_url("https://example.com/story").is_ok());
/// assert!(validate_url("http://localhost/admin").is_err());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedScheme(url.scheme().to_owned()));
    }

    let ip = match url.host() {
        None => return Err(UrlValidationError::MissingHost),
        Some(Host::Domain(name)) if name.eq_ignore_ascii_case("localhost") => {
            return Err(UrlValidationError::Localhost)
        }
        Some(Host::Domain(_)) => return Ok(url),
        Some(Host::Ipv4(v4)) => IpAddr::V4(v4),
        Some(Host::Ipv6(v6)) => IpAddr::V6(v6),
    };

    if ip.is_loopback() {
        Err(UrlValidationError::Localhost)
    } else if is_internal(ip) {
        Err(UrlValidationError::PrivateIp(ip))
    } else {
        Ok(url)
    }
}

fn is_internal(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80 // link local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_article_links_pass() {
        assert!(validate_url("https://example.com/2024/01/story.html").is_ok());
        assert!(validate_url("http://news.example.org:8080/a?id=3").is_ok());
        assert!(validate_url("https://93.184.216.34/page").is_ok());
    }

    #[test]
    fn other_schemes_fail() {
        assert_eq!(
            validate_url("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme("file".into()))
        );
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn loopback_fails() {
        for url in [
            "http://localhost/",
            "http://LOCALHOST:3000/",
            "http://127.0.0.1/",
            "http://[::1]/",
        ] {
            assert_eq!(validate_url(url), Err(UrlValidationError::Localhost), "{url}");
        }
    }

    #[test]
    fn internal_networks_fail() {
        for url in [
            "http://10.0.0.1/",
            "http://172.16.0.1/",
            "http://192.168.1.1:8080/",
            "http://169.254.1.1/",
            "http://0.0.0.0/",
            "http://[fe80::1]/",
            "http://[fd00::1]/",
        ] {
            assert!(
                matches!(validate_url(url), Err(UrlValidationError::PrivateIp(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn unparseable_fails() {
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}
