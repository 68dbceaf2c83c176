//! URL Component Splitting
//!
//! Splits a raw string along the `scheme://netloc/path;params?query#fragment`
//! grammar without normalizing anything: hosts keep their case, paths keep
//! their dot segments and percent escapes stay as written. The lengths of
//! these raw pieces are what the classifier was trained on, so a normalizing
//! parser would shift every length feature.

use crate::error::ParseError;
use std::net::Ipv6Addr;
use unicode_normalization::UnicodeNormalization;

/// Schemes whose last path segment may carry `;params`
const SCHEMES_WITH_PARAMS: [&str; 16] = [
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtsps", "rtspu",
    "sip", "sips", "mms", "sftp", "tel",
];

/// Raw components of a URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlComponents {
    scheme: String,
    netloc: String,
    path: String,
    params: String,
    query: String,
    fragment: String,
    port: Option<u16>,
}

impl UrlComponents {
    /// Split `raw` into its components.
    ///
    /// Any string without a scheme or authority still parses (everything
    /// lands in the path). The only failures are a broken bracketed host, a
    /// non-ASCII authority that NFKC-normalizes into URL delimiters and a
    /// port that is not a number in 0-65535.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
            .collect();
        let mut rest = cleaned.trim_start_matches(|c: char| c <= ' ');

        let mut scheme = String::new();
        if let Some(colon) = rest.find(':') {
            let candidate = &rest[..colon];
            if candidate.starts_with(|c: char| c.is_ascii_alphabetic())
                && candidate.chars().all(is_scheme_char)
            {
                scheme = candidate.to_ascii_lowercase();
                rest = &rest[colon + 1..];
            }
        }

        let mut netloc = "";
        if let Some(after) = rest.strip_prefix("//") {
            let end = after
                .find(|c: char| matches!(c, '/' | '?' | '#'))
                .unwrap_or(after.len());
            netloc = &after[..end];
            rest = &after[end..];

            let open = netloc.contains('[');
            let close = netloc.contains(']');
            if open != close {
                return Err(ParseError::InvalidIpv6(netloc.to_string()));
            }
            if open {
                check_bracketed_netloc(netloc)?;
            }
            check_normalized_netloc(netloc)?;
        }

        let (rest, fragment) = rest.split_once('#').unwrap_or((rest, ""));
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (path, params) = if SCHEMES_WITH_PARAMS.contains(&scheme.as_str()) {
            split_params(rest)
        } else {
            (rest, "")
        };

        let port = parse_port(netloc)?;

        Ok(Self {
            scheme,
            netloc: netloc.to_string(),
            path: path.to_string(),
            params: params.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
            port,
        })
    }

    /// Lower-cased scheme, empty when absent
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Authority exactly as written (userinfo, host and port)
    pub fn netloc(&self) -> &str {
        &self.netloc
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &str {
        &self.params
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Explicit port, `None` when the authority has no `:port` or it is empty
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Last dot-separated label of the authority, port included if present
    pub fn last_label(&self) -> &str {
        self.netloc.rsplit('.').next().unwrap_or("")
    }

    /// Path segments with empty pieces discarded
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

/// Split `;params` off the last path segment
fn split_params(url: &str) -> (&str, &str) {
    let start = url.rfind('/').unwrap_or(0);
    match url[start..].find(';') {
        Some(offset) => {
            let i = start + offset;
            (&url[..i], &url[i + 1..])
        }
        None => (url, ""),
    }
}

/// Host part after any userinfo
fn host_info(netloc: &str) -> &str {
    netloc.rsplit_once('@').map_or(netloc, |(_, host)| host)
}

fn check_bracketed_netloc(netloc: &str) -> Result<(), ParseError> {
    let invalid = || ParseError::InvalidIpv6(netloc.to_string());
    let host_and_port = host_info(netloc);

    let hostname = match host_and_port.split_once('[') {
        Some((before, bracketed)) => {
            if !before.is_empty() {
                return Err(invalid());
            }
            let (hostname, trailer) = bracketed.split_once(']').unwrap_or((bracketed, ""));
            if !trailer.is_empty() && !trailer.starts_with(':') {
                return Err(invalid());
            }
            hostname
        }
        // Brackets only appeared in the userinfo
        None => host_and_port
            .split_once(':')
            .map_or(host_and_port, |(host, _)| host),
    };

    if let Some(future) = hostname.strip_prefix('v') {
        // IPvFuture: v<hex>.<anything>
        let valid = future.split_once('.').is_some_and(|(version, tail)| {
            !version.is_empty() && version.chars().all(|c| c.is_ascii_hexdigit()) && !tail.is_empty()
        });
        return if valid { Ok(()) } else { Err(invalid()) };
    }

    let address = match hostname.split_once('%') {
        Some((address, zone)) if !zone.is_empty() && !zone.contains('%') => address,
        Some(_) => return Err(invalid()),
        None => hostname,
    };
    address.parse::<Ipv6Addr>().map(|_| ()).map_err(|_| invalid())
}

/// Reject a non-ASCII authority whose compatibility form hides a delimiter,
/// such as a full-width solidus that NFKC turns into `/`.
fn check_normalized_netloc(netloc: &str) -> Result<(), ParseError> {
    if netloc.is_ascii() {
        return Ok(());
    }
    let stripped: String = netloc
        .chars()
        .filter(|c| !matches!(c, '@' | ':' | '#' | '?'))
        .collect();
    let normalized: String = stripped.nfkc().collect();
    if normalized == stripped {
        return Ok(());
    }
    if normalized.contains(|c: char| matches!(c, '/' | '?' | '#' | '@' | ':')) {
        return Err(ParseError::InvalidNetloc(netloc.to_string()));
    }
    Ok(())
}

fn parse_port(netloc: &str) -> Result<Option<u16>, ParseError> {
    let host = host_info(netloc);
    let port = match host.split_once('[') {
        Some((_, bracketed)) => bracketed
            .split_once(']')
            .map_or("", |(_, trailer)| trailer)
            .split_once(':')
            .map_or("", |(_, port)| port),
        None => host.split_once(':').map_or("", |(_, port)| port),
    };

    if port.is_empty() {
        return Ok(None);
    }
    if !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidPort(port.to_string()));
    }
    port.parse::<u16>()
        .map(Some)
        .map_err(|_| ParseError::InvalidPort(port.to_string()))
}
