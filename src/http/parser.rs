use thiserror::Error;

use crate::http::request::{Method, Request, RequestBuilder};

/// Largest header block accepted when no limit is configured.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8192;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No blank line yet; more bytes are needed.
    #[error("incomplete header block")]
    Incomplete,

    #[error("header block exceeds {limit} bytes")]
    HeaderTooLarge { limit: usize },

    #[error("request line or Host value is not valid UTF-8")]
    InvalidEncoding,

    #[error("invalid request line: {0:?}")]
    InvalidRequestLine(String),

    #[error("invalid header line: {0:?}")]
    InvalidHeader(String),

    #[error("missing Host header")]
    MissingHost,
}

/// Parses a header block with the default size limit.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    parse_http_request_with_limit(buf, DEFAULT_MAX_HEADER_BYTES)
}

/// Parses the header block at the start of `buf`.
///
/// Returns the request and the number of bytes consumed, up to and
/// including the terminating blank line. Nothing past it is read; GET
/// requests have no body.
pub fn parse_http_request_with_limit(
    buf: &[u8],
    max_header_bytes: usize,
) -> Result<(Request, usize), ParseError> {
    let Some(headers_end) = find_headers_end(buf) else {
        if buf.len() > max_header_bytes {
            return Err(ParseError::HeaderTooLarge { limit: max_header_bytes });
        }
        return Err(ParseError::Incomplete);
    };

    if headers_end > max_header_bytes {
        return Err(ParseError::HeaderTooLarge { limit: max_header_bytes });
    }

    // Only the request line and the Host value need to be text; other
    // header values are skipped without decoding
    let mut lines = header_lines(&buf[..headers_end]).skip_while(|line| line.is_empty());

    let request_line = lines
        .next()
        .ok_or_else(|| ParseError::InvalidRequestLine(String::new()))?;
    let request_line = std::str::from_utf8(request_line).map_err(|_| ParseError::InvalidEncoding)?;
    let (method, file_path, version) = split_request_line(request_line)?;

    let mut builder = RequestBuilder::new()
        .method(Method::parse(method))
        .file_path(file_path)
        .version(version);

    for line in lines {
        if line.is_empty() {
            break;
        }

        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| ParseError::InvalidHeader(String::from_utf8_lossy(line).into_owned()))?;
        let name = line[..colon].trim_ascii();
        let value = line[colon + 1..].trim_ascii();

        if name.eq_ignore_ascii_case(b"Host") {
            let host = std::str::from_utf8(value).map_err(|_| ParseError::InvalidEncoding)?;
            if !host.is_empty() {
                builder = builder.host(host);
            }
        } else if name.eq_ignore_ascii_case(b"Connection") {
            builder = builder.keep_alive(value.eq_ignore_ascii_case(b"keep-alive"));
        }
    }

    // Method, path and version are always set, so only the host can be missing
    let request = builder.build().map_err(|_| ParseError::MissingHost)?;

    Ok((request, headers_end))
}

/// `<METHOD> <PATH> <VERSION>`, single spaces, no empty tokens.
fn split_request_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();
    match parts.as_slice() {
        [method, path, version]
            if !method.is_empty() && !path.is_empty() && !version.is_empty() =>
        {
            Ok((method, path, version))
        }
        _ => Err(ParseError::InvalidRequestLine(line.to_string())),
    }
}

/// Header block lines with the LF and any preceding CR removed.
fn header_lines(head: &[u8]) -> impl Iterator<Item = &[u8]> {
    head.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Offset just past the blank line ending the header block.
///
/// Lines end in LF with an optional preceding CR. Blank lines seen before
/// any request line do not terminate the block.
fn find_headers_end(buf: &[u8]) -> Option<usize> {
    let mut start = 0;
    let mut seen_request_line = false;

    while let Some(offset) = buf[start..].iter().position(|&b| b == b'\n') {
        let end = start + offset;
        let line = &buf[start..end];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        start = end + 1;

        if !line.is_empty() {
            seen_request_line = true;
        } else if seen_request_line {
            return Some(start);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.file_path, "/");
        assert_eq!(parsed.host, "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn headers_end_with_bare_lf() {
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\nHost: a\n\nrest"), Some(24));
    }

    #[test]
    fn headers_end_skips_leading_blank_lines() {
        let buf = b"\r\nGET / HTTP/1.1\r\n\r\n";
        assert_eq!(find_headers_end(buf), Some(buf.len()));
        assert_eq!(find_headers_end(b"\r\n\r\n"), None);
    }

    #[test]
    fn header_lines_strip_both_line_endings() {
        let lines: Vec<&[u8]> = header_lines(b"a\r\nb\nc").collect();
        assert_eq!(lines, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
    }

    #[test]
    fn request_line_needs_exactly_three_tokens() {
        assert!(split_request_line("GET / HTTP/1.1").is_ok());
        assert!(split_request_line("GET /").is_err());
        assert!(split_request_line("GET  / HTTP/1.1").is_err());
        assert!(split_request_line("GET / HTTP/1.1 extra").is_err());
    }
}
