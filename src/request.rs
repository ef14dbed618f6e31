use ascii::{AsciiChar, AsciiStr};

/// One decoded request, derived once per connection and never mutated.
#[derive(Debug)]
pub(crate) struct ParsedRequest {
    /// percent-decoded request target, e.g. `/book/chapter one.txt`
    pub(crate) path: String,

    /// byte length of the header block including the terminating blank line
    pub(crate) header_len: usize,
}

/// Error that can happen when deriving a request from a header block.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ParseError {
    /// the request line does not carry method, target and version tokens
    RequestLine,

    /// the request target does not percent-decode to UTF-8
    TargetEncoding,
}

impl std::error::Error for ParseError {}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestLine => f.write_str("no request line"),
            Self::TargetEncoding => f.write_str("request target no utf-8"),
        }
    }
}

/// Derives the request from a complete header block.
///
/// Only the target of the first line is consumed; the method and
/// version tokens must be present but are not interpreted further.
pub(crate) fn parse(header: &[u8]) -> Result<ParsedRequest, ParseError> {
    let line_len = header
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(header.len());

    let line = AsciiStr::from_ascii(&header[..line_len]).map_err(|_| ParseError::RequestLine)?;
    let target = request_target(line)?;

    let path = urlencoding::decode(target.as_str())
        .map_err(|_| ParseError::TargetEncoding)?
        .into_owned();

    Ok(ParsedRequest {
        path,
        header_len: header.len(),
    })
}

/// Picks the target out of a request line.
/// eg. GET / HTTP/1.1
fn request_target(line: &AsciiStr) -> Result<&AsciiStr, ParseError> {
    let mut parts = line.split(AsciiChar::Space);

    match (parts.next(), parts.next(), parts.next()) {
        (Some(_method), Some(target), Some(_version)) => Ok(target),
        _ => Err(ParseError::RequestLine),
    }
}
