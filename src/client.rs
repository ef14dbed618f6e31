use std::io::{BufWriter, Error as IoError, Read};
use std::net::TcpStream;
use std::path::Path;

use crate::log;
use crate::request::{self, ParseError, ParsedRequest};
use crate::resolver::{self, ResourceKind};
use crate::response;
use crate::util::Registration;

/// Size of the socket read buffer, and with it the window within which
/// the header boundary must be found.
pub(crate) const HEADER_SCAN_LIMIT: usize = 8 * 1024;

/// A `ClientConnection` owns one accepted socket for exactly one
/// request/response cycle. The socket closes when the connection is
/// dropped; there is no reuse.
pub(crate) struct ClientConnection {
    /// keeps the server's connection gauge while the connection lives
    _client_counter: Registration,

    stream: TcpStream,
}

impl ClientConnection {
    /// Creates a new `ClientConnection` that takes ownership of the `TcpStream`.
    pub(crate) fn new(stream: TcpStream, client_counter: Registration) -> Self {
        let count = client_counter.value();
        log::info!(
            "connection [{}] count [{count}]",
            stream
                .peer_addr()
                .as_ref()
                .map_or(String::default(), |a| a.to_string())
        );
        let _ = count;

        ClientConnection {
            _client_counter: client_counter,
            stream,
        }
    }

    /// Serves one request end-to-end.
    ///
    /// Scans for the header boundary, derives the decoded target,
    /// resolves it under `root` and writes the matching response. A
    /// peer that closes before completing its header block is not an
    /// error; every other failure aborts the connection without a
    /// response.
    ///
    /// # Errors
    ///
    /// [`HandleError`] for oversized header blocks, unusable request
    /// lines and transport failures
    pub(crate) fn handle(mut self, root: &Path) -> Result<(), HandleError> {
        let header = match read_header_block(&mut self.stream)? {
            Some(header) => header,
            // end-of-stream before any boundary: no request to process
            None => return Ok(()),
        };

        let ParsedRequest { path, header_len } = request::parse(&header)?;
        log::debug!("request target {path:?} ({header_len} header bytes)");
        let _ = header_len;

        let resource = resolver::resolve(root, &path);
        let mut writer = BufWriter::with_capacity(1024, &self.stream);

        match resource.kind {
            ResourceKind::Absent => response::send_not_found(&mut writer, &path)?,
            ResourceKind::RegularFile => response::send_file(&mut writer, &resource.path)?,
            ResourceKind::Directory => {
                response::send_directory(&mut writer, root, &resource.path)?;
            }
        }

        Ok(())
    }
}

/// Reads from `source` until the CRLFCRLF header boundary is found.
///
/// Each pass reads at most [`HEADER_SCAN_LIMIT`] bytes; bytes not
/// consumed by a scan stay in the accumulator and are re-scanned
/// together with the next chunk, so no header byte is lost between
/// reads. Returns the header block including the terminating blank
/// line, or `None` when the stream ends before any boundary.
fn read_header_block<R>(source: &mut R) -> Result<Option<Vec<u8>>, HandleError>
where
    R: Read,
{
    let mut chunk = [0_u8; HEADER_SCAN_LIMIT];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let count = source.read(&mut chunk)?;
        if count == 0 {
            return Ok(None);
        }

        // a boundary can straddle the seam between two reads
        let scan_from = pending.len().saturating_sub(3);
        pending.extend_from_slice(&chunk[..count]);

        if let Some(len) = find_boundary(&pending[scan_from..]) {
            pending.truncate(scan_from + len);
            return Ok(Some(pending));
        }

        if pending.len() >= HEADER_SCAN_LIMIT {
            return Err(HandleError::HeadersTooLarge);
        }
    }
}

/// Offset just past the first CRLFCRLF in `buf`, if any.
fn find_boundary(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

/// Error that can happen when serving a connection.
#[derive(Debug)]
pub(crate) enum HandleError {
    /// no boundary within the first [`HEADER_SCAN_LIMIT`] bytes
    HeadersTooLarge,
    Parse(ParseError),
    Io(IoError),
}

impl std::error::Error for HandleError {}

impl std::fmt::Display for HandleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeadersTooLarge => {
                write!(f, "header block exceeds {HEADER_SCAN_LIMIT} bytes")
            }
            Self::Parse(err) => err.fmt(f),
            Self::Io(err) => err.fmt(f),
        }
    }
}

impl From<IoError> for HandleError {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl From<ParseError> for HandleError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}
