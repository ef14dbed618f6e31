//! The three response serializers: file download, directory listing
//! and not-found. Each writes one complete response to a connection's
//! sink and is used at most once per connection.

use std::fs::{self, File};
use std::io::{self, Result as IoResult, Write};
use std::path::Path;

/// Status code of a response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct StatusCode(pub(crate) u16);

impl StatusCode {
    /// Returns the default reason phrase for this status code.
    /// For example the status code 404 corresponds to "Not Found".
    pub(crate) fn default_reason_phrase(self) -> &'static str {
        match self.0 {
            200 => "OK",
            404 => "Not Found",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Downloads are served as an opaque binary stream; the server does no
/// MIME detection.
const CONTENT_TYPE_DOWNLOAD: &str = "application/x-msdownload";

const CONTENT_TYPE_HTML: &str = "text/html; charset=UTF-8";

/// One child of a listed directory.
struct DirectoryEntry {
    /// bare file name, used as the anchor label
    name: String,

    /// path relative to the served root, used as the link target
    relative: String,
}

impl DirectoryEntry {
    fn new(root: &Path, path: &Path) -> Option<DirectoryEntry> {
        let name = path.file_name()?.to_string_lossy().into_owned();

        let relative = path
            .strip_prefix(root)
            .ok()?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Some(DirectoryEntry { name, relative })
    }

    /// Link target: the root-relative path percent-encoded as a URL
    /// component, with the separator encoding undone afterwards so
    /// intermediate slashes stay literal.
    fn href(&self) -> String {
        urlencoding::encode(&format!("/{}", self.relative)).replace("%2F", "/")
    }
}

fn write_header_block<W>(
    writer: &mut W,
    status: StatusCode,
    content_type: &str,
    content_length: Option<u64>,
) -> IoResult<()>
where
    W: Write,
{
    // writing status line
    write!(
        writer,
        "HTTP/1.1 {} {}\r\n",
        status.0,
        status.default_reason_phrase()
    )?;

    // writing headers
    write!(writer, "Content-Type: {content_type}\r\n")?;
    if let Some(len) = content_length {
        write!(writer, "Content-Length: {len}\r\n")?;
    }

    // separator between header and data
    write!(writer, "\r\n")?;

    Ok(())
}

/// Sends the file at `path` verbatim as a download.
///
/// `Content-Length` is taken from the file metadata; the bytes are
/// streamed to the sink without buffering the whole file.
pub(crate) fn send_file<W>(writer: &mut W, path: &Path) -> IoResult<()>
where
    W: Write,
{
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    write_header_block(writer, StatusCode(200), CONTENT_TYPE_DOWNLOAD, Some(len))?;
    let _ = io::copy(&mut file, writer)?;

    writer.flush()
}

/// Sends the 404 response for a target that resolved to nothing.
///
/// The body names the target without its leading separator and the
/// length header is computed from the encoded body.
pub(crate) fn send_not_found<W>(writer: &mut W, target: &str) -> IoResult<()>
where
    W: Write,
{
    let target = target.strip_prefix('/').unwrap_or(target);
    let body = format!("File[{target}] Not Found");

    write_header_block(
        writer,
        StatusCode(404),
        CONTENT_TYPE_HTML,
        Some(body.len() as u64),
    )?;
    writer.write_all(body.as_bytes())?;

    writer.flush()
}

/// Sends the browsable listing for the directory at `path`.
///
/// The listing is taken before any byte is written; when the directory
/// cannot be read, the response is abandoned and the connection closes
/// without output. Entries come in the filesystem's native order and
/// carry no `Content-Length`.
pub(crate) fn send_directory<W>(writer: &mut W, root: &Path, path: &Path) -> IoResult<()>
where
    W: Write,
{
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    write_header_block(writer, StatusCode(200), CONTENT_TYPE_HTML, None)?;

    write!(writer, "<div><a href='..'>Parent Directory</a></div>")?;

    for entry in entries {
        let entry = entry?;
        if let Some(entry) = DirectoryEntry::new(root, &entry.path()) {
            write!(
                writer,
                "<div><a href='{}'>{}</a></div>",
                entry.href(),
                entry.name
            )?;
        }
    }

    writer.flush()
}
