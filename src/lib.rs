//! # Simple usage
//!
//! ## Creating the server
//!
//! The server binds its listening socket and starts the accept loop in
//! `Server::new()`, which returns an `IoResult<Server>` with an error
//! in the case where the server creation fails (for example if the
//! listening port is already occupied).
//!
//! ```no_run
//! # fn main() -> std::io::Result<()> {
//! let mut server = localserve::Server::new(&localserve::ServerConfig {
//!     root: "/srv/files".into(),
//!     ..localserve::ServerConfig::default()
//! })?;
//!
//! server.wait();
//! # Ok(())
//! # }
//! ```
//!
//! ## Serving requests
//!
//! There is nothing to call: every accepted connection is handed to a
//! bounded worker pool and carries exactly one GET-style request. The
//! worker answers with one of three replies and closes the socket:
//!
//!  - a regular file under the root is streamed verbatim as an opaque
//!    download with its byte length,
//!  - a directory is rendered as an HTML listing of anchors, one per
//!    child plus a parent-directory link,
//!  - anything else is a 404 naming the requested path.
//!
//! Percent-encoded request targets are decoded as UTF-8 before they
//! are resolved against the root. There is no keep-alive, no routing
//! and no runtime configuration; root, port and pool sizing are fixed
//! in the [`ServerConfig`] for the process lifetime.

pub use server::Server;
pub use server_config::{PoolConfig, ServerConfig};

mod client;
mod log;
mod request;
mod resolver;
mod response;
mod server;
mod server_config;
mod util;

// logger implementation is only used by the binary target
use env_logger as _;
