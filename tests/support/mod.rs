use std::fs;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use localserve::{Server, ServerConfig};

/// Creates a [`TcpStream`] Client for first `addr`
pub(crate) fn create_client<A>(addr: A, timeout: Option<Duration>) -> TcpStream
where
    A: ToSocketAddrs,
{
    let addr = addr.to_socket_addrs().unwrap().next().unwrap();
    let stream = TcpStream::connect(addr).unwrap();

    stream.set_nodelay(true).unwrap();
    if timeout.is_some() {
        stream.set_read_timeout(timeout).unwrap();
        stream.set_write_timeout(timeout).unwrap();
    }

    stream
}

/// Creates a scratch directory tree and a server exposing it on an
/// ephemeral port.
///
/// The tree:
///
/// ```text
/// hello.txt              "hello world\n"
/// book/chapter one.txt   "once upon a time"
/// ```
pub(crate) fn new_file_server() -> (Server, PathBuf) {
    static NEXT: AtomicUsize = AtomicUsize::new(0);

    let root = std::env::temp_dir().join(format!(
        "localserve-it-{}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::SeqCst)
    ));
    fs::create_dir_all(root.join("book")).unwrap();
    fs::write(root.join("hello.txt"), b"hello world\n").unwrap();
    fs::write(root.join("book").join("chapter one.txt"), b"once upon a time").unwrap();

    let server = Server::new(&ServerConfig {
        addr: "127.0.0.1:0".parse().unwrap(),
        root: root.clone(),
        ..ServerConfig::default()
    })
    .unwrap();

    (server, root)
}

/// Sends one request for `target` and returns the raw response bytes.
///
/// The server closes the connection after the response, so the read
/// runs to end-of-stream.
pub(crate) fn fetch(server: &Server, target: &str) -> Vec<u8> {
    let mut client = create_client(server.server_addr(), Some(Duration::from_secs(5)));
    write!(client, "GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();

    let mut response = Vec::new();
    let _ = client.read_to_end(&mut response).unwrap();
    response
}
