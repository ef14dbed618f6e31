//! Process entry point: serves one fixed directory subtree on a fixed
//! port until the process is terminated or the accept loop hits an
//! unrecoverable socket error.

use std::process::exit;

use localserve::{Server, ServerConfig};

// library dependencies not used by the binary directly
use ascii as _;
#[cfg(feature = "log")]
use log as _;
use urlencoding as _;

/// Directory subtree exposed for download.
const ROOT_DIR: &str = "/srv/files";

/// Listening port.
const PORT: u16 = 8001;

fn main() {
    env_logger::init();

    let root = match std::fs::canonicalize(ROOT_DIR) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("cannot serve {ROOT_DIR}: {err}");
            exit(1);
        }
    };

    let config = ServerConfig {
        addr: ([0, 0, 0, 0], PORT).into(),
        root,
        ..ServerConfig::default()
    };

    println!("serving {} on {}", config.root.display(), config.addr);

    match Server::new(&config) {
        Ok(mut server) => server.wait(),
        Err(err) => {
            eprintln!("server start failed: {err}");
            exit(1);
        }
    }
}
