use std::io::Result as IoResult;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::client::ClientConnection;
use crate::log;
use crate::server_config::ServerConfig;
use crate::util::{Registration, TaskPool};

/// The connection dispatcher.
///
/// Binding the listening socket and starting the accept loop happen in
/// [`Server::new`]; from then on every accepted connection is handed to
/// the bounded worker pool and served end-to-end by one worker. The
/// accept loop never blocks on request processing.
///
/// Destroying this object closes the listening socket; connections
/// already handed to a worker still finish their response.
#[allow(missing_debug_implementations)]
pub struct Server {
    /// should be false as long as the server exists
    close: Arc<AtomicBool>,

    /// result of `TcpListener::local_addr()`
    listening_addr: SocketAddr,

    /// `JoinHandle` for the accept thread
    listener_jh: Option<thread::JoinHandle<()>>,

    /// number of currently open connections
    num_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Builds a new server that listens on the configured address and
    /// serves the configured root directory.
    ///
    /// The accept loop runs on its own thread until [`Server::shutdown`]
    /// is called, the server is dropped, or an unrecoverable socket
    /// error occurs.
    ///
    /// # Errors
    ///
    /// `std::io::Error` when socket binding failed
    pub fn new(config: &ServerConfig) -> IoResult<Server> {
        let listener = TcpListener::bind(config.addr)?;
        let listening_addr = listener.local_addr()?;
        log::info!("server listening on {}", listening_addr);

        let close = Arc::new(AtomicBool::new(false));
        let num_connections = Arc::new(AtomicUsize::default());

        let listener_jh = Self::start_accept_thread(
            listener,
            config,
            Arc::clone(&close),
            Arc::clone(&num_connections),
        );

        Ok(Server {
            close,
            listening_addr,
            listener_jh: Some(listener_jh),
            num_connections,
        })
    }

    /// Returns the address the server is listening to.
    #[must_use]
    pub fn server_addr(&self) -> SocketAddr {
        self.listening_addr
    }

    /// Returns the number of clients currently connected to the server.
    #[must_use]
    pub fn num_connections(&self) -> usize {
        self.num_connections.load(Ordering::Acquire)
    }

    /// Blocks until the accept loop has terminated.
    pub fn wait(&mut self) {
        if let Some(jh) = self.listener_jh.take() {
            let _ = jh.join();
        }
    }

    /// Requests termination of the accept loop.
    ///
    /// Connections already handed to the worker pool drain before their
    /// threads exit.
    pub fn shutdown(&self) {
        self.close.store(true, Ordering::Release);

        // connect briefly to ourselves to unblock the accept call
        if let Ok(stream) = TcpStream::connect(self.listening_addr) {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn start_accept_thread(
        listener: TcpListener,
        config: &ServerConfig,
        close: Arc<AtomicBool>,
        num_connections: Arc<AtomicUsize>,
    ) -> thread::JoinHandle<()> {
        let root = config.root.clone();
        let task_pool = TaskPool::new(config.pool.clone());

        thread::spawn(move || {
            log::debug!("running accept thread");
            loop {
                match listener.accept() {
                    Ok((stream, _)) => {
                        if close.load(Ordering::Acquire) {
                            break;
                        }

                        let client_counter = Registration::new(Arc::clone(&num_connections));
                        let connection = ClientConnection::new(stream, client_counter);
                        Self::dispatch(&task_pool, connection, &root);
                    }
                    Err(err) => {
                        log::error!("error on connection accept: {err:?}");
                        let _ = err;
                        break;
                    }
                };
            }
            log::debug!("terminating accept thread");
            // task_pool drops here and the workers drain the backlog
        })
    }

    /// Submits one connection to the worker pool. Saturation is logged
    /// and drops the connection; the accept loop keeps running.
    fn dispatch(task_pool: &TaskPool, connection: ClientConnection, root: &Path) {
        let root: PathBuf = root.to_path_buf();
        let mut client = Some(connection);

        let submitted = task_pool.try_spawn(Box::new(move || {
            let client = client.take().unwrap(); // safe: task runs once

            if let Err(err) = client.handle(&root) {
                log::debug!("connection failed: {err}");
                let _ = err;
            }
        }));

        if let Err(err) = submitted {
            log::warn!(
                "connection rejected: {err} ({} workers busy)",
                task_pool.threads_total()
            );
            let _ = err;
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}
