use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

/// Represents the config parameters required to create a server.
///
/// The values are fixed for the process lifetime; the server takes a
/// copy at construction and never reconfigures itself.
///
/// # Example
///
/// ```
/// # use localserve::ServerConfig;
/// let cfg = ServerConfig { root: "/srv/files".into(), ..ServerConfig::default() };
/// ```
///
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to listen to.
    pub addr: SocketAddr,

    /// The directory subtree exposed for download and browsing.
    pub root: PathBuf,

    /// Worker pool sizing
    /// See [`PoolConfig`]
    pub pool: PoolConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from_str("0.0.0.0:8001").unwrap(),
            root: PathBuf::from("."),
            pool: PoolConfig::default(),
        }
    }
}

/// Sizing of the bounded worker pool dispatching accepted connections.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Worker threads kept alive even when idle.
    pub min_workers: usize,

    /// Upper bound of concurrently running worker threads.
    pub max_workers: usize,

    /// Capacity of the backlog queue. Submissions beyond it are
    /// rejected while the pool is at `max_workers`.
    pub queue_capacity: usize,

    /// Time an idle worker above the minimum stays alive.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_workers: 2,
            max_workers: 4,
            queue_capacity: 10,
            idle_timeout: Duration::from_secs(3),
        }
    }
}
