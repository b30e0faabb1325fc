//! Driver seam and the production redis binding
//!
//! The proxy never speaks the wire protocol itself; it drives an opaque
//! handle through the [`Driver`] trait and obtains handles through a
//! [`Connector`]. Tests swap in scripted implementations; production code
//! uses [`RedisConnector`], which wraps the `redis` crate's standalone and
//! cluster connections behind one handle type.

use std::time::Duration;

use redis::cluster::{ClusterClient, ClusterConnection};
use redis::{Client, Connection, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError, Value};

use crate::command::Arg;
use crate::endpoint::{ServerAddr, ServerEndpoint};

// =============================================================================
// Driver Traits
// =============================================================================

/// Result type for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Failure classification the retry loop depends on.
///
/// `Connection` means the handle is unusable and must be replaced before the
/// next dispatch. `Operation` means the server answered and rejected the
/// command; the handle stays good.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("connection failure: {0}")]
    Connection(String),

    #[error("command rejected: {0}")]
    Operation(String),
}

/// A live connection able to execute commands.
pub trait Driver {
    /// Execute a command by name with positional arguments.
    fn invoke(&mut self, command: &str, args: &[Arg]) -> DriverResult<Value>;

    /// Authenticate the connection.
    fn auth(&mut self, username: Option<&str>, password: &str) -> DriverResult<()>;

    /// Select a logical database index.
    fn select(&mut self, database: i64) -> DriverResult<()>;

    /// Close the connection, best-effort. Callers discard the handle right
    /// after, so there is nothing useful to report.
    fn close(&mut self);
}

/// Opens [`Driver`] handles for a parsed endpoint.
pub trait Connector {
    type Handle: Driver;

    /// Establish a new connection with the given read timeout applied.
    fn open(&self, endpoint: &ServerEndpoint, read_timeout: Duration) -> DriverResult<Self::Handle>;
}

// =============================================================================
// Redis Binding
// =============================================================================

/// Connector producing [`RedisHandle`]s via the `redis` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl RedisConnector {
    pub fn new() -> Self {
        RedisConnector
    }
}

impl Connector for RedisConnector {
    type Handle = RedisHandle;

    fn open(&self, endpoint: &ServerEndpoint, read_timeout: Duration) -> DriverResult<RedisHandle> {
        let conn = match endpoint {
            ServerEndpoint::Single(addr) => {
                // Credentials are NOT baked into the handshake here; the
                // connection manager issues an explicit AUTH so auth failures
                // classify like any other connect-time failure.
                let client = Client::open(connection_info(addr, false)).map_err(connection_error)?;
                let conn = client.get_connection().map_err(connection_error)?;
                conn.set_read_timeout(Some(read_timeout))
                    .map_err(connection_error)?;
                RedisConn::Standalone(conn)
            }
            ServerEndpoint::Cluster(addrs) => {
                // Cluster nodes are authenticated by the client itself, which
                // needs the credentials up front to reach every node.
                let infos: Vec<ConnectionInfo> =
                    addrs.iter().map(|addr| connection_info(addr, true)).collect();
                let client = ClusterClient::new(infos).map_err(connection_error)?;
                let conn = client.get_connection().map_err(connection_error)?;
                conn.set_read_timeout(Some(read_timeout))
                    .map_err(connection_error)?;
                RedisConn::Cluster(conn)
            }
        };
        Ok(RedisHandle { conn })
    }
}

fn connection_info(addr: &ServerAddr, with_credentials: bool) -> ConnectionInfo {
    let (conn_addr, username, password) = match addr {
        ServerAddr::Tcp {
            host,
            port,
            username,
            password,
        } => (
            ConnectionAddr::Tcp(host.clone(), *port),
            username.clone(),
            password.clone(),
        ),
        ServerAddr::Unix { path } => (ConnectionAddr::Unix(path.clone()), None, None),
    };
    let redis = if with_credentials {
        RedisConnectionInfo {
            username,
            password,
            ..Default::default()
        }
    } else {
        RedisConnectionInfo::default()
    };
    ConnectionInfo {
        addr: conn_addr,
        redis,
    }
}

/// Live connection to a standalone server or a cluster.
pub struct RedisHandle {
    conn: RedisConn,
}

enum RedisConn {
    Standalone(Connection),
    Cluster(ClusterConnection),
}

impl RedisHandle {
    fn query(&mut self, cmd: &redis::Cmd) -> Result<Value, RedisError> {
        match &mut self.conn {
            RedisConn::Standalone(conn) => cmd.query(conn),
            RedisConn::Cluster(conn) => cmd.query(conn),
        }
    }
}

impl Driver for RedisHandle {
    fn invoke(&mut self, command: &str, args: &[Arg]) -> DriverResult<Value> {
        let mut cmd = redis::cmd(command);
        for arg in args {
            match arg {
                Arg::Single(value) => {
                    cmd.arg(value.as_slice());
                }
                Arg::Many(values) => {
                    for value in values {
                        cmd.arg(value.as_slice());
                    }
                }
            }
        }
        self.query(&cmd).map_err(classify)
    }

    fn auth(&mut self, username: Option<&str>, password: &str) -> DriverResult<()> {
        let mut cmd = redis::cmd("AUTH");
        if let Some(user) = username {
            cmd.arg(user);
        }
        cmd.arg(password);
        self.query(&cmd).map(|_| ()).map_err(classify)
    }

    fn select(&mut self, database: i64) -> DriverResult<()> {
        let mut cmd = redis::cmd("SELECT");
        cmd.arg(database);
        self.query(&cmd).map(|_| ()).map_err(classify)
    }

    fn close(&mut self) {
        // QUIT lets the server drop the link cleanly. The handle is being
        // discarded, so a failure here changes nothing.
        if let RedisConn::Standalone(_) = self.conn {
            let _ = self.query(&redis::cmd("QUIT"));
        }
    }
}

/// Split a redis error into the proxy's two failure classes.
fn classify(err: RedisError) -> DriverError {
    if is_connection_failure(&err) {
        DriverError::Connection(err.to_string())
    } else {
        DriverError::Operation(err.to_string())
    }
}

fn is_connection_failure(err: &RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout()
}

fn connection_error(err: RedisError) -> DriverError {
    DriverError::Connection(err.to_string())
}
