//! Connection lifecycle management
//!
//! Owns the single live driver handle: establishes it lazily, runs the
//! connect-time handshake (read timeout, AUTH, SELECT), and replaces it after
//! failures with a bounded, fixed-interval retry sequence.
//!
//! ## State Machine
//!
//! ```text
//! Unconnected ──▶ Connecting ──▶ Connected
//!                     ▲              │ dispatch-time connection failure
//!                     │              ▼
//!                     └──── Reconnecting ────▶ Connected
//!                                │
//!                                └──(budget exhausted)──▶ Fatal (terminal)
//! ```
//!
//! Reconnection is deliberately dumb: one attempt per fixed interval, no
//! backoff, a hard cap on attempts. Exhausting the cap is terminal and the
//! documented remediation is restarting the process.

use std::thread;
use std::time::{Duration, Instant};

use crate::config::ProxyConfig;
use crate::driver::{Connector, Driver};
use crate::endpoint::{ServerEndpoint, ServerTarget};
use crate::error::{ProxyError, Result};

/// Lifecycle state of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// No handle; the next dispatch connects.
    Unconnected,
    /// A connect attempt is in progress.
    Connecting,
    /// A live handle is installed.
    Connected,
    /// A reconnect sequence is running.
    Reconnecting,
    /// The retry budget was exhausted. Terminal.
    Fatal,
}

/// Observer run after every successful reconnect.
///
/// Signals "the handle was replaced" so owners of state tied to the old
/// handle (cached connections, WATCHed keys) can drop it.
pub type ReconnectHook = Box<dyn Fn() + Send + Sync>;

/// Owns the driver handle and its lifecycle.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    target: ServerTarget,
    database: Option<i64>,
    read_timeout: Duration,
    retry_interval: Duration,
    max_retry_attempts: u32,
    /// Host identity attached to every reconnect-path log line.
    host: String,
    handle: Option<C::Handle>,
    state: ConnState,
    reconnect_hook: Option<ReconnectHook>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Store the target and settings. Does not connect.
    pub fn new(connector: C, config: &ProxyConfig) -> Self {
        ConnectionManager {
            connector,
            target: config.target.clone(),
            database: config.database,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            retry_interval: Duration::from_millis(config.retry_interval_ms),
            max_retry_attempts: config.max_retry_attempts,
            host: host_identity(),
            handle: None,
            state: ConnState::Unconnected,
            reconnect_hook: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Register the observer run after every successful reconnect.
    pub fn on_reconnect(&mut self, hook: impl Fn() + Send + Sync + 'static) {
        self.reconnect_hook = Some(Box::new(hook));
    }

    /// Establish a connection to the configured target.
    ///
    /// Parses the target, opens the driver with the read timeout applied,
    /// authenticates when the address carries a password, and selects the
    /// configured database index. Every lower-level failure comes back as
    /// [`ProxyError::Connection`].
    pub fn connect(&mut self) -> Result<()> {
        self.state = ConnState::Connecting;
        match self.establish() {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = ConnState::Connected;
                Ok(())
            }
            Err(err) => {
                self.handle = None;
                self.state = ConnState::Unconnected;
                Err(err)
            }
        }
    }

    /// Connect if no handle exists yet, then hand out the handle.
    ///
    /// The manager never connects at construction time; the first dispatch
    /// lands here. In `Fatal` state this refuses without touching the
    /// network.
    pub fn ensure_connected(&mut self) -> Result<&mut C::Handle> {
        if self.state == ConnState::Fatal {
            return Err(ProxyError::RetryExhausted {
                attempts: self.max_retry_attempts,
                last_error: "connection is permanently down".to_string(),
            });
        }
        if self.handle.is_none() {
            self.connect()?;
        }
        self.handle
            .as_mut()
            .ok_or_else(|| ProxyError::Connection("no handle after connect".to_string()))
    }

    /// Drop the current handle after a dispatch-time connection failure.
    ///
    /// Keeps the invariant that no command is ever issued on a handle known
    /// to be bad.
    pub fn invalidate(&mut self) {
        self.close_handle();
        if self.state != ConnState::Fatal {
            self.state = ConnState::Unconnected;
        }
    }

    /// Replace the failed handle, retrying at a fixed interval.
    ///
    /// Each attempt sleeps the interval first, then connects: the failure
    /// that got us here counts as "the server just went away", so probing
    /// again immediately would be wasted. Exhausting the attempt budget is
    /// terminal.
    pub fn reconnect(&mut self) -> Result<()> {
        if self.state == ConnState::Fatal {
            return Err(ProxyError::RetryExhausted {
                attempts: self.max_retry_attempts,
                last_error: "connection is permanently down".to_string(),
            });
        }
        self.close_handle();
        self.state = ConnState::Reconnecting;

        let started = Instant::now();
        let mut last_error = String::new();

        for attempt in 1..=self.max_retry_attempts {
            thread::sleep(self.retry_interval);

            match self.establish() {
                Ok(handle) => {
                    self.handle = Some(handle);
                    self.state = ConnState::Connected;
                    tracing::info!(
                        host = %self.host,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "reconnected to redis"
                    );
                    if let Some(hook) = &self.reconnect_hook {
                        hook();
                    }
                    return Ok(());
                }
                Err(err) => {
                    last_error = err.to_string();
                    tracing::warn!(
                        host = %self.host,
                        attempt,
                        max_attempts = self.max_retry_attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        error = %last_error,
                        "reconnect attempt failed"
                    );
                }
            }
        }

        self.state = ConnState::Fatal;
        tracing::error!(
            host = %self.host,
            attempts = self.max_retry_attempts,
            error = %last_error,
            "reconnect retry budget exhausted"
        );
        Err(ProxyError::RetryExhausted {
            attempts: self.max_retry_attempts,
            last_error,
        })
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Run the full connect sequence, returning the new handle.
    fn establish(&self) -> Result<C::Handle> {
        let endpoint = ServerEndpoint::parse(&self.target)?;

        let mut handle = self
            .connector
            .open(&endpoint, self.read_timeout)
            .map_err(|err| ProxyError::Connection(err.to_string()))?;

        // Cluster credentials are applied by the driver at open; a standalone
        // address authenticates explicitly here.
        if let ServerEndpoint::Single(addr) = &endpoint {
            if let Some(password) = addr.password() {
                handle
                    .auth(addr.username(), password)
                    .map_err(|err| ProxyError::Connection(err.to_string()))?;
            }
        }

        if let Some(database) = self.database {
            handle
                .select(database)
                .map_err(|err| ProxyError::Connection(err.to_string()))?;
        }

        Ok(handle)
    }

    /// Close and drop the current handle. Close errors are ignored.
    fn close_handle(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
    }
}

/// Host identity for log lines, so multi-worker deployments can tell whose
/// connection is flapping.
fn host_identity() -> String {
    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
