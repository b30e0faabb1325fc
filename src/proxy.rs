//! Command proxy
//!
//! The single entry point for every store operation. [`Proxy::invoke`]
//! rewrites key-bearing first arguments with the process namespace, forwards
//! the command through the managed connection, and converts failures
//! according to one rule: connection trouble is retried (or surfaced, in
//! fail-fast mode), command rejection is swallowed into a sentinel reply.
//!
//! ## Dispatch Flow
//!
//! ```text
//! invoke(command, args)
//!     │  lowercase name, prefix args[0] when key-bearing
//!     ▼
//! ensure_connected ──connect error──▶ reconnect ──exhausted──▶ RetryExhausted
//!     │                                   │
//!     ▼                                   │ success: loop back
//! Driver::invoke ──connection error──────┘
//!     │        └───rejection───▶ Reply::Rejected
//!     ▼
//! Reply::Value
//! ```

use parking_lot::Mutex;
use redis::Value;

use crate::command::{Arg, KeyCommandSet};
use crate::config::ProxyConfig;
use crate::driver::{Connector, Driver, DriverError, RedisConnector};
use crate::error::{ProxyError, Result};
use crate::manager::{ConnState, ConnectionManager};
use crate::namespace;

/// Outcome of a proxied command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The driver's reply, passed through untransformed.
    Value(Value),
    /// The server answered and rejected the command. A distinct variant,
    /// never to be confused with a legitimate `Value::Nil` reply.
    Rejected,
}

impl Reply {
    /// Whether the command was rejected server-side.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Reply::Rejected)
    }

    /// The inner value, when the command succeeded.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Reply::Value(value) => Some(value),
            Reply::Rejected => None,
        }
    }

    /// Consume the reply, yielding the inner value when the command
    /// succeeded.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Reply::Value(value) => Some(value),
            Reply::Rejected => None,
        }
    }
}

/// Resilient, namespace-aware command proxy over a driver connection.
///
/// One instance owns one logical connection. Methods take `&self`; an
/// internal mutex serializes dispatch with handle replacement, so sharing an
/// instance across threads stalls callers behind a reconnect sequence instead
/// of racing the handle swap.
pub struct Proxy<C: Connector> {
    manager: Mutex<ConnectionManager<C>>,
    key_commands: KeyCommandSet,
    fail_fast: bool,
}

/// Proxy bound to the production redis driver.
pub type RedisProxy = Proxy<RedisConnector>;

impl Proxy<RedisConnector> {
    /// Build a proxy over the production redis driver. Does not connect; the
    /// first dispatched command establishes the connection.
    pub fn new(config: ProxyConfig) -> Self {
        Proxy::with_connector(RedisConnector::new(), config)
    }
}

impl<C: Connector> Proxy<C> {
    /// Build a proxy from an arbitrary connector.
    pub fn with_connector(connector: C, config: ProxyConfig) -> Self {
        let manager = ConnectionManager::new(connector, &config);
        Proxy {
            manager: Mutex::new(manager),
            key_commands: config.key_commands,
            fail_fast: config.fail_fast,
        }
    }

    /// Register the observer run after every successful reconnect.
    ///
    /// The hook runs on the dispatching thread with the connection lock
    /// held: it must not call back into this proxy, or it deadlocks.
    pub fn on_reconnect(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.manager.lock().on_reconnect(hook);
    }

    /// Current lifecycle state of the underlying connection.
    pub fn state(&self) -> ConnState {
        self.manager.lock().state()
    }

    /// Execute a command through the proxy.
    ///
    /// When `command` is key-bearing, the first argument (the scalar, or
    /// every element of a sequence) is prefixed with the current process
    /// namespace. The rewrite happens on this call's own copy of the
    /// arguments; nothing global changes.
    ///
    /// Failure handling:
    /// - connection failures reconnect transparently and retry the command,
    ///   or surface as [`ProxyError::Connection`] in fail-fast mode
    /// - an exhausted reconnect budget surfaces as
    ///   [`ProxyError::RetryExhausted`] and every later call fails the same
    ///   way without touching the network
    /// - server-side rejections (wrong type, bad arity, WRONGTYPE and
    ///   friends) come back as [`Reply::Rejected`], not as an error
    pub fn invoke(&self, command: &str, args: Vec<Arg>) -> Result<Reply> {
        let name = command.to_ascii_lowercase();
        let mut args = args;

        if self.key_commands.contains(&name) {
            if let Some(first) = args.first_mut() {
                first.apply_prefix(&namespace::namespace());
            }
        }

        let mut manager = self.manager.lock();
        loop {
            // Initial-connect failures follow the same policy as dispatch
            // failures: reconnect unless fail-fast. Address and exhaustion
            // errors are not retryable and surface as-is.
            let dispatched = match manager.ensure_connected() {
                Ok(handle) => handle.invoke(&name, &args),
                Err(err) => {
                    if self.fail_fast || !matches!(err, ProxyError::Connection(_)) {
                        return Err(err);
                    }
                    manager.reconnect()?;
                    continue;
                }
            };

            match dispatched {
                Ok(value) => return Ok(Reply::Value(value)),
                Err(DriverError::Connection(reason)) => {
                    manager.invalidate();
                    if self.fail_fast {
                        return Err(ProxyError::Connection(reason));
                    }
                    manager.reconnect()?;
                }
                Err(DriverError::Operation(_)) => return Ok(Reply::Rejected),
            }
        }
    }
}
