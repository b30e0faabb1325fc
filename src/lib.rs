//! # requeue-redis
//!
//! A resilient command proxy between application code and Redis, with:
//! - Transparent key namespacing so applications share one server without
//!   key collisions
//! - Bounded, fixed-interval reconnection when the link drops mid-operation
//! - Standalone, unix-socket, URI, and cluster connection targets
//! - A sentinel reply for server-side rejections, keeping best-effort
//!   call sites free of error plumbing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ invoke(command, args)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Proxy                                │
//! │     (namespace rewrite: KeyCommandSet + process prefix)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  ConnectionManager                           │
//! │   (lazy connect, AUTH/SELECT handshake, bounded reconnect)   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Standalone  │          │   Cluster   │
//!   │ (TCP/Unix)  │          │   Driver    │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use requeue_redis::{set_namespace, ProxyConfig, RedisProxy};
//!
//! # fn main() -> requeue_redis::Result<()> {
//! set_namespace("myapp");
//!
//! let proxy = RedisProxy::new(ProxyConfig::builder().target("127.0.0.1:6379").build());
//! let reply = proxy.invoke("set", vec!["greeting".into(), "hello".into()])?;
//! println!("{reply:?}");
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod namespace;
pub mod endpoint;
pub mod command;
pub mod driver;
pub mod manager;
pub mod proxy;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ProxyError, Result};
pub use config::{ProxyConfig, ProxyConfigBuilder};

pub use command::{Arg, KeyCommandSet};
pub use driver::{Connector, Driver, DriverError, DriverResult, RedisConnector, RedisHandle};
pub use endpoint::{ServerAddr, ServerEndpoint, ServerTarget};
pub use manager::{ConnState, ConnectionManager};
pub use namespace::{namespace, set_namespace, strip_namespace, DEFAULT_NAMESPACE};
pub use proxy::{Proxy, RedisProxy, Reply};

/// Reply payload type, re-exported from the underlying driver crate.
pub use redis::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of requeue-redis
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
