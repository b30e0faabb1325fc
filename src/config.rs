//! Configuration for the proxy
//!
//! Centralized configuration with sensible defaults. The key namespace is
//! deliberately absent: it is process-wide state shared by every proxy
//! instance (see [`crate::namespace`]).

use crate::command::KeyCommandSet;
use crate::endpoint::ServerTarget;

/// Configuration for one proxy instance
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Server to connect to; a list of addresses selects cluster mode
    pub target: ServerTarget,

    /// Logical database index selected after every connect
    pub database: Option<i64>,

    /// Read timeout applied to the driver at connect time (milliseconds)
    pub read_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Retry Configuration
    // -------------------------------------------------------------------------
    /// Surface connection failures immediately instead of reconnecting
    pub fail_fast: bool,

    /// Fixed pause between reconnect attempts (milliseconds)
    pub retry_interval_ms: u64,

    /// Reconnect attempts allowed per reconnect sequence
    pub max_retry_attempts: u32,

    // -------------------------------------------------------------------------
    // Namespace Rewriting
    // -------------------------------------------------------------------------
    /// Commands whose first argument receives the namespace prefix
    pub key_commands: KeyCommandSet,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            target: ServerTarget::Single("127.0.0.1:6379".to_string()),
            database: None,
            read_timeout_ms: 5000,
            fail_fast: false,
            retry_interval_ms: 5000,
            max_retry_attempts: 10,
            key_commands: KeyCommandSet::default(),
        }
    }
}

impl ProxyConfig {
    /// Create a new config builder
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::default()
    }
}

/// Builder for ProxyConfig
#[derive(Default)]
pub struct ProxyConfigBuilder {
    config: ProxyConfig,
}

impl ProxyConfigBuilder {
    /// Set the server target (one address, or a list for cluster mode)
    pub fn target(mut self, target: impl Into<ServerTarget>) -> Self {
        self.config.target = target.into();
        self
    }

    /// Set the logical database index to SELECT after connecting
    pub fn database(mut self, database: i64) -> Self {
        self.config.database = Some(database);
        self
    }

    /// Set the driver read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Fail immediately on connection loss instead of retrying
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Set the pause between reconnect attempts (in milliseconds)
    pub fn retry_interval_ms(mut self, ms: u64) -> Self {
        self.config.retry_interval_ms = ms;
        self
    }

    /// Set the number of reconnect attempts per reconnect sequence
    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.config.max_retry_attempts = attempts;
        self
    }

    /// Register one extra key-bearing command on top of the default set
    pub fn key_command(mut self, command: impl Into<String>) -> Self {
        self.config.key_commands.register(command);
        self
    }

    /// Replace the key-bearing command set wholesale
    pub fn key_commands(mut self, commands: KeyCommandSet) -> Self {
        self.config.key_commands = commands;
        self
    }

    pub fn build(self) -> ProxyConfig {
        self.config
    }
}
