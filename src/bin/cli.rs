//! requeue-redis CLI
//!
//! Command-line interface for issuing namespaced commands through the proxy.
//! Useful for poking at a worker deployment's keyspace without hand-prefixing
//! every key.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use requeue_redis::{
    set_namespace, strip_namespace, Arg, ProxyConfig, RedisProxy, Reply, ServerTarget, Value,
};

/// requeue-redis CLI
#[derive(Parser, Debug)]
#[command(name = "requeue-redis-cli")]
#[command(about = "Namespaced Redis commands through the requeue proxy")]
#[command(version)]
struct Args {
    /// Server address: host, host:port, a unix socket path, or a redis://
    /// URI. A comma-separated list selects cluster mode.
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Key namespace (a trailing ':' is appended when missing)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Logical database index to SELECT after connecting
    #[arg(short, long)]
    database: Option<i64>,

    /// Fail immediately on connection loss instead of retrying
    #[arg(long)]
    fail_fast: bool,

    /// Milliseconds between reconnect attempts
    #[arg(long, default_value = "5000")]
    retry_interval_ms: u64,

    /// Reconnect attempts before giving up
    #[arg(long, default_value = "10")]
    max_retries: u32,

    /// Driver read timeout in milliseconds
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key to a value
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete one or more keys
    Del {
        /// The keys to delete
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// List keys matching a pattern, shown without the namespace
    Keys {
        /// Glob-style pattern, namespaced like any key
        #[arg(default_value = "*")]
        pattern: String,
    },

    /// Ping the server
    Ping,

    /// Send a raw command with positional arguments
    Raw {
        /// Command name
        command: String,

        /// Positional arguments
        args: Vec<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    if let Some(ns) = &args.namespace {
        set_namespace(ns.clone());
    }

    let target: ServerTarget = if args.server.contains(',') {
        args.server
            .split(',')
            .map(|addr| addr.trim().to_string())
            .collect::<Vec<_>>()
            .into()
    } else {
        args.server.as_str().into()
    };

    let mut builder = ProxyConfig::builder()
        .target(target)
        .fail_fast(args.fail_fast)
        .retry_interval_ms(args.retry_interval_ms)
        .max_retry_attempts(args.max_retries)
        .read_timeout_ms(args.read_timeout_ms);
    if let Some(database) = args.database {
        builder = builder.database(database);
    }
    let proxy = RedisProxy::new(builder.build());

    match execute(&proxy, args.command) {
        Ok(true) => {}
        Ok(false) => {
            tracing::error!("server rejected the command");
            std::process::exit(2);
        }
        Err(err) => {
            tracing::error!("command failed: {}", err);
            std::process::exit(1);
        }
    }
}

/// Run one subcommand. Returns Ok(false) when the server rejected it.
fn execute(proxy: &RedisProxy, command: Commands) -> requeue_redis::Result<bool> {
    let reply = match command {
        Commands::Get { key } => proxy.invoke("get", vec![key.as_str().into()])?,
        Commands::Set { key, value } => {
            proxy.invoke("set", vec![key.as_str().into(), value.as_str().into()])?
        }
        Commands::Del { keys } => proxy.invoke("del", vec![keys.into()])?,
        Commands::Ping => proxy.invoke("ping", vec![])?,
        Commands::Raw { command, args } => {
            let args = args.into_iter().map(Arg::from).collect();
            proxy.invoke(&command, args)?
        }
        Commands::Keys { pattern } => {
            // The server returns fully-prefixed keys; print the logical names
            // callers actually use.
            let reply = proxy.invoke("keys", vec![pattern.as_str().into()])?;
            match reply {
                Reply::Value(Value::Array(items)) => {
                    for item in items {
                        if let Value::BulkString(raw) = item {
                            println!("{}", strip_namespace(&String::from_utf8_lossy(&raw)));
                        }
                    }
                    return Ok(true);
                }
                other => other,
            }
        }
    };

    match reply {
        Reply::Rejected => Ok(false),
        Reply::Value(value) => {
            println!("{}", format_value(&value));
            Ok(true)
        }
    }
}

/// Render a reply the way redis-cli would, near enough.
fn format_value(value: &Value) -> String {
    match value {
        Value::Nil => "(nil)".to_string(),
        Value::Okay => "OK".to_string(),
        Value::Int(n) => n.to_string(),
        Value::SimpleString(s) => s.clone(),
        Value::BulkString(data) => String::from_utf8_lossy(data).into_owned(),
        Value::Array(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join("\n"),
        other => format!("{other:?}"),
    }
}
