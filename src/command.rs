//! Command arguments and the key-bearing command table
//!
//! The proxy forwards commands by name with positional arguments. For the
//! commands listed in [`KeyCommandSet`], the first argument names a key (or a
//! sequence of keys) and is rewritten with the process namespace before
//! dispatch. Everything else passes through untouched.

use std::collections::HashSet;

// =============================================================================
// Arguments
// =============================================================================

/// A positional command argument.
///
/// Two shapes exist because some commands accept a batch in first position
/// that expands to one wire argument per element (`DEL k1 k2`, `WATCH k1 k2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// One scalar argument: a key, a value, a count.
    Single(Vec<u8>),
    /// A sequence argument; each element becomes one wire argument.
    Many(Vec<Vec<u8>>),
}

impl Arg {
    /// Prefix the argument in place: the scalar itself, or every element of
    /// a sequence.
    pub fn apply_prefix(&mut self, prefix: &str) {
        match self {
            Arg::Single(key) => prepend(prefix, key),
            Arg::Many(keys) => {
                for key in keys {
                    prepend(prefix, key);
                }
            }
        }
    }
}

fn prepend(prefix: &str, key: &mut Vec<u8>) {
    let mut out = Vec::with_capacity(prefix.len() + key.len());
    out.extend_from_slice(prefix.as_bytes());
    out.append(key);
    *key = out;
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Single(value.as_bytes().to_vec())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Single(value.into_bytes())
    }
}

impl From<&[u8]> for Arg {
    fn from(value: &[u8]) -> Self {
        Arg::Single(value.to_vec())
    }
}

impl From<Vec<u8>> for Arg {
    fn from(value: Vec<u8>) -> Self {
        Arg::Single(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Single(value.to_string().into_bytes())
    }
}

impl From<u64> for Arg {
    fn from(value: u64) -> Self {
        Arg::Single(value.to_string().into_bytes())
    }
}

impl From<Vec<&str>> for Arg {
    fn from(values: Vec<&str>) -> Self {
        Arg::Many(values.into_iter().map(|v| v.as_bytes().to_vec()).collect())
    }
}

impl From<Vec<String>> for Arg {
    fn from(values: Vec<String>) -> Self {
        Arg::Many(values.into_iter().map(String::into_bytes).collect())
    }
}

// =============================================================================
// Key-Bearing Commands
// =============================================================================

/// Commands whose first argument is a key, as shipped by default.
///
/// Not covered, on purpose: commands that carry keys in other positions or
/// spread them across several arguments (sinterstore, sunion, sunionstore,
/// sdiff, sdiffstore, sinter, smove, rename, renamenx, rpoplpush, mget,
/// mset, msetnx). Rewriting only their first argument would corrupt the
/// remaining keys.
const DEFAULT_KEY_COMMANDS: &[&str] = &[
    "exists",
    "del",
    "type",
    "keys",
    "expire",
    "ttl",
    "move",
    "set",
    "setex",
    "get",
    "getset",
    "setnx",
    "incr",
    "incrby",
    "decr",
    "decrby",
    "rpush",
    "lpush",
    "llen",
    "lrange",
    "ltrim",
    "lindex",
    "lset",
    "lrem",
    "lpop",
    "blpop",
    "rpop",
    "sadd",
    "srem",
    "spop",
    "scard",
    "sismember",
    "smembers",
    "srandmember",
    "zadd",
    "zrem",
    "zrange",
    "zrevrange",
    "zrangebyscore",
    "zcard",
    "zscore",
    "zremrangebyscore",
    "sort",
    "watch",
    "ping",
];

/// The set of command names whose first argument receives the namespace
/// prefix.
///
/// Stored lowercase; lookups are case-insensitive. The default population
/// covers the commands the proxy has always rewritten; deployments using
/// further key-in-first-position commands register them with
/// [`KeyCommandSet::register`].
#[derive(Debug, Clone)]
pub struct KeyCommandSet {
    commands: HashSet<String>,
}

impl KeyCommandSet {
    /// An empty set; no command gets rewritten.
    pub fn empty() -> Self {
        KeyCommandSet {
            commands: HashSet::new(),
        }
    }

    /// Whether `command` is key-bearing. Case-insensitive.
    pub fn contains(&self, command: &str) -> bool {
        // Skip the lowercase allocation on the hot path; callers almost
        // always pass lowercase names.
        if command.bytes().any(|b| b.is_ascii_uppercase()) {
            self.commands.contains(&command.to_ascii_lowercase())
        } else {
            self.commands.contains(command)
        }
    }

    /// Add a command name to the set.
    pub fn register(&mut self, command: impl Into<String>) {
        self.commands.insert(command.into().to_ascii_lowercase());
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for KeyCommandSet {
    fn default() -> Self {
        KeyCommandSet {
            commands: DEFAULT_KEY_COMMANDS.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}
