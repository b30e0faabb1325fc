//! Shared test support: a scripted driver whose outcomes are planned up
//! front, so connection-failure scenarios run without a live server, plus a
//! lock serializing tests that touch the process-wide namespace.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use requeue_redis::{namespace, set_namespace, Arg, Connector, Driver, DriverError, DriverResult, ServerEndpoint, Value};

// =============================================================================
// Scripted Driver
// =============================================================================

/// Planned outcome for one `Connector::open` call.
#[derive(Debug)]
pub enum OpenPlan {
    /// The connect attempt fails.
    Fail(&'static str),
    /// The connect attempt succeeds; the handle answers per this script.
    Handle(Vec<InvokePlan>),
}

/// Planned outcome for one `Driver::invoke` call.
#[derive(Debug)]
pub enum InvokePlan {
    Ok(Value),
    ConnectionLost(&'static str),
    Rejected(&'static str),
}

/// Connect-time handshake step observed by the scripted driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    Auth(Option<String>, String),
    Select(i64),
}

/// Everything the scripted driver observed.
#[derive(Debug, Default)]
pub struct Recorded {
    pub opens: u32,
    pub closes: u32,
    pub endpoints: Vec<String>,
    pub read_timeouts: Vec<Duration>,
    pub handshake: Vec<Handshake>,
    pub forwarded: Vec<(String, Vec<Arg>)>,
}

/// Connector whose open/invoke outcomes follow a fixed script.
///
/// Clones share the script and the recording, so tests keep a clone around
/// for assertions after handing one to the proxy.
#[derive(Clone)]
pub struct ScriptedConnector {
    plan: Arc<Mutex<VecDeque<OpenPlan>>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl ScriptedConnector {
    pub fn new(plan: Vec<OpenPlan>) -> Self {
        ScriptedConnector {
            plan: Arc::new(Mutex::new(plan.into())),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn opens(&self) -> u32 {
        self.recorded().opens
    }

    pub fn closes(&self) -> u32 {
        self.recorded().closes
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.recorded().endpoints.clone()
    }

    pub fn read_timeouts(&self) -> Vec<Duration> {
        self.recorded().read_timeouts.clone()
    }

    pub fn handshake(&self) -> Vec<Handshake> {
        self.recorded().handshake.clone()
    }

    pub fn forwarded(&self) -> Vec<(String, Vec<Arg>)> {
        self.recorded().forwarded.clone()
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connector for ScriptedConnector {
    type Handle = ScriptedHandle;

    fn open(&self, endpoint: &ServerEndpoint, read_timeout: Duration) -> DriverResult<ScriptedHandle> {
        {
            let mut recorded = self.recorded();
            recorded.opens += 1;
            recorded.endpoints.push(endpoint.to_string());
            recorded.read_timeouts.push(read_timeout);
        }
        let next = self
            .plan
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            None => Err(DriverError::Connection("open script exhausted".to_string())),
            Some(OpenPlan::Fail(reason)) => Err(DriverError::Connection(reason.to_string())),
            Some(OpenPlan::Handle(script)) => Ok(ScriptedHandle {
                script: script.into(),
                recorded: Arc::clone(&self.recorded),
            }),
        }
    }
}

/// Handle handed out by [`ScriptedConnector`].
#[derive(Debug)]
pub struct ScriptedHandle {
    script: VecDeque<InvokePlan>,
    recorded: Arc<Mutex<Recorded>>,
}

impl Driver for ScriptedHandle {
    fn invoke(&mut self, command: &str, args: &[Arg]) -> DriverResult<Value> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .forwarded
            .push((command.to_string(), args.to_vec()));
        match self.script.pop_front() {
            None => Err(DriverError::Operation("invoke script exhausted".to_string())),
            Some(InvokePlan::Ok(value)) => Ok(value),
            Some(InvokePlan::ConnectionLost(reason)) => {
                Err(DriverError::Connection(reason.to_string()))
            }
            Some(InvokePlan::Rejected(reason)) => Err(DriverError::Operation(reason.to_string())),
        }
    }

    fn auth(&mut self, username: Option<&str>, password: &str) -> DriverResult<()> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handshake
            .push(Handshake::Auth(
                username.map(str::to_string),
                password.to_string(),
            ));
        Ok(())
    }

    fn select(&mut self, database: i64) -> DriverResult<()> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handshake
            .push(Handshake::Select(database));
        Ok(())
    }

    fn close(&mut self) {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closes += 1;
    }
}

// =============================================================================
// Namespace Serialization
// =============================================================================

static NAMESPACE_GUARD: Mutex<()> = Mutex::new(());

/// Serialize access to the process-wide namespace across tests.
pub fn lock_namespace() -> MutexGuard<'static, ()> {
    NAMESPACE_GUARD.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `body` with the namespace pinned to `ns`, restoring the default after.
pub fn with_namespace<T>(ns: &str, body: impl FnOnce() -> T) -> T {
    let _guard = lock_namespace();
    set_namespace(ns);
    let result = body();
    namespace::reset_namespace();
    result
}
