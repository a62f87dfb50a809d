//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex as StdMutex, RwLock};

use tokio::sync::{Mutex, MutexGuard};

use crate::env::EnvSource;
use crate::error::LegacyError;
use crate::legacy::{RpcCall, RpcTransport, TransportFuture};

/// In-memory [`EnvSource`] whose variables can change between calls.
#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: Arc<RwLock<HashMap<String, String>>>,
}

impl MapEnv {
    /// Creates an environment with no variables set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment seeded with `pairs`.
    #[must_use]
    pub fn with_vars(pairs: &[(&str, &str)]) -> Self {
        let env = Self::new();
        for (key, value) in pairs {
            env.set(key, value);
        }
        env
    }

    /// Sets `key` to `value`.
    pub fn set(&self, key: &str, value: &str) {
        if let Ok(mut vars) = self.vars.write() {
            vars.insert(key.to_owned(), value.to_owned());
        }
    }

    /// Unsets `key`.
    pub fn remove(&self, key: &str) {
        if let Ok(mut vars) = self.vars.write() {
            vars.remove(key);
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.read().ok().and_then(|vars| vars.get(key).cloned())
    }
}

/// Records a single call made through [`ScriptedTransport`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedCall {
    /// Service the call targeted.
    pub service: String,
    /// Method the call targeted.
    pub method: String,
    /// Encoded request message.
    pub request: Vec<u8>,
    /// Ticket supplied by the caller, if any.
    pub api_ticket: Option<String>,
}

/// Scripted [`RpcTransport`] that returns pre-seeded replies in FIFO order.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    replies: Arc<StdMutex<VecDeque<Result<Vec<u8>, LegacyError>>>>,
    calls: Arc<StdMutex<Vec<RecordedCall>>>,
}

impl ScriptedTransport {
    /// Creates a transport with no queued replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an encoded response message.
    pub fn push_response(&self, message: &impl prost::Message) {
        self.push(Ok(message.encode_to_vec()));
    }

    /// Queues a failure.
    pub fn push_error(&self, error: LegacyError) {
        self.push(Err(error));
    }

    fn push(&self, reply: Result<Vec<u8>, LegacyError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Returns a snapshot of every call recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Decodes the request of the most recent call as `M`.
    ///
    /// Returns `None` when no call was made or the bytes do not decode.
    #[must_use]
    pub fn last_request<M: prost::Message + Default>(&self) -> Option<M> {
        let calls = self.calls();
        let last = calls.last()?;
        M::decode(last.request.as_slice()).ok()
    }
}

impl RpcTransport for ScriptedTransport {
    fn call<'a>(&'a self, call: RpcCall<'a>) -> TransportFuture<'a> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                service: call.service.to_owned(),
                method: call.method.to_owned(),
                request: call.request,
                api_ticket: call.ctx.api_ticket().map(str::to_owned),
            });
        }
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| {
                Err(LegacyError::Transport(String::from(
                    "no scripted response available",
                )))
            });
        Box::pin(async move { reply })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets `set` and unsets `unset` while holding a global mutex.
    pub async fn apply(set: &[(&str, &str)], unset: &[&str]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                set.iter()
                    .map(|(key, _)| *key)
                    .chain(unset.iter().copied())
                    .all(|key| seen.insert(key))
            },
            "duplicate environment variable keys passed to EnvGuard::apply"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(set.len() + unset.len());
        for (key, value) in set {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
        }
        for key in unset {
            previous.push(((*key).to_owned(), env::var_os(key)));
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::remove_var(key) };
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
