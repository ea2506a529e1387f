//! Boundary traits for the profile, permission, navigation and notification
//! collaborators, plus the in-process implementations the CLI uses.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::info;

/// Supplies the signed-in flag; nothing else about the profile is read.
pub trait ProfileSource: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Opaque async predicate: may the current user perform `action` on `resource`?
pub trait PermissionCheck: Send + Sync {
    fn check(&self, action: &str, resource: &str) -> impl Future<Output = bool> + Send;
}

/// Visible location state. `merge_query` keeps keys it is not given.
pub trait Navigator: Send + Sync {
    fn merge_query(&self, params: &[(&str, String)]);
}

/// Fire-and-forget transient message.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, dismiss_label: &str, duration_ms: u64);
}

#[derive(Debug, Default)]
pub struct AuthState(AtomicBool);

impl AuthState {
    pub fn new(authenticated: bool) -> Self {
        Self(AtomicBool::new(authenticated))
    }

    pub fn set(&self, authenticated: bool) {
        self.0.store(authenticated, Ordering::SeqCst);
    }

    pub fn toggle(&self) {
        self.0.fetch_xor(true, Ordering::SeqCst);
    }
}

impl ProfileSource for AuthState {
    fn is_authenticated(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// In-memory query string with merge semantics.
#[derive(Debug, Default)]
pub struct QueryState {
    params: Mutex<BTreeMap<String, String>>,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let params = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            params: Mutex::new(params),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.params.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for QueryState {
    fn merge_query(&self, params: &[(&str, String)]) {
        let mut current = self.lock();
        for (key, value) in params {
            current.insert((*key).to_string(), value.clone());
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, dismiss_label: &str, duration_ms: u64) {
        info!(%message, %dismiss_label, duration_ms, "notification");
    }
}
