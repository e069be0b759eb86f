use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use invoicerelay_core::{Envelope, RelayError};

/// What a listener returns. An `Err` is logged for that listener only.
pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Handler = Arc<dyn Fn(&Envelope) -> ListenerResult + Send + Sync>;

struct Entry {
    id: u64,
    live: Arc<AtomicBool>,
    handler: Handler,
}

/// Listener registry: `kind -> [handler...]` in registration order.
///
/// Lives as long as its channel client, across every reconnect.
#[derive(Default)]
pub struct ListenerRegistry {
    by_kind: DashMap<String, Vec<Entry>>,
    seq: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            by_kind: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn insert<F>(self: &Arc<Self>, kind: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Envelope) -> ListenerResult + Send + Sync + 'static,
    {
        let kind = kind.into();
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let live = Arc::new(AtomicBool::new(true));

        self.by_kind.entry(kind.clone()).or_default().push(Entry {
            id,
            live: Arc::clone(&live),
            handler: Arc::new(handler),
        });

        Subscription {
            registry: Arc::downgrade(self),
            kind,
            id,
            live,
        }
    }

    fn remove(&self, kind: &str, id: u64) {
        let now_empty = match self.by_kind.get_mut(kind) {
            Some(mut entries) => {
                entries.retain(|e| e.id != id);
                entries.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.by_kind.remove_if(kind, |_, entries| entries.is_empty());
        }
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.by_kind.get(kind).map(|e| e.len()).unwrap_or(0)
    }

    pub fn kinds(&self) -> Vec<String> {
        self.by_kind.iter().map(|e| e.key().clone()).collect()
    }

    /// Invoke every live listener for `env.kind`, in order.
    ///
    /// The handler list is snapshotted first, so listeners may register or
    /// unsubscribe from inside a callback. Returns how many listeners ran
    /// without error.
    pub fn dispatch(&self, env: &Envelope) -> usize {
        let snapshot: Vec<(Arc<AtomicBool>, Handler)> = match self.by_kind.get(&env.kind) {
            Some(entries) => entries
                .iter()
                .map(|e| (Arc::clone(&e.live), Arc::clone(&e.handler)))
                .collect(),
            None => return 0,
        };

        let mut ok = 0;
        for (live, handler) in snapshot {
            if !live.load(Ordering::Acquire) {
                continue;
            }
            let reason = match catch_unwind(AssertUnwindSafe(|| handler(env))) {
                Ok(Ok(())) => {
                    ok += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("panicked: {}", panic_message(panic.as_ref())),
            };
            let err = RelayError::ListenerFailure {
                kind: env.kind.clone(),
                reason,
            };
            tracing::error!(code = err.code().as_str(), error = %err, "listener failed");
        }
        ok
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Handle returned by a registration. `unsubscribe` removes exactly that one
/// listener; calling it again does nothing. Dropping the handle does not
/// unsubscribe.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    kind: String,
    id: u64,
    live: Arc<AtomicBool>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if !self.live.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.kind, self.id);
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_active(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}
