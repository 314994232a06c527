//! Toast notifications
//!
//! [`ToastStore`] keeps the ordered list of transient messages shown to the
//! user. Every toast owns a cancellable expiry timer stored next to it:
//! explicit dismissal aborts the timer, expiry drops it, and dropping the
//! last store handle aborts whatever is still pending.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default time a toast stays on screen
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Toast variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastType {
    /// Informational notification
    #[default]
    Info,
    /// Success notification
    Success,
    /// Error notification
    Error,
}

impl ToastType {
    /// Icon name for this toast type
    pub fn icon(&self) -> &'static str {
        match self {
            ToastType::Info => "info",
            ToastType::Success => "check-circle",
            ToastType::Error => "alert-circle",
        }
    }
}

/// A toast currently in the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    /// Unique identifier
    pub id: String,
    /// Toast variant
    #[serde(rename = "type")]
    pub toast_type: ToastType,
    /// Headline
    pub title: String,
    /// Optional body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ToastMessage {
    /// Whether the toast has body text
    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }
}

/// Request to show a toast; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewToast {
    /// Variant, `Info` when omitted
    pub toast_type: Option<ToastType>,
    /// Headline
    pub title: String,
    /// Optional body text
    pub description: Option<String>,
}

impl NewToast {
    /// Create a toast request with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    /// Create a success toast request
    pub fn success(title: impl Into<String>) -> Self {
        Self::new(title).with_type(ToastType::Success)
    }

    /// Create an error toast request
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(title).with_type(ToastType::Error)
    }

    /// Create an info toast request
    pub fn info(title: impl Into<String>) -> Self {
        Self::new(title).with_type(ToastType::Info)
    }

    /// Set toast type
    pub fn with_type(mut self, toast_type: ToastType) -> Self {
        self.toast_type = Some(toast_type);
        self
    }

    /// Set body text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Toast store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// How long a toast stays before it removes itself
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self { duration: DEFAULT_TOAST_DURATION }
    }
}

impl ToastConfig {
    /// Set the display duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

struct ToastEntry {
    message: ToastMessage,
    timer: Option<JoinHandle<()>>,
}

struct ToastInner {
    config: ToastConfig,
    entries: Mutex<Vec<ToastEntry>>,
    changes: watch::Sender<Vec<ToastMessage>>,
}

impl Drop for ToastInner {
    fn drop(&mut self) {
        for entry in self.entries.get_mut().drain(..) {
            if let Some(timer) = entry.timer {
                timer.abort();
            }
        }
    }
}

/// Toast store
///
/// Cloning is cheap; all clones share the same collection.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<ToastInner>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new(ToastConfig::default())
    }
}

impl ToastStore {
    /// Create an empty toast store
    pub fn new(config: ToastConfig) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(ToastInner { config, entries: Mutex::new(Vec::new()), changes }),
        }
    }

    /// Append a toast and start its expiry timer. Returns the new id.
    ///
    /// Outside a tokio runtime no timer can be started; the toast then stays
    /// until dismissed.
    pub fn add_toast(&self, toast: NewToast) -> String {
        let message = ToastMessage {
            id: uuid::Uuid::new_v4().to_string(),
            toast_type: toast.toast_type.unwrap_or_default(),
            title: toast.title,
            description: toast.description,
        };
        let id = message.id.clone();

        let snapshot = {
            let mut entries = self.inner.entries.lock();
            // Timer is attached while the entry is already visible to `expire`.
            let timer = self.schedule_expiry(&id);
            entries.push(ToastEntry { message, timer });
            snapshot_of(&entries)
        };

        tracing::debug!(toast_id = %id, "toast added");
        self.inner.changes.send_replace(snapshot);
        id
    }

    /// Dismiss a toast and cancel its timer. Unknown ids are ignored.
    ///
    /// Returns whether a toast was removed.
    pub fn remove_toast(&self, id: &str) -> bool {
        match self.take(id) {
            Some(entry) => {
                if let Some(timer) = entry.timer {
                    timer.abort();
                }
                tracing::debug!(toast_id = %id, "toast dismissed");
                true
            }
            None => false,
        }
    }

    /// Remove every toast, cancelling all timers
    pub fn clear(&self) {
        let drained: Vec<ToastEntry> = self.inner.entries.lock().drain(..).collect();
        for timer in drained.into_iter().filter_map(|e| e.timer) {
            timer.abort();
        }
        self.inner.changes.send_replace(Vec::new());
    }

    /// Snapshot of the active toasts, oldest first
    pub fn toasts(&self) -> Vec<ToastMessage> {
        snapshot_of(&self.inner.entries.lock())
    }

    /// Look up a toast by id
    pub fn get(&self, id: &str) -> Option<ToastMessage> {
        self.inner
            .entries
            .lock()
            .iter()
            .find(|e| e.message.id == id)
            .map(|e| e.message.clone())
    }

    /// Number of active toasts
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Check if there are no active toasts
    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    /// Subscribe to collection changes
    pub fn subscribe(&self) -> watch::Receiver<Vec<ToastMessage>> {
        self.inner.changes.subscribe()
    }

    /// Configured display duration
    pub fn duration(&self) -> Duration {
        self.inner.config.duration
    }

    fn schedule_expiry(&self, id: &str) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!(toast_id = %id, "no async runtime; toast will not expire on its own");
                return None;
            }
        };

        let weak: Weak<ToastInner> = Arc::downgrade(&self.inner);
        let duration = self.inner.config.duration;
        let id = id.to_string();

        Some(runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                ToastStore { inner }.expire(&id);
            }
        }))
    }

    /// Timer-driven removal. The finishing timer's own handle is dropped,
    /// not aborted.
    fn expire(&self, id: &str) {
        if self.take(id).is_some() {
            tracing::debug!(toast_id = %id, "toast expired");
        }
    }

    #[cfg(test)]
    fn timer_handle(&self, id: &str) -> Option<tokio::task::AbortHandle> {
        self.inner
            .entries
            .lock()
            .iter()
            .find(|e| e.message.id == id)
            .and_then(|e| e.timer.as_ref().map(JoinHandle::abort_handle))
    }

    fn take(&self, id: &str) -> Option<ToastEntry> {
        let (entry, snapshot) = {
            let mut entries = self.inner.entries.lock();
            let pos = entries.iter().position(|e| e.message.id == id)?;
            let entry = entries.remove(pos);
            (entry, snapshot_of(&entries))
        };
        self.inner.changes.send_replace(snapshot);
        Some(entry)
    }
}

fn snapshot_of(entries: &[ToastEntry]) -> Vec<ToastMessage> {
    entries.iter().map(|e| e.message.clone()).collect()
}
