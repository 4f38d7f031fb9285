use tokio::sync::broadcast;

use crate::store::Settings;

/// Events pushed from the core to whatever UI collaborator is attached.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Activity-log line; transient errors surface only here.
    Log { timestamp_ms: u64, message: String },
    /// Settings changed through the command surface.
    SettingsChanged(Settings),
}

/// Broadcast fan-out for [`CoreEvent`]s. Cheap to clone; emitting with no
/// subscribers attached is fine.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: CoreEvent) {
        let _ = self.tx.send(event);
    }

    /// Append a line to the activity log stream.
    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.emit(CoreEvent::Log {
            timestamp_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
            message,
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
