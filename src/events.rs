use tokio::sync::broadcast;

/// Capacity of the shell event channel. Slow subscribers lag rather than block the core.
const EVENT_CAPACITY: usize = 64;

/// Why the core is asking the shell to reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The server answered 401: in-memory state can no longer be trusted.
    SessionExpired,
    /// Removing a gated route failed halfway; the route table is in an unknown state.
    RouterResetFailed,
}

/// ShellEvent
///
/// Side effects the core cannot perform itself. The host shell subscribes and decides
/// how to render a notification or perform a full reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Notify { message: String },
    Reload { reason: ReloadReason },
}

/// ShellEvents
///
/// Cloneable publisher handle. Publishing with no subscriber is not an error:
/// a headless client simply has nobody to notify.
#[derive(Clone)]
pub struct ShellEvents {
    sender: broadcast::Sender<ShellEvent>,
}

impl Default for ShellEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.sender.subscribe()
    }

    pub fn notify(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "Notifying shell");
        let _ = self.sender.send(ShellEvent::Notify { message });
    }

    pub fn request_reload(&self, reason: ReloadReason) {
        tracing::warn!(?reason, "Requesting full reload from shell");
        let _ = self.sender.send(ShellEvent::Reload { reason });
    }
}
