use splitdns_application::ports::{ResolutionEvent, ResolutionEventSink};
use tokio::sync::mpsc;

/// Forwards resolution events to a background consumer without blocking the
/// request path.
#[derive(Clone)]
pub struct ResolutionEventEmitter {
    sender: Option<mpsc::UnboundedSender<ResolutionEvent>>,
}

impl ResolutionEventEmitter {
    pub fn new_disabled() -> Self {
        Self { sender: None }
    }

    pub fn new_enabled() -> (Self, mpsc::UnboundedReceiver<ResolutionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let emitter = Self { sender: Some(tx) };
        (emitter, rx)
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}

impl ResolutionEventSink for ResolutionEventEmitter {
    fn emit(&self, event: ResolutionEvent) {
        if let Some(ref tx) = self.sender {
            let _ = tx.send(event);
        }
    }
}

impl Default for ResolutionEventEmitter {
    fn default() -> Self {
        Self::new_disabled()
    }
}

impl std::fmt::Debug for ResolutionEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEventEmitter")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
