use splitdns_application::ports::{FailedQuery, ResolutionEvent, ResolvedQuery};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Consumer of [`ResolutionEvent`]s: failures are logged as errors, successful
/// resolutions at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHook {
    verbose: bool,
}

impl ErrorHook {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn start(self, mut rx: mpsc::UnboundedReceiver<ResolutionEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                self.handle(&event);
            }
            info!("Resolution event channel closed, error hook stopped");
        })
    }

    pub fn handle(&self, event: &ResolutionEvent) {
        match event {
            ResolutionEvent::Resolved(resolved) => self.on_resolved(resolved),
            ResolutionEvent::Failed(failed) => self.on_failed(failed),
        }
    }

    fn on_resolved(&self, q: &ResolvedQuery) {
        debug!(
            domain = %q.name,
            record_type = %q.record_type,
            classification = %q.classification,
            group = %q.group,
            server = %q.server,
            transport = %q.transport,
            answers = q.answers,
            truncated = q.truncated,
            elapsed_ms = q.elapsed.as_millis() as u64,
            "Query resolved"
        );
    }

    fn on_failed(&self, q: &FailedQuery) {
        if self.verbose {
            error!(
                domain = %q.name,
                record_type = %q.record_type,
                client = %q.client_ip,
                error = ?q.error,
                "Query failed"
            );
        } else {
            error!(domain = %q.name, error = %q.error, "Query failed");
        }
    }
}
