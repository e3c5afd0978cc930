use super::upstream_transport::TransportKind;
use splitdns_domain::{Classification, DomainError, RecordType};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub classification: Classification,
    pub group: Arc<str>,
    pub server: SocketAddr,
    pub transport: TransportKind,
    pub answers: usize,
    pub truncated: bool,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct FailedQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub client_ip: IpAddr,
    pub error: DomainError,
}

#[derive(Debug, Clone)]
pub enum ResolutionEvent {
    Resolved(ResolvedQuery),
    Failed(FailedQuery),
}

/// Error-reporting channel the listener subscribes to.
///
/// `emit` must not block; it runs on the request path.
pub trait ResolutionEventSink: Send + Sync {
    fn emit(&self, event: ResolutionEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl ResolutionEventSink for NoopEventSink {
    fn emit(&self, _event: ResolutionEvent) {}
}
