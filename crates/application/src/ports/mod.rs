mod domain_list_source;
mod resolution_events;
mod upstream_transport;

pub use domain_list_source::DomainListSource;
pub use resolution_events::{
    FailedQuery, NoopEventSink, ResolutionEvent, ResolutionEventSink, ResolvedQuery,
};
pub use upstream_transport::{TransportKind, UdpReply, UpstreamTransport};
