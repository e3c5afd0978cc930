pub mod events;
pub mod server;
pub mod transport;

pub use events::{ErrorHook, ResolutionEventEmitter};
pub use server::DnsServerHandler;
pub use transport::NetworkUpstreamTransport;
