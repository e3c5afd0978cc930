pub mod dns;
pub mod policy;

pub use dns::{DnsReply, HandleDnsQueryUseCase};
pub use policy::LoadDomainPolicyUseCase;
