use crate::policy::normalize_domain;
use crate::record_type::RecordType;
use crate::subnet_hint::SubnetHint;
use std::net::IpAddr;
use std::sync::Arc;

/// Minimum UDP payload every DNS client accepts.
pub const MIN_UDP_PAYLOAD: u16 = 512;

/// Header flags of the inbound query that must survive forwarding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFlags {
    pub recursion_desired: bool,
    pub checking_disabled: bool,
    pub dnssec_ok: bool,
}

/// Per-request state, created on receipt and dropped after the reply is sent.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub id: u16,
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub record_class: u16,
    pub flags: QueryFlags,
    pub client_ip: IpAddr,
    pub client_subnet: Option<SubnetHint>,
    pub has_edns: bool,
    pub udp_payload: u16,
}

impl QueryContext {
    pub fn new(id: u16, name: &str, record_type: RecordType, client_ip: IpAddr) -> Self {
        Self {
            id,
            name: Arc::from(normalize_domain(name).as_ref()),
            record_type,
            record_class: 1,
            flags: QueryFlags {
                recursion_desired: true,
                ..QueryFlags::default()
            },
            client_ip: client_ip.to_canonical(),
            client_subnet: None,
            has_edns: false,
            udp_payload: MIN_UDP_PAYLOAD,
        }
    }

    pub fn with_flags(mut self, flags: QueryFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_client_subnet(mut self, subnet: Option<SubnetHint>) -> Self {
        self.client_subnet = subnet;
        self
    }

    /// Records the EDNS payload size the client advertised, floored at 512.
    pub fn with_edns(mut self, udp_payload: u16) -> Self {
        self.has_edns = true;
        self.udp_payload = udp_payload.max(MIN_UDP_PAYLOAD);
        self
    }

    pub fn has_client_subnet(&self) -> bool {
        self.client_subnet.is_some()
    }
}
