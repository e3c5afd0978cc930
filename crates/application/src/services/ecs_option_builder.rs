use hickory_proto::op::{Edns, Message};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsCode, EdnsOption};
use splitdns_domain::SubnetHint;
use std::net::IpAddr;

/// EDNS payload size advertised on queries the resolver adds an OPT record to.
pub const UPSTREAM_EDNS_PAYLOAD: u16 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsOrigin {
    /// Carried by the inbound query; forwarded untouched.
    Client,
    /// Fixed subnet configured on the upstream group.
    GroupOverride,
    /// Full address of the requesting client.
    ClientAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcsOption {
    pub subnet: ClientSubnet,
    pub origin: EcsOrigin,
}

pub struct EcsOptionBuilder;

impl EcsOptionBuilder {
    /// A client-supplied subnet always wins; otherwise the group override,
    /// otherwise the client's own address at full prefix length.
    pub fn build(
        existing: Option<&ClientSubnet>,
        client_ip: IpAddr,
        group_override: Option<&SubnetHint>,
    ) -> EcsOption {
        if let Some(subnet) = existing {
            return EcsOption {
                subnet: subnet.clone(),
                origin: EcsOrigin::Client,
            };
        }
        match group_override {
            Some(hint) => EcsOption {
                subnet: to_client_subnet(hint),
                origin: EcsOrigin::GroupOverride,
            },
            None => EcsOption {
                subnet: to_client_subnet(&SubnetHint::for_client(client_ip)),
                origin: EcsOrigin::ClientAddress,
            },
        }
    }

    /// Attaches `option` to `message` unless it came from the client, in
    /// which case the message already carries it. A client-advertised
    /// payload above [`UPSTREAM_EDNS_PAYLOAD`] is lowered to it.
    pub fn apply(message: &mut Message, option: &EcsOption) {
        if let Some(edns) = message.extensions_mut().as_mut() {
            if edns.max_payload() > UPSTREAM_EDNS_PAYLOAD {
                edns.set_max_payload(UPSTREAM_EDNS_PAYLOAD);
            }
        }
        if option.origin == EcsOrigin::Client {
            return;
        }
        let edns = message.extensions_mut().get_or_insert_with(|| {
            let mut edns = Edns::new();
            edns.set_max_payload(UPSTREAM_EDNS_PAYLOAD);
            edns
        });
        edns.options_mut()
            .insert(EdnsOption::Subnet(option.subnet.clone()));
    }
}

pub fn find_client_subnet(message: &Message) -> Option<&ClientSubnet> {
    match message.extensions().as_ref()?.option(EdnsCode::Subnet)? {
        EdnsOption::Subnet(subnet) => Some(subnet),
        _ => None,
    }
}

pub fn to_client_subnet(hint: &SubnetHint) -> ClientSubnet {
    ClientSubnet::new(hint.addr(), hint.source_prefix(), 0)
}

pub fn to_subnet_hint(subnet: &ClientSubnet) -> Option<SubnetHint> {
    SubnetHint::new(subnet.addr(), subnet.source_prefix()).ok()
}
