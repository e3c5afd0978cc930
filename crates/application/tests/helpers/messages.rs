use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsOption};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use splitdns_application::services::{decode_message, encode_message, QueryInspector};
use splitdns_domain::QueryContext;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

pub const CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100));

pub fn query(name: &str, qtype: RecordType) -> Message {
    let mut message = Message::new();
    message
        .set_id(0x1234)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(Name::from_str(name).unwrap(), qtype));
    message
}

pub fn with_client_subnet(mut message: Message, subnet: ClientSubnet) -> Message {
    let mut edns = Edns::new();
    edns.set_max_payload(1232);
    edns.options_mut().insert(EdnsOption::Subnet(subnet));
    message.set_edns(edns);
    message
}

pub fn with_plain_edns(mut message: Message) -> Message {
    let mut edns = Edns::new();
    edns.set_max_payload(1232);
    message.set_edns(edns);
    message
}

/// Encodes and re-inspects `message`, as the listener would.
pub fn inspect(message: &Message) -> (Message, QueryContext) {
    let raw = encode_message(message).unwrap();
    let inspected = QueryInspector::inspect(&raw, CLIENT_IP).unwrap();
    (inspected.message, inspected.context)
}

/// Upstream-style reply: same ID and question, the query's OPT echoed back.
pub fn upstream_reply(query: &Message, ips: &[Ipv4Addr], rcode: ResponseCode) -> Message {
    let mut reply = Message::new();
    reply
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(rcode);
    reply.add_queries(query.queries().iter().cloned());
    let name = query.queries()[0].name().clone();
    for ip in ips {
        reply.add_answer(Record::from_rdata(name.clone(), 300, RData::A(A(*ip))));
    }
    if let Some(edns) = query.extensions() {
        reply.set_edns(edns.clone());
    }
    reply
}

pub fn a_records(message: &Message) -> Vec<Ipv4Addr> {
    message
        .answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .collect()
}

pub fn decode(bytes: &[u8]) -> Message {
    decode_message(bytes).unwrap()
}
