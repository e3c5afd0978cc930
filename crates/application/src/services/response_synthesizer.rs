use super::ecs_option_builder::{find_client_subnet, UPSTREAM_EDNS_PAYLOAD};
use super::upstream_group_resolver::UpstreamAnswer;
use hickory_proto::op::{Edns, Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::opt::EdnsCode;
use splitdns_domain::QueryContext;

/// Builds the message sent back to the original client.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSynthesizer {
    normalize_rcode: bool,
}

impl ResponseSynthesizer {
    pub fn new(normalize_rcode: bool) -> Self {
        Self { normalize_rcode }
    }

    /// Turns an upstream reply into the client's response: original ID and
    /// question, RD copied, RA set, and the resolver's own subnet hint never
    /// leaked back to a client that did not send one.
    pub fn answer(&self, request: &Message, ctx: &QueryContext, upstream: &UpstreamAnswer) -> Message {
        let mut response = upstream.message.clone();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(true);

        response.take_queries();
        response.add_queries(request.queries().iter().cloned());

        if self.normalize_rcode {
            response.set_response_code(ResponseCode::NoError);
        }

        // Same test the engine uses to decide the client's subnet is passed through.
        if find_client_subnet(request).is_none() {
            if !ctx.has_edns {
                *response.extensions_mut() = None;
            } else if let Some(edns) = response.extensions_mut().as_mut() {
                edns.options_mut().remove(EdnsCode::Subnet);
            }
        }

        response
    }

    /// Header-only reply carrying `rcode`, echoing the request's ID and question.
    pub fn reject(request: &Message, rcode: ResponseCode) -> Message {
        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(true)
            .set_response_code(rcode);
        response.add_queries(request.queries().iter().cloned());

        if request.extensions().is_some() {
            let mut edns = Edns::new();
            edns.set_max_payload(UPSTREAM_EDNS_PAYLOAD);
            response.set_edns(edns);
        }

        response
    }

    /// Reply for a message whose body could not be parsed: only the ID survives.
    pub fn reject_unparsable(id: u16) -> Message {
        let mut response = Message::new();
        response
            .set_id(id)
            .set_message_type(MessageType::Response)
            .set_recursion_available(true)
            .set_response_code(ResponseCode::FormErr);
        response
    }
}

impl Default for ResponseSynthesizer {
    fn default() -> Self {
        Self::new(true)
    }
}
