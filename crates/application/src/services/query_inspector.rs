use super::ecs_option_builder::{find_client_subnet, to_subnet_hint};
use super::message_codec::decode_message;
use hickory_proto::op::{Message, MessageType, OpCode};
use splitdns_domain::{DomainError, QueryContext, QueryFlags, RecordType};
use std::net::IpAddr;

/// Why an inbound datagram cannot be resolved.
#[derive(Debug)]
pub enum InspectError {
    /// Not a DNS message; `id` is set when at least a header was present.
    Unparsable { id: Option<u16> },
    /// QR bit set; responses are never answered.
    NotAQuery,
    /// Parsed, but must be answered with an error code.
    Rejected { request: Box<Message>, error: DomainError },
}

#[derive(Debug)]
pub struct InspectedQuery {
    pub message: Message,
    pub context: QueryContext,
}

pub struct QueryInspector;

impl QueryInspector {
    pub fn inspect(raw: &[u8], client_ip: IpAddr) -> Result<InspectedQuery, InspectError> {
        let message = decode_message(raw).map_err(|_| InspectError::Unparsable {
            id: (raw.len() >= 12).then(|| u16::from_be_bytes([raw[0], raw[1]])),
        })?;

        if message.message_type() != MessageType::Query {
            return Err(InspectError::NotAQuery);
        }
        if message.op_code() != OpCode::Query {
            let error = DomainError::NotImplemented(format!("opcode {:?}", message.op_code()));
            return Err(InspectError::Rejected {
                request: Box::new(message),
                error,
            });
        }
        if message.queries().len() != 1 {
            let error = DomainError::FormatError(format!(
                "expected exactly one question, got {}",
                message.queries().len()
            ));
            return Err(InspectError::Rejected {
                request: Box::new(message),
                error,
            });
        }

        let context = Self::context(&message, client_ip);
        Ok(InspectedQuery { message, context })
    }

    fn context(message: &Message, client_ip: IpAddr) -> QueryContext {
        let question = &message.queries()[0];
        let edns = message.extensions().as_ref();

        let mut context = QueryContext::new(
            message.id(),
            &question.name().to_ascii(),
            RecordType::from_u16(u16::from(question.query_type())),
            client_ip,
        )
        .with_flags(QueryFlags {
            recursion_desired: message.recursion_desired(),
            checking_disabled: message.checking_disabled(),
            dnssec_ok: edns.is_some_and(|e| e.flags().dnssec_ok),
        })
        .with_client_subnet(find_client_subnet(message).and_then(to_subnet_hint));
        context.record_class = u16::from(question.query_class());

        if let Some(edns) = edns {
            context = context.with_edns(edns.max_payload());
        }
        context
    }
}
