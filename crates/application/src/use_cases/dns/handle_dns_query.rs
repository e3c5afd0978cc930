use crate::ports::{FailedQuery, ResolutionEvent, ResolutionEventSink, ResolvedQuery};
use crate::services::{
    InspectError, InspectedQuery, QueryInspector, Resolution, ResolutionEngine,
    ResponseSynthesizer,
};
use hickory_proto::op::{Message, ResponseCode};
use splitdns_domain::config::ExhaustedResponse;
use splitdns_domain::{DomainError, QueryContext, MIN_UDP_PAYLOAD};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Message to send back, with the UDP payload size the client accepts.
#[derive(Debug)]
pub struct DnsReply {
    pub message: Message,
    pub udp_payload: u16,
}

pub struct HandleDnsQueryUseCase {
    engine: Arc<ResolutionEngine>,
    synthesizer: ResponseSynthesizer,
    events: Arc<dyn ResolutionEventSink>,
    exhausted_response: ExhaustedResponse,
}

impl HandleDnsQueryUseCase {
    pub fn new(engine: Arc<ResolutionEngine>, events: Arc<dyn ResolutionEventSink>) -> Self {
        Self {
            engine,
            synthesizer: ResponseSynthesizer::default(),
            events,
            exhausted_response: ExhaustedResponse::default(),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: ResponseSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_exhausted_response(mut self, exhausted_response: ExhaustedResponse) -> Self {
        self.exhausted_response = exhausted_response;
        self
    }

    /// Handles one raw inbound message. `None` means no reply is sent.
    pub async fn execute(&self, raw: &[u8], client_ip: IpAddr) -> Option<DnsReply> {
        let start = Instant::now();

        let InspectedQuery {
            message: request,
            context: ctx,
        } = match QueryInspector::inspect(raw, client_ip) {
            Ok(inspected) => inspected,
            Err(InspectError::Unparsable { id: Some(id) }) => {
                debug!(client = %client_ip, "Unparsable query, answering FORMERR");
                return Some(DnsReply {
                    message: ResponseSynthesizer::reject_unparsable(id),
                    udp_payload: MIN_UDP_PAYLOAD,
                });
            }
            Err(InspectError::Unparsable { id: None }) | Err(InspectError::NotAQuery) => {
                debug!(client = %client_ip, "Dropping non-query datagram");
                return None;
            }
            Err(InspectError::Rejected { request, error }) => {
                debug!(client = %client_ip, error = %error, "Rejecting query");
                return Some(DnsReply {
                    message: ResponseSynthesizer::reject(&request, rcode_for(&error)),
                    udp_payload: MIN_UDP_PAYLOAD,
                });
            }
        };

        match self.engine.resolve(&request, &ctx).await {
            Ok(Resolution::Local) => Some(DnsReply {
                message: ResponseSynthesizer::reject(&request, ResponseCode::NXDomain),
                udp_payload: ctx.udp_payload,
            }),
            Ok(Resolution::Answered {
                classification,
                answer,
            }) => {
                self.events.emit(ResolutionEvent::Resolved(ResolvedQuery {
                    name: Arc::clone(&ctx.name),
                    record_type: ctx.record_type,
                    classification,
                    group: Arc::clone(&answer.group),
                    server: answer.server,
                    transport: answer.transport,
                    answers: answer.answer_count(),
                    truncated: answer.truncated(),
                    elapsed: start.elapsed(),
                }));
                Some(DnsReply {
                    message: self.synthesizer.answer(&request, &ctx, &answer),
                    udp_payload: ctx.udp_payload,
                })
            }
            Err(error) => self.on_error(&request, &ctx, error),
        }
    }

    fn on_error(&self, request: &Message, ctx: &QueryContext, error: DomainError) -> Option<DnsReply> {
        let rcode = rcode_for(&error);
        if rcode != ResponseCode::ServFail {
            debug!(domain = %ctx.name, error = %error, "Query refused");
            return Some(DnsReply {
                message: ResponseSynthesizer::reject(request, rcode),
                udp_payload: ctx.udp_payload,
            });
        }

        self.events.emit(ResolutionEvent::Failed(FailedQuery {
            name: Arc::clone(&ctx.name),
            record_type: ctx.record_type,
            client_ip: ctx.client_ip,
            error,
        }));

        match self.exhausted_response {
            ExhaustedResponse::Drop => None,
            ExhaustedResponse::Servfail => Some(DnsReply {
                message: ResponseSynthesizer::reject(request, ResponseCode::ServFail),
                udp_payload: ctx.udp_payload,
            }),
        }
    }
}

fn rcode_for(error: &DomainError) -> ResponseCode {
    match error {
        DomainError::Refused(_) => ResponseCode::Refused,
        DomainError::FormatError(_) | DomainError::InvalidDomainName(_) => ResponseCode::FormErr,
        DomainError::NotImplemented(_) => ResponseCode::NotImp,
        _ => ResponseCode::ServFail,
    }
}
