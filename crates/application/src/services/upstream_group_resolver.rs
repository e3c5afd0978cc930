use super::message_codec::{decode_message, encode_message};
use crate::ports::{TransportKind, UpstreamTransport};
use hickory_proto::op::Message;
use splitdns_domain::{DomainError, UpstreamGroup};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Usable reply obtained from one upstream server.
#[derive(Debug, Clone)]
pub struct UpstreamAnswer {
    pub message: Message,
    /// Bytes exactly as received from the server.
    pub raw: Vec<u8>,
    pub server: SocketAddr,
    pub group: Arc<str>,
    pub transport: TransportKind,
    pub latency: Duration,
}

impl UpstreamAnswer {
    pub fn answer_count(&self) -> usize {
        self.message.answers().len()
    }

    /// True when the reply still has TC set (UDP only, TCP retry unavailable
    /// or failed).
    pub fn truncated(&self) -> bool {
        self.message.truncated()
    }
}

/// Drives the ordered, strictly sequential attempt loop over one group.
pub struct UpstreamGroupResolver {
    transport: Arc<dyn UpstreamTransport>,
    tcp_fallback: bool,
    verbose: bool,
}

impl UpstreamGroupResolver {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self {
            transport,
            tcp_fallback: true,
            verbose: false,
        }
    }

    pub fn with_tcp_fallback(mut self, enabled: bool) -> Self {
        self.tcp_fallback = enabled;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Tries each server of `group` in order until one yields a usable reply.
    ///
    /// Timeouts and malformed datagrams advance to the next server. A reply
    /// from an unexpected address aborts with [`DomainError::SpoofedReply`].
    /// A reply with zero answers is returned as-is.
    pub async fn resolve_with_fallback(
        &self,
        group: &UpstreamGroup,
        query: &Message,
    ) -> Result<UpstreamAnswer, DomainError> {
        let mut outgoing = query.clone();
        let name = query
            .queries()
            .first()
            .map(|q| q.name().to_string())
            .unwrap_or_default();

        for (index, server) in group.servers().iter().enumerate() {
            let id = fastrand::u16(..);
            outgoing.set_id(id);
            let bytes = encode_message(&outgoing)?;

            match self.attempt(group, *server, id, &bytes).await {
                Ok(answer) => {
                    self.log_answer(&name, &answer);
                    return Ok(answer);
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        group = group.name(),
                        server = %server,
                        position = index,
                        error = %e,
                        "Upstream attempt failed, trying next server"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::UpstreamExhausted {
            group: group.name().to_string(),
        })
    }

    async fn attempt(
        &self,
        group: &UpstreamGroup,
        server: SocketAddr,
        id: u16,
        query_bytes: &[u8],
    ) -> Result<UpstreamAnswer, DomainError> {
        let start = Instant::now();
        let reply = self
            .transport
            .exchange_udp(server, query_bytes, group.timeout())
            .await?;

        if !same_endpoint(reply.from, server) {
            return Err(DomainError::SpoofedReply {
                expected: server,
                received: reply.from,
            });
        }

        let message = parse_reply(server, id, &reply.bytes)?;

        if message.truncated() && self.tcp_fallback {
            debug!(server = %server, "Response truncated (TC bit), retrying via TCP");
            match self.retry_tcp(group, server, id, query_bytes).await {
                Ok((message, raw)) => {
                    return Ok(UpstreamAnswer {
                        message,
                        raw,
                        server,
                        group: Arc::from(group.name()),
                        transport: TransportKind::Tcp,
                        latency: start.elapsed(),
                    });
                }
                Err(e) => {
                    warn!(server = %server, error = %e, "TCP retry failed, returning truncated reply");
                }
            }
        }

        Ok(UpstreamAnswer {
            message,
            raw: reply.bytes,
            server,
            group: Arc::from(group.name()),
            transport: TransportKind::Udp,
            latency: start.elapsed(),
        })
    }

    async fn retry_tcp(
        &self,
        group: &UpstreamGroup,
        server: SocketAddr,
        id: u16,
        query_bytes: &[u8],
    ) -> Result<(Message, Vec<u8>), DomainError> {
        let raw = self
            .transport
            .exchange_tcp(server, query_bytes, group.timeout())
            .await?;
        let message = parse_reply(server, id, &raw)?;
        Ok((message, raw))
    }

    fn log_answer(&self, name: &str, answer: &UpstreamAnswer) {
        if answer.message.answers().is_empty() {
            if self.verbose {
                info!(domain = %name, server = %answer.server, "DNS query no answer");
            } else {
                debug!(domain = %name, server = %answer.server, "DNS query no answer");
            }
            return;
        }
        for record in answer.message.answers() {
            if self.verbose {
                info!(domain = %name, answer = %record.data(), server = %answer.server, "DNS query answer");
            } else {
                debug!(domain = %name, answer = %record.data(), server = %answer.server, "DNS query answer");
            }
        }
    }
}

fn same_endpoint(from: SocketAddr, server: SocketAddr) -> bool {
    from.port() == server.port() && from.ip().to_canonical() == server.ip().to_canonical()
}

fn parse_reply(server: SocketAddr, id: u16, bytes: &[u8]) -> Result<Message, DomainError> {
    let message = decode_message(bytes).map_err(|e| DomainError::MalformedReply {
        server,
        reason: e.to_string(),
    })?;
    if message.id() != id {
        return Err(DomainError::MalformedReply {
            server,
            reason: format!("transaction ID mismatch: expected {}, got {}", id, message.id()),
        });
    }
    Ok(message)
}
