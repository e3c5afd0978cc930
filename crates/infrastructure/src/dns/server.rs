use hickory_proto::op::Message;
use splitdns_application::services::encode_message;
use splitdns_application::use_cases::{DnsReply, HandleDnsQueryUseCase};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error};

/// Turns raw inbound messages into raw replies for the listener sockets.
#[derive(Clone)]
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>) -> Self {
        Self { use_case }
    }

    /// Reply for a UDP datagram, cut down to the client's payload size.
    pub async fn handle_raw_udp(&self, raw: &[u8], client_ip: IpAddr) -> Option<Vec<u8>> {
        let reply = self.use_case.execute(raw, client_ip).await?;
        encode_for_udp(reply)
    }

    /// Reply for one framed TCP message; never truncated.
    pub async fn handle_raw_tcp(&self, raw: &[u8], client_ip: IpAddr) -> Option<Vec<u8>> {
        let reply = self.use_case.execute(raw, client_ip).await?;
        encode(&reply.message)
    }
}

fn encode(message: &Message) -> Option<Vec<u8>> {
    match encode_message(message) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(id = message.id(), error = %e, "Failed to encode response");
            None
        }
    }
}

/// Responses over the client's limit keep header, question and OPT, with TC set.
fn encode_for_udp(reply: DnsReply) -> Option<Vec<u8>> {
    let DnsReply {
        mut message,
        udp_payload,
    } = reply;

    let bytes = encode(&message)?;
    if bytes.len() <= udp_payload as usize {
        return Some(bytes);
    }

    debug!(
        id = message.id(),
        size = bytes.len(),
        limit = udp_payload,
        "Response exceeds client payload size, truncating"
    );
    message.take_answers();
    message.take_name_servers();
    message.take_additionals();
    message.set_truncated(true);
    encode(&message)
}
