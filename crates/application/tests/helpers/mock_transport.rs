use super::messages::{decode, upstream_reply};
use async_trait::async_trait;
use hickory_proto::op::ResponseCode;
use splitdns_application::ports::{
    ResolutionEvent, ResolutionEventSink, TransportKind, UdpReply, UpstreamTransport,
};
use splitdns_application::services::encode_message;
use splitdns_domain::DomainError;
use hickory_proto::op::Message;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted behaviour of one upstream server over UDP.
#[derive(Debug, Clone)]
pub enum UdpScript {
    Timeout,
    Answer(Vec<Ipv4Addr>),
    Rcode(ResponseCode),
    Truncated,
    SpoofedFrom(SocketAddr),
    Garbage,
    WrongId,
}

#[derive(Debug, Clone)]
pub enum TcpScript {
    Answer(Vec<Ipv4Addr>),
    Fail,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub server: SocketAddr,
    pub transport: TransportKind,
    pub query: Message,
    /// Query bytes as handed to the transport.
    pub raw: Vec<u8>,
}

/// Upstream transport driven by per-server scripts. Servers without a script
/// time out.
#[derive(Default)]
pub struct MockUpstreamTransport {
    udp: Mutex<HashMap<SocketAddr, UdpScript>>,
    tcp: Mutex<HashMap<SocketAddr, TcpScript>>,
    calls: Mutex<Vec<Call>>,
}

impl MockUpstreamTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn udp(self, server: &str, script: UdpScript) -> Self {
        self.udp.lock().unwrap().insert(server.parse().unwrap(), script);
        self
    }

    pub fn tcp(self, server: &str, script: TcpScript) -> Self {
        self.tcp.lock().unwrap().insert(server.parse().unwrap(), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contacted(&self) -> Vec<(SocketAddr, TransportKind)> {
        self.calls()
            .into_iter()
            .map(|c| (c.server, c.transport))
            .collect()
    }

    fn record(&self, server: SocketAddr, transport: TransportKind, raw: &[u8]) -> Message {
        let query = decode(raw);
        self.calls.lock().unwrap().push(Call {
            server,
            transport,
            query: query.clone(),
            raw: raw.to_vec(),
        });
        query
    }
}

#[async_trait]
impl UpstreamTransport for MockUpstreamTransport {
    async fn exchange_udp(
        &self,
        server: SocketAddr,
        query: &[u8],
        _timeout: Duration,
    ) -> Result<UdpReply, DomainError> {
        let query = self.record(server, TransportKind::Udp, query);
        let script = self.udp.lock().unwrap().get(&server).cloned();
        let reply = |message: Message, from: SocketAddr| UdpReply {
            bytes: encode_message(&message).unwrap(),
            from,
        };

        match script.unwrap_or(UdpScript::Timeout) {
            UdpScript::Timeout => Err(DomainError::UpstreamTimeout { server }),
            UdpScript::Answer(ips) => Ok(reply(
                upstream_reply(&query, &ips, ResponseCode::NoError),
                server,
            )),
            UdpScript::Rcode(rcode) => Ok(reply(upstream_reply(&query, &[], rcode), server)),
            UdpScript::Truncated => {
                let mut message = upstream_reply(&query, &[], ResponseCode::NoError);
                message.set_truncated(true);
                Ok(reply(message, server))
            }
            UdpScript::SpoofedFrom(from) => Ok(reply(
                upstream_reply(&query, &[Ipv4Addr::new(6, 6, 6, 6)], ResponseCode::NoError),
                from,
            )),
            UdpScript::Garbage => Ok(UdpReply {
                bytes: vec![0xde, 0xad],
                from: server,
            }),
            UdpScript::WrongId => {
                let mut message =
                    upstream_reply(&query, &[Ipv4Addr::new(7, 7, 7, 7)], ResponseCode::NoError);
                message.set_id(query.id().wrapping_add(1));
                Ok(reply(message, server))
            }
        }
    }

    async fn exchange_tcp(
        &self,
        server: SocketAddr,
        query: &[u8],
        _timeout: Duration,
    ) -> Result<Vec<u8>, DomainError> {
        let query = self.record(server, TransportKind::Tcp, query);
        let script = self.tcp.lock().unwrap().get(&server).cloned();
        match script {
            Some(TcpScript::Answer(ips)) => {
                Ok(encode_message(&upstream_reply(&query, &ips, ResponseCode::NoError)).unwrap())
            }
            Some(TcpScript::Fail) | None => Err(DomainError::IoError("connection refused".into())),
        }
    }
}

/// Collects emitted events for assertions.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<ResolutionEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ResolutionEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<DomainError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ResolutionEvent::Failed(f) => Some(f.error),
                _ => None,
            })
            .collect()
    }
}

impl ResolutionEventSink for RecordingEventSink {
    fn emit(&self, event: ResolutionEvent) {
        self.events.lock().unwrap().push(event);
    }
}
