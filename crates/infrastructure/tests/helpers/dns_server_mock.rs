use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// How the mock answers over UDP. TCP always answers with the full record set.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Answer(Vec<Ipv4Addr>),
    Truncated(Vec<Ipv4Addr>),
    Silent,
}

/// Upstream server on 127.0.0.1 listening on UDP and TCP on the same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let udp = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = udp.local_addr()?;
        let tcp = TcpListener::bind(addr).await?;

        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_count = udp_queries.clone();
        let tcp_count = tcp_queries.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = udp.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        udp_count.fetch_add(1, Ordering::SeqCst);
                        if let Some(response) = Self::udp_response(&buf[..len], &behavior) {
                            let _ = udp.send_to(&response, peer).await;
                        }
                    }
                    accepted = tcp.accept() => {
                        let Ok((mut stream, _)) = accepted else { continue };
                        tcp_count.fetch_add(1, Ordering::SeqCst);
                        let ips = behavior.ips();
                        tokio::spawn(async move {
                            let mut len_buf = [0u8; 2];
                            if stream.read_exact(&mut len_buf).await.is_err() {
                                return;
                            }
                            let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
                            if stream.read_exact(&mut query).await.is_err() {
                                return;
                            }
                            if let Some(response) = Self::answer(&query, &ips, false) {
                                let _ = stream.write_all(&(response.len() as u16).to_be_bytes()).await;
                                let _ = stream.write_all(&response).await;
                            }
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr,
            udp_queries,
            tcp_queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    fn udp_response(query: &[u8], behavior: &MockBehavior) -> Option<Vec<u8>> {
        match behavior {
            MockBehavior::Answer(ips) => Self::answer(query, ips, false),
            MockBehavior::Truncated(_) => Self::answer(query, &[], true),
            MockBehavior::Silent => None,
        }
    }

    /// Echoes id, question and EDNS of `query` with the given A records.
    fn answer(query: &[u8], ips: &[Ipv4Addr], truncated: bool) -> Option<Vec<u8>> {
        let request = Message::from_vec(query).ok()?;
        let name = request.queries().first()?.name().clone();

        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(request.op_code())
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(true)
            .set_response_code(ResponseCode::NoError)
            .set_truncated(truncated);
        response.add_queries(request.queries().to_vec());
        for ip in ips {
            response.add_answer(Record::from_rdata(name.clone(), 60, RData::A(A(*ip))));
        }
        if let Some(edns) = request.extensions().clone() {
            response.set_edns(edns);
        }
        response.to_vec().ok()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl MockBehavior {
    fn ips(&self) -> Vec<Ipv4Addr> {
        match self {
            Self::Answer(ips) | Self::Truncated(ips) => ips.clone(),
            Self::Silent => Vec::new(),
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
