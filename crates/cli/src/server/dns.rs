use socket2::{Domain, Protocol, Socket, Type};
use splitdns_infrastructure::dns::transport::tcp::{read_with_length_prefix, send_with_length_prefix};
use splitdns_infrastructure::dns::DnsServerHandler;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Largest datagram read from a client.
const MAX_UDP_QUERY_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct ListenerOptions {
    pub udp_workers: usize,
    pub tcp_workers: usize,
    pub tcp_idle_timeout: Duration,
}

pub async fn start_dns_server(
    socket_addr: SocketAddr,
    handler: DnsServerHandler,
    options: ListenerOptions,
) -> anyhow::Result<()> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    info!(
        bind_address = %socket_addr,
        udp_workers = options.udp_workers,
        tcp_workers = options.tcp_workers,
        "Starting DNS server with SO_REUSEPORT"
    );

    let handler = Arc::new(handler);
    let mut join_set: JoinSet<()> = JoinSet::new();

    for i in 0..options.udp_workers {
        let socket = Arc::new(create_udp_socket(domain, socket_addr)?);
        let handler = handler.clone();
        join_set.spawn(async move {
            run_udp_worker(socket, handler, i).await;
        });
    }

    for i in 0..options.tcp_workers {
        let listener = create_tcp_listener(domain, socket_addr)?;
        let handler = handler.clone();
        join_set.spawn(async move {
            run_tcp_worker(listener, handler, options.tcp_idle_timeout, i).await;
        });
    }

    info!(bind_address = %socket_addr, "DNS server ready");

    while join_set.join_next().await.is_some() {}
    Ok(())
}

async fn run_udp_worker(socket: Arc<UdpSocket>, handler: Arc<DnsServerHandler>, worker_id: usize) {
    let mut recv_buf = [0u8; MAX_UDP_QUERY_SIZE];

    loop {
        let (n, from) = match socket.recv_from(&mut recv_buf).await {
            Ok(received) => received,
            Err(e) => {
                // ICMP errors from earlier sends surface here on some platforms.
                debug!(worker = worker_id, error = %e, "UDP recv error");
                continue;
            }
        };

        let handler = handler.clone();
        let socket = socket.clone();
        let query: Arc<[u8]> = Arc::from(&recv_buf[..n]);
        tokio::spawn(async move {
            if let Some(response) = handler.handle_raw_udp(&query, from.ip()).await {
                if let Err(e) = socket.send_to(&response, from).await {
                    debug!(client = %from, error = %e, "Failed to send UDP response");
                }
            }
        });
    }
}

async fn run_tcp_worker(
    listener: TcpListener,
    handler: Arc<DnsServerHandler>,
    idle_timeout: Duration,
    worker_id: usize,
) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(worker = worker_id, error = %e, "TCP accept error");
                continue;
            }
        };

        let handler = handler.clone();
        tokio::spawn(async move {
            serve_tcp_connection(stream, peer, handler, idle_timeout).await;
        });
    }
}

/// Serves framed queries until the client closes, errors or stays idle too long.
async fn serve_tcp_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<DnsServerHandler>,
    idle_timeout: Duration,
) {
    let _ = stream.set_nodelay(true);

    loop {
        let query = match tokio::time::timeout(idle_timeout, read_with_length_prefix(&mut stream)).await {
            Ok(Ok(Some(query))) => query,
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                debug!(client = %peer, error = %e, "TCP read error");
                break;
            }
            Err(_) => {
                debug!(client = %peer, "TCP connection idle, closing");
                break;
            }
        };

        let Some(response) = handler.handle_raw_tcp(&query, peer.ip()).await else {
            continue;
        };
        if let Err(e) = send_with_length_prefix(&mut stream, &response).await {
            debug!(client = %peer, error = %e, "Failed to send TCP response");
            break;
        }
    }
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
