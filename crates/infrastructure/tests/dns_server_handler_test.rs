mod helpers;

use helpers::{a_records, query_bytes, query_message, MockBehavior, MockDnsServer};
use hickory_proto::op::{Edns, Message, ResponseCode};
use hickory_proto::rr::RecordType;
use splitdns_application::ports::ResolutionEvent;
use splitdns_application::services::{EngineOptions, ResolutionEngine};
use splitdns_application::use_cases::HandleDnsQueryUseCase;
use splitdns_domain::{DomainPolicySet, UpstreamGroup};
use splitdns_infrastructure::dns::{
    DnsServerHandler, ErrorHook, NetworkUpstreamTransport, ResolutionEventEmitter,
};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100));

fn handler(
    primary: &[&MockDnsServer],
    alternate: &[&MockDnsServer],
    emitter: ResolutionEventEmitter,
) -> DnsServerHandler {
    let policy = DomainPolicySet::builder()
        .local_suffixes(["lan", "local", "localdomain"])
        .primary_suffix("example.cn")
        .build();
    let group = |name: &str, servers: &[&MockDnsServer]| {
        UpstreamGroup::new(name, servers.iter().map(|s| s.addr()).collect())
            .unwrap()
            .with_timeout(Duration::from_millis(200))
    };
    let engine = ResolutionEngine::new(
        Arc::new(policy),
        group("up", primary),
        Some(group("pure", alternate)),
        Arc::new(NetworkUpstreamTransport::new()),
        EngineOptions::default(),
    );
    let use_case = HandleDnsQueryUseCase::new(Arc::new(engine), Arc::new(emitter));
    DnsServerHandler::new(Arc::new(use_case))
}

#[tokio::test]
async fn test_split_routing_over_real_sockets() {
    let up = MockDnsServer::start(MockBehavior::Answer(vec![Ipv4Addr::new(1, 2, 3, 4)]))
        .await
        .unwrap();
    let pure = MockDnsServer::start(MockBehavior::Answer(vec![Ipv4Addr::new(5, 6, 7, 8)]))
        .await
        .unwrap();
    let handler = handler(&[&up], &[&pure], ResolutionEventEmitter::new_disabled());

    let bytes = handler
        .handle_raw_udp(&query_bytes(0x1111, "www.example.cn.", RecordType::A), CLIENT)
        .await
        .unwrap();
    let response = Message::from_vec(&bytes).unwrap();
    assert_eq!(response.id(), 0x1111);
    assert_eq!(a_records(&response), vec![Ipv4Addr::new(1, 2, 3, 4)]);

    let bytes = handler
        .handle_raw_udp(&query_bytes(0x2222, "example.com.", RecordType::A), CLIENT)
        .await
        .unwrap();
    let response = Message::from_vec(&bytes).unwrap();
    assert_eq!(response.id(), 0x2222);
    assert_eq!(a_records(&response), vec![Ipv4Addr::new(5, 6, 7, 8)]);

    assert_eq!(up.udp_queries(), 1);
    assert_eq!(pure.udp_queries(), 1);
}

#[tokio::test]
async fn test_silent_server_skipped_for_next_in_group() {
    let silent = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let up = MockDnsServer::start(MockBehavior::Answer(vec![Ipv4Addr::new(1, 2, 3, 4)]))
        .await
        .unwrap();
    let pure = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let handler = handler(&[&silent, &up], &[&pure], ResolutionEventEmitter::new_disabled());

    let bytes = handler
        .handle_raw_udp(&query_bytes(7, "cdn.example.cn.", RecordType::A), CLIENT)
        .await
        .unwrap();

    let response = Message::from_vec(&bytes).unwrap();
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert_eq!(a_records(&response), vec![Ipv4Addr::new(1, 2, 3, 4)]);
    assert_eq!(silent.udp_queries(), 1);
    assert_eq!(pure.udp_queries(), 0);
}

#[tokio::test]
async fn test_truncated_udp_answer_retried_over_tcp() {
    let ips = vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)];
    let up = MockDnsServer::start(MockBehavior::Truncated(ips.clone()))
        .await
        .unwrap();
    let pure = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let handler = handler(&[&up], &[&pure], ResolutionEventEmitter::new_disabled());

    let bytes = handler
        .handle_raw_tcp(&query_bytes(3, "big.example.cn.", RecordType::A), CLIENT)
        .await
        .unwrap();

    let response = Message::from_vec(&bytes).unwrap();
    assert!(!response.truncated());
    assert_eq!(a_records(&response), ips);
    assert_eq!(up.tcp_queries(), 1);
}

#[tokio::test]
async fn test_udp_reply_respects_client_payload() {
    let many: Vec<Ipv4Addr> = (0..60).map(|i| Ipv4Addr::new(10, 0, 1, i)).collect();
    let up = MockDnsServer::start(MockBehavior::Answer(many)).await.unwrap();
    let pure = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let handler = handler(&[&up], &[&pure], ResolutionEventEmitter::new_disabled());

    let plain = query_bytes(11, "many.example.cn.", RecordType::A);
    let bytes = handler.handle_raw_udp(&plain, CLIENT).await.unwrap();
    let response = Message::from_vec(&bytes).unwrap();
    assert!(bytes.len() <= 512);
    assert!(response.truncated());
    assert!(response.answers().is_empty());

    let mut with_edns = query_message(12, "many.example.cn.", RecordType::A);
    let mut edns = Edns::new();
    edns.set_max_payload(4096);
    with_edns.set_edns(edns);
    let bytes = handler
        .handle_raw_udp(&with_edns.to_vec().unwrap(), CLIENT)
        .await
        .unwrap();
    let response = Message::from_vec(&bytes).unwrap();
    assert!(!response.truncated());
    assert_eq!(response.answers().len(), 60);
}

#[tokio::test]
async fn test_local_zone_answered_without_upstream() {
    let up = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let pure = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let handler = handler(&[&up], &[&pure], ResolutionEventEmitter::new_disabled());

    let bytes = handler
        .handle_raw_udp(&query_bytes(0x0400, "nas.lan.", RecordType::A), CLIENT)
        .await
        .unwrap();

    let response = Message::from_vec(&bytes).unwrap();
    assert_eq!(response.response_code(), ResponseCode::NXDomain);
    assert_eq!(up.udp_queries() + pure.udp_queries(), 0);
}

#[tokio::test]
async fn test_exhaustion_reaches_error_hook_channel() {
    let up = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let pure = MockDnsServer::start(MockBehavior::Silent).await.unwrap();
    let (emitter, mut rx) = ResolutionEventEmitter::new_enabled();
    let handler = handler(&[&up], &[&pure], emitter);

    let bytes = handler
        .handle_raw_udp(&query_bytes(0x0500, "down.example.cn.", RecordType::A), CLIENT)
        .await
        .unwrap();

    let response = Message::from_vec(&bytes).unwrap();
    assert_eq!(response.response_code(), ResponseCode::ServFail);
    let event = rx.try_recv().unwrap();
    assert!(matches!(event, ResolutionEvent::Failed(_)));
    ErrorHook::new(true).handle(&event);
}
