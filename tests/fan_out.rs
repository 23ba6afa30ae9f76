//! End-to-end checks of discovery-driven fan-out over loopback UDP

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use sensor_beacon::broadcast::UdpTransport;
use sensor_beacon::capability::TYPE_KEY;
use sensor_beacon::discovery::{HandleOutcome, MemoryResolver, DEFAULT_SERVICE_TYPE};
use sensor_beacon::{
    BroadcastError, Broadcaster, CapabilityMatcher, DiscoveryHandler, Endpoint, EndpointRegistry,
    PayloadTypeTag, PhEvent, ServiceMetadata, ServiceName,
};
use tokio::net::UdpSocket;

fn ph_consumer(addr: SocketAddr) -> ServiceMetadata {
    ServiceMetadata::new(addr.port())
        .address(addr.ip())
        .property(TYPE_KEY, "PhEvent")
}

fn handler(
    registry: &Arc<EndpointRegistry>,
    resolver: &MemoryResolver,
) -> DiscoveryHandler<MemoryResolver> {
    DiscoveryHandler::new(
        Arc::clone(registry),
        CapabilityMatcher::new(),
        PhEvent::TAG,
        resolver.clone(),
    )
}

async fn loopback_broadcaster(registry: &Arc<EndpointRegistry>) -> Broadcaster<UdpTransport> {
    let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    Broadcaster::new(Arc::clone(registry), PhEvent::TAG, transport)
}

/// Collect every datagram arriving within `window`
async fn drain(socket: &UdpSocket, window: Duration) -> Vec<Vec<u8>> {
    let mut received = Vec::new();
    let mut buf = [0u8; 1500];
    loop {
        let result = tokio::time::timeout(window, socket.recv_from(&mut buf)).await;
        match result {
            Ok(Ok((len, _))) => received.push(buf[..len].to_vec()),
            _ => break,
        }
    }
    received
}

#[tokio::test]
async fn appeared_then_vanished_scenario() {
    let registry = Arc::new(EndpointRegistry::new());
    let resolver = MemoryResolver::new();
    let handler = handler(&registry, &resolver);

    let svc_a = ServiceName::new("svcA");
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 9000);
    resolver.insert(svc_a.clone(), ph_consumer(addr)).await;

    handler.on_service_appeared(&svc_a, DEFAULT_SERVICE_TYPE).await;
    assert_eq!(registry.snapshot().await, vec![Endpoint::from(addr)]);

    handler.on_service_vanished(&svc_a, DEFAULT_SERVICE_TYPE).await;
    assert!(registry.snapshot().await.is_empty());
}

#[tokio::test]
async fn mismatched_service_never_registered() {
    let registry = Arc::new(EndpointRegistry::new());
    let resolver = MemoryResolver::new();
    let handler = handler(&registry, &resolver);

    let name = ServiceName::new("thermometer");
    let metadata = ServiceMetadata::new(9100)
        .address(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .property(TYPE_KEY, "TemperatureEvent");
    resolver.insert(name.clone(), metadata).await;

    // Vanish before appear, appear twice, vanish, appear again
    handler.on_service_vanished(&name, DEFAULT_SERVICE_TYPE).await;
    assert!(registry.snapshot().await.is_empty());

    for _ in 0..2 {
        let outcome = handler.on_service_appeared(&name, DEFAULT_SERVICE_TYPE).await;
        assert_eq!(outcome, HandleOutcome::Rejected);
        assert!(registry.snapshot().await.is_empty());
    }

    handler.on_service_vanished(&name, DEFAULT_SERVICE_TYPE).await;
    handler.on_service_appeared(&name, DEFAULT_SERVICE_TYPE).await;
    assert!(registry.snapshot().await.is_empty());
}

#[tokio::test]
async fn readdressed_service_replaced_not_duplicated() {
    let registry = Arc::new(EndpointRegistry::new());
    let resolver = MemoryResolver::new();
    let handler = handler(&registry, &resolver);

    let name = ServiceName::new("svcA");
    let first = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)), 9000);
    let second = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 6)), 9000);

    resolver.insert(name.clone(), ph_consumer(first)).await;
    handler.on_service_appeared(&name, DEFAULT_SERVICE_TYPE).await;
    resolver.insert(name.clone(), ph_consumer(second)).await;
    handler.on_service_appeared(&name, DEFAULT_SERVICE_TYPE).await;

    assert_eq!(registry.snapshot().await, vec![Endpoint::from(second)]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn snapshot_unaffected_by_concurrent_mutation() {
    let registry = Arc::new(EndpointRegistry::new());
    for i in 0..8u8 {
        let endpoint = Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, i)), 9000);
        registry.put(ServiceName::new(format!("svc{}", i)), endpoint).await;
    }

    let snapshot = registry.snapshot().await;
    let mut expected = snapshot.clone();
    expected.sort_by_key(|e| e.addr());

    let mut writers = Vec::new();
    for i in 0..8u8 {
        let registry = Arc::clone(&registry);
        writers.push(tokio::spawn(async move {
            let name = ServiceName::new(format!("svc{}", i));
            registry.remove(&name).await;
            let moved = Endpoint::new(IpAddr::V4(Ipv4Addr::new(10, 1, 0, i)), 9001);
            registry.put(name, moved).await;
        }));
    }

    let mut seen = Vec::new();
    for endpoint in &snapshot {
        seen.push(*endpoint);
        tokio::task::yield_now().await;
    }
    for writer in writers {
        writer.await.unwrap();
    }

    seen.sort_by_key(|e| e.addr());
    assert_eq!(seen, expected);
    assert!(registry
        .snapshot()
        .await
        .iter()
        .all(|endpoint| endpoint.port() == 9001));
}

#[tokio::test]
async fn fan_out_survives_failing_endpoint() {
    let first = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let third = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let registry = Arc::new(EndpointRegistry::new());
    registry
        .put("first".into(), Endpoint::from(first.local_addr().unwrap()))
        .await;
    // IPv6 destination from an IPv4 socket is rejected by the kernel
    registry
        .put("second".into(), Endpoint::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 9))
        .await;
    registry
        .put("third".into(), Endpoint::from(third.local_addr().unwrap()))
        .await;

    let broadcaster = loopback_broadcaster(&registry).await;
    let payload = PhEvent::new(7.0, 1).encode();

    let report = broadcaster
        .send_with_report(&payload, &PhEvent::TAG)
        .await
        .unwrap();
    assert_eq!(report.attempted, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].endpoint.port(), 9);

    for socket in [&first, &third] {
        let received = drain(socket, Duration::from_millis(200)).await;
        assert_eq!(received, vec![payload.to_vec()]);
    }

    assert_eq!(registry.len().await, 3);
}

#[tokio::test]
async fn wrong_tag_sends_nothing() {
    let consumer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let registry = Arc::new(EndpointRegistry::new());
    registry
        .put("svcA".into(), Endpoint::from(consumer.local_addr().unwrap()))
        .await;

    let broadcaster = loopback_broadcaster(&registry).await;
    let wrong = PayloadTypeTag::from("Co2Event");

    let result = broadcaster.send(b"co2", &wrong).await;

    assert!(matches!(result, Err(BroadcastError::TypeMismatch { .. })));
    assert!(drain(&consumer, Duration::from_millis(100)).await.is_empty());
}
