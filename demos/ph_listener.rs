//! pH event listener
//!
//! Binds a UDP socket, advertises it over mDNS as a `PhEvent` consumer and
//! prints every reading it receives.
//!
//! Run with: cargo run --example ph_listener [INSTANCE_NAME]

use std::net::SocketAddr;

use mdns_sd::{ServiceDaemon, ServiceInfo};
use sensor_beacon::discovery::DEFAULT_SERVICE_TYPE;
use sensor_beacon::PhEvent;
use tokio::net::UdpSocket;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ph_listener=debug".parse()?),
        )
        .init();

    let instance = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ph-listener".to_string());

    let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0))).await?;
    let port = socket.local_addr()?.port();

    let daemon = ServiceDaemon::new()?;
    let host_name = format!("{}.local.", instance);
    let properties = [("type", "PhEvent")];
    let service = ServiceInfo::new(
        DEFAULT_SERVICE_TYPE,
        &instance,
        &host_name,
        "",
        port,
        &properties[..],
    )?
    .enable_addr_auto();
    let fullname = service.get_fullname().to_string();
    daemon.register(service)?;

    println!("Advertised {} on UDP port {}", fullname, port);

    let mut buf = [0u8; 1500];
    loop {
        tokio::select! {
            received = socket.recv_from(&mut buf) => {
                let (len, from) = received?;
                match PhEvent::decode(&buf[..len]) {
                    Ok(event) => println!("{} from {}", event, from),
                    Err(e) => eprintln!("Bad datagram from {}: {}", from, e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    let _ = daemon.unregister(&fullname);
    let _ = daemon.shutdown();

    Ok(())
}
