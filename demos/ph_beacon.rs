//! pH event beacon
//!
//! Browses for `_capnproto._udp` consumers that advertise `type=PhEvent` and
//! sends them a pH reading once per second until Ctrl+C.
//!
//! Run with: cargo run --example ph_beacon [SERVICE_TYPE]
//!
//! Start one or more listeners alongside it:
//!   cargo run --example ph_listener

use sensor_beacon::{Beacon, BeaconConfig, PhEventSource};

fn print_usage() {
    eprintln!("Usage: ph_beacon [SERVICE_TYPE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  SERVICE_TYPE    DNS-SD type to browse (default: _capnproto._udp.local.)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sensor_beacon=debug".parse()?)
                .add_directive("ph_beacon=debug".parse()?),
        )
        .init();

    let mut config = BeaconConfig::default();
    if let Some(service_type) = args.get(1) {
        config = config.service_type(service_type.as_str());
    }

    println!(
        "Broadcasting {} to {} consumers (Ctrl+C to stop)",
        config.payload_tag, config.service_type
    );

    let mut beacon = Beacon::mdns(config)?;
    let mut source = PhEventSource::constant(7.0);

    beacon
        .run_until(&mut source, async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    let stats = beacon.stats().snapshot();
    println!(
        "Sent {} broadcasts, {} datagrams, {} failures",
        stats.broadcasts, stats.datagrams_attempted, stats.send_failures
    );

    Ok(())
}
