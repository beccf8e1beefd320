//! Discovers NTP servers listening on a multicast group.
//!
//! Run it in the terminal:
//!
//! ```
//! cargo run -p demo-discover
//! ```
//!
//! Options:
//! - `-g`/`--group` - multicast group address (default: `224.0.1.1:123`,
//!   the IANA NTP group)
//! - `-w`/`--wait` - reply collection window in seconds (default: `5`)
//! - `-t`/`--ttl` - multicast TTL for the request (default: `1`)
use sntpx::{DiscoverySettings, NtpContext, StdTimestampGen};
use sntpx_net_std::multicast_socket;

use std::net::SocketAddr;
use std::process::exit;
use std::time::Duration;

use clap::Parser;

#[derive(Parser)]
#[command(name = "demo-discover")]
#[command(version)]
struct Cli {
    /// Multicast group address to probe
    #[arg(short, long, default_value = "224.0.1.1:123")]
    group: SocketAddr,

    /// Reply collection window in seconds
    #[arg(short, long, default_value = "5")]
    wait: u32,

    /// Multicast TTL for the request
    #[arg(short, long, default_value = "1")]
    ttl: u32,
}

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "log")]
    simple_logger::init_with_level(log::Level::Debug).unwrap();

    let socket = multicast_socket(Duration::from_millis(500), cli.ttl)
        .expect("Unable to create UDP socket");
    let context = NtpContext::new(StdTimestampGen::default());
    let settings = DiscoverySettings {
        wait_time: cli.wait,
    };

    match sntpx::sync::discover(cli.group, &socket, context, &settings) {
        Ok(servers) => {
            for server in servers {
                println!("{}", server.address);
            }
        }
        Err(e) => {
            eprintln!("{}: {e}", cli.group);
            exit(1);
        }
    }
}
