//! Serves SNTP requests, optionally joining the NTP multicast group so the
//! server also answers manycast discovery probes.
//!
//! Run it in the terminal (port 123 needs elevated privileges):
//!
//! ```
//! cargo run -p demo-server -- -p 1123
//! ```
//!
//! Options:
//! - `-p`/`--port` - port to listen on (default: `123`)
//! - `--stratum` - advertised stratum (default: `1`)
//! - `-m`/`--multicast` - also join the IANA NTP group `224.0.1.1`
use sntpx::server::ServerSettings;
use sntpx::{NtpContext, StdTimestampGen};
use sntpx_net_std::{join_multicast_group, server_socket};

use std::net::Ipv4Addr;
use std::process::exit;

use clap::Parser;

const NTP_MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 1, 1);

#[derive(Parser)]
#[command(name = "demo-server")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "123")]
    port: u16,

    /// Stratum advertised in replies
    #[arg(long, default_value = "1")]
    stratum: u8,

    /// Also answer manycast discovery on the NTP multicast group
    #[arg(short, long)]
    multicast: bool,
}

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "log")]
    simple_logger::init_with_level(log::Level::Debug).unwrap();

    let socket = server_socket(cli.port).unwrap_or_else(|e| {
        eprintln!("port {}: {e}", cli.port);
        exit(1);
    });

    if cli.multicast {
        join_multicast_group(&socket, NTP_MULTICAST_GROUP)
            .expect("Unable to join the NTP multicast group");
    }

    let context = NtpContext::new(StdTimestampGen::default());
    let settings = ServerSettings {
        stratum: cli.stratum,
        ..ServerSettings::default()
    };

    println!("listening on port {}", cli.port);

    loop {
        if let Err(e) = sntpx::sync::serve_once(&socket, context, &settings) {
            eprintln!("exchange failed: {e}");
        }
    }
}
