//! Queries an NTP server and prints the local clock offset.
//!
//! Run it in the terminal:
//!
//! ```
//! cargo run -p demo-query -- -s pool.ntp.org
//! ```
//!
//! Options:
//! - `-s`/`--server` - server hostname or IP (default: `time.google.com`)
//! - `-p`/`--port` - server port (default: `123`)
//! - `-r`/`--retries` - retries after a failed attempt (default: `2`)
//! - `--set-clock` - apply the offset to the system clock
use sntpx::utils::{format_result, update_system_time};
use sntpx::{
    ClientSettings, NtpContext, PollTimer, StdTimestampGen, WallClockTime,
};
use sntpx_net_std::{client_socket, resolve};

use std::process::exit;
use std::time::{Duration, SystemTime};

use clap::Parser;

const GOOGLE_NTP_ADDR: &str = "time.google.com";

#[derive(Parser)]
#[command(name = "demo-query")]
#[command(version)]
struct Cli {
    /// NTP server hostname or IP address
    #[arg(short, long, default_value = GOOGLE_NTP_ADDR)]
    server: String,

    /// NTP server port
    #[arg(short, long, default_value = "123")]
    port: u16,

    /// Retries after a failed attempt
    #[arg(short, long, default_value = "2")]
    retries: u8,

    /// Apply the measured offset to the system clock
    #[arg(long)]
    set_clock: bool,
}

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "log")]
    simple_logger::init_with_level(log::Level::Debug).unwrap();

    let server = resolve(&cli.server, cli.port).unwrap_or_else(|e| {
        eprintln!("{}: {e}", cli.server);
        exit(1);
    });
    let socket = client_socket(Duration::from_secs(2))
        .expect("Unable to create UDP socket");
    let context = NtpContext::new(StdTimestampGen::default());
    let settings = ClientSettings {
        max_unicast_retries: cli.retries,
        ..ClientSettings::default()
    };
    let mut timer = PollTimer::new(settings.poll_wait);

    match sntpx::sync::unicast_request(
        server.address,
        &socket,
        context,
        &settings,
        &mut timer,
    ) {
        Ok(result) => {
            println!("{}", format_result(&result, &server));

            if cli.set_clock {
                let now = SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .expect("system clock before the UNIX epoch");
                let corrected = now.as_secs_f64() + result.offset;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                update_system_time(WallClockTime::new(
                    corrected as i64,
                    (corrected.fract() * 1e6) as u32,
                ));
            }
        }
        Err(e) => {
            eprintln!("{}: {e}", cli.server);
            exit(1);
        }
    }
}
