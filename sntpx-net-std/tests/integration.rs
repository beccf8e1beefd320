//! End-to-end exchanges between the client engines and the server engine
//! over loopback sockets.

use sntpx::server::ServerSettings;
use sntpx::{
    ClientSettings, DiscoverySettings, NtpContext, PollTimer, StdTimestampGen,
};
use sntpx_net_std::{client_socket, server_socket};

use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

fn spawn_server() -> SocketAddr {
    let socket = server_socket(0).expect("unable to bind server socket");
    let addr = SocketAddr::from(([127, 0, 0, 1], socket.local_addr().unwrap().port()));

    thread::spawn(move || {
        let context = NtpContext::new(StdTimestampGen::default());
        let settings = ServerSettings::default();

        loop {
            if sntpx::sync::serve_once(&socket, context, &settings).is_err() {
                break;
            }
        }
    });

    addr
}

#[test]
fn unicast_exchange_over_loopback() {
    let server_addr = spawn_server();
    let socket = client_socket(Duration::from_secs(2)).unwrap();
    let context = NtpContext::new(StdTimestampGen::default());
    let settings = ClientSettings::default();
    let mut timer = PollTimer::new(0);

    let result = sntpx::sync::unicast_request(
        server_addr,
        &socket,
        context,
        &settings,
        &mut timer,
    )
    .expect("exchange against the local server must succeed");

    assert_eq!(result.stratum, 1);
    // both clocks are the same system clock, so the offset is tiny
    assert!(result.offset.abs() < 1.0);
    assert!(result.error_bound >= 0.0);
}

#[test]
fn single_shot_exchange_over_loopback() {
    let server_addr = spawn_server();
    let socket = client_socket(Duration::from_secs(2)).unwrap();
    let context = NtpContext::new(StdTimestampGen::default());

    let result = sntpx::sync::get_time(server_addr, &socket, context)
        .expect("exchange against the local server must succeed");

    assert_eq!(result.stratum, 1);
}

#[test]
fn discovery_finds_loopback_server() {
    // discovery only needs an address replies come back from, so a unicast
    // loopback server stands in for a multicast group here
    let server_addr = spawn_server();
    let socket = client_socket(Duration::from_millis(200)).unwrap();
    let context = NtpContext::new(StdTimestampGen::default());
    let settings = DiscoverySettings { wait_time: 1 };

    let servers =
        sntpx::sync::discover(server_addr, &socket, context, &settings)
            .expect("the local server must be discovered");

    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].address, server_addr);
    assert!(servers[0].name.is_none());
}

#[test]
fn retries_exhaust_against_silent_peer() {
    // a bound socket nobody serves on
    let silent = client_socket(Duration::from_millis(100)).unwrap();
    let silent_addr =
        SocketAddr::from(([127, 0, 0, 1], silent.local_addr().unwrap().port()));

    let socket = client_socket(Duration::from_millis(100)).unwrap();
    let context = NtpContext::new(StdTimestampGen::default());
    let settings = ClientSettings {
        max_unicast_retries: 1,
        poll_wait: 0,
    };
    let mut timer = PollTimer::new(0);

    let result = sntpx::sync::unicast_request(
        silent_addr,
        &socket,
        context,
        &settings,
        &mut timer,
    );

    assert_eq!(result.unwrap_err(), sntpx::Error::MaxRetriesExceeded);
}
