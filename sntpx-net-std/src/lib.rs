//! Standard library socket helpers for the [`sntpx`] SNTP library.
//!
//! The `sntpx` engines speak to the network through the [`NtpUdpSocket`]
//! trait and leave socket setup to the caller. This crate covers the setup
//! for `std` environments: bounded-timeout client sockets, multicast
//! sockets for manycast discovery, reusable server sockets and hostname
//! resolution into [`ServerInfo`].
//!
//! # Example
//!
//! ```ignore
//! use sntpx::{sync::get_time, NtpContext, StdTimestampGen};
//! use sntpx_net_std::{client_socket, resolve};
//! use std::time::Duration;
//!
//! let server = resolve("pool.ntp.org", 123).expect("Unable to resolve host");
//! let socket = client_socket(Duration::from_secs(5)).expect("Unable to create UDP socket");
//! let context = NtpContext::new(StdTimestampGen::default());
//!
//! match get_time(server.address, &socket, context) {
//!     Ok(result) => println!("offset: {:.6} s", result.offset),
//!     Err(e) => eprintln!("Failed to get time: {e}"),
//! }
//! ```

use sntpx::{Error, Result, ServerInfo};

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

#[doc(hidden)]
pub use sntpx::NtpUdpSocket;

/// Create a UDP socket for unicast client exchanges.
///
/// The socket is bound to an ephemeral port on all interfaces and carries
/// `recv_timeout` as its read timeout, which bounds how long one exchange
/// attempt of the client engine can block.
///
/// # Errors
///
/// Returns [`Error::Network`] when the socket cannot be created or
/// configured.
pub fn client_socket(recv_timeout: Duration) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
        .map_err(|_| Error::Network)?;
    socket
        .set_read_timeout(Some(recv_timeout))
        .map_err(|_| Error::Network)?;

    Ok(socket)
}

/// Create a UDP socket for manycast discovery on an IPv4 group.
///
/// The socket is bound to an ephemeral port, its read timeout is set to
/// `recv_timeout` so the discovery window keeps making progress on a silent
/// group, and outgoing multicast datagrams carry the given `ttl`.
///
/// # Errors
///
/// Returns [`Error::Network`] when the socket cannot be created or
/// configured.
pub fn multicast_socket(recv_timeout: Duration, ttl: u32) -> Result<UdpSocket> {
    let socket = client_socket(recv_timeout)?;
    socket.set_multicast_ttl_v4(ttl).map_err(|_| Error::Network)?;

    Ok(socket)
}

/// Create a UDP socket for serving requests on `port`.
///
/// `SO_REUSEADDR` is set before binding so a restarted server can reclaim
/// the port while old sockets linger.
///
/// # Errors
///
/// Returns [`Error::Network`] when the socket cannot be created, configured
/// or bound.
pub fn server_socket(port: u16) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|_| Error::Network)?;
    socket.set_reuse_address(true).map_err(|_| Error::Network)?;

    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&bind_addr.into()).map_err(|_| Error::Network)?;

    Ok(socket.into())
}

/// Join `socket` to an IPv4 multicast group on all interfaces, so a server
/// can answer manycast discovery requests sent to the group.
///
/// # Errors
///
/// Returns [`Error::Network`] when the group cannot be joined, e.g. for a
/// non-multicast address.
pub fn join_multicast_group(socket: &UdpSocket, group: Ipv4Addr) -> Result<()> {
    socket
        .join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)
        .map_err(|_| Error::Network)
}

/// Resolve a server given as hostname or IP literal into a [`ServerInfo`].
///
/// The first address the resolver yields wins. For hostnames the name is
/// kept in the result for reporting; IP literals carry no name.
///
/// # Errors
///
/// Returns [`Error::AddressResolve`] when the host does not resolve to any
/// address.
pub fn resolve(host: &str, port: u16) -> Result<ServerInfo> {
    let address = (host, port)
        .to_socket_addrs()
        .map_err(|_| Error::AddressResolve)?
        .next()
        .ok_or(Error::AddressResolve)?;

    let name = if host.parse::<IpAddr>().is_ok() {
        None
    } else {
        Some(host.to_string())
    };

    Ok(ServerInfo { name, address })
}
