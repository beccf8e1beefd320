//! Rust SNTP client and server
//!
//! # Overview
//!
//! This crate implements the unicast, manycast and server modes of
//! [SNTPv4 (RFC 4330)](https://datatracker.ietf.org/doc/html/rfc4330).
//! It can query an NTP server for the local clock offset, discover
//! servers on a multicast group and answer client requests itself.
//!
//! # Usage
//!
//! Put this in your `Cargo.toml`:
//! ```cargo
//! [dependencies]
//! sntpx = "0.1"
//! ```
//!
//! ## Features
//!
//! `sntpx` supports several features:
//! - `std`: includes functionality that depends on the standard library
//! - `sync`: enables synchronous interface
//! - `utils`: includes OS specific helpers for printing and applying results
//! - `log`: enables library debug output during execution
//! - `std-socket`: add `NtpUdpSocket` trait implementation for `std::net::UdpSocket`
//! - `tokio-socket`: add `NtpUdpSocket` trait implementation for `tokio::net::UdpSocket`
//!
//! # Details
//!
//! There are multiple approaches how the library can be used:
//! - [`unicast_request`] runs the full retry loop against a single server,
//!   respecting the minimum interval between polls
//! - [`get_time`] performs a single request-response exchange and
//!   encapsulates network I/O
//! - under environments where there are no options to perform I/O operations
//!   within a single call, [`sntp_send_request`] and [`sntp_process_response`]
//!   can be used
//! - [`discovery::discover`] collects servers answering on a multicast group
//! - [`server::serve`] answers client requests on a bound socket
//!
//! As `sntpx` supports `no_std` environment as well, it provides a set of
//! traits to implement for a network object and a timestamp source:
//! - [`NtpUdpSocket`] should be implemented for `UdpSocket`-like objects for
//!   the library to be able to send and receive data
//! - [`NtpTimestampGenerator`] should be implemented for timestamp generator
//!   objects to provide the library with system related timestamps
//!
//! ## Logging support
//!
//! Library debug logs can be enabled in executables by enabling the `log`
//! feature. Server addresses and response payloads will be printed.
//!
//! # Example
//!
//! ```rust,ignore
//! use sntpx::{ClientSettings, NtpContext, PollTimer, StdTimestampGen};
//! use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
//!
//! let socket = UdpSocket::bind("0.0.0.0:0").expect("Unable to create UDP socket");
//! socket
//!     .set_read_timeout(Some(std::time::Duration::from_secs(5)))
//!     .expect("Unable to set read timeout");
//! let context = NtpContext::new(StdTimestampGen::default());
//! let settings = ClientSettings::default();
//! let mut timer = PollTimer::new(settings.poll_wait);
//! let server_addr: SocketAddr = "time.google.com:123"
//!     .to_socket_addrs()
//!     .expect("Unable to resolve host")
//!     .next()
//!     .unwrap();
//!
//! match sntpx::sync::unicast_request(server_addr, &socket, context, &settings, &mut timer) {
//!     Ok(result) => println!("offset {:.6} +/- {:.6}", result.offset, result.error_bound),
//!     Err(err) => eprintln!("Error: {err}"),
//! }
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "utils")]
pub mod utils;

#[cfg(feature = "std")]
pub mod discovery;
pub mod server;

mod offset;
mod socket;
mod types;
mod validate;

pub use crate::offset::{clock_offset, error_bound};
pub use crate::types::*;
pub use crate::validate::check_reply;

/// Network types used by the `sntpx` crate
pub mod net {
    pub use core::net::SocketAddr;

    #[cfg(feature = "std")]
    pub use std::net::UdpSocket;
}

#[cfg(feature = "log")]
use log::debug;

/// Retrieves the current time from an NTP server.
///
/// This asynchronous function performs a single SNTP exchange: it sends one
/// request to the specified NTP server and processes the server's response,
/// calculating the local clock offset and its error bound.
///
/// For the full client behaviour with retries and poll-interval pacing, see
/// [`unicast_request`].
///
/// # Arguments
///
/// * `addr` - The socket address (`SocketAddr`) of the NTP server.
/// * `socket` - A reference to an object implementing the [`NtpUdpSocket`]
///   trait that allows sending/receiving UDP packets.
/// * `context` - An SNTP context (`NtpContext<T>`) containing a timestamp
///   generator that implements the [`NtpTimestampGenerator`] trait.
///
/// # Errors
///
/// This function returns an `Err` in any of the following cases:
/// * The SNTP packet could not be sent to the server.
/// * The response payload is invalid or fails one of the sanity checks.
/// * Mismatch between the expected and actual server addresses.
pub async fn get_time<U, T>(
    addr: net::SocketAddr,
    socket: &U,
    context: NtpContext<T>,
) -> Result<NtpResult>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator + Copy,
{
    let result = sntp_send_request(addr, socket, context).await?;

    sntp_process_response(addr, socket, context, result).await
}

/// Sends an SNTP request to an NTP server.
///
/// This function builds a client request packet stamped with the current time
/// taken from the context's timestamp generator and sends it to the given NTP
/// server via the provided UDP socket. The returned [`SendRequestResult`]
/// holds the data needed to validate the matching response.
///
/// # Errors
///
/// Returns `Err` if the SNTP packet fails to send to the provided address.
pub async fn sntp_send_request<U, T>(
    dest: net::SocketAddr,
    socket: &U,
    mut context: NtpContext<T>,
) -> Result<SendRequestResult>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator,
{
    #[cfg(feature = "log")]
    debug!("send request - Address: {:?}", dest);
    let request = NtpPacket::client_request(&mut context.timestamp_gen);

    send_request(dest, &request, socket).await?;
    Ok(SendRequestResult::from(&request))
}

/// Processes the response from an NTP server.
///
/// This function receives a single datagram, checks that it comes from the
/// expected server, runs the reply sanity checks and calculates the clock
/// offset and error bound from the four timestamps of the exchange.
///
/// # Arguments
///
/// * `dest` - The expected socket address (`SocketAddr`) of the NTP server.
/// * `socket` - A reference to an object implementing the [`NtpUdpSocket`]
///   trait used for receiving the response.
/// * `context` - An SNTP context (`NtpContext<T>`) whose timestamp generator
///   stamps the arrival time of the response.
/// * `send_req_result` - The result of the previously sent request.
///
/// # Errors
///
/// This function returns an `Err` in any of the following situations:
/// * The source address of the response does not match the server address
///   used for the request.
/// * The response is shorter than an SNTP packet.
/// * The response fails one of the reply sanity checks.
pub async fn sntp_process_response<U, T>(
    dest: net::SocketAddr,
    socket: &U,
    mut context: NtpContext<T>,
    send_req_result: SendRequestResult,
) -> Result<NtpResult>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator,
{
    let mut response_buf = [0u8; RECV_BUFFER_SIZE];
    let (response, src) = socket.recv_from(response_buf.as_mut()).await?;
    context.timestamp_gen.init();
    let destination = WallClockTime::now(&context.timestamp_gen);
    #[cfg(feature = "log")]
    debug!("Response: {} bytes", response);

    if dest != src {
        return Err(Error::ResponseAddressMismatch);
    }

    let reply = NtpPacket::from_bytes(&response_buf[..response])?;
    let result = process_reply(&send_req_result, &reply, destination);

    #[cfg(feature = "log")]
    if let Ok(r) = &result {
        debug!("{:?}", r);
    }

    result
}

/// Queries an NTP server with retries and poll-interval pacing.
///
/// A fresh request packet is stamped and sent for every attempt. An attempt
/// fails when the send fails, the socket read fails (e.g. the read timeout
/// elapses) or the received reply does not pass the sanity checks. Datagrams
/// arriving from an address other than `dest` are ignored without consuming
/// the attempt. The first accepted reply ends the loop.
///
/// At most `1 + settings.max_unicast_retries` requests are sent. Before each
/// request the `timer` is consulted so that the server is never polled more
/// often than once per `poll_wait` seconds; the same timer should be reused
/// across calls when polling periodically.
///
/// # Errors
///
/// Returns [`Error::MaxRetriesExceeded`] when every attempt failed.
pub async fn unicast_request<U, T>(
    dest: net::SocketAddr,
    socket: &U,
    mut context: NtpContext<T>,
    settings: &ClientSettings,
    timer: &mut PollTimer,
) -> Result<NtpResult>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator + Copy,
{
    let attempts = 1u32 + u32::from(settings.max_unicast_retries);

    for attempt in 0..attempts {
        timer.wait_ready(&mut context.timestamp_gen);

        let request = NtpPacket::client_request(&mut context.timestamp_gen);
        let send_req_result = SendRequestResult::from(&request);
        timer.mark(context.timestamp_gen.timestamp_sec());

        #[cfg(feature = "log")]
        debug!("attempt {}/{} - Address: {:?}", attempt + 1, attempts, dest);
        #[cfg(not(feature = "log"))]
        let _ = attempt;

        if send_request(dest, &request, socket).await.is_err() {
            #[cfg(feature = "log")]
            debug!("send failed, retrying");
            continue;
        }

        match recv_reply_from(dest, socket, &mut context).await {
            Ok((reply, destination)) => {
                match process_reply(&send_req_result, &reply, destination) {
                    Ok(result) => return Ok(result),
                    Err(_e) => {
                        #[cfg(feature = "log")]
                        debug!("reply rejected: {:?}", _e);
                    }
                }
            }
            Err(_e) => {
                #[cfg(feature = "log")]
                debug!("receive failed: {:?}", _e);
            }
        }
    }

    Err(Error::MaxRetriesExceeded)
}

/// Waits for a datagram from `dest`, skipping datagrams from other sources.
///
/// The destination timestamp is taken as soon as the datagram arrives.
async fn recv_reply_from<U, T>(
    dest: net::SocketAddr,
    socket: &U,
    context: &mut NtpContext<T>,
) -> Result<(NtpPacket, WallClockTime)>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator,
{
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        let (size, src) = socket.recv_from(buf.as_mut()).await?;
        context.timestamp_gen.init();
        let destination = WallClockTime::now(&context.timestamp_gen);

        if src != dest {
            #[cfg(feature = "log")]
            debug!("ignoring datagram from {:?}", src);
            continue;
        }

        let reply = NtpPacket::from_bytes(&buf[..size])?;

        return Ok((reply, destination));
    }
}

pub(crate) async fn send_request<U>(
    dest: net::SocketAddr,
    req: &NtpPacket,
    socket: &U,
) -> Result<()>
where
    U: NtpUdpSocket,
{
    let buf = req.to_bytes();

    match socket.send_to(&buf, dest).await {
        Ok(size) => {
            if size == buf.len() {
                Ok(())
            } else {
                Err(Error::Network)
            }
        }
        Err(_) => Err(Error::Network),
    }
}

fn process_reply(
    send_req_result: &SendRequestResult,
    reply: &NtpPacket,
    destination: WallClockTime,
) -> Result<NtpResult> {
    validate::check_reply_for(send_req_result, reply)?;

    let timestamps = CoreTimestamps::from_reply(reply, destination);
    let offset = clock_offset(&timestamps);
    let error_bound = crate::error_bound(&timestamps);

    #[cfg(feature = "log")]
    debug!("offset: {} s, error bound: {} s", offset, error_bound);

    Ok(NtpResult {
        timestamps,
        offset,
        error_bound,
        stratum: reply.stratum,
        precision: reply.precision,
    })
}

/// Synchronous interface for the SNTP client
#[cfg(feature = "sync")]
pub mod sync {
    use crate::net;
    use crate::types::{
        ClientSettings, NtpContext, NtpResult, NtpTimestampGenerator,
        NtpUdpSocket, PollTimer, Result, SendRequestResult,
    };

    use miniloop::executor::Executor;

    #[cfg(feature = "log")]
    use log::debug;

    /// Send a request to an NTP server and process the response in a single call
    ///
    /// May be useful under an environment with `std` networking implementation,
    /// where all network stuff is hidden within the system's kernel.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the SNTP request cannot be sent or the SNTP
    /// response fails validation
    pub fn get_time<U, T>(
        addr: net::SocketAddr,
        socket: &U,
        context: NtpContext<T>,
    ) -> Result<NtpResult>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        let result = sntp_send_request(addr, socket, context)?;
        #[cfg(feature = "log")]
        debug!("{:?}", result);

        sntp_process_response(addr, socket, context, result)
    }

    /// Synchronous wrapper for [`crate::unicast_request`]: queries an NTP
    /// server with retries and poll-interval pacing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MaxRetriesExceeded`] when every attempt failed.
    pub fn unicast_request<U, T>(
        dest: net::SocketAddr,
        socket: &U,
        context: NtpContext<T>,
        settings: &ClientSettings,
        timer: &mut PollTimer,
    ) -> Result<NtpResult>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        Executor::<1>::new().block_on(crate::unicast_request(
            dest, socket, context, settings, timer,
        ))
    }

    /// Synchronous wrapper for [`crate::sntp_send_request`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the underlying async SNTP request fails for any
    /// reason, such as a network failure.
    pub fn sntp_send_request<U, T>(
        dest: net::SocketAddr,
        socket: &U,
        context: NtpContext<T>,
    ) -> Result<SendRequestResult>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        Executor::<1>::new()
            .block_on(crate::sntp_send_request(dest, socket, context))
    }

    /// Synchronous wrapper for [`crate::sntp_process_response`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the underlying async SNTP response processing
    /// fails, such as an incorrect origin timestamp in the response, an
    /// invalid mode, a version mismatch or a network error.
    pub fn sntp_process_response<U, T>(
        dest: net::SocketAddr,
        socket: &U,
        context: NtpContext<T>,
        send_req_result: SendRequestResult,
    ) -> Result<NtpResult>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        Executor::<1>::new().block_on(crate::sntp_process_response(
            dest,
            socket,
            context,
            send_req_result,
        ))
    }

    /// Synchronous wrapper for [`crate::discovery::discover`]: collects NTP
    /// servers answering a request sent to a multicast group.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoServersFound`] when no valid reply arrived
    /// within the discovery window.
    #[cfg(feature = "std")]
    pub fn discover<U, T>(
        group_addr: net::SocketAddr,
        socket: &U,
        context: NtpContext<T>,
        settings: &crate::DiscoverySettings,
    ) -> Result<std::vec::Vec<crate::ServerInfo>>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        Executor::<1>::new().block_on(crate::discovery::discover(
            group_addr, socket, context, settings,
        ))
    }

    /// Synchronous wrapper for [`crate::server::serve_once`]: answers a
    /// single client request on the given socket.
    ///
    /// # Errors
    ///
    /// Returns an `Err` when receiving or sending on the socket fails.
    pub fn serve_once<U, T>(
        socket: &U,
        context: NtpContext<T>,
        settings: &crate::server::ServerSettings,
    ) -> Result<()>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        Executor::<1>::new()
            .block_on(crate::server::serve_once(socket, context, settings))
    }
}

#[cfg(all(test, feature = "std"))]
pub(crate) mod test_support {
    use crate::net::SocketAddr;
    use crate::types::{
        Error, NtpPacket, NtpTimestamp, NtpTimestampGenerator, NtpUdpSocket,
        Result,
    };
    use core::cell::RefCell;
    use core::net::{IpAddr, Ipv4Addr};
    use std::collections::VecDeque;
    use std::vec::Vec;

    pub const PEER: SocketAddr =
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 123);
    pub const STRANGER: SocketAddr =
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), 123);
    pub const OTHER_PEER: SocketAddr =
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)), 123);

    /// Deterministic clock that advances one second on every `init` call.
    #[derive(Copy, Clone)]
    pub struct StepGen {
        now: u64,
    }

    impl StepGen {
        pub fn new(start: u64) -> Self {
            Self { now: start }
        }
    }

    impl NtpTimestampGenerator for StepGen {
        fn init(&mut self) {
            self.now += 1;
        }

        fn timestamp_sec(&self) -> u64 {
            self.now
        }

        fn timestamp_subsec_micros(&self) -> u32 {
            0
        }
    }

    /// What the socket does on the next `recv_from` call.
    #[derive(Copy, Clone)]
    pub enum Step {
        /// Fail the read, as a socket read timeout would.
        Timeout,
        /// Deliver a well-formed reply from an unexpected source address.
        WrongSource,
        /// Deliver a datagram shorter than an SNTP packet.
        Garbage,
        /// Deliver a reply from `addr` after applying `tweak` to it.
        Reply {
            addr: SocketAddr,
            tweak: fn(&mut NtpPacket),
        },
    }

    impl Step {
        pub fn reply() -> Self {
            Step::Reply {
                addr: PEER,
                tweak: |_| {},
            }
        }

        pub fn reply_from(addr: SocketAddr) -> Self {
            Step::Reply { addr, tweak: |_| {} }
        }

        pub fn bad_reply(tweak: fn(&mut NtpPacket)) -> Self {
            Step::Reply { addr: PEER, tweak }
        }
    }

    /// Scripted socket for exercising the client engines without a network.
    pub struct TestSocket {
        pub sent: RefCell<Vec<Vec<u8>>>,
        script: RefCell<VecDeque<Step>>,
    }

    impl TestSocket {
        pub fn new(script: &[Step]) -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                script: RefCell::new(script.iter().copied().collect()),
            }
        }

        pub fn sent_count(&self) -> usize {
            self.sent.borrow().len()
        }

        fn reply_bytes(&self, tweak: fn(&mut NtpPacket)) -> [u8; 48] {
            let sent = self.sent.borrow();
            let last = sent.last().expect("no request sent yet");
            let request = NtpPacket::from_bytes(last).expect("bad request");
            let mut reply = reply_to(&request);
            tweak(&mut reply);
            reply.to_bytes()
        }
    }

    /// A plausible server answer to `request`: stratum 2, version echoed,
    /// originate copied from the request's transmit timestamp.
    pub fn reply_to(request: &NtpPacket) -> NtpPacket {
        let server_clock =
            NtpTimestamp::new(request.transmit_timestamp.seconds + 1, 0);

        NtpPacket {
            li_vn_mode: request.li_vn_mode & !0b111 | 4,
            stratum: 2,
            poll: request.poll,
            precision: -20,
            root_delay: 0,
            root_dispersion: 0,
            reference_identifier: 0,
            reference_timestamp: NtpTimestamp::default(),
            originate_timestamp: request.transmit_timestamp,
            receive_timestamp: server_clock,
            transmit_timestamp: server_clock,
        }
    }

    impl NtpUdpSocket for TestSocket {
        async fn send_to(
            &self,
            buf: &[u8],
            _addr: SocketAddr,
        ) -> Result<usize> {
            self.sent.borrow_mut().push(buf.to_vec());
            Ok(buf.len())
        }

        async fn recv_from(
            &self,
            buf: &mut [u8],
        ) -> Result<(usize, SocketAddr)> {
            let step = self
                .script
                .borrow_mut()
                .pop_front()
                .unwrap_or(Step::Timeout);

            match step {
                Step::Timeout => Err(Error::Network),
                Step::WrongSource => {
                    let bytes = self.reply_bytes(|_| {});
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok((bytes.len(), STRANGER))
                }
                Step::Garbage => {
                    buf[..10].copy_from_slice(&[0u8; 10]);
                    Ok((10, PEER))
                }
                Step::Reply { addr, tweak } => {
                    let bytes = self.reply_bytes(tweak);
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok((bytes.len(), addr))
                }
            }
        }
    }
}
