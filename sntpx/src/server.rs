//! SNTP server engine.
//!
//! The server answers well-formed client requests on a socket the caller
//! binds and configures. Anything that is not a client request is discarded
//! without a reply, so a malformed or hostile datagram never produces
//! traffic. [`handle_request`] is the pure request-to-reply step;
//! [`serve_once`] and [`serve`] wrap it with socket I/O.

use crate::types::{
    mode, version, NtpContext, NtpPacket, NtpTimestamp, NtpTimestampGenerator,
    NtpUdpSocket, Result, WallClockTime, RECV_BUFFER_SIZE, VERSION_SHIFT,
};

#[cfg(feature = "log")]
use log::debug;

/// Server engine tunables
#[derive(Debug, Copy, Clone)]
pub struct ServerSettings {
    /// Stratum advertised in replies
    pub stratum: u8,
    /// Clock precision advertised in replies, as log2 seconds
    pub precision: i8,
}

impl Default for ServerSettings {
    fn default() -> Self {
        // primary server with a microsecond-resolution clock
        ServerSettings {
            stratum: 1,
            precision: -20,
        }
    }
}

/// Build the reply for one client request, or `None` when the request must
/// be discarded.
///
/// A request is answered only when its mode is client (3) and its version is
/// within `1..=4`. The reply echoes the request's version and poll, copies
/// the request's transmit timestamp into the originate field and stamps
/// `arrival` as the receive timestamp. The transmit timestamp is taken from
/// the generator last, immediately before the reply is handed back for
/// sending.
pub fn handle_request<T: NtpTimestampGenerator>(
    request: &NtpPacket,
    arrival: WallClockTime,
    timestamp_gen: &mut T,
    settings: &ServerSettings,
) -> Option<NtpPacket> {
    if mode(request.li_vn_mode) != NtpPacket::MODE_CLIENT {
        #[cfg(feature = "log")]
        debug!("discarding request with mode {}", mode(request.li_vn_mode));
        return None;
    }

    let req_version = version(request.li_vn_mode);
    if !(1..=NtpPacket::VERSION).contains(&req_version) {
        #[cfg(feature = "log")]
        debug!("discarding request with version {}", req_version);
        return None;
    }

    let receive_timestamp = NtpTimestamp::from_wallclock(arrival);

    timestamp_gen.init();
    let transmit_timestamp =
        NtpTimestamp::from_wallclock(WallClockTime::now(timestamp_gen));

    Some(NtpPacket {
        li_vn_mode: (req_version << VERSION_SHIFT) | NtpPacket::MODE_SERVER,
        stratum: settings.stratum,
        poll: request.poll,
        precision: settings.precision,
        root_delay: 0,
        root_dispersion: 0,
        reference_identifier: 0,
        reference_timestamp: NtpTimestamp::default(),
        originate_timestamp: request.transmit_timestamp,
        receive_timestamp,
        transmit_timestamp,
    })
}

/// Receive one datagram on `socket` and answer it if it holds a valid
/// client request.
///
/// The arrival time is stamped as soon as the datagram is read. Truncated
/// datagrams and requests [`handle_request`] rejects are dropped silently;
/// the call still returns `Ok(())` since the server made progress.
///
/// # Errors
///
/// Returns `Err` when receiving on the socket fails or when sending the
/// reply fails.
pub async fn serve_once<U, T>(
    socket: &U,
    mut context: NtpContext<T>,
    settings: &ServerSettings,
) -> Result<()>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator,
{
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let (size, src) = socket.recv_from(buf.as_mut()).await?;
    context.timestamp_gen.init();
    let arrival = WallClockTime::now(&context.timestamp_gen);

    let request = match NtpPacket::from_bytes(&buf[..size]) {
        Ok(packet) => packet,
        Err(_) => {
            #[cfg(feature = "log")]
            debug!("discarding short datagram from {:?}", src);
            return Ok(());
        }
    };

    let reply = match handle_request(
        &request,
        arrival,
        &mut context.timestamp_gen,
        settings,
    ) {
        Some(reply) => reply,
        None => return Ok(()),
    };

    crate::send_request(src, &reply, socket).await?;
    #[cfg(feature = "log")]
    debug!("answered {:?}", src);

    Ok(())
}

/// Serve requests on `socket` forever.
///
/// Per-datagram errors (e.g. a read timeout configured on the socket, or a
/// failed reply send) are logged and the loop keeps going.
///
/// # Errors
///
/// The loop never ends on its own; the `Result` return keeps the signature
/// uniform with the other engine entry points.
pub async fn serve<U, T>(
    socket: &U,
    context: NtpContext<T>,
    settings: &ServerSettings,
) -> Result<()>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator + Copy,
{
    loop {
        if let Err(_e) = serve_once(socket, context, settings).await {
            #[cfg(feature = "log")]
            debug!("serve_once failed: {:?}", _e);
        }
    }
}
