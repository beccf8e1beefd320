//! Manycast server discovery.
//!
//! One client request is sent to a multicast group address and every valid
//! reply arriving within a fixed window nominates its sender as a usable
//! server. Replies are held to the same sanity checks as unicast replies,
//! so a non-server datagram on the group never lands in the result. The
//! caller is expected to hand in a multicast-capable socket with a receive
//! timeout shorter than the window, otherwise a silent group can block the
//! window from closing.

use std::vec::Vec;

use crate::net::SocketAddr;
use crate::types::{
    DiscoverySettings, Error, NtpContext, NtpPacket, NtpTimestampGenerator,
    NtpUdpSocket, Result, SendRequestResult, ServerInfo, RECV_BUFFER_SIZE,
};
use crate::validate;

#[cfg(feature = "log")]
use log::debug;

/// Collect NTP servers answering a request sent to `group_addr`.
///
/// The reply collection window opens once the request is on the wire and
/// lasts `settings.wait_time` seconds, measured on the context's timestamp
/// generator. Each distinct source address passing validation is recorded
/// once; duplicate replies from the same address are ignored.
///
/// # Errors
///
/// * [`Error::Network`] when the group request cannot be sent.
/// * [`Error::NoServersFound`] when the window closes without a single
///   approved server.
pub async fn discover<U, T>(
    group_addr: SocketAddr,
    socket: &U,
    mut context: NtpContext<T>,
    settings: &DiscoverySettings,
) -> Result<Vec<ServerInfo>>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator + Copy,
{
    #[cfg(feature = "log")]
    debug!("discovery request - Group: {:?}", group_addr);

    let request = NtpPacket::client_request(&mut context.timestamp_gen);
    let send_req_result = SendRequestResult::from(&request);

    crate::send_request(group_addr, &request, socket).await?;

    context.timestamp_gen.init();
    let window_start = context.timestamp_gen.timestamp_sec();
    let mut approved: Vec<ServerInfo> = Vec::new();

    loop {
        context.timestamp_gen.init();
        let elapsed = context
            .timestamp_gen
            .timestamp_sec()
            .saturating_sub(window_start);
        if elapsed > u64::from(settings.wait_time) {
            break;
        }

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let (size, src) = match socket.recv_from(buf.as_mut()).await {
            Ok(received) => received,
            // receive timeout inside the window
            Err(_) => continue,
        };

        let reply = match NtpPacket::from_bytes(&buf[..size]) {
            Ok(packet) => packet,
            Err(_) => {
                #[cfg(feature = "log")]
                debug!("ignoring short datagram from {:?}", src);
                continue;
            }
        };

        if let Err(_e) = validate::check_reply_for(&send_req_result, &reply) {
            #[cfg(feature = "log")]
            debug!("rejecting reply from {:?}: {:?}", src, _e);
            continue;
        }

        if approved.iter().any(|server| server.address == src) {
            continue;
        }

        #[cfg(feature = "log")]
        debug!("approved server {:?}", src);
        approved.push(ServerInfo {
            name: None,
            address: src,
        });
    }

    if approved.is_empty() {
        return Err(Error::NoServersFound);
    }

    Ok(approved)
}
