//! Reply sanity checks.
//!
//! Every reply a client engine accepts goes through [`check_reply`] first.
//! The checks are the RFC 4330 recommendations for a unicast client, applied
//! in a fixed order with the first violated rule reported; the functions are
//! pure so the engines decide what to log and whether to retry.

use crate::types::{
    mode, version, Error, NtpPacket, NtpTimestamp, Result, SendRequestResult,
};

/// Stratum values a synchronized server may report
const STRATUM_RANGE: core::ops::RangeInclusive<u8> = 1..=15;

/// Validate a reply against the request it should answer.
///
/// Checks run in order and fail fast:
/// 1. the reply's originate timestamp echoes the request's transmit
///    timestamp, binding the reply to exactly this request;
/// 2. stratum is within `1..=15` (0 and 16+ mean unsynchronized);
/// 3. the transmit timestamp is set (an all-zero value means the server
///    clock never left its reset state);
/// 4. the reply mode is server (4);
/// 5. the server echoed the client's protocol version.
///
/// # Errors
///
/// The [`Error`] variant naming the first violated rule
pub fn check_reply(request: &NtpPacket, reply: &NtpPacket) -> Result<()> {
    check_reply_fields(
        request.transmit_timestamp,
        request.li_vn_mode,
        reply,
    )
}

/// Same checks for an engine that only kept [`SendRequestResult`] around
pub(crate) fn check_reply_for(
    send_req_result: &SendRequestResult,
    reply: &NtpPacket,
) -> Result<()> {
    check_reply_fields(
        send_req_result.transmit_timestamp,
        send_req_result.li_vn_mode,
        reply,
    )
}

fn check_reply_fields(
    request_transmit: NtpTimestamp,
    request_li_vn_mode: u8,
    reply: &NtpPacket,
) -> Result<()> {
    if reply.originate_timestamp != request_transmit {
        return Err(Error::IncorrectOriginTimestamp);
    }

    if !STRATUM_RANGE.contains(&reply.stratum) {
        return Err(Error::IncorrectStratum);
    }

    if reply.transmit_timestamp.is_zero() {
        return Err(Error::ZeroTransmitTimestamp);
    }

    if mode(reply.li_vn_mode) != NtpPacket::MODE_SERVER {
        return Err(Error::IncorrectMode);
    }

    if version(request_li_vn_mode) != version(reply.li_vn_mode) {
        return Err(Error::IncorrectResponseVersion);
    }

    Ok(())
}
