use core::fmt::Formatter;
use core::fmt::{Debug, Display};
use core::future::Future;

use crate::net::SocketAddr;

/// SNTP mode value bit mask
pub(crate) const MODE_MASK: u8 = 0b0000_0111;
/// SNTP version value bit mask
pub(crate) const VERSION_MASK: u8 = 0b0011_1000;
/// SNTP version bit mask shift value
pub(crate) const VERSION_SHIFT: u8 = 3;
/// SNTP LI (leap indicator) bit mask value
pub(crate) const LI_MASK: u8 = 0b1100_0000;
/// SNTP microseconds in second constant
pub(crate) const USEC_IN_SEC: u32 = 1_000_000;
/// Receive buffer size. Larger than the 48-byte base packet so replies
/// carrying extension fields are still accepted and the trailer ignored
pub(crate) const RECV_BUFFER_SIZE: usize = 200;

/// SNTP library result type
pub type Result<T> = core::result::Result<T, Error>;

/// Extract the mode sub-field (bits 0-2) from a packed LI/VN/Mode byte
#[must_use]
pub const fn mode(li_vn_mode: u8) -> u8 {
    li_vn_mode & MODE_MASK
}

/// Extract the version sub-field (bits 3-5) from a packed LI/VN/Mode byte
#[must_use]
pub const fn version(li_vn_mode: u8) -> u8 {
    (li_vn_mode & VERSION_MASK) >> VERSION_SHIFT
}

/// Extract the leap indicator sub-field (bits 6-7) from a packed LI/VN/Mode byte
#[must_use]
pub const fn leap_indicator(li_vn_mode: u8) -> u8 {
    (li_vn_mode & LI_MASK) >> 6
}

/// The error type for SNTP client and server operations
///
/// Errors originate on the network layer, while decoding a packet or while
/// validating a reply against the request it should answer
#[derive(Debug, PartialEq, Copy, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Originate timestamp in a reply differs from the transmit timestamp
    /// of the request, so the reply answers some other (or stale) request
    IncorrectOriginTimestamp,
    /// Reply stratum outside the valid `1..=15` range
    IncorrectStratum,
    /// Reply carries an all-zero transmit timestamp (unset server clock)
    ZeroTransmitTimestamp,
    /// Reply mode is not server (4)
    IncorrectMode,
    /// Reply protocol version does not match the request version
    IncorrectResponseVersion,
    /// Datagram shorter than the 48-byte SNTP packet
    Truncated,
    /// Network error occurred (send/receive failure or receive timeout)
    Network,
    /// A NTP server address can not be resolved
    AddressResolve,
    /// A reply has been received from an address other than the one the
    /// request was sent to
    ResponseAddressMismatch,
    /// The unicast retry limit has been exhausted without a valid reply
    MaxRetriesExceeded,
    /// Manycast discovery window closed without any approved server
    NoServersFound,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::IncorrectOriginTimestamp => {
                "originate timestamp does not match the request transmit timestamp"
            }
            Error::IncorrectStratum => "stratum outside the valid 1..=15 range",
            Error::ZeroTransmitTimestamp => "reply transmit timestamp is zero",
            Error::IncorrectMode => "reply mode is not server",
            Error::IncorrectResponseVersion => {
                "reply version does not match the request version"
            }
            Error::Truncated => "datagram shorter than an SNTP packet",
            Error::Network => "network send/receive failure",
            Error::AddressResolve => "server address can not be resolved",
            Error::ResponseAddressMismatch => {
                "reply received from an unexpected address"
            }
            Error::MaxRetriesExceeded => "unicast retry limit exhausted",
            Error::NoServersFound => "no servers approved during discovery",
        };

        write!(f, "{msg}")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// System wall-clock time since the UNIX epoch (1970-01-01T00:00:00Z)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WallClockTime {
    /// Whole seconds since the UNIX epoch
    pub seconds: i64,
    /// Fractional second in microseconds, `0..1_000_000`
    pub microseconds: u32,
}

impl WallClockTime {
    /// Create a wall-clock value from raw parts
    #[must_use]
    pub const fn new(seconds: i64, microseconds: u32) -> Self {
        WallClockTime {
            seconds,
            microseconds,
        }
    }

    /// Capture the current time from an initialized timestamp generator
    #[allow(clippy::cast_possible_wrap)]
    pub fn now<T: NtpTimestampGenerator>(timestamp_gen: &T) -> Self {
        WallClockTime {
            seconds: timestamp_gen.timestamp_sec() as i64,
            microseconds: timestamp_gen.timestamp_subsec_micros(),
        }
    }

    /// Time as fractional seconds, the form the offset arithmetic runs on
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + f64::from(self.microseconds) * 1e-6
    }
}

/// NTP fixed-point timestamp: seconds since the NTP epoch
/// (1900-01-01T00:00:00Z) plus a fractional second in units of 1/2^32 s
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct NtpTimestamp {
    pub seconds: u32,
    pub fraction: u32,
}

impl NtpTimestamp {
    /// Seconds between the NTP epoch (1900) and the UNIX epoch (1970),
    /// <https://www.rfc-editor.org/rfc/rfc5905>
    pub const UNIX_OFFSET: u32 = 2_208_988_800;

    /// Create a timestamp from raw parts
    #[must_use]
    pub const fn new(seconds: u32, fraction: u32) -> Self {
        NtpTimestamp { seconds, fraction }
    }

    /// Whether both fields are zero, which marks an unset timestamp on the wire
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.seconds == 0 && self.fraction == 0
    }

    /// Convert a wall-clock value into the NTP fixed-point representation.
    ///
    /// The fraction is `round(microseconds * 2^32 / 1e6)`; a rounding result
    /// of exactly 2^32 saturates into `seconds + 1` with a zero fraction
    /// instead of overflowing. Seconds wrap at the NTP era boundary.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_wallclock(w: WallClockTime) -> Self {
        let mut seconds =
            ((w.seconds + i64::from(Self::UNIX_OFFSET)) & 0xFFFF_FFFF) as u32;
        let fraction = ((u64::from(w.microseconds) << 32)
            + u64::from(USEC_IN_SEC) / 2)
            / u64::from(USEC_IN_SEC);

        if fraction > u64::from(u32::MAX) {
            seconds = seconds.wrapping_add(1);
            return NtpTimestamp {
                seconds,
                fraction: 0,
            };
        }

        NtpTimestamp {
            seconds,
            fraction: fraction as u32,
        }
    }

    /// Convert the timestamp into wall-clock time since the UNIX epoch.
    ///
    /// NTP seconds below [`Self::UNIX_OFFSET`] are interpreted as era 1
    /// values (after the 2036 rollover), so the conversion never produces a
    /// spurious negative UNIX time. Values outside any plausible sanity band
    /// are passed through unchanged; validation is the caller's concern.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_wallclock(self) -> WallClockTime {
        let mut seconds = if self.seconds >= Self::UNIX_OFFSET {
            i64::from(self.seconds) - i64::from(Self::UNIX_OFFSET)
        } else {
            // era 1: unwrap the 2^32 s rollover
            i64::from(self.seconds) + (1i64 << 32)
                - i64::from(Self::UNIX_OFFSET)
        };
        let mut microseconds = ((u64::from(self.fraction)
            * u64::from(USEC_IN_SEC)
            + (1u64 << 31))
            >> 32) as u32;

        if microseconds == USEC_IN_SEC {
            seconds += 1;
            microseconds = 0;
        }

        WallClockTime {
            seconds,
            microseconds,
        }
    }
}

/// SNTP packet, the 48-byte request/reply wire entity
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NtpPacket {
    /// Packed leap indicator (bits 6-7), version (bits 3-5), mode (bits 0-2)
    pub li_vn_mode: u8,
    pub stratum: u8,
    /// Poll interval as log2 seconds
    pub poll: u8,
    /// Clock precision as signed log2 seconds
    pub precision: i8,
    pub root_delay: i32,
    pub root_dispersion: u32,
    pub reference_identifier: u32,
    pub reference_timestamp: NtpTimestamp,
    pub originate_timestamp: NtpTimestamp,
    pub receive_timestamp: NtpTimestamp,
    pub transmit_timestamp: NtpTimestamp,
}

impl NtpPacket {
    /// Exact on-wire packet size. Every send and receive goes through the
    /// codec, never through an ad hoc length literal
    pub const WIRE_SIZE: usize = 48;

    pub(crate) const MODE_CLIENT: u8 = 3;
    pub(crate) const MODE_SERVER: u8 = 4;
    pub(crate) const VERSION: u8 = 4;

    /// Build a client request: everything zeroed except version 4, mode 3
    /// and a transmit timestamp taken from the generator
    pub fn client_request<T: NtpTimestampGenerator>(
        timestamp_gen: &mut T,
    ) -> NtpPacket {
        timestamp_gen.init();
        let transmit_timestamp =
            NtpTimestamp::from_wallclock(WallClockTime::now(timestamp_gen));

        NtpPacket {
            li_vn_mode: (Self::VERSION << VERSION_SHIFT) | Self::MODE_CLIENT,
            stratum: 0,
            poll: 0,
            precision: 0,
            root_delay: 0,
            root_dispersion: 0,
            reference_identifier: 0,
            reference_timestamp: NtpTimestamp::default(),
            originate_timestamp: NtpTimestamp::default(),
            receive_timestamp: NtpTimestamp::default(),
            transmit_timestamp,
        }
    }

    /// Serialize to the 48-byte wire representation, big-endian fields in
    /// declaration order
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn to_bytes(&self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];

        buf[0] = self.li_vn_mode;
        buf[1] = self.stratum;
        buf[2] = self.poll;
        buf[3] = self.precision as u8;
        buf[4..8].copy_from_slice(&self.root_delay.to_be_bytes());
        buf[8..12].copy_from_slice(&self.root_dispersion.to_be_bytes());
        buf[12..16].copy_from_slice(&self.reference_identifier.to_be_bytes());
        put_timestamp(&mut buf[16..24], self.reference_timestamp);
        put_timestamp(&mut buf[24..32], self.originate_timestamp);
        put_timestamp(&mut buf[32..40], self.receive_timestamp);
        put_timestamp(&mut buf[40..48], self.transmit_timestamp);

        buf
    }

    /// Deserialize from a received datagram.
    ///
    /// Trailing bytes beyond offset 47 (extension fields) are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::Truncated`] when the buffer holds fewer than 48 bytes
    #[allow(clippy::cast_possible_wrap)]
    pub fn from_bytes(buf: &[u8]) -> Result<NtpPacket> {
        if buf.len() < Self::WIRE_SIZE {
            return Err(Error::Truncated);
        }

        let u32_at = |off: usize| {
            u32::from_be_bytes([
                buf[off],
                buf[off + 1],
                buf[off + 2],
                buf[off + 3],
            ])
        };
        let ts_at = |off: usize| NtpTimestamp {
            seconds: u32_at(off),
            fraction: u32_at(off + 4),
        };

        Ok(NtpPacket {
            li_vn_mode: buf[0],
            stratum: buf[1],
            poll: buf[2],
            precision: buf[3] as i8,
            root_delay: u32_at(4) as i32,
            root_dispersion: u32_at(8),
            reference_identifier: u32_at(12),
            reference_timestamp: ts_at(16),
            originate_timestamp: ts_at(24),
            receive_timestamp: ts_at(32),
            transmit_timestamp: ts_at(40),
        })
    }
}

fn put_timestamp(buf: &mut [u8], ts: NtpTimestamp) {
    buf[..4].copy_from_slice(&ts.seconds.to_be_bytes());
    buf[4..8].copy_from_slice(&ts.fraction.to_be_bytes());
}

/// The four protocol timestamps of one exchange in wall-clock form
///
/// T1 = originate (client transmit), T2 = receive (server), T3 = transmit
/// (server), T4 = destination (client receive)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CoreTimestamps {
    pub originate: WallClockTime,
    pub receive: WallClockTime,
    pub transmit: WallClockTime,
    pub destination: WallClockTime,
}

impl CoreTimestamps {
    /// Extract T1..T3 from a validated reply; T4 is supplied by the caller
    /// from the moment of datagram arrival
    #[must_use]
    pub fn from_reply(reply: &NtpPacket, destination: WallClockTime) -> Self {
        CoreTimestamps {
            originate: reply.originate_timestamp.to_wallclock(),
            receive: reply.receive_timestamp.to_wallclock(),
            transmit: reply.transmit_timestamp.to_wallclock(),
            destination,
        }
    }
}

/// Outcome of one successful unicast exchange
#[derive(Debug, Copy, Clone)]
pub struct NtpResult {
    /// The four protocol timestamps the derived values were computed from
    pub timestamps: CoreTimestamps,
    /// Clock offset in seconds, `((T2-T1) + (T3-T4)) / 2`
    pub offset: f64,
    /// Round-trip delay in seconds, `(T4-T1) - (T3-T2)`
    pub error_bound: f64,
    /// Clock stratum reported by the server
    pub stratum: u8,
    /// Server clock precision as log2 seconds, usually negative
    pub precision: i8,
}

impl NtpResult {
    /// Server time at the moment the reply was sent
    #[must_use]
    pub fn transmit_time(&self) -> WallClockTime {
        self.timestamps.transmit
    }

    /// Estimated difference between the server clock and the local clock
    /// in seconds
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Maximum error of the offset estimate (the round-trip delay) in seconds
    #[must_use]
    pub fn error_bound(&self) -> f64 {
        self.error_bound
    }

    #[must_use]
    pub fn stratum(&self) -> u8 {
        self.stratum
    }

    #[must_use]
    pub fn precision(&self) -> i8 {
        self.precision
    }
}

/// Client engine tunables for one logical peer
#[derive(Debug, Copy, Clone)]
pub struct ClientSettings {
    /// Failed attempts allowed beyond the first before the engine gives up
    pub max_unicast_retries: u8,
    /// Minimum number of seconds between requests to the same peer
    pub poll_wait: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            max_unicast_retries: 2,
            poll_wait: 15,
        }
    }
}

/// Discovery engine tunables
#[derive(Debug, Copy, Clone)]
pub struct DiscoverySettings {
    /// Reply collection window in seconds after the group request is sent
    pub wait_time: u32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        DiscoverySettings { wait_time: 5 }
    }
}

/// Identity of a remote peer. `name` is best-effort and may be absent,
/// e.g. for servers found through manycast discovery
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: Option<String>,
    pub address: SocketAddr,
}

/// Minimum poll interval gate, owned by the caller across repeated
/// invocations of the client engine.
///
/// The gate records when the last request left and refuses the next send
/// until `poll_wait` seconds have elapsed. The engine waits on it
/// cooperatively; async callers can consult [`PollTimer::earliest_next_send`]
/// and sleep on their own runtime before invoking the engine again.
#[derive(Debug, Copy, Clone)]
pub struct PollTimer {
    last_send: Option<u64>,
    poll_wait: u32,
}

impl PollTimer {
    /// Create a gate enforcing `poll_wait` seconds between sends
    #[must_use]
    pub const fn new(poll_wait: u32) -> Self {
        PollTimer {
            last_send: None,
            poll_wait,
        }
    }

    /// Whether a send is permitted at `now` (seconds since the UNIX epoch)
    #[must_use]
    pub fn ready(&self, now: u64) -> bool {
        match self.last_send {
            Some(last) => now.saturating_sub(last) >= u64::from(self.poll_wait),
            None => true,
        }
    }

    /// Earliest UNIX second the next send is permitted at, `None` if nothing
    /// has been sent yet
    #[must_use]
    pub fn earliest_next_send(&self) -> Option<u64> {
        self.last_send.map(|last| last + u64::from(self.poll_wait))
    }

    /// Record a send at `now`
    pub fn mark(&mut self, now: u64) {
        self.last_send = Some(now);
    }

    /// Spin on the timestamp generator until the gate opens.
    ///
    /// Seconds-granularity busy wait, matching the blocking single-exchange
    /// model; the first send passes straight through
    pub fn wait_ready<T: NtpTimestampGenerator>(&self, timestamp_gen: &mut T) {
        loop {
            timestamp_gen.init();
            if self.ready(timestamp_gen.timestamp_sec()) {
                return;
            }
            core::hint::spin_loop();
        }
    }
}

/// Caller-level accumulator for repeated time samples.
///
/// The engine reports per-sample offset and error bound; averaging across
/// independent exchanges is an aggregation the caller opts into
#[derive(Debug, Copy, Clone, Default)]
pub struct SampleStats {
    count: u32,
    offset_total: f64,
    error_bound_total: f64,
}

impl SampleStats {
    /// Fold one successful exchange into the running totals
    pub fn record(&mut self, result: &NtpResult) {
        self.count += 1;
        self.offset_total += result.offset;
        self.error_bound_total += result.error_bound;
    }

    /// Number of samples recorded so far
    #[must_use]
    pub fn len(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Arithmetic mean of the recorded offsets, `None` before the first sample
    #[must_use]
    pub fn offset_avg(&self) -> Option<f64> {
        (self.count > 0).then(|| self.offset_total / f64::from(self.count))
    }

    /// Arithmetic mean of the recorded error bounds
    #[must_use]
    pub fn error_bound_avg(&self) -> Option<f64> {
        (self.count > 0)
            .then(|| self.error_bound_total / f64::from(self.count))
    }
}

/// A trait encapsulating timestamp generator's operations
///
/// Under `no_std` environments a `now()` implementation may not be
/// available, so the library takes timestamps through this trait. All
/// timestamps are counted from the UNIX epoch "_1970-01-01 00:00:00 UTC_"
pub trait NtpTimestampGenerator {
    /// Capture `now`. Expected to be called every time before
    /// `timestamp_sec` and `timestamp_subsec_micros` usage
    fn init(&mut self);

    /// Returns timestamp in seconds since the UNIX epoch for the initialized
    /// generator
    fn timestamp_sec(&self) -> u64;

    /// Returns the fractional part of the timestamp in whole microseconds.
    /// That method **should not** return microseconds since the UNIX epoch
    fn timestamp_subsec_micros(&self) -> u32;
}

#[cfg(feature = "std")]
/// Supplementary module to implement boilerplate that environments with
/// `std` enabled have to re-implement otherwise
mod sup {
    use std::time::{Duration, SystemTime};

    use crate::NtpTimestampGenerator;

    /// Standard library timestamp generator wrapper type
    /// that relies on `std::time` to provide timestamps
    #[derive(Copy, Clone, Default)]
    pub struct StdTimestampGen {
        duration: Duration,
    }

    impl NtpTimestampGenerator for StdTimestampGen {
        fn init(&mut self) {
            self.duration = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap();
        }

        fn timestamp_sec(&self) -> u64 {
            self.duration.as_secs()
        }

        fn timestamp_subsec_micros(&self) -> u32 {
            self.duration.subsec_micros()
        }
    }
}

#[cfg(feature = "std")]
pub use sup::*;

/// A trait encapsulating the UDP socket interface required by the engines
pub trait NtpUdpSocket {
    /// Send the given buffer to the address provided. On success, returns
    /// the number of bytes written
    ///
    /// # Errors
    ///
    /// Will return `Err` if an underlying UDP send fails
    fn send_to(
        &self,
        buf: &[u8],
        addr: SocketAddr,
    ) -> impl Future<Output = Result<usize>>;

    /// Receive a single datagram on the socket. On success, returns the
    /// number of bytes read and the origin address.
    ///
    /// A bounded receive timeout configured on the underlying socket is the
    /// transport's responsibility; an elapsed timeout surfaces as an error
    ///
    /// # Errors
    ///
    /// Will return `Err` if an underlying UDP receive fails or times out
    fn recv_from(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<(usize, SocketAddr)>>;
}

/// Engine context bundling the objects an exchange needs besides the socket
#[derive(Copy, Clone)]
pub struct NtpContext<T: NtpTimestampGenerator> {
    pub timestamp_gen: T,
}

impl<T: NtpTimestampGenerator + Copy> NtpContext<T> {
    /// Create a context with the given timestamp generator
    pub fn new(timestamp_gen: T) -> Self {
        NtpContext { timestamp_gen }
    }
}

/// Preserve the request state needed while receiving and validating a reply
#[derive(Copy, Clone, Debug)]
pub struct SendRequestResult {
    pub(crate) transmit_timestamp: NtpTimestamp,
    pub(crate) li_vn_mode: u8,
}

impl From<&NtpPacket> for SendRequestResult {
    fn from(request: &NtpPacket) -> Self {
        SendRequestResult {
            transmit_timestamp: request.transmit_timestamp,
            li_vn_mode: request.li_vn_mode,
        }
    }
}


#[cfg(test)]
mod packet_codec_tests {
    use super::{
        leap_indicator, mode, version, Error, NtpPacket, NtpTimestamp,
    };
    #[cfg(feature = "std")]
    use super::StdTimestampGen;

    fn sample_packet() -> NtpPacket {
        NtpPacket {
            li_vn_mode: (4 << 3) | 4,
            stratum: 2,
            poll: 6,
            precision: -20,
            root_delay: 0x0000_1234,
            root_dispersion: 0x0000_0042,
            reference_identifier: u32::from_be_bytes(*b"GPS\0"),
            reference_timestamp: NtpTimestamp::new(0xDEAD_BEEF, 0x0102_0304),
            originate_timestamp: NtpTimestamp::new(0xE000_0001, 0x8000_0000),
            receive_timestamp: NtpTimestamp::new(0xE000_0002, 0x4000_0000),
            transmit_timestamp: NtpTimestamp::new(0xE000_0003, 0xC000_0000),
        }
    }

    #[test]
    fn test_packet_roundtrip() {
        let pkt = sample_packet();
        let bytes = pkt.to_bytes();

        assert_eq!(bytes.len(), NtpPacket::WIRE_SIZE);
        assert_eq!(NtpPacket::from_bytes(&bytes).unwrap(), pkt);
    }

    #[test]
    fn test_fields_are_big_endian_in_declaration_order() {
        let bytes = sample_packet().to_bytes();

        assert_eq!(bytes[0], (4 << 3) | 4);
        assert_eq!(bytes[1], 2);
        assert_eq!(bytes[2], 6);
        assert_eq!(bytes[3] as i8, -20);
        assert_eq!(&bytes[4..8], &0x0000_1234i32.to_be_bytes());
        assert_eq!(&bytes[12..16], b"GPS\0");
        // transmit timestamp occupies the trailing 8 bytes
        assert_eq!(&bytes[40..44], &0xE000_0003u32.to_be_bytes());
        assert_eq!(&bytes[44..48], &0xC000_0000u32.to_be_bytes());
    }

    #[test]
    fn test_truncated_buffer_rejected() {
        let bytes = sample_packet().to_bytes();

        assert_eq!(
            NtpPacket::from_bytes(&bytes[..47]),
            Err(Error::Truncated)
        );
        assert_eq!(NtpPacket::from_bytes(&[]), Err(Error::Truncated));
    }

    #[test]
    fn test_trailing_extension_bytes_ignored() {
        let pkt = sample_packet();
        let mut datagram = [0u8; 68];
        datagram[..NtpPacket::WIRE_SIZE].copy_from_slice(&pkt.to_bytes());
        datagram[NtpPacket::WIRE_SIZE..].fill(0xAB);

        assert_eq!(NtpPacket::from_bytes(&datagram).unwrap(), pkt);
    }

    #[test]
    fn test_mode_version_bit_extraction() {
        for vn in 0..8u8 {
            for m in 0..8u8 {
                let byte = (vn << 3) | m;
                assert_eq!(mode(byte), m);
                assert_eq!(version(byte), vn);
                assert_eq!(leap_indicator(byte), 0);
            }
        }
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_client_request_shape() {
        let mut gen = StdTimestampGen::default();
        let request = NtpPacket::client_request(&mut gen);

        assert_eq!(request.li_vn_mode, (4 << 3) | 3);
        assert_eq!(mode(request.li_vn_mode), NtpPacket::MODE_CLIENT);
        assert_eq!(version(request.li_vn_mode), NtpPacket::VERSION);
        assert_eq!(leap_indicator(request.li_vn_mode), 0);
        assert_eq!(request.stratum, 0);
        assert!(request.originate_timestamp.is_zero());
        assert!(request.receive_timestamp.is_zero());
        assert!(!request.transmit_timestamp.is_zero());
    }
}
