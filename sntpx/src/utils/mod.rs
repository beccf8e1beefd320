//! Helper utils to print query results and synchronize system time
//!
//! Currently Unix based systems are supported for the time sync part

use chrono::{Local, TimeZone, Utc};
#[cfg(feature = "log")]
use log::debug;

use crate::{NtpResult, ServerInfo, WallClockTime};

#[cfg(unix)]
use unix::sync_time;

#[cfg(unix)]
mod unix;

/// Render a wall-clock value as `YYYY-MM-DD HH:MM:SS.ssssss` in UTC.
///
/// Values `chrono` cannot represent fall back to raw seconds.microseconds
#[must_use]
pub fn format_wallclock(time: WallClockTime) -> String {
    match Utc.timestamp_opt(time.seconds, 0).single() {
        Some(utc) => format!(
            "{}.{:06}",
            utc.format("%Y-%m-%d %H:%M:%S"),
            time.microseconds
        ),
        None => format!("{}.{:06}", time.seconds, time.microseconds),
    }
}

/// One-line report of a completed exchange: server time, offset, error
/// bound, server identity and stratum
#[must_use]
pub fn format_result(result: &NtpResult, server: &ServerInfo) -> String {
    let mut line = format!(
        "{} (+0000) {:+.6} +/- {:.6} ",
        format_wallclock(result.transmit_time()),
        result.offset,
        result.error_bound
    );

    if let Some(name) = &server.name {
        line.push_str(name);
        line.push(' ');
    }

    line.push_str(&format!("{} s{}", server.address, result.stratum));

    line
}

/// Set up system time based on a corrected wall-clock value,
/// e.g. the local clock plus the offset a query reported
pub fn update_system_time(time: WallClockTime) {
    let utc = Utc.timestamp_opt(
        time.seconds,
        time.microseconds.saturating_mul(1_000),
    );

    if let Some(utc) = utc.single() {
        let local_time = utc.with_timezone(&Local);
        #[cfg(feature = "log")]
        debug!("setting system time to {}", local_time);

        #[cfg(unix)]
        sync_time(local_time);
        #[cfg(not(unix))]
        let _ = local_time;
    }
}

#[cfg(test)]
mod utils_tests {
    use super::{format_result, format_wallclock};
    use crate::net::SocketAddr;
    use crate::{
        CoreTimestamps, NtpResult, ServerInfo, WallClockTime,
    };

    #[test]
    fn test_format_wallclock() {
        assert_eq!(
            format_wallclock(WallClockTime::new(0, 0)),
            "1970-01-01 00:00:00.000000"
        );
        assert_eq!(
            format_wallclock(WallClockTime::new(1_700_000_000, 123_456)),
            "2023-11-14 22:13:20.123456"
        );
    }

    #[test]
    fn test_format_result() {
        let t = WallClockTime::new(1_700_000_000, 0);
        let result = NtpResult {
            timestamps: CoreTimestamps {
                originate: t,
                receive: t,
                transmit: t,
                destination: t,
            },
            offset: 0.45,
            error_bound: 0.1,
            stratum: 2,
            precision: -20,
        };
        let address: SocketAddr = "10.0.0.1:123".parse().unwrap();
        let server = ServerInfo {
            name: Some(String::from("time.example.org")),
            address,
        };

        assert_eq!(
            format_result(&result, &server),
            "2023-11-14 22:13:20.000000 (+0000) +0.450000 +/- 0.100000 \
             time.example.org 10.0.0.1:123 s2"
        );
    }

    #[test]
    fn test_format_result_without_name() {
        let t = WallClockTime::new(0, 0);
        let result = NtpResult {
            timestamps: CoreTimestamps {
                originate: t,
                receive: t,
                transmit: t,
                destination: t,
            },
            offset: -0.25,
            error_bound: 0.0,
            stratum: 1,
            precision: -20,
        };
        let address: SocketAddr = "10.0.0.2:123".parse().unwrap();
        let server = ServerInfo {
            name: None,
            address,
        };

        assert_eq!(
            format_result(&result, &server),
            "1970-01-01 00:00:00.000000 (+0000) -0.250000 +/- 0.000000 \
             10.0.0.2:123 s1"
        );
    }
}
