//! Clock offset and error bound arithmetic.
//!
//! The standard NTP formulas over the four protocol timestamps, evaluated on
//! `f64` fractional seconds. No filtering or clock selection happens here;
//! per-sample values are exposed so callers can aggregate across exchanges
//! (see [`crate::SampleStats`]).

use crate::types::CoreTimestamps;

/// System clock offset in seconds:
/// `theta = ((T2 - T1) + (T3 - T4)) / 2`
///
/// where T1 is the client transmit (originate), T2 the server receive, T3
/// the server transmit and T4 the client receive (destination) time
#[must_use]
pub fn clock_offset(ts: &CoreTimestamps) -> f64 {
    let t1 = ts.originate.as_secs_f64();
    let t2 = ts.receive.as_secs_f64();
    let t3 = ts.transmit.as_secs_f64();
    let t4 = ts.destination.as_secs_f64();

    ((t2 - t1) + (t3 - t4)) / 2.0
}

/// Round-trip delay in seconds, the maximum error of the offset estimate:
/// `delta = (T4 - T1) - (T3 - T2)`
#[must_use]
pub fn error_bound(ts: &CoreTimestamps) -> f64 {
    let t1 = ts.originate.as_secs_f64();
    let t2 = ts.receive.as_secs_f64();
    let t3 = ts.transmit.as_secs_f64();
    let t4 = ts.destination.as_secs_f64();

    (t4 - t1) - (t3 - t2)
}

#[cfg(test)]
mod offset_tests {
    use super::{clock_offset, error_bound};
    use crate::types::{CoreTimestamps, WallClockTime};

    fn timestamps(t1: f64, t2: f64, t3: f64, t4: f64) -> CoreTimestamps {
        let split = |t: f64| {
            let seconds = t as i64;
            let microseconds = ((t - seconds as f64) * 1e6).round() as u32;
            WallClockTime::new(seconds, microseconds)
        };

        CoreTimestamps {
            originate: split(t1),
            receive: split(t2),
            transmit: split(t3),
            destination: split(t4),
        }
    }

    #[test]
    fn test_offset_and_error_bound() {
        let ts = timestamps(1000.0, 1000.5, 1000.6, 1000.2);

        assert!((clock_offset(&ts) - 0.45).abs() < 1e-9);
        assert!((error_bound(&ts) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_exchange_has_zero_offset() {
        // equal path delays, server in sync with the client
        let ts = timestamps(1000.0, 1000.1, 1000.1, 1000.2);

        assert!(clock_offset(&ts).abs() < 1e-9);
        assert!((error_bound(&ts) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_server_behind_client_gives_negative_offset() {
        let ts = timestamps(2000.0, 1999.6, 1999.7, 2000.1);

        assert!((clock_offset(&ts) + 0.4).abs() < 1e-9);
        assert!((error_bound(&ts) - 0.0).abs() < 1e-9);
    }
}
