use criterion::{criterion_group, criterion_main, Criterion};
use sntpx::{
    check_reply, clock_offset, error_bound, CoreTimestamps, NtpPacket,
    NtpTimestamp, WallClockTime,
};
use std::hint::black_box;

fn sample_exchange() -> (NtpPacket, NtpPacket, WallClockTime) {
    let transmit = NtpTimestamp::new(3_900_000_000, 0x8000_0000);
    let mut request = NtpPacket::from_bytes(&[0u8; 48]).unwrap();
    request.li_vn_mode = (4 << 3) | 3;
    request.transmit_timestamp = transmit;

    let mut reply = request;
    reply.li_vn_mode = (4 << 3) | 4;
    reply.stratum = 2;
    reply.originate_timestamp = transmit;
    reply.receive_timestamp = NtpTimestamp::new(3_900_000_001, 0);
    reply.transmit_timestamp = NtpTimestamp::new(3_900_000_001, 0x4000_0000);

    let destination = reply.transmit_timestamp.to_wallclock();
    (request, reply, destination)
}

fn criterion_benchmark(c: &mut Criterion) {
    let (request, reply, destination) = sample_exchange();
    let wire = reply.to_bytes();

    c.bench_function("packet_decode", |b| {
        b.iter(|| black_box(NtpPacket::from_bytes(black_box(&wire))));
    });

    c.bench_function("packet_encode", |b| {
        b.iter(|| black_box(black_box(&reply).to_bytes()));
    });

    c.bench_function("validate_and_compute", |b| {
        b.iter(|| {
            check_reply(black_box(&request), black_box(&reply)).unwrap();
            let timestamps = CoreTimestamps::from_reply(&reply, destination);
            black_box((clock_offset(&timestamps), error_bound(&timestamps)))
        });
    });
}

criterion_group!(codec_benches, criterion_benchmark);
criterion_main!(codec_benches);
