//! Microbenchmarks for the SRTP frame codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ge_srtp::frame::{self, Frame};

fn bench_build_request(c: &mut Criterion) {
    c.bench_function("build_request", |b| {
        b.iter(|| {
            frame::build_request(
                black_box(42),
                black_box(0x04),
                black_box(0x08),
                black_box(100),
                black_box(4),
                black_box(1),
                &[],
            )
        })
    });
}

fn bench_parse_response(c: &mut Criterion) {
    // Maximum word read: 125 words of payload.
    let mut bytes = vec![0u8; frame::HEADER_SIZE];
    bytes[0] = frame::PACKET_TYPE_RESPONSE;
    bytes[31] = frame::MESSAGE_TYPE_ACK_WITH_DATA;
    bytes.extend(std::iter::repeat(0xA5).take(250));

    c.bench_function("parse_response_250b_payload", |b| {
        b.iter(|| Frame::parse_response(black_box(&bytes)).unwrap())
    });
}

fn bench_to_words(c: &mut Criterion) {
    let mut bytes = vec![0u8; frame::HEADER_SIZE];
    bytes[0] = frame::PACKET_TYPE_RESPONSE;
    bytes[31] = frame::MESSAGE_TYPE_ACK_WITH_DATA;
    bytes.extend(std::iter::repeat(0xA5).take(250));
    let parsed = Frame::parse_response(&bytes).unwrap();

    c.bench_function("to_words_125", |b| {
        b.iter(|| black_box(&parsed).to_words().unwrap())
    });
}

fn bench_to_bits(c: &mut Criterion) {
    let mut bytes = vec![0u8; frame::HEADER_SIZE];
    bytes[0] = frame::PACKET_TYPE_RESPONSE;
    bytes[31] = frame::MESSAGE_TYPE_ACK_WITH_DATA;
    bytes.extend(std::iter::repeat(0b0101_0101).take(8));
    let parsed = Frame::parse_response(&bytes).unwrap();

    c.bench_function("to_bits_64", |b| b.iter(|| black_box(&parsed).to_bits(64)));
}

criterion_group!(
    benches,
    bench_build_request,
    bench_parse_response,
    bench_to_words,
    bench_to_bits
);
criterion_main!(benches);
