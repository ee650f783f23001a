use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use segbuf::{Buffer, BufferOptions, Checksum, ChecksumKind, Endianness};

fn bench_sequential_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_write");

    for chunk in [16usize, 256, 4096].iter() {
        let total = 1 << 20;
        group.throughput(Throughput::Bytes(total as u64));
        group.bench_with_input(BenchmarkId::new("chunk_bytes", chunk), chunk, |b, &chunk| {
            let data = vec![0x5Au8; chunk];
            b.iter(|| {
                let mut buffer = Buffer::new(BufferOptions::new()).unwrap();
                for _ in 0..total / chunk {
                    buffer.write_bytes(&data).unwrap();
                }
                black_box(buffer.part_count())
            });
        });
    }
    group.finish();
}

fn bench_typed_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed_values");
    let count = 10_000u32;
    group.throughput(Throughput::Elements(u64::from(count)));

    for endianness in [Endianness::Native, Endianness::Big] {
        group.bench_with_input(
            BenchmarkId::new("u32_round_trip", format!("{endianness:?}")),
            &endianness,
            |b, &endianness| {
                b.iter(|| {
                    let options = BufferOptions::new().with_endianness(endianness);
                    let mut buffer = Buffer::new(options).unwrap();
                    for i in 0..count {
                        buffer.write_u32(i).unwrap();
                    }
                    let mut sum = 0u64;
                    for _ in 0..count {
                        sum += u64::from(buffer.read_u32().unwrap());
                    }
                    black_box(sum)
                });
            },
        );
    }
    group.finish();
}

fn bench_scattered_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("scattered_reads");
    let data: Vec<u8> = (0..1 << 20).map(|i: u32| (i % 251) as u8).collect();

    for stride in [997i64, 65_537].iter() {
        group.bench_with_input(BenchmarkId::new("stride", stride), stride, |b, &stride| {
            b.iter(|| {
                let mut buffer = Buffer::from_bytes(data.clone(), BufferOptions::new()).unwrap();
                let mut pos = 0i64;
                let mut sum = 0u64;
                while pos < (1 << 20) - 8 {
                    buffer.seek_read_absolute(pos).unwrap();
                    sum += buffer.read_u64().unwrap() & 0xFF;
                    pos += stride;
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

fn bench_bits(c: &mut Criterion) {
    let mut group = c.benchmark_group("bits");
    let bytes = 64 * 1024;
    group.throughput(Throughput::Bytes(bytes as u64));

    group.bench_function("read_bits_5", |b| {
        let data = vec![0xA5u8; bytes];
        b.iter(|| {
            let mut buffer = Buffer::from_bytes(data.clone(), BufferOptions::new()).unwrap();
            let mut sum = 0u64;
            for _ in 0..(bytes * 8 / 5) {
                sum += u64::from(buffer.read_bits(5).unwrap());
            }
            black_box(sum)
        });
    });
    group.finish();
}

fn bench_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    let bytes = 1 << 20;
    group.throughput(Throughput::Bytes(bytes as u64));

    for kind in [ChecksumKind::Crc32, ChecksumKind::Adler32] {
        group.bench_with_input(
            BenchmarkId::new("accumulate", format!("{kind:?}")),
            &kind,
            |b, &kind| {
                let mut buffer = Buffer::from_bytes(vec![7u8; bytes], BufferOptions::new()).unwrap();
                b.iter(|| {
                    let mut checksum = Checksum::new(kind);
                    buffer.accumulate_to_checksum(&mut checksum).unwrap();
                    black_box(checksum.result())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_write,
    bench_typed_values,
    bench_scattered_reads,
    bench_bits,
    bench_checksum
);
criterion_main!(benches);
