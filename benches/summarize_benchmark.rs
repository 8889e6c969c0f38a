use brc_parallel::chunk::ChunkScanner;
use brc_parallel::parser::RecordCursor;
use brc_parallel::{Config, summarize_bytes};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const STATIONS: &[&str] = &[
    "Abha",
    "Abidjan",
    "Accra",
    "Addis Ababa",
    "Adelaide",
    "Bosaso",
    "Hamburg",
    "Las Palmas de Gran Canaria",
    "Ouagadougou",
    "Petropavlovsk-Kamchatsky",
    "Zürich",
    "İzmir",
];

// Create test data for benchmarking
fn create_measurements(lines: usize) -> Vec<u8> {
    let mut state: u64 = 42;
    let mut out = Vec::with_capacity(lines * 16);
    for _ in 0..lines {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let station = STATIONS[(state >> 33) as usize % STATIONS.len()];
        let tenths = ((state >> 13) % 1999) as i64 - 999;
        let sign = if tenths < 0 { "-" } else { "" };
        out.extend_from_slice(
            format!("{station};{sign}{}.{}\n", tenths.abs() / 10, tenths.abs() % 10).as_bytes(),
        );
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let input = create_measurements(200_000);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.bench_function("record_cursor", |b| {
        b.iter(|| {
            let mut cursor = RecordCursor::new(black_box(&input), 0);
            let mut total = 0.0;
            while let Some(record) = cursor.next_record().unwrap() {
                total += record.temperature;
            }
            total
        })
    });
    group.bench_function("chunk_scanner", |b| {
        b.iter(|| ChunkScanner::new(black_box(&input), 4096).count())
    });
    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let input = create_measurements(1_000_000);
    let mut group = c.benchmark_group("summarize");
    group.throughput(Throughput::Bytes(input.len() as u64));
    group.sample_size(20);

    for workers in [1, 2, 4, num_cpus_hint()] {
        let config = Config::default()
            .with_chunk_size(256 * 1024)
            .with_workers(workers);
        group.bench_with_input(BenchmarkId::new("workers", workers), &config, |b, config| {
            b.iter(|| summarize_bytes(black_box(&input), config).unwrap())
        });
    }
    group.finish();
}

fn num_cpus_hint() -> usize {
    Config::default().workers
}

criterion_group!(benches, bench_parse, bench_summarize);
criterion_main!(benches);
