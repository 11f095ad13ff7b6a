//! Performance benchmarks for partition table scanning

use criterion::{Criterion, criterion_group, criterion_main};
use espfatfs::services::PartitionTableParser;
use std::hint::black_box;

fn large_table() -> String {
    let mut table = String::from("# Name, Type, SubType, Offset, Size, Flags\n");
    for i in 0..200u64 {
        table.push_str(&format!(
            "nvs{}, data, nvs, 0x{:X}, 0x1000,\n",
            i,
            0x9000 + i * 0x1000
        ));
    }
    table.push_str("ffat, data, fat, 0x290000, 0x170000,\n");
    table
}

fn benchmark_partition_scan(c: &mut Criterion) {
    let parser = PartitionTableParser::new("ffat", 4096);
    let small = "nvs,data,nvs,0x9000,0x5000,\nffat,data,fat,0x110000,0x1F0000,\n";
    let large = large_table();

    c.bench_function("partition_scan_small", |b| {
        b.iter(|| parser.parse(black_box(small)))
    });

    c.bench_function("partition_scan_large", |b| {
        b.iter(|| parser.parse(black_box(&large)))
    });
}

criterion_group!(benches, benchmark_partition_scan);
criterion_main!(benches);
