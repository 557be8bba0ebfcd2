//! Performance benchmarks for vcf-anonymizer
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vcf_anonymizer::core::{Region, RegionSet};
use vcf_anonymizer::formats::{haploid_from_pls, VariantRecord, VcfReader, FIXED_FIELD_COUNT};

/// A data line with `n` samples carrying GT:GQ:PL
fn data_line(chrom: &str, n: usize) -> String {
    let mut line = format!("{}\t3000000\t.\tC\tT\t40\tPASS\t.\tGT:GQ:PL", chrom);
    for i in 0..n {
        line.push_str(if i % 2 == 0 { "\t0/1:20:40,0,30" } else { "\t1/1:40:400,40,0" });
    }
    line
}

fn vcf_text(samples: usize, records: usize) -> String {
    let mut text = String::from("##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT");
    for i in 0..samples {
        text.push_str(&format!("\tS{}", i));
    }
    text.push('\n');
    for _ in 0..records {
        text.push_str(&data_line("chrX", samples));
        text.push('\n');
    }
    text
}

fn non_par() -> RegionSet {
    RegionSet::new(vec![
        Region::new("chrX", 2_781_479, 155_701_383).unwrap(),
        Region::new("chrY", 2_781_479, 56_887_903).unwrap(),
    ])
}

/// Benchmark record parsing at various cohort sizes
fn bench_record_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_parsing");

    for samples in [1usize, 10, 100, 1000].iter() {
        let line = data_line("chrX", *samples);
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &line, |b, line| {
            b.iter(|| {
                VariantRecord::parse(black_box(line), 1, FIXED_FIELD_COUNT + samples).unwrap()
            })
        });
    }

    group.finish();
}

/// Benchmark full reader throughput over an in-memory file
fn bench_reader(c: &mut Criterion) {
    let text = vcf_text(100, 1000);
    let mut group = c.benchmark_group("reader");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("100_samples_1000_records", |b| {
        b.iter(|| {
            let reader = VcfReader::new(black_box(text.as_bytes())).unwrap();
            reader.map(|r| r.unwrap()).count()
        })
    });
    group.finish();
}

/// Benchmark ploidy fixing with every sample male
fn bench_fix_ploidy(c: &mut Criterion) {
    let regions = non_par();
    let mut group = c.benchmark_group("fix_ploidy");

    for samples in [10usize, 100, 1000].iter() {
        let line = data_line("chrX", *samples);
        let record = VariantRecord::parse(&line, 1, FIXED_FIELD_COUNT + samples).unwrap();
        let sexes = vec!["m"; *samples];
        group.throughput(Throughput::Elements(*samples as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &record, |b, record| {
            b.iter(|| {
                let mut record = record.clone();
                record.fix_ploidy(sexes.as_slice(), &regions).unwrap();
                black_box(record)
            })
        });
    }

    group.finish();
}

/// Benchmark the PL haploid conversion alone
fn bench_haploid_pls(c: &mut Criterion) {
    let pls = [40.0, 0.0, 30.0];
    c.bench_function("haploid_from_pls", |b| {
        b.iter(|| haploid_from_pls(black_box(&pls), 2))
    });
}

/// Benchmark sample shuffling
fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");
    let mut rng = StdRng::seed_from_u64(42);

    for samples in [10usize, 100, 1000].iter() {
        let line = data_line("chr1", *samples);
        let mut record = VariantRecord::parse(&line, 1, FIXED_FIELD_COUNT + samples).unwrap();
        group.throughput(Throughput::Elements(*samples as u64));
        group.bench_function(BenchmarkId::from_parameter(samples), |b| {
            b.iter(|| record.shuffle_samples_with(&mut rng))
        });
    }

    group.finish();
}

/// Benchmark region membership queries
fn bench_region_lookup(c: &mut Criterion) {
    let regions: RegionSet = (0..10_000u64)
        .map(|i| Region::new("chrX", i * 1000, i * 1000 + 500).unwrap())
        .collect();
    c.bench_function("region_contains", |b| {
        b.iter(|| regions.contains(black_box("chrX"), black_box(5_000_250)))
    });
}

criterion_group!(
    benches,
    bench_record_parsing,
    bench_reader,
    bench_fix_ploidy,
    bench_haploid_pls,
    bench_shuffle,
    bench_region_lookup,
);

criterion_main!(benches);
